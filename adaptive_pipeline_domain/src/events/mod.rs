// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Domain Events
//!
//! [`generic_event`] supplies the reusable `DomainEvent<T>` envelope and
//! `EventPayload` trait; [`pipeline_events`] supplies the concrete payload
//! types this system emits.

pub mod generic_event;
pub mod pipeline_events;

pub use generic_event::{DomainEvent, EventCategory, EventPayload};
pub use pipeline_events::{
    ControlPointArchived, ControlPointCreated, DecisionSubmitted, PipelineAggregateEvent, PipelineCancelled,
    PipelineCompleted, PipelineCreated, PipelineFailed, PipelineRejected, QualityIssuesDetected,
};
