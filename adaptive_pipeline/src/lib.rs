// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

// Production code safety enforced via CI and `make lint-strict`
// (lib/bins checked separately from tests - tests may use unwrap/expect)

//! # Pipeline Orchestrator
//!
//! Coordinates a staged, human-in-the-loop data pipeline across independently
//! deployed components: a message broker for inter-component notification, a
//! staging manager for large payload hand-off, a component registry for
//! addressing, and a control-point manager driving each pipeline's
//! [`PipelineAggregate`](pipeline_orchestrator_domain::PipelineAggregate)
//! through its stage sequence.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Application Layer                          │
//! │  (Use Cases: create/start/decide/status/list/cancel)         │
//! └─────────────────────────────────────────────────────────────┘
//!                                │
//! ┌─────────────────────────────────────────────────────────────┐
//! │           Domain Layer (pipeline-orchestrator-domain)        │
//! │  (Aggregates, Entities, Value Objects, Port Traits)          │
//! └─────────────────────────────────────────────────────────────┘
//!                                │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                Infrastructure Layer                         │
//! │  (Message Broker, Staging Manager, Component Registry,       │
//! │   Control-Point Manager, Config, Metrics, Logging)           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Core Components
//!
//! - **Message Broker**: in-process publish/subscribe over dotted
//!   `department.role.instance` addresses, with a bounded worker pool
//!   dispatching callbacks.
//! - **Staging Manager**: holds large payloads outside message bodies,
//!   keyed by `(pipeline, stage)`, with grant-based access control and a
//!   time-to-live sweeper.
//! - **Component Registry**: issues and tracks [`ComponentIdentifier`]s and
//!   dependency metadata for every registered component.
//! - **Control-Point Manager**: owns the [`PipelineAggregate`] for every
//!   in-flight pipeline and is the only writer of pipeline state.
//!
//! [`ComponentIdentifier`]: pipeline_orchestrator_domain::ComponentIdentifier
//! [`PipelineAggregate`]: pipeline_orchestrator_domain::PipelineAggregate

pub mod application;
pub mod infrastructure;

// Tests are organized as:
// - Unit tests: #[cfg(test)] modules within each source file
// - Integration tests: separate files in tests/ directory

pub use pipeline_orchestrator_domain::{
    ComponentIdentifier, ControlPoint, ControlPointId, DomainEvent, Message, MessageId, OrchestratorError,
    PipelineAggregate, PipelineContext, PipelineId, Route, Stage, StagingEntry, StagingHandle, Subscription,
};
