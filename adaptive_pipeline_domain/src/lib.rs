// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Pipeline Orchestrator Domain
//!
//! Pure business logic for the staged data-processing orchestrator: the
//! Message Broker's routing rules, the Control-Point Manager's stage
//! transition table and pipeline state machine, and the Staging Manager's
//! access-control invariants. Completely independent of any runtime,
//! transport, or storage technology — no `tokio`, no `tracing`.
//!
//! ## Module structure
//!
//! ### Value objects
//! Immutable, self-validating, equality-by-attribute types with no identity
//! of their own:
//! - [`value_objects::PipelineId`], [`value_objects::ControlPointId`],
//!   [`value_objects::StagingHandle`], [`value_objects::MessageId`] — typed
//!   ULID identifiers built on a shared [`value_objects::GenericId`].
//! - [`value_objects::Stage`] / [`value_objects::Department`] — the static
//!   transition and department-routing tables.
//! - [`value_objects::ComponentIdentifier`] — a component's logical address.
//!
//! ### Entities
//! Objects with identity that change state over time:
//! [`entities::PipelineContext`], [`entities::ControlPoint`],
//! [`entities::Message`], [`entities::Subscription`],
//! [`entities::StagingEntry`], [`entities::Route`],
//! [`entities::ComponentInfo`].
//!
//! ### Aggregates
//! [`aggregates::PipelineAggregate`] is the Control-Point Manager's
//! consistency boundary — see its own doc comment for the "never both,
//! never neither" control-point invariant it enforces.
//!
//! ### Domain events
//! [`events::DomainEvent`] is a reusable envelope; [`events`] also supplies
//! the concrete payloads the aggregate raises
//! ([`events::PipelineCreated`], [`events::ControlPointCreated`], …).
//!
//! ### Repositories and services
//! [`repositories::PipelineContextRepository`] and the
//! [`services::MessageBrokerPort`] / [`services::StagingPort`] /
//! [`services::ComponentRegistryPort`] traits are the ports the
//! application-infrastructure crate implements. All are `async-trait`
//! despite the domain crate's no-runtime rule — I/O-bound ports are the one
//! place that's allowed.
//!
//! ### Error handling
//! [`error::OrchestratorError`] is the single `thiserror`-derived error type
//! every fallible domain operation returns.

pub mod aggregates;
pub mod entities;
pub mod error;
pub mod events;
pub mod repositories;
pub mod services;
pub mod value_objects;

pub use aggregates::PipelineAggregate;
pub use entities::{ControlPoint, Message, PipelineContext, Route, StagingEntry, Subscription};
pub use error::OrchestratorError;
pub use events::{DomainEvent, EventPayload};
pub use value_objects::{ComponentIdentifier, ControlPointId, Department, MessageId, PipelineId, Stage, StagingHandle};
