// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Message Broker Port
//!
//! The only permitted inter-component communication channel, specified as a
//! port the infrastructure layer implements with a worker pool and a
//! subscription table. Kept async (`async-trait`) even though this crate
//! carries no runtime of its own — I/O-bound infrastructure ports are the
//! one place the domain layer allows that.

use async_trait::async_trait;
use std::sync::Arc;

use crate::entities::{Message, Subscription};
use crate::error::OrchestratorError;
use crate::value_objects::{ComponentIdentifier, MessageId};

/// A registered subscriber's handler. Implementations run inside the
/// broker's callback-isolation guard — a panic here is caught and recorded
/// as a callback-error metric, never propagated to the dispatch loop.
#[async_trait]
pub trait MessageCallback: Send + Sync {
    async fn handle(&self, message: Message) -> Result<(), OrchestratorError>;
}

#[async_trait]
pub trait MessageBrokerPort: Send + Sync {
    /// Idempotent: admits `component` into the routing table and flushes any
    /// subscriptions recorded against its tag before it registered.
    async fn register(&self, component: ComponentIdentifier) -> Result<(), OrchestratorError>;

    /// Records `callback` under `pattern`. Legal before the matching
    /// component has registered.
    async fn subscribe(&self, subscription: Subscription, callback: Arc<dyn MessageCallback>)
        -> Result<(), OrchestratorError>;

    /// Assigns a `message_id`, re-resolves `source`/`target` through the
    /// registry, and dispatches to every subscription whose pattern matches
    /// `target`'s tag. Returns a transient error if the dispatch pool's
    /// queue is past its high-water mark.
    async fn publish(&self, message: Message) -> Result<MessageId, OrchestratorError>;

    /// Refuses new publishes, drains in-flight dispatches, joins workers.
    async fn shutdown(&self) -> Result<(), OrchestratorError>;
}
