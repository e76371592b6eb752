// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Message Broker
//!
//! A bounded-channel worker pool dispatches callbacks: one `mpsc::Sender`
//! shared by every publisher, one `Arc<tokio::sync::Mutex<Receiver>>`
//! shared by a fixed number of spawned workers, each looping
//! `recv` -> handle -> repeat until the channel closes.

use async_trait::async_trait;
use futures::FutureExt;
use parking_lot::RwLock;
use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex as AsyncMutex};
use tokio::task::JoinHandle;

use pipeline_orchestrator_domain::entities::SubscriptionPattern;
use pipeline_orchestrator_domain::services::{ComponentRegistryPort, MessageBrokerPort, MessageCallback};
use pipeline_orchestrator_domain::value_objects::{Department, Role};
use pipeline_orchestrator_domain::{ComponentIdentifier, Message, MessageId, OrchestratorError, Subscription};

use crate::infrastructure::metrics::OrchestratorMetrics;

struct DispatchJob {
    callback: Arc<dyn MessageCallback>,
    message: Message,
}

struct BrokerState {
    subscriptions: RwLock<Vec<(SubscriptionPattern, Arc<dyn MessageCallback>)>>,
    registered: RwLock<HashSet<String>>,
    sender: AsyncMutex<Option<mpsc::Sender<DispatchJob>>>,
    metrics: Arc<OrchestratorMetrics>,
    registry: Arc<dyn ComponentRegistryPort>,
}

/// Concrete [`MessageBrokerPort`] adapter: a fixed worker pool dispatching
/// over a bounded channel, with subscriptions matched by
/// [`SubscriptionPattern::matches`].
pub struct MessageBroker {
    state: Arc<BrokerState>,
    workers: AsyncMutex<Vec<JoinHandle<()>>>,
}

impl MessageBroker {
    /// `pool_size` workers share one bounded channel of depth
    /// `queue_bound`; `publish` refuses new work with
    /// [`OrchestratorError::broker_transient`] once it's full rather than
    /// blocking the publisher. `registry` backs the `source`/`target`
    /// re-resolution `publish` performs before matching subscriptions.
    pub fn new(
        pool_size: usize,
        queue_bound: usize,
        metrics: Arc<OrchestratorMetrics>,
        registry: Arc<dyn ComponentRegistryPort>,
    ) -> Self {
        let (tx, rx) = mpsc::channel::<DispatchJob>(queue_bound);
        let rx = Arc::new(AsyncMutex::new(rx));

        let state = Arc::new(BrokerState {
            subscriptions: RwLock::new(Vec::new()),
            registered: RwLock::new(HashSet::new()),
            sender: AsyncMutex::new(Some(tx)),
            metrics,
            registry,
        });

        let mut workers = Vec::with_capacity(pool_size);
        for _ in 0..pool_size {
            let rx = Arc::clone(&rx);
            let state = Arc::clone(&state);
            workers.push(tokio::spawn(Self::worker_loop(rx, state)));
        }

        Self {
            state,
            workers: AsyncMutex::new(workers),
        }
    }

    async fn worker_loop(rx: Arc<AsyncMutex<mpsc::Receiver<DispatchJob>>>, state: Arc<BrokerState>) {
        loop {
            let job = {
                let mut rx = rx.lock().await;
                rx.recv().await
            };
            let Some(job) = job else {
                break;
            };

            let outcome = AssertUnwindSafe(job.callback.handle(job.message)).catch_unwind().await;
            match outcome {
                Ok(Ok(())) => state.metrics.broker_messages_dispatched_total.inc(),
                Ok(Err(err)) => {
                    tracing::warn!(error = %err, "subscriber callback returned an error");
                    state.metrics.broker_callback_errors_total.inc();
                }
                Err(_) => {
                    tracing::error!("subscriber callback panicked");
                    state.metrics.broker_callback_errors_total.inc();
                }
            }
        }
    }

    /// Re-resolves a `department.role(.instance_id)` tag against the
    /// registry, so two callers naming the same `department.role` with
    /// different or absent instance ids end up addressing the one
    /// canonical registered instance. Tags that don't parse as
    /// `department.role...` (internal system addresses like `"cpm"` or
    /// `"pipeline_service.conductor"`) pass through unchanged.
    async fn resolve_tag(&self, tag: &str) -> String {
        let mut segments = tag.splitn(3, '.');
        let (Some(department_str), Some(role_str)) = (segments.next(), segments.next()) else {
            return tag.to_string();
        };
        let Ok(department) = department_str.parse::<Department>() else {
            return tag.to_string();
        };
        let Ok(role) = Role::new(role_str) else {
            return tag.to_string();
        };

        let name = format!("{department_str}.{role_str}");
        match self.state.registry.get_id(&name, "message-broker-participant", department, role).await {
            Ok(identifier) => identifier.tag(),
            Err(_) => tag.to_string(),
        }
    }
}

#[async_trait]
impl MessageBrokerPort for MessageBroker {
    async fn register(&self, component: ComponentIdentifier) -> Result<(), OrchestratorError> {
        self.state.registered.write().insert(component.tag());
        Ok(())
    }

    async fn subscribe(
        &self,
        subscription: Subscription,
        callback: Arc<dyn MessageCallback>,
    ) -> Result<(), OrchestratorError> {
        self.state
            .subscriptions
            .write()
            .push((subscription.pattern, callback));
        Ok(())
    }

    async fn publish(&self, mut message: Message) -> Result<MessageId, OrchestratorError> {
        message.message_id = MessageId::new();
        let message_id = message.message_id.clone();
        message.source = self.resolve_tag(&message.source).await;
        message.target = self.resolve_tag(&message.target).await;

        let sender_guard = self.state.sender.lock().await;
        let Some(sender) = sender_guard.as_ref() else {
            return Err(OrchestratorError::broker_transient("broker is shutting down"));
        };

        let matching: Vec<Arc<dyn MessageCallback>> = self
            .state
            .subscriptions
            .read()
            .iter()
            .filter(|(pattern, _)| pattern.matches(&message.target))
            .map(|(_, callback)| Arc::clone(callback))
            .collect();

        for callback in matching {
            let job = DispatchJob {
                callback,
                message: message.clone(),
            };
            if sender.try_send(job).is_err() {
                self.state.metrics.broker_queue_full_total.inc();
                return Err(OrchestratorError::broker_transient(format!(
                    "dispatch queue full publishing to {}",
                    message.target
                )));
            }
        }

        self.state.metrics.broker_messages_published_total.inc();
        Ok(message_id)
    }

    async fn shutdown(&self) -> Result<(), OrchestratorError> {
        self.state.sender.lock().await.take();

        let mut workers = self.workers.lock().await;
        for handle in workers.drain(..) {
            if let Err(err) = handle.await {
                tracing::warn!(error = %err, "broker worker task did not shut down cleanly");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::component_registry::ComponentRegistry;
    use pipeline_orchestrator_domain::entities::MessageType;
    use pipeline_orchestrator_domain::PipelineId;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingCallback {
        count: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl MessageCallback for CountingCallback {
        async fn handle(&self, _message: Message) -> Result<(), OrchestratorError> {
            self.count.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn metrics() -> Arc<OrchestratorMetrics> {
        Arc::new(OrchestratorMetrics::new().unwrap())
    }

    fn registry() -> Arc<dyn ComponentRegistryPort> {
        Arc::new(ComponentRegistry::new())
    }

    #[tokio::test]
    async fn publish_dispatches_to_a_matching_subscription() {
        let broker = MessageBroker::new(2, 16, metrics(), registry());
        let count = Arc::new(AtomicUsize::new(0));
        let callback = Arc::new(CountingCallback { count: Arc::clone(&count) });

        let pattern = SubscriptionPattern::new("quality.manager").unwrap();
        broker
            .subscribe(Subscription::new("cpm", pattern), callback)
            .await
            .unwrap();

        broker
            .publish(Message::new(
                MessageType::ControlPointReached,
                "cpm",
                "quality.manager.inst-1",
                serde_json::Value::Null,
                PipelineId::new(),
            ))
            .await
            .unwrap();

        // Give the worker pool a chance to drain the dispatch.
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn publish_does_not_dispatch_to_a_non_matching_subscription() {
        let broker = MessageBroker::new(1, 16, metrics(), registry());
        let count = Arc::new(AtomicUsize::new(0));
        let callback = Arc::new(CountingCallback { count: Arc::clone(&count) });

        let pattern = SubscriptionPattern::new("insight.manager").unwrap();
        broker
            .subscribe(Subscription::new("cpm", pattern), callback)
            .await
            .unwrap();

        broker
            .publish(Message::new(
                MessageType::ControlPointReached,
                "cpm",
                "quality.manager.inst-1",
                serde_json::Value::Null,
                PipelineId::new(),
            ))
            .await
            .unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn publish_re_resolves_stale_instance_ids_to_the_same_registered_target() {
        let shared_registry = registry();
        let broker = MessageBroker::new(1, 16, metrics(), Arc::clone(&shared_registry));
        let count = Arc::new(AtomicUsize::new(0));
        let callback = Arc::new(CountingCallback { count: Arc::clone(&count) });

        // Pre-seed the canonical instance id the way a processor would on
        // its own startup registration.
        let canonical = shared_registry
            .get_id("quality.manager", "processor", Department::Quality, Role::new("manager").unwrap())
            .await
            .unwrap();

        let pattern = SubscriptionPattern::new(canonical.tag()).unwrap();
        broker
            .subscribe(Subscription::new("cpm", pattern), callback)
            .await
            .unwrap();

        // Two callers name the same department.role with different stale
        // instance ids; both should normalize to the one canonical tag.
        for stale_target in ["quality.manager.stale-a", "quality.manager.stale-b"] {
            broker
                .publish(Message::new(
                    MessageType::ControlPointReached,
                    "cpm",
                    stale_target,
                    serde_json::Value::Null,
                    PipelineId::new(),
                ))
                .await
                .unwrap();
        }

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn publish_after_shutdown_is_rejected() {
        let broker = MessageBroker::new(1, 16, metrics(), registry());
        broker.shutdown().await.unwrap();

        let result = broker
            .publish(Message::new(
                MessageType::ControlPointReached,
                "cpm",
                "quality.manager.inst-1",
                serde_json::Value::Null,
                PipelineId::new(),
            ))
            .await;
        assert!(result.is_err());
    }
}
