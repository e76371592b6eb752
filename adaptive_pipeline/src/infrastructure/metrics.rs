// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Orchestrator Metrics
//!
//! Prometheus counters and gauges for the broker, staging, and
//! control-point components, collected under the `pipeline_orchestrator`
//! namespace.

use prometheus::{IntCounter, IntCounterVec, IntGauge, Opts, Registry};
use std::sync::Arc;

use pipeline_orchestrator_domain::OrchestratorError;

pub struct OrchestratorMetrics {
    registry: Arc<Registry>,

    pub broker_messages_published_total: IntCounter,
    pub broker_messages_dispatched_total: IntCounter,
    pub broker_callback_errors_total: IntCounter,
    pub broker_queue_full_total: IntCounter,

    pub staging_entries_stored_total: IntCounter,
    pub staging_entries_deleted_total: IntCounter,
    pub staging_entries_expired_total: IntCounter,
    pub staging_access_denied_total: IntCounter,
    pub staging_sweep_failures_total: IntCounter,

    pub control_points_active: IntGauge,
    pub control_points_archived_total: IntCounter,
    pub control_points_timed_out_total: IntCounter,

    pub pipelines_completed_total: IntCounter,
    pub pipelines_rejected_total: IntCounter,
    pub pipelines_failed_total: IntCounter,
    pub pipelines_cancelled_total: IntCounter,
    pub pipelines_by_status: IntCounterVec,
}

impl OrchestratorMetrics {
    pub fn new() -> Result<Self, OrchestratorError> {
        let registry = Registry::new();
        let namespace = "pipeline_orchestrator";

        let broker_messages_published_total = IntCounter::with_opts(
            Opts::new("broker_messages_published_total", "Messages accepted by publish()").namespace(namespace),
        )
        .map_err(metric_err)?;
        let broker_messages_dispatched_total = IntCounter::with_opts(
            Opts::new("broker_messages_dispatched_total", "Messages delivered to a subscriber callback")
                .namespace(namespace),
        )
        .map_err(metric_err)?;
        let broker_callback_errors_total = IntCounter::with_opts(
            Opts::new("broker_callback_errors_total", "Subscriber callbacks that errored or panicked")
                .namespace(namespace),
        )
        .map_err(metric_err)?;
        let broker_queue_full_total = IntCounter::with_opts(
            Opts::new("broker_queue_full_total", "Publishes rejected for a full dispatch queue").namespace(namespace),
        )
        .map_err(metric_err)?;

        let staging_entries_stored_total = IntCounter::with_opts(
            Opts::new("staging_entries_stored_total", "Entries accepted by store()").namespace(namespace),
        )
        .map_err(metric_err)?;
        let staging_entries_deleted_total = IntCounter::with_opts(
            Opts::new("staging_entries_deleted_total", "Entries removed by delete() or the TTL sweeper")
                .namespace(namespace),
        )
        .map_err(metric_err)?;
        let staging_entries_expired_total = IntCounter::with_opts(
            Opts::new("staging_entries_expired_total", "Entries the TTL sweeper found past retention")
                .namespace(namespace),
        )
        .map_err(metric_err)?;
        let staging_access_denied_total = IntCounter::with_opts(
            Opts::new("staging_access_denied_total", "retrieve() calls rejected for lack of a grant").namespace(namespace),
        )
        .map_err(metric_err)?;
        let staging_sweep_failures_total = IntCounter::with_opts(
            Opts::new("staging_sweep_failures_total", "TTL sweeper passes that panicked, triggering backoff")
                .namespace(namespace),
        )
        .map_err(metric_err)?;

        let control_points_active =
            IntGauge::with_opts(Opts::new("control_points_active", "Control points currently awaiting a decision").namespace(namespace))
                .map_err(metric_err)?;
        let control_points_archived_total = IntCounter::with_opts(
            Opts::new("control_points_archived_total", "Control points moved from active to history").namespace(namespace),
        )
        .map_err(metric_err)?;
        let control_points_timed_out_total = IntCounter::with_opts(
            Opts::new("control_points_timed_out_total", "Control points the timeout monitor found overdue")
                .namespace(namespace),
        )
        .map_err(metric_err)?;

        let pipelines_completed_total = IntCounter::with_opts(
            Opts::new("pipelines_completed_total", "Pipelines that reached COMPLETION").namespace(namespace),
        )
        .map_err(metric_err)?;
        let pipelines_rejected_total =
            IntCounter::with_opts(Opts::new("pipelines_rejected_total", "Pipelines rejected by a decision").namespace(namespace))
                .map_err(metric_err)?;
        let pipelines_failed_total =
            IntCounter::with_opts(Opts::new("pipelines_failed_total", "Pipelines that failed processing").namespace(namespace))
                .map_err(metric_err)?;
        let pipelines_cancelled_total =
            IntCounter::with_opts(Opts::new("pipelines_cancelled_total", "Pipelines cancelled by request").namespace(namespace))
                .map_err(metric_err)?;
        let pipelines_by_status = IntCounterVec::new(
            Opts::new("pipelines_by_status_total", "Terminal transitions by resulting status").namespace(namespace),
            &["status"],
        )
        .map_err(metric_err)?;

        for collector in [
            Box::new(broker_messages_published_total.clone()) as Box<dyn prometheus::core::Collector>,
            Box::new(broker_messages_dispatched_total.clone()),
            Box::new(broker_callback_errors_total.clone()),
            Box::new(broker_queue_full_total.clone()),
            Box::new(staging_entries_stored_total.clone()),
            Box::new(staging_entries_deleted_total.clone()),
            Box::new(staging_entries_expired_total.clone()),
            Box::new(staging_access_denied_total.clone()),
            Box::new(staging_sweep_failures_total.clone()),
            Box::new(control_points_active.clone()),
            Box::new(control_points_archived_total.clone()),
            Box::new(control_points_timed_out_total.clone()),
            Box::new(pipelines_completed_total.clone()),
            Box::new(pipelines_rejected_total.clone()),
            Box::new(pipelines_failed_total.clone()),
            Box::new(pipelines_cancelled_total.clone()),
            Box::new(pipelines_by_status.clone()),
        ] {
            registry.register(collector).map_err(metric_err)?;
        }

        Ok(Self {
            registry: Arc::new(registry),
            broker_messages_published_total,
            broker_messages_dispatched_total,
            broker_callback_errors_total,
            broker_queue_full_total,
            staging_entries_stored_total,
            staging_entries_deleted_total,
            staging_entries_expired_total,
            staging_access_denied_total,
            staging_sweep_failures_total,
            control_points_active,
            control_points_archived_total,
            control_points_timed_out_total,
            pipelines_completed_total,
            pipelines_rejected_total,
            pipelines_failed_total,
            pipelines_cancelled_total,
            pipelines_by_status,
        })
    }

    pub fn registry(&self) -> Arc<Registry> {
        Arc::clone(&self.registry)
    }
}

fn metric_err(err: prometheus::Error) -> OrchestratorError {
    OrchestratorError::invariant_violation(format!("metrics registration failed: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_registers_every_collector_without_name_collisions() {
        let metrics = OrchestratorMetrics::new().unwrap();
        assert!(!metrics.registry().gather().is_empty());
        metrics.broker_messages_published_total.inc();
        assert_eq!(metrics.broker_messages_published_total.get(), 1);
    }

    #[test]
    fn pipelines_by_status_tracks_labels_independently() {
        let metrics = OrchestratorMetrics::new().unwrap();
        metrics.pipelines_by_status.with_label_values(&["completed"]).inc();
        metrics.pipelines_by_status.with_label_values(&["rejected"]).inc();
        assert_eq!(metrics.pipelines_by_status.with_label_values(&["completed"]).get(), 1);
        assert_eq!(metrics.pipelines_by_status.with_label_values(&["rejected"]).get(), 1);
    }
}
