// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Observability Service
//!
//! Initializes the process-wide `tracing` subscriber and gives the
//! application layer a small facade over it plus the metrics registry, so a
//! use case doesn't need to import both `tracing` and
//! [`crate::infrastructure::metrics::OrchestratorMetrics`] directly to
//! record a pipeline-lifecycle event.

use std::sync::Arc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use pipeline_orchestrator_domain::{OrchestratorError, PipelineId};

use crate::infrastructure::config::LoggingConfig;
use crate::infrastructure::metrics::OrchestratorMetrics;

/// Installs the global `tracing` subscriber. Call once, from `main`.
///
/// `format` selects JSON (production) vs. pretty (development) output;
/// `level` seeds the default filter, overridable with `RUST_LOG`.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), OrchestratorError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let registry = tracing_subscriber::registry().with(filter);

    let result = if config.format == "json" {
        registry.with(fmt::layer().json().with_target(true)).try_init()
    } else {
        registry.with(fmt::layer().pretty().with_target(false)).try_init()
    };

    result.map_err(|e| OrchestratorError::invalid_config(format!("failed to install tracing subscriber: {e}")))
}

/// Thin facade tying structured logging to the metrics counters a pipeline
/// lifecycle event should also move. Kept deliberately small — most call
/// sites still reach for `tracing::info!`/`tracing::warn!` directly; this
/// exists for the handful of events that always update both a log line and
/// a metric together.
pub struct ObservabilityService {
    metrics: Arc<OrchestratorMetrics>,
}

impl ObservabilityService {
    pub fn new(metrics: Arc<OrchestratorMetrics>) -> Self {
        Self { metrics }
    }

    pub fn record_pipeline_completed(&self, pipeline_id: &PipelineId) {
        tracing::info!(%pipeline_id, status = "completed", "pipeline reached COMPLETION");
        self.metrics.pipelines_completed_total.inc();
        self.metrics.pipelines_by_status.with_label_values(&["completed"]).inc();
    }

    pub fn record_pipeline_rejected(&self, pipeline_id: &PipelineId, reason: &str) {
        tracing::info!(%pipeline_id, status = "rejected", reason, "pipeline rejected");
        self.metrics.pipelines_rejected_total.inc();
        self.metrics.pipelines_by_status.with_label_values(&["rejected"]).inc();
    }

    pub fn record_pipeline_failed(&self, pipeline_id: &PipelineId, error: &OrchestratorError) {
        tracing::error!(%pipeline_id, status = "failed", category = error.category(), error = %error, "pipeline failed");
        self.metrics.pipelines_failed_total.inc();
        self.metrics.pipelines_by_status.with_label_values(&["failed"]).inc();
    }

    pub fn record_pipeline_cancelled(&self, pipeline_id: &PipelineId) {
        tracing::info!(%pipeline_id, status = "cancelled", "pipeline cancelled");
        self.metrics.pipelines_cancelled_total.inc();
        self.metrics.pipelines_by_status.with_label_values(&["cancelled"]).inc();
    }

    pub fn record_control_point_timed_out(&self, pipeline_id: &PipelineId, control_point_id: &str) {
        tracing::warn!(%pipeline_id, control_point_id, "control point timed out with no decision");
        self.metrics.control_points_timed_out_total.inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_pipeline_completed_increments_the_matching_counter() {
        let metrics = Arc::new(OrchestratorMetrics::new().unwrap());
        let service = ObservabilityService::new(Arc::clone(&metrics));
        service.record_pipeline_completed(&PipelineId::new());
        assert_eq!(metrics.pipelines_completed_total.get(), 1);
        assert_eq!(metrics.pipelines_by_status.with_label_values(&["completed"]).get(), 1);
    }
}
