// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Staging Manager
//!
//! In-process adapter for [`StagingPort`]: payload bytes and
//! [`StagingEntry`] metadata held in memory, keyed both by the opaque
//! [`StagingHandle`] a caller holds and by `(pipeline_id, stage)` for the
//! first-store-wins rule. A background sweeper evicts entries whose
//! retention has lapsed, backing off exponentially (capped at ten times
//! the configured interval) across consecutive failed passes and resetting
//! to the base interval the next time a sweep succeeds.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use pipeline_orchestrator_domain::entities::StagingEntry;
use pipeline_orchestrator_domain::services::StagingPort;
use pipeline_orchestrator_domain::value_objects::Stage;
use pipeline_orchestrator_domain::{OrchestratorError, PipelineId, StagingHandle};

use crate::infrastructure::metrics::OrchestratorMetrics;

struct Stored {
    entry: StagingEntry,
    payload: Vec<u8>,
}

struct StagingState {
    by_handle: RwLock<HashMap<StagingHandle, Stored>>,
    by_pipeline_stage: RwLock<HashMap<(PipelineId, Stage), StagingHandle>>,
    default_retention: Duration,
    metrics: Arc<OrchestratorMetrics>,
}

/// Concrete [`StagingPort`] adapter. The sweeper task is spawned in
/// [`Self::new`] and lives as long as the returned handle; call
/// [`Self::stop_sweeper`] during shutdown to join it.
pub struct StagingManager {
    state: Arc<StagingState>,
    sweeper: JoinHandle<()>,
}

impl StagingManager {
    pub fn new(default_retention: Duration, sweep_interval: Duration, metrics: Arc<OrchestratorMetrics>) -> Self {
        let state = Arc::new(StagingState {
            by_handle: RwLock::new(HashMap::new()),
            by_pipeline_stage: RwLock::new(HashMap::new()),
            default_retention,
            metrics,
        });

        let sweeper_state = Arc::clone(&state);
        let sweeper = tokio::spawn(async move {
            let mut current_interval = sweep_interval;
            loop {
                tokio::time::sleep(current_interval).await;
                match catch_unwind(AssertUnwindSafe(|| Self::sweep_expired(&sweeper_state))) {
                    Ok(()) => current_interval = sweep_interval,
                    Err(_) => {
                        sweeper_state.metrics.staging_sweep_failures_total.inc();
                        current_interval = next_interval_after_failure(current_interval, sweep_interval);
                        tracing::error!(backoff = ?current_interval, "staging sweep panicked, backing off");
                    }
                }
            }
        });

        Self { state, sweeper }
    }

    fn sweep_expired(state: &StagingState) {
        let now = chrono::Utc::now();
        let expired: Vec<StagingHandle> = state
            .by_handle
            .read()
            .iter()
            .filter(|(_, stored)| stored.entry.is_expired(now))
            .map(|(handle, _)| handle.clone())
            .collect();

        if expired.is_empty() {
            return;
        }

        let mut by_handle = state.by_handle.write();
        let mut by_pipeline_stage = state.by_pipeline_stage.write();
        for handle in expired {
            if let Some(stored) = by_handle.remove(&handle) {
                by_pipeline_stage.remove(&(stored.entry.pipeline_id, stored.entry.stage));
                state.metrics.staging_entries_expired_total.inc();
            }
        }
    }

    pub fn stop_sweeper(&self) {
        self.sweeper.abort();
    }
}

#[async_trait]
impl StagingPort for StagingManager {
    async fn store(
        &self,
        stage: Stage,
        pipeline_id: PipelineId,
        owner_component: String,
        payload: Vec<u8>,
        format_declared: bool,
    ) -> Result<StagingHandle, OrchestratorError> {
        let key = (pipeline_id.clone(), stage);
        if self.state.by_pipeline_stage.read().contains_key(&key) {
            return Err(OrchestratorError::invariant_violation(format!(
                "stage {stage} already has a staged entry for pipeline {pipeline_id}"
            )));
        }

        let entry = StagingEntry::new(
            stage,
            pipeline_id,
            owner_component,
            !payload.is_empty(),
            payload.len() as u64,
            format_declared,
            self.state.default_retention,
        );
        let handle = entry.handle.clone();

        let mut by_pipeline_stage = self.state.by_pipeline_stage.write();
        if by_pipeline_stage.contains_key(&key) {
            return Err(OrchestratorError::invariant_violation(format!(
                "stage {stage} already has a staged entry for pipeline {}",
                key.0
            )));
        }
        by_pipeline_stage.insert(key, handle.clone());
        self.state.by_handle.write().insert(handle.clone(), Stored { entry, payload });
        self.state.metrics.staging_entries_stored_total.inc();
        Ok(handle)
    }

    async fn retrieve(&self, handle: &StagingHandle, requester: &str) -> Result<Vec<u8>, OrchestratorError> {
        let by_handle = self.state.by_handle.read();
        let stored = by_handle
            .get(handle)
            .ok_or_else(|| OrchestratorError::not_found(format!("no staging entry for handle {handle}")))?;

        if !stored.entry.can_retrieve(requester) {
            self.state.metrics.staging_access_denied_total.inc();
            return Err(OrchestratorError::access_denied(format!(
                "{requester} is not granted access to staging handle {handle}"
            )));
        }
        Ok(stored.payload.clone())
    }

    async fn grant(&self, handle: &StagingHandle, component: String) -> Result<(), OrchestratorError> {
        let mut by_handle = self.state.by_handle.write();
        let stored = by_handle
            .get_mut(handle)
            .ok_or_else(|| OrchestratorError::not_found(format!("no staging entry for handle {handle}")))?;
        stored.entry.grant(component);
        Ok(())
    }

    async fn delete(&self, handle: &StagingHandle) -> Result<(), OrchestratorError> {
        let removed = self.state.by_handle.write().remove(handle);
        if let Some(stored) = removed {
            self.state
                .by_pipeline_stage
                .write()
                .remove(&(stored.entry.pipeline_id, stored.entry.stage));
            self.state.metrics.staging_entries_deleted_total.inc();
        }
        Ok(())
    }

    async fn entry(&self, handle: &StagingHandle) -> Result<Option<StagingEntry>, OrchestratorError> {
        Ok(self.state.by_handle.read().get(handle).map(|stored| stored.entry.clone()))
    }
}

impl Drop for StagingManager {
    fn drop(&mut self) {
        self.sweeper.abort();
    }
}

/// Doubles `current_interval`, capped at ten times `base_interval` — a
/// repeatedly failing sweep backs off instead of spinning the lock every
/// `base_interval`. A successful sweep resets straight back to
/// `base_interval`.
fn next_interval_after_failure(current_interval: Duration, base_interval: Duration) -> Duration {
    let max_interval = base_interval.saturating_mul(10);
    std::cmp::min(current_interval.saturating_mul(2), max_interval)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> StagingManager {
        StagingManager::new(
            Duration::from_secs(3600),
            Duration::from_secs(3600),
            Arc::new(OrchestratorMetrics::new().unwrap()),
        )
    }

    #[tokio::test]
    async fn second_store_for_the_same_pipeline_and_stage_is_rejected() {
        let manager = manager();
        let pipeline_id = PipelineId::new();
        manager
            .store(Stage::QualityCheck, pipeline_id.clone(), "quality.processor.inst-1".to_string(), vec![1, 2, 3], true)
            .await
            .unwrap();
        let second = manager
            .store(Stage::QualityCheck, pipeline_id, "quality.processor.inst-1".to_string(), vec![4, 5, 6], true)
            .await;
        assert!(second.is_err());
    }

    #[tokio::test]
    async fn retrieve_requires_a_grant() {
        let manager = manager();
        let handle = manager
            .store(Stage::QualityCheck, PipelineId::new(), "quality.processor.inst-1".to_string(), vec![1, 2, 3], true)
            .await
            .unwrap();

        assert!(manager.retrieve(&handle, "insight.processor.inst-1").await.is_err());
        assert!(manager.retrieve(&handle, "quality.processor.inst-1").await.is_ok());
    }

    #[tokio::test]
    async fn grant_allows_a_new_component_to_retrieve() {
        let manager = manager();
        let handle = manager
            .store(Stage::QualityCheck, PipelineId::new(), "quality.processor.inst-1".to_string(), vec![1, 2, 3], true)
            .await
            .unwrap();

        manager.grant(&handle, "insight.processor.inst-1".to_string()).await.unwrap();
        let payload = manager.retrieve(&handle, "insight.processor.inst-1").await.unwrap();
        assert_eq!(payload, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn delete_removes_both_indexes() {
        let manager = manager();
        let pipeline_id = PipelineId::new();
        let handle = manager
            .store(Stage::QualityCheck, pipeline_id.clone(), "quality.processor.inst-1".to_string(), vec![1], true)
            .await
            .unwrap();

        manager.delete(&handle).await.unwrap();
        assert!(manager.entry(&handle).await.unwrap().is_none());

        // The (pipeline, stage) slot is free again after delete.
        let reused = manager
            .store(Stage::QualityCheck, pipeline_id, "quality.processor.inst-1".to_string(), vec![2], true)
            .await;
        assert!(reused.is_ok());
    }

    #[tokio::test]
    async fn delete_of_an_unknown_handle_is_not_an_error() {
        let manager = manager();
        assert!(manager.delete(&StagingHandle::new()).await.is_ok());
    }

    #[test]
    fn repeated_failures_double_the_interval_up_to_ten_times_the_base() {
        let base = Duration::from_secs(60);
        let mut interval = base;
        for _ in 0..10 {
            interval = next_interval_after_failure(interval, base);
        }
        assert_eq!(interval, base.saturating_mul(10));
    }

    #[test]
    fn a_single_failure_doubles_the_base_interval() {
        let base = Duration::from_secs(60);
        assert_eq!(next_interval_after_failure(base, base), Duration::from_secs(120));
    }
}
