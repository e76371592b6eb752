// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Control-Point Manager
//!
//! Owns one [`PipelineAggregate`] per in-flight pipeline behind its own
//! lock, so transitions within a pipeline serialize while different
//! pipelines proceed concurrently — the per-pipeline single-consumer queue
//! shape, built here as one `tokio::sync::Mutex` per aggregate rather than
//! an actual per-pipeline task, since the aggregate's own methods are
//! synchronous and the only suspension point is the broker publish that
//! follows a transition.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;

use pipeline_orchestrator_domain::entities::{ControlPoint, ControlPointStatus, DecisionType, MessageType};
use pipeline_orchestrator_domain::services::MessageBrokerPort;
use pipeline_orchestrator_domain::value_objects::predecessors;
use pipeline_orchestrator_domain::{
    ControlPointId, Message, OrchestratorError, PipelineAggregate, PipelineContext, PipelineId, Stage, StagingHandle,
};

use crate::infrastructure::config::ControlPointConfig;
use crate::infrastructure::metrics::OrchestratorMetrics;

const CPM_TAG: &str = "control_point_manager";
const CONDUCTOR_TARGET: &str = "pipeline_service.conductor";

struct State {
    pipelines: RwLock<HashMap<PipelineId, Arc<AsyncMutex<PipelineAggregate>>>>,
    timeout_attempts: RwLock<HashMap<ControlPointId, u32>>,
    review_loop_counts: RwLock<HashMap<PipelineId, u32>>,
    broker: Arc<dyn MessageBrokerPort>,
    metrics: Arc<OrchestratorMetrics>,
    config: ControlPointConfig,
}

/// Concrete control-point state machine. `new` spawns the timeout monitor
/// loop; drop the returned value (or call [`Self::stop_monitor`]) to join
/// it during shutdown.
pub struct ControlPointManager {
    state: Arc<State>,
    monitor: JoinHandle<()>,
}

impl ControlPointManager {
    pub fn new(config: ControlPointConfig, broker: Arc<dyn MessageBrokerPort>, metrics: Arc<OrchestratorMetrics>) -> Self {
        let monitor_interval = config.monitor_interval();
        let state = Arc::new(State {
            pipelines: RwLock::new(HashMap::new()),
            timeout_attempts: RwLock::new(HashMap::new()),
            review_loop_counts: RwLock::new(HashMap::new()),
            broker,
            metrics,
            config,
        });

        let monitor_state = Arc::clone(&state);
        let monitor = tokio::spawn(async move {
            let mut interval = tokio::time::interval(monitor_interval);
            loop {
                interval.tick().await;
                sweep_timeouts(&monitor_state).await;
            }
        });

        Self { state, monitor }
    }

    pub fn stop_monitor(&self) {
        self.monitor.abort();
    }

    pub async fn create_pipeline(
        &self,
        name: impl Into<String>,
        stage_sequence: Vec<Stage>,
        metadata: HashMap<String, String>,
    ) -> Result<PipelineId, OrchestratorError> {
        if stage_sequence.is_empty() {
            return Err(OrchestratorError::validation_error("stage_sequence must not be empty"));
        }
        let aggregate = PipelineAggregate::create(name, stage_sequence, metadata);
        let pipeline_id = aggregate.context().pipeline_id.clone();
        self.state
            .pipelines
            .write()
            .insert(pipeline_id.clone(), Arc::new(AsyncMutex::new(aggregate)));
        Ok(pipeline_id)
    }

    pub async fn create_control_point(
        &self,
        pipeline_id: &PipelineId,
        stage: Stage,
        staging_reference: Option<StagingHandle>,
    ) -> Result<ControlPointId, OrchestratorError> {
        let handle = self.state.pipeline_handle(pipeline_id)?;
        let control_point = {
            let mut aggregate = handle.lock().await;
            let cp_id = aggregate.create_control_point(stage, staging_reference, self.state.config.timeout())?;
            aggregate
                .active_control_points()
                .get(&cp_id)
                .cloned()
                .expect("control point was just inserted")
        };
        self.state.publish_control_point_reached(pipeline_id, &control_point).await?;
        Ok(control_point.id)
    }

    pub async fn detect_quality_issues(
        &self,
        pipeline_id: &PipelineId,
        detecting_control_point: ControlPointId,
        severity: impl Into<String>,
        staging_reference: Option<StagingHandle>,
    ) -> Result<ControlPointId, OrchestratorError> {
        let handle = self.state.pipeline_handle(pipeline_id)?;
        let mut aggregate = handle.lock().await;

        if self.state.bump_review_loop_count(pipeline_id) > self.state.config.review_loop_limit {
            let err = OrchestratorError::invariant_violation(format!(
                "pipeline {pipeline_id} exceeded its user-review loop limit of {}",
                self.state.config.review_loop_limit
            ));
            aggregate.fail(&err);
            drop(aggregate);
            self.state.publish_route_error(pipeline_id, &err).await?;
            return Err(err);
        }

        let review_id =
            aggregate.detect_quality_issues(detecting_control_point, severity, staging_reference, self.state.config.timeout());
        let control_point = aggregate
            .active_control_points()
            .get(&review_id)
            .cloned()
            .expect("review control point was just inserted");
        drop(aggregate);
        self.state.publish_control_point_reached(pipeline_id, &control_point).await?;
        Ok(review_id)
    }

    /// Applies an inbound decision: archives the decided control point and,
    /// for `approve`/`rework`, opens the next one. `reject` marks the
    /// pipeline rejected without opening a successor.
    pub async fn process_decision(
        &self,
        pipeline_id: &PipelineId,
        control_point_id: &ControlPointId,
        decision_type: DecisionType,
        decided_by: Option<String>,
    ) -> Result<(), OrchestratorError> {
        let handle = self.state.pipeline_handle(pipeline_id)?;
        let mut aggregate = handle.lock().await;

        let current_stage = aggregate
            .active_control_points()
            .get(control_point_id)
            .map(|cp| cp.stage)
            .ok_or_else(|| OrchestratorError::not_found(format!("control point {control_point_id} is not active")))?;

        aggregate.submit_decision(control_point_id, decision_type.clone(), decided_by)?;
        aggregate.archive_control_point(control_point_id)?;
        self.state.timeout_attempts.write().remove(control_point_id);
        self.state.metrics.control_points_archived_total.inc();

        match decision_type {
            DecisionType::Approve => {
                let next_stage = current_stage.candidates().first().copied();
                match next_stage {
                    None | Some(Stage::Completion) => {
                        self.finish_pipeline(&mut aggregate, pipeline_id).await?;
                    }
                    Some(next_stage) => {
                        self.open_next_control_point(&mut aggregate, pipeline_id, next_stage, None).await?;
                    }
                }
            }
            DecisionType::Rework { rework_stage } => {
                if !predecessors(current_stage).contains(&rework_stage) {
                    return Err(OrchestratorError::validation_error(format!(
                        "rework stage {rework_stage} is not a predecessor of {current_stage}"
                    )));
                }

                let loop_exceeded = if rework_stage == Stage::UserReview {
                    self.state.bump_review_loop_count(pipeline_id) > self.state.config.review_loop_limit
                } else {
                    aggregate.context().retry_count_for(rework_stage) >= self.state.config.max_retries
                };

                if loop_exceeded {
                    let err = OrchestratorError::invariant_violation(format!(
                        "rework loop limit reached for stage {rework_stage}"
                    ));
                    aggregate.fail(&err);
                    drop(aggregate);
                    self.state.publish_route_error(pipeline_id, &err).await?;
                    return Err(err);
                }

                self.open_next_control_point(&mut aggregate, pipeline_id, rework_stage, None).await?;
            }
            DecisionType::Reject { reason } => {
                aggregate.reject(reason.clone());
                drop(aggregate);
                self.state.publish_status_update(pipeline_id, "rejected", &reason).await?;
            }
        }
        Ok(())
    }

    /// Archives `control_point_id` as implicitly approved and opens the next
    /// stage with `staged_output` as its staging reference — the path a
    /// processor's `<department>.<stage>.complete` message drives, distinct
    /// from [`Self::process_decision`]'s human `approve` because only
    /// `UserReview` control points ever wait on a human at all.
    pub async fn complete_stage(
        &self,
        pipeline_id: &PipelineId,
        control_point_id: &ControlPointId,
        staged_output: StagingHandle,
    ) -> Result<(), OrchestratorError> {
        let handle = self.state.pipeline_handle(pipeline_id)?;
        let mut aggregate = handle.lock().await;

        let current_stage = aggregate
            .active_control_points()
            .get(control_point_id)
            .map(|cp| cp.stage)
            .ok_or_else(|| OrchestratorError::not_found(format!("control point {control_point_id} is not active")))?;

        aggregate.submit_decision(control_point_id, DecisionType::Approve, None)?;
        aggregate.archive_control_point(control_point_id)?;
        self.state.timeout_attempts.write().remove(control_point_id);
        self.state.metrics.control_points_archived_total.inc();

        match current_stage.candidates().first().copied() {
            None | Some(Stage::Completion) => {
                self.finish_pipeline(&mut aggregate, pipeline_id).await?;
            }
            Some(next_stage) => {
                self.open_next_control_point(&mut aggregate, pipeline_id, next_stage, Some(staged_output)).await?;
            }
        }
        Ok(())
    }

    async fn open_next_control_point(
        &self,
        aggregate: &mut PipelineAggregate,
        pipeline_id: &PipelineId,
        next_stage: Stage,
        staging_reference: Option<StagingHandle>,
    ) -> Result<(), OrchestratorError> {
        let cp_id = aggregate.create_control_point(next_stage, staging_reference, self.state.config.timeout())?;
        let control_point = aggregate
            .active_control_points()
            .get(&cp_id)
            .cloned()
            .expect("control point was just inserted");
        self.state.publish_control_point_reached(pipeline_id, &control_point).await
    }

    /// Reaching `COMPLETION` still opens and notifies a control point like
    /// any other stage transition — a processor chain for the report
    /// department owns it just like `assigned_module` for any department —
    /// but since nothing ever decides a terminal control point, it is
    /// archived immediately after the notification goes out instead of
    /// waiting on a `process_decision`/`complete_stage` call that would
    /// never come. This is what gives `control_point_history` one entry per
    /// stage in the sequence, including the last one.
    async fn finish_pipeline(&self, aggregate: &mut PipelineAggregate, pipeline_id: &PipelineId) -> Result<(), OrchestratorError> {
        let cp_id = aggregate.create_control_point(Stage::Completion, None, self.state.config.timeout())?;
        let control_point = aggregate
            .active_control_points()
            .get(&cp_id)
            .cloned()
            .expect("control point was just inserted");
        self.state.publish_control_point_reached(pipeline_id, &control_point).await?;
        aggregate.archive_control_point(&cp_id)?;
        self.state.metrics.control_points_archived_total.inc();
        aggregate.complete();
        self.state.observability_completed(pipeline_id);
        Ok(())
    }

    /// Applies a `<department>.<stage>.error` report against its still-open
    /// control point: republishes `CONTROL_POINT_REACHED` to retry, drawing
    /// from the same per-control-point budget the timeout monitor uses,
    /// until `max_retries` is exhausted, then fails the pipeline.
    pub async fn record_processor_error(
        &self,
        pipeline_id: &PipelineId,
        control_point_id: &ControlPointId,
        error_kind: &str,
        error_message: &str,
    ) -> Result<(), OrchestratorError> {
        let handle = self.state.pipeline_handle(pipeline_id)?;
        let mut aggregate = handle.lock().await;

        let control_point = aggregate
            .active_control_points()
            .get(control_point_id)
            .cloned()
            .ok_or_else(|| OrchestratorError::not_found(format!("control point {control_point_id} is not active")))?;

        let attempts = self.state.bump_retry_attempt(control_point_id);
        tracing::warn!(%pipeline_id, %control_point_id, error_kind, error_message, attempts, "processor reported a stage error");

        if attempts <= self.state.config.max_retries {
            drop(aggregate);
            return self.state.publish_control_point_reached(pipeline_id, &control_point).await;
        }

        aggregate.archive_control_point(control_point_id)?;
        let err = OrchestratorError::processor_error(format!(
            "{control_point_id} exceeded {} retries ({error_kind}: {error_message})",
            self.state.config.max_retries
        ));
        aggregate.fail(&err);
        self.state.timeout_attempts.write().remove(control_point_id);
        self.state.publish_route_error(pipeline_id, &err).await
    }

    pub async fn cancel(&self, pipeline_id: &PipelineId) -> Result<(), OrchestratorError> {
        let handle = self.state.pipeline_handle(pipeline_id)?;
        {
            let mut aggregate = handle.lock().await;
            aggregate.cancel();
        }
        self.state.publish_status_update(pipeline_id, "cancelled", "pipeline cancelled by request").await
    }

    pub async fn status(&self, pipeline_id: &PipelineId) -> Result<PipelineContext, OrchestratorError> {
        let handle = self.state.pipeline_handle(pipeline_id)?;
        let aggregate = handle.lock().await;
        Ok(aggregate.context().clone())
    }

    /// Active control points and archived history for `pipeline_id`, the
    /// detail behind `get_status` — served entirely from the in-memory
    /// aggregate, no broker round-trip.
    pub async fn control_points(&self, pipeline_id: &PipelineId) -> Result<(Vec<ControlPoint>, Vec<ControlPoint>), OrchestratorError> {
        let handle = self.state.pipeline_handle(pipeline_id)?;
        let aggregate = handle.lock().await;
        let active = aggregate.active_control_points().values().cloned().collect();
        let history = aggregate.control_point_history().to_vec();
        Ok((active, history))
    }

    pub async fn list(&self) -> Vec<PipelineContext> {
        let handles: Vec<_> = self.state.pipelines.read().values().cloned().collect();
        let mut contexts = Vec::with_capacity(handles.len());
        for handle in handles {
            contexts.push(handle.lock().await.context().clone());
        }
        contexts
    }
}

impl Drop for ControlPointManager {
    fn drop(&mut self) {
        self.monitor.abort();
    }
}

impl State {
    fn pipeline_handle(&self, pipeline_id: &PipelineId) -> Result<Arc<AsyncMutex<PipelineAggregate>>, OrchestratorError> {
        self.pipelines
            .read()
            .get(pipeline_id)
            .cloned()
            .ok_or_else(|| OrchestratorError::not_found(format!("no pipeline with id {pipeline_id}")))
    }

    fn bump_review_loop_count(&self, pipeline_id: &PipelineId) -> u32 {
        let mut counts = self.review_loop_counts.write();
        let counter = counts.entry(pipeline_id.clone()).or_insert(0);
        *counter += 1;
        *counter
    }

    /// Timeout retries and processor-error retries draw from the same
    /// per-control-point budget, so both paths bump this one counter.
    fn bump_retry_attempt(&self, control_point_id: &ControlPointId) -> u32 {
        let mut attempts = self.timeout_attempts.write();
        let counter = attempts.entry(control_point_id.clone()).or_insert(0);
        *counter += 1;
        *counter
    }

    fn observability_completed(&self, pipeline_id: &PipelineId) {
        tracing::info!(%pipeline_id, "pipeline reached COMPLETION");
        self.metrics.pipelines_completed_total.inc();
        self.metrics.pipelines_by_status.with_label_values(&["completed"]).inc();
    }

    async fn publish_control_point_reached(
        &self,
        pipeline_id: &PipelineId,
        control_point: &ControlPoint,
    ) -> Result<(), OrchestratorError> {
        let content = serde_json::json!({
            "control_point_id": control_point.id.to_string(),
            "stage": control_point.stage.to_string(),
            "staging_reference": control_point.staging_reference.as_ref().map(ToString::to_string),
        });
        let message = Message::new(
            MessageType::ControlPointReached,
            CPM_TAG,
            &control_point.assigned_module,
            content,
            pipeline_id.clone(),
        );
        self.broker.publish(message).await?;
        self.metrics.control_points_active.set(self.active_control_point_count() as i64);
        Ok(())
    }

    async fn publish_route_error(&self, pipeline_id: &PipelineId, error: &OrchestratorError) -> Result<(), OrchestratorError> {
        let content = serde_json::json!({
            "category": error.category(),
            "message": error.to_string(),
        });
        let message = Message::new(MessageType::RouteError, CPM_TAG, CONDUCTOR_TARGET, content, pipeline_id.clone());
        self.broker.publish(message).await?;
        self.metrics.pipelines_failed_total.inc();
        self.metrics.pipelines_by_status.with_label_values(&["failed"]).inc();
        Ok(())
    }

    async fn publish_status_update(&self, pipeline_id: &PipelineId, status: &str, detail: &str) -> Result<(), OrchestratorError> {
        let content = serde_json::json!({ "status": status, "detail": detail });
        let message = Message::new(MessageType::StatusUpdate, CPM_TAG, CONDUCTOR_TARGET, content, pipeline_id.clone());
        self.broker.publish(message).await?;
        if status == "rejected" {
            self.metrics.pipelines_rejected_total.inc();
            self.metrics.pipelines_by_status.with_label_values(&["rejected"]).inc();
        } else if status == "cancelled" {
            self.metrics.pipelines_cancelled_total.inc();
            self.metrics.pipelines_by_status.with_label_values(&["cancelled"]).inc();
        }
        Ok(())
    }

    fn active_control_point_count(&self) -> usize {
        self.pipelines
            .read()
            .values()
            .filter_map(|handle| handle.try_lock().ok())
            .map(|aggregate| aggregate.active_control_points().len())
            .sum()
    }
}

async fn sweep_timeouts(state: &Arc<State>) {
    let now = chrono::Utc::now();
    let pipeline_ids: Vec<PipelineId> = state.pipelines.read().keys().cloned().collect();

    for pipeline_id in pipeline_ids {
        let Ok(handle) = state.pipeline_handle(&pipeline_id) else {
            continue;
        };
        let mut aggregate = handle.lock().await;
        let overdue: Vec<ControlPointId> = aggregate
            .active_control_points()
            .values()
            .filter(|cp| cp.status == ControlPointStatus::Pending && cp.is_overdue(now))
            .map(|cp| cp.id.clone())
            .collect();

        for control_point_id in overdue {
            handle_overdue_control_point(state, &mut aggregate, &pipeline_id, control_point_id).await;
        }
    }
}

async fn handle_overdue_control_point(
    state: &Arc<State>,
    aggregate: &mut PipelineAggregate,
    pipeline_id: &PipelineId,
    control_point_id: ControlPointId,
) {
    let attempts = state.bump_retry_attempt(&control_point_id);

    let Some(control_point) = aggregate.active_control_points().get(&control_point_id).cloned() else {
        return;
    };

    state.metrics.control_points_timed_out_total.inc();
    tracing::warn!(%pipeline_id, %control_point_id, attempts, "control point timed out");

    if attempts <= state.config.max_retries {
        if let Err(err) = state.publish_control_point_reached(pipeline_id, &control_point).await {
            tracing::error!(%pipeline_id, %control_point_id, error = %err, "failed to re-publish control point on timeout");
        }
        return;
    }

    let _ = aggregate.record_timeout(&control_point_id);
    let _ = aggregate.archive_control_point(&control_point_id);
    let err = OrchestratorError::timeout(format!(
        "control point {control_point_id} exceeded {} recovery attempts",
        state.config.max_retries
    ));
    aggregate.fail(&err);
    state.timeout_attempts.write().remove(&control_point_id);
    if let Err(publish_err) = state.publish_route_error(pipeline_id, &err).await {
        tracing::error!(%pipeline_id, error = %publish_err, "failed to publish route error after exhausting retries");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pipeline_orchestrator_domain::MessageId;

    #[derive(Default)]
    struct RecordingBroker {
        published: AsyncMutex<Vec<Message>>,
    }

    #[async_trait]
    impl MessageBrokerPort for RecordingBroker {
        async fn register(&self, _component: pipeline_orchestrator_domain::ComponentIdentifier) -> Result<(), OrchestratorError> {
            Ok(())
        }

        async fn subscribe(
            &self,
            _subscription: pipeline_orchestrator_domain::Subscription,
            _callback: Arc<dyn pipeline_orchestrator_domain::services::MessageCallback>,
        ) -> Result<(), OrchestratorError> {
            Ok(())
        }

        async fn publish(&self, message: Message) -> Result<MessageId, OrchestratorError> {
            let id = message.message_id.clone();
            self.published.lock().await.push(message);
            Ok(id)
        }

        async fn shutdown(&self) -> Result<(), OrchestratorError> {
            Ok(())
        }
    }

    fn manager() -> ControlPointManager {
        ControlPointManager::new(
            ControlPointConfig {
                timeout_secs: 3600,
                max_retries: 3,
                review_loop_limit: 3,
                monitor_interval_secs: 3600,
            },
            Arc::new(RecordingBroker::default()),
            Arc::new(OrchestratorMetrics::new().unwrap()),
        )
    }

    #[tokio::test]
    async fn create_control_point_publishes_control_point_reached() {
        let cpm = manager();
        let pipeline_id = cpm
            .create_pipeline("run", vec![Stage::Reception, Stage::Validation, Stage::Completion], HashMap::new())
            .await
            .unwrap();
        cpm.create_control_point(&pipeline_id, Stage::Reception, None).await.unwrap();

        let status = cpm.status(&pipeline_id).await.unwrap();
        assert_eq!(status.current_stage, Stage::Reception);
    }

    #[tokio::test]
    async fn approve_advances_to_the_first_candidate_stage() {
        let cpm = manager();
        let pipeline_id = cpm
            .create_pipeline("run", vec![Stage::Reception, Stage::Validation], HashMap::new())
            .await
            .unwrap();
        let cp_id = cpm.create_control_point(&pipeline_id, Stage::Reception, None).await.unwrap();

        cpm.process_decision(&pipeline_id, &cp_id, DecisionType::Approve, None).await.unwrap();

        let status = cpm.status(&pipeline_id).await.unwrap();
        assert_eq!(status.current_stage, Stage::Validation);
    }

    #[tokio::test]
    async fn approve_at_report_generation_completes_the_pipeline() {
        let cpm = manager();
        let pipeline_id = cpm
            .create_pipeline("run", vec![Stage::ReportGeneration], HashMap::new())
            .await
            .unwrap();
        let cp_id = cpm.create_control_point(&pipeline_id, Stage::ReportGeneration, None).await.unwrap();

        cpm.process_decision(&pipeline_id, &cp_id, DecisionType::Approve, None).await.unwrap();

        let status = cpm.status(&pipeline_id).await.unwrap();
        assert_eq!(status.status, pipeline_orchestrator_domain::entities::PipelineStatus::Completed);

        let (active, history) = cpm.control_points(&pipeline_id).await.unwrap();
        assert!(active.is_empty());
        assert_eq!(history.len(), 2, "the report-generation gate and the completion gate both archive");
    }

    #[tokio::test]
    async fn happy_path_through_all_seven_stages_archives_one_control_point_per_stage() {
        let cpm = manager();
        let stage_sequence = vec![
            Stage::Reception,
            Stage::Validation,
            Stage::QualityCheck,
            Stage::InsightGeneration,
            Stage::DecisionMaking,
            Stage::ReportGeneration,
            Stage::Completion,
        ];
        let pipeline_id = cpm.create_pipeline("run", stage_sequence.clone(), HashMap::new()).await.unwrap();
        let mut cp_id = cpm.create_control_point(&pipeline_id, Stage::Reception, None).await.unwrap();

        for _ in 0..stage_sequence.len() - 1 {
            cpm.process_decision(&pipeline_id, &cp_id, DecisionType::Approve, None).await.unwrap();
            let (active, _) = cpm.control_points(&pipeline_id).await.unwrap();
            if let Some(control_point) = active.first() {
                cp_id = control_point.id.clone();
            }
        }

        let status = cpm.status(&pipeline_id).await.unwrap();
        assert_eq!(status.status, pipeline_orchestrator_domain::entities::PipelineStatus::Completed);

        let (active, history) = cpm.control_points(&pipeline_id).await.unwrap();
        assert!(active.is_empty());
        assert_eq!(history.len(), stage_sequence.len());
    }

    #[tokio::test]
    async fn reject_marks_the_pipeline_rejected() {
        let cpm = manager();
        let pipeline_id = cpm
            .create_pipeline("run", vec![Stage::QualityCheck], HashMap::new())
            .await
            .unwrap();
        let cp_id = cpm.create_control_point(&pipeline_id, Stage::QualityCheck, None).await.unwrap();

        cpm.process_decision(
            &pipeline_id,
            &cp_id,
            DecisionType::Reject { reason: "bad input".into() },
            Some("alice".into()),
        )
        .await
        .unwrap();

        let status = cpm.status(&pipeline_id).await.unwrap();
        assert_eq!(status.status, pipeline_orchestrator_domain::entities::PipelineStatus::Rejected);
    }

    #[tokio::test]
    async fn rework_to_a_non_predecessor_stage_is_rejected() {
        let cpm = manager();
        let pipeline_id = cpm
            .create_pipeline("run", vec![Stage::QualityCheck], HashMap::new())
            .await
            .unwrap();
        let cp_id = cpm.create_control_point(&pipeline_id, Stage::QualityCheck, None).await.unwrap();

        let result = cpm
            .process_decision(
                &pipeline_id,
                &cp_id,
                DecisionType::Rework { rework_stage: Stage::ReportGeneration },
                None,
            )
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn rework_to_a_predecessor_stage_opens_a_new_control_point() {
        let cpm = manager();
        let pipeline_id = cpm
            .create_pipeline("run", vec![Stage::QualityCheck], HashMap::new())
            .await
            .unwrap();
        let cp_id = cpm.create_control_point(&pipeline_id, Stage::QualityCheck, None).await.unwrap();

        cpm.process_decision(
            &pipeline_id,
            &cp_id,
            DecisionType::Rework { rework_stage: Stage::Validation },
            None,
        )
        .await
        .unwrap();

        let status = cpm.status(&pipeline_id).await.unwrap();
        assert_eq!(status.current_stage, Stage::Validation);
        assert_eq!(status.retry_count_for(Stage::Validation), 1);
    }

    #[tokio::test]
    async fn unknown_pipeline_status_is_not_found() {
        let cpm = manager();
        let result = cpm.status(&PipelineId::new()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn list_reflects_every_created_pipeline() {
        let cpm = manager();
        cpm.create_pipeline("a", vec![Stage::Reception], HashMap::new()).await.unwrap();
        cpm.create_pipeline("b", vec![Stage::Reception], HashMap::new()).await.unwrap();
        assert_eq!(cpm.list().await.len(), 2);
    }

    #[tokio::test]
    async fn complete_stage_carries_the_staged_output_forward() {
        let cpm = manager();
        let pipeline_id = cpm
            .create_pipeline("run", vec![Stage::Reception, Stage::Validation], HashMap::new())
            .await
            .unwrap();
        let cp_id = cpm.create_control_point(&pipeline_id, Stage::Reception, None).await.unwrap();

        let staged_output = StagingHandle::new();
        cpm.complete_stage(&pipeline_id, &cp_id, staged_output.clone()).await.unwrap();

        let (active, _history) = cpm.control_points(&pipeline_id).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].stage, Stage::Validation);
        assert_eq!(active[0].staging_reference, Some(staged_output));
    }

    #[tokio::test]
    async fn record_processor_error_fails_the_pipeline_after_max_retries() {
        let cpm = ControlPointManager::new(
            ControlPointConfig {
                timeout_secs: 3600,
                max_retries: 1,
                review_loop_limit: 3,
                monitor_interval_secs: 3600,
            },
            Arc::new(RecordingBroker::default()),
            Arc::new(OrchestratorMetrics::new().unwrap()),
        );
        let pipeline_id = cpm
            .create_pipeline("run", vec![Stage::Reception], HashMap::new())
            .await
            .unwrap();
        let cp_id = cpm.create_control_point(&pipeline_id, Stage::Reception, None).await.unwrap();

        cpm.record_processor_error(&pipeline_id, &cp_id, "processor_error", "boom").await.unwrap();
        cpm.record_processor_error(&pipeline_id, &cp_id, "processor_error", "boom again").await.unwrap();

        let status = cpm.status(&pipeline_id).await.unwrap();
        assert_eq!(status.status, pipeline_orchestrator_domain::entities::PipelineStatus::Failed);
    }
}
