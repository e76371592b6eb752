// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Pipeline Aggregate
//!
//! Consistency boundary for a single pipeline run, owned exclusively by the
//! Control-Point Manager. Wraps the [`PipelineContext`] together with the
//! control points raised against it, and records every state change as an
//! uncommitted [`PipelineAggregateEvent`] the way the rest of this codebase's
//! event-sourced aggregates do. A control point is always in exactly one of
//! `active_control_points` or `control_point_history` — never both, never
//! neither.

use std::collections::HashMap;
use std::time::Duration;

use crate::entities::control_point::{ControlPoint, ControlPointStatus, Decision, DecisionType};
use crate::entities::pipeline_context::PipelineContext;
use crate::error::OrchestratorError;
use crate::events::pipeline_events::{
    ControlPointArchived, ControlPointCreated, DecisionSubmitted, PipelineAggregateEvent, PipelineCancelled,
    PipelineCompleted, PipelineCreated, PipelineFailed, PipelineRejected, QualityIssuesDetected,
};
use crate::value_objects::{ControlPointId, Stage, StagingHandle};

#[derive(Debug, Clone)]
pub struct PipelineAggregate {
    context: PipelineContext,
    active_control_points: HashMap<ControlPointId, ControlPoint>,
    control_point_history: Vec<ControlPoint>,
    version: u64,
    uncommitted_events: Vec<PipelineAggregateEvent>,
}

impl PipelineAggregate {
    /// Starts a brand-new pipeline run and records its `PipelineCreated`
    /// event. `stage_sequence` is the caller's declared plan; `PipelineContext`
    /// derives `stage_dependencies` from the static transition table
    /// independent of it.
    pub fn create(name: impl Into<String>, stage_sequence: Vec<Stage>, metadata: HashMap<String, String>) -> Self {
        let context = PipelineContext::new(name, stage_sequence.clone(), metadata);
        let mut aggregate = Self {
            context,
            active_control_points: HashMap::new(),
            control_point_history: Vec::new(),
            version: 0,
            uncommitted_events: Vec::new(),
        };
        aggregate.record(PipelineAggregateEvent::Created(PipelineCreated {
            pipeline_id: aggregate.context.pipeline_id.clone(),
            name: aggregate.context.name.clone(),
            stage_sequence,
        }));
        aggregate
    }

    /// Reconstructs an aggregate from its event history. Only the
    /// `PipelineContext`-level fields (current stage, status) are replayed
    /// faithfully; `active_control_points` is left empty since the event
    /// payloads don't carry a control point's full field set — a caller that
    /// needs exact control-point state after replay re-derives it from a
    /// separate control-point store keyed by the same events.
    pub fn from_events(events: Vec<PipelineAggregateEvent>) -> Result<Self, OrchestratorError> {
        let mut iter = events.into_iter();
        let first = iter
            .next()
            .ok_or_else(|| OrchestratorError::invariant_violation("event stream is empty"))?;
        let PipelineAggregateEvent::Created(created) = first else {
            return Err(OrchestratorError::invariant_violation(
                "event stream must start with PipelineCreated",
            ));
        };
        let mut context = PipelineContext::new(created.name.clone(), created.stage_sequence.clone(), HashMap::new());
        context.pipeline_id = created.pipeline_id.clone();
        let mut aggregate = Self {
            context,
            active_control_points: HashMap::new(),
            control_point_history: Vec::new(),
            version: 1,
            uncommitted_events: Vec::new(),
        };
        for event in iter {
            aggregate.replay(&event);
            aggregate.version += 1;
        }
        Ok(aggregate)
    }

    fn replay(&mut self, event: &PipelineAggregateEvent) {
        match event {
            PipelineAggregateEvent::Created(_) => {}
            PipelineAggregateEvent::ControlPointCreated(e) => self.context.advance_to(e.stage),
            PipelineAggregateEvent::ControlPointArchived(_) => {}
            PipelineAggregateEvent::DecisionSubmitted(_) => {}
            PipelineAggregateEvent::QualityIssuesDetected(_) => self.context.mark_awaiting_decision(),
            PipelineAggregateEvent::Completed(_) => self.context.advance_to(Stage::Completion),
            PipelineAggregateEvent::Rejected(_) => self.context.mark_rejected(),
            PipelineAggregateEvent::Failed(_) => self.context.mark_failed(),
            PipelineAggregateEvent::Cancelled(_) => self.context.mark_cancelled(),
        }
    }

    fn record(&mut self, event: PipelineAggregateEvent) {
        self.uncommitted_events.push(event);
        self.version += 1;
    }

    pub fn context(&self) -> &PipelineContext {
        &self.context
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn uncommitted_events(&self) -> &[PipelineAggregateEvent] {
        &self.uncommitted_events
    }

    pub fn mark_events_as_committed(&mut self) {
        self.uncommitted_events.clear();
    }

    pub fn has_uncommitted_events(&self) -> bool {
        !self.uncommitted_events.is_empty()
    }

    pub fn active_control_points(&self) -> &HashMap<ControlPointId, ControlPoint> {
        &self.active_control_points
    }

    pub fn control_point_history(&self) -> &[ControlPoint] {
        &self.control_point_history
    }

    pub fn has_active_control_point_for(&self, stage: Stage) -> bool {
        self.active_control_points.values().any(|cp| cp.stage == stage)
    }

    /// Opens a control point for `stage`, moving the context onto it. Fails
    /// if a control point for that stage is already active — a pipeline
    /// advances through one stage at a time.
    pub fn create_control_point(
        &mut self,
        stage: Stage,
        staging_reference: Option<StagingHandle>,
        timeout: Duration,
    ) -> Result<ControlPointId, OrchestratorError> {
        if self.has_active_control_point_for(stage) {
            return Err(OrchestratorError::invariant_violation(format!(
                "stage {stage} already has an active control point"
            )));
        }
        let control_point = ControlPoint::new(self.context.pipeline_id.clone(), stage, staging_reference, timeout);
        let control_point_id = control_point.id.clone();
        let requires_decision = control_point.requires_decision;
        self.context.advance_to(stage);
        if requires_decision {
            self.context.mark_awaiting_decision();
        }
        self.active_control_points.insert(control_point_id.clone(), control_point);
        self.record(PipelineAggregateEvent::ControlPointCreated(ControlPointCreated {
            pipeline_id: self.context.pipeline_id.clone(),
            control_point_id: control_point_id.clone(),
            stage,
        }));
        Ok(control_point_id)
    }

    /// Raises an ad hoc `USER_REVIEW` control point from a
    /// `QUALITY_ISSUES_DETECTED` event, without moving the context's own
    /// `current_stage`.
    pub fn detect_quality_issues(
        &mut self,
        detecting_control_point: ControlPointId,
        severity: impl Into<String>,
        staging_reference: Option<StagingHandle>,
        timeout: Duration,
    ) -> ControlPointId {
        let severity = severity.into();
        let review = ControlPoint::new_review(
            self.context.pipeline_id.clone(),
            detecting_control_point.clone(),
            staging_reference,
            timeout,
        );
        let review_id = review.id.clone();
        self.active_control_points.insert(review_id.clone(), review);
        self.context.mark_awaiting_decision();
        self.record(PipelineAggregateEvent::QualityIssuesDetected(QualityIssuesDetected {
            pipeline_id: self.context.pipeline_id.clone(),
            detecting_control_point,
            severity,
        }));
        review_id
    }

    /// Applies a decision to a pending active control point.
    pub fn submit_decision(
        &mut self,
        control_point_id: &ControlPointId,
        decision_type: DecisionType,
        decided_by: Option<String>,
    ) -> Result<(), OrchestratorError> {
        let control_point = self
            .active_control_points
            .get_mut(control_point_id)
            .ok_or_else(|| OrchestratorError::not_found(format!("control point {control_point_id} is not active")))?;
        if control_point.status != ControlPointStatus::Pending {
            return Err(OrchestratorError::invariant_violation(format!(
                "control point {control_point_id} already has status {:?}",
                control_point.status
            )));
        }
        let summary = match &decision_type {
            DecisionType::Approve => "approve".to_string(),
            DecisionType::Rework { rework_stage } => format!("rework:{rework_stage}"),
            DecisionType::Reject { reason } => format!("reject:{reason}"),
        };
        control_point.apply_decision(Decision::new(decision_type, decided_by));
        self.record(PipelineAggregateEvent::DecisionSubmitted(DecisionSubmitted {
            pipeline_id: self.context.pipeline_id.clone(),
            control_point_id: control_point_id.clone(),
            decision_summary: summary,
        }));
        Ok(())
    }

    /// Moves a decided (or timed-out) control point out of the active set
    /// and into history, completing the "never both, never neither"
    /// invariant's handoff.
    pub fn archive_control_point(&mut self, control_point_id: &ControlPointId) -> Result<(), OrchestratorError> {
        let control_point = self
            .active_control_points
            .remove(control_point_id)
            .ok_or_else(|| OrchestratorError::not_found(format!("control point {control_point_id} is not active")))?;
        let stage = control_point.stage;
        self.control_point_history.push(control_point);
        self.record(PipelineAggregateEvent::ControlPointArchived(ControlPointArchived {
            pipeline_id: self.context.pipeline_id.clone(),
            control_point_id: control_point_id.clone(),
            stage,
        }));
        Ok(())
    }

    /// Marks an overdue pending control point `TimedOut` without archiving
    /// it — archival happens on the next CPM sweep, same as a decided one.
    pub fn record_timeout(&mut self, control_point_id: &ControlPointId) -> Result<(), OrchestratorError> {
        let control_point = self
            .active_control_points
            .get_mut(control_point_id)
            .ok_or_else(|| OrchestratorError::not_found(format!("control point {control_point_id} is not active")))?;
        control_point.status = ControlPointStatus::TimedOut;
        Ok(())
    }

    pub fn complete(&mut self) {
        self.context.advance_to(Stage::Completion);
        self.record(PipelineAggregateEvent::Completed(PipelineCompleted {
            pipeline_id: self.context.pipeline_id.clone(),
            history_length: self.control_point_history.len(),
        }));
    }

    pub fn reject(&mut self, reason: impl Into<String>) {
        let stage = self.context.current_stage;
        self.context.mark_rejected();
        self.record(PipelineAggregateEvent::Rejected(PipelineRejected {
            pipeline_id: self.context.pipeline_id.clone(),
            stage,
            reason: reason.into(),
        }));
    }

    pub fn fail(&mut self, error: &OrchestratorError) {
        let stage = self.context.current_stage;
        self.context.mark_failed();
        self.record(PipelineAggregateEvent::Failed(PipelineFailed {
            pipeline_id: self.context.pipeline_id.clone(),
            stage,
            error_kind: error.category().to_string(),
            error_message: error.to_string(),
        }));
    }

    pub fn cancel(&mut self) {
        let stage = self.context.current_stage;
        self.context.mark_cancelled();
        self.record(PipelineAggregateEvent::Cancelled(PipelineCancelled {
            pipeline_id: self.context.pipeline_id.clone(),
            stage,
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sequence() -> Vec<Stage> {
        vec![Stage::Reception, Stage::Validation, Stage::QualityCheck, Stage::Completion]
    }

    #[test]
    fn create_raises_a_single_created_event() {
        let aggregate = PipelineAggregate::create("run", sequence(), HashMap::new());
        assert_eq!(aggregate.uncommitted_events().len(), 1);
        assert_eq!(aggregate.version(), 1);
    }

    #[test]
    fn control_point_moves_from_active_to_history_on_archive() {
        let mut aggregate = PipelineAggregate::create("run", sequence(), HashMap::new());
        let cp_id = aggregate
            .create_control_point(Stage::Reception, None, Duration::from_secs(30))
            .unwrap();
        assert!(aggregate.active_control_points().contains_key(&cp_id));
        aggregate.archive_control_point(&cp_id).unwrap();
        assert!(!aggregate.active_control_points().contains_key(&cp_id));
        assert_eq!(aggregate.control_point_history().len(), 1);
    }

    #[test]
    fn duplicate_control_point_for_same_stage_is_rejected() {
        let mut aggregate = PipelineAggregate::create("run", sequence(), HashMap::new());
        aggregate
            .create_control_point(Stage::Reception, None, Duration::from_secs(30))
            .unwrap();
        let result = aggregate.create_control_point(Stage::Reception, None, Duration::from_secs(30));
        assert!(result.is_err());
    }

    #[test]
    fn decision_on_an_already_decided_control_point_fails() {
        let mut aggregate = PipelineAggregate::create("run", sequence(), HashMap::new());
        let cp_id = aggregate
            .create_control_point(Stage::UserReview, None, Duration::from_secs(30))
            .unwrap();
        aggregate
            .submit_decision(&cp_id, DecisionType::Approve, Some("alice".into()))
            .unwrap();
        let result = aggregate.submit_decision(&cp_id, DecisionType::Approve, Some("alice".into()));
        assert!(result.is_err());
    }

    #[test]
    fn quality_issues_detected_raises_an_ad_hoc_review() {
        let mut aggregate = PipelineAggregate::create("run", sequence(), HashMap::new());
        let detecting = ControlPointId::new();
        let review_id = aggregate.detect_quality_issues(detecting.clone(), "high", None, Duration::from_secs(60));
        let review = aggregate.active_control_points().get(&review_id).unwrap();
        assert_eq!(review.parent_control_point, Some(detecting));
        assert!(review.requires_decision);
    }

    #[test]
    fn replaying_events_reproduces_terminal_status() {
        let mut aggregate = PipelineAggregate::create("run", sequence(), HashMap::new());
        aggregate.complete();
        let events = aggregate.uncommitted_events().to_vec();
        let replayed = PipelineAggregate::from_events(events).unwrap();
        assert_eq!(replayed.context().status, aggregate.context().status);
        assert_eq!(replayed.context().current_stage, Stage::Completion);
    }
}
