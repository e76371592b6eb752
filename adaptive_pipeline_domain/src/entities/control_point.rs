// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Control Point
//!
//! One stage's gate within a pipeline. A control point is always in exactly
//! one of two places: the Control-Point Manager's `active_control_points`
//! map, or a pipeline's `control_point_history` — never both, never neither
//! (see [`crate::aggregates::PipelineAggregate`] for the invariant check).

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::value_objects::{ControlPointId, Department, PipelineId, Stage, StagingHandle};

/// Outcome carried by an inbound `USER_DECISION_SUBMITTED` message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DecisionType {
    Approve,
    /// `rework_stage` must be an earlier stage per
    /// [`crate::value_objects::predecessors`].
    Rework { rework_stage: Stage },
    Reject { reason: String },
}

/// One applied decision, appended to a control point's log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    pub decision_type: DecisionType,
    pub decided_at: chrono::DateTime<chrono::Utc>,
    pub decided_by: Option<String>,
}

impl Decision {
    pub fn new(decision_type: DecisionType, decided_by: Option<String>) -> Self {
        Self {
            decision_type,
            decided_at: chrono::Utc::now(),
            decided_by,
        }
    }
}

/// Lifecycle state of a control point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlPointStatus {
    Pending,
    Approved,
    ReworkRequested,
    Rejected,
    TimedOut,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlPoint {
    pub id: ControlPointId,
    pub pipeline_id: PipelineId,
    pub stage: Stage,
    pub department: Department,
    /// Dotted tag of the component this control point's `CONTROL_POINT_REACHED`
    /// message was (or will be) addressed to.
    pub assigned_module: String,
    pub status: ControlPointStatus,
    pub requires_decision: bool,
    /// Handle into Staging for the artifact this stage will consume, if any.
    pub staging_reference: Option<StagingHandle>,
    /// Set when this control point was created ad hoc from a
    /// `QUALITY_ISSUES_DETECTED` event rather than a normal transition.
    pub parent_control_point: Option<ControlPointId>,
    pub decisions: Vec<Decision>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub timeout: Duration,
}

impl ControlPoint {
    pub fn new(
        pipeline_id: PipelineId,
        stage: Stage,
        staging_reference: Option<StagingHandle>,
        timeout: Duration,
    ) -> Self {
        let department = stage.department();
        Self {
            id: ControlPointId::new(),
            pipeline_id,
            stage,
            department,
            assigned_module: format!("{department}.manager"),
            status: ControlPointStatus::Pending,
            requires_decision: stage == Stage::UserReview,
            staging_reference,
            parent_control_point: None,
            decisions: Vec::new(),
            created_at: chrono::Utc::now(),
            timeout,
        }
    }

    /// Ad-hoc `USER_REVIEW` control point raised mid-stream by
    /// `QUALITY_ISSUES_DETECTED` on `detecting_stage`.
    pub fn new_review(
        pipeline_id: PipelineId,
        detecting_stage: ControlPointId,
        staging_reference: Option<StagingHandle>,
        timeout: Duration,
    ) -> Self {
        let mut cp = Self::new(pipeline_id, Stage::UserReview, staging_reference, timeout);
        cp.parent_control_point = Some(detecting_stage);
        cp
    }

    pub fn is_overdue(&self, now: chrono::DateTime<chrono::Utc>) -> bool {
        matches!(self.status, ControlPointStatus::Pending)
            && now.signed_duration_since(self.created_at).to_std().unwrap_or_default() > self.timeout
    }

    pub fn apply_decision(&mut self, decision: Decision) {
        self.status = match &decision.decision_type {
            DecisionType::Approve => ControlPointStatus::Approved,
            DecisionType::Rework { .. } => ControlPointStatus::ReworkRequested,
            DecisionType::Reject { .. } => ControlPointStatus::Rejected,
        };
        self.decisions.push(decision);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_review_stage_always_requires_decision() {
        let cp = ControlPoint::new(PipelineId::new(), Stage::UserReview, None, Duration::from_secs(60));
        assert!(cp.requires_decision);
    }

    #[test]
    fn non_review_stage_does_not_require_decision() {
        let cp = ControlPoint::new(PipelineId::new(), Stage::QualityCheck, None, Duration::from_secs(60));
        assert!(!cp.requires_decision);
    }

    #[test]
    fn overdue_detects_elapsed_timeout() {
        let mut cp = ControlPoint::new(PipelineId::new(), Stage::Reception, None, Duration::from_secs(0));
        cp.created_at = chrono::Utc::now() - chrono::Duration::seconds(5);
        assert!(cp.is_overdue(chrono::Utc::now()));
    }

    #[test]
    fn apply_decision_updates_status_and_log() {
        let mut cp = ControlPoint::new(PipelineId::new(), Stage::QualityCheck, None, Duration::from_secs(60));
        cp.apply_decision(Decision::new(DecisionType::Approve, Some("alice".into())));
        assert_eq!(cp.status, ControlPointStatus::Approved);
        assert_eq!(cp.decisions.len(), 1);
    }

    #[test]
    fn review_control_point_tracks_its_parent() {
        let parent = ControlPointId::new();
        let cp = ControlPoint::new_review(PipelineId::new(), parent.clone(), None, Duration::from_secs(60));
        assert_eq!(cp.parent_control_point, Some(parent));
        assert!(cp.requires_decision);
    }
}
