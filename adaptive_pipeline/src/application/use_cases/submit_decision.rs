// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Submit Decision Use Case
//!
//! The human side of a `USER_REVIEW` gate: forwards an approve/rework/reject
//! decision to the control-point manager. Decisions for a non-review control
//! point are rejected here rather than inside the aggregate, so the error
//! names the actual caller-facing mistake ("this stage never paused for a
//! decision") instead of a generic invariant failure.

use std::sync::Arc;

use pipeline_orchestrator_domain::entities::{ControlPointStatus, DecisionType};
use pipeline_orchestrator_domain::{ControlPointId, OrchestratorError, PipelineId};

use crate::infrastructure::ControlPointManager;

pub struct SubmitDecisionUseCase {
    cpm: Arc<ControlPointManager>,
}

impl SubmitDecisionUseCase {
    pub fn new(cpm: Arc<ControlPointManager>) -> Self {
        Self { cpm }
    }

    pub async fn execute(
        &self,
        pipeline_id: &PipelineId,
        control_point_id: &ControlPointId,
        decision_type: DecisionType,
        decided_by: Option<String>,
    ) -> Result<(), OrchestratorError> {
        let (active, _history) = self.cpm.control_points(pipeline_id).await?;
        let control_point = active
            .iter()
            .find(|cp| &cp.id == control_point_id)
            .ok_or_else(|| OrchestratorError::not_found(format!("control point {control_point_id} is not active")))?;

        if !control_point.requires_decision {
            return Err(OrchestratorError::validation_error(format!(
                "control point {control_point_id} at stage {} never waits on a decision",
                control_point.stage
            )));
        }
        if control_point.status != ControlPointStatus::Pending {
            return Err(OrchestratorError::invariant_violation(format!(
                "control point {control_point_id} already has status {:?}",
                control_point.status
            )));
        }

        self.cpm.process_decision(pipeline_id, control_point_id, decision_type, decided_by).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::ControlPointConfig;
    use crate::infrastructure::metrics::OrchestratorMetrics;
    use async_trait::async_trait;
    use pipeline_orchestrator_domain::services::{MessageBrokerPort, MessageCallback};
    use pipeline_orchestrator_domain::value_objects::Stage;
    use pipeline_orchestrator_domain::{ComponentIdentifier, Message, MessageId, Subscription};
    use std::collections::HashMap;

    struct NoopBroker;

    #[async_trait]
    impl MessageBrokerPort for NoopBroker {
        async fn register(&self, _component: ComponentIdentifier) -> Result<(), OrchestratorError> {
            Ok(())
        }
        async fn subscribe(&self, _subscription: Subscription, _callback: Arc<dyn MessageCallback>) -> Result<(), OrchestratorError> {
            Ok(())
        }
        async fn publish(&self, message: Message) -> Result<MessageId, OrchestratorError> {
            Ok(message.message_id)
        }
        async fn shutdown(&self) -> Result<(), OrchestratorError> {
            Ok(())
        }
    }

    fn manager() -> Arc<ControlPointManager> {
        Arc::new(ControlPointManager::new(
            ControlPointConfig::default(),
            Arc::new(NoopBroker),
            Arc::new(OrchestratorMetrics::new().unwrap()),
        ))
    }

    #[tokio::test]
    async fn decision_on_a_non_review_stage_is_rejected() {
        let cpm = manager();
        let pipeline_id = cpm
            .create_pipeline("run", vec![Stage::Reception], HashMap::new())
            .await
            .unwrap();
        let cp_id = cpm.create_control_point(&pipeline_id, Stage::Reception, None).await.unwrap();

        let use_case = SubmitDecisionUseCase::new(Arc::clone(&cpm));
        let result = use_case.execute(&pipeline_id, &cp_id, DecisionType::Approve, Some("alice".into())).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn decision_on_a_review_stage_advances_the_pipeline() {
        let cpm = manager();
        let pipeline_id = cpm
            .create_pipeline("run", vec![Stage::UserReview, Stage::Completion], HashMap::new())
            .await
            .unwrap();
        let cp_id = cpm.create_control_point(&pipeline_id, Stage::UserReview, None).await.unwrap();

        let use_case = SubmitDecisionUseCase::new(Arc::clone(&cpm));
        use_case.execute(&pipeline_id, &cp_id, DecisionType::Approve, Some("alice".into())).await.unwrap();

        let status = cpm.status(&pipeline_id).await.unwrap();
        assert_ne!(status.current_stage, Stage::UserReview);
    }
}
