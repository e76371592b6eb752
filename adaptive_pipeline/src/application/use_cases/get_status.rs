// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Get Status Use Case
//!
//! Read-only view of a pipeline: `(current_stage, status, active_control_points[], history[])`
//! as named in the external-interfaces surface, served entirely from the
//! in-memory aggregate — no broker round-trip.

use std::sync::Arc;

use pipeline_orchestrator_domain::entities::{ControlPoint, PipelineStatus};
use pipeline_orchestrator_domain::value_objects::Stage;
use pipeline_orchestrator_domain::{OrchestratorError, PipelineId};

use crate::infrastructure::ControlPointManager;

#[derive(Debug, Clone)]
pub struct PipelineStatusView {
    pub pipeline_id: PipelineId,
    pub current_stage: Stage,
    pub status: PipelineStatus,
    pub active_control_points: Vec<ControlPoint>,
    pub history: Vec<ControlPoint>,
}

pub struct GetStatusUseCase {
    cpm: Arc<ControlPointManager>,
}

impl GetStatusUseCase {
    pub fn new(cpm: Arc<ControlPointManager>) -> Self {
        Self { cpm }
    }

    pub async fn execute(&self, pipeline_id: &PipelineId) -> Result<PipelineStatusView, OrchestratorError> {
        let context = self.cpm.status(pipeline_id).await?;
        let (active_control_points, history) = self.cpm.control_points(pipeline_id).await?;
        Ok(PipelineStatusView {
            pipeline_id: context.pipeline_id,
            current_stage: context.current_stage,
            status: context.status,
            active_control_points,
            history,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::ControlPointConfig;
    use crate::infrastructure::metrics::OrchestratorMetrics;
    use async_trait::async_trait;
    use pipeline_orchestrator_domain::services::{MessageBrokerPort, MessageCallback};
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

    #[tokio::test]
    async fn execute_reports_the_active_control_point() {
        let cpm = Arc::new(ControlPointManager::new(
            ControlPointConfig::default(),
            Arc::new(NoopBroker),
            Arc::new(OrchestratorMetrics::new().unwrap()),
        ));
        let pipeline_id = cpm
            .create_pipeline("run", vec![Stage::Reception], HashMap::new())
            .await
            .unwrap();
        cpm.create_control_point(&pipeline_id, Stage::Reception, None).await.unwrap();

        let use_case = GetStatusUseCase::new(Arc::clone(&cpm));
        let view = use_case.execute(&pipeline_id).await.unwrap();
        assert_eq!(view.current_stage, Stage::Reception);
        assert_eq!(view.active_control_points.len(), 1);
        assert!(view.history.is_empty());
    }
}
