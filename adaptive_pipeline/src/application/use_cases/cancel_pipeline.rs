// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Cancel Pipeline Use Case
//!
//! Best-effort cancellation per the concurrency model: marks the pipeline
//! `CANCELLED` and notifies subscribers of that `correlation_id`, but a
//! processor that already committed side effects is allowed to finish — its
//! late completion message is simply dropped by the handler on the other
//! side, not suppressed here.

use std::sync::Arc;

use pipeline_orchestrator_domain::{OrchestratorError, PipelineId};

use crate::infrastructure::ControlPointManager;

pub struct CancelPipelineUseCase {
    cpm: Arc<ControlPointManager>,
}

impl CancelPipelineUseCase {
    pub fn new(cpm: Arc<ControlPointManager>) -> Self {
        Self { cpm }
    }

    pub async fn execute(&self, pipeline_id: &PipelineId) -> Result<(), OrchestratorError> {
        self.cpm.cancel(pipeline_id).await
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

    #[tokio::test]
    async fn execute_marks_the_pipeline_cancelled() {
        let cpm = Arc::new(ControlPointManager::new(
            ControlPointConfig::default(),
            Arc::new(NoopBroker),
            Arc::new(OrchestratorMetrics::new().unwrap()),
        ));
        let pipeline_id = cpm
            .create_pipeline("run", vec![Stage::Reception], HashMap::new())
            .await
            .unwrap();

        let use_case = CancelPipelineUseCase::new(Arc::clone(&cpm));
        use_case.execute(&pipeline_id).await.unwrap();

        let status = cpm.status(&pipeline_id).await.unwrap();
        assert_eq!(status.status, pipeline_orchestrator_domain::entities::PipelineStatus::Cancelled);
    }

    #[tokio::test]
    async fn execute_on_an_unknown_pipeline_is_not_found() {
        let cpm = Arc::new(ControlPointManager::new(
            ControlPointConfig::default(),
            Arc::new(NoopBroker),
            Arc::new(OrchestratorMetrics::new().unwrap()),
        ));
        let use_case = CancelPipelineUseCase::new(cpm);
        assert!(use_case.execute(&PipelineId::new()).await.is_err());
    }
}
