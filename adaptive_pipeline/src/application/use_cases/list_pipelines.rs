// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # List Pipelines Use Case
//!
//! Read-only view over every pipeline currently held by the control-point
//! manager. `user` is accepted for parity with the front-door signature but
//! unused — there is no per-user pipeline ownership in this design, every
//! caller sees every in-flight pipeline.

use std::sync::Arc;

use pipeline_orchestrator_domain::PipelineContext;

use crate::infrastructure::ControlPointManager;

pub struct ListPipelinesUseCase {
    cpm: Arc<ControlPointManager>,
}

impl ListPipelinesUseCase {
    pub fn new(cpm: Arc<ControlPointManager>) -> Self {
        Self { cpm }
    }

    pub async fn execute(&self, _user: Option<&str>) -> Vec<PipelineContext> {
        self.cpm.list().await
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
    use pipeline_orchestrator_domain::{ComponentIdentifier, Message, MessageId, OrchestratorError, Subscription};
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
    async fn execute_lists_every_pipeline() {
        let cpm = Arc::new(ControlPointManager::new(
            ControlPointConfig::default(),
            Arc::new(NoopBroker),
            Arc::new(OrchestratorMetrics::new().unwrap()),
        ));
        cpm.create_pipeline("a", vec![Stage::Reception], HashMap::new()).await.unwrap();
        cpm.create_pipeline("b", vec![Stage::Reception], HashMap::new()).await.unwrap();

        let use_case = ListPipelinesUseCase::new(Arc::clone(&cpm));
        assert_eq!(use_case.execute(None).await.len(), 2);
    }
}
