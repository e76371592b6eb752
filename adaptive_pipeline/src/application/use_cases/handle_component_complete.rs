// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Handle Component Complete Use Case
//!
//! Subscribed to `<department>.<stage>.complete`, `<department>.<stage>.error`,
//! and `quality.issues.detected`. This is the only place a processor's
//! outcome re-enters the control-point state machine — everything else about
//! a processor is opaque to this crate.

use std::sync::Arc;

use async_trait::async_trait;
use pipeline_orchestrator_domain::entities::{Message, MessageType};
use pipeline_orchestrator_domain::services::MessageCallback;
use pipeline_orchestrator_domain::{ControlPointId, OrchestratorError, StagingHandle};

use crate::infrastructure::ControlPointManager;

pub struct HandleComponentCompleteUseCase {
    cpm: Arc<ControlPointManager>,
}

impl HandleComponentCompleteUseCase {
    pub fn new(cpm: Arc<ControlPointManager>) -> Self {
        Self { cpm }
    }

    fn field<'a>(message: &'a Message, key: &str) -> Result<&'a str, OrchestratorError> {
        message
            .content
            .get(key)
            .and_then(|v| v.as_str())
            .ok_or_else(|| OrchestratorError::validation_error(format!("message is missing field `{key}`")))
    }

    async fn handle_stage_complete(&self, message: &Message) -> Result<(), OrchestratorError> {
        let control_point_id: ControlPointId = Self::field(message, "control_point_id")?.parse()?;
        let staged_output: StagingHandle = Self::field(message, "staged_output_id")?.parse()?;
        self.cpm.complete_stage(&message.correlation_id, &control_point_id, staged_output).await
    }

    async fn handle_stage_error(&self, message: &Message) -> Result<(), OrchestratorError> {
        let control_point_id: ControlPointId = Self::field(message, "control_point_id")?.parse()?;
        let error_kind = Self::field(message, "error_kind")?;
        let error_message = Self::field(message, "error_message")?;
        self.cpm
            .record_processor_error(&message.correlation_id, &control_point_id, error_kind, error_message)
            .await
    }

    async fn handle_quality_issues_detected(&self, message: &Message) -> Result<(), OrchestratorError> {
        let detecting_control_point: ControlPointId = Self::field(message, "control_point_id")?.parse()?;
        let severity = Self::field(message, "severity")?.to_string();
        let staging_reference = message
            .content
            .get("staging_reference")
            .and_then(|v| v.as_str())
            .map(str::parse)
            .transpose()?;
        self.cpm
            .detect_quality_issues(&message.correlation_id, detecting_control_point, severity, staging_reference)
            .await
            .map(|_| ())
    }
}

#[async_trait]
impl MessageCallback for HandleComponentCompleteUseCase {
    async fn handle(&self, message: Message) -> Result<(), OrchestratorError> {
        match message.message_type {
            MessageType::StageComplete => self.handle_stage_complete(&message).await,
            MessageType::StageError => self.handle_stage_error(&message).await,
            MessageType::QualityIssuesDetected => self.handle_quality_issues_detected(&message).await,
            other => Err(OrchestratorError::validation_error(format!(
                "handle_component_complete does not subscribe to {other:?}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::ControlPointConfig;
    use crate::infrastructure::metrics::OrchestratorMetrics;
    use pipeline_orchestrator_domain::services::MessageBrokerPort;
    use pipeline_orchestrator_domain::value_objects::Stage;
    use pipeline_orchestrator_domain::{ComponentIdentifier, MessageId, PipelineId, Subscription};
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
    async fn stage_complete_advances_the_pipeline() {
        let cpm = manager();
        let pipeline_id = cpm
            .create_pipeline("run", vec![Stage::Reception, Stage::Validation], HashMap::new())
            .await
            .unwrap();
        let cp_id = cpm.create_control_point(&pipeline_id, Stage::Reception, None).await.unwrap();

        let staged_output = StagingHandle::new();
        let message = Message::new(
            MessageType::StageComplete,
            "reception.worker.1",
            "pipeline_service",
            serde_json::json!({
                "control_point_id": cp_id.to_string(),
                "staged_output_id": staged_output.to_string(),
            }),
            pipeline_id.clone(),
        );

        let use_case = HandleComponentCompleteUseCase::new(Arc::clone(&cpm));
        use_case.handle(message).await.unwrap();

        let status = cpm.status(&pipeline_id).await.unwrap();
        assert_eq!(status.current_stage, Stage::Validation);
    }

    #[tokio::test]
    async fn stage_error_is_recorded_against_the_control_point() {
        let cpm = Arc::new(ControlPointManager::new(
            ControlPointConfig { timeout_secs: 3600, max_retries: 1, review_loop_limit: 3, monitor_interval_secs: 3600 },
            Arc::new(NoopBroker),
            Arc::new(OrchestratorMetrics::new().unwrap()),
        ));
        let pipeline_id = cpm.create_pipeline("run", vec![Stage::Reception], HashMap::new()).await.unwrap();
        let cp_id = cpm.create_control_point(&pipeline_id, Stage::Reception, None).await.unwrap();

        let message = Message::new(
            MessageType::StageError,
            "reception.worker.1",
            "pipeline_service",
            serde_json::json!({
                "control_point_id": cp_id.to_string(),
                "error_kind": "processor_error",
                "error_message": "boom",
            }),
            pipeline_id.clone(),
        );

        let use_case = HandleComponentCompleteUseCase::new(Arc::clone(&cpm));
        use_case.handle(message.clone()).await.unwrap();
        use_case.handle(message).await.unwrap();

        let status = cpm.status(&pipeline_id).await.unwrap();
        assert_eq!(status.status, pipeline_orchestrator_domain::entities::PipelineStatus::Failed);
    }

    #[tokio::test]
    async fn missing_field_is_rejected() {
        let cpm = manager();
        let use_case = HandleComponentCompleteUseCase::new(cpm);
        let message = Message::new(
            MessageType::StageComplete,
            "reception.worker.1",
            "pipeline_service",
            serde_json::json!({}),
            PipelineId::new(),
        );
        assert!(use_case.handle(message).await.is_err());
    }
}
