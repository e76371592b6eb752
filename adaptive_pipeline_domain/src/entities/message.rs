// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Message
//!
//! The one kind of thing that ever crosses a component boundary. `target` is
//! the dotted tag a [`crate::entities::Subscription`] pattern is matched
//! against; `correlation_id` equals the owning pipeline's id for every
//! message belonging to that pipeline.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::value_objects::{MessageId, PipelineId};

/// Closed set of message kinds. Stage-specific completion/error traffic
/// (`<department>.<stage>.complete`, `<department>.<stage>.error`) is
/// distinguished by `target`, not by a dedicated variant per department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageType {
    ControlPointReached,
    UserDecisionSubmitted,
    StageComplete,
    StageError,
    QualityIssuesDetected,
    StagingDeleteComplete,
    RouteError,
    Error,
    StatusUpdate,
    Cancel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub message_id: MessageId,
    pub message_type: MessageType,
    /// Dotted tag of the publishing component.
    pub source: String,
    /// Dotted tag (or pattern-matchable address) the broker routes against.
    pub target: String,
    pub content: serde_json::Value,
    pub correlation_id: PipelineId,
    pub metadata: HashMap<String, String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Message {
    pub fn new(
        message_type: MessageType,
        source: impl Into<String>,
        target: impl Into<String>,
        content: serde_json::Value,
        correlation_id: PipelineId,
    ) -> Self {
        Self {
            message_id: MessageId::new(),
            message_type,
            source: source.into(),
            target: target.into(),
            content,
            correlation_id,
            metadata: HashMap::new(),
            created_at: chrono::Utc::now(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_message_carries_correlation_id() {
        let pipeline_id = PipelineId::new();
        let msg = Message::new(
            MessageType::ControlPointReached,
            "cpm",
            "quality.manager.abc123",
            serde_json::json!({"control_point_id": "x"}),
            pipeline_id.clone(),
        );
        assert_eq!(msg.correlation_id, pipeline_id);
    }

    #[test]
    fn with_metadata_is_additive() {
        let msg = Message::new(
            MessageType::StatusUpdate,
            "cpm",
            "pipeline_service",
            serde_json::Value::Null,
            PipelineId::new(),
        )
        .with_metadata("stage", "QUALITY_CHECK")
        .with_metadata("attempt", "1");
        assert_eq!(msg.metadata.get("stage").map(String::as_str), Some("QUALITY_CHECK"));
        assert_eq!(msg.metadata.len(), 2);
    }
}
