// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Pipeline Domain Events
//!
//! Concrete [`EventPayload`] implementations, wrapped in [`DomainEvent`] by
//! callers that need correlation/causation tracking (e.g. an optional
//! event-store collaborator). The core's own control flow does not require
//! these — it reacts to [`crate::entities::Message`] traffic on the broker
//! — but they give that collaborator a typed, versioned audit trail.

use serde::{Deserialize, Serialize};

use super::generic_event::{EventCategory, EventPayload};
use crate::value_objects::{ControlPointId, PipelineId, Stage};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineCreated {
    pub pipeline_id: PipelineId,
    pub name: String,
    pub stage_sequence: Vec<Stage>,
}

impl EventPayload for PipelineCreated {
    fn event_name(&self) -> &'static str {
        "PipelineCreated"
    }

    fn event_category(&self) -> EventCategory {
        EventCategory::Pipeline
    }

    fn validate(&self) -> Result<(), String> {
        if self.stage_sequence.is_empty() {
            Err("stage_sequence must not be empty".to_string())
        } else {
            Ok(())
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlPointCreated {
    pub pipeline_id: PipelineId,
    pub control_point_id: ControlPointId,
    pub stage: Stage,
}

impl EventPayload for ControlPointCreated {
    fn event_name(&self) -> &'static str {
        "ControlPointCreated"
    }

    fn event_category(&self) -> EventCategory {
        EventCategory::Pipeline
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlPointArchived {
    pub pipeline_id: PipelineId,
    pub control_point_id: ControlPointId,
    pub stage: Stage,
}

impl EventPayload for ControlPointArchived {
    fn event_name(&self) -> &'static str {
        "ControlPointArchived"
    }

    fn event_category(&self) -> EventCategory {
        EventCategory::Pipeline
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionSubmitted {
    pub pipeline_id: PipelineId,
    pub control_point_id: ControlPointId,
    pub decision_summary: String,
}

impl EventPayload for DecisionSubmitted {
    fn event_name(&self) -> &'static str {
        "DecisionSubmitted"
    }

    fn event_category(&self) -> EventCategory {
        EventCategory::Processing
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityIssuesDetected {
    pub pipeline_id: PipelineId,
    pub detecting_control_point: ControlPointId,
    pub severity: String,
}

impl EventPayload for QualityIssuesDetected {
    fn event_name(&self) -> &'static str {
        "QualityIssuesDetected"
    }

    fn event_category(&self) -> EventCategory {
        EventCategory::Processing
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineCompleted {
    pub pipeline_id: PipelineId,
    pub history_length: usize,
}

impl EventPayload for PipelineCompleted {
    fn event_name(&self) -> &'static str {
        "PipelineCompleted"
    }

    fn event_category(&self) -> EventCategory {
        EventCategory::Pipeline
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineRejected {
    pub pipeline_id: PipelineId,
    pub stage: Stage,
    pub reason: String,
}

impl EventPayload for PipelineRejected {
    fn event_name(&self) -> &'static str {
        "PipelineRejected"
    }

    fn event_category(&self) -> EventCategory {
        EventCategory::Pipeline
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineFailed {
    pub pipeline_id: PipelineId,
    pub stage: Stage,
    pub error_kind: String,
    pub error_message: String,
}

impl EventPayload for PipelineFailed {
    fn event_name(&self) -> &'static str {
        "PipelineFailed"
    }

    fn event_category(&self) -> EventCategory {
        EventCategory::Pipeline
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineCancelled {
    pub pipeline_id: PipelineId,
    pub stage: Stage,
}

impl EventPayload for PipelineCancelled {
    fn event_name(&self) -> &'static str {
        "PipelineCancelled"
    }

    fn event_category(&self) -> EventCategory {
        EventCategory::Pipeline
    }
}

/// Sum type over every concrete event the [`crate::aggregates::PipelineAggregate`]
/// raises. Kept separate from [`super::generic_event::DomainEvent`] — that
/// envelope is for an external event-store collaborator; the aggregate's own
/// uncommitted-event log just needs the payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineAggregateEvent {
    Created(PipelineCreated),
    ControlPointCreated(ControlPointCreated),
    ControlPointArchived(ControlPointArchived),
    DecisionSubmitted(DecisionSubmitted),
    QualityIssuesDetected(QualityIssuesDetected),
    Completed(PipelineCompleted),
    Rejected(PipelineRejected),
    Failed(PipelineFailed),
    Cancelled(PipelineCancelled),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::generic_event::DomainEvent;

    #[test]
    fn pipeline_created_rejects_empty_sequence() {
        let payload = PipelineCreated {
            pipeline_id: PipelineId::new(),
            name: "run".to_string(),
            stage_sequence: vec![],
        };
        assert!(payload.validate().is_err());
    }

    #[test]
    fn wrapping_in_domain_event_assigns_metadata() {
        let payload = PipelineCompleted {
            pipeline_id: PipelineId::new(),
            history_length: 7,
        };
        let event = DomainEvent::new(payload).with_metadata("source".to_string(), "cpm".to_string());
        assert_eq!(event.payload.history_length, 7);
        assert_eq!(event.metadata.get("source").map(String::as_str), Some("cpm"));
    }
}
