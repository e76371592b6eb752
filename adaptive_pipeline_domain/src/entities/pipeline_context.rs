// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Pipeline Context
//!
//! The top-level state object for one pipeline run. Created on submission,
//! mutated only by the Control-Point Manager, and retained for a grace
//! period after it reaches a terminal status.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::value_objects::{predecessors, PipelineId, Stage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineStatus {
    Pending,
    Running,
    AwaitingDecision,
    Rejected,
    Failed,
    Completed,
    Cancelled,
}

impl PipelineStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            PipelineStatus::Rejected | PipelineStatus::Failed | PipelineStatus::Completed | PipelineStatus::Cancelled
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineContext {
    pub pipeline_id: PipelineId,
    pub name: String,
    pub current_stage: Stage,
    pub status: PipelineStatus,
    pub stage_sequence: Vec<Stage>,
    /// `stage -> predecessors`, derived once at creation from the static
    /// transition table.
    pub stage_dependencies: HashMap<Stage, Vec<Stage>>,
    /// `(stage) -> number of times a control point for that stage has been
    /// created`, used to enforce `review_loop_limit`/`max_retries`.
    pub retry_count: HashMap<Stage, u32>,
    pub metadata: HashMap<String, String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl PipelineContext {
    /// `stage_sequence` must be non-empty; `stage_dependencies` is derived
    /// from the global static transition table, independent of the caller's
    /// chosen sequence (see the Control-Point Manager's create-pipeline
    /// operation).
    pub fn new(name: impl Into<String>, stage_sequence: Vec<Stage>, metadata: HashMap<String, String>) -> Self {
        let stage_dependencies = stage_sequence
            .iter()
            .map(|&stage| (stage, predecessors(stage)))
            .collect();
        let now = chrono::Utc::now();
        Self {
            pipeline_id: PipelineId::new(),
            name: name.into(),
            current_stage: stage_sequence.first().copied().unwrap_or(Stage::Reception),
            status: PipelineStatus::Pending,
            stage_sequence,
            stage_dependencies,
            retry_count: HashMap::new(),
            metadata,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn advance_to(&mut self, stage: Stage) {
        self.current_stage = stage;
        self.status = if stage.is_terminal() {
            PipelineStatus::Completed
        } else {
            PipelineStatus::Running
        };
        *self.retry_count.entry(stage).or_insert(0) += 1;
        self.updated_at = chrono::Utc::now();
    }

    pub fn retry_count_for(&self, stage: Stage) -> u32 {
        self.retry_count.get(&stage).copied().unwrap_or(0)
    }

    pub fn mark_awaiting_decision(&mut self) {
        self.status = PipelineStatus::AwaitingDecision;
        self.updated_at = chrono::Utc::now();
    }

    pub fn mark_rejected(&mut self) {
        self.status = PipelineStatus::Rejected;
        self.updated_at = chrono::Utc::now();
    }

    pub fn mark_failed(&mut self) {
        self.status = PipelineStatus::Failed;
        self.updated_at = chrono::Utc::now();
    }

    pub fn mark_cancelled(&mut self) {
        self.status = PipelineStatus::Cancelled;
        self.updated_at = chrono::Utc::now();
    }
}
