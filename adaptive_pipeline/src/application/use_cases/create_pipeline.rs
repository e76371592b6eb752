// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Create Pipeline Use Case
//!
//! Validates a pipeline configuration, creates the aggregate, and starts it
//! at its first stage in one step, composing
//! [`crate::application::use_cases::start_pipeline::StartPipelineUseCase`]
//! rather than duplicating its stage-advancement logic.

use std::collections::HashMap;
use std::sync::Arc;

use pipeline_orchestrator_domain::value_objects::Stage;
use pipeline_orchestrator_domain::{ControlPointId, OrchestratorError, PipelineId};

use crate::application::use_cases::start_pipeline::StartPipelineUseCase;
use crate::infrastructure::ControlPointManager;

/// Caller-supplied configuration for a new pipeline run.
pub struct PipelineConfig {
    pub name: String,
    pub stage_sequence: Vec<Stage>,
    pub metadata: HashMap<String, String>,
}

impl PipelineConfig {
    fn validate(&self) -> Result<(), OrchestratorError> {
        if self.name.trim().is_empty() {
            return Err(OrchestratorError::validation_error("pipeline name must not be empty"));
        }
        if self.stage_sequence.is_empty() {
            return Err(OrchestratorError::validation_error("stage_sequence must not be empty"));
        }
        Ok(())
    }
}

pub struct CreatePipelineUseCase {
    cpm: Arc<ControlPointManager>,
    start: StartPipelineUseCase,
}

impl CreatePipelineUseCase {
    pub fn new(cpm: Arc<ControlPointManager>) -> Self {
        let start = StartPipelineUseCase::new(Arc::clone(&cpm));
        Self { cpm, start }
    }

    pub async fn execute(
        &self,
        config: PipelineConfig,
        _user: Option<&str>,
    ) -> Result<(PipelineId, ControlPointId), OrchestratorError> {
        config.validate()?;
        let pipeline_id = self.cpm.create_pipeline(config.name, config.stage_sequence, config.metadata).await?;
        let control_point_id = self.start.execute(&pipeline_id, None).await?;
        Ok((pipeline_id, control_point_id))
    }
}
