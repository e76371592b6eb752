// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Start Pipeline Use Case
//!
//! Opens a pipeline's first control point: `QUALITY_CHECK` if input has
//! already been staged for it, `RECEPTION` otherwise.

use std::sync::Arc;

use pipeline_orchestrator_domain::value_objects::Stage;
use pipeline_orchestrator_domain::{ControlPointId, OrchestratorError, PipelineId, StagingHandle};

use crate::infrastructure::ControlPointManager;

pub struct StartPipelineUseCase {
    cpm: Arc<ControlPointManager>,
}

impl StartPipelineUseCase {
    pub fn new(cpm: Arc<ControlPointManager>) -> Self {
        Self { cpm }
    }

    pub async fn execute(
        &self,
        pipeline_id: &PipelineId,
        staged_input: Option<StagingHandle>,
    ) -> Result<ControlPointId, OrchestratorError> {
        let first_stage = if staged_input.is_some() { Stage::QualityCheck } else { Stage::Reception };
        self.cpm.create_control_point(pipeline_id, first_stage, staged_input).await
    }
}
