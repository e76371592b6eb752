// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Pipeline Context Repository
//!
//! No persistence is required by the core — a `PipelineContext` lives in
//! memory for the lifetime of its run plus a grace period. This port exists
//! for an optional collaborator that snapshots contexts for restart; the
//! snapshot schema is exactly [`PipelineContext`] plus its archived
//! control-point history, which the caller supplies alongside it.

use async_trait::async_trait;

use crate::entities::{ControlPoint, PipelineContext};
use crate::error::OrchestratorError;
use crate::value_objects::PipelineId;

#[async_trait]
pub trait PipelineContextRepository: Send + Sync {
    async fn save(&self, context: &PipelineContext, history: &[ControlPoint]) -> Result<(), OrchestratorError>;

    async fn find_by_id(&self, id: PipelineId) -> Result<Option<(PipelineContext, Vec<ControlPoint>)>, OrchestratorError>;

    /// Contexts whose status is not yet terminal.
    async fn list_active(&self) -> Result<Vec<PipelineContext>, OrchestratorError>;

    /// Removes a snapshot once its grace period has elapsed. Deleting an
    /// unknown id is not an error.
    async fn delete(&self, id: PipelineId) -> Result<bool, OrchestratorError>;
}
