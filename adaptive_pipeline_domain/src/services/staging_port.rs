// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Staging Port
//!
//! A scoped content store: each stage's output is written under a stable
//! [`StagingHandle`] so the next stage can consume it without re-fetching
//! from the origin. The domain only sees the entry's metadata
//! ([`StagingEntry`]) and an opaque payload `Vec<u8>`; where and how bytes
//! are actually persisted is an infrastructure decision.

use async_trait::async_trait;

use crate::entities::StagingEntry;
use crate::error::OrchestratorError;
use crate::value_objects::{PipelineId, Stage, StagingHandle};

#[async_trait]
pub trait StagingPort: Send + Sync {
    /// First store for a given `(pipeline_id, stage)` wins; a second store
    /// for the same pair is an error, not an overwrite.
    async fn store(
        &self,
        stage: Stage,
        pipeline_id: PipelineId,
        owner_component: String,
        payload: Vec<u8>,
        format_declared: bool,
    ) -> Result<StagingHandle, OrchestratorError>;

    /// Returns the payload if `requester` is in `granted_to` and the entry
    /// is still `STORED`; `ACCESS_DENIED` and `NOT_FOUND` are both surfaced
    /// as [`OrchestratorError`] rather than as `Option`/`bool` so callers
    /// can't confuse "denied" with "never existed".
    async fn retrieve(&self, handle: &StagingHandle, requester: &str) -> Result<Vec<u8>, OrchestratorError>;

    /// Grants access explicitly; there is no ambient access beyond the
    /// storing component itself.
    async fn grant(&self, handle: &StagingHandle, component: String) -> Result<(), OrchestratorError>;

    /// Removes the payload and entry. Deleting an unknown handle is not an
    /// error.
    async fn delete(&self, handle: &StagingHandle) -> Result<(), OrchestratorError>;

    async fn entry(&self, handle: &StagingHandle) -> Result<Option<StagingEntry>, OrchestratorError>;
}
