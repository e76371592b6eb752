// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Staging Entry
//!
//! Exclusively owned by the Staging Manager. Keyed by `(pipeline_id, stage)`
//! for first-store-wins consistency; the opaque handle a consumer actually
//! holds is [`crate::value_objects::StagingHandle`], minted at store time and
//! threaded through `ControlPoint::staging_reference`.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

use crate::value_objects::{PipelineId, Stage, StagingHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StagingState {
    Pending,
    Stored,
    Released,
    Deleted,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagingEntry {
    pub handle: StagingHandle,
    pub stage: Stage,
    pub pipeline_id: PipelineId,
    /// Dotted tag of the component that stored this entry.
    pub owner_component: String,
    pub state: StagingState,
    pub size_bytes: u64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub retention: Duration,
    pub granted_to: HashSet<String>,
    /// `[0,1]`, computed at store time from three checks: non-null payload,
    /// `size_bytes > 0`, declared format present.
    pub quality_score: f64,
}

impl StagingEntry {
    pub fn new(
        stage: Stage,
        pipeline_id: PipelineId,
        owner_component: impl Into<String>,
        payload_non_null: bool,
        size_bytes: u64,
        format_declared: bool,
        retention: Duration,
    ) -> Self {
        let owner_component = owner_component.into();
        let mut granted_to = HashSet::new();
        granted_to.insert(owner_component.clone());

        let quality_score = Self::compute_quality_score(payload_non_null, size_bytes, format_declared);

        Self {
            handle: StagingHandle::new(),
            stage,
            pipeline_id,
            owner_component,
            state: StagingState::Stored,
            size_bytes,
            created_at: chrono::Utc::now(),
            retention,
            granted_to,
            quality_score,
        }
    }

    fn compute_quality_score(payload_non_null: bool, size_bytes: u64, format_declared: bool) -> f64 {
        let checks_passed = [payload_non_null, size_bytes > 0, format_declared]
            .iter()
            .filter(|&&b| b)
            .count();
        checks_passed as f64 / 3.0
    }

    pub fn is_expired(&self, now: chrono::DateTime<chrono::Utc>) -> bool {
        now.signed_duration_since(self.created_at).to_std().unwrap_or_default() > self.retention
    }

    pub fn grant(&mut self, component: impl Into<String>) {
        self.granted_to.insert(component.into());
    }

    pub fn can_retrieve(&self, requester: &str) -> bool {
        self.state == StagingState::Stored && self.granted_to.contains(requester)
    }

    pub fn mark_deleted(&mut self) {
        self.state = StagingState::Deleted;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_is_granted_access_by_default() {
        let entry = StagingEntry::new(
            Stage::QualityCheck,
            PipelineId::new(),
            "quality.processor.inst-1",
            true,
            1024,
            true,
            Duration::from_secs(3600),
        );
        assert!(entry.can_retrieve("quality.processor.inst-1"));
        assert!(!entry.can_retrieve("insight.processor.inst-1"));
    }

    #[test]
    fn grant_adds_a_new_retriever() {
        let mut entry = StagingEntry::new(
            Stage::QualityCheck,
            PipelineId::new(),
            "quality.processor.inst-1",
            true,
            1024,
            true,
            Duration::from_secs(3600),
        );
        entry.grant("insight.processor.inst-1");
        assert!(entry.can_retrieve("insight.processor.inst-1"));
    }

    #[test]
    fn quality_score_is_full_when_all_checks_pass() {
        let entry = StagingEntry::new(
            Stage::QualityCheck,
            PipelineId::new(),
            "quality.processor.inst-1",
            true,
            1024,
            true,
            Duration::from_secs(3600),
        );
        assert_eq!(entry.quality_score, 1.0);
    }

    #[test]
    fn zero_size_lowers_quality_score() {
        let entry = StagingEntry::new(
            Stage::QualityCheck,
            PipelineId::new(),
            "quality.processor.inst-1",
            true,
            0,
            true,
            Duration::from_secs(3600),
        );
        assert!(entry.quality_score < 1.0);
    }

    #[test]
    fn deleted_entries_cannot_be_retrieved() {
        let mut entry = StagingEntry::new(
            Stage::QualityCheck,
            PipelineId::new(),
            "quality.processor.inst-1",
            true,
            1024,
            true,
            Duration::from_secs(3600),
        );
        entry.mark_deleted();
        assert!(!entry.can_retrieve("quality.processor.inst-1"));
    }

    #[test]
    fn expiry_is_relative_to_retention() {
        let mut entry = StagingEntry::new(
            Stage::QualityCheck,
            PipelineId::new(),
            "quality.processor.inst-1",
            true,
            1024,
            true,
            Duration::from_millis(1),
        );
        entry.created_at = chrono::Utc::now() - chrono::Duration::seconds(5);
        assert!(entry.is_expired(chrono::Utc::now()));
    }
}
