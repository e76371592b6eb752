// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Subscription Pattern
//!
//! `(component, pattern)`. The callback itself is an infrastructure concern
//! (a boxed closure or channel held by the broker adapter) — the domain
//! entity only needs the matching rule.
//!
//! Patterns are dotted, three-segment strings (`department.role.instance`)
//! where any segment may be the wildcard `*`, and the last segment may also
//! match any `instance_id` when the pattern omits it (`department.role`).

use serde::{Deserialize, Serialize};

use crate::OrchestratorError;

const WILDCARD: &str = "*";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionPattern(String);

impl SubscriptionPattern {
    pub fn new(pattern: impl Into<String>) -> Result<Self, OrchestratorError> {
        let pattern = pattern.into();
        let segments: Vec<&str> = pattern.split('.').collect();
        if segments.is_empty() || segments.len() > 3 || segments.iter().any(|s| s.is_empty()) {
            return Err(OrchestratorError::validation_error(format!(
                "subscription pattern must have 1-3 non-empty dotted segments: {pattern:?}"
            )));
        }
        Ok(Self(pattern))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this pattern matches a published `tag` (a fully-qualified
    /// `department.role.instance_id`).
    pub fn matches(&self, tag: &str) -> bool {
        let pattern_segments: Vec<&str> = self.0.split('.').collect();
        let tag_segments: Vec<&str> = tag.split('.').collect();

        if pattern_segments.len() > tag_segments.len() {
            return false;
        }
        // A pattern shorter than the tag matches only if it omits just the
        // trailing instance_id segment.
        if pattern_segments.len() < tag_segments.len() && pattern_segments.len() != tag_segments.len() - 1 {
            return false;
        }
        pattern_segments
            .iter()
            .zip(tag_segments.iter())
            .all(|(p, t)| *p == WILDCARD || p == t)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    /// Dotted tag of the subscribing component.
    pub component: String,
    pub pattern: SubscriptionPattern,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Subscription {
    pub fn new(component: impl Into<String>, pattern: SubscriptionPattern) -> Self {
        Self {
            component: component.into(),
            pattern,
            created_at: chrono::Utc::now(),
        }
    }
}
