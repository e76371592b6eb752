// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Route
//!
//! Declares that completion of `source` with predicate `conditions` unlocks
//! `targets`. Owned by the Conductor's `RouteRegistry`, orthogonal to the
//! Control-Point Manager's own per-pipeline stage state — the core
//! sequential flow never needs a `Route`; non-sequential topologies
//! (parallel fan-out, conditional routing) do.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::value_objects::Stage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouteType {
    Sequential,
    Parallel,
    Conditional,
    ControlPoint,
    Recovery,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    pub source: Stage,
    pub targets: Vec<Stage>,
    pub route_type: RouteType,
    /// Matched against a completion message's metadata; all pairs must
    /// match for the route to fire.
    pub conditions: HashMap<String, String>,
    pub validation_rules: Vec<String>,
}

impl Route {
    pub fn new(source: Stage, targets: Vec<Stage>, route_type: RouteType) -> Self {
        Self {
            source,
            targets,
            route_type,
            conditions: HashMap::new(),
            validation_rules: Vec::new(),
        }
    }

    pub fn with_condition(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.conditions.insert(key.into(), value.into());
        self
    }

    /// Whether `metadata` satisfies every declared condition.
    pub fn matches(&self, metadata: &HashMap<String, String>) -> bool {
        self.conditions.iter().all(|(k, v)| metadata.get(k) == Some(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_with_no_conditions_always_matches() {
        let route = Route::new(Stage::QualityCheck, vec![Stage::InsightGeneration], RouteType::Sequential);
        assert!(route.matches(&HashMap::new()));
    }

    #[test]
    fn route_condition_must_match_exactly() {
        let route =
            Route::new(Stage::QualityCheck, vec![Stage::UserReview], RouteType::Conditional).with_condition(
                "severity", "high",
            );
        let mut meta = HashMap::new();
        meta.insert("severity".to_string(), "high".to_string());
        assert!(route.matches(&meta));

        meta.insert("severity".to_string(), "low".to_string());
        assert!(!route.matches(&meta));
    }
}
