// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Component Info
//!
//! What the Component Registry remembers about a registered component
//! beyond its assigned `instance_id`: its dependency graph (used for
//! shutdown ordering) and its liveness.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComponentStatus {
    Active,
    Degraded,
    Inactive,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentInfo {
    pub name: String,
    pub component_type: String,
    /// Names of components this one depends on.
    pub dependencies: Vec<String>,
    /// Names of components that depend on this one.
    pub dependents: Vec<String>,
    pub capabilities: Vec<String>,
    pub status: ComponentStatus,
    pub last_active: chrono::DateTime<chrono::Utc>,
}

impl ComponentInfo {
    pub fn new(name: impl Into<String>, component_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            component_type: component_type.into(),
            dependencies: Vec::new(),
            dependents: Vec::new(),
            capabilities: Vec::new(),
            status: ComponentStatus::Active,
            last_active: chrono::Utc::now(),
        }
    }

    pub fn touch(&mut self) {
        self.last_active = chrono::Utc::now();
        self.status = ComponentStatus::Active;
    }

    pub fn add_dependency(&mut self, dependency: impl Into<String>) {
        self.dependencies.push(dependency.into());
    }

    pub fn add_dependent(&mut self, dependent: impl Into<String>) {
        self.dependents.push(dependent.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_component_starts_active() {
        let info = ComponentInfo::new("quality-checker", "processor");
        assert_eq!(info.status, ComponentStatus::Active);
        assert!(info.dependencies.is_empty());
    }

    #[test]
    fn touch_refreshes_liveness() {
        let mut info = ComponentInfo::new("quality-checker", "processor");
        info.status = ComponentStatus::Degraded;
        info.touch();
        assert_eq!(info.status, ComponentStatus::Active);
    }

    #[test]
    fn dependency_tracking_is_bidirectional_by_caller() {
        let mut upstream = ComponentInfo::new("quality-checker", "processor");
        let mut downstream = ComponentInfo::new("insight-generator", "processor");
        upstream.add_dependent("insight-generator");
        downstream.add_dependency("quality-checker");
        assert_eq!(upstream.dependents, vec!["insight-generator"]);
        assert_eq!(downstream.dependencies, vec!["quality-checker"]);
    }
}
