// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Identifies a subscriber that registers itself with the Component Registry
//! and then participates in the Message Broker as a publisher/subscriber.
//!
//! The dotted `tag()` form (`department.role.instance_id`) is what the broker
//! matches subscription patterns against and what the Control-Point Manager
//! uses to address a `CONTROL_POINT_REACHED` message at the right handler.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

use super::stage::Department;
use crate::OrchestratorError;

/// Role a component plays within its department, e.g. `manager` for a
/// department's control-point handler or `processor` for a worker that does
/// the department's actual work.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct Role(String);

impl Role {
    pub fn new(role: impl Into<String>) -> Result<Self, OrchestratorError> {
        let role = role.into();
        if role.is_empty() || role.contains('.') || role.contains(char::is_whitespace) {
            return Err(OrchestratorError::validation_error(format!(
                "role must be non-empty, dot-free, whitespace-free: {role:?}"
            )));
        }
        Ok(Self(role))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered component's identity within the orchestrator.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ComponentIdentifier {
    name: String,
    component_type: String,
    department: Department,
    role: Role,
    instance_id: String,
}

impl ComponentIdentifier {
    pub fn new(
        name: impl Into<String>,
        component_type: impl Into<String>,
        department: Department,
        role: Role,
        instance_id: impl Into<String>,
    ) -> Result<Self, OrchestratorError> {
        let name = name.into();
        let component_type = component_type.into();
        let instance_id = instance_id.into();
        if name.is_empty() {
            return Err(OrchestratorError::validation_error("component name must not be empty"));
        }
        if component_type.is_empty() {
            return Err(OrchestratorError::validation_error("component type must not be empty"));
        }
        if instance_id.is_empty() || instance_id.contains('.') {
            return Err(OrchestratorError::validation_error(format!(
                "instance_id must be non-empty and dot-free: {instance_id:?}"
            )));
        }
        Ok(Self {
            name,
            component_type,
            department,
            role,
            instance_id,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn component_type(&self) -> &str {
        &self.component_type
    }

    pub fn department(&self) -> Department {
        self.department
    }

    pub fn role(&self) -> &Role {
        &self.role
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// The dotted tag this component publishes under and that subscription
    /// patterns match against: `department.role.instance_id`.
    pub fn tag(&self) -> String {
        format!("{}.{}.{}", self.department, self.role, self.instance_id)
    }
}

impl Display for ComponentIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role(s: &str) -> Role {
        Role::new(s).unwrap()
    }

    #[test]
    fn tag_is_dotted_department_role_instance() {
        let id = ComponentIdentifier::new(
            "Quality Checker",
            "processor",
            Department::Quality,
            role("processor"),
            "worker-1",
        )
        .unwrap();
        assert_eq!(id.tag(), "quality.processor.worker-1");
    }

    #[test]
    fn instance_id_rejects_dots() {
        let err = ComponentIdentifier::new(
            "Bad",
            "processor",
            Department::Quality,
            role("processor"),
            "worker.1",
        );
        assert!(err.is_err());
    }

    #[test]
    fn role_rejects_whitespace() {
        assert!(Role::new("bad role").is_err());
    }
}
