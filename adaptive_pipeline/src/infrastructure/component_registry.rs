// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Component Registry
//!
//! In-process adapter for [`ComponentRegistryPort`]: a name keyed map under
//! a single `parking_lot::RwLock` — `parking_lot` over `std::sync` for
//! short, non-async critical sections.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

use pipeline_orchestrator_domain::entities::{ComponentInfo, ComponentStatus};
use pipeline_orchestrator_domain::services::ComponentRegistryPort;
use pipeline_orchestrator_domain::value_objects::Role;
use pipeline_orchestrator_domain::{ComponentIdentifier, Department, OrchestratorError};

struct RegisteredComponent {
    identifier: ComponentIdentifier,
    info: ComponentInfo,
}

/// Concrete [`ComponentRegistryPort`] adapter. `instance_id` is assigned
/// once per component `name` and reused on every subsequent `get_id` call,
/// so a restarted component rejoins under the identity its subscriptions
/// were already recorded against.
#[derive(Default)]
pub struct ComponentRegistry {
    components: RwLock<HashMap<String, RegisteredComponent>>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ComponentRegistryPort for ComponentRegistry {
    async fn get_id(
        &self,
        name: &str,
        component_type: &str,
        department: Department,
        role: Role,
    ) -> Result<ComponentIdentifier, OrchestratorError> {
        if let Some(existing) = self.components.read().get(name) {
            return Ok(existing.identifier.clone());
        }

        let instance_id = ulid::Ulid::new().to_string();
        let identifier = ComponentIdentifier::new(name, component_type, department, role, instance_id)?;

        let mut components = self.components.write();
        // Another caller may have raced us between the read-lock check and
        // here; the first writer to land wins, same "first store wins"
        // shape as the staging manager's (pipeline_id, stage) keying.
        let entry = components.entry(name.to_string()).or_insert_with(|| RegisteredComponent {
            identifier: identifier.clone(),
            info: ComponentInfo::new(name, component_type),
        });
        Ok(entry.identifier.clone())
    }

    async fn info(&self, name: &str) -> Result<Option<ComponentInfo>, OrchestratorError> {
        Ok(self.components.read().get(name).map(|c| c.info.clone()))
    }

    async fn record_dependency(&self, name: &str, depends_on: &str) -> Result<(), OrchestratorError> {
        let mut components = self.components.write();
        let found = components.contains_key(name);
        if !found {
            return Err(OrchestratorError::not_found(format!("component not registered: {name}")));
        }
        if let Some(component) = components.get_mut(name) {
            component.info.add_dependency(depends_on);
        }
        if let Some(upstream) = components.get_mut(depends_on) {
            upstream.info.add_dependent(name);
        }
        Ok(())
    }

    async fn touch(&self, name: &str) -> Result<(), OrchestratorError> {
        let mut components = self.components.write();
        let component = components
            .get_mut(name)
            .ok_or_else(|| OrchestratorError::not_found(format!("component not registered: {name}")))?;
        component.info.touch();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role() -> Role {
        Role::new("processor").unwrap()
    }

    #[tokio::test]
    async fn get_id_is_idempotent_for_the_same_name() {
        let registry = ComponentRegistry::new();
        let first = registry
            .get_id("quality-checker", "processor", Department::Quality, role())
            .await
            .unwrap();
        let second = registry
            .get_id("quality-checker", "processor", Department::Quality, role())
            .await
            .unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn info_is_none_before_registration() {
        let registry = ComponentRegistry::new();
        assert!(registry.info("unregistered").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn record_dependency_updates_both_sides() {
        let registry = ComponentRegistry::new();
        registry
            .get_id("quality-checker", "processor", Department::Quality, role())
            .await
            .unwrap();
        registry
            .get_id("insight-generator", "processor", Department::Insight, role())
            .await
            .unwrap();

        registry.record_dependency("insight-generator", "quality-checker").await.unwrap();

        let downstream = registry.info("insight-generator").await.unwrap().unwrap();
        assert_eq!(downstream.dependencies, vec!["quality-checker"]);
        let upstream = registry.info("quality-checker").await.unwrap().unwrap();
        assert_eq!(upstream.dependents, vec!["insight-generator"]);
    }

    #[tokio::test]
    async fn touch_clears_degraded_status() {
        let registry = ComponentRegistry::new();
        registry
            .get_id("quality-checker", "processor", Department::Quality, role())
            .await
            .unwrap();
        {
            let mut components = registry.components.write();
            components.get_mut("quality-checker").unwrap().info.status = ComponentStatus::Degraded;
        }
        registry.touch("quality-checker").await.unwrap();
        let info = registry.info("quality-checker").await.unwrap().unwrap();
        assert_eq!(info.status, ComponentStatus::Active);
    }

    #[tokio::test]
    async fn touch_on_unregistered_component_is_an_error() {
        let registry = ComponentRegistry::new();
        assert!(registry.touch("ghost").await.is_err());
    }
}
