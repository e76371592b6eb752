// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Component Registry Port
//!
//! Assigns and remembers a stable `instance_id` per component name, and
//! tracks the dependency graph used for shutdown ordering.

use async_trait::async_trait;

use crate::entities::ComponentInfo;
use crate::error::OrchestratorError;
use crate::value_objects::{ComponentIdentifier, Department, Role};

#[async_trait]
pub trait ComponentRegistryPort: Send + Sync {
    /// Returns the existing identifier for `name` if present, otherwise
    /// allocates and stores one. Safe under concurrent calls for the same
    /// name.
    async fn get_id(
        &self,
        name: &str,
        component_type: &str,
        department: Department,
        role: Role,
    ) -> Result<ComponentIdentifier, OrchestratorError>;

    async fn info(&self, name: &str) -> Result<Option<ComponentInfo>, OrchestratorError>;

    async fn record_dependency(&self, name: &str, depends_on: &str) -> Result<(), OrchestratorError>;

    /// Refreshes `last_active` and clears a `Degraded` status.
    async fn touch(&self, name: &str) -> Result<(), OrchestratorError>;
}
