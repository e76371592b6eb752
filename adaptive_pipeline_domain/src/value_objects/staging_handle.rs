// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Opaque handle under which the Staging Manager stores a stage's output.
//!
//! A `StagingHandle` is generated by the Staging Manager at `store` time and
//! is what `ControlPoint::staging_reference` points at. It is distinct from
//! the `(pipeline_id, stage)` pair that keys a [`crate::entities::StagingEntry`]
//! for first-store-wins consistency.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use ulid::Ulid;

use super::generic_id::{GenericId, IdCategory};
use crate::OrchestratorError;

#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct StagingHandle(GenericId<StagingMarker>);

#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
struct StagingMarker;

impl IdCategory for StagingMarker {
    fn category_name() -> &'static str {
        "staging"
    }
}

impl StagingHandle {
    pub fn new() -> Self {
        Self(GenericId::new())
    }

    pub fn from_string(s: &str) -> Result<Self, OrchestratorError> {
        Ok(Self(GenericId::from_string(s)?))
    }

    pub fn as_ulid(&self) -> Ulid {
        self.0.as_ulid()
    }
}

impl Default for StagingHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for StagingHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for StagingHandle {
    type Err = OrchestratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_string(s)
    }
}

impl Serialize for StagingHandle {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for StagingHandle {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Ok(Self(GenericId::deserialize(deserializer)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_handles_are_unique() {
        assert_ne!(StagingHandle::new(), StagingHandle::new());
    }
}
