// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Generic ID Value Object
//!
//! A type-safe, ULID-backed identifier with a phantom category type. Every
//! concrete id in this crate (`PipelineId`, `ControlPointId`, `StagingHandle`,
//! `MessageId`, ...) is a thin newtype over `GenericId<SomeMarker>`, so two
//! different kinds of id can never be confused at compile time even though
//! they share one implementation.
//!
//! ULIDs are lexicographically sortable by creation time, which gives every
//! id in this crate natural chronological ordering for free.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use ulid::Ulid;

use crate::OrchestratorError;

/// Per-category validation hook for [`GenericId`].
pub trait IdCategory {
    /// Human-readable category name, used in error messages.
    fn category_name() -> &'static str;

    /// Validates a raw ULID against category-specific constraints.
    fn validate_id(ulid: &Ulid) -> Result<(), OrchestratorError> {
        if *ulid == Ulid::nil() {
            return Err(OrchestratorError::invalid_config(format!(
                "{} id cannot be nil",
                Self::category_name()
            )));
        }
        Ok(())
    }
}

/// Generic, type-safe identifier built on a ULID plus a phantom category.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub struct GenericId<T: IdCategory> {
    value: Ulid,
    _phantom: std::marker::PhantomData<T>,
}

impl<T: IdCategory> Serialize for GenericId<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.value.to_string().serialize(serializer)
    }
}

impl<'de, T: IdCategory> Deserialize<'de> for GenericId<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let ulid = Ulid::from_string(&s).map_err(|e| serde::de::Error::custom(e.to_string()))?;
        Ok(Self {
            value: ulid,
            _phantom: std::marker::PhantomData,
        })
    }
}

impl<T: IdCategory> GenericId<T> {
    /// Creates a new, time-ordered id.
    pub fn new() -> Self {
        Self {
            value: Ulid::new(),
            _phantom: std::marker::PhantomData,
        }
    }

    /// Builds an id from an existing ULID, applying category validation.
    pub fn from_ulid(ulid: Ulid) -> Result<Self, OrchestratorError> {
        T::validate_id(&ulid)?;
        Ok(Self {
            value: ulid,
            _phantom: std::marker::PhantomData,
        })
    }

    /// Builds an id for a specific timestamp, useful for boundary queries
    /// and deterministic tests.
    pub fn from_timestamp_ms(timestamp_ms: u64) -> Result<Self, OrchestratorError> {
        let random = rand::random::<u128>() & ((1u128 << 80) - 1);
        let ulid = Ulid::from_parts(timestamp_ms, random);
        T::validate_id(&ulid)?;
        Ok(Self {
            value: ulid,
            _phantom: std::marker::PhantomData,
        })
    }

    /// Parses an id from its 26-character ULID string form.
    pub fn from_string(s: &str) -> Result<Self, OrchestratorError> {
        let ulid = Ulid::from_str(s)
            .map_err(|e| OrchestratorError::invalid_config(format!("invalid id format: {e}")))?;
        Self::from_ulid(ulid)
    }

    /// Returns the underlying ULID.
    pub fn as_ulid(&self) -> Ulid {
        self.value
    }

    /// Returns the creation timestamp in milliseconds since the Unix epoch.
    pub fn timestamp_ms(&self) -> u64 {
        self.value.timestamp_ms()
    }

    /// Returns the creation time as a UTC `DateTime`.
    pub fn datetime(&self) -> chrono::DateTime<chrono::Utc> {
        chrono::DateTime::from_timestamp_millis(self.timestamp_ms() as i64).unwrap_or_else(chrono::Utc::now)
    }

    /// Returns the category name for this id type.
    pub fn category(&self) -> &'static str {
        T::category_name()
    }

    /// Re-validates this id against its category rules.
    pub fn validate(&self) -> Result<(), OrchestratorError> {
        T::validate_id(&self.value)
    }

    /// Whether this is the nil (all-zero) id.
    pub fn is_nil(&self) -> bool {
        self.value.0 == 0
    }

    #[cfg(test)]
    pub fn nil() -> Self {
        Self {
            value: Ulid(0),
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<T: IdCategory> Default for GenericId<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: IdCategory> Display for GenericId<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<T: IdCategory> Hash for GenericId<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T: IdCategory> FromStr for GenericId<T> {
    type Err = OrchestratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_string(s)
    }
}

impl<T: IdCategory> From<Ulid> for GenericId<T> {
    fn from(ulid: Ulid) -> Self {
        Self::from_ulid(ulid).unwrap_or_else(|_| Self::new())
    }
}

impl<T: IdCategory> From<GenericId<T>> for Ulid {
    fn from(id: GenericId<T>) -> Self {
        id.value
    }
}

impl<T: IdCategory> AsRef<Ulid> for GenericId<T> {
    fn as_ref(&self) -> &Ulid {
        &self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
    struct TestMarker;

    impl IdCategory for TestMarker {
        fn category_name() -> &'static str {
            "test"
        }
    }

    type TestId = GenericId<TestMarker>;

    #[test]
    fn ids_are_unique_and_time_ordered() {
        let id1 = TestId::new();
        std::thread::sleep(std::time::Duration::from_millis(1));
        let id2 = TestId::new();

        assert_ne!(id1, id2);
        assert!(id2 > id1);
    }

    #[test]
    fn roundtrips_through_json() {
        let id = TestId::new();
        let json = serde_json::to_string(&id).unwrap();
        let back: TestId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }

    #[test]
    fn nil_id_fails_validation() {
        assert!(TestId::nil().validate().is_err());
    }

    #[test]
    fn from_timestamp_preserves_timestamp() {
        let ts = 1_700_000_000_000;
        let id = TestId::from_timestamp_ms(ts).unwrap();
        assert_eq!(id.timestamp_ms(), ts);
    }
}
