// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Orchestrator Domain Errors
//!
//! Errors are grouped by the error kinds enumerated in the design: input/
//! config, authorization, not-found, timeout, processor, broker-transient,
//! and internal invariant violations. CPM is the only component that turns
//! a processor error into a pipeline state transition; every other layer
//! just propagates `OrchestratorError` with `?`.

use thiserror::Error;

/// Domain-specific errors for the staged data-processing orchestrator.
///
/// ## Recoverability
///
/// [`OrchestratorError::is_recoverable`] distinguishes errors a caller may
/// retry (timeouts, a full broker queue) from ones it should not
/// (bad input, access denied, an internal invariant violation).
#[derive(Error, Debug, Clone)]
pub enum OrchestratorError {
    /// Pipeline configuration is missing a required field or is otherwise
    /// malformed (e.g. no `stage_sequence`).
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A staging or component-registry access check failed.
    #[error("access denied: {0}")]
    AccessDenied(String),

    /// A pipeline, control point, or staging entry id has no corresponding
    /// record.
    #[error("not found: {0}")]
    NotFound(String),

    /// A control point exceeded its timeout with no decision received.
    #[error("timeout: {0}")]
    Timeout(String),

    /// A department processor reported a stage failure.
    #[error("processor error: {0}")]
    ProcessorError(String),

    /// The message broker's worker pool queue is at its high-water mark.
    #[error("broker transient error: {0}")]
    BrokerTransient(String),

    /// A domain invariant was violated (e.g. a control point found in both
    /// `active_control_points` and `control_point_history`).
    #[error("internal invariant violation: {0}")]
    InvariantViolation(String),

    /// A subscription pattern or component tag failed validation.
    #[error("validation error: {0}")]
    ValidationError(String),

    /// Underlying I/O failure surfaced from an infrastructure adapter.
    #[error("io error: {0}")]
    IoError(String),

    /// Serialization/deserialization failure.
    #[error("serialization error: {0}")]
    SerializationError(String),
}

impl OrchestratorError {
    /// Creates an invalid-configuration error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// Creates a not-found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Creates an access-denied error.
    pub fn access_denied(msg: impl Into<String>) -> Self {
        Self::AccessDenied(msg.into())
    }

    /// Creates a timeout error.
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Creates a processor error.
    pub fn processor_error(msg: impl Into<String>) -> Self {
        Self::ProcessorError(msg.into())
    }

    /// Creates a broker-transient error.
    pub fn broker_transient(msg: impl Into<String>) -> Self {
        Self::BrokerTransient(msg.into())
    }

    /// Creates an internal invariant-violation error.
    pub fn invariant_violation(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    /// Creates a validation error.
    pub fn validation_error(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    /// Whether a caller may reasonably retry the operation that produced
    /// this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::BrokerTransient(_) | Self::IoError(_))
    }

    /// Coarse error category, used for metrics labels and log fields.
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidConfiguration(_) => "configuration",
            Self::AccessDenied(_) => "authorization",
            Self::NotFound(_) => "not_found",
            Self::Timeout(_) => "timeout",
            Self::ProcessorError(_) => "processor",
            Self::BrokerTransient(_) => "broker_transient",
            Self::InvariantViolation(_) => "internal",
            Self::ValidationError(_) => "validation",
            Self::IoError(_) => "io",
            Self::SerializationError(_) => "serialization",
        }
    }
}

impl From<std::io::Error> for OrchestratorError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for OrchestratorError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recoverable_errors_are_marked_recoverable() {
        assert!(OrchestratorError::timeout("overdue").is_recoverable());
        assert!(OrchestratorError::broker_transient("queue full").is_recoverable());
        assert!(!OrchestratorError::not_found("pipeline").is_recoverable());
        assert!(!OrchestratorError::invalid_config("missing stage_sequence").is_recoverable());
    }

    #[test]
    fn category_matches_variant() {
        assert_eq!(OrchestratorError::access_denied("x").category(), "authorization");
        assert_eq!(OrchestratorError::invariant_violation("x").category(), "internal");
    }

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let domain_err: OrchestratorError = io_err.into();
        assert!(matches!(domain_err, OrchestratorError::IoError(_)));
    }
}
