// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Exit Code Mapping
//!
//! Maps an `OrchestratorError` category to a `sysexits.h`-style process exit
//! code, so a failure's shell-visible exit status hints at what went wrong
//! without requiring the caller to parse stderr.

use pipeline_orchestrator_domain::OrchestratorError;

/// `sysexits.h` codes relevant to this CLI; anything outside those
/// categories falls back to `Software` (70).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Ok = 0,
    Usage = 64,
    DataErr = 65,
    NoInput = 66,
    Unavailable = 69,
    Software = 70,
    Temporary = 75,
    NoPermission = 77,
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code as u8)
    }
}

/// Maps an `OrchestratorError` to the exit code its category implies.
pub fn map_error_to_exit_code(error: &OrchestratorError) -> ExitCode {
    match error {
        OrchestratorError::InvalidConfiguration(_) => ExitCode::Usage,
        OrchestratorError::ValidationError(_) => ExitCode::DataErr,
        OrchestratorError::NotFound(_) => ExitCode::NoInput,
        OrchestratorError::AccessDenied(_) => ExitCode::NoPermission,
        OrchestratorError::Timeout(_) | OrchestratorError::BrokerTransient(_) => ExitCode::Temporary,
        OrchestratorError::ProcessorError(_) => ExitCode::Unavailable,
        OrchestratorError::InvariantViolation(_) | OrchestratorError::IoError(_) | OrchestratorError::SerializationError(_) => {
            ExitCode::Software
        }
    }
}

/// Converts a top-level application result into a process exit code,
/// printing the error to stderr when present.
pub fn result_to_exit_code<T>(result: Result<T, OrchestratorError>) -> std::process::ExitCode {
    match result {
        Ok(_) => std::process::ExitCode::from(ExitCode::Ok),
        Err(error) => {
            eprintln!("error: {error}");
            std::process::ExitCode::from(map_error_to_exit_code(&error))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_no_input() {
        assert_eq!(map_error_to_exit_code(&OrchestratorError::not_found("x")), ExitCode::NoInput);
    }

    #[test]
    fn timeout_is_temporary() {
        assert_eq!(map_error_to_exit_code(&OrchestratorError::timeout("x")), ExitCode::Temporary);
    }

    #[test]
    fn ok_result_exits_zero() {
        let code = result_to_exit_code::<()>(Ok(()));
        assert_eq!(code, std::process::ExitCode::from(ExitCode::Ok));
    }
}
