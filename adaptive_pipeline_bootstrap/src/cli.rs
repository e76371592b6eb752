// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Command-Line Interface Module
//!
//! Bootstrap-layer CLI handling with security-first design.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │  1. parse_cli()                     │  Parse CLI with clap
//! └─────────────────┬───────────────────┘
//!                   ↓
//! ┌─────────────────────────────────────┐
//! │  2. validate_cli()                  │  Security validation
//! └─────────────────┬───────────────────┘
//!                   ↓
//! ┌─────────────────────────────────────┐
//! │  3. ValidatedCli                    │  Safe, validated config
//! └─────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use pipeline_orchestrator_domain::value_objects::Stage;
use pipeline_orchestrator_domain::{ControlPointId, PipelineId};

#[derive(Parser, Debug)]
#[command(name = "pipeline-orchestrator", version, about = "Staged data-processing pipeline orchestrator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose (debug-level) logging.
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Path to an `orchestrator.toml` override; defaults to the
    /// directory-walk search `OrchestratorConfig::load` performs.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Message broker worker pool size override.
    #[arg(long, global = true)]
    pub pool_size: Option<usize>,

    /// Message broker bounded-queue depth override.
    #[arg(long, global = true, default_value_t = 1024)]
    pub channel_depth: usize,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Creates a pipeline context without starting it.
    Create {
        name: String,
        /// Comma-separated stage names, e.g. `RECEPTION,VALIDATION,QUALITY_CHECK,COMPLETION`.
        stages: String,
    },
    /// Starts a created pipeline, opening its first control point.
    Start {
        pipeline_id: String,
        /// Optional path to a file to stage as the already-ingested input.
        input: Option<PathBuf>,
    },
    /// Submits a decision against a pending control point.
    Decide {
        pipeline_id: String,
        control_point_id: String,
        /// `approve`, `reject`, or `rework`.
        decision: String,
        #[arg(long, required_if_eq("decision", "rework"))]
        rework_stage: Option<String>,
        #[arg(long, required_if_eq("decision", "reject"))]
        reason: Option<String>,
        #[arg(long)]
        decided_by: Option<String>,
    },
    /// Prints a pipeline's current status.
    Status { pipeline_id: String },
    /// Lists active pipelines.
    List,
    /// Cancels a running pipeline.
    Cancel { pipeline_id: String },
}

pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Validated, security-checked decision ready for `submit_decision`.
#[derive(Debug, Clone)]
pub enum ValidatedDecision {
    Approve,
    Rework { rework_stage: Stage },
    Reject { reason: String },
}

#[derive(Debug, Clone)]
pub enum ValidatedCommand {
    Create {
        name: String,
        stages: Vec<Stage>,
    },
    Start {
        pipeline_id: PipelineId,
        input: Option<PathBuf>,
    },
    Decide {
        pipeline_id: PipelineId,
        control_point_id: ControlPointId,
        decision: ValidatedDecision,
        decided_by: Option<String>,
    },
    Status {
        pipeline_id: PipelineId,
    },
    List,
    Cancel {
        pipeline_id: PipelineId,
    },
}

/// Validated CLI configuration: all arguments security-checked, all paths
/// canonicalized, all identifiers parsed.
#[derive(Debug, Clone)]
pub struct ValidatedCli {
    pub command: ValidatedCommand,
    pub verbose: bool,
    pub config: Option<PathBuf>,
    pub pool_size: Option<usize>,
    pub channel_depth: usize,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ParseError {
    #[error("invalid value for --{arg}: {reason}")]
    InvalidValue { arg: String, reason: String },
    #[error("security violation in --{arg}: {reason}")]
    SecurityViolation { arg: String, reason: String },
    #[error("path not found: {0}")]
    PathNotFound(String),
}

/// Rejects shell metacharacters, control characters, and path-traversal
/// sequences in untrusted CLI strings before they reach domain
/// constructors.
pub struct SecureArgParser;

impl SecureArgParser {
    const FORBIDDEN: &'static [char] = &[';', '|', '&', '$', '`', '\n', '\r', '\0'];

    pub fn validate_argument(value: &str) -> Result<(), ParseError> {
        if value.chars().any(|c| Self::FORBIDDEN.contains(&c) || c.is_control()) {
            return Err(ParseError::SecurityViolation {
                arg: value.to_string(),
                reason: "contains a forbidden shell/control character".to_string(),
            });
        }
        if value.contains("..") {
            return Err(ParseError::SecurityViolation {
                arg: value.to_string(),
                reason: "path traversal sequence `..` is not allowed".to_string(),
            });
        }
        Ok(())
    }

    pub fn validate_path(value: &str) -> Result<PathBuf, ParseError> {
        Self::validate_argument(value)?;
        let path = PathBuf::from(value);
        path.canonicalize().map_err(|_| ParseError::PathNotFound(value.to_string()))
    }
}

fn parse_stage(name: &str) -> Result<Stage, ParseError> {
    let normalized = name.trim().to_ascii_uppercase();
    Stage::ALL
        .iter()
        .copied()
        .find(|s| s.to_string() == normalized)
        .ok_or_else(|| ParseError::InvalidValue {
            arg: "stages".to_string(),
            reason: format!("unrecognized stage name: {name:?}"),
        })
}

pub fn parse_and_validate() -> Result<ValidatedCli, ParseError> {
    let cli = parse_cli();
    validate_cli(cli)
}

fn validate_cli(cli: Cli) -> Result<ValidatedCli, ParseError> {
    let config = if let Some(ref path) = cli.config {
        Some(SecureArgParser::validate_path(&path.to_string_lossy())?)
    } else {
        None
    };

    if cli.channel_depth == 0 {
        return Err(ParseError::InvalidValue {
            arg: "channel-depth".to_string(),
            reason: "must be greater than 0".to_string(),
        });
    }
    if let Some(pool_size) = cli.pool_size {
        if pool_size == 0 || pool_size > 256 {
            return Err(ParseError::InvalidValue {
                arg: "pool-size".to_string(),
                reason: "must be between 1 and 256".to_string(),
            });
        }
    }

    let command = match cli.command {
        Commands::Create { name, stages } => {
            SecureArgParser::validate_argument(&name)?;
            let stages = stages
                .split(',')
                .map(parse_stage)
                .collect::<Result<Vec<_>, _>>()?;
            if stages.is_empty() {
                return Err(ParseError::InvalidValue {
                    arg: "stages".to_string(),
                    reason: "must list at least one stage".to_string(),
                });
            }
            ValidatedCommand::Create { name, stages }
        }
        Commands::Start { pipeline_id, input } => {
            let pipeline_id = parse_pipeline_id(&pipeline_id)?;
            let input = match input {
                Some(path) => Some(SecureArgParser::validate_path(&path.to_string_lossy())?),
                None => None,
            };
            ValidatedCommand::Start { pipeline_id, input }
        }
        Commands::Decide {
            pipeline_id,
            control_point_id,
            decision,
            rework_stage,
            reason,
            decided_by,
        } => {
            let pipeline_id = parse_pipeline_id(&pipeline_id)?;
            let control_point_id = ControlPointId::from_string(&control_point_id).map_err(|e| ParseError::InvalidValue {
                arg: "control_point_id".to_string(),
                reason: e.to_string(),
            })?;
            let decision = match decision.as_str() {
                "approve" => ValidatedDecision::Approve,
                "rework" => {
                    let stage_name = rework_stage.ok_or_else(|| ParseError::InvalidValue {
                        arg: "rework-stage".to_string(),
                        reason: "required when decision is rework".to_string(),
                    })?;
                    ValidatedDecision::Rework {
                        rework_stage: parse_stage(&stage_name)?,
                    }
                }
                "reject" => {
                    let reason = reason.ok_or_else(|| ParseError::InvalidValue {
                        arg: "reason".to_string(),
                        reason: "required when decision is reject".to_string(),
                    })?;
                    SecureArgParser::validate_argument(&reason)?;
                    ValidatedDecision::Reject { reason }
                }
                other => {
                    return Err(ParseError::InvalidValue {
                        arg: "decision".to_string(),
                        reason: format!("must be approve, reject, or rework, got {other:?}"),
                    })
                }
            };
            if let Some(ref by) = decided_by {
                SecureArgParser::validate_argument(by)?;
            }
            ValidatedCommand::Decide {
                pipeline_id,
                control_point_id,
                decision,
                decided_by,
            }
        }
        Commands::Status { pipeline_id } => ValidatedCommand::Status {
            pipeline_id: parse_pipeline_id(&pipeline_id)?,
        },
        Commands::List => ValidatedCommand::List,
        Commands::Cancel { pipeline_id } => ValidatedCommand::Cancel {
            pipeline_id: parse_pipeline_id(&pipeline_id)?,
        },
    };

    Ok(ValidatedCli {
        command,
        verbose: cli.verbose,
        config,
        pool_size: cli.pool_size,
        channel_depth: cli.channel_depth,
    })
}

fn parse_pipeline_id(raw: &str) -> Result<PipelineId, ParseError> {
    SecureArgParser::validate_argument(raw)?;
    PipelineId::from_string(raw).map_err(|e| ParseError::InvalidValue {
        arg: "pipeline_id".to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_argument_rejects_shell_metacharacters() {
        assert!(SecureArgParser::validate_argument("rm -rf / ; echo pwned").is_err());
    }

    #[test]
    fn validate_argument_rejects_path_traversal() {
        assert!(SecureArgParser::validate_argument("../../etc/passwd").is_err());
    }

    #[test]
    fn validate_argument_accepts_plain_names() {
        assert!(SecureArgParser::validate_argument("quarterly-ingest").is_ok());
    }

    #[test]
    fn parse_stage_is_case_insensitive() {
        assert_eq!(parse_stage("quality_check").unwrap(), Stage::QualityCheck);
        assert_eq!(parse_stage("QUALITY_CHECK").unwrap(), Stage::QualityCheck);
    }

    #[test]
    fn parse_stage_rejects_unknown_names() {
        assert!(parse_stage("NOT_A_STAGE").is_err());
    }
}
