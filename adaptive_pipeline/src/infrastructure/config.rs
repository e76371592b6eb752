// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Infrastructure Configuration
//!
//! Layered configuration for the orchestrator's runtime knobs: broker pool
//! sizing, staging retention, and control-point timeouts. Loaded with the
//! `config` crate over an optional TOML file plus `ORCHESTRATOR__`-prefixed
//! environment overrides, falling back to documented defaults when no file
//! is present.
//!
//! ## Precedence
//!
//! 1. Built-in defaults (below).
//! 2. `orchestrator.toml`, located by walking up from the current directory.
//! 3. Environment variables prefixed `ORCHESTRATOR__`, double-underscore
//!    separated (e.g. `ORCHESTRATOR__BROKER__POOL_SIZE=8`).

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use pipeline_orchestrator_domain::OrchestratorError;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    /// Fixed worker pool size for callback dispatch.
    pub pool_size: usize,
    /// Bounded channel capacity; `publish` refuses with a transient error
    /// once this high-water mark is hit.
    pub queue_bound: usize,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            pool_size: 4,
            queue_bound: 1024,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StagingConfig {
    pub cleanup_interval_secs: u64,
    pub default_retention_secs: u64,
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            cleanup_interval_secs: 300,
            default_retention_secs: 24 * 3600,
        }
    }
}

impl StagingConfig {
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }

    pub fn default_retention(&self) -> Duration {
        Duration::from_secs(self.default_retention_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControlPointConfig {
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub review_loop_limit: u32,
    pub monitor_interval_secs: u64,
}

impl Default for ControlPointConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 60 * 60,
            max_retries: 3,
            review_loop_limit: 3,
            monitor_interval_secs: 30,
        }
    }
}

impl ControlPointConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn monitor_interval(&self) -> Duration {
        Duration::from_secs(self.monitor_interval_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `"json"` in production, `"pretty"` in development.
    pub format: String,
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: "pretty".to_string(),
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct OrchestratorConfig {
    pub broker: BrokerConfig,
    pub staging: StagingConfig,
    pub control_point: ControlPointConfig,
    pub logging: LoggingConfig,
    pub metrics: MetricsConfig,
}

impl OrchestratorConfig {
    /// Loads configuration from `orchestrator.toml` (searched for by
    /// walking up from the current directory), layered with
    /// `ORCHESTRATOR__`-prefixed environment overrides, falling back to
    /// defaults entirely when no file is found.
    pub fn load() -> Result<Self, OrchestratorError> {
        Self::load_from(find_config_file("orchestrator.toml"))
    }

    /// Same as [`Self::load`] but with an explicit file path (e.g. from
    /// `--config`), bypassing the directory walk.
    pub fn load_from(path: Option<PathBuf>) -> Result<Self, OrchestratorError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }
        builder = builder.add_source(
            config::Environment::with_prefix("ORCHESTRATOR")
                .separator("__")
                .try_parsing(true),
        );

        let raw = builder
            .build()
            .map_err(|e| OrchestratorError::invalid_config(format!("failed to build configuration: {e}")))?;

        raw.try_deserialize()
            .map_err(|e| OrchestratorError::invalid_config(format!("failed to parse configuration: {e}")))
    }

    /// Convenience constructor for tests and bootstrap defaults.
    pub fn defaults() -> Self {
        Self::default()
    }
}

/// Walks up from the current directory looking for `name`.
fn find_config_file(name: &str) -> Option<PathBuf> {
    let mut dir = std::env::current_dir().ok()?;
    loop {
        let candidate = dir.join(name);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !dir.pop() {
            return None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_internally_consistent() {
        let config = OrchestratorConfig::defaults();
        assert_eq!(config.broker.pool_size, 4);
        assert_eq!(config.control_point.max_retries, 3);
        assert!(config.metrics.enabled);
    }

    #[test]
    fn control_point_timeout_converts_to_duration() {
        let config = ControlPointConfig {
            timeout_secs: 120,
            ..Default::default()
        };
        assert_eq!(config.timeout(), Duration::from_secs(120));
    }
}
