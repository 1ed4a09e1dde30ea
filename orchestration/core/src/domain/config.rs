// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Orchestrator Configuration Types
//
// Defines the configuration schema for the CONCORD orchestration core:
// - Storage backend selection (in-memory vs PostgreSQL)
// - Circuit breaker tuning (failure threshold, cool-down)
//
// Loaded from YAML at startup; all fields have serde defaults so an
// empty document yields a working in-memory configuration.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::domain::repository::{PostgresConfig, StorageBackend};

/// Top-level configuration for the orchestration core.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub circuit_breaker: CircuitBreakerConfig,
}

impl OrchestratorConfig {
    /// Load configuration from a YAML file.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: OrchestratorConfig =
            serde_yaml::from_str(&raw).context("Failed to parse orchestrator config YAML")?;
        Ok(config)
    }
}

/// Storage backend selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// "in_memory" or "postgres".
    #[serde(default = "default_storage_backend")]
    pub backend: String,

    /// Required when `backend` is "postgres".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_string: Option<String>,
}

impl StorageConfig {
    pub fn storage_backend(&self) -> Result<StorageBackend> {
        match self.backend.as_str() {
            "in_memory" => Ok(StorageBackend::InMemory),
            "postgres" => {
                let connection_string = self
                    .connection_string
                    .clone()
                    .context("storage.connection_string is required for the postgres backend")?;
                Ok(StorageBackend::PostgreSQL(PostgresConfig {
                    connection_string,
                }))
            }
            other => bail!("Unknown storage backend '{other}'"),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_storage_backend(),
            connection_string: None,
        }
    }
}

/// Circuit breaker tuning. Defaults match the production values: open
/// after 3 failures, lazily close 5 minutes after the last failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitBreakerConfig {
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,

    #[serde(default = "default_cool_down_seconds")]
    pub cool_down_seconds: i64,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: default_failure_threshold(),
            cool_down_seconds: default_cool_down_seconds(),
        }
    }
}

fn default_storage_backend() -> String {
    "in_memory".to_string()
}
fn default_failure_threshold() -> u32 {
    3
}
fn default_cool_down_seconds() -> i64 {
    300
}
