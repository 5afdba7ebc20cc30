// SPDX-License-Identifier: MIT
//! Engine configuration (`quizcore.toml`). Every field has a hard default so
//! a missing or partial file still yields a working engine.

use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DEFAULT_DATA_DIR: &str = "quizcore-data";
const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 30;
const DEFAULT_SLOW_QUERY_MS: u64 = 0;

// ─── StorageConfig ────────────────────────────────────────────────────────────

/// Storage tuning (`[storage]` in quizcore.toml).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Per-query timeout in seconds. A timed-out store call fails only the
    /// pipeline stage that issued it (default: 30).
    pub query_timeout_secs: u64,
    /// Queries slower than this are logged at WARN. 0 disables (default: 0).
    pub slow_query_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            query_timeout_secs: DEFAULT_QUERY_TIMEOUT_SECS,
            slow_query_ms: DEFAULT_SLOW_QUERY_MS,
        }
    }
}

// ─── EngineConfig ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Directory holding the SQLite database.
    pub data_dir: PathBuf,
    pub storage: StorageConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            storage: StorageConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load from a TOML file; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parse config {}", path.display()))
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.storage.query_timeout_secs, 30);
        assert_eq!(cfg.storage.slow_query_ms, 0);
        assert_eq!(cfg.data_dir, PathBuf::from("quizcore-data"));
    }

    #[test]
    fn partial_toml_fills_missing_fields() {
        let cfg: EngineConfig = toml::from_str(
            r#"
            data_dir = "/tmp/qc"

            [storage]
            slow_query_ms = 250
            "#,
        )
        .unwrap();
        assert_eq!(cfg.data_dir, PathBuf::from("/tmp/qc"));
        assert_eq!(cfg.storage.slow_query_ms, 250);
        assert_eq!(cfg.storage.query_timeout_secs, 30);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let cfg = EngineConfig::load(Path::new("/nonexistent/quizcore.toml")).unwrap();
        assert_eq!(cfg.storage.query_timeout_secs, 30);
    }
}
