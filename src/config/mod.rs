//! Configuration loading and management.

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::core::Result;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Run-level thresholds echoed into the report payload.
    pub thresholds: Thresholds,
    /// Score gate for CI.
    pub score: ScoreConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            score: ScoreConfig::default(),
        }
    }
}

/// Named numeric knobs supplied once per run and echoed verbatim into
/// `RunSummary.thresholds` for presentation.
///
/// These are informational: the scoring functions keep their own
/// hardcoded target/max anchors (see `aggregate`), and the disconnect is
/// a known product decision, not wiring to add casually.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Thresholds {
    pub avg_duration_target_ms: f64,
    pub p95_duration_target_ms: f64,
    pub throughput_target_per_min: f64,
    pub retry_rate_target_pct: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            avg_duration_target_ms: 1500.0,
            p95_duration_target_ms: 3000.0,
            throughput_target_per_min: 30.0,
            retry_rate_target_pct: 10.0,
        }
    }
}

/// Minimum acceptable overall composite for the `score` command.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreConfig {
    pub min_score: f64,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self { min_score: 60.0 }
    }
}

impl Config {
    /// Load configuration from an explicit file path.
    ///
    /// Errors if the file does not exist. Use this for explicit `--config`
    /// flags. Env vars with `VERDICT_` prefix override file values.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(crate::core::Error::Config(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        let config: Self = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file_exact(path))
            .merge(Env::prefixed("VERDICT_").split("__"))
            .extract()
            .map_err(|e| crate::core::Error::Config(e.to_string()))?;
        Ok(config)
    }

    /// Load configuration from a directory, looking for verdict.toml.
    ///
    /// Missing files are silently skipped (defaults are used).
    /// Env vars with `VERDICT_` prefix override file/default values.
    pub fn load_default(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let config: Self = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(dir.join("verdict.toml")))
            .merge(Env::prefixed("VERDICT_").split("__"))
            .extract()
            .map_err(|e| crate::core::Error::Config(e.to_string()))?;
        Ok(config)
    }
}
