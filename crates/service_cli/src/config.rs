//! Run defaults loaded from `lookback.toml`.
//!
//! Every key is optional. Command-line flags override file values, which
//! override the built-in defaults.
//!
//! ```toml
//! paths = 200000
//! steps = 252
//! seed = 42
//! workers = 8
//! confidence = 0.99
//! antithetic = true
//! bridge = true
//! format = "json"
//! ```

use std::path::Path;

use clap::ValueEnum;
use pricer_lookback::ConfidenceLevel;
use serde::Deserialize;
use tracing::debug;

use crate::{CliError, Result};

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable table.
    #[default]
    Table,
    /// Pretty-printed JSON.
    Json,
}

/// File-level defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    /// Number of Monte Carlo paths.
    pub paths: usize,
    /// Time steps per path.
    pub steps: usize,
    /// Root seed.
    pub seed: u64,
    /// Worker count; one per logical CPU when absent.
    pub workers: Option<usize>,
    /// Two-sided confidence level: 0.90, 0.95 or 0.99.
    pub confidence: f64,
    /// Antithetic sampling.
    pub antithetic: bool,
    /// Brownian bridge extremum sampling.
    pub bridge: bool,
    /// Default output format.
    pub format: OutputFormat,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            paths: 100_000,
            steps: 252,
            seed: 42,
            workers: None,
            confidence: 0.95,
            antithetic: false,
            bridge: false,
            format: OutputFormat::Table,
        }
    }
}

impl CliConfig {
    /// Loads `path`, falling back to the defaults when the file is absent.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no configuration file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| CliError::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        let config = Self::from_toml(&content)?;
        debug!(path = %path.display(), ?config, "configuration loaded");
        Ok(config)
    }

    /// Parses TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: CliConfig = toml::from_str(content)
            .map_err(|e| CliError::Config(format!("Failed to parse TOML: {}", e)))?;
        config.confidence_level()?;
        Ok(config)
    }

    /// Maps the configured confidence level onto its z-score.
    pub fn confidence_level(&self) -> Result<ConfidenceLevel> {
        confidence_from_level(self.confidence)
    }
}

/// z-score for a supported two-sided confidence level.
pub fn confidence_from_level(level: f64) -> Result<ConfidenceLevel> {
    const TOLERANCE: f64 = 1e-9;
    [
        (0.90, ConfidenceLevel::P90),
        (0.95, ConfidenceLevel::P95),
        (0.99, ConfidenceLevel::P99),
    ]
    .into_iter()
    .find(|(l, _)| (l - level).abs() < TOLERANCE)
    .map(|(_, c)| c)
    .ok_or_else(|| {
        CliError::Config(format!(
            "Unsupported confidence level: {}. Supported: 0.90, 0.95, 0.99",
            level
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_toml() {
        let config = CliConfig::from_toml(
            r#"
            paths = 5000
            steps = 12
            seed = 7
            workers = 3
            confidence = 0.99
            antithetic = true
            bridge = true
            format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(config.paths, 5000);
        assert_eq!(config.steps, 12);
        assert_eq!(config.seed, 7);
        assert_eq!(config.workers, Some(3));
        assert!(config.antithetic);
        assert!(config.bridge);
        assert_eq!(config.format, OutputFormat::Json);
        assert_eq!(config.confidence_level().unwrap(), ConfidenceLevel::P99);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = CliConfig::from_toml("paths = 1000").unwrap();
        assert_eq!(config.paths, 1000);
        assert_eq!(config.steps, 252);
        assert_eq!(config.workers, None);
        assert_eq!(config.format, OutputFormat::Table);
    }

    #[test]
    fn test_rejects_unknown_key_and_bad_level() {
        assert!(CliConfig::from_toml("pathz = 10").is_err());
        assert!(CliConfig::from_toml("confidence = 0.5").is_err());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = CliConfig::load(Path::new("does/not/exist/lookback.toml")).unwrap();
        assert_eq!(config, CliConfig::default());
    }
}
