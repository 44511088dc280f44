//! Solve configuration
//!
//! Settings are read from a YAML file and may be overridden from the command line.
//!
//! ```yaml
//! bins_to_use: 3
//! time_limit_secs: 30
//! log_level: info
//! ```

use std::{fs, path::Path, time::Duration};

use serde::Deserialize;
use thiserror::Error;

/// Log filter used when neither the configuration nor `RUST_LOG` sets one.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Configuration Errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading the configuration file
    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Time limit is zero, negative, or not finite
    #[error("Invalid time limit: {0} seconds")]
    InvalidTimeLimit(f64),
}

/// Settings for a single solve.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolveConfig {
    /// Number of bins to take from the pool. Prompted for when absent.
    pub bins_to_use: Option<usize>,

    /// Wall-clock limit for the MILP backend, in seconds.
    pub time_limit_secs: Option<f64>,

    /// Log filter directive, e.g. `info` or `stowage=debug`.
    pub log_level: Option<String>,
}

impl SolveConfig {
    /// Parse a configuration from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] for malformed YAML or unknown keys.
    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(serde_norway::from_str(contents)?)
    }

    /// Load a configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml_str(&contents)
    }

    /// The configured time limit.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidTimeLimit`] unless the limit is finite and positive.
    pub fn time_limit(&self) -> Result<Option<Duration>, ConfigError> {
        let Some(secs) = self.time_limit_secs else {
            return Ok(None);
        };

        if secs <= 0.0 {
            return Err(ConfigError::InvalidTimeLimit(secs));
        }

        Duration::try_from_secs_f64(secs)
            .map(Some)
            .map_err(|_err| ConfigError::InvalidTimeLimit(secs))
    }

    /// The log filter directive, falling back to [`DEFAULT_LOG_LEVEL`].
    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }
}
