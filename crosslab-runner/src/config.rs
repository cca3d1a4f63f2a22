//! TOML run configuration.
//!
//! ```toml
//! [strategy]
//! trend_period = 89
//! fast_period = 55
//! slow_period = 89
//! signal_period = 8
//! pip_size = 0.0001
//!
//! [data]
//! input = "data/EURUSD.csv"
//! output = "results/EURUSD_signals.csv"
//! trades_output = "results/EURUSD_trades.json"
//! report_output = "results/EURUSD_report.json"
//! ```
//!
//! `[strategy]` may be omitted or partial; missing keys take their defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crosslab_core::{StrategyConfig, ValidationError};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid strategy parameters: {0}")]
    Invalid(#[from] ValidationError),
}

/// Where bars come from and where results go.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    /// CSV with Open, High, Low, Close columns.
    pub input: PathBuf,
    /// Annotated CSV destination.
    #[serde(default)]
    pub output: Option<PathBuf>,
    /// Trade list (JSON) destination.
    #[serde(default)]
    pub trades_output: Option<PathBuf>,
    /// Run report (JSON) destination.
    #[serde(default)]
    pub report_output: Option<PathBuf>,
}

/// Complete configuration for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub strategy: StrategyConfig,
    pub data: DataConfig,
}

impl RunConfig {
    pub fn new(input: impl Into<PathBuf>, strategy: StrategyConfig) -> Self {
        Self {
            strategy,
            data: DataConfig {
                input: input.into(),
                output: None,
                trades_output: None,
                report_output: None,
            },
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: RunConfig = toml::from_str(s)?;
        config.strategy.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}
