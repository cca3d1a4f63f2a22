//! Strategy parameters.

use serde::{Deserialize, Serialize};

use crate::error::{check_period, ValidationError};
use crate::indicators::Macd;

/// Parameters for one pipeline run. Every field has a default, so a partial
/// TOML or JSON table deserializes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    /// EMA period of the trend line that Close crosses.
    pub trend_period: usize,
    /// MACD fast EMA period.
    pub fast_period: usize,
    /// MACD slow EMA period.
    pub slow_period: usize,
    /// MACD signal EMA period.
    pub signal_period: usize,
    /// Price increment profit is expressed in.
    pub pip_size: f64,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            trend_period: 89,
            fast_period: 55,
            slow_period: 89,
            signal_period: 8,
            pip_size: 0.0001,
        }
    }
}

impl StrategyConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_period("trend_period", self.trend_period)?;
        check_period("fast_period", self.fast_period)?;
        check_period("slow_period", self.slow_period)?;
        check_period("signal_period", self.signal_period)?;
        if !self.pip_size.is_finite() || self.pip_size <= 0.0 {
            return Err(ValidationError::InvalidPipSize(self.pip_size));
        }
        Ok(())
    }

    pub fn macd(&self) -> Result<Macd, ValidationError> {
        Macd::new(self.fast_period, self.slow_period, self.signal_period)
    }

    pub fn with_trend_period(mut self, trend_period: usize) -> Self {
        self.trend_period = trend_period;
        self
    }

    pub fn with_pip_size(mut self, pip_size: f64) -> Self {
        self.pip_size = pip_size;
        self
    }
}
