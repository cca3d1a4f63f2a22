//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = alpha * close[t] + (1 - alpha) * EMA[t-1], alpha = 2 / (period + 1).
//! Seed: EMA[0] = close[0]. No warmup gap; infinite memory with geometric decay.

use super::Indicator;
use crate::domain::{closes, Bar};
use crate::error::{check_period, ValidationError};

#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    name: String,
}

impl Ema {
    pub fn new(period: usize) -> Result<Self, ValidationError> {
        check_period("ema period", period)?;
        Ok(Self {
            period,
            name: format!("ema_{period}"),
        })
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// Smoothing factor 2 / (period + 1).
    pub fn alpha(&self) -> f64 {
        smoothing_factor(self.period)
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        ema_of_series(&closes(bars), self.period)
    }
}

pub fn smoothing_factor(period: usize) -> f64 {
    2.0 / (period as f64 + 1.0)
}

/// Compute EMA values from a pre-extracted f64 slice.
///
/// Used by the MACD oscillator for its fast, slow and signal lines.
/// Returns an empty vector for empty input. `period` must be >= 1.
pub fn ema_of_series(values: &[f64], period: usize) -> Vec<f64> {
    let alpha = smoothing_factor(period);
    let mut result = Vec::with_capacity(values.len());
    let mut iter = values.iter();

    let Some(&seed) = iter.next() else {
        return result;
    };
    result.push(seed);

    let mut prev = seed;
    for &v in iter {
        let ema = v * alpha + prev * (1.0 - alpha);
        result.push(ema);
        prev = ema;
    }

    result
}
