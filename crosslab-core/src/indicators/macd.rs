//! MACD momentum oscillator.
//!
//! line = EMA(close, fast) - EMA(close, slow)
//! signal = EMA(line, signal_period)
//! histogram = line - signal
//!
//! Each EMA is seeded with its own first input, so all three series are
//! defined from index 0.

use super::ema::ema_of_series;
use crate::domain::{closes, Bar, OscillatorState};
use crate::error::{check_period, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Macd {
    pub fast_period: usize,
    pub slow_period: usize,
    pub signal_period: usize,
}

impl Macd {
    pub fn new(fast_period: usize, slow_period: usize, signal_period: usize) -> Result<Self, ValidationError> {
        check_period("fast_period", fast_period)?;
        check_period("slow_period", slow_period)?;
        check_period("signal_period", signal_period)?;
        Ok(Self {
            fast_period,
            slow_period,
            signal_period,
        })
    }

    pub fn default_params() -> Self {
        Self {
            fast_period: 55,
            slow_period: 89,
            signal_period: 8,
        }
    }

    /// Oscillator state for every bar.
    pub fn compute(&self, bars: &[Bar]) -> Result<Vec<OscillatorState>, ValidationError> {
        self.compute_series(&closes(bars))
    }

    /// Oscillator state for a raw close series.
    pub fn compute_series(&self, closes: &[f64]) -> Result<Vec<OscillatorState>, ValidationError> {
        if closes.is_empty() {
            return Err(ValidationError::EmptySeries);
        }

        let fast = ema_of_series(closes, self.fast_period);
        let slow = ema_of_series(closes, self.slow_period);
        let line: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
        let signal = ema_of_series(&line, self.signal_period);

        Ok(line
            .iter()
            .zip(&signal)
            .map(|(&line, &signal_line)| OscillatorState {
                line,
                signal_line,
                histogram: line - signal_line,
            })
            .collect())
    }
}
