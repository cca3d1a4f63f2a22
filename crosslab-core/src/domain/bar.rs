//! Bar — the fundamental market data unit.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// OHLC bar at a position in an ordered series.
///
/// `index` is the ordering key. Open/High/Low are validated on load but only
/// `close` drives the trend, oscillator and trade computations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub index: usize,
    pub timestamp: Option<NaiveDateTime>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Bar {
    /// Bar without a timestamp.
    pub fn new(index: usize, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            index,
            timestamp: None,
            open,
            high,
            low,
            close,
        }
    }

    /// Returns true if any OHLC field is NaN or infinite (void bar).
    pub fn is_void(&self) -> bool {
        !(self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite())
    }

    /// Check every OHLC field is finite, naming the first offending field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let fields = [
            ("Open", self.open),
            ("High", self.high),
            ("Low", self.low),
            ("Close", self.close),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(ValidationError::NonFinitePrice {
                    index: self.index,
                    field,
                });
            }
        }
        Ok(())
    }

    /// Basic OHLC sanity check: high is the top of the range, low the bottom.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
    }
}

/// Validate an entire series: non-empty, every bar finite.
pub fn validate_series(bars: &[Bar]) -> Result<(), ValidationError> {
    if bars.is_empty() {
        return Err(ValidationError::EmptySeries);
    }
    bars.iter().try_for_each(Bar::validate)
}

/// Extract the close column.
pub fn closes(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bar() -> Bar {
        Bar::new(0, 1.1000, 1.1050, 1.0980, 1.1030)
    }

    #[test]
    fn bar_is_sane() {
        assert!(sample_bar().is_sane());
    }

    #[test]
    fn closes_in_series_order() {
        let bars = vec![sample_bar(), Bar::new(1, 1.2, 1.3, 1.1, 1.25)];
        assert_eq!(closes(&bars), vec![1.1030, 1.25]);
        assert!(closes(&[]).is_empty());
    }

    #[test]
    fn bar_detects_void() {
        let mut bar = sample_bar();
        bar.open = f64::NAN;
        assert!(bar.is_void());
        assert!(!bar.is_sane());
    }

    #[test]
    fn bar_detects_insane_high_low() {
        let mut bar = sample_bar();
        bar.high = 1.0970;
        assert!(!bar.is_sane());
    }

    #[test]
    fn validate_names_field_and_index() {
        let mut bar = sample_bar();
        bar.index = 7;
        bar.close = f64::INFINITY;
        assert_eq!(
            bar.validate(),
            Err(ValidationError::NonFinitePrice {
                index: 7,
                field: "Close"
            })
        );
    }

    #[test]
    fn empty_series_rejected() {
        assert_eq!(validate_series(&[]), Err(ValidationError::EmptySeries));
    }

    #[test]
    fn bar_serialization_roundtrip() {
        let bar = sample_bar();
        let json = serde_json::to_string(&bar).unwrap();
        let deser: Bar = serde_json::from_str(&json).unwrap();
        assert_eq!(bar, deser);
    }
}
