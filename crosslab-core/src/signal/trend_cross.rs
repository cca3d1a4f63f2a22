//! Close / EMA crossover signal.
//!
//! Fires Long when Close crosses above the trend EMA.
//! Fires Short when Close crosses below the trend EMA.

use serde::{Deserialize, Serialize};

use crate::domain::{closes, Bar, CrossEvent};
use crate::error::ValidationError;
use crate::indicators::{Ema, Indicator};

/// Trend line and cross events, one entry per bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSeries {
    pub values: Vec<f64>,
    pub events: Vec<CrossEvent>,
}

impl TrendSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of bars with a Long or Short event.
    pub fn signal_count(&self) -> usize {
        self.events.iter().filter(|e| e.is_some()).count()
    }
}

/// Trend crossover signal generator.
///
/// # Indicator dependencies
/// One EMA of Close with period `period`, seeded with the first close.
#[derive(Debug, Clone)]
pub struct TrendCross {
    ema: Ema,
}

impl TrendCross {
    pub fn new(period: usize) -> Result<Self, ValidationError> {
        Ok(Self {
            ema: Ema::new(period)?,
        })
    }

    pub fn period(&self) -> usize {
        self.ema.period()
    }

    pub fn name(&self) -> &str {
        "trend_cross"
    }

    pub fn compute(&self, bars: &[Bar]) -> Result<TrendSeries, ValidationError> {
        if bars.is_empty() {
            return Err(ValidationError::EmptySeries);
        }
        let values = self.ema.compute(bars);
        let events = cross_events(&closes(bars), &values);
        Ok(TrendSeries { values, events })
    }
}

/// Cross events for aligned close and trend series.
///
/// Bar 0 never fires: there is no previous relation to flip from.
/// Equality on the current bar never fires; on the previous bar it counts
/// as "not yet above" (for Long) or "not yet below" (for Short).
pub fn cross_events(closes: &[f64], trend: &[f64]) -> Vec<CrossEvent> {
    let n = closes.len().min(trend.len());
    let mut events = vec![CrossEvent::None; n];

    for i in 1..n {
        let (c, t) = (closes[i], trend[i]);
        let (pc, pt) = (closes[i - 1], trend[i - 1]);

        // Current bar: close > trend. Previous bar: close <= trend.
        if c > t && pc <= pt {
            events[i] = CrossEvent::Long;
        // Current bar: close < trend. Previous bar: close >= trend.
        } else if c < t && pc >= pt {
            events[i] = CrossEvent::Short;
        }
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars};

    #[test]
    fn reference_scenario() {
        let bars = make_bars(&[10.0, 12.0, 11.0, 9.0]);
        let series = TrendCross::new(2).unwrap().compute(&bars).unwrap();

        assert_approx(series.values[0], 10.0, 1e-9);
        assert_approx(series.values[1], 34.0 / 3.0, 1e-9);
        assert_approx(series.values[2], 100.0 / 9.0, 1e-9);
        assert_approx(series.values[3], 262.0 / 27.0, 1e-9);
        assert_eq!(
            series.events,
            vec![
                CrossEvent::None,
                CrossEvent::Long,
                CrossEvent::Short,
                CrossEvent::None
            ]
        );
        assert_eq!(series.signal_count(), 2);
    }

    #[test]
    fn first_bar_never_fires() {
        let events = cross_events(&[5.0], &[1.0]);
        assert_eq!(events, vec![CrossEvent::None]);
    }

    #[test]
    fn equality_on_current_bar_does_not_fire() {
        // prev below, current touching
        let events = cross_events(&[1.0, 2.0], &[2.0, 2.0]);
        assert_eq!(events[1], CrossEvent::None);
    }

    #[test]
    fn equality_on_previous_bar_allows_flip() {
        let long = cross_events(&[2.0, 3.0], &[2.0, 2.5]);
        assert_eq!(long[1], CrossEvent::Long);
        let short = cross_events(&[2.0, 1.0], &[2.0, 1.5]);
        assert_eq!(short[1], CrossEvent::Short);
    }

    #[test]
    fn no_fire_when_trend_continues() {
        let events = cross_events(&[3.0, 4.0, 5.0], &[1.0, 2.0, 3.0]);
        assert!(events.iter().all(|e| *e == CrossEvent::None));
    }

    #[test]
    fn single_bar_series() {
        let series = TrendCross::new(89).unwrap().compute(&make_bars(&[1.1])).unwrap();
        assert_eq!(series.values, vec![1.1]);
        assert_eq!(series.events, vec![CrossEvent::None]);
    }

    #[test]
    fn rejects_empty_and_zero_period() {
        assert_eq!(
            TrendCross::new(10).unwrap().compute(&[]),
            Err(ValidationError::EmptySeries)
        );
        assert!(TrendCross::new(0).is_err());
    }

    #[test]
    fn name_and_period() {
        let sig = TrendCross::new(89).unwrap();
        assert_eq!(sig.name(), "trend_cross");
        assert_eq!(sig.period(), 89);
    }
}
