//! Parameter sweep over trend and signal periods.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crosslab_core::domain::Bar;
use crosslab_core::StrategyConfig;

use crate::runner::{run_from_bars, RunError, RunReport};

/// Parameter grid specification.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamGrid {
    /// Trend EMA periods to test
    pub trend_periods: Vec<usize>,

    /// MACD signal periods to test; empty keeps the base value
    pub signal_periods: Vec<usize>,
}

impl Default for ParamGrid {
    /// Fibonacci trend periods, base signal period.
    fn default() -> Self {
        Self {
            trend_periods: vec![21, 34, 55, 89, 144],
            signal_periods: Vec::new(),
        }
    }
}

impl ParamGrid {
    pub fn trend_only(trend_periods: Vec<usize>) -> Self {
        Self {
            trend_periods,
            signal_periods: Vec::new(),
        }
    }

    /// Returns the total number of configurations in this grid.
    pub fn size(&self) -> usize {
        self.trend_periods.len() * self.signal_periods.len().max(1)
    }

    /// Generates all configurations in the grid, trend period outermost.
    pub fn generate_configs(&self, base: &StrategyConfig) -> Vec<StrategyConfig> {
        let signals: Vec<usize> = if self.signal_periods.is_empty() {
            vec![base.signal_period]
        } else {
            self.signal_periods.clone()
        };

        self.trend_periods
            .iter()
            .flat_map(|&trend| {
                signals.iter().map(move |&signal| StrategyConfig {
                    trend_period: trend,
                    signal_period: signal,
                    ..*base
                })
            })
            .collect()
    }
}

/// One evaluated grid point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepEntry {
    pub report: RunReport,
}

impl SweepEntry {
    pub fn total_pips(&self) -> f64 {
        self.report.summary.total_pips
    }
}

/// Results from a parameter sweep, in grid order.
#[derive(Debug, Clone, Default)]
pub struct SweepResults {
    entries: Vec<SweepEntry>,
}

impl SweepResults {
    pub fn all(&self) -> &[SweepEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by total pips, best first. Ties keep grid order.
    pub fn ranked(&self) -> Vec<&SweepEntry> {
        let mut sorted: Vec<_> = self.entries.iter().collect();
        sorted.sort_by(|a, b| b.total_pips().total_cmp(&a.total_pips()));
        sorted
    }

    pub fn best(&self) -> Option<&SweepEntry> {
        self.ranked().into_iter().next()
    }
}

/// Run every grid configuration over the same bars.
///
/// Any invalid configuration fails the whole sweep.
pub fn sweep(
    bars: &[Bar],
    base: &StrategyConfig,
    grid: &ParamGrid,
    parallel: bool,
) -> Result<SweepResults, RunError> {
    let configs = grid.generate_configs(base);
    tracing::info!(configs = configs.len(), parallel, "starting sweep");

    let evaluate = |config: &StrategyConfig| -> Result<SweepEntry, RunError> {
        let outcome = run_from_bars(bars, config, false)?;
        Ok(SweepEntry {
            report: outcome.report,
        })
    };

    let entries = if parallel {
        configs
            .par_iter()
            .map(evaluate)
            .collect::<Result<Vec<_>, _>>()?
    } else {
        configs.iter().map(evaluate).collect::<Result<Vec<_>, _>>()?
    };

    Ok(SweepResults { entries })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_loader::generate_synthetic_bars;

    #[test]
    fn grid_size_and_order() {
        let grid = ParamGrid {
            trend_periods: vec![21, 34],
            signal_periods: vec![5, 8, 13],
        };
        assert_eq!(grid.size(), 6);
        let configs = grid.generate_configs(&StrategyConfig::default());
        assert_eq!(configs.len(), 6);
        assert_eq!((configs[0].trend_period, configs[0].signal_period), (21, 5));
        assert_eq!((configs[5].trend_period, configs[5].signal_period), (34, 13));
        assert!(configs.iter().all(|c| c.fast_period == 55 && c.slow_period == 89));
    }

    #[test]
    fn empty_signal_periods_keep_base() {
        let grid = ParamGrid::trend_only(vec![13, 21]);
        assert_eq!(grid.size(), 2);
        let configs = grid.generate_configs(&StrategyConfig::default());
        assert!(configs.iter().all(|c| c.signal_period == 8));
    }

    #[test]
    fn parallel_matches_sequential() {
        let bars = generate_synthetic_bars(1_500, 21);
        let grid = ParamGrid::default();
        let base = StrategyConfig::default();
        let par = sweep(&bars, &base, &grid, true).unwrap();
        let seq = sweep(&bars, &base, &grid, false).unwrap();
        assert_eq!(par.len(), grid.size());
        assert_eq!(par.all(), seq.all());
    }

    #[test]
    fn ranked_is_descending() {
        let bars = generate_synthetic_bars(1_500, 4);
        let results = sweep(&bars, &StrategyConfig::default(), &ParamGrid::default(), true).unwrap();
        let ranked = results.ranked();
        assert!(ranked
            .windows(2)
            .all(|w| w[0].total_pips() >= w[1].total_pips()));
        assert_eq!(results.best(), ranked.first().copied());
    }

    #[test]
    fn invalid_period_fails_sweep() {
        let bars = generate_synthetic_bars(100, 1);
        let grid = ParamGrid::trend_only(vec![21, 0]);
        assert!(sweep(&bars, &StrategyConfig::default(), &grid, true).is_err());
    }
}
