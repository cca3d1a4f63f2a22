//! Run wiring: load → pipeline → export.
//!
//! Two entry points:
//! - `run_from_config()`: loads the CSV named in a `RunConfig`, runs, writes
//!   every configured output. Used by the CLI.
//! - `run_from_bars()`: takes pre-loaded bars, no I/O. Used by sweeps and tests.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crosslab_core::domain::Bar;
use crosslab_core::engine::{SimulationResult, TracingObserver};
use crosslab_core::fingerprint::{config_hash, dataset_hash, output_hash, Fingerprint};
use crosslab_core::pipeline::run_with_observer;
use crosslab_core::summary::TradeSummary;
use crosslab_core::{CoreError, StrategyConfig};

use crate::config::{ConfigError, DataConfig, RunConfig};
use crate::data_loader::{load_csv, LoadError, SourceColumns};
use crate::export::{write_annotated_csv, write_json, write_trades_json};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("pipeline error: {0}")]
    Core(#[from] CoreError),
    #[error("export error: {0:#}")]
    Export(#[from] anyhow::Error),
}

/// Current schema version for persisted reports.
pub const SCHEMA_VERSION: u32 = 1;

/// Reproducibility record of a single run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub config: StrategyConfig,
    pub bar_count: usize,
    pub signal_count: usize,
    pub dataset_hash: Fingerprint,
    pub config_hash: Fingerprint,
    pub output_hash: Fingerprint,
    pub summary: TradeSummary,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Report plus the full simulation output.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub report: RunReport,
    pub result: SimulationResult,
}

/// Run the pipeline on pre-loaded bars. No I/O; trade events go to `tracing`
/// when `trace_trades` is set.
pub fn run_from_bars(
    bars: &[Bar],
    config: &StrategyConfig,
    trace_trades: bool,
) -> Result<RunOutcome, RunError> {
    let result = if trace_trades {
        run_with_observer(bars, config, &mut TracingObserver)?
    } else {
        crosslab_core::run(bars, config)?
    };

    let report = RunReport {
        schema_version: SCHEMA_VERSION,
        config: *config,
        bar_count: result.bars.len(),
        signal_count: result.bars.iter().filter(|b| b.cross_event.is_some()).count(),
        dataset_hash: dataset_hash(bars),
        config_hash: config_hash(config),
        output_hash: output_hash(&result.bars),
        summary: TradeSummary::from_trades(&result.trades),
    };

    Ok(RunOutcome { report, result })
}

/// Load, run and export as configured.
pub fn run_from_config(config: &RunConfig) -> Result<RunOutcome, RunError> {
    config.strategy.validate().map_err(CoreError::from)?;
    let loaded = load_csv(&config.data.input)?;

    tracing::info!(
        trend_period = config.strategy.trend_period,
        fast_period = config.strategy.fast_period,
        slow_period = config.strategy.slow_period,
        signal_period = config.strategy.signal_period,
        pip_size = config.strategy.pip_size,
        "running pipeline"
    );
    let outcome = run_from_bars(&loaded.bars, &config.strategy, true)?;
    write_outputs(&config.data, &outcome, Some(&loaded.source))?;
    Ok(outcome)
}

/// Write every output path set in `data`. Unset paths are skipped.
///
/// `source` carries the input's extra columns into the annotated CSV.
pub fn write_outputs(
    data: &DataConfig,
    outcome: &RunOutcome,
    source: Option<&SourceColumns>,
) -> Result<(), RunError> {
    if let Some(path) = &data.output {
        write_annotated_csv(path, &outcome.result.bars, source)?;
    }
    if let Some(path) = &data.trades_output {
        write_trades_json(path, &outcome.result.trades)?;
    }
    if let Some(path) = &data.report_output {
        write_json(path, &outcome.report)?;
        tracing::info!(path = %path.display(), "saved run report");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_loader::generate_synthetic_bars;
    use crosslab_core::ValidationError;

    #[test]
    fn report_matches_result() {
        let bars = generate_synthetic_bars(2_000, 11);
        let config = StrategyConfig::default().with_trend_period(21);
        let outcome = run_from_bars(&bars, &config, false).unwrap();
        let report = &outcome.report;
        assert_eq!(report.bar_count, 2_000);
        assert_eq!(report.summary.trade_count, outcome.result.trades.len());
        assert_eq!(report.output_hash, output_hash(&outcome.result.bars));
        assert!(report.signal_count >= report.summary.trade_count);
    }

    #[test]
    fn rerun_has_identical_report() {
        let bars = generate_synthetic_bars(1_000, 3);
        let config = StrategyConfig::default();
        let a = run_from_bars(&bars, &config, false).unwrap();
        let b = run_from_bars(&bars, &config, true).unwrap();
        assert_eq!(a.report, b.report);
    }

    #[test]
    fn empty_bars_is_core_error() {
        let err = run_from_bars(&[], &StrategyConfig::default(), false).unwrap_err();
        assert!(matches!(
            err,
            RunError::Core(CoreError::Validation(ValidationError::EmptySeries))
        ));
    }

    #[test]
    fn report_json_roundtrip() {
        let bars = generate_synthetic_bars(300, 5);
        let outcome = run_from_bars(&bars, &StrategyConfig::default(), false).unwrap();
        let json = serde_json::to_string(&outcome.report).unwrap();
        let deser: RunReport = serde_json::from_str(&json).unwrap();
        assert_eq!(deser, outcome.report);
    }
}
