//! CrossLab CLI — run the trend-cross strategy or sweep its periods.
//!
//! Commands:
//! - `run` — annotate a CSV of bars, simulate trades, export results
//! - `sweep` — evaluate a grid of trend/signal periods and rank by pips
//!
//! Log verbosity follows `RUST_LOG` (default `info`). Logs go to stderr,
//! tables to stdout.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crosslab_core::domain::{AnnotatedBar, Bar, CrossEvent};
use crosslab_core::summary::TradeSummary;
use crosslab_core::StrategyConfig;
use crosslab_runner::{
    generate_synthetic_bars, load_csv, run_from_bars, sweep, write_json, write_outputs, ParamGrid,
    RunConfig, RunReport, SourceColumns,
};

const SYNTHETIC_SEED: u64 = 42;
const TAIL_ROWS: usize = 10;

#[derive(Parser)]
#[command(
    name = "crosslab",
    about = "CrossLab CLI — EMA trend-cross signals with MACD momentum exits"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Annotate bars with signals and trades.
    Run {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        params: ParamArgs,

        /// Annotated CSV destination.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Trade list JSON destination.
        #[arg(long)]
        trades: Option<PathBuf>,

        /// Run report JSON destination.
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Evaluate a grid of periods over the same bars.
    Sweep {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        params: ParamArgs,

        /// Trend EMA periods, comma separated.
        #[arg(long, value_delimiter = ',', default_values_t = [21, 34, 55, 89, 144])]
        trend_periods: Vec<usize>,

        /// MACD signal periods, comma separated. Defaults to the base value.
        #[arg(long, value_delimiter = ',')]
        signal_periods: Vec<usize>,

        /// Run configurations one after another instead of in parallel.
        #[arg(long, default_value_t = false)]
        sequential: bool,

        /// Ranked results JSON destination.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args)]
struct SourceArgs {
    /// CSV with Open, High, Low, Close columns.
    #[arg(long)]
    input: Option<PathBuf>,

    /// TOML config file; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Use this many seeded synthetic bars instead of a CSV.
    #[arg(long, conflicts_with = "input")]
    synthetic: Option<usize>,
}

#[derive(Args)]
struct ParamArgs {
    #[arg(long)]
    trend_period: Option<usize>,

    #[arg(long)]
    fast_period: Option<usize>,

    #[arg(long)]
    slow_period: Option<usize>,

    #[arg(long)]
    signal_period: Option<usize>,

    /// Price distance of one pip (0.0001 for most FX pairs, 0.01 for JPY).
    #[arg(long)]
    pip_size: Option<f64>,
}

impl ParamArgs {
    fn apply(&self, config: &mut StrategyConfig) {
        if let Some(p) = self.trend_period {
            config.trend_period = p;
        }
        if let Some(p) = self.fast_period {
            config.fast_period = p;
        }
        if let Some(p) = self.slow_period {
            config.slow_period = p;
        }
        if let Some(p) = self.signal_period {
            config.signal_period = p;
        }
        if let Some(p) = self.pip_size {
            config.pip_size = p;
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            source,
            params,
            output,
            trades,
            report,
        } => run_cmd(source, params, output, trades, report),
        Commands::Sweep {
            source,
            params,
            trend_periods,
            signal_periods,
            sequential,
            output,
        } => sweep_cmd(
            source,
            params,
            ParamGrid {
                trend_periods,
                signal_periods,
            },
            !sequential,
            output,
        ),
    }
}

/// Resolve the config file, flag overrides and bar source into a config plus
/// bars. Input text columns come back too when the bars were read from a CSV.
fn prepare(
    source: &SourceArgs,
    params: &ParamArgs,
) -> Result<(RunConfig, Vec<Bar>, Option<SourceColumns>)> {
    let mut config = match &source.config {
        Some(path) => RunConfig::from_file(path)?,
        None => RunConfig::new(PathBuf::new(), StrategyConfig::default()),
    };
    if let Some(input) = &source.input {
        config.data.input = input.clone();
    }
    params.apply(&mut config.strategy);
    config
        .strategy
        .validate()
        .context("invalid strategy parameters")?;

    if let Some(n) = source.synthetic {
        if n == 0 {
            bail!("--synthetic needs at least one bar");
        }
        tracing::info!(bars = n, seed = SYNTHETIC_SEED, "using synthetic bars");
        return Ok((config, generate_synthetic_bars(n, SYNTHETIC_SEED), None));
    }
    if config.data.input.as_os_str().is_empty() {
        bail!("one of --input, --config or --synthetic is required");
    }
    let loaded = load_csv(&config.data.input)?;
    Ok((config, loaded.bars, Some(loaded.source)))
}

fn run_cmd(
    source: SourceArgs,
    params: ParamArgs,
    output: Option<PathBuf>,
    trades: Option<PathBuf>,
    report: Option<PathBuf>,
) -> Result<()> {
    let (mut config, bars, columns) = prepare(&source, &params)?;
    if output.is_some() {
        config.data.output = output;
    }
    if trades.is_some() {
        config.data.trades_output = trades;
    }
    if report.is_some() {
        config.data.report_output = report;
    }

    let outcome = run_from_bars(&bars, &config.strategy, true)?;
    write_outputs(&config.data, &outcome, columns.as_ref())?;

    print_tail(&outcome.result.bars, TAIL_ROWS);
    print_report(&outcome.report);
    Ok(())
}

fn sweep_cmd(
    source: SourceArgs,
    params: ParamArgs,
    grid: ParamGrid,
    parallel: bool,
    output: Option<PathBuf>,
) -> Result<()> {
    if grid.trend_periods.is_empty() {
        bail!("--trend-periods must list at least one period");
    }
    let (config, bars, _) = prepare(&source, &params)?;
    let results = sweep(&bars, &config.strategy, &grid, parallel)?;
    let ranked = results.ranked();

    println!();
    println!(
        "{:>5} {:>6} {:>7} {:>7} {:>8} {:>12} {:>12}",
        "Trend", "Signal", "Trades", "Closed", "Win %", "Total pips", "Avg pips"
    );
    println!("{}", "-".repeat(63));
    for entry in &ranked {
        let s = &entry.report.summary;
        println!(
            "{:>5} {:>6} {:>7} {:>7} {:>7.1}% {:>12.1} {:>12.2}",
            entry.report.config.trend_period,
            entry.report.config.signal_period,
            s.trade_count,
            s.closed_count,
            s.win_rate * 100.0,
            s.total_pips,
            s.average_pips,
        );
    }
    println!();

    if let Some(path) = output {
        write_json(&path, &ranked)?;
        println!("Ranked results saved to: {}", path.display());
    }
    Ok(())
}

fn cell<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".into())
}

fn print_tail(bars: &[AnnotatedBar], n: usize) {
    let start = bars.len().saturating_sub(n);
    println!();
    println!(
        "{:>7} {:<20} {:>10} {:>10} {:>6} {:>11} {:>6} {:>10} {:>14} {:>4} {:>5} {:>9}",
        "Index", "Timestamp", "Close", "Trend", "Cross", "MACD hist", "Entry", "Exit", "Exit type",
        "Pos", "Trade", "Pips"
    );
    println!("{}", "-".repeat(124));
    for b in &bars[start..] {
        let cross = match b.cross_event {
            CrossEvent::None => "-",
            CrossEvent::Long => "long",
            CrossEvent::Short => "short",
        };
        println!(
            "{:>7} {:<20} {:>10.5} {:>10.5} {:>6} {:>11.6} {:>6} {:>10} {:>14} {:>4} {:>5} {:>9}",
            b.bar.index,
            cell(b.bar.timestamp),
            b.bar.close,
            b.trend_value,
            cross,
            b.oscillator.histogram,
            cell(b.entry_signal),
            cell(b.exit_signal),
            cell(b.exit_type),
            if b.in_position { "yes" } else { "no" },
            cell(b.trade_id),
            b.profit_pips
                .map(|p| format!("{p:.1}"))
                .unwrap_or_else(|| "-".into()),
        );
    }
}

fn print_report(report: &RunReport) {
    let c = &report.config;
    let s: &TradeSummary = &report.summary;
    println!();
    println!("=== Run Summary ===");
    println!(
        "Params:         trend {} | MACD {}/{}/{} | pip {}",
        c.trend_period, c.fast_period, c.slow_period, c.signal_period, c.pip_size
    );
    println!("Bars:           {}", report.bar_count);
    println!("Signals:        {}", report.signal_count);
    println!(
        "Trades:         {} ({} closed, {} open)",
        s.trade_count, s.closed_count, s.open_count
    );
    println!(
        "Exits:          {} cross reversal, {} momentum flip",
        s.cross_reversal_exits, s.momentum_flip_exits
    );
    println!("Win Rate:       {:.1}%", s.win_rate * 100.0);
    println!("Total Pips:     {:.1}", s.total_pips);
    println!("Average Pips:   {:.2}", s.average_pips);
    if let (Some(best), Some(worst)) = (s.best_pips, s.worst_pips) {
        println!("Best / Worst:   {best:.1} / {worst:.1}");
    }
    println!("Dataset:        {}", report.dataset_hash.short());
    println!("Output:         {}", report.output_hash.short());
    println!();
}
