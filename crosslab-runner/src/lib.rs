//! CrossLab Runner — run orchestration around `crosslab-core`.
//!
//! This crate provides:
//! - TOML run configuration
//! - CSV bar loading with column validation, plus seeded synthetic bars
//! - Annotated CSV, trade JSON and run report export
//! - Single runs with fingerprinted reports
//! - Parallel parameter sweeps over trend and signal periods

pub mod config;
pub mod data_loader;
pub mod export;
pub mod runner;
pub mod sweep;

pub use config::{ConfigError, DataConfig, RunConfig};
pub use data_loader::{
    generate_synthetic_bars, load_csv, read_csv, LoadError, LoadedData, SourceColumns,
};
pub use export::{write_annotated_csv, write_json, write_trades_json};
pub use runner::{run_from_bars, run_from_config, write_outputs, RunError, RunOutcome, RunReport};
pub use sweep::{sweep, ParamGrid, SweepEntry, SweepResults};
