//! CrossLab Core — EMA trend crossovers, MACD momentum, single-position trade simulation.
//!
//! This crate contains the pure, deterministic part of the backtester:
//! - Domain types (bars, directions, cross events, trades, annotated bars)
//! - EMA and MACD indicators seeded from the first close
//! - Close / EMA crossover signal
//! - Single-position trade simulator (fold with explicit accumulator)
//! - Staged pipeline with prerequisite checks
//! - Trade summary and BLAKE3 run fingerprints
//!
//! No I/O happens here. Loading, export and the command line live in
//! `crosslab-runner` and `crosslab-cli`.

pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod indicators;
pub mod pipeline;
pub mod signal;
pub mod summary;

pub use config::StrategyConfig;
pub use error::{CoreError, CoreResult, StateError, ValidationError};
pub use pipeline::{run, StrategyPipeline};
