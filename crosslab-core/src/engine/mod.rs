//! Trade simulation engine.
//!
//! Consumes the cross-event stream and the oscillator histogram and turns
//! them into entries, exits and per-bar trade annotations.

pub mod observer;
pub mod simulator;

pub use observer::{NoopObserver, SimulationObserver, TracingObserver};
pub use simulator::{exit_trigger, PositionState, SimulationResult, TradeSimulator};
