//! Per-bar output of the full pipeline.

use serde::{Deserialize, Serialize};

use super::bar::Bar;
use super::signal::{CrossEvent, Direction, ExitReason, ExitSignal};
use super::trade::TradeId;

/// Momentum oscillator state at one bar.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OscillatorState {
    /// Fast EMA minus slow EMA.
    pub line: f64,
    /// EMA of `line`.
    pub signal_line: f64,
    /// `line - signal_line`.
    pub histogram: f64,
}

/// A bar with its trend, oscillator and trade annotations.
///
/// Absent values are `None`, never a sentinel: a bar outside any trade has
/// `trade_id == None`, `in_position == false`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedBar {
    pub bar: Bar,
    pub trend_value: f64,
    pub cross_event: CrossEvent,
    pub oscillator: OscillatorState,
    pub entry_signal: Option<Direction>,
    pub exit_signal: Option<ExitSignal>,
    pub exit_type: Option<ExitReason>,
    pub in_position: bool,
    pub trade_id: Option<TradeId>,
    pub profit_pips: Option<f64>,
}

impl AnnotatedBar {
    /// Bar with indicator values and no trade membership.
    pub fn flat(bar: Bar, trend_value: f64, cross_event: CrossEvent, oscillator: OscillatorState) -> Self {
        Self {
            bar,
            trend_value,
            cross_event,
            oscillator,
            entry_signal: None,
            exit_signal: None,
            exit_type: None,
            in_position: false,
            trade_id: None,
            profit_pips: None,
        }
    }
}
