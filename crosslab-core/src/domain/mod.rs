//! Domain types for CrossLab

pub mod annotated;
pub mod bar;
pub mod signal;
pub mod trade;

pub use annotated::{AnnotatedBar, OscillatorState};
pub use bar::{closes, validate_series, Bar};
pub use signal::{CrossEvent, Direction, ExitReason, ExitSignal};
pub use trade::{profit_in_pips, round_to, Trade, TradeExit, TradeId};
