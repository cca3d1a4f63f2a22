//! Signal generation — detects crossing events, emits directional intent.
//!
//! Signals never see position state. They describe a market event; the
//! trade simulator decides what to do with it.

pub mod trend_cross;

pub use trend_cross::{cross_events, TrendCross, TrendSeries};
