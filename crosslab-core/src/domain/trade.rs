//! Trade — one directional position interval from entry bar to exit bar.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::signal::{Direction, ExitReason};

/// Trade identifier. Starts at 1 and increases strictly in entry order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TradeId(pub u64);

impl TradeId {
    pub const FIRST: TradeId = TradeId(1);

    pub fn next(self) -> Self {
        TradeId(self.0 + 1)
    }
}

impl fmt::Display for TradeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Exit half of a trade, assigned exactly once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeExit {
    pub exit_index: usize,
    pub exit_price: f64,
    pub reason: ExitReason,
    /// Realized profit in pips, rounded to 5 decimals.
    pub profit_pips: f64,
}

/// A position interval. `exit` is `None` while the trade is open and stays
/// `None` if the series ends before an exit trigger fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: TradeId,
    pub direction: Direction,
    pub entry_index: usize,
    pub entry_price: f64,
    pub exit: Option<TradeExit>,
}

impl Trade {
    pub fn open(id: TradeId, direction: Direction, entry_index: usize, entry_price: f64) -> Self {
        Self {
            id,
            direction,
            entry_index,
            entry_price,
            exit: None,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.exit.is_some()
    }

    pub fn exit_index(&self) -> Option<usize> {
        self.exit.as_ref().map(|e| e.exit_index)
    }

    pub fn profit_pips(&self) -> Option<f64> {
        self.exit.as_ref().map(|e| e.profit_pips)
    }

    /// Close the trade at `price` on bar `index`, consuming the open trade.
    pub fn close(self, index: usize, price: f64, reason: ExitReason, pip_size: f64) -> Self {
        let profit_pips = profit_in_pips(self.direction, self.entry_price, price, pip_size);
        Self {
            exit: Some(TradeExit {
                exit_index: index,
                exit_price: price,
                reason,
                profit_pips,
            }),
            ..self
        }
    }

    /// Whether bar `index` lies in this trade's interval. Open trades extend
    /// to the end of the series.
    pub fn contains(&self, index: usize) -> bool {
        index >= self.entry_index && self.exit_index().map_or(true, |exit| index <= exit)
    }

    /// Number of bars from entry to exit, exclusive of the entry bar.
    pub fn bars_held(&self) -> Option<usize> {
        self.exit_index().map(|exit| exit - self.entry_index)
    }

    pub fn is_winner(&self) -> bool {
        self.profit_pips().is_some_and(|p| p > 0.0)
    }
}

/// Signed move from entry to exit in pips, positive when favorable to `direction`.
pub fn profit_in_pips(direction: Direction, entry_price: f64, exit_price: f64, pip_size: f64) -> f64 {
    let raw = match direction {
        Direction::Long => exit_price - entry_price,
        Direction::Short => entry_price - exit_price,
    };
    round_to(raw / pip_size, 5)
}

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
