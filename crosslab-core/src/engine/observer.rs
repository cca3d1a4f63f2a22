//! Optional event sink for the trade simulator.
//!
//! The simulator never logs by itself. Callers that want progress or
//! diagnostics pass an observer; the default is `NoopObserver`.

use crate::domain::Trade;

/// Receives trade lifecycle events in bar order.
pub trait SimulationObserver {
    /// A trade was opened on `trade.entry_index`.
    fn on_entry(&mut self, _trade: &Trade) {}

    /// A trade was closed; `trade.exit` is set.
    fn on_exit(&mut self, _trade: &Trade) {}

    /// The pass finished. `trades` is in entry order and may end with an
    /// unresolved trade.
    fn on_finish(&mut self, _bar_count: usize, _trades: &[Trade]) {}
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl SimulationObserver for NoopObserver {}

/// Observer that emits structured `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl SimulationObserver for TracingObserver {
    fn on_entry(&mut self, trade: &Trade) {
        tracing::info!(
            trade_id = trade.id.0,
            direction = %trade.direction,
            index = trade.entry_index,
            price = trade.entry_price,
            "entry"
        );
    }

    fn on_exit(&mut self, trade: &Trade) {
        if let Some(exit) = &trade.exit {
            tracing::info!(
                trade_id = trade.id.0,
                direction = %trade.direction,
                index = exit.exit_index,
                price = exit.exit_price,
                reason = %exit.reason,
                profit_pips = exit.profit_pips,
                "exit"
            );
        }
    }

    fn on_finish(&mut self, bar_count: usize, trades: &[Trade]) {
        let unresolved = trades.iter().filter(|t| !t.is_closed()).count();
        tracing::info!(bar_count, trades = trades.len(), unresolved, "trade simulation finished");
    }
}
