//! Trade statistics derived from a simulation's trade list.

use serde::{Deserialize, Serialize};

use crate::domain::{round_to, ExitReason, Trade};

/// Aggregate statistics over a run's trades, in pips.
///
/// Unresolved trades count toward `trade_count` and `open_count` only;
/// every pip figure is over closed trades.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TradeSummary {
    pub trade_count: usize,
    pub closed_count: usize,
    pub open_count: usize,
    pub winners: usize,
    pub losers: usize,
    /// Winners / closed trades, 0.0 with no closed trades.
    pub win_rate: f64,
    pub total_pips: f64,
    pub average_pips: f64,
    pub best_pips: Option<f64>,
    pub worst_pips: Option<f64>,
    pub cross_reversal_exits: usize,
    pub momentum_flip_exits: usize,
}

impl TradeSummary {
    pub fn from_trades(trades: &[Trade]) -> Self {
        let mut summary = TradeSummary {
            trade_count: trades.len(),
            ..TradeSummary::default()
        };

        for exit in trades.iter().filter_map(|t| t.exit.as_ref()) {
            let pips = exit.profit_pips;
            summary.closed_count += 1;
            summary.total_pips += pips;
            if pips > 0.0 {
                summary.winners += 1;
            } else if pips < 0.0 {
                summary.losers += 1;
            }
            summary.best_pips = Some(summary.best_pips.map_or(pips, |b| b.max(pips)));
            summary.worst_pips = Some(summary.worst_pips.map_or(pips, |w| w.min(pips)));
            match exit.reason {
                ExitReason::CrossReversal => summary.cross_reversal_exits += 1,
                ExitReason::MomentumFlip => summary.momentum_flip_exits += 1,
            }
        }

        summary.open_count = summary.trade_count - summary.closed_count;
        summary.total_pips = round_to(summary.total_pips, 5);
        if summary.closed_count > 0 {
            summary.win_rate = summary.winners as f64 / summary.closed_count as f64;
            summary.average_pips = round_to(summary.total_pips / summary.closed_count as f64, 5);
        }
        summary
    }
}
