//! Property tests for pipeline invariants.
//!
//! Uses proptest to verify:
//! 1. EMA recursion — seed equals first close, every later value follows the recursion
//! 2. Cross events — bar 0 never fires, Long/Short imply the crossing inequalities
//! 3. Trade intervals — at most one trade per bar, ids strictly increasing from 1
//! 4. Profit sign — positive iff the exit moved in the trade's favor
//! 5. Idempotence — identical input and config give identical output

use proptest::prelude::*;
use crosslab_core::domain::{Bar, CrossEvent, Direction};
use crosslab_core::fingerprint::output_hash;
use crosslab_core::signal::TrendCross;
use crosslab_core::{run, StrategyConfig};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_closes() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1.0..2.0_f64, 1..200)
        .prop_map(|v| v.into_iter().map(|p| (p * 10_000.0).round() / 10_000.0).collect())
}

fn arb_config() -> impl Strategy<Value = StrategyConfig> {
    (1usize..30, 1usize..20, 1usize..40, 1usize..10).prop_map(|(trend, fast, slow, signal)| {
        StrategyConfig {
            trend_period: trend,
            fast_period: fast,
            slow_period: slow,
            signal_period: signal,
            pip_size: 0.0001,
        }
    })
}

fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| Bar::new(i, c, c, c, c))
        .collect()
}

// ── 1. EMA recursion ─────────────────────────────────────────────────

proptest! {
    #[test]
    fn ema_follows_recursion(closes in arb_closes(), period in 1usize..100) {
        let bars = bars_from_closes(&closes);
        let series = TrendCross::new(period).unwrap().compute(&bars).unwrap();
        let alpha = 2.0 / (period as f64 + 1.0);

        prop_assert_eq!(series.values[0], closes[0]);
        for i in 1..closes.len() {
            let expected = closes[i] * alpha + series.values[i - 1] * (1.0 - alpha);
            prop_assert!((series.values[i] - expected).abs() < 1e-12);
        }
    }
}

// ── 2. Cross events ──────────────────────────────────────────────────

proptest! {
    #[test]
    fn cross_events_match_definition(closes in arb_closes(), period in 1usize..50) {
        let bars = bars_from_closes(&closes);
        let series = TrendCross::new(period).unwrap().compute(&bars).unwrap();
        let (c, t) = (&closes, &series.values);

        prop_assert_eq!(series.events[0], CrossEvent::None);
        for i in 1..c.len() {
            match series.events[i] {
                CrossEvent::Long => {
                    prop_assert!(c[i] > t[i] && c[i - 1] <= t[i - 1]);
                }
                CrossEvent::Short => {
                    prop_assert!(c[i] < t[i] && c[i - 1] >= t[i - 1]);
                }
                CrossEvent::None => {
                    let long = c[i] > t[i] && c[i - 1] <= t[i - 1];
                    let short = c[i] < t[i] && c[i - 1] >= t[i - 1];
                    prop_assert!(!long && !short);
                }
            }
        }
    }
}

// ── 3. Trade intervals ───────────────────────────────────────────────

proptest! {
    #[test]
    fn trade_intervals_are_disjoint(closes in arb_closes(), config in arb_config()) {
        let result = run(&bars_from_closes(&closes), &config).unwrap();

        for (i, bar) in result.bars.iter().enumerate() {
            let owners = result.trades.iter().filter(|t| t.contains(i)).count();
            prop_assert!(owners <= 1, "bar {} owned by {} trades", i, owners);
            prop_assert_eq!(bar.in_position, owners == 1);
            prop_assert_eq!(bar.in_position, bar.trade_id.is_some());
        }

        for (n, trade) in result.trades.iter().enumerate() {
            prop_assert_eq!(trade.id.0, n as u64 + 1);
        }
        for pair in result.trades.windows(2) {
            let prev_exit = pair[0].exit_index();
            prop_assert!(prev_exit.is_some(), "only the last trade may be open");
            prop_assert!(pair[1].entry_index > prev_exit.unwrap());
        }
    }
}

// ── 4. Profit sign ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn profit_sign_matches_direction(closes in arb_closes(), config in arb_config()) {
        let result = run(&bars_from_closes(&closes), &config).unwrap();

        for trade in result.closed_trades() {
            let exit = trade.exit.as_ref().unwrap();
            let favorable = match trade.direction {
                Direction::Long => exit.exit_price > trade.entry_price,
                Direction::Short => exit.exit_price < trade.entry_price,
            };
            prop_assert_eq!(exit.profit_pips > 0.0, favorable);
            prop_assert_eq!(result.bars[exit.exit_index].profit_pips, Some(exit.profit_pips));
        }
    }
}

// ── 5. Idempotence ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn rerun_is_bit_identical(closes in arb_closes(), config in arb_config()) {
        let bars = bars_from_closes(&closes);
        let first = run(&bars, &config).unwrap();
        let second = run(&bars, &config).unwrap();
        prop_assert_eq!(output_hash(&first.bars), output_hash(&second.bars));
        prop_assert_eq!(first, second);
    }
}
