//! Single-position trade simulator.
//!
//! A forward fold over the bar sequence carrying an explicit accumulator
//! (position state, trade counter, finished trades). Each bar is processed
//! in order because its outcome depends on the previous bar's state.
//!
//! State machine per bar:
//! - `Flat` + Long/Short cross event → open a trade at the close.
//! - `Open(dir)` → exit on the opposite cross event (priority 1) or on a
//!   histogram flip against `dir` (priority 2); otherwise stay open.
//!
//! A reversal event is consumed as an exit only; the earliest re-entry is the
//! next bar. Trades still open at the last bar stay unresolved.

use serde::{Deserialize, Serialize};

use super::observer::{NoopObserver, SimulationObserver};
use crate::domain::{
    AnnotatedBar, Bar, CrossEvent, Direction, ExitReason, ExitSignal, OscillatorState, Trade,
    TradeId,
};
use crate::error::ValidationError;
use crate::signal::TrendSeries;

/// Position state during the scan.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PositionState {
    #[default]
    Flat,
    Open(Trade),
}

/// Trade annotations for one bar.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct BarMarking {
    entry_signal: Option<Direction>,
    exit_signal: Option<ExitSignal>,
    exit_type: Option<ExitReason>,
    trade_id: Option<TradeId>,
    profit_pips: Option<f64>,
}

/// Scan accumulator. Owned by one simulation run and discarded afterwards.
#[derive(Debug, Default)]
struct ScanState {
    position: PositionState,
    last_id: Option<TradeId>,
    trades: Vec<Trade>,
    markings: Vec<BarMarking>,
}

impl ScanState {
    fn next_id(&mut self) -> TradeId {
        let id = self.last_id.map_or(TradeId::FIRST, TradeId::next);
        self.last_id = Some(id);
        id
    }

    fn step(
        &mut self,
        index: usize,
        close: f64,
        event: CrossEvent,
        histogram: f64,
        pip_size: f64,
        observer: &mut dyn SimulationObserver,
    ) -> BarMarking {
        match std::mem::take(&mut self.position) {
            PositionState::Flat => {
                let Some(direction) = event.direction() else {
                    return BarMarking::default();
                };
                let trade = Trade::open(self.next_id(), direction, index, close);
                observer.on_entry(&trade);
                let marking = BarMarking {
                    entry_signal: Some(direction),
                    trade_id: Some(trade.id),
                    ..BarMarking::default()
                };
                self.position = PositionState::Open(trade);
                marking
            }
            PositionState::Open(trade) => {
                let Some(reason) = exit_trigger(trade.direction, event, histogram) else {
                    let marking = BarMarking {
                        trade_id: Some(trade.id),
                        ..BarMarking::default()
                    };
                    self.position = PositionState::Open(trade);
                    return marking;
                };

                let closed = trade.close(index, close, reason, pip_size);
                observer.on_exit(&closed);
                let marking = BarMarking {
                    exit_signal: Some(ExitSignal::closing(closed.direction)),
                    exit_type: Some(reason),
                    trade_id: Some(closed.id),
                    profit_pips: closed.profit_pips(),
                    ..BarMarking::default()
                };
                self.trades.push(closed);
                marking
            }
        }
    }

    fn finish(mut self) -> (Vec<Trade>, Vec<BarMarking>) {
        if let PositionState::Open(trade) = std::mem::take(&mut self.position) {
            self.trades.push(trade);
        }
        (self.trades, self.markings)
    }
}

/// First exit trigger that fires for an open trade, in priority order.
pub fn exit_trigger(direction: Direction, event: CrossEvent, histogram: f64) -> Option<ExitReason> {
    if event.direction().is_some_and(|d| d != direction) {
        return Some(ExitReason::CrossReversal);
    }
    let flipped = match direction {
        Direction::Long => histogram < 0.0,
        Direction::Short => histogram > 0.0,
    };
    flipped.then_some(ExitReason::MomentumFlip)
}

/// Output of one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub bars: Vec<AnnotatedBar>,
    /// Trades in entry order; the last one may be unresolved.
    pub trades: Vec<Trade>,
}

impl SimulationResult {
    pub fn closed_trades(&self) -> impl Iterator<Item = &Trade> {
        self.trades.iter().filter(|t| t.is_closed())
    }

    /// The trade left open at the end of the series, if any.
    pub fn open_trade(&self) -> Option<&Trade> {
        self.trades.last().filter(|t| !t.is_closed())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeSimulator {
    pip_size: f64,
}

impl TradeSimulator {
    pub fn new(pip_size: f64) -> Result<Self, ValidationError> {
        if !pip_size.is_finite() || pip_size <= 0.0 {
            return Err(ValidationError::InvalidPipSize(pip_size));
        }
        Ok(Self { pip_size })
    }

    pub fn pip_size(&self) -> f64 {
        self.pip_size
    }

    pub fn run(
        &self,
        bars: &[Bar],
        trend: &TrendSeries,
        oscillator: &[OscillatorState],
    ) -> Result<SimulationResult, ValidationError> {
        self.run_with_observer(bars, trend, oscillator, &mut NoopObserver)
    }

    /// Simulate trades over aligned bars, trend and oscillator series.
    pub fn run_with_observer(
        &self,
        bars: &[Bar],
        trend: &TrendSeries,
        oscillator: &[OscillatorState],
        observer: &mut dyn SimulationObserver,
    ) -> Result<SimulationResult, ValidationError> {
        check_aligned(bars.len(), trend, oscillator)?;

        let inputs = bars.iter().zip(&trend.events).zip(oscillator).enumerate();
        let state = inputs.fold(ScanState::default(), |mut state, (i, ((bar, &event), osc))| {
            let marking = state.step(i, bar.close, event, osc.histogram, self.pip_size, observer);
            state.markings.push(marking);
            state
        });
        let (trades, markings) = state.finish();
        observer.on_finish(bars.len(), &trades);

        let annotated = bars
            .iter()
            .zip(&trend.values)
            .zip(&trend.events)
            .zip(oscillator)
            .zip(markings)
            .map(|((((bar, &trend_value), &cross_event), &osc), m)| AnnotatedBar {
                entry_signal: m.entry_signal,
                exit_signal: m.exit_signal,
                exit_type: m.exit_type,
                in_position: m.trade_id.is_some(),
                trade_id: m.trade_id,
                profit_pips: m.profit_pips,
                ..AnnotatedBar::flat(bar.clone(), trend_value, cross_event, osc)
            })
            .collect();

        Ok(SimulationResult {
            bars: annotated,
            trades,
        })
    }
}

fn check_aligned(
    expected: usize,
    trend: &TrendSeries,
    oscillator: &[OscillatorState],
) -> Result<(), ValidationError> {
    if expected == 0 {
        return Err(ValidationError::EmptySeries);
    }
    let series = [
        ("trend values", trend.values.len()),
        ("cross events", trend.events.len()),
        ("oscillator", oscillator.len()),
    ];
    for (name, actual) in series {
        if actual != expected {
            return Err(ValidationError::LengthMismatch {
                series: name,
                expected,
                actual,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_bars;

    fn trend_from(events: Vec<CrossEvent>) -> TrendSeries {
        TrendSeries {
            values: vec![0.0; events.len()],
            events,
        }
    }

    fn osc_from(histogram: &[f64]) -> Vec<OscillatorState> {
        histogram
            .iter()
            .map(|&h| OscillatorState {
                line: h,
                signal_line: 0.0,
                histogram: h,
            })
            .collect()
    }

    use crate::domain::CrossEvent::{Long as L, None as N, Short as S};

    #[test]
    fn opens_on_first_event_and_holds() {
        let bars = make_bars(&[1.0, 1.1, 1.2, 1.3]);
        let sim = TradeSimulator::new(0.1).unwrap();
        let result = sim
            .run(&bars, &trend_from(vec![N, L, N, N]), &osc_from(&[0.0, 1.0, 1.0, 1.0]))
            .unwrap();

        let ids: Vec<_> = result.bars.iter().map(|b| b.trade_id).collect();
        assert_eq!(ids, vec![None, Some(TradeId(1)), Some(TradeId(1)), Some(TradeId(1))]);
        assert_eq!(result.bars[1].entry_signal, Some(Direction::Long));
        assert!(result.bars.iter().all(|b| b.exit_type.is_none()));
        let open = result.open_trade().unwrap();
        assert_eq!(open.entry_index, 1);
        assert_eq!(open.entry_price, 1.1);
    }

    #[test]
    fn reversal_beats_momentum_on_same_bar() {
        let bars = make_bars(&[10.0, 12.0, 11.0]);
        let sim = TradeSimulator::new(1.0).unwrap();
        // Bar 2 has both the opposite event and a negative histogram.
        let result = sim
            .run(&bars, &trend_from(vec![N, L, S]), &osc_from(&[0.0, 1.0, -1.0]))
            .unwrap();
        assert_eq!(result.bars[2].exit_type, Some(ExitReason::CrossReversal));
        assert_eq!(result.bars[2].exit_signal, Some(ExitSignal::ExitLong));
        assert_eq!(result.bars[2].profit_pips, Some(-1.0));
    }

    #[test]
    fn momentum_flip_exits_short() {
        let bars = make_bars(&[10.0, 9.0, 8.0, 8.5]);
        let sim = TradeSimulator::new(0.5).unwrap();
        let result = sim
            .run(&bars, &trend_from(vec![N, S, N, N]), &osc_from(&[0.0, -1.0, -0.5, 0.2]))
            .unwrap();
        let exit_bar = &result.bars[3];
        assert_eq!(exit_bar.exit_type, Some(ExitReason::MomentumFlip));
        assert_eq!(exit_bar.exit_signal, Some(ExitSignal::ExitShort));
        // (9.0 - 8.5) / 0.5 = 1.0
        assert_eq!(exit_bar.profit_pips, Some(1.0));
        assert!(exit_bar.in_position);
    }

    #[test]
    fn entry_bar_ignores_momentum() {
        // Histogram is already against the trade on the entry bar.
        let bars = make_bars(&[1.0, 2.0, 3.0]);
        let sim = TradeSimulator::new(1.0).unwrap();
        let result = sim
            .run(&bars, &trend_from(vec![N, L, N]), &osc_from(&[0.0, -5.0, 1.0]))
            .unwrap();
        assert!(result.bars[1].exit_type.is_none());
        assert!(result.open_trade().is_some());
    }

    #[test]
    fn reversal_does_not_reenter_same_bar() {
        let bars = make_bars(&[1.0, 2.0, 1.5, 1.2, 1.0]);
        let sim = TradeSimulator::new(1.0).unwrap();
        let result = sim
            .run(
                &bars,
                &trend_from(vec![N, L, S, N, S]),
                &osc_from(&[0.0, 1.0, 1.0, -1.0, -1.0]),
            )
            .unwrap();
        // Bar 2 exits trade 1; bar 3 is flat; bar 4 opens trade 2.
        assert_eq!(result.bars[2].trade_id, Some(TradeId(1)));
        assert!(result.bars[2].entry_signal.is_none());
        assert_eq!(result.bars[3].trade_id, None);
        assert!(!result.bars[3].in_position);
        assert_eq!(result.bars[4].trade_id, Some(TradeId(2)));
        assert_eq!(result.bars[4].entry_signal, Some(Direction::Short));
        assert_eq!(result.trades.len(), 2);
    }

    #[test]
    fn same_direction_event_while_open_is_ignored() {
        let bars = make_bars(&[1.0, 2.0, 3.0]);
        let sim = TradeSimulator::new(1.0).unwrap();
        let result = sim
            .run(&bars, &trend_from(vec![N, L, L]), &osc_from(&[0.0, 1.0, 1.0]))
            .unwrap();
        assert_eq!(result.trades.len(), 1);
        assert!(result.bars[2].entry_signal.is_none());
        assert!(result.bars[2].exit_type.is_none());
    }

    #[test]
    fn zero_histogram_does_not_exit() {
        let bars = make_bars(&[1.0, 2.0, 3.0]);
        let sim = TradeSimulator::new(1.0).unwrap();
        let result = sim
            .run(&bars, &trend_from(vec![N, S, N]), &osc_from(&[0.0, 0.0, 0.0]))
            .unwrap();
        assert!(result.open_trade().is_some());
    }

    #[test]
    fn exit_trigger_priority() {
        assert_eq!(
            exit_trigger(Direction::Long, CrossEvent::Short, -1.0),
            Some(ExitReason::CrossReversal)
        );
        assert_eq!(
            exit_trigger(Direction::Long, CrossEvent::None, -1.0),
            Some(ExitReason::MomentumFlip)
        );
        assert_eq!(exit_trigger(Direction::Short, CrossEvent::Short, -1.0), None);
        assert_eq!(
            exit_trigger(Direction::Short, CrossEvent::Long, -1.0),
            Some(ExitReason::CrossReversal)
        );
    }

    #[test]
    fn rejects_misaligned_inputs() {
        let bars = make_bars(&[1.0, 2.0]);
        let sim = TradeSimulator::new(1.0).unwrap();
        let err = sim
            .run(&bars, &trend_from(vec![N, N]), &osc_from(&[0.0]))
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::LengthMismatch {
                series: "oscillator",
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn rejects_empty_and_bad_pip_size() {
        let sim = TradeSimulator::new(1.0).unwrap();
        assert_eq!(
            sim.run(&[], &trend_from(vec![]), &[]),
            Err(ValidationError::EmptySeries)
        );
        assert!(TradeSimulator::new(0.0).is_err());
        assert!(TradeSimulator::new(f64::NAN).is_err());
        assert!(TradeSimulator::new(-0.0001).is_err());
    }

    #[derive(Default)]
    struct Recorder {
        entries: Vec<TradeId>,
        exits: Vec<(TradeId, ExitReason)>,
        finished: Option<(usize, usize)>,
    }

    impl SimulationObserver for Recorder {
        fn on_entry(&mut self, trade: &Trade) {
            self.entries.push(trade.id);
        }
        fn on_exit(&mut self, trade: &Trade) {
            self.exits.push((trade.id, trade.exit.as_ref().unwrap().reason));
        }
        fn on_finish(&mut self, bar_count: usize, trades: &[Trade]) {
            self.finished = Some((bar_count, trades.len()));
        }
    }

    #[test]
    fn observer_sees_lifecycle_in_order() {
        let bars = make_bars(&[1.0, 2.0, 1.0, 1.0, 2.0]);
        let sim = TradeSimulator::new(1.0).unwrap();
        let mut recorder = Recorder::default();
        sim.run_with_observer(
            &bars,
            &trend_from(vec![N, L, S, N, L]),
            &osc_from(&[0.0, 1.0, -1.0, 0.0, 1.0]),
            &mut recorder,
        )
        .unwrap();
        assert_eq!(recorder.entries, vec![TradeId(1), TradeId(2)]);
        assert_eq!(recorder.exits, vec![(TradeId(1), ExitReason::CrossReversal)]);
        assert_eq!(recorder.finished, Some((5, 2)));
    }
}
