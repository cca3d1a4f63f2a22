//! Staged pipeline: trend → oscillator → trade simulation.
//!
//! Each stage stores its output so later stages (and callers) can reuse it.
//! Simulation refuses to run until both indicator stages have completed.
//! A failing stage leaves earlier outputs intact.

use crate::config::StrategyConfig;
use crate::domain::{validate_series, Bar, OscillatorState};
use crate::engine::{NoopObserver, SimulationObserver, SimulationResult, TradeSimulator};
use crate::error::{CoreResult, StateError};
use crate::signal::{TrendCross, TrendSeries};

#[derive(Debug, Clone)]
pub struct StrategyPipeline {
    bars: Vec<Bar>,
    config: StrategyConfig,
    trend: Option<TrendSeries>,
    oscillator: Option<Vec<OscillatorState>>,
}

impl StrategyPipeline {
    /// Validate bars and config. Bars are copied; the caller's slice is never aliased.
    pub fn new(bars: &[Bar], config: StrategyConfig) -> CoreResult<Self> {
        validate_series(bars)?;
        config.validate()?;
        Ok(Self {
            bars: bars.to_vec(),
            config,
            trend: None,
            oscillator: None,
        })
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    pub fn trend(&self) -> Option<&TrendSeries> {
        self.trend.as_ref()
    }

    pub fn oscillator(&self) -> Option<&[OscillatorState]> {
        self.oscillator.as_deref()
    }

    pub fn compute_trend(&mut self) -> CoreResult<&TrendSeries> {
        let series = TrendCross::new(self.config.trend_period)?.compute(&self.bars)?;
        Ok(&*self.trend.insert(series))
    }

    pub fn compute_oscillator(&mut self) -> CoreResult<&[OscillatorState]> {
        let states = self.config.macd()?.compute(&self.bars)?;
        let states = self.oscillator.insert(states);
        Ok(states.as_slice())
    }

    pub fn simulate(&self) -> CoreResult<SimulationResult> {
        self.simulate_with_observer(&mut NoopObserver)
    }

    pub fn simulate_with_observer(
        &self,
        observer: &mut dyn SimulationObserver,
    ) -> CoreResult<SimulationResult> {
        let trend = self
            .trend
            .as_ref()
            .ok_or(StateError::PrerequisiteNotComputed { stage: "trend" })?;
        let oscillator = self
            .oscillator
            .as_deref()
            .ok_or(StateError::PrerequisiteNotComputed { stage: "oscillator" })?;

        let simulator = TradeSimulator::new(self.config.pip_size)?;
        Ok(simulator.run_with_observer(&self.bars, trend, oscillator, observer)?)
    }
}

/// Run every stage in order.
pub fn run(bars: &[Bar], config: &StrategyConfig) -> CoreResult<SimulationResult> {
    run_with_observer(bars, config, &mut NoopObserver)
}

pub fn run_with_observer(
    bars: &[Bar],
    config: &StrategyConfig,
    observer: &mut dyn SimulationObserver,
) -> CoreResult<SimulationResult> {
    let mut pipeline = StrategyPipeline::new(bars, *config)?;
    pipeline.compute_trend()?;
    pipeline.compute_oscillator()?;
    pipeline.simulate_with_observer(observer)
}
