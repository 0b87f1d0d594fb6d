//! Run loop.
//!
//! [`run`] steps a [`Model`] until it stops running or an optional tick cap
//! is hit, calling a [`TickCallback`] after every tick so callers can
//! stream summaries out as they happen.

use tracing::{info, warn};

use unrest_types::TickSummary;

use crate::model::Model;

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// The iteration count passed `max_iters`.
    MaxItersReached,
    /// The caller's tick cap was reached first.
    TickCapReached,
}

/// Result of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunResult {
    /// Why the run ended.
    pub end_reason: EndReason,
    /// Ticks executed by this call.
    pub total_ticks: u64,
    /// Counts at the end of the run.
    pub final_summary: TickSummary,
}

/// Callback invoked after each tick completes.
pub trait TickCallback {
    /// Called with the summary just recorded and the model after the tick.
    fn on_tick(&mut self, summary: &TickSummary, model: &Model);
}

/// A callback that does nothing.
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _summary: &TickSummary, _model: &Model) {}
}

/// Step `model` until it stops running or `tick_cap` ticks have run.
pub fn run(model: &mut Model, tick_cap: Option<u64>, callback: &mut dyn TickCallback) -> RunResult {
    let mut total_ticks: u64 = 0;

    info!(
        max_iters = model.config().max_iters,
        tick_cap,
        scheduler = %model.scheduler_kind(),
        "Simulation starting"
    );

    let end_reason = loop {
        if !model.is_running() {
            break EndReason::MaxItersReached;
        }
        if tick_cap.is_some_and(|cap| total_ticks >= cap) {
            break EndReason::TickCapReached;
        }

        let summary = model.step();
        total_ticks = total_ticks.saturating_add(1);
        callback.on_tick(&summary, model);
    };

    RunResult {
        end_reason,
        total_ticks,
        final_summary: model.summary(),
    }
}

/// Log the end of a run.
pub fn log_run_end(result: &RunResult) {
    info!(
        reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        final_tick = result.final_summary.tick,
        quiescent = result.final_summary.quiescent,
        active = result.final_summary.active,
        jailed = result.final_summary.jailed,
        cops = result.final_summary.cops,
        "Simulation ended"
    );
    if result.total_ticks == 0 {
        warn!("Simulation ended with no ticks executed");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::ModelConfig;

    fn small(max_iters: u64) -> ModelConfig {
        ModelConfig {
            width: 10,
            height: 10,
            max_iters,
            ..ModelConfig::default()
        }
    }

    struct Collect(Vec<u64>);

    impl TickCallback for Collect {
        fn on_tick(&mut self, summary: &TickSummary, _model: &Model) {
            self.0.push(summary.tick);
        }
    }

    #[test]
    fn runs_until_max_iters_exceeded() {
        let mut model = Model::new(&small(4)).unwrap();
        let mut ticks = Collect(Vec::new());
        let result = run(&mut model, None, &mut ticks);

        assert_eq!(result.end_reason, EndReason::MaxItersReached);
        assert_eq!(result.total_ticks, 5);
        assert_eq!(ticks.0, vec![1, 2, 3, 4, 5]);
        assert_eq!(result.final_summary.tick, 5);
    }

    #[test]
    fn tick_cap_stops_early() {
        let mut model = Model::new(&small(100)).unwrap();
        let result = run(&mut model, Some(3), &mut NoOpCallback);
        assert_eq!(result.end_reason, EndReason::TickCapReached);
        assert_eq!(result.total_ticks, 3);
        assert_eq!(model.iteration(), 3);
    }

    #[test]
    fn zero_cap_runs_nothing() {
        let mut model = Model::new(&small(100)).unwrap();
        let result = run(&mut model, Some(0), &mut NoOpCallback);
        assert_eq!(result.total_ticks, 0);
        assert_eq!(result.final_summary.tick, 0);
    }
}
