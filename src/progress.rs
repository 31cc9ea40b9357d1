//! Synthetic progress feedback for in-flight requests.
//!
//! Pure time-to-snapshot mapping: the caller owns the clock and the timer.
//! Dropping or aborting the driving task is the cancellation story; there is
//! no hidden timer to leak. None of this affects derived results.

use std::time::Duration;

use crate::model::SimulationResult;

/// Stage cadence: one stage forward per tick.
const STAGE_MS: u64 = 800;
/// Sample counter: +47 per 100 ms tick.
const SAMPLE_TICK_MS: u64 = 100;
const SAMPLE_STEP: u64 = 47;
/// Strategy counter: +1 per 600 ms tick.
const STRATEGY_TICK_MS: u64 = 600;

/// Assumed Monte Carlo samples per simulated lap when sizing targets.
const SAMPLES_PER_LAP: u64 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Planning,
    Simulating,
    Analyzing,
    Deciding,
}

impl Stage {
    pub const ALL: [Stage; 4] = [
        Stage::Planning,
        Stage::Simulating,
        Stage::Analyzing,
        Stage::Deciding,
    ];

    pub fn index(&self) -> usize {
        match self {
            Stage::Planning => 0,
            Stage::Simulating => 1,
            Stage::Analyzing => 2,
            Stage::Deciding => 3,
        }
    }

    fn at(index: u64) -> Stage {
        match index {
            0 => Stage::Planning,
            1 => Stage::Simulating,
            2 => Stage::Analyzing,
            _ => Stage::Deciding,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Planning => "planning",
            Stage::Simulating => "simulating",
            Stage::Analyzing => "analyzing",
            Stage::Deciding => "deciding",
        }
    }
}

/// Counter ceilings, sized from the eventual result when one exists so the
/// feed lands on realistic numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressTargets {
    pub samples: u64,
    pub strategies: u64,
}

impl ProgressTargets {
    pub const DEFAULT: ProgressTargets = ProgressTargets {
        samples: 400,
        strategies: 2,
    };

    pub fn from_result(result: Option<&SimulationResult>) -> Self {
        match result.and_then(|r| r.candidates.first()) {
            Some(first) => ProgressTargets {
                samples: (first.laps_simulated() as u64 * SAMPLES_PER_LAP).max(1),
                strategies: result
                    .map(|r| r.candidates.len() as u64)
                    .unwrap_or(Self::DEFAULT.strategies),
            },
            None => Self::DEFAULT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub stage: Stage,
    pub samples: u64,
    pub strategies: u64,
}

impl ProgressSnapshot {
    /// The reset state: initial stage, zero counters.
    pub fn idle() -> Self {
        Self {
            stage: Stage::Planning,
            samples: 0,
            strategies: 0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ProgressFeed {
    targets: ProgressTargets,
}

impl ProgressFeed {
    pub fn new(targets: ProgressTargets) -> Self {
        Self { targets }
    }

    pub fn targets(&self) -> ProgressTargets {
        self.targets
    }

    /// Snapshot for a given elapsed time since the request started. Monotone
    /// in `elapsed`, clamped to the targets and the final stage.
    pub fn observe(&self, elapsed: Duration) -> ProgressSnapshot {
        let ms = elapsed.as_millis() as u64;
        let stage = Stage::at((ms / STAGE_MS).min(Stage::ALL.len() as u64 - 1));
        let samples = ((ms / SAMPLE_TICK_MS) * SAMPLE_STEP).min(self.targets.samples);
        let strategies = (ms / STRATEGY_TICK_MS).min(self.targets.strategies);
        ProgressSnapshot {
            stage,
            samples,
            strategies,
        }
    }
}
