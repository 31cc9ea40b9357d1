//! Candidate ordering and best-strategy selection.
//!
//! Ordering key is descending `median_gap_after_5_laps` (higher = better
//! position). Equal medians fall back to earlier breakeven, then smaller
//! pit-impact magnitude, then input order (the sort is stable). The
//! breakeven/impact tie-break is a default pending confirmation, not
//! observed upstream behavior.

use std::cmp::Ordering;

use crate::model::{Candidate, SimulationResult};
use crate::timeline;

/// A total order over candidate indices. `order[0]` is the best candidate;
/// empty input produces an empty order and no best.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ranking {
    pub order: Vec<usize>,
}

impl Ranking {
    pub fn best(&self) -> Option<usize> {
        self.order.first().copied()
    }

    /// Second-best candidate, when there is one.
    pub fn runner_up(&self) -> Option<usize> {
        self.order.get(1).copied()
    }

    /// Worst candidate under the same order.
    pub fn worst(&self) -> Option<usize> {
        self.order.last().copied()
    }
}

fn key_cmp(a: &Candidate, b: &Candidate, base_gap: f64) -> Ordering {
    // Descending median; NaN sorts last rather than poisoning the order.
    let median = match (
        a.median_gap_after_5_laps.is_nan(),
        b.median_gap_after_5_laps.is_nan(),
    ) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b
            .median_gap_after_5_laps
            .partial_cmp(&a.median_gap_after_5_laps)
            .unwrap_or(Ordering::Equal),
    };
    median
        .then_with(|| {
            let be_a = a.breakeven_lap.unwrap_or(u32::MAX);
            let be_b = b.breakeven_lap.unwrap_or(u32::MAX);
            be_a.cmp(&be_b)
        })
        .then_with(|| {
            let impact_a = timeline::reconstruct(a, base_gap).pit_impact.abs();
            let impact_b = timeline::reconstruct(b, base_gap).pit_impact.abs();
            impact_a.partial_cmp(&impact_b).unwrap_or(Ordering::Equal)
        })
}

/// Rank candidates, best first. Pure and idempotent: the permutation depends
/// only on the input values, and ranking a ranked sequence is a no-op.
pub fn rank_candidates(candidates: &[Candidate], base_gap: f64) -> Ranking {
    let mut order: Vec<usize> = (0..candidates.len()).collect();
    order.sort_by(|&i, &j| key_cmp(&candidates[i], &candidates[j], base_gap));
    Ranking { order }
}

pub fn rank(result: &SimulationResult) -> Ranking {
    rank_candidates(&result.candidates, result.base_target_gap_s)
}

/// Gap to the best candidate's median: 0 for best, <= 0 for everyone else.
pub fn delta(candidate: &Candidate, best: &Candidate) -> f64 {
    candidate.median_gap_after_5_laps - best.median_gap_after_5_laps
}

/// Spread between the best and worst medians, the headline "time saved by
/// choosing well" figure.
pub fn time_advantage(best: &Candidate, worst: &Candidate) -> f64 {
    (best.median_gap_after_5_laps - worst.median_gap_after_5_laps).abs()
}

/// Margin of the best candidate over the runner-up, `None` when there is no
/// second option.
pub fn delta_vs_next(ranking: &Ranking, candidates: &[Candidate]) -> Option<f64> {
    let best = &candidates[ranking.best()?];
    let next = &candidates[ranking.runner_up()?];
    Some(best.median_gap_after_5_laps - next.median_gap_after_5_laps)
}
