//! Confidence and win-probability heuristics from the percentile spread.
//!
//! Both formulas are untuned heuristics preserved for display compatibility.
//! They are deterministic functions of the candidate and nothing more; do not
//! read them as calibrated probabilities.

use crate::model::Candidate;

pub const CONFIDENCE_FLOOR: f64 = 60.0;
pub const CONFIDENCE_CEIL: f64 = 95.0;
pub const WIN_PROB_FLOOR: f64 = 10.0;
pub const WIN_PROB_CEIL: f64 = 90.0;

/// P10-P90 spread at the simulation horizon, seconds. Empty series read as
/// zero spread.
pub fn band_range(cand: &Candidate) -> f64 {
    match (cand.p90_by_lap.last(), cand.p10_by_lap.last()) {
        (Some(p90), Some(p10)) => (p90 - p10).abs(),
        _ => 0.0,
    }
}

/// Displayed confidence percentage: tighter horizon spread reads higher,
/// clamped to [60, 95] regardless of input.
pub fn confidence(cand: &Candidate) -> f64 {
    (CONFIDENCE_CEIL - 3.0 * band_range(cand)).clamp(CONFIDENCE_FLOOR, CONFIDENCE_CEIL)
}

/// Heuristic chance of finishing ahead, centered at 50% for a zero gap and
/// saturating at [10, 90] for large leads or deficits.
pub fn win_probability(cand: &Candidate) -> f64 {
    (50.0 + 5.0 * cand.median_gap_after_5_laps).clamp(WIN_PROB_FLOOR, WIN_PROB_CEIL)
}

/// Half of the P10-P90 spread, the reported "plus or minus" figure.
pub fn half_width(cand: &Candidate) -> f64 {
    band_range(cand) / 2.0
}
