//! Before/after-pit timeline reconstruction from a candidate's median series.

use crate::model::Candidate;

/// The three moments a strategy is presented as: gap just before the stop,
/// gap once the stop lands, and where the median ends up relative to the
/// starting gap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitTimeline {
    pub gap_at_pit: f64,
    pub gap_after_pit: f64,
    /// `gap_after_pit - gap_at_pit`, typically negative: the stop costs time.
    pub pit_impact: f64,
    /// `median_gap_after_5_laps - base_target_gap_s`.
    pub net_change: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Improved,
    LostGround,
    Unchanged,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Improved => "improved",
            Trend::LostGround => "lost ground",
            Trend::Unchanged => "unchanged",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Standing {
    Ahead,
    Behind,
}

impl Standing {
    pub fn as_str(&self) -> &'static str {
        match self {
            Standing::Ahead => "ahead",
            Standing::Behind => "behind",
        }
    }
}

/// Classify a net change. Exact zero is Unchanged.
pub fn trend(net_change: f64) -> Trend {
    if net_change > 0.0 {
        Trend::Improved
    } else if net_change < 0.0 {
        Trend::LostGround
    } else {
        Trend::Unchanged
    }
}

/// Sign convention for a gap value: zero counts as ahead.
pub fn standing(gap: f64) -> Standing {
    if gap >= 0.0 {
        Standing::Ahead
    } else {
        Standing::Behind
    }
}

/// Reconstruct the pit-event timeline for one candidate.
///
/// `pit_index == 0` means no laps elapsed before the stop, so the before-pit
/// gap is the base gap exactly. `pit_index == None` (pit outside the
/// simulated window) yields a flat timeline at base gap with zero impact.
pub fn reconstruct(cand: &Candidate, base_target_gap_s: f64) -> PitTimeline {
    let series = &cand.p50_by_lap;
    let (gap_at_pit, gap_after_pit) = match cand.pit_index {
        Some(pit) => {
            let at = if pit > 0 {
                series.get(pit - 1).copied().unwrap_or(base_target_gap_s)
            } else {
                base_target_gap_s
            };
            let after = series.get(pit).copied().unwrap_or(at);
            (at, after)
        }
        None => (base_target_gap_s, base_target_gap_s),
    };
    PitTimeline {
        gap_at_pit,
        gap_after_pit,
        pit_impact: gap_after_pit - gap_at_pit,
        net_change: cand.median_gap_after_5_laps - base_target_gap_s,
    }
}

impl PitTimeline {
    pub fn trend(&self) -> Trend {
        trend(self.net_change)
    }
}
