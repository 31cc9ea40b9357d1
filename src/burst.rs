//! Displayed uncertainty bands and the burst-merge rule.
//!
//! A `ConfidenceView` is the presentation-side state derived from a
//! `SimulationResult`: one band per candidate. A burst re-run targets exactly
//! one candidate; merging replaces that band only, never lowers its displayed
//! confidence, and rejects identity mismatches without touching anything.

use crate::confidence;
use crate::model::{BurstResult, SimulationResult};

#[derive(Debug, Clone, PartialEq)]
pub struct Band {
    pub confidence: f64,
    pub p10: f64,
    pub p90: f64,
    pub mc_samples: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfidenceView {
    pub bands: Vec<Band>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MergeOutcome {
    Merged(ConfidenceView),
    /// No candidate matches the burst identity, or the view does not line up
    /// with the result. Fail-soft: the prior view stays current.
    Rejected,
}

impl ConfidenceView {
    /// Baseline bands straight from the estimator and each candidate's
    /// horizon values.
    pub fn seed(result: &SimulationResult) -> Self {
        let bands = result
            .candidates
            .iter()
            .map(|c| Band {
                confidence: confidence::confidence(c),
                p10: c.p10_by_lap.last().copied().unwrap_or(0.0),
                p90: c.p90_by_lap.last().copied().unwrap_or(0.0),
                mc_samples: c.mc_samples(),
            })
            .collect();
        Self { bands }
    }

    pub fn band(&self, index: usize) -> Option<&Band> {
        self.bands.get(index)
    }

    /// Fold a burst result in, producing a new view. The original is never
    /// mutated; a rejected merge leaves the caller holding the prior state.
    pub fn merge(&self, result: &SimulationResult, burst: &BurstResult) -> MergeOutcome {
        let target = result.candidates.iter().position(|c| {
            c.candidate.pit_lap == burst.best_candidate.pit_lap
                && c.candidate.compound == burst.best_candidate.compound
        });
        let index = match target {
            Some(i) if i < self.bands.len() => i,
            _ => return MergeOutcome::Rejected,
        };
        let mut next = self.clone();
        let prior = &self.bands[index];
        next.bands[index] = Band {
            // Displayed confidence only ever moves up.
            confidence: burst.confidence.max(prior.confidence),
            p10: burst.best_candidate.p10,
            p90: burst.best_candidate.p90,
            mc_samples: burst.mc_samples,
        };
        MergeOutcome::Merged(next)
    }
}
