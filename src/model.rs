//! Wire types for simulation results and their shape audit.
//!
//! Field names and optionality mirror the planner API contract exactly.
//! Everything here is plain data: derived metrics live in `ranking`,
//! `confidence`, `timeline` and `burst`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tolerance for the percentile-ordering check. Upstream percentiles are
/// computed from the same sample matrix, so anything beyond float noise is a
/// contract violation.
const PERCENTILE_EPS: f64 = 1e-9;

/// Default Monte Carlo sample count when the upstream assumptions omit it.
const DEFAULT_MC_SAMPLES: u32 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compound {
    Soft,
    Medium,
    Hard,
}

impl Compound {
    /// Display form, uppercase by convention ("SOFT", "MEDIUM", "HARD").
    pub fn label(&self) -> &'static str {
        match self {
            Compound::Soft => "SOFT",
            Compound::Medium => "MEDIUM",
            Compound::Hard => "HARD",
        }
    }
}

/// Identity of a candidate strategy: where to stop and what to fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyChoice {
    pub pit_lap: u32,
    pub compound: Compound,
}

/// One simulated strategy with its per-lap gap distribution.
///
/// Gap convention throughout: seconds relative to the target car, positive
/// means ahead. The three percentile series share one index space starting
/// at `base_lap`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub candidate: StrategyChoice,
    pub p50_by_lap: Vec<f64>,
    pub p90_by_lap: Vec<f64>,
    pub p10_by_lap: Vec<f64>,
    pub median_gap_after_5_laps: f64,
    /// Index into the series where the stop first takes effect. `None` means
    /// the pit lap falls outside the simulated window (no stop simulated).
    pub pit_index: Option<usize>,
    /// First lap where the gap recovers to its pre-pit level; `None` means
    /// never within the horizon.
    pub breakeven_lap: Option<u32>,
    /// Simulator assumptions, carried verbatim for display.
    #[serde(default)]
    pub assumptions: Value,
}

impl Candidate {
    pub fn laps_simulated(&self) -> usize {
        self.p50_by_lap.len()
    }

    /// Sample count behind this candidate's percentiles.
    pub fn mc_samples(&self) -> u32 {
        self.assumptions
            .get("mc_samples")
            .and_then(Value::as_u64)
            .map(|n| n as u32)
            .unwrap_or(DEFAULT_MC_SAMPLES)
    }

    /// Mean pit-lane time loss assumed by the simulator, seconds.
    pub fn pit_loss_mean(&self) -> f64 {
        self.assumptions
            .get("pit_loss_mean")
            .and_then(Value::as_f64)
            .unwrap_or(21.0)
    }
}

/// Safety-car lap range. Display shading only; no metric reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScWindow {
    pub start_lap: u32,
    pub end_lap: u32,
}

/// A full simulation result as returned by the planner. Immutable once
/// received; burst upgrades produce a new `ConfidenceView`, never touch this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub base_lap: u32,
    pub base_target_gap_s: f64,
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub sc_window: Option<ScWindow>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExplanationMetrics {
    /// The planner's own pick. Compared against the local ranking for
    /// logging, but neither overrides the other.
    #[serde(default)]
    pub selected_index: usize,
}

/// The planner's narrative around its pick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub decision: String,
    #[serde(default)]
    pub rationale: Vec<String>,
    #[serde(default)]
    pub risks: Vec<String>,
    #[serde(default)]
    pub assumptions: Vec<String>,
    #[serde(default)]
    pub fallback: Option<String>,
    #[serde(default)]
    pub metrics: ExplanationMetrics,
}

/// Horizon band of a burst re-run, for exactly one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BurstCandidate {
    pub pit_lap: u32,
    pub compound: Compound,
    pub p10: f64,
    pub p90: f64,
    pub median_gap_after_5_laps: f64,
}

/// High-fidelity re-simulation of the selected candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BurstResult {
    pub confidence: f64,
    pub mc_samples: u32,
    #[serde(default)]
    pub confidence_range: Option<f64>,
    pub best_candidate: BurstCandidate,
}

/// A shape defect found on ingestion. Flagged, never thrown: downstream
/// components degrade to an inert state instead of panicking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFlaw {
    /// Zero candidates. Valid-but-inert input, not an error.
    Empty,
    /// Percentile series of one candidate differ in length.
    UnevenSeries { index: usize },
    /// `pit_index` is present but outside the series.
    PitIndexOutOfBounds { index: usize },
    /// p10 <= p50 <= p90 violated at some lap. Upstream contract error;
    /// not silently correctable here.
    PercentileInversion { index: usize, lap: usize },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultAudit {
    pub flaws: Vec<DataFlaw>,
}

impl ResultAudit {
    /// True when every derived metric may be computed and displayed.
    pub fn is_usable(&self) -> bool {
        self.flaws.is_empty()
    }

    pub fn is_empty_result(&self) -> bool {
        self.flaws.contains(&DataFlaw::Empty)
    }
}

impl SimulationResult {
    /// Validate shape on ingestion. Returns flags; callers check
    /// `is_usable()` before rendering rather than catching anything.
    pub fn audit(&self) -> ResultAudit {
        let mut flaws = Vec::new();
        if self.candidates.is_empty() {
            flaws.push(DataFlaw::Empty);
        }
        for (index, cand) in self.candidates.iter().enumerate() {
            let len = cand.p50_by_lap.len();
            if cand.p10_by_lap.len() != len || cand.p90_by_lap.len() != len {
                flaws.push(DataFlaw::UnevenSeries { index });
                continue;
            }
            if let Some(pit) = cand.pit_index {
                if pit >= len {
                    flaws.push(DataFlaw::PitIndexOutOfBounds { index });
                }
            }
            for lap in 0..len {
                let (p10, p50, p90) = (
                    cand.p10_by_lap[lap],
                    cand.p50_by_lap[lap],
                    cand.p90_by_lap[lap],
                );
                if p10 > p50 + PERCENTILE_EPS || p50 > p90 + PERCENTILE_EPS {
                    flaws.push(DataFlaw::PercentileInversion { index, lap });
                    break;
                }
            }
        }
        ResultAudit { flaws }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cand(
        pit_lap: u32,
        p10: Vec<f64>,
        p50: Vec<f64>,
        p90: Vec<f64>,
        pit_index: Option<usize>,
    ) -> Candidate {
        Candidate {
            candidate: StrategyChoice { pit_lap, compound: Compound::Medium },
            median_gap_after_5_laps: p50.last().copied().unwrap_or(0.0),
            p10_by_lap: p10,
            p50_by_lap: p50,
            p90_by_lap: p90,
            pit_index,
            breakeven_lap: None,
            assumptions: Value::Null,
        }
    }

    #[test]
    fn empty_result_is_flagged_not_fatal() {
        let result = SimulationResult {
            base_lap: 10,
            base_target_gap_s: -1.5,
            candidates: vec![],
            sc_window: None,
        };
        let audit = result.audit();
        assert!(!audit.is_usable());
        assert!(audit.is_empty_result());
        assert_eq!(audit.flaws, vec![DataFlaw::Empty]);
    }

    #[test]
    fn well_formed_result_passes() {
        let result = SimulationResult {
            base_lap: 10,
            base_target_gap_s: -1.5,
            candidates: vec![cand(
                12,
                vec![-2.0, -1.5],
                vec![-1.0, -0.5],
                vec![0.0, 0.5],
                Some(1),
            )],
            sc_window: None,
        };
        assert!(result.audit().is_usable());
    }

    #[test]
    fn uneven_series_flagged() {
        let result = SimulationResult {
            base_lap: 10,
            base_target_gap_s: 0.0,
            candidates: vec![cand(12, vec![-1.0], vec![-0.5, 0.0], vec![0.5, 1.0], Some(0))],
            sc_window: None,
        };
        assert_eq!(
            result.audit().flaws,
            vec![DataFlaw::UnevenSeries { index: 0 }]
        );
    }

    #[test]
    fn pit_index_out_of_bounds_flagged() {
        let result = SimulationResult {
            base_lap: 10,
            base_target_gap_s: 0.0,
            candidates: vec![cand(12, vec![-1.0], vec![-0.5], vec![0.5], Some(3))],
            sc_window: None,
        };
        assert_eq!(
            result.audit().flaws,
            vec![DataFlaw::PitIndexOutOfBounds { index: 0 }]
        );
    }

    #[test]
    fn absent_pit_index_is_legal() {
        let result = SimulationResult {
            base_lap: 10,
            base_target_gap_s: 0.0,
            candidates: vec![cand(99, vec![-1.0], vec![-0.5], vec![0.5], None)],
            sc_window: None,
        };
        assert!(result.audit().is_usable());
    }

    #[test]
    fn percentile_inversion_flagged() {
        let result = SimulationResult {
            base_lap: 10,
            base_target_gap_s: 0.0,
            candidates: vec![cand(12, vec![1.0], vec![0.0], vec![2.0], Some(0))],
            sc_window: None,
        };
        assert_eq!(
            result.audit().flaws,
            vec![DataFlaw::PercentileInversion { index: 0, lap: 0 }]
        );
    }

    #[test]
    fn compound_wire_form_is_lowercase() {
        assert_eq!(serde_json::to_value(Compound::Hard).unwrap(), json!("hard"));
        let c: Compound = serde_json::from_value(json!("soft")).unwrap();
        assert_eq!(c, Compound::Soft);
        assert_eq!(c.label(), "SOFT");
    }

    #[test]
    fn mc_samples_falls_back_to_simulator_default() {
        let mut c = cand(12, vec![0.0], vec![0.0], vec![0.0], Some(0));
        assert_eq!(c.mc_samples(), 200);
        c.assumptions = json!({"mc_samples": 2000, "pit_loss_mean": 18.5});
        assert_eq!(c.mc_samples(), 2000);
        assert!((c.pit_loss_mean() - 18.5).abs() < 1e-12);
    }
}
