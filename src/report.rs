//! Plain-text strategy summary and report artifact persistence.
//!
//! The summary is rebuilt from scratch on every call from the result, the
//! planner's explanation and the current confidence view. Rendering never
//! panics on odd shapes; callers gate on the audit first and fall back to
//! `inert_summary` when the result is unusable.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::burst::ConfidenceView;
use crate::confidence;
use crate::model::{Explanation, SimulationResult};
use crate::ranking;
use crate::timeline;

/// Rationale lines shown in the summary before the list is cut off.
const MAX_RATIONALE_LINES: usize = 3;

/// What to print when the result carries no usable candidates.
pub fn inert_summary() -> String {
    "No viable strategies in this window. Adjust the question and plan again.".to_string()
}

/// Render the full decision summary. Assumes `result.audit().is_usable()`;
/// degenerate shapes still render (as the inert message) rather than panic.
pub fn summary(result: &SimulationResult, explanation: &Explanation, view: &ConfidenceView) -> String {
    let ranking = ranking::rank(result);
    let best_index = match ranking.best() {
        Some(i) => i,
        None => return inert_summary(),
    };
    let best = &result.candidates[best_index];
    let tl = timeline::reconstruct(best, result.base_target_gap_s);

    let mut out = String::new();

    out.push_str(&format!(
        "DECISION: pit lap {} for {}\n",
        best.candidate.pit_lap,
        best.candidate.compound.label(),
    ));
    if explanation.metrics.selected_index != best_index {
        out.push_str(&format!(
            "  (planner selected option {}, local ranking prefers option {})\n",
            explanation.metrics.selected_index + 1,
            best_index + 1,
        ));
    }
    if !explanation.decision.is_empty() {
        out.push_str(&format!("  {}\n", explanation.decision));
    }

    let conf = view
        .band(best_index)
        .map(|b| b.confidence)
        .unwrap_or_else(|| confidence::confidence(best));
    out.push_str(&format!(
        "\nConfidence {:.0}%, win probability {:.0}%, margin +/-{:.1}s\n",
        conf,
        confidence::win_probability(best),
        confidence::half_width(best),
    ));
    if let Some(band) = view.band(best_index) {
        out.push_str(&format!(
            "Horizon band [{:+.1}s, {:+.1}s] from {} samples\n",
            band.p10, band.p90, band.mc_samples,
        ));
    }

    out.push_str(&format!(
        "\nTimeline: {:+.1}s at the stop, {:+.1}s once it lands (impact {:+.1}s)\n",
        tl.gap_at_pit, tl.gap_after_pit, tl.pit_impact,
    ));
    out.push_str(&format!(
        "Net after 5 laps: {:+.1}s ({}), finishing {} of the target car\n",
        tl.net_change,
        tl.trend().as_str(),
        timeline::standing(best.median_gap_after_5_laps).as_str(),
    ));
    if let Some(be) = best.breakeven_lap {
        out.push_str(&format!("Breakeven on lap {}\n", be));
    }
    if let Some(sc) = &result.sc_window {
        out.push_str(&format!(
            "Safety car window: laps {}-{}\n",
            sc.start_lap, sc.end_lap,
        ));
    }

    if result.candidates.len() > 1 {
        out.push_str("\nOptions, best first:\n");
        for &i in &ranking.order {
            let c = &result.candidates[i];
            let mut line = format!(
                "  lap {} {}: median {:+.1}s",
                c.candidate.pit_lap,
                c.candidate.compound.label(),
                c.median_gap_after_5_laps,
            );
            if i != best_index {
                line.push_str(&format!(" ({:+.1}s vs best)", ranking::delta(c, best)));
            }
            match c.breakeven_lap {
                Some(be) => line.push_str(&format!(", breakeven lap {}", be)),
                None => line.push_str(", no breakeven in window"),
            }
            out.push_str(&line);
            out.push('\n');
        }
        if let Some(margin) = ranking::delta_vs_next(&ranking, &result.candidates) {
            out.push_str(&format!("Margin over the next-best option: {:.1}s\n", margin));
        }
        if let Some(worst_index) = ranking.worst() {
            let adv = ranking::time_advantage(best, &result.candidates[worst_index]);
            if adv > 0.0 {
                out.push_str(&format!(
                    "Choosing well is worth {:.1}s over the weakest option\n",
                    adv,
                ));
            }
        }
    }

    if !explanation.rationale.is_empty() {
        out.push_str("\nWhy:\n");
        for line in explanation.rationale.iter().take(MAX_RATIONALE_LINES) {
            out.push_str(&format!("  - {}\n", line));
        }
    }
    if !explanation.risks.is_empty() {
        out.push_str("Risks:\n");
        for line in &explanation.risks {
            out.push_str(&format!("  - {}\n", line));
        }
    }
    if let Some(fallback) = &explanation.fallback {
        out.push_str(&format!("Fallback: {}\n", fallback));
    }

    out
}

/// Write a downloaded report artifact under `dir`, creating it if needed.
pub fn save_report(dir: &Path, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("cannot create report directory {}", dir.display()))?;
    let path = dir.join(filename);
    fs::write(&path, bytes).with_context(|| format!("cannot write {}", path.display()))?;
    Ok(path)
}
