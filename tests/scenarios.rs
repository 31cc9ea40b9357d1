//! End-to-end checks over literal wire payloads: parse a plan response the
//! way the client does, audit it, then run the whole derivation pipeline.

use std::time::Duration;

use serde_json::json;

use pitwall::burst::{ConfidenceView, MergeOutcome};
use pitwall::client::PlanResponse;
use pitwall::confidence;
use pitwall::model::{BurstResult, Compound, DataFlaw};
use pitwall::progress::{ProgressFeed, ProgressTargets};
use pitwall::ranking;
use pitwall::report;
use pitwall::session::{BurstApply, Session};
use pitwall::timeline;

fn two_candidate_plan() -> PlanResponse {
    serde_json::from_value(json!({
        "sim_result": {
            "base_lap": 10,
            "base_target_gap_s": -1.5,
            "candidates": [
                {
                    "candidate": {"pit_lap": 12, "compound": "medium"},
                    "p50_by_lap": [-1.4, -21.9, -15.0, -8.0, -2.0, -0.3],
                    "p90_by_lap": [-1.0, -20.8, -13.6, -6.5, -0.4, 1.2],
                    "p10_by_lap": [-1.8, -23.0, -16.4, -9.5, -3.6, -1.8],
                    "median_gap_after_5_laps": -0.3,
                    "pit_index": 1,
                    "breakeven_lap": 19,
                    "assumptions": {"pit_loss_mean": 21.0, "mc_samples": 200}
                },
                {
                    "candidate": {"pit_lap": 14, "compound": "hard"},
                    "p50_by_lap": [-1.4, -0.9, -0.5, -21.2, -10.0, 0.6],
                    "p90_by_lap": [-1.0, -0.4, 0.1, -20.1, -8.9, 1.6],
                    "p10_by_lap": [-1.8, -1.4, -1.1, -22.3, -11.1, -0.4],
                    "median_gap_after_5_laps": 0.6,
                    "pit_index": 3,
                    "breakeven_lap": 18,
                    "assumptions": {"pit_loss_mean": 21.0, "mc_samples": 200}
                }
            ]
        },
        "explanation": {
            "decision": "Extend to lap 14 and fit the hard.",
            "rationale": ["Track position holds through the stop"],
            "risks": ["Early safety car favors the lap 12 stop"],
            "assumptions": [],
            "metrics": {"selected_index": 1}
        },
        "tool_args": {"base_lap": 10, "base_target_gap_s": -1.5}
    }))
    .expect("fixture must parse")
}

#[test]
fn ranking_picks_maximal_median_end_to_end() {
    // Two candidates, the later stop carries the higher median.
    let plan = two_candidate_plan();
    let result = &plan.sim_result;
    assert!(result.audit().is_usable());

    let ranking = ranking::rank(result);
    assert_eq!(ranking.best(), Some(1));
    let best = &result.candidates[1];
    let other = &result.candidates[0];
    assert!((ranking::delta(other, best) - (-0.9)).abs() < 1e-12);
    assert_eq!(ranking::delta(best, best), 0.0);
}

#[test]
fn confidence_from_horizon_band() {
    // The best candidate's horizon band is 2.0s wide.
    let plan = two_candidate_plan();
    let best = &plan.sim_result.candidates[1];
    assert!((confidence::band_range(best) - 2.0).abs() < 1e-12);
    assert_eq!(confidence::confidence(best), 89.0);
    assert_eq!(confidence::half_width(best), 1.0);
    assert_eq!(confidence::win_probability(best), 53.0);
}

#[test]
fn empty_result_stays_inert_everywhere() {
    // Zero candidates is valid input: nothing selects, nothing panics.
    let plan: PlanResponse = serde_json::from_value(json!({
        "sim_result": {
            "base_lap": 10,
            "base_target_gap_s": 0.0,
            "candidates": []
        },
        "explanation": {"decision": ""}
    }))
    .expect("fixture must parse");
    let result = &plan.sim_result;

    let audit = result.audit();
    assert!(audit.is_empty_result());
    assert_eq!(audit.flaws, vec![DataFlaw::Empty]);

    assert_eq!(ranking::rank(result).best(), None);
    assert!(ConfidenceView::seed(result).bands.is_empty());
    assert_eq!(
        report::summary(result, &plan.explanation, &ConfidenceView::seed(result)),
        report::inert_summary()
    );
}

#[test]
fn burst_merge_and_mismatch_through_session() {
    // A matching burst upgrades one band; a mismatched identity changes
    // nothing.
    let mut session = Session::default();
    let token = session.begin_request();
    assert!(session.apply_plan(token, two_candidate_plan()));

    let matching: BurstResult = serde_json::from_value(json!({
        "confidence": 96.5,
        "mc_samples": 2000,
        "confidence_range": 0.6,
        "best_candidate": {
            "pit_lap": 14, "compound": "hard",
            "p10": -0.2, "p90": 0.9,
            "median_gap_after_5_laps": 0.55
        }
    }))
    .expect("fixture must parse");

    let before = session.view().clone();
    assert_eq!(session.apply_burst(token, &matching), BurstApply::Merged);
    let band = &session.view().bands[1];
    assert_eq!(band.confidence, 96.5);
    assert_eq!(band.mc_samples, 2000);
    assert_eq!(session.view().bands[0], before.bands[0]);

    let mut mismatched = matching.clone();
    mismatched.best_candidate.compound = Compound::Soft;
    let after = session.view().clone();
    assert_eq!(session.apply_burst(token, &mismatched), BurstApply::Rejected);
    assert_eq!(session.view(), &after);
}

#[test]
fn merge_outcome_is_pure_over_the_view() {
    let plan = two_candidate_plan();
    let result = &plan.sim_result;
    let view = ConfidenceView::seed(result);
    let burst: BurstResult = serde_json::from_value(json!({
        "confidence": 70.0,
        "mc_samples": 2000,
        "best_candidate": {
            "pit_lap": 14, "compound": "hard",
            "p10": -0.2, "p90": 0.9,
            "median_gap_after_5_laps": 0.55
        }
    }))
    .expect("fixture must parse");
    match view.merge(result, &burst) {
        MergeOutcome::Merged(next) => {
            // Displayed confidence never drops below the seeded 89.
            assert_eq!(next.bands[1].confidence, 89.0);
        }
        MergeOutcome::Rejected => panic!("expected merge"),
    }
    assert_eq!(view, ConfidenceView::seed(result));
}

#[test]
fn timeline_matches_the_median_series() {
    let plan = two_candidate_plan();
    let result = &plan.sim_result;
    let tl = timeline::reconstruct(&result.candidates[1], result.base_target_gap_s);
    assert!((tl.gap_at_pit - (-0.5)).abs() < 1e-12);
    assert!((tl.gap_after_pit - (-21.2)).abs() < 1e-12);
    assert!((tl.pit_impact - (-20.7)).abs() < 1e-12);
    assert!((tl.net_change - 2.1).abs() < 1e-12);
    assert_eq!(tl.trend(), timeline::Trend::Improved);
}

#[test]
fn progress_tracks_the_result_shape_and_stays_bounded() {
    let plan = two_candidate_plan();
    let targets = ProgressTargets::from_result(Some(&plan.sim_result));
    assert_eq!(targets.strategies, 2);
    assert_eq!(targets.samples, 6 * 200);

    let feed = ProgressFeed::new(targets);
    let mut prev = feed.observe(Duration::ZERO);
    for ms in (0..10_000).step_by(100) {
        let snap = feed.observe(Duration::from_millis(ms));
        assert!(snap.samples <= targets.samples);
        assert!(snap.strategies <= targets.strategies);
        assert!(snap.samples >= prev.samples);
        prev = snap;
    }
    let done = feed.observe(Duration::from_secs(120));
    assert_eq!(done.samples, targets.samples);
    assert_eq!(done.strategies, targets.strategies);
}

#[test]
fn summary_over_the_full_fixture() {
    let plan = two_candidate_plan();
    let view = ConfidenceView::seed(&plan.sim_result);
    let text = report::summary(&plan.sim_result, &plan.explanation, &view);
    assert!(text.contains("DECISION: pit lap 14 for HARD"));
    assert!(text.contains("Extend to lap 14 and fit the hard."));
    assert!(text.contains("lap 12 MEDIUM"));
    assert!(text.contains("Early safety car favors the lap 12 stop"));
}
