use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use serde_json::json;

use pitwall::client::{Config, HttpPlanner, PlannerApi};
use pitwall::logging::{self, obj, v_num, v_str, Domain};
use pitwall::progress::{ProgressFeed, ProgressTargets};
use pitwall::report;
use pitwall::session::{BoundaryAction, BurstApply, Session};

const PRESET_QUESTIONS: [&str; 3] = [
    "We are P2, 1.5s behind the leader on lap 10. Pit now for mediums or extend two laps?",
    "Box for hards on lap 14 or stay out and cover the undercut?",
    "Safety car likely between laps 15 and 18. When should we stop?",
];

fn question_from_args() -> String {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        PRESET_QUESTIONS[0].to_string()
    } else {
        args.join(" ")
    }
}

fn flag(name: &str) -> bool {
    std::env::var(name).as_deref() == Ok("1")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();
    let question = question_from_args();
    logging::info(
        Domain::System,
        "startup",
        obj(&[
            ("api_base", v_str(&cfg.api_base)),
            ("question", v_str(&question)),
        ]),
    );

    let planner = HttpPlanner::new(cfg.clone())?;
    let mut session = Session::default();
    let token = session.begin_request();

    // Synthetic progress while the plan request is in flight. The task only
    // logs; aborting it when the response lands is the cancellation.
    let feed = ProgressFeed::new(ProgressTargets::DEFAULT);
    let started = Instant::now();
    let progress = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(std::time::Duration::from_millis(100));
        let mut last_stage = None;
        loop {
            ticker.tick().await;
            let snap = feed.observe(started.elapsed());
            if last_stage != Some(snap.stage) {
                last_stage = Some(snap.stage);
                logging::info(
                    Domain::Plan,
                    "progress_stage",
                    obj(&[
                        ("stage", v_str(snap.stage.as_str())),
                        ("samples", v_num(snap.samples as f64)),
                        ("strategies", v_num(snap.strategies as f64)),
                    ]),
                );
            }
        }
    });

    let planned = planner.plan(&question).await;
    progress.abort();
    let response = match planned {
        Ok(r) => r,
        Err(err) => {
            logging::error(Domain::Plan, "plan_failed", obj(&[("error", v_str(&err.to_string()))]));
            eprintln!("{}", err);
            return Err(err);
        }
    };
    logging::info(
        Domain::Plan,
        "plan_ok",
        obj(&[
            ("candidates", v_num(response.sim_result.candidates.len() as f64)),
            ("elapsed_s", v_num(started.elapsed().as_secs_f64())),
        ]),
    );

    if !session.apply_plan(token, response) {
        logging::warn(Domain::Plan, "stale_response_discarded", obj(&[]));
        return Ok(());
    }

    let result = match session.result() {
        Some(r) => r.clone(),
        None => return Ok(()),
    };
    let audit = result.audit();
    if !audit.is_usable() {
        logging::warn(
            Domain::Derive,
            "result_unusable",
            obj(&[("flaws", json!(format!("{:?}", audit.flaws)))]),
        );
        println!("{}", report::inert_summary());
        return Ok(());
    }

    let explanation = session.explanation().cloned().unwrap_or_default();
    println!("{}", report::summary(&result, &explanation, session.view()));

    if flag("BURST") {
        if let Some(tool_args) = session.tool_args().cloned() {
            if session.gate.try_begin(BoundaryAction::Burst) {
                logging::info(Domain::Burst, "burst_start", obj(&[]));
                match planner.trigger_burst(&tool_args).await {
                    Ok(burst) => match session.apply_burst(token, &burst) {
                        BurstApply::Merged => {
                            logging::info(
                                Domain::Burst,
                                "burst_merged",
                                obj(&[
                                    ("confidence", v_num(burst.confidence)),
                                    ("mc_samples", v_num(burst.mc_samples as f64)),
                                ]),
                            );
                            println!("{}", report::summary(&result, &explanation, session.view()));
                        }
                        BurstApply::Rejected => {
                            logging::warn(Domain::Burst, "burst_rejected", obj(&[]));
                        }
                        BurstApply::Stale => {
                            logging::warn(Domain::Burst, "burst_stale", obj(&[]));
                        }
                    },
                    Err(err) => {
                        logging::error(
                            Domain::Burst,
                            "burst_failed",
                            obj(&[("error", v_str(&err.to_string()))]),
                        );
                        eprintln!("{}", err);
                    }
                }
                session.gate.finish(BoundaryAction::Burst);
            }
        } else {
            logging::warn(Domain::Burst, "burst_skipped_no_tool_args", obj(&[]));
        }
    }

    if flag("REPORT") {
        if let Some(tool_args) = session.tool_args().cloned() {
            if session.gate.try_begin(BoundaryAction::Report) {
                logging::info(Domain::Report, "report_start", obj(&[]));
                let outcome = async {
                    let artifact = planner
                        .trigger_report(&tool_args, &result, &explanation)
                        .await?;
                    let bytes = planner.fetch_report(&artifact.filename).await?;
                    report::save_report(Path::new(&cfg.report_dir), &artifact.filename, &bytes)
                }
                .await;
                match outcome {
                    Ok(path) => {
                        logging::info(
                            Domain::Report,
                            "report_saved",
                            obj(&[("path", v_str(&path.display().to_string()))]),
                        );
                        println!("Report saved to {}", path.display());
                    }
                    Err(err) => {
                        logging::error(
                            Domain::Report,
                            "report_failed",
                            obj(&[("error", v_str(&err.to_string()))]),
                        );
                        eprintln!("{}", err);
                    }
                }
                session.gate.finish(BoundaryAction::Report);
            }
        } else {
            logging::warn(Domain::Report, "report_skipped_no_tool_args", obj(&[]));
        }
    }

    Ok(())
}
