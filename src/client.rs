//! HTTP contract layer for the remote planning service.
//!
//! The service is the external collaborator: it parses the question, runs the
//! Monte Carlo engine and writes report artifacts. This module only speaks
//! its request/response contract. Errors carry the payload's `detail` field
//! verbatim when the server provides one; nothing is retried automatically —
//! a timeout is a normal failure surfaced to the caller.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

use crate::model::{BurstResult, Explanation, SimulationResult};

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base: String,
    pub plan_timeout: Duration,
    pub report_timeout: Duration,
    pub burst_timeout: Duration,
    /// Where downloaded report artifacts are written.
    pub report_dir: String,
}

fn env_secs(key: &str, default: u64) -> Duration {
    Duration::from_secs(
        std::env::var(key)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default),
    )
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            api_base: std::env::var("API_BASE")
                .unwrap_or_else(|_| "http://127.0.0.1:8000".to_string()),
            plan_timeout: env_secs("PLAN_TIMEOUT_SECS", 30),
            report_timeout: env_secs("REPORT_TIMEOUT_SECS", 90),
            burst_timeout: env_secs("BURST_TIMEOUT_SECS", 180),
            report_dir: std::env::var("REPORT_DIR").unwrap_or_else(|_| "./reports".to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Timings {
    pub planner_s: f64,
    pub total_s: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Meta {
    pub provider: String,
    pub planner_model: String,
}

/// Full `/plan_and_explain` response.
#[derive(Debug, Clone, Deserialize)]
pub struct PlanResponse {
    pub sim_result: SimulationResult,
    pub explanation: Explanation,
    #[serde(default)]
    pub trace: Option<Value>,
    #[serde(default)]
    pub timings: Option<Timings>,
    #[serde(default)]
    pub meta: Option<Meta>,
    /// Planner tool arguments, echoed back so later trigger calls can reuse
    /// them verbatim.
    #[serde(default)]
    pub tool_args: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReportArtifact {
    pub filename: String,
}

/// `/mcp/trigger` envelope, shared by both actions.
#[derive(Debug, Deserialize)]
struct TriggerResponse {
    status: String,
    #[serde(default)]
    artifact: Option<ReportArtifact>,
    #[serde(default)]
    data: Option<BurstResult>,
    #[serde(default)]
    detail: Option<String>,
}

/// Seam for the remote planner so the orchestration is testable without a
/// server.
#[async_trait]
pub trait PlannerApi {
    async fn plan(&self, user_text: &str) -> Result<PlanResponse>;
    async fn trigger_report(
        &self,
        tool_args: &Value,
        sim_result: &SimulationResult,
        explanation: &Explanation,
    ) -> Result<ReportArtifact>;
    async fn trigger_burst(&self, tool_args: &Value) -> Result<BurstResult>;
    async fn fetch_report(&self, filename: &str) -> Result<Vec<u8>>;
}

pub struct HttpPlanner {
    client: Client,
    base: Url,
    cfg: Config,
}

impl HttpPlanner {
    pub fn new(cfg: Config) -> Result<Self> {
        let base = Url::parse(&cfg.api_base)
            .with_context(|| format!("invalid API_BASE: {}", cfg.api_base))?;
        Ok(Self {
            client: Client::new(),
            base,
            cfg,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .with_context(|| format!("cannot join endpoint path {}", path))
    }

    /// Artifact URL for a generated report filename.
    pub fn report_url(&self, filename: &str) -> Result<Url> {
        self.endpoint(&format!("reports/{}", filename))
    }

    async fn post_trigger(&self, body: Value, timeout: Duration, what: &str) -> Result<TriggerResponse> {
        let url = self.endpoint("mcp/trigger")?;
        let resp = self
            .client
            .post(url)
            .timeout(timeout)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("{} request failed", what))?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.json::<Value>().await.ok();
            return Err(anyhow!(transport_detail(status.as_u16(), body.as_ref(), what)));
        }
        let trigger: TriggerResponse = resp
            .json()
            .await
            .with_context(|| format!("{} response was not valid JSON", what))?;
        if trigger.status != "success" {
            let detail = trigger
                .detail
                .unwrap_or_else(|| format!("{} reported status {:?}", what, trigger.status));
            return Err(anyhow!(detail));
        }
        Ok(trigger)
    }
}

/// User-visible message for a failed transport call: the server's `detail`
/// verbatim when present, a generic fallback otherwise.
pub fn transport_detail(status: u16, body: Option<&Value>, what: &str) -> String {
    match body
        .and_then(|v| v.get("detail"))
        .and_then(Value::as_str)
    {
        Some(detail) => detail.to_string(),
        None => format!("{} failed with status {}", what, status),
    }
}

#[async_trait]
impl PlannerApi for HttpPlanner {
    async fn plan(&self, user_text: &str) -> Result<PlanResponse> {
        let url = self.endpoint("plan_and_explain")?;
        let resp = self
            .client
            .post(url)
            .timeout(self.cfg.plan_timeout)
            .json(&json!({ "user_text": user_text }))
            .send()
            .await
            .context("plan request failed")?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.json::<Value>().await.ok();
            return Err(anyhow!(transport_detail(
                status.as_u16(),
                body.as_ref(),
                "plan"
            )));
        }
        resp.json().await.context("plan response was not valid JSON")
    }

    async fn trigger_report(
        &self,
        tool_args: &Value,
        sim_result: &SimulationResult,
        explanation: &Explanation,
    ) -> Result<ReportArtifact> {
        let body = json!({
            "action": "report",
            "tool_args": tool_args,
            "sim_result": sim_result,
            "explanation": explanation,
        });
        let trigger = self
            .post_trigger(body, self.cfg.report_timeout, "report")
            .await?;
        trigger
            .artifact
            .ok_or_else(|| anyhow!("report succeeded but returned no artifact"))
    }

    async fn trigger_burst(&self, tool_args: &Value) -> Result<BurstResult> {
        let body = json!({
            "action": "burst",
            "tool_args": tool_args,
        });
        let trigger = self
            .post_trigger(body, self.cfg.burst_timeout, "burst")
            .await?;
        trigger
            .data
            .ok_or_else(|| anyhow!("burst succeeded but returned no data"))
    }

    async fn fetch_report(&self, filename: &str) -> Result<Vec<u8>> {
        let url = self.report_url(filename)?;
        let resp = self
            .client
            .get(url)
            .timeout(self.cfg.report_timeout)
            .send()
            .await
            .context("report download failed")?;
        if !resp.status().is_success() {
            return Err(anyhow!("report download failed with status {}", resp.status()));
        }
        Ok(resp.bytes().await.context("report body read failed")?.to_vec())
    }
}
