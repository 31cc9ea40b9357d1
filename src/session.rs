//! Orchestration state for one interactive session.
//!
//! This is the only mutable state in the crate: the current result,
//! explanation and confidence view, plus the gating and staleness rules for
//! the two boundary actions. Updates replace whole values; nothing reaches
//! into a received result and edits it.

use serde_json::Value;

use crate::burst::{ConfidenceView, MergeOutcome};
use crate::client::PlanResponse;
use crate::model::{BurstResult, Explanation, SimulationResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryAction {
    Report,
    Burst,
}

impl BoundaryAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            BoundaryAction::Report => "report",
            BoundaryAction::Burst => "burst",
        }
    }
}

/// Serializes the boundary actions: while either is outstanding, both are
/// refused. Conservative, but it keeps the trigger endpoint single-flight.
#[derive(Debug, Default)]
pub struct ActionGate {
    in_flight: Option<BoundaryAction>,
}

impl ActionGate {
    pub fn try_begin(&mut self, action: BoundaryAction) -> bool {
        if self.in_flight.is_some() {
            return false;
        }
        self.in_flight = Some(action);
        true
    }

    pub fn finish(&mut self, action: BoundaryAction) {
        if self.in_flight == Some(action) {
            self.in_flight = None;
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }
}

/// Opaque staleness token. A response tagged with an old epoch is discarded:
/// that is the whole cancellation story for responses that land after a
/// reset or after a newer request superseded theirs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Epoch(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BurstApply {
    Merged,
    Rejected,
    Stale,
}

#[derive(Debug, Default)]
pub struct Session {
    epoch: u64,
    pub gate: ActionGate,
    result: Option<SimulationResult>,
    explanation: Option<Explanation>,
    view: ConfidenceView,
    tool_args: Option<Value>,
}

impl Session {
    /// Start a new plan request, superseding any outstanding one. Prior
    /// display state is cleared.
    pub fn begin_request(&mut self) -> Epoch {
        self.epoch += 1;
        self.result = None;
        self.explanation = None;
        self.view = ConfidenceView::default();
        self.tool_args = None;
        Epoch(self.epoch)
    }

    /// Teardown: discard state and invalidate every outstanding token.
    pub fn reset(&mut self) {
        self.epoch += 1;
        self.result = None;
        self.explanation = None;
        self.view = ConfidenceView::default();
        self.tool_args = None;
        self.gate = ActionGate::default();
    }

    fn is_current(&self, token: Epoch) -> bool {
        token.0 == self.epoch
    }

    /// Install a completed plan response. Returns false (and changes
    /// nothing) when the token is stale.
    pub fn apply_plan(&mut self, token: Epoch, response: PlanResponse) -> bool {
        if !self.is_current(token) {
            return false;
        }
        self.view = ConfidenceView::seed(&response.sim_result);
        self.result = Some(response.sim_result);
        self.explanation = Some(response.explanation);
        self.tool_args = response.tool_args;
        true
    }

    /// Fold in a burst result for the current simulation, if any.
    pub fn apply_burst(&mut self, token: Epoch, burst: &BurstResult) -> BurstApply {
        if !self.is_current(token) {
            return BurstApply::Stale;
        }
        let result = match &self.result {
            Some(r) => r,
            None => return BurstApply::Rejected,
        };
        match self.view.merge(result, burst) {
            MergeOutcome::Merged(next) => {
                self.view = next;
                BurstApply::Merged
            }
            MergeOutcome::Rejected => BurstApply::Rejected,
        }
    }

    pub fn result(&self) -> Option<&SimulationResult> {
        self.result.as_ref()
    }

    pub fn explanation(&self) -> Option<&Explanation> {
        self.explanation.as_ref()
    }

    pub fn view(&self) -> &ConfidenceView {
        &self.view
    }

    pub fn tool_args(&self) -> Option<&Value> {
        self.tool_args.as_ref()
    }
}
