// src/phase.rs
//! Phase lifecycle: Upload → Refused → Cheering → Analyzing → Results, plus reset to
//! Upload from anywhere.

use metrics::counter;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Upload,
    Refused,
    Cheering,
    Analyzing,
    Results,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Upload => "upload",
            Phase::Refused => "refused",
            Phase::Cheering => "cheering",
            Phase::Analyzing => "analyzing",
            Phase::Results => "results",
        }
    }

    /// Forward edges only; reset is handled by [`PhaseController::reset`].
    pub fn can_transition_to(self, next: Phase) -> bool {
        matches!(
            (self, next),
            (Phase::Upload, Phase::Refused)
                | (Phase::Refused, Phase::Cheering)
                | (Phase::Refused, Phase::Upload) // cancel
                | (Phase::Cheering, Phase::Analyzing)
                | (Phase::Analyzing, Phase::Results)
        )
    }

    /// Whether mood-changing gestures are honored in this phase.
    pub fn accepts_mood_input(self) -> bool {
        matches!(self, Phase::Cheering)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PhaseError {
    #[error("invalid phase transition: {from} -> {to}")]
    InvalidTransition { from: Phase, to: Phase },
}

#[derive(Debug, Clone, Default)]
pub struct PhaseController {
    phase: Phase,
}

impl PhaseController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Phase {
        self.phase
    }

    pub fn is(&self, phase: Phase) -> bool {
        self.phase == phase
    }

    /// Attempt a validated forward transition.
    pub fn transition(&mut self, next: Phase) -> Result<Phase, PhaseError> {
        let current = self.phase;
        if !current.can_transition_to(next) {
            debug!(target: "phase", from = %current, to = %next, "transition rejected");
            return Err(PhaseError::InvalidTransition {
                from: current,
                to: next,
            });
        }
        self.phase = next;
        counter!("mood_phase_transitions_total", "to" => next.as_str()).increment(1);
        info!(target: "phase", from = %current, to = %next, "phase transition");
        Ok(next)
    }

    /// Back to Upload from any phase. Returns the phase that was left.
    pub fn reset(&mut self) -> Phase {
        let previous = std::mem::take(&mut self.phase);
        if previous != Phase::Upload {
            counter!("mood_phase_transitions_total", "to" => Phase::Upload.as_str()).increment(1);
            info!(target: "phase", from = %previous, to = %Phase::Upload, "phase reset");
        }
        previous
    }
}
