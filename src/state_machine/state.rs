//! Session state types

use crate::step::StepSequence;
use serde::{Deserialize, Serialize};

/// Why a session finished successfully
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CompletionReason {
    /// The accepted step was marked terminal
    TerminalStep,
    /// Linear order ran past the last step
    SequenceExhausted,
    /// The branch resolver returned no identifier
    BranchEnded,
    /// The branch resolver named a step that does not exist
    UnknownTarget { target: String },
}

impl CompletionReason {
    /// True when the end was planned by the step sequence
    pub fn is_designed(&self) -> bool {
        !matches!(self, Self::UnknownTarget { .. })
    }
}

/// Who cancelled a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelReason {
    /// The participant sent the cancellation token
    Participant,
    /// The surrounding process cancelled on the participant's behalf
    External,
}

/// Session state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionState {
    /// Built but not yet started
    #[default]
    NotStarted,

    /// Waiting for input to the step at `cursor`
    Active { cursor: usize },

    /// Finished successfully; the completion callback has been scheduled
    Completed { reason: CompletionReason },

    /// Cancelled; the completion callback never runs
    Cancelled { reason: CancelReason },
}

impl SessionState {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active { .. })
    }

    /// Completed or cancelled, cannot transition out
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Completed { .. } | Self::Cancelled { .. })
    }

    pub fn cursor(&self) -> Option<usize> {
        match self {
            Self::Active { cursor } => Some(*cursor),
            _ => None,
        }
    }
}

/// Default reserved word that cancels a session
pub const DEFAULT_CANCEL_TOKEN: &str = "cancel";

/// Context for a session (immutable configuration)
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub steps: StepSequence,
    pub cancel_token: String,
}

impl SessionContext {
    pub fn new(steps: StepSequence) -> Self {
        Self {
            steps,
            cancel_token: DEFAULT_CANCEL_TOKEN.to_string(),
        }
    }

    #[must_use]
    pub fn with_cancel_token(mut self, token: impl Into<String>) -> Self {
        self.cancel_token = token.into();
        self
    }

    /// Token match ignores Unicode case and surrounding whitespace
    pub fn is_cancel(&self, text: &str) -> bool {
        text.trim().to_lowercase() == self.cancel_token.trim().to_lowercase()
    }
}
