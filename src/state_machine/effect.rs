//! Effects produced by state transitions

/// Something to render through the formatter and deliver
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Begin,
    Prompt { step: usize },
    Echo { step: usize, input: String },
    Invalid { step: usize, input: String },
    Cancelled,
    Completed,
}

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Render and deliver a message to the participant
    Notify(Notice),

    /// Report an accepted answer to the step handler
    Accept { step: usize, input: String },

    /// Report a rejected answer to the step handler
    Reject { step: usize, input: String },

    /// Run the completion callback
    InvokeCompletion,
}

impl Effect {
    pub fn prompt(step: usize) -> Self {
        Effect::Notify(Notice::Prompt { step })
    }

    pub fn echo(step: usize, input: &str) -> Self {
        Effect::Notify(Notice::Echo {
            step,
            input: input.to_string(),
        })
    }

    pub fn invalid(step: usize, input: &str) -> Self {
        Effect::Notify(Notice::Invalid {
            step,
            input: input.to_string(),
        })
    }
}
