//! Steps: one question/answer turn of a session

mod branch;
mod sequence;
mod validator;

pub use branch::{Branch, Route};
pub use sequence::{ConfigError, StepSequence};
pub use validator::Validator;

use crate::formatter::Formatter;
use crate::styled::StyledText;
use std::fmt;
use std::sync::Arc;

/// Description of one conversational turn.
///
/// Fields are public so a step can be written as a struct literal with
/// `..Step::default()`. Once a step is moved into a [`StepSequence`] it is
/// only reachable by shared reference.
#[derive(Clone, Default)]
pub struct Step {
    /// Stable identifier, needed only when a branch targets this step
    pub id: Option<String>,
    pub prompt: StyledText,
    pub hint: Option<StyledText>,
    pub validator: Validator,
    pub branch: Option<Branch>,
    /// Successful input always ends the conversation, regardless of `branch`
    pub terminal: bool,
    /// Step-specific presentation; the session formatter is bound when absent
    pub formatter: Option<Arc<dyn Formatter>>,
}

impl Step {
    pub fn new(prompt: impl Into<StyledText>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<StyledText>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    #[must_use]
    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = validator;
        self
    }

    #[must_use]
    pub fn with_branch(mut self, branch: Branch) -> Self {
        self.branch = Some(branch);
        self
    }

    #[must_use]
    pub fn terminal(mut self) -> Self {
        self.terminal = true;
        self
    }

    pub fn validate(&self, input: &str) -> bool {
        self.validator.accepts(input)
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("id", &self.id)
            .field("prompt", &self.prompt.to_plain())
            .field("validator", &self.validator)
            .field("branch", &self.branch)
            .field("terminal", &self.terminal)
            .field("has_formatter", &self.formatter.is_some())
            .finish_non_exhaustive()
    }
}
