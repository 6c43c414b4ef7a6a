//! Session assembly

use super::session::{Completion, Session, SessionText};
use super::traits::{NoopHandler, StepHandler};
use super::ParticipantId;
use crate::formatter::{DefaultFormatter, Formatter};
use crate::state_machine::{SessionContext, DEFAULT_CANCEL_TOKEN};
use crate::step::{ConfigError, Step, StepSequence};
use crate::styled::StyledText;
use std::sync::Arc;

/// Collects steps, presentation and callbacks for one session
pub struct SessionBuilder {
    participant: ParticipantId,
    steps: Vec<Step>,
    formatter: Option<Arc<dyn Formatter>>,
    text: SessionText,
    cancel_token: String,
    handler: Option<Box<dyn StepHandler>>,
    on_complete: Option<Completion>,
}

impl SessionBuilder {
    pub fn new(participant: impl Into<ParticipantId>) -> Self {
        Self {
            participant: participant.into(),
            steps: Vec::new(),
            formatter: None,
            text: SessionText::default(),
            cancel_token: DEFAULT_CANCEL_TOKEN.to_string(),
            handler: None,
            on_complete: None,
        }
    }

    #[must_use]
    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    #[must_use]
    pub fn steps(mut self, steps: impl IntoIterator<Item = Step>) -> Self {
        self.steps.extend(steps);
        self
    }

    #[must_use]
    pub fn formatter(self, formatter: impl Formatter + 'static) -> Self {
        self.shared_formatter(Arc::new(formatter))
    }

    #[must_use]
    pub fn shared_formatter(mut self, formatter: Arc<dyn Formatter>) -> Self {
        self.formatter = Some(formatter);
        self
    }

    #[must_use]
    pub fn text(mut self, text: SessionText) -> Self {
        self.text = text;
        self
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<StyledText>) -> Self {
        self.text.title = title.into();
        self
    }

    #[must_use]
    pub fn summary(mut self, summary: impl Into<StyledText>) -> Self {
        self.text.summary = Some(summary.into());
        self
    }

    #[must_use]
    pub fn help(mut self, help: impl Into<StyledText>) -> Self {
        self.text.help = Some(help.into());
        self
    }

    #[must_use]
    pub fn cancel_token(mut self, token: impl Into<String>) -> Self {
        self.cancel_token = token.into();
        self
    }

    #[must_use]
    pub fn handler(mut self, handler: impl StepHandler + 'static) -> Self {
        self.handler = Some(Box::new(handler));
        self
    }

    /// Runs exactly once, only when the session completes. It is called after
    /// the registry has released the session, so it may start a new session
    /// for the same participant.
    #[must_use]
    pub fn on_complete(mut self, on_complete: impl FnOnce() + Send + 'static) -> Self {
        self.on_complete = Some(Box::new(on_complete));
        self
    }

    /// Produce the session. Branch targets are not checked here; an unknown
    /// target ends the session when it is reached.
    pub fn build(self) -> Result<Session, ConfigError> {
        let steps = StepSequence::new(self.steps)?;
        let context = SessionContext::new(steps).with_cancel_token(self.cancel_token);

        Ok(Session::new(
            self.participant,
            context,
            self.formatter
                .unwrap_or_else(|| Arc::new(DefaultFormatter::default())),
            self.text,
            self.handler.unwrap_or_else(|| Box::new(NoopHandler)),
            self.on_complete,
        ))
    }
}
