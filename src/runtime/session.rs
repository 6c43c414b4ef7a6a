//! Session executor
//!
//! Owns one conversation: feeds events through the pure transition function
//! and executes the resulting effects against the formatter, the step handler
//! and the outbox.

use super::traits::{OutgoingMessage, Outbox, StepHandler};
use super::{ParticipantId, SessionRegistry};
use crate::formatter::{FormatError, Formatter, Intro};
use crate::state_machine::{
    transition, CompletionReason, Effect, Event, Notice, SessionContext, SessionState,
    TransitionError,
};
use crate::step::Step;
use crate::styled::StyledText;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Errors that escape a session turn
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    Transition(#[from] TransitionError),
}

/// Fixed texts of a session, rendered by the formatter
#[derive(Debug, Clone)]
pub struct SessionText {
    pub title: StyledText,
    pub summary: Option<StyledText>,
    pub help: Option<StyledText>,
    /// Shown when the session is cancelled
    pub cancelled: StyledText,
    /// Shown when the session completes
    pub completed: StyledText,
}

impl Default for SessionText {
    fn default() -> Self {
        Self {
            title: StyledText::plain("Conversation"),
            summary: None,
            help: None,
            cancelled: StyledText::plain("Cancelled."),
            completed: StyledText::plain("Done."),
        }
    }
}

/// Point-in-time view of a session, for listing and logs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionInfo {
    pub session_id: String,
    pub participant: ParticipantId,
    pub state: SessionState,
    /// Id of the current step, when it has one
    pub step_id: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
}

pub(crate) type Completion = Box<dyn FnOnce() + Send>;

/// One running conversation with a single participant.
///
/// Built by [`SessionBuilder`](super::SessionBuilder) and owned by the
/// [`SessionRegistry`] once started.
pub struct Session {
    id: String,
    participant: ParticipantId,
    context: SessionContext,
    state: SessionState,
    formatter: Arc<dyn Formatter>,
    text: SessionText,
    handler: Box<dyn StepHandler>,
    on_complete: Option<Completion>,
    /// Completion taken out by this turn, run once the session lock is released
    completion_due: Option<Completion>,
    started_at: Option<DateTime<Utc>>,
}

impl Session {
    pub(crate) fn new(
        participant: ParticipantId,
        context: SessionContext,
        formatter: Arc<dyn Formatter>,
        text: SessionText,
        handler: Box<dyn StepHandler>,
        on_complete: Option<Completion>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            participant,
            context,
            state: SessionState::NotStarted,
            formatter,
            text,
            handler,
            on_complete,
            completion_due: None,
            started_at: None,
        }
    }

    /// Register with `registry` and present the first step.
    ///
    /// Returns `Ok(false)` without any other change when the participant
    /// already has a session.
    pub fn start(self, registry: &SessionRegistry) -> Result<bool, SessionError> {
        registry.start(self)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn participant(&self) -> &ParticipantId {
        &self.participant
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn steps(&self) -> &crate::step::StepSequence {
        &self.context.steps
    }

    pub fn cancel_token(&self) -> &str {
        &self.context.cancel_token
    }

    pub fn current_step(&self) -> Option<&Step> {
        self.state.cursor().and_then(|c| self.context.steps.get(c))
    }

    pub fn info(&self) -> SessionInfo {
        SessionInfo {
            session_id: self.id.clone(),
            participant: self.participant.clone(),
            state: self.state.clone(),
            step_id: self.current_step().and_then(|s| s.id.clone()),
            started_at: self.started_at,
        }
    }

    /// Undo a start whose begin message or first prompt failed, so a caller
    /// still holding a handle finds nothing to drive
    pub(crate) fn abort_start(&mut self) {
        self.state = SessionState::NotStarted;
        self.started_at = None;
    }

    /// The completion callback, if the last turn completed the session
    pub(crate) fn take_due_completion(&mut self) -> Option<Completion> {
        self.completion_due.take()
    }

    pub(crate) fn receive_input(&mut self, text: &str, outbox: &dyn Outbox) -> Result<(), SessionError> {
        self.handle(Event::input(text), outbox)
    }

    /// Run one event through the state machine and execute its effects.
    ///
    /// The new state is committed before any effect runs; a formatter failure
    /// aborts the remaining effects of this turn.
    pub(crate) fn handle(&mut self, event: Event, outbox: &dyn Outbox) -> Result<(), SessionError> {
        if event == Event::Start && self.state == SessionState::NotStarted {
            self.context.steps.bind_formatter(&self.formatter);
            self.started_at = Some(Utc::now());
        }

        let result = transition(&self.state, &self.context, event)?;
        let old_state = std::mem::replace(&mut self.state, result.new_state);

        tracing::debug!(
            session_id = %self.id,
            participant = %self.participant,
            from = ?old_state,
            to = ?self.state,
            "Session transition"
        );

        for effect in result.effects {
            self.execute_effect(effect, outbox)?;
        }

        Ok(())
    }

    fn execute_effect(&mut self, effect: Effect, outbox: &dyn Outbox) -> Result<(), SessionError> {
        match effect {
            Effect::Notify(notice) => self.notify(&notice, outbox),

            Effect::Accept { step, input } => {
                let current = self
                    .context
                    .steps
                    .get(step)
                    .ok_or(TransitionError::CursorOutOfRange(step))?;
                self.handler.accepted(step, current, &input);
                Ok(())
            }

            Effect::Reject { step, input } => {
                let current = self
                    .context
                    .steps
                    .get(step)
                    .ok_or(TransitionError::CursorOutOfRange(step))?;
                self.handler.rejected(step, current, &input);
                Ok(())
            }

            Effect::InvokeCompletion => {
                self.log_completion();
                self.completion_due = self.on_complete.take();
                Ok(())
            }
        }
    }

    fn notify(&self, notice: &Notice, outbox: &dyn Outbox) -> Result<(), SessionError> {
        let text = match notice {
            Notice::Begin => self.formatter.begin(&Intro {
                title: &self.text.title,
                summary: self.text.summary.as_ref(),
                help: self.text.help.as_ref(),
                cancel_token: &self.context.cancel_token,
            })?,
            Notice::Prompt { step } => {
                let current = self.step_at(*step)?;
                self.formatter_for(current)
                    .prompt(&current.prompt, current.hint.as_ref())?
            }
            Notice::Echo { step, input } => self.formatter_for(self.step_at(*step)?).echo(input)?,
            Notice::Invalid { step, input } => {
                self.formatter_for(self.step_at(*step)?).invalid(input)?
            }
            Notice::Cancelled => self.formatter.cancelled(&self.text.cancelled)?,
            Notice::Completed => self.formatter.completed(&self.text.completed)?,
        };

        if !text.is_empty() {
            outbox.deliver(OutgoingMessage::new(
                self.participant.clone(),
                self.id.clone(),
                text,
            ));
        }
        Ok(())
    }

    fn step_at(&self, position: usize) -> Result<&Step, TransitionError> {
        self.context
            .steps
            .get(position)
            .ok_or(TransitionError::CursorOutOfRange(position))
    }

    fn formatter_for<'a>(&'a self, step: &'a Step) -> &'a dyn Formatter {
        step.formatter.as_deref().unwrap_or(self.formatter.as_ref())
    }

    fn log_completion(&self) {
        let SessionState::Completed { reason } = &self.state else {
            return;
        };
        match reason {
            CompletionReason::UnknownTarget { target } => tracing::warn!(
                session_id = %self.id,
                participant = %self.participant,
                target = %target,
                "Branch named an unknown step, ending session"
            ),
            reason => tracing::info!(
                session_id = %self.id,
                participant = %self.participant,
                reason = ?reason,
                "Session completed"
            ),
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("participant", &self.participant)
            .field("state", &self.state)
            .field("steps", &self.context.steps.len())
            .finish_non_exhaustive()
    }
}
