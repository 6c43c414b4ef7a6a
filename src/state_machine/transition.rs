//! Pure state transition function

use super::{CancelReason, CompletionReason, Effect, Event, Notice, SessionContext, SessionState};
use crate::step::Step;
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: SessionState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: SessionState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Session has not started")]
    NotStarted,
    #[error("Session already started")]
    AlreadyStarted,
    #[error("Session already finished")]
    Finished,
    #[error("Cursor {0} is outside the step sequence")]
    CursorOutOfRange(usize),
}

/// Where the conversation goes after an accepted answer
#[derive(Debug, Clone, PartialEq, Eq)]
enum NextStep {
    At(usize),
    End(CompletionReason),
}

/// Pure transition function
///
/// Given the same inputs it always produces the same outputs. Validators and
/// branch resolvers are required to be pure, so evaluating them here keeps
/// that property.
pub fn transition(
    state: &SessionState,
    context: &SessionContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // NotStarted + Start -> Active at the first step
        (SessionState::NotStarted, Event::Start) => {
            if context.steps.is_empty() {
                return Err(TransitionError::CursorOutOfRange(0));
            }
            Ok(TransitionResult::new(SessionState::Active { cursor: 0 })
                .with_effect(Effect::Notify(Notice::Begin))
                .with_effect(Effect::prompt(0)))
        }

        (SessionState::NotStarted, _) => Err(TransitionError::NotStarted),

        (SessionState::Active { .. }, Event::Start) => Err(TransitionError::AlreadyStarted),

        // The token wins over whatever the current step would accept
        (SessionState::Active { .. }, Event::Input { text }) if context.is_cancel(&text) => {
            Ok(cancel(CancelReason::Participant))
        }

        (SessionState::Active { .. }, Event::Cancel) => Ok(cancel(CancelReason::External)),

        (SessionState::Active { cursor }, Event::Input { text }) => {
            let cursor = *cursor;
            let step = context
                .steps
                .get(cursor)
                .ok_or(TransitionError::CursorOutOfRange(cursor))?;

            // Invalid input: stay on the same step, any number of times
            if !step.validate(&text) {
                return Ok(TransitionResult::new(SessionState::Active { cursor })
                    .with_effect(Effect::Reject {
                        step: cursor,
                        input: text.clone(),
                    })
                    .with_effect(Effect::invalid(cursor, &text)));
            }

            let accepted = [
                Effect::Accept {
                    step: cursor,
                    input: text.clone(),
                },
                Effect::echo(cursor, &text),
            ];

            match next_step(context, cursor, step, &text) {
                NextStep::At(next) => Ok(TransitionResult::new(SessionState::Active { cursor: next })
                    .with_effects(accepted)
                    .with_effect(Effect::prompt(next))),
                NextStep::End(reason) => Ok(finish(reason).with_effects_front(accepted)),
            }
        }

        (SessionState::Completed { .. } | SessionState::Cancelled { .. }, _) => {
            Err(TransitionError::Finished)
        }
    }
}

fn next_step(context: &SessionContext, cursor: usize, step: &Step, input: &str) -> NextStep {
    if step.terminal {
        return NextStep::End(CompletionReason::TerminalStep);
    }

    match &step.branch {
        None => {
            let next = cursor + 1;
            if next < context.steps.len() {
                NextStep::At(next)
            } else {
                NextStep::End(CompletionReason::SequenceExhausted)
            }
        }
        Some(branch) => match branch.resolve(input) {
            None => NextStep::End(CompletionReason::BranchEnded),
            Some(target) => match context.steps.position_of(&target) {
                Some(position) => NextStep::At(position),
                None => NextStep::End(CompletionReason::UnknownTarget { target }),
            },
        },
    }
}

fn finish(reason: CompletionReason) -> TransitionResult {
    TransitionResult::new(SessionState::Completed { reason })
        .with_effect(Effect::Notify(Notice::Completed))
        .with_effect(Effect::InvokeCompletion)
}

fn cancel(reason: CancelReason) -> TransitionResult {
    TransitionResult::new(SessionState::Cancelled { reason })
        .with_effect(Effect::Notify(Notice::Cancelled))
}

impl TransitionResult {
    fn with_effects_front(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        let mut all: Vec<Effect> = effects.into_iter().collect();
        all.append(&mut self.effects);
        self.effects = all;
        self
    }
}
