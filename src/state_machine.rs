//! Core session state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions: the
//! session feeds an [`Event`] and its current [`SessionState`] to
//! [`transition`] and executes the returned [`Effect`]s.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::{Effect, Notice};
pub use event::Event;
pub use state::{
    CancelReason, CompletionReason, SessionContext, SessionState, DEFAULT_CANCEL_TOKEN,
};
pub use transition::{transition, TransitionError, TransitionResult};
