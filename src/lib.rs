//! Colloquy - interactive multi-step conversations
//!
//! A session walks one participant through an ordered sequence of prompts,
//! validating each answer, following branches and reporting accepted input
//! to a handler. The [`SessionRegistry`] keeps at most one session per
//! participant and routes incoming text to it.

#![allow(
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod config;
pub mod formatter;
pub mod runtime;
pub mod state_machine;
pub mod step;
pub mod styled;

pub use config::{EngineConfig, OutputFormat};
pub use formatter::{DefaultFormatter, FormatError, Formatter};
pub use runtime::{
    Answers, Dispatch, OutgoingMessage, Outbox, ParticipantId, Session, SessionBuilder,
    SessionError, SessionRegistry, SessionText, StepHandler,
};
pub use state_machine::SessionState;
pub use step::{Branch, ConfigError, Step, StepSequence, Validator};
pub use styled::{Style, StyledText};
