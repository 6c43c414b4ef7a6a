//! Trait abstractions at the session boundary
//!
//! [`Outbox`] is how rendered output leaves the engine, [`StepHandler`] is how
//! accepted and rejected answers reach the domain object under construction.
//! Both let the registry be tested with recording implementations.

use super::ParticipantId;
use crate::step::Step;
use crate::styled::StyledText;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;

/// A rendered message addressed to one participant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutgoingMessage {
    pub participant: ParticipantId,
    pub session_id: String,
    pub text: StyledText,
    pub sent_at: DateTime<Utc>,
}

impl OutgoingMessage {
    pub fn new(participant: ParticipantId, session_id: impl Into<String>, text: StyledText) -> Self {
        Self {
            participant,
            session_id: session_id.into(),
            text,
            sent_at: Utc::now(),
        }
    }
}

/// Delivery of rendered output to participants
pub trait Outbox: Send + Sync {
    /// Hand a message to the transport. Must not block.
    fn deliver(&self, message: OutgoingMessage);
}

impl<T: Outbox + ?Sized> Outbox for Arc<T> {
    fn deliver(&self, message: OutgoingMessage) {
        (**self).deliver(message);
    }
}

impl Outbox for mpsc::UnboundedSender<OutgoingMessage> {
    fn deliver(&self, message: OutgoingMessage) {
        if let Err(e) = self.send(message) {
            tracing::warn!(
                participant = %e.0.participant,
                "Outbox receiver dropped, message discarded"
            );
        }
    }
}

/// Receives the answers of a session
///
/// The engine never owns the domain object being built. It reports each
/// answer and the handler decides how to store it.
pub trait StepHandler: Send {
    /// `input` passed the validator of the step at `position`
    fn accepted(&mut self, position: usize, step: &Step, input: &str);

    /// `input` failed validation; the session stays on the same step
    fn rejected(&mut self, _position: usize, _step: &Step, _input: &str) {}
}

impl<F> StepHandler for F
where
    F: FnMut(usize, &Step, &str) + Send,
{
    fn accepted(&mut self, position: usize, step: &Step, input: &str) {
        self(position, step, input);
    }
}

/// Handler that ignores every report
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHandler;

impl StepHandler for NoopHandler {
    fn accepted(&mut self, _position: usize, _step: &Step, _input: &str) {}
}

/// Shared map of accepted answers, keyed by step id (or `#<position>` for
/// steps without one). Clones see the same answers.
#[derive(Debug, Clone, Default)]
pub struct Answers {
    values: Arc<Mutex<BTreeMap<String, String>>>,
}

impl Answers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_for(position: usize, step: &Step) -> String {
        step.id()
            .map_or_else(|| format!("#{position}"), ToString::to_string)
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        self.values.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StepHandler for Answers {
    fn accepted(&mut self, position: usize, step: &Step, input: &str) {
        self.lock()
            .insert(Self::key_for(position, step), input.trim().to_string());
    }
}
