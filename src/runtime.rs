//! Runtime for live sessions
//!
//! The [`SessionRegistry`] is the only owner of started sessions. It holds at
//! most one session per participant and routes participant input to it.
//!
//! Locking: one mutex guards the participant map and every session has its
//! own mutex. `start` takes the map lock and then the lock of the session it
//! is inserting, which no other thread can reach yet. Everything else takes a
//! session lock first and the map lock only for removal. Completion callbacks
//! run after both locks are released, so they may use the registry.

mod builder;
mod session;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use builder::SessionBuilder;
pub use session::{Session, SessionError, SessionInfo, SessionText};
pub use traits::*;

use crate::state_machine::Event;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Opaque identity of a conversation participant
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ParticipantId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// What happened to a piece of participant input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// A session took the text; the input source must not handle it further
    Consumed,
    /// No active session for the participant; the text is someone else's
    Unclaimed,
}

/// Handle to a registered session
#[derive(Clone)]
struct SessionHandle {
    id: String,
    session: Arc<Mutex<Session>>,
}

impl SessionHandle {
    fn new(session: Session) -> Self {
        Self {
            id: session.id().to_string(),
            session: Arc::new(Mutex::new(session)),
        }
    }
}

/// Table of live sessions, at most one per participant
pub struct SessionRegistry {
    outbox: Arc<dyn Outbox>,
    sessions: Mutex<HashMap<ParticipantId, SessionHandle>>,
}

impl SessionRegistry {
    pub fn new(outbox: impl Outbox + 'static) -> Self {
        Self::with_shared_outbox(Arc::new(outbox))
    }

    pub fn with_shared_outbox(outbox: Arc<dyn Outbox>) -> Self {
        Self {
            outbox,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// True while the participant holds a registry entry. An entry made by
    /// [`add_session`](Self::add_session) counts even though it never
    /// receives input.
    pub fn has_active_session(&self, participant: &ParticipantId) -> bool {
        lock(&self.sessions).contains_key(participant)
    }

    pub fn active_count(&self) -> usize {
        lock(&self.sessions).len()
    }

    /// Insert `session` without any exclusivity check, replacing whatever the
    /// participant had.
    ///
    /// The session is not started. It blocks [`start`](Self::start) for the
    /// participant and shows up in [`has_active_session`](Self::has_active_session),
    /// but [`dispatch_input`](Self::dispatch_input) returns
    /// [`Dispatch::Unclaimed`] for it because it has presented no step. Use
    /// `start` for a session that should take input.
    pub fn add_session(&self, session: Session) {
        let participant = session.participant().clone();
        let handle = SessionHandle::new(session);
        if let Some(previous) = lock(&self.sessions).insert(participant.clone(), handle) {
            tracing::warn!(
                participant = %participant,
                replaced = %previous.id,
                "Session replaced without exclusivity check"
            );
        }
    }

    /// Remove the participant's session if its id is `session_id`.
    ///
    /// Idempotent; a stale id never evicts a newer session.
    pub fn remove_session(&self, participant: &ParticipantId, session_id: &str) -> bool {
        let mut sessions = lock(&self.sessions);
        if sessions.get(participant).is_some_and(|h| h.id == session_id) {
            sessions.remove(participant);
            tracing::debug!(participant = %participant, session_id = %session_id, "Session removed");
            true
        } else {
            false
        }
    }

    /// Register `session` and present its first step.
    ///
    /// Returns `Ok(false)`, leaving the registry untouched, when the
    /// participant already has a session. If the begin message or first
    /// prompt cannot be rendered the registration is rolled back.
    pub fn start(&self, session: Session) -> Result<bool, SessionError> {
        let participant = session.participant().clone();
        let handle = SessionHandle::new(session);

        let mut sessions = lock(&self.sessions);
        if let Some(existing) = sessions.get(&participant) {
            tracing::debug!(
                participant = %participant,
                existing = %existing.id,
                "Participant already has a session"
            );
            return Ok(false);
        }
        sessions.insert(participant.clone(), handle.clone());
        let mut session = lock(&handle.session);
        drop(sessions);

        match session.handle(Event::Start, self.outbox.as_ref()) {
            Ok(()) => {
                tracing::info!(
                    participant = %participant,
                    session_id = %handle.id,
                    steps = session.steps().len(),
                    "Session started"
                );
                Ok(true)
            }
            Err(e) => {
                tracing::error!(participant = %participant, error = %e, "Failed to start session");
                // Rolled back under the session lock: a dispatcher already
                // waiting on it must not find an active session
                session.abort_start();
                self.remove_session(&participant, &handle.id);
                Err(e)
            }
        }
    }

    /// Forward `text` to the participant's session, if it has an active one
    pub fn dispatch_input(&self, participant: &ParticipantId, text: &str) -> Result<Dispatch, SessionError> {
        self.with_active_session(participant, |session, outbox| session.receive_input(text, outbox))
    }

    /// Cancel the participant's session from outside the conversation.
    ///
    /// The cancelled message is delivered; the completion callback is not run.
    pub fn cancel(&self, participant: &ParticipantId) -> Result<bool, SessionError> {
        let dispatch =
            self.with_active_session(participant, |session, outbox| session.handle(Event::Cancel, outbox))?;
        Ok(dispatch == Dispatch::Consumed)
    }

    /// State of every registered session
    pub fn snapshot(&self) -> Vec<SessionInfo> {
        let handles: Vec<SessionHandle> = lock(&self.sessions).values().cloned().collect();
        let mut infos: Vec<SessionInfo> = handles
            .iter()
            .map(|h| lock(&h.session).info())
            .collect();
        infos.sort_by(|a, b| a.participant.cmp(&b.participant));
        infos
    }

    /// Run `f` on the participant's active session under its lock, removing
    /// the session if it finished. A due completion callback runs last, with
    /// no lock held.
    fn with_active_session<F>(&self, participant: &ParticipantId, f: F) -> Result<Dispatch, SessionError>
    where
        F: FnOnce(&mut Session, &dyn Outbox) -> Result<(), SessionError>,
    {
        loop {
            let Some(handle) = self.lookup(participant) else {
                return Ok(Dispatch::Unclaimed);
            };

            let mut session = lock(&handle.session);
            if !session.state().is_active() {
                drop(session);
                // The session finished between lookup and lock; a newer one
                // may already be registered for this participant.
                if self.lookup(participant).is_some_and(|h| h.id != handle.id) {
                    continue;
                }
                return Ok(Dispatch::Unclaimed);
            }

            let result = f(&mut *session, self.outbox.as_ref());
            let completion = session.take_due_completion();
            if session.state().is_finished() {
                self.remove_session(participant, &handle.id);
            }
            drop(session);

            if let Some(on_complete) = completion {
                on_complete();
            }
            return result.map(|()| Dispatch::Consumed);
        }
    }

    fn lookup(&self, participant: &ParticipantId) -> Option<SessionHandle> {
        lock(&self.sessions).get(participant).cloned()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
