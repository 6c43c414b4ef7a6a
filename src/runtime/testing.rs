//! Mock implementations for testing
//!
//! These mocks record what the engine hands to its collaborators so tests
//! can assert on delivered text and reported answers.

use super::traits::*;
use super::ParticipantId;
use crate::formatter::{DefaultFormatter, FormatError, FormatResult, Formatter, Intro};
use crate::step::Step;
use crate::styled::StyledText;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Mutex};

// ============================================================================
// Recording Outbox
// ============================================================================

/// Outbox that keeps every delivered message
#[derive(Default)]
pub struct RecordingOutbox {
    messages: Mutex<Vec<OutgoingMessage>>,
}

impl RecordingOutbox {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn messages(&self) -> Vec<OutgoingMessage> {
        self.messages.lock().unwrap().clone()
    }

    /// Plain text of everything delivered to `participant`, in order
    pub fn texts_for(&self, participant: &str) -> Vec<String> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.participant.as_str() == participant)
            .map(|m| m.text.to_plain())
            .collect()
    }

    pub fn last_text_for(&self, participant: &str) -> Option<String> {
        self.texts_for(participant).pop()
    }
}

impl Outbox for RecordingOutbox {
    fn deliver(&self, message: OutgoingMessage) {
        self.messages.lock().unwrap().push(message);
    }
}

// ============================================================================
// Recording Step Handler
// ============================================================================

/// A report received by [`RecordingHandler`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    Accepted { position: usize, input: String },
    Rejected { position: usize, input: String },
}

/// Step handler whose clones share one report log
#[derive(Debug, Clone, Default)]
pub struct RecordingHandler {
    reports: Arc<Mutex<Vec<Report>>>,
}

impl RecordingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<Report> {
        self.reports.lock().unwrap().clone()
    }

    pub fn accepted_inputs(&self) -> Vec<(usize, String)> {
        self.reports()
            .into_iter()
            .filter_map(|r| match r {
                Report::Accepted { position, input } => Some((position, input)),
                Report::Rejected { .. } => None,
            })
            .collect()
    }
}

impl StepHandler for RecordingHandler {
    fn accepted(&mut self, position: usize, _step: &Step, input: &str) {
        self.reports.lock().unwrap().push(Report::Accepted {
            position,
            input: input.to_string(),
        });
    }

    fn rejected(&mut self, position: usize, _step: &Step, input: &str) {
        self.reports.lock().unwrap().push(Report::Rejected {
            position,
            input: input.to_string(),
        });
    }
}

// ============================================================================
// Completion Counter
// ============================================================================

/// Counts completion callback invocations
#[derive(Debug, Clone, Default)]
pub struct CompletionCounter {
    count: Arc<AtomicUsize>,
}

impl CompletionCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// A callback that bumps this counter
    pub fn callback(&self) -> impl FnOnce() + Send + 'static {
        let count = Arc::clone(&self.count);
        move || {
            count.fetch_add(1, Ordering::SeqCst);
        }
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

// ============================================================================
// Failing Formatter
// ============================================================================

/// A formatter hook, for the formatters below
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    Begin,
    Prompt,
    Invalid,
    Completed,
}

/// Formatter that delegates to [`DefaultFormatter`] except for one hook
#[derive(Debug, Clone)]
pub struct FailingFormatter {
    fail_on: Hook,
    inner: DefaultFormatter,
}

impl FailingFormatter {
    pub fn new(fail_on: Hook) -> Self {
        Self {
            fail_on,
            inner: DefaultFormatter::default(),
        }
    }

    fn check(&self, hook: Hook) -> Result<(), FormatError> {
        if self.fail_on == hook {
            Err(FormatError::new(format!("{hook:?} hook failed")))
        } else {
            Ok(())
        }
    }
}

impl Formatter for FailingFormatter {
    fn begin(&self, intro: &Intro<'_>) -> FormatResult {
        self.check(Hook::Begin)?;
        self.inner.begin(intro)
    }

    fn prompt(&self, prompt: &StyledText, hint: Option<&StyledText>) -> FormatResult {
        self.check(Hook::Prompt)?;
        self.inner.prompt(prompt, hint)
    }

    fn echo(&self, input: &str) -> FormatResult {
        self.inner.echo(input)
    }

    fn invalid(&self, input: &str) -> FormatResult {
        self.check(Hook::Invalid)?;
        self.inner.invalid(input)
    }

    fn cancelled(&self, message: &StyledText) -> FormatResult {
        self.inner.cancelled(message)
    }

    fn completed(&self, message: &StyledText) -> FormatResult {
        self.check(Hook::Completed)?;
        self.inner.completed(message)
    }
}

// ============================================================================
// Gated Formatter
// ============================================================================

/// Test-side control of a [`GatedFormatter`]
pub struct Gate {
    entered: mpsc::Receiver<()>,
    release: mpsc::Sender<()>,
}

impl Gate {
    /// Block until a thread is parked inside the gated hook
    pub fn wait_entered(&self) {
        self.entered.recv().unwrap();
    }

    /// Let the parked hook finish
    pub fn open(&self) {
        self.release.send(()).unwrap();
    }
}

/// Formatter whose gated hook parks the first time it runs, holding the
/// session lock, until the test opens the gate. It then fails or delegates
/// to [`DefaultFormatter`].
pub struct GatedFormatter {
    hook: Hook,
    fail: bool,
    armed: AtomicBool,
    entered: Mutex<mpsc::Sender<()>>,
    release: Mutex<mpsc::Receiver<()>>,
    inner: DefaultFormatter,
}

impl GatedFormatter {
    pub fn new(hook: Hook, fail: bool) -> (Self, Gate) {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let formatter = Self {
            hook,
            fail,
            armed: AtomicBool::new(true),
            entered: Mutex::new(entered_tx),
            release: Mutex::new(release_rx),
            inner: DefaultFormatter::default(),
        };
        let gate = Gate {
            entered: entered_rx,
            release: release_tx,
        };
        (formatter, gate)
    }

    fn pass(&self, hook: Hook) -> Result<(), FormatError> {
        if hook != self.hook || !self.armed.swap(false, Ordering::SeqCst) {
            return Ok(());
        }
        self.entered.lock().unwrap().send(()).unwrap();
        self.release.lock().unwrap().recv().unwrap();
        if self.fail {
            Err(FormatError::new(format!("{hook:?} hook failed")))
        } else {
            Ok(())
        }
    }
}

impl Formatter for GatedFormatter {
    fn begin(&self, intro: &Intro<'_>) -> FormatResult {
        self.pass(Hook::Begin)?;
        self.inner.begin(intro)
    }

    fn prompt(&self, prompt: &StyledText, hint: Option<&StyledText>) -> FormatResult {
        self.pass(Hook::Prompt)?;
        self.inner.prompt(prompt, hint)
    }

    fn echo(&self, input: &str) -> FormatResult {
        self.inner.echo(input)
    }

    fn invalid(&self, input: &str) -> FormatResult {
        self.pass(Hook::Invalid)?;
        self.inner.invalid(input)
    }

    fn cancelled(&self, message: &StyledText) -> FormatResult {
        self.inner.cancelled(message)
    }

    fn completed(&self, message: &StyledText) -> FormatResult {
        self.pass(Hook::Completed)?;
        self.inner.completed(message)
    }
}

/// Participant id shorthand for tests
pub fn pid(id: &str) -> ParticipantId {
    ParticipantId::from(id)
}
