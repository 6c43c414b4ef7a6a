//! Events that can occur in a session

/// Events that trigger state transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The registry accepted the session
    Start,
    /// Text from the participant
    Input { text: String },
    /// Cancellation requested from outside the conversation
    Cancel,
}

impl Event {
    pub fn input(text: impl Into<String>) -> Self {
        Event::Input { text: text.into() }
    }
}
