//! Presentation of engine events
//!
//! A [`Formatter`] turns each engine event into [`StyledText`]. It holds no
//! conversation state; the session calls it synchronously and delivers the
//! result. A failing hook is fatal for the turn that called it.

use crate::styled::{Style, StyledText};
use thiserror::Error;

/// A formatter hook could not render its event
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Formatter failed: {message}")]
pub struct FormatError {
    pub message: String,
}

impl FormatError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub type FormatResult = Result<StyledText, FormatError>;

/// Data shown when a session begins
#[derive(Debug, Clone, Copy)]
pub struct Intro<'a> {
    pub title: &'a StyledText,
    pub summary: Option<&'a StyledText>,
    pub help: Option<&'a StyledText>,
    /// Word that cancels the session
    pub cancel_token: &'a str,
}

/// Renders engine events for the participant
pub trait Formatter: Send + Sync {
    fn begin(&self, intro: &Intro<'_>) -> FormatResult;

    fn prompt(&self, prompt: &StyledText, hint: Option<&StyledText>) -> FormatResult;

    fn echo(&self, input: &str) -> FormatResult;

    fn invalid(&self, input: &str) -> FormatResult;

    fn cancelled(&self, message: &StyledText) -> FormatResult;

    fn completed(&self, message: &StyledText) -> FormatResult;
}

/// Stock formatter with a few presentation knobs
#[derive(Debug, Clone)]
pub struct DefaultFormatter {
    /// Prepended to every message, e.g. a channel tag
    pub prefix: Option<StyledText>,
    /// Repeat accepted input back to the participant
    pub echo_input: bool,
}

impl Default for DefaultFormatter {
    fn default() -> Self {
        Self {
            prefix: None,
            echo_input: true,
        }
    }
}

impl DefaultFormatter {
    fn with_prefix(&self, body: &StyledText) -> StyledText {
        match &self.prefix {
            Some(prefix) => {
                let mut text = prefix.clone();
                text.push(" ", Style::Plain).append(body);
                text
            }
            None => body.clone(),
        }
    }
}

impl Formatter for DefaultFormatter {
    fn begin(&self, intro: &Intro<'_>) -> FormatResult {
        let mut text = intro.title.clone().with_style(Style::Title);
        if let Some(summary) = intro.summary {
            text.append_line(summary);
        }
        if let Some(help) = intro.help {
            text.append_line(&help.clone().with_style(Style::Muted));
        }
        text.append_line(&StyledText::styled(
            format!("Type '{}' at any time to stop.", intro.cancel_token),
            Style::Muted,
        ));
        Ok(self.with_prefix(&text))
    }

    fn prompt(&self, prompt: &StyledText, hint: Option<&StyledText>) -> FormatResult {
        let mut text = prompt.clone();
        if let Some(hint) = hint {
            text.push(" (", Style::Muted)
                .append(&hint.clone().with_style(Style::Muted))
                .push(")", Style::Muted);
        }
        Ok(self.with_prefix(&text))
    }

    fn echo(&self, input: &str) -> FormatResult {
        if !self.echo_input {
            return Ok(StyledText::new());
        }
        Ok(self.with_prefix(&StyledText::styled(format!("> {input}"), Style::Muted)))
    }

    fn invalid(&self, input: &str) -> FormatResult {
        Ok(self.with_prefix(&StyledText::styled(
            format!("'{input}' is not a valid answer, please try again."),
            Style::Error,
        )))
    }

    fn cancelled(&self, message: &StyledText) -> FormatResult {
        Ok(self.with_prefix(&message.clone().with_style(Style::Error)))
    }

    fn completed(&self, message: &StyledText) -> FormatResult {
        Ok(self.with_prefix(&message.clone().with_style(Style::Success)))
    }
}
