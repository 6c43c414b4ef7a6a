//! Styled text delivered to participants
//!
//! The engine never decides how text looks on a given channel. It tags spans
//! with a semantic [`Style`] and leaves rendering to the transport.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic style of a span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Style {
    #[default]
    Plain,
    Title,
    Emphasis,
    Muted,
    Error,
    Success,
}

/// A run of text with a single style
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub text: String,
    #[serde(default)]
    pub style: Style,
}

impl Span {
    pub fn new(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

/// Opaque presentable text: an ordered list of styled spans
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyledText {
    spans: Vec<Span>,
}

impl StyledText {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::styled(text, Style::Plain)
    }

    pub fn styled(text: impl Into<String>, style: Style) -> Self {
        Self {
            spans: vec![Span::new(text, style)],
        }
    }

    /// Append a span, skipping empty text
    pub fn push(&mut self, text: impl Into<String>, style: Style) -> &mut Self {
        let text = text.into();
        if !text.is_empty() {
            self.spans.push(Span::new(text, style));
        }
        self
    }

    /// Append every span of `other`
    pub fn append(&mut self, other: &StyledText) -> &mut Self {
        self.spans.extend(other.spans.iter().cloned());
        self
    }

    /// Append `other` on a new line
    pub fn append_line(&mut self, other: &StyledText) -> &mut Self {
        if !self.is_empty() && !other.is_empty() {
            self.spans.push(Span::new("\n", Style::Plain));
        }
        self.append(other)
    }

    /// Re-tag every span with `style`
    #[must_use]
    pub fn with_style(mut self, style: Style) -> Self {
        for span in &mut self.spans {
            span.style = style;
        }
        self
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    pub fn is_empty(&self) -> bool {
        self.spans.iter().all(|s| s.text.is_empty())
    }

    /// Text with all styling dropped
    pub fn to_plain(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

impl fmt::Display for StyledText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for span in &self.spans {
            f.write_str(&span.text)?;
        }
        Ok(())
    }
}

impl From<&str> for StyledText {
    fn from(text: &str) -> Self {
        Self::plain(text)
    }
}

impl From<String> for StyledText {
    fn from(text: String) -> Self {
        Self::plain(text)
    }
}
