//! Input validators
//!
//! A validator is a pure predicate: it may be called any number of times for
//! the same input and must never mutate anything.

use regex::Regex;
use std::fmt;
use std::sync::Arc;

type Predicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Decides whether an input is acceptable for a step
#[derive(Clone, Default)]
pub enum Validator {
    /// Accept everything, including empty input
    #[default]
    Any,
    /// Reject blank input
    NonEmpty,
    /// At least this many characters (after trimming)
    MinLength(usize),
    /// At most this many characters (after trimming)
    MaxLength(usize),
    /// A signed 64-bit integer
    Integer,
    /// A finite decimal number
    Number,
    /// An integer within `min..=max`
    IntegerRange { min: i64, max: i64 },
    /// One of the listed choices, compared case-insensitively
    OneOf(Vec<String>),
    /// The whole trimmed input matches the pattern
    Pattern(Regex),
    /// Every inner validator accepts
    All(Vec<Validator>),
    Custom(Predicate),
}

impl Validator {
    pub fn one_of<I, S>(choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::OneOf(choices.into_iter().map(Into::into).collect())
    }

    /// Compile `pattern` anchored at both ends
    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(&format!("^(?:{pattern})$")).map(Self::Pattern)
    }

    pub fn custom(predicate: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(predicate))
    }

    /// Evaluate the predicate
    pub fn accepts(&self, input: &str) -> bool {
        let trimmed = input.trim();
        match self {
            Self::Any => true,
            Self::NonEmpty => !trimmed.is_empty(),
            Self::MinLength(min) => trimmed.chars().count() >= *min,
            Self::MaxLength(max) => trimmed.chars().count() <= *max,
            Self::Integer => trimmed.parse::<i64>().is_ok(),
            Self::Number => trimmed.parse::<f64>().is_ok_and(f64::is_finite),
            Self::IntegerRange { min, max } => trimmed
                .parse::<i64>()
                .is_ok_and(|n| (*min..=*max).contains(&n)),
            Self::OneOf(choices) => choices.iter().any(|c| c.eq_ignore_ascii_case(trimmed)),
            Self::Pattern(re) => matches_whole(re, trimmed),
            Self::All(inner) => inner.iter().all(|v| v.accepts(input)),
            Self::Custom(predicate) => predicate(input),
        }
    }
}

/// Leftmost-first matching can stop short of a longer alternative, so a
/// partial leftmost match falls back to an anchored copy of the pattern.
fn matches_whole(re: &Regex, input: &str) -> bool {
    if re
        .find(input)
        .is_some_and(|m| m.start() == 0 && m.end() == input.len())
    {
        return true;
    }
    match Regex::new(&format!("^(?:{})$", re.as_str())) {
        Ok(anchored) => anchored.is_match(input),
        Err(e) => {
            tracing::warn!(pattern = %re.as_str(), error = %e, "Pattern cannot be anchored");
            false
        }
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("Any"),
            Self::NonEmpty => f.write_str("NonEmpty"),
            Self::MinLength(n) => f.debug_tuple("MinLength").field(n).finish(),
            Self::MaxLength(n) => f.debug_tuple("MaxLength").field(n).finish(),
            Self::Integer => f.write_str("Integer"),
            Self::Number => f.write_str("Number"),
            Self::IntegerRange { min, max } => f
                .debug_struct("IntegerRange")
                .field("min", min)
                .field("max", max)
                .finish(),
            Self::OneOf(choices) => f.debug_tuple("OneOf").field(choices).finish(),
            Self::Pattern(re) => f.debug_tuple("Pattern").field(&re.as_str()).finish(),
            Self::All(inner) => f.debug_tuple("All").field(inner).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}
