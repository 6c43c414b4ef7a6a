//! Branch resolvers
//!
//! A branch maps an accepted input to the identifier of the next step.
//! `None` means the conversation has nothing more to ask.

use std::fmt;
use std::sync::Arc;

type Resolver = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// One row of a choice table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub input: String,
    pub target: String,
}

/// Chooses the next step by identifier instead of position
#[derive(Clone)]
pub enum Branch {
    /// Always continue at this step
    Goto(String),
    /// Continue at the step whose route matches the input (case-insensitive).
    /// Unlisted input ends the conversation.
    Choices(Vec<Route>),
    Custom(Resolver),
}

impl Branch {
    pub fn goto(target: impl Into<String>) -> Self {
        Self::Goto(target.into())
    }

    pub fn choices<I, A, B>(routes: I) -> Self
    where
        I: IntoIterator<Item = (A, B)>,
        A: Into<String>,
        B: Into<String>,
    {
        Self::Choices(
            routes
                .into_iter()
                .map(|(input, target)| Route {
                    input: input.into(),
                    target: target.into(),
                })
                .collect(),
        )
    }

    pub fn custom(resolver: impl Fn(&str) -> Option<String> + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(resolver))
    }

    /// Identifier of the next step, if any
    pub fn resolve(&self, input: &str) -> Option<String> {
        match self {
            Self::Goto(target) => Some(target.clone()),
            Self::Choices(routes) => {
                let input = input.trim();
                routes
                    .iter()
                    .find(|r| r.input.eq_ignore_ascii_case(input))
                    .map(|r| r.target.clone())
            }
            Self::Custom(resolver) => resolver(input),
        }
    }
}

impl fmt::Debug for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Goto(target) => f.debug_tuple("Goto").field(target).finish(),
            Self::Choices(routes) => f.debug_tuple("Choices").field(routes).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}
