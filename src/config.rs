//! Process-level configuration

use crate::state_machine::DEFAULT_CANCEL_TOKEN;
use serde::Serialize;
use std::str::FromStr;

/// How the console front end writes outgoing messages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Plain text, one line per message
    #[default]
    Text,
    /// One JSON object per message
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

/// Engine configuration read from the environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub cancel_token: String,
    pub output: OutputFormat,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cancel_token: DEFAULT_CANCEL_TOKEN.to_string(),
            output: OutputFormat::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unset, blank or unparseable values fall
    /// back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let cancel_token = lookup("COLLOQUY_CANCEL_TOKEN")
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or(defaults.cancel_token);

        let output = match lookup("COLLOQUY_OUTPUT").map(|o| o.parse::<OutputFormat>()) {
            Some(Ok(output)) => output,
            Some(Err(e)) => {
                tracing::warn!(error = %e, "Ignoring COLLOQUY_OUTPUT");
                defaults.output
            }
            None => defaults.output,
        };

        Self {
            cancel_token,
            output,
        }
    }
}
