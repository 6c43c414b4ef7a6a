//! Ordered step collection with an identifier index

use super::Step;
use crate::formatter::Formatter;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Errors detected while assembling a step sequence
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("A session needs at least one step")]
    EmptySequence,
    #[error("Step id used more than once: {0}")]
    DuplicateStepId(String),
}

/// The default (linear) path through a session plus branch targets by id
#[derive(Debug, Clone)]
pub struct StepSequence {
    steps: Vec<Step>,
    index: HashMap<String, usize>,
}

impl StepSequence {
    pub fn new(steps: Vec<Step>) -> Result<Self, ConfigError> {
        if steps.is_empty() {
            return Err(ConfigError::EmptySequence);
        }

        let mut index = HashMap::with_capacity(steps.len());
        for (position, step) in steps.iter().enumerate() {
            if let Some(id) = step.id() {
                if index.insert(id.to_string(), position).is_some() {
                    return Err(ConfigError::DuplicateStepId(id.to_string()));
                }
            }
        }

        Ok(Self { steps, index })
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&Step> {
        self.steps.get(position)
    }

    /// Position of the step carrying `id`
    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Step> {
        self.steps.iter()
    }

    /// Give every step without its own formatter the session formatter
    pub(crate) fn bind_formatter(&mut self, formatter: &Arc<dyn Formatter>) {
        for step in &mut self.steps {
            if step.formatter.is_none() {
                step.formatter = Some(Arc::clone(formatter));
            }
        }
    }
}

impl std::ops::Index<usize> for StepSequence {
    type Output = Step;

    fn index(&self, position: usize) -> &Step {
        &self.steps[position]
    }
}
