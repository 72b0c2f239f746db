//! The interpreter's single error kind

use std::error::Error as _;
use thiserror::Error;

use crate::environment::EnvironmentError;
use crate::mental_state::MentalStateError;
use crate::planner::PlannerError;

/// An action, rule or module could not be executed
///
/// Raised once, it unwinds every frame of the agent's call stack.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("{subject} failed")]
pub struct ActionFailed {
    /// What was being executed, as written in the program
    pub subject: String,
    #[source]
    pub cause: FailureCause,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FailureCause {
    #[error(transparent)]
    MentalState(#[from] MentalStateError),

    #[error(transparent)]
    Environment(#[from] EnvironmentError),

    #[error(transparent)]
    Planner(#[from] PlannerError),

    #[error("variables {vars:?} are unbound in {context}")]
    UnboundVariables { context: String, vars: Vec<String> },

    #[error("module {0} does not exist")]
    UnknownModule(String),

    #[error("module {module} takes {expected} parameters but was called with {found}")]
    Arity {
        module: String,
        expected: usize,
        found: usize,
    },

    #[error("parameter {formal} of module {module} does not match {actual}")]
    ParameterMismatch {
        module: String,
        formal: String,
        actual: String,
    },

    #[error("learner picked candidate {chosen} of {available} in module {module}")]
    Learner {
        module: String,
        chosen: usize,
        available: usize,
    },
}

impl ActionFailed {
    pub fn new(subject: impl ToString, cause: impl Into<FailureCause>) -> Self {
        Self {
            subject: subject.to_string(),
            cause: cause.into(),
        }
    }

    /// Messages from this error down to its root cause
    pub fn chain(&self) -> Vec<String> {
        let mut messages = vec![self.to_string()];
        let mut source = self.source();
        while let Some(err) = source {
            messages.push(err.to_string());
            source = err.source();
        }
        messages
    }
}
