//! Environment seam for user specified actions

use thiserror::Error;
use tracing::debug;

use crate::program::UserSpecAction;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EnvironmentError {
    #[error("environment rejected {action}: {reason}")]
    Rejected { action: String, reason: String },

    #[error("environment unavailable: {0}")]
    Unavailable(String),
}

/// Where an agent's user specified actions are sent
pub trait Environment: Send {
    /// Perform a ground action
    fn perform(&mut self, action: &UserSpecAction) -> Result<(), EnvironmentError>;

    /// Reward observed since the last call, if the environment provides one
    fn reward(&mut self) -> Option<f64> {
        None
    }
}

/// Agents without an environment: every action succeeds and goes nowhere
#[derive(Debug, Default)]
pub struct NoEnvironment;

impl Environment for NoEnvironment {
    fn perform(&mut self, action: &UserSpecAction) -> Result<(), EnvironmentError> {
        debug!(%action, "no environment attached, action dropped");
        Ok(())
    }
}
