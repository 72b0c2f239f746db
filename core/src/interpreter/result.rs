//! Frame results
//!
//! A [`RunResult`] flows upward only: a parent merges the result of each
//! child that finished before it was resumed.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How far a frame wants the reasoning to stop
///
/// Ordered by how terminal the status is, so merging takes the maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RunStatus {
    Running,
    /// Normal module exit, or an exit-module action
    SoftStop,
    /// The agent is being terminated
    HardStop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunResult {
    pub status: RunStatus,
    /// Some action was executed
    pub performed_action: bool,
    /// Some user specified action was sent to the environment
    pub performed_real_action: bool,
}

impl RunResult {
    /// Identity of [`RunResult::merge`]
    pub const START: RunResult = RunResult {
        status: RunStatus::Running,
        performed_action: false,
        performed_real_action: false,
    };

    /// A built-in action ran
    pub const fn action() -> Self {
        RunResult {
            performed_action: true,
            ..Self::START
        }
    }

    /// A user specified action ran
    pub const fn real_action() -> Self {
        RunResult {
            performed_action: true,
            performed_real_action: true,
            ..Self::START
        }
    }

    pub const fn stopped(status: RunStatus) -> Self {
        RunResult {
            status,
            ..Self::START
        }
    }

    pub fn merge(self, other: RunResult) -> RunResult {
        RunResult {
            status: self.status.max(other.status),
            performed_action: self.performed_action || other.performed_action,
            performed_real_action: self.performed_real_action || other.performed_real_action,
        }
    }

    /// What a module call contributes to the calling action
    ///
    /// The callee's status only travels upward for anonymous modules; a named
    /// module exiting does not make its caller exit.
    pub fn from_call(callee: RunResult, anonymous: bool) -> RunResult {
        RunResult {
            status: if anonymous {
                callee.status
            } else {
                RunStatus::Running
            },
            ..callee
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == RunStatus::Running
    }

    /// The frame failed to do anything, or asked to stop
    pub fn is_failure(&self) -> bool {
        !self.is_running() || !self.performed_action
    }
}

impl Default for RunResult {
    fn default() -> Self {
        Self::START
    }
}

impl fmt::Display for RunResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} (action: {}, real action: {})",
            self.status, self.performed_action, self.performed_real_action
        )
    }
}
