//! Execution engine for BDI agent programs
//!
//! An agent program is a set of modules of condition-action rules. The
//! [`interpreter`] runs them against a pluggable [`mental_state`] and
//! [`environment`], one resumable frame at a time.

pub mod config;
pub mod environment;
pub mod events;
pub mod interpreter;
pub mod learner;
pub mod mental_state;
pub mod planner;
pub mod program;
pub mod telemetry;

pub use config::Config;
pub use interpreter::{ActionFailed, Agent, CallStack, RunContext, RunResult, RunStatus};
pub use program::AgentProgram;
