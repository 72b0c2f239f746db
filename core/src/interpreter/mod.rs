//! # Interpreter - Stack-Driven Agent Execution
//!
//! Runs an agent program as a stack of resumable frames instead of nested
//! calls, so execution can be single-stepped and inspected at any depth.
//!
//! ## Core Principles
//!
//! 1. **Stack-driven execution**: all state lives in the frames of a [`CallStack`], no recursion
//! 2. **One resumption per pop**: a frame either yields children or completes with a [`RunResult`]
//! 3. **Explicit failure**: a frame error travels down the stack as `Err`, never as hidden state
//! 4. **Pure executor**: collaborators (mental state, environment, learner, planner) are injected
//!    through the [`RunContext`]
//!
//! ## Frame Nesting
//!
//! ```text
//! Module -> Rule -> ActionCombo -> Action -> Module -> ...
//! ```
//!
//! Levels skipped by a parent are filled with [`Frame::Hole`].

pub mod action;
pub mod agent;
pub mod call_stack;
pub mod combo;
pub mod context;
pub mod error;
pub mod frame;
pub mod module;
pub mod result;
pub mod rule;

#[cfg(test)]
mod tests;

pub use action::ActionExecutor;
pub use agent::{Agent, AgentStep, Phase};
pub use call_stack::{CallStack, Step};
pub use combo::ActionComboExecutor;
pub use context::{RunContext, RunContextBuilder};
pub use error::{ActionFailed, FailureCause};
pub use frame::{Completed, Frame, FrameKind, Transition};
pub use module::ModuleExecutor;
pub use result::{RunResult, RunStatus};
pub use rule::RuleExecutor;
