//! Frames of the call stack
//!
//! Every frame is one executor. Frames nest in a fixed order, module above
//! rule above action combo above action, repeating through module calls.
//! When a parent skips a level it pushes a [`Frame::Hole`] so depth keeps the
//! same meaning for step debuggers.

use serde::{Deserialize, Serialize};

use super::action::ActionExecutor;
use super::combo::ActionComboExecutor;
use super::context::RunContext;
use super::error::ActionFailed;
use super::module::ModuleExecutor;
use super::result::RunResult;
use super::rule::RuleExecutor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FrameKind {
    Module,
    Rule,
    ActionCombo,
    Action,
    /// Placeholder for a skipped nesting level
    Hole,
}

impl FrameKind {
    /// The kind that may sit directly above this one
    pub fn child(self) -> Option<FrameKind> {
        match self {
            FrameKind::Module => Some(FrameKind::Rule),
            FrameKind::Rule => Some(FrameKind::ActionCombo),
            FrameKind::ActionCombo => Some(FrameKind::Action),
            FrameKind::Action => Some(FrameKind::Module),
            FrameKind::Hole => None,
        }
    }
}

#[derive(Debug)]
pub enum Frame {
    Module(ModuleExecutor),
    Rule(RuleExecutor),
    ActionCombo(ActionComboExecutor),
    Action(ActionExecutor),
    Hole,
}

/// What a resumed frame wants next
#[derive(Debug)]
pub enum Transition {
    /// Stay on the stack with these children above it; the last one runs first
    Yield(Vec<Frame>),
    /// Leave the stack with this result
    Done(RunResult),
}

/// A frame that left the stack, as seen by the frame below it
#[derive(Debug, Clone, PartialEq)]
pub struct Completed {
    pub kind: FrameKind,
    pub result: Result<RunResult, ActionFailed>,
}

impl Completed {
    /// The child's result, or its error for the parent to propagate
    pub fn into_result(self) -> Result<RunResult, ActionFailed> {
        self.result
    }
}

impl Frame {
    pub fn kind(&self) -> FrameKind {
        match self {
            Frame::Module(_) => FrameKind::Module,
            Frame::Rule(_) => FrameKind::Rule,
            Frame::ActionCombo(_) => FrameKind::ActionCombo,
            Frame::Action(_) => FrameKind::Action,
            Frame::Hole => FrameKind::Hole,
        }
    }

    /// Resume the frame after its previous child completed
    ///
    /// An `Err` in `previous` is returned unchanged, so a failure climbs the
    /// stack one frame per pop without any frame acting on it.
    pub fn resume(
        &mut self,
        previous: Option<Completed>,
        ctx: &mut RunContext,
    ) -> Result<Transition, ActionFailed> {
        let previous = previous.map(Completed::into_result).transpose()?;
        match self {
            Frame::Module(executor) => executor.resume(previous, ctx),
            Frame::Rule(executor) => executor.resume(previous, ctx),
            Frame::ActionCombo(executor) => executor.resume(previous, ctx),
            Frame::Action(executor) => executor.resume(previous, ctx),
            Frame::Hole => Ok(Transition::Done(previous.unwrap_or(RunResult::START))),
        }
    }

    /// Holes for the levels between a parent of `from` and a frame of kind `to`
    pub(crate) fn holes_between(from: FrameKind, to: FrameKind) -> Vec<Frame> {
        let mut holes = Vec::new();
        let mut level = from.child();
        while let Some(kind) = level {
            if kind == to {
                break;
            }
            holes.push(Frame::Hole);
            level = kind.child();
        }
        holes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_holes_between_levels() {
        assert_eq!(Frame::holes_between(FrameKind::Module, FrameKind::Rule).len(), 0);
        assert_eq!(Frame::holes_between(FrameKind::Module, FrameKind::ActionCombo).len(), 1);
        assert_eq!(Frame::holes_between(FrameKind::Module, FrameKind::Module).len(), 3);
        assert_eq!(Frame::holes_between(FrameKind::Action, FrameKind::Module).len(), 0);
    }
}
