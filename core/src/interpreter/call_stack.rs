//! The call stack driver
//!
//! Owns the LIFO of frames and runs one frame resumption per [`CallStack::pop`].
//! There is no other suspension point: a frame that needs work done pushes
//! itself back with its children and returns, and is resumed once the
//! children have left the stack.
//!
//! ## Function Organization
//! 1. run_until_done() - drives pop() until the stack is empty
//! 2. pop() - resumes the top frame
//! 3. step_over() - pops until the current top frame has left the stack
//! 4. inspection helpers for debuggers (index, kinds, parent_module, last_result)

use tracing::trace;

use super::context::RunContext;
use super::error::ActionFailed;
use super::frame::{Completed, Frame, FrameKind, Transition};
use super::module::ModuleExecutor;
use super::result::RunResult;

/// Result of one pop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Frames are left on the stack
    Continue,
    /// The stack is empty
    Done,
}

#[derive(Debug, Default)]
pub struct CallStack {
    frames: Vec<Frame>,
    /// The frame that most recently left the stack
    previous: Option<Completed>,
}

impl CallStack {
    pub fn new() -> Self {
        Self::default()
    }

    /* ===================== Driving ===================== */

    pub fn push(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    /// Resume the top frame
    pub fn pop(&mut self, ctx: &mut RunContext) -> Step {
        let Some(mut frame) = self.frames.pop() else {
            return Step::Done;
        };

        let kind = frame.kind();
        let previous = self.previous.take();
        match frame.resume(previous, ctx) {
            Ok(Transition::Yield(children)) => {
                trace!(?kind, depth = self.frames.len(), pushed = children.len(), "frame yielded");
                self.frames.push(frame);
                self.frames.extend(children);
            }
            Ok(Transition::Done(result)) => {
                trace!(?kind, depth = self.frames.len(), %result, "frame done");
                self.previous = Some(Completed {
                    kind,
                    result: Ok(result),
                });
            }
            Err(err) => {
                trace!(?kind, depth = self.frames.len(), %err, "frame failed");
                self.previous = Some(Completed {
                    kind,
                    result: Err(err),
                });
            }
        }

        if self.frames.is_empty() {
            Step::Done
        } else {
            Step::Continue
        }
    }

    /// Pop until the stack is empty and return the bottom frame's outcome
    pub fn run_until_done(&mut self, ctx: &mut RunContext) -> Result<RunResult, ActionFailed> {
        while self.pop(ctx) == Step::Continue {}
        self.take_result().unwrap_or(Ok(RunResult::START))
    }

    /// Pop until the frame currently on top has left the stack, running
    /// everything it pushes in the meantime
    pub fn step_over(&mut self, ctx: &mut RunContext) -> Step {
        let depth = self.frames.len();
        loop {
            let step = self.pop(ctx);
            if step == Step::Done || self.frames.len() < depth {
                return step;
            }
        }
    }

    /// Take the outcome of the frame that left last
    ///
    /// Must be called before pushing an unrelated frame onto an empty stack,
    /// otherwise that frame would see the old outcome as its child's.
    pub fn take_result(&mut self) -> Option<Result<RunResult, ActionFailed>> {
        self.previous.take().map(Completed::into_result)
    }

    /// Discard every frame without resuming it
    pub fn clear(&mut self) {
        self.frames.clear();
        self.previous = None;
    }

    /* ===================== Inspection ===================== */

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Current depth
    pub fn index(&self) -> usize {
        self.frames.len()
    }

    /// Kinds of all frames, bottom first
    pub fn kinds(&self) -> Vec<FrameKind> {
        self.frames.iter().map(Frame::kind).collect()
    }

    /// Outcome of the frame that left last, if not taken yet
    pub fn last_result(&self) -> Option<&Result<RunResult, ActionFailed>> {
        self.previous.as_ref().map(|completed| &completed.result)
    }

    /// Innermost module frame
    pub fn parent_module(&self) -> Option<&ModuleExecutor> {
        self.frames.iter().rev().find_map(|frame| match frame {
            Frame::Module(executor) => Some(executor),
            _ => None,
        })
    }
}
