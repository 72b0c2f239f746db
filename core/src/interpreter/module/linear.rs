//! Linear strategy: rules in order, one pass per cycle

use std::collections::VecDeque;
use tracing::trace;

use super::ModuleCore;
use crate::interpreter::context::RunContext;
use crate::interpreter::error::ActionFailed;
use crate::interpreter::frame::Transition;
use crate::interpreter::result::RunResult;

#[derive(Debug, Default)]
pub(crate) struct LinearState {
    /// Rule indices still to try in the current pass
    queue: VecDeque<usize>,
    /// The queue was built for the current pass
    pass_open: bool,
    awaiting: Awaiting,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum Awaiting {
    #[default]
    Nothing,
    Rule,
    EventPass,
}

impl LinearState {
    pub(crate) fn resume(
        &mut self,
        core: &mut ModuleCore,
        previous: Option<RunResult>,
        ctx: &mut RunContext,
    ) -> Result<Transition, ActionFailed> {
        let mut boundary = false;
        match (std::mem::take(&mut self.awaiting), previous) {
            (Awaiting::Rule, Some(rule)) => {
                core.absorb(rule);
                // Under a non-all order a rule that did something ends the pass
                boundary = self.queue.is_empty() || (!core.order().is_all() && rule.performed_action);
            }
            (Awaiting::EventPass, Some(event)) => core.absorb_event_pass(event),
            _ => {}
        }

        if core.must_stop(ctx) {
            return core.finish(ctx);
        }
        if boundary {
            if let Some(frames) = self.end_pass(core, ctx) {
                return frames;
            }
        }

        if !self.pass_open {
            let mut rules: Vec<usize> = (0..core.module().rules.len()).collect();
            if core.order().shuffles_rules() {
                ctx.shuffle(&mut rules);
            }
            trace!(module = %core.module(), ?rules, "new pass");
            self.queue = rules.into();
            self.pass_open = true;
        }

        match self.queue.pop_front() {
            Some(index) => {
                self.awaiting = Awaiting::Rule;
                Ok(Transition::Yield(vec![core.rule_frame(index)]))
            }
            // Only reached by a module without rules
            None => match self.end_pass(core, ctx) {
                Some(frames) => frames,
                None => Ok(Transition::Yield(Vec::new())),
            },
        }
    }

    /// Close the current pass: exit when the exit condition holds, otherwise
    /// start over, running the event module first when there is one
    fn end_pass(
        &mut self,
        core: &mut ModuleCore,
        ctx: &mut RunContext,
    ) -> Option<Result<Transition, ActionFailed>> {
        if core.exit_condition_holds(ctx) {
            return Some(core.finish(ctx));
        }
        core.next_pass(ctx);
        self.queue.clear();
        self.pass_open = false;
        let frames = core.event_pass(ctx)?;
        self.awaiting = Awaiting::EventPass;
        Some(Ok(Transition::Yield(frames)))
    }
}
