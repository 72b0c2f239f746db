//! Planning strategy: execute the steps of a plan, replanning as needed
//!
//! A plan is requested lazily. Each step runs as a single-action combo. The
//! plan is discarded when it runs out of steps or when a step did not perform
//! its action; the following resumption is an exhaustion point, where the exit
//! condition is checked before replanning.

use tracing::debug;

use super::ModuleCore;
use crate::events::Channel;
use crate::interpreter::context::RunContext;
use crate::interpreter::error::ActionFailed;
use crate::interpreter::frame::Transition;
use crate::interpreter::result::RunResult;
use crate::planner::Plan;
use crate::program::ActionCombo;

#[derive(Debug, Default)]
pub(crate) struct PlanningState {
    plan: Option<Plan>,
    planned_before: bool,
    awaiting_step: bool,
}

impl PlanningState {
    pub(crate) fn resume(
        &mut self,
        core: &mut ModuleCore,
        previous: Option<RunResult>,
        ctx: &mut RunContext,
    ) -> Result<Transition, ActionFailed> {
        if std::mem::take(&mut self.awaiting_step) {
            if let Some(step) = previous {
                core.absorb(step);
                if !step.performed_action && self.plan.take().is_some() {
                    debug!(module = %core.module(), "plan step failed, discarding plan");
                }
            }
        }
        if core.must_stop(ctx) {
            return core.finish(ctx);
        }

        if let Some(transition) = self.next_step(core, ctx) {
            return Ok(transition);
        }
        self.plan = None;

        if self.planned_before {
            if core.exit_condition_holds(ctx) {
                return core.finish(ctx);
            }
            core.next_pass(ctx);
        }
        self.planned_before = true;

        let module = core.module().clone();
        self.plan = ctx
            .planner
            .create_new_plan(&module, ctx.mental_state.as_ref(), core.substitution())
            .map_err(|e| ActionFailed::new(&*module, e))?;
        let steps = self.plan.as_ref().map_or(0, Plan::len);
        debug!(module = %module, steps, "requested plan");
        ctx.emit(
            Channel::Plan,
            &*module,
            module.source.as_ref(),
            "new plan with %s steps",
            &[steps.to_string()],
        );

        Ok(self
            .next_step(core, ctx)
            .unwrap_or_else(|| Transition::Yield(Vec::new())))
    }

    /// Frames running the next step of the current plan
    fn next_step(&mut self, core: &ModuleCore, ctx: &mut RunContext) -> Option<Transition> {
        let step = self.plan.as_mut()?.pop_next_step()?;
        let module = core.module();
        ctx.emit(
            Channel::Plan,
            &**module,
            step.action.source(),
            "executing step %s",
            &[step.action.apply(&step.substitution).to_string()],
        );
        self.awaiting_step = true;
        Some(Transition::Yield(core.combo_frames(
            ActionCombo::single(step.action),
            step.substitution,
            None,
        )))
    }
}
