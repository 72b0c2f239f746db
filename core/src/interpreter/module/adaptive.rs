//! Adaptive strategy: a learner picks among all enabled combos
//!
//! Each decision evaluates every rule of the module regardless of the
//! declared order. The learner sees the complete candidate list, the chosen
//! combo runs, and once it (and the event module pass, for the main module)
//! has completed the learner receives the reward before the next decision, or
//! before the module exits when the combo stopped it.

use tracing::debug;

use super::ModuleCore;
use crate::events::Channel;
use crate::interpreter::context::RunContext;
use crate::interpreter::error::{ActionFailed, FailureCause};
use crate::interpreter::frame::Transition;
use crate::interpreter::result::RunResult;
use crate::interpreter::rule::instantiations;
use crate::learner::Candidate;

#[derive(Debug, Default)]
pub(crate) struct AdaptiveState {
    awaiting: Awaiting,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum Awaiting {
    #[default]
    Nothing,
    Combo,
    /// Event pass, after a chosen combo when `chose` is set
    EventPass { chose: bool },
}

impl AdaptiveState {
    pub(crate) fn resume(
        &mut self,
        core: &mut ModuleCore,
        previous: Option<RunResult>,
        ctx: &mut RunContext,
    ) -> Result<Transition, ActionFailed> {
        let mut chose = false;
        match (std::mem::take(&mut self.awaiting), previous) {
            (Awaiting::Combo, Some(combo)) => {
                core.absorb(combo);
                if core.must_stop(ctx) {
                    report_reward(core, ctx);
                    return core.finish(ctx);
                }
                if let Some(frames) = core.event_pass(ctx) {
                    self.awaiting = Awaiting::EventPass { chose: true };
                    return Ok(Transition::Yield(frames));
                }
                chose = true;
            }
            (Awaiting::EventPass { chose: after_choice }, Some(event)) => {
                core.absorb_event_pass(event);
                chose = after_choice;
            }
            _ => {}
        }

        if chose {
            report_reward(core, ctx);
            if core.must_stop(ctx) || core.exit_condition_holds(ctx) {
                return core.finish(ctx);
            }
            core.next_pass(ctx);
        } else if core.must_stop(ctx) {
            return core.finish(ctx);
        }

        let mut candidates = candidates(core, ctx)?;
        if candidates.is_empty() {
            if core.exit_condition_holds(ctx) {
                return core.finish(ctx);
            }
            core.next_pass(ctx);
            return match core.event_pass(ctx) {
                Some(frames) => {
                    self.awaiting = Awaiting::EventPass { chose: false };
                    Ok(Transition::Yield(frames))
                }
                None => Ok(Transition::Yield(Vec::new())),
            };
        }

        let module = core.module().clone();
        let chosen = ctx.learner.act(&module.name, ctx.mental_state.as_ref(), &candidates);
        if chosen >= candidates.len() {
            return Err(ActionFailed::new(
                &*module,
                FailureCause::Learner {
                    module: module.name.clone(),
                    chosen,
                    available: candidates.len(),
                },
            ));
        }
        let choice = candidates.swap_remove(chosen);
        debug!(module = %module, options = candidates.len() + 1, rule = choice.rule, "learner chose");
        ctx.emit(
            Channel::Learner,
            &*module,
            module.rules[choice.rule].source.as_ref(),
            "chose %s from %s options",
            &[choice.instantiated().to_string(), (candidates.len() + 1).to_string()],
        );

        self.awaiting = Awaiting::Combo;
        Ok(Transition::Yield(core.combo_frames(
            choice.combo,
            choice.substitution,
            choice.focus,
        )))
    }
}

/// Every enabled combo of every rule, in declaration order
fn candidates(core: &ModuleCore, ctx: &mut RunContext) -> Result<Vec<Candidate>, ActionFailed> {
    let mut candidates = Vec::new();
    for (index, rule) in core.module().rules.iter().enumerate() {
        for (substitution, focus) in instantiations(rule, core.substitution(), ctx)? {
            candidates.push(Candidate {
                rule: index,
                combo: rule.action.clone(),
                substitution,
                focus,
            });
        }
    }
    Ok(candidates)
}

/// Reward reported by the environment, or 1.0 once every goal is achieved
fn report_reward(core: &ModuleCore, ctx: &mut RunContext) {
    let reward = ctx.environment.reward().unwrap_or_else(|| {
        if ctx.mental_state.has_goals() {
            0.0
        } else {
            1.0
        }
    });
    let module = core.module();
    ctx.learner.update(&module.name, ctx.mental_state.as_ref(), reward);
    debug!(module = %module, reward, "learner updated");
    ctx.emit(
        Channel::Learner,
        &**module,
        module.source.as_ref(),
        "reward %s",
        &[reward.to_string()],
    );
}
