//! Action executor
//!
//! Runs exactly one action. A precondition that does not hold skips the action
//! and leaves the result untouched; that is not an error. Module calls expand
//! into a module frame and adopt its result when resumed.

use tracing::{debug, info};

use super::context::RunContext;
use super::error::{ActionFailed, FailureCause};
use super::frame::{Frame, Transition};
use super::module::ModuleExecutor;
use super::result::{RunResult, RunStatus};
use crate::events::Channel;
use crate::program::{
    mgu, Action, BeliefEffect, MentalAction, Module, ModuleCallAction, ModuleTarget, RuleOrder,
    Substitution, Term, UserSpecAction,
};

#[derive(Debug)]
pub struct ActionExecutor {
    action: Action,
    substitution: Substitution,
    focus: Option<Term>,
    order: RuleOrder,
    /// Set once a module frame was pushed; holds whether it is anonymous
    called: Option<bool>,
}

impl ActionExecutor {
    pub fn new(action: Action, substitution: Substitution, focus: Option<Term>, order: RuleOrder) -> Self {
        Self {
            action,
            substitution,
            focus,
            order,
            called: None,
        }
    }

    pub fn action(&self) -> &Action {
        &self.action
    }

    pub fn is_module_call(&self) -> bool {
        self.action.is_module_call()
    }

    pub fn resume(
        &mut self,
        previous: Option<RunResult>,
        ctx: &mut RunContext,
    ) -> Result<Transition, ActionFailed> {
        if let Some(anonymous) = self.called {
            let callee = previous.unwrap_or(RunResult::START);
            return Ok(Transition::Done(RunResult::from_call(callee, anonymous)));
        }

        match &self.action {
            Action::UserSpec(action) => self.perform_user_spec(action, ctx).map(Transition::Done),
            Action::Mental(action) => {
                let action = action.apply(&self.substitution);
                self.perform_mental(&action, ctx).map(Transition::Done)
            }
            Action::ModuleCall(call) => {
                let call = call.clone();
                self.expand_call(&call, ctx)
            }
        }
    }

    /* ===================== User specified actions ===================== */

    fn perform_user_spec(
        &self,
        action: &UserSpecAction,
        ctx: &mut RunContext,
    ) -> Result<RunResult, ActionFailed> {
        let bindings = if action.pre.is_empty() {
            self.substitution.clone()
        } else {
            ctx.emit(
                Channel::ActionPrecondEvaluation,
                action,
                action.source.as_ref(),
                "evaluating precondition %s of %s",
                &[action.pre.apply(&self.substitution).to_string(), action.to_string()],
            );
            let msc = ctx
                .mental_state
                .evaluate(&action.pre, &self.substitution)
                .map_err(|e| ActionFailed::new(action, e))?;
            if !msc.holds {
                debug!(%action, "precondition does not hold, action skipped");
                return Ok(RunResult::START);
            }
            // First answer consistent with the bindings the action came with
            let mut answers = msc.substitutions().peekable();
            if answers.peek().is_none() {
                self.substitution.clone()
            } else {
                match answers.find_map(|answer| self.substitution.combine(answer)) {
                    Some(bindings) => bindings,
                    None => {
                        debug!(%action, "precondition answers conflict with bindings, action skipped");
                        return Ok(RunResult::START);
                    }
                }
            }
        };

        let ground = action.apply(&bindings);
        let unbound = ground.free_vars();
        if !unbound.is_empty() {
            return Err(ActionFailed::new(
                &ground,
                FailureCause::UnboundVariables {
                    context: format!("action {}", ground),
                    vars: unbound,
                },
            ));
        }

        ctx.environment
            .perform(&ground)
            .map_err(|e| ActionFailed::new(&ground, e))?;
        for effect in &ground.post {
            let update = match effect {
                BeliefEffect::Insert(term) => ctx.mental_state.insert(term),
                BeliefEffect::Delete(term) => ctx.mental_state.delete(term),
            };
            update.map_err(|e| ActionFailed::new(&ground, e))?;
        }

        debug!(action = %ground, "performed action");
        ctx.emit(
            Channel::ActionExecutedUserSpec,
            &ground,
            ground.source.as_ref(),
            "performed %s",
            &[ground.to_string()],
        );
        Ok(RunResult::real_action())
    }

    /* ===================== Mental actions ===================== */

    fn perform_mental(
        &self,
        action: &MentalAction,
        ctx: &mut RunContext,
    ) -> Result<RunResult, ActionFailed> {
        if let Some(term) = action.update_term() {
            let unbound = term.free_vars();
            if !unbound.is_empty() {
                return Err(ActionFailed::new(
                    action,
                    FailureCause::UnboundVariables {
                        context: format!("action {}", action),
                        vars: unbound,
                    },
                ));
            }
        }

        let result = match action {
            MentalAction::Insert(term) => ctx.mental_state.insert(term).map(|_| RunResult::action()),
            MentalAction::Delete(term) => ctx.mental_state.delete(term).map(|_| RunResult::action()),
            MentalAction::Adopt(term) => ctx.mental_state.adopt(term).map(|_| RunResult::action()),
            MentalAction::Drop(term) => ctx.mental_state.drop_goal(term).map(|_| RunResult::action()),
            MentalAction::Exit => Ok(RunResult {
                status: RunStatus::SoftStop,
                ..RunResult::action()
            }),
            MentalAction::Log(term) => {
                info!(target: "bdi_core::agent_log", "{}", term);
                Ok(RunResult::action())
            }
        }
        .map_err(|e| ActionFailed::new(action, e))?;

        debug!(%action, "performed mental action");
        ctx.emit(
            Channel::ActionExecutedBuiltin,
            action,
            None,
            "performed %s",
            &[action.to_string()],
        );
        Ok(result)
    }

    /* ===================== Module calls ===================== */

    fn expand_call(
        &mut self,
        call: &ModuleCallAction,
        ctx: &mut RunContext,
    ) -> Result<Transition, ActionFailed> {
        let target = match &call.target {
            ModuleTarget::Named(name) => ctx.program.module(name).ok_or_else(|| {
                ActionFailed::new(&self.action, FailureCause::UnknownModule(name.clone()))
            })?,
            ModuleTarget::Anonymous(module) => module.clone(),
        };

        let substitution = if target.anonymous {
            self.substitution.clone()
        } else {
            bind_parameters(&target, &call.params, &self.substitution)
                .map_err(|cause| ActionFailed::new(&self.action, cause))?
        };

        debug!(module = %target, %substitution, "calling module");
        ctx.emit(
            Channel::CallModule,
            &target,
            call.source.as_ref(),
            "calling module %s with %s",
            &[target.to_string(), substitution.to_string()],
        );

        self.called = Some(target.anonymous);
        let callee = ModuleExecutor::new(target, substitution, Some(self.order), self.focus.clone());
        Ok(Transition::Yield(vec![Frame::Module(callee)]))
    }
}

/// Bindings a named module starts with
///
/// Each formal parameter is unified with the actual parameter instantiated
/// under the caller's substitution. Only bindings of the module's own
/// parameter variables survive.
pub(crate) fn bind_parameters(
    module: &Module,
    actuals: &[Term],
    caller: &Substitution,
) -> Result<Substitution, FailureCause> {
    if module.parameters.len() != actuals.len() {
        return Err(FailureCause::Arity {
            module: module.name.clone(),
            expected: module.parameters.len(),
            found: actuals.len(),
        });
    }

    let mut bound = Substitution::new();
    for (formal, actual) in module.parameters.iter().zip(actuals) {
        let value = actual.apply(caller);
        let unbound = value.free_vars();
        if !unbound.is_empty() {
            return Err(FailureCause::UnboundVariables {
                context: format!("call of module {}", module),
                vars: unbound,
            });
        }
        let unifier = mgu(&formal.apply(&bound), &value).ok_or_else(|| {
            FailureCause::ParameterMismatch {
                module: module.name.clone(),
                formal: formal.to_string(),
                actual: value.to_string(),
            }
        })?;
        bound = bound.combine(&unifier).ok_or_else(|| FailureCause::ParameterMismatch {
            module: module.name.clone(),
            formal: formal.to_string(),
            actual: value.to_string(),
        })?;
    }

    bound.retain_vars(&module.parameter_vars());
    Ok(bound)
}
