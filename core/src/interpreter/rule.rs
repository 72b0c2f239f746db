//! Rule executor
//!
//! Evaluates the rule condition once, turns every answer into an action
//! combo frame and fires them according to the rule kind:
//! - `if` fires combos until the first one performs an action
//! - `forall` fires all of them
//! - `listall` fires exactly one, with the list variable bound to every answer

use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, trace};

use super::combo::ActionComboExecutor;
use super::context::RunContext;
use super::error::ActionFailed;
use super::frame::{Frame, Transition};
use super::result::RunResult;
use crate::events::Channel;
use crate::mental_state::MscResult;
use crate::program::{Module, Rule, RuleKind, RuleOrder, Substitution, Term};

#[derive(Debug)]
pub struct RuleExecutor {
    module: Arc<Module>,
    index: usize,
    substitution: Substitution,
    order: RuleOrder,
    /// Built on first resumption
    pending: Option<VecDeque<ActionComboExecutor>>,
    result: RunResult,
}

impl RuleExecutor {
    /// Executor for rule `index` of `module`
    pub fn new(module: Arc<Module>, index: usize, substitution: Substitution, order: RuleOrder) -> Self {
        debug_assert!(index < module.rules.len());
        Self {
            module,
            index,
            substitution,
            order,
            pending: None,
            result: RunResult::START,
        }
    }

    pub fn rule(&self) -> &Rule {
        &self.module.rules[self.index]
    }

    pub fn resume(
        &mut self,
        previous: Option<RunResult>,
        ctx: &mut RunContext,
    ) -> Result<Transition, ActionFailed> {
        if self.pending.is_none() {
            let combos = self.instantiate(ctx)?;
            self.pending = Some(combos.into());
        } else if let Some(combo) = previous {
            self.result = self.result.merge(combo);
            if !combo.is_running() {
                return Ok(Transition::Done(self.result));
            }
            if self.rule().kind == RuleKind::IfThen && combo.performed_action {
                return Ok(Transition::Done(self.result));
            }
        }

        let next = self.pending.as_mut().and_then(VecDeque::pop_front);
        match next {
            Some(combo) => {
                let rule = &self.module.rules[self.index];
                ctx.emit(
                    Channel::RuleFired,
                    rule,
                    rule.source.as_ref(),
                    "firing %s with %s",
                    &[combo.combo().to_string(), combo.substitution().to_string()],
                );
                Ok(Transition::Yield(vec![Frame::ActionCombo(combo)]))
            }
            None => Ok(Transition::Done(self.result)),
        }
    }

    /// Evaluate the condition and build one combo executor per answer
    fn instantiate(&self, ctx: &mut RunContext) -> Result<Vec<ActionComboExecutor>, ActionFailed> {
        let rule = self.rule();
        let mut combos: Vec<ActionComboExecutor> = instantiations(rule, &self.substitution, ctx)?
            .into_iter()
            .map(|(bindings, focus)| ActionComboExecutor::new(rule.action.clone(), bindings, focus, self.order))
            .collect();
        if self.order.shuffles_instantiations() && combos.len() > 1 {
            ctx.shuffle(&mut combos);
        }
        Ok(combos)
    }
}

/// Bindings (and focused goal) for every way `rule` can fire
///
/// A `listall` rule always fires exactly once.
pub(crate) fn instantiations(
    rule: &Rule,
    substitution: &Substitution,
    ctx: &mut RunContext,
) -> Result<Vec<(Substitution, Option<Term>)>, ActionFailed> {
    ctx.emit(
        Channel::RuleConditionEvaluation,
        rule,
        rule.source.as_ref(),
        "evaluating condition %s",
        &[rule.condition.apply(substitution).to_string()],
    );
    let msc = ctx
        .mental_state
        .evaluate(&rule.condition, substitution)
        .map_err(|e| ActionFailed::new(rule, e))?;

    if let RuleKind::ListallDo { var } = &rule.kind {
        let bindings = listall_bindings(rule, var, &msc, substitution);
        trace!(rule = %rule, %bindings, "listall instantiated");
        return Ok(vec![(bindings, None)]);
    }

    if !msc.holds {
        trace!(rule = %rule, "condition does not hold");
        return Ok(Vec::new());
    }

    let mut options = Vec::new();
    for answers in &msc.answers {
        for answer in &answers.substitutions {
            let Some(bindings) = substitution.combine(answer) else {
                continue;
            };
            let focus = if msc.focus {
                answers.goal.as_ref().map(|goal| goal.apply(&bindings))
            } else {
                None
            };
            options.push((bindings, focus));
        }
    }
    debug!(rule = %rule, options = options.len(), "condition holds");
    Ok(options)
}

/// Substitution for the single firing of a `listall` rule
///
/// Each answer contributes the term of the condition's free variable, or a
/// list of terms when there are several. The answers are collected into one
/// list, in answer order, and bound to `var`; no answers give the empty list.
pub(crate) fn listall_bindings(
    rule: &Rule,
    var: &str,
    msc: &MscResult,
    incoming: &Substitution,
) -> Substitution {
    let free = rule.condition.apply(incoming).free_vars();
    let value_of = |answer: &Substitution, v: &String| {
        answer.get(v).map(|t| t.apply(answer)).unwrap_or_else(|| Term::Var(v.clone()))
    };
    let items: Vec<Term> = msc
        .substitutions()
        .map(|answer| match free.as_slice() {
            [single] => value_of(answer, single),
            several => Term::List(several.iter().map(|v| value_of(answer, v)).collect()),
        })
        .collect();

    let mut bindings = incoming.clone();
    bindings.remove(var);
    bindings.bind(var, Term::List(items));
    bindings
}
