//! Action combo executor
//!
//! Runs the actions of one combo in order. The remaining actions are dropped
//! as soon as a plain action fails, meaning it asked to stop or did not
//! perform anything. Module calls never abort the combo, whatever their
//! outcome; their result is still merged.

use std::collections::VecDeque;
use tracing::debug;

use super::action::ActionExecutor;
use super::context::RunContext;
use super::error::ActionFailed;
use super::frame::{Frame, Transition};
use super::result::RunResult;
use crate::program::{ActionCombo, RuleOrder, Substitution, Term};

#[derive(Debug)]
pub struct ActionComboExecutor {
    combo: ActionCombo,
    substitution: Substitution,
    focus: Option<Term>,
    order: RuleOrder,
    /// Built on first resumption
    pending: Option<VecDeque<ActionExecutor>>,
    last_was_call: bool,
    result: RunResult,
}

impl ActionComboExecutor {
    pub fn new(combo: ActionCombo, substitution: Substitution, focus: Option<Term>, order: RuleOrder) -> Self {
        Self {
            combo,
            substitution,
            focus,
            order,
            pending: None,
            last_was_call: false,
            result: RunResult::START,
        }
    }

    pub fn combo(&self) -> &ActionCombo {
        &self.combo
    }

    pub fn substitution(&self) -> &Substitution {
        &self.substitution
    }

    pub fn resume(
        &mut self,
        previous: Option<RunResult>,
        _ctx: &mut RunContext,
    ) -> Result<Transition, ActionFailed> {
        if self.pending.is_none() {
            let actions = self
                .combo
                .actions()
                .iter()
                .map(|action| {
                    ActionExecutor::new(
                        action.clone(),
                        self.substitution.clone(),
                        self.focus.clone(),
                        self.order,
                    )
                })
                .collect();
            self.pending = Some(actions);
        } else if let Some(action) = previous {
            self.result = self.result.merge(action);
            if !self.last_was_call && action.is_failure() {
                debug!(combo = %self.combo, "action failed, aborting combo");
                return Ok(Transition::Done(self.result));
            }
        }

        let next = self.pending.as_mut().and_then(VecDeque::pop_front);
        match next {
            Some(next) => {
                self.last_was_call = next.is_module_call();
                Ok(Transition::Yield(vec![Frame::Action(next)]))
            }
            None => Ok(Transition::Done(self.result)),
        }
    }
}
