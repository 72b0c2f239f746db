//! Planner seam for the planning module strategy

use std::collections::VecDeque;
use thiserror::Error;

use crate::mental_state::MentalState;
use crate::program::{Action, Module, Substitution};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PlannerError {
    #[error("planning for module {module} failed: {reason}")]
    Failed { module: String, reason: String },
}

/// One plan step: an action and the bindings to run it under
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub action: Action,
    pub substitution: Substitution,
}

impl Step {
    pub fn new(action: Action, substitution: Substitution) -> Self {
        Self {
            action,
            substitution,
        }
    }
}

/// FIFO of steps handed out one at a time
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Plan {
    steps: VecDeque<Step>,
}

impl Plan {
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            steps: steps.into_iter().collect(),
        }
    }

    pub fn pop_next_step(&mut self) -> Option<Step> {
        self.steps.pop_front()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

pub trait Planner: Send {
    /// Plan for `module` from the current mental state; `None` when no plan exists
    fn create_new_plan(
        &mut self,
        module: &Module,
        mental_state: &dyn MentalState,
        subst: &Substitution,
    ) -> Result<Option<Plan>, PlannerError>;
}

/// Default for agents without planning modules
#[derive(Debug, Default)]
pub struct NoPlanner;

impl Planner for NoPlanner {
    fn create_new_plan(
        &mut self,
        _module: &Module,
        _mental_state: &dyn MentalState,
        _subst: &Substitution,
    ) -> Result<Option<Plan>, PlannerError> {
        Ok(None)
    }
}
