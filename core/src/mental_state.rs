//! Mental state seam
//!
//! The interpreter queries and updates an agent's beliefs and goals through
//! [`MentalState`]. Concrete knowledge representations plug in behind this
//! trait; each agent exclusively owns its own instance.

use thiserror::Error;

use crate::program::{FocusMethod, MentalStateCondition, Substitution, Term};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MentalStateError {
    #[error("query {query} failed: {reason}")]
    Query { query: String, reason: String },

    #[error("update {update} failed: {reason}")]
    Update { update: String, reason: String },

    #[error("no attention set for module {0}")]
    NoFocus(String),
}

/// Answers for one focused goal
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FocusedAnswers {
    /// The goal the answers were found for, if the condition put one in focus
    pub goal: Option<Term>,
    pub substitutions: Vec<Substitution>,
}

/// Outcome of evaluating a mental state condition
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MscResult {
    pub holds: bool,
    /// Whether the condition asks to focus on the goals it matched
    pub focus: bool,
    pub answers: Vec<FocusedAnswers>,
}

impl MscResult {
    pub fn failed() -> Self {
        Self::default()
    }

    /// Holding result without focus
    pub fn holds_with(substitutions: Vec<Substitution>) -> Self {
        Self {
            holds: !substitutions.is_empty(),
            focus: false,
            answers: vec![FocusedAnswers {
                goal: None,
                substitutions,
            }],
        }
    }

    /// Every satisfying substitution, grouped answers flattened in order
    pub fn substitutions(&self) -> impl Iterator<Item = &Substitution> {
        self.answers.iter().flat_map(|a| a.substitutions.iter())
    }
}

/// Change record of a base update
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Update {
    pub added: Vec<Term>,
    pub removed: Vec<Term>,
}

impl Update {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Belief and goal bases of one agent
pub trait MentalState: Send {
    /// Evaluate `condition` under `subst`
    ///
    /// Returned substitutions bind the condition's remaining free variables.
    fn evaluate(
        &mut self,
        condition: &MentalStateCondition,
        subst: &Substitution,
    ) -> Result<MscResult, MentalStateError>;

    fn insert(&mut self, belief: &Term) -> Result<Update, MentalStateError>;

    fn delete(&mut self, belief: &Term) -> Result<Update, MentalStateError>;

    fn adopt(&mut self, goal: &Term) -> Result<Update, MentalStateError>;

    fn drop_goal(&mut self, goal: &Term) -> Result<Update, MentalStateError>;

    /// Whether the current attention set holds any goal
    fn has_goals(&self) -> bool;

    /// Push an attention set for a module that declares a focus method
    fn enter_focus(
        &mut self,
        module: &str,
        method: FocusMethod,
        goal: Option<&Term>,
    ) -> Result<(), MentalStateError>;

    /// Pop the attention set pushed by [`MentalState::enter_focus`]
    fn exit_focus(&mut self, module: &str) -> Result<(), MentalStateError>;

    /// Current beliefs, used by learners to key their state
    fn beliefs(&self) -> Vec<Term> {
        Vec::new()
    }

    /// Goals of the current attention set
    fn goals(&self) -> Vec<Term> {
        Vec::new()
    }
}
