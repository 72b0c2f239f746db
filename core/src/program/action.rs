//! Actions and action combos

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use super::condition::MentalStateCondition;
use super::module::Module;
use super::term::{Substitution, Term};
use super::SourceInfo;

/* ===================== Actions ===================== */

/// An action as it appears in a rule's action combo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", content = "v")]
pub enum Action {
    /// Environment action with a user specified pre- and postcondition
    UserSpec(UserSpecAction),
    /// Call of a named module or an inline anonymous one
    ModuleCall(ModuleCallAction),
    /// Built-in action on the agent's own mental state
    Mental(MentalAction),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSpecAction {
    pub name: String,
    #[serde(default)]
    pub params: Vec<Term>,
    #[serde(default)]
    pub pre: MentalStateCondition,
    #[serde(default)]
    pub post: Vec<BeliefEffect>,
    #[serde(default)]
    pub source: Option<SourceInfo>,
}

/// Belief base change applied after a user specified action succeeded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", content = "v")]
pub enum BeliefEffect {
    Insert(Term),
    Delete(Term),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleCallAction {
    pub target: ModuleTarget,
    #[serde(default)]
    pub params: Vec<Term>,
    #[serde(default)]
    pub source: Option<SourceInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", content = "v")]
pub enum ModuleTarget {
    Named(String),
    Anonymous(Arc<Module>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", content = "v")]
pub enum MentalAction {
    Insert(Term),
    Delete(Term),
    Adopt(Term),
    Drop(Term),
    /// exit-module
    Exit,
    Log(Term),
}

impl Action {
    pub fn user(name: impl Into<String>, params: Vec<Term>) -> Self {
        Action::UserSpec(UserSpecAction {
            name: name.into(),
            params,
            pre: MentalStateCondition::always(),
            post: Vec::new(),
            source: None,
        })
    }

    /// User action guarded by a precondition
    pub fn guarded(name: impl Into<String>, params: Vec<Term>, pre: MentalStateCondition) -> Self {
        match Action::user(name, params) {
            Action::UserSpec(mut action) => {
                action.pre = pre;
                Action::UserSpec(action)
            }
            other => other,
        }
    }

    pub fn call(module: impl Into<String>, params: Vec<Term>) -> Self {
        Action::ModuleCall(ModuleCallAction {
            target: ModuleTarget::Named(module.into()),
            params,
            source: None,
        })
    }

    pub fn nested(module: Module) -> Self {
        Action::ModuleCall(ModuleCallAction {
            target: ModuleTarget::Anonymous(Arc::new(module)),
            params: Vec::new(),
            source: None,
        })
    }

    pub fn insert(term: Term) -> Self {
        Action::Mental(MentalAction::Insert(term))
    }

    pub fn delete(term: Term) -> Self {
        Action::Mental(MentalAction::Delete(term))
    }

    pub fn adopt(term: Term) -> Self {
        Action::Mental(MentalAction::Adopt(term))
    }

    pub fn drop_goal(term: Term) -> Self {
        Action::Mental(MentalAction::Drop(term))
    }

    pub fn exit_module() -> Self {
        Action::Mental(MentalAction::Exit)
    }

    pub fn is_module_call(&self) -> bool {
        matches!(self, Action::ModuleCall(_))
    }

    pub fn precondition(&self) -> Option<&MentalStateCondition> {
        match self {
            Action::UserSpec(action) => Some(&action.pre),
            Action::ModuleCall(_) | Action::Mental(_) => None,
        }
    }

    pub fn source(&self) -> Option<&SourceInfo> {
        match self {
            Action::UserSpec(action) => action.source.as_ref(),
            Action::ModuleCall(call) => call.source.as_ref(),
            Action::Mental(_) => None,
        }
    }

    /// Instantiate every term of the action
    ///
    /// Anonymous module bodies are left alone; they receive the substitution
    /// when they are entered.
    pub fn apply(&self, subst: &Substitution) -> Action {
        match self {
            Action::UserSpec(action) => Action::UserSpec(action.apply(subst)),
            Action::ModuleCall(call) => Action::ModuleCall(ModuleCallAction {
                target: call.target.clone(),
                params: call.params.iter().map(|p| p.apply(subst)).collect(),
                source: call.source.clone(),
            }),
            Action::Mental(action) => Action::Mental(action.apply(subst)),
        }
    }
}

impl UserSpecAction {
    pub fn apply(&self, subst: &Substitution) -> UserSpecAction {
        UserSpecAction {
            name: self.name.clone(),
            params: self.params.iter().map(|p| p.apply(subst)).collect(),
            pre: self.pre.apply(subst),
            post: self
                .post
                .iter()
                .map(|effect| match effect {
                    BeliefEffect::Insert(t) => BeliefEffect::Insert(t.apply(subst)),
                    BeliefEffect::Delete(t) => BeliefEffect::Delete(t.apply(subst)),
                })
                .collect(),
            source: self.source.clone(),
        }
    }

    pub fn free_vars(&self) -> Vec<String> {
        let mut vars = Vec::new();
        for param in &self.params {
            param.collect_vars(&mut vars);
        }
        vars
    }
}

impl MentalAction {
    pub fn apply(&self, subst: &Substitution) -> MentalAction {
        match self {
            MentalAction::Insert(t) => MentalAction::Insert(t.apply(subst)),
            MentalAction::Delete(t) => MentalAction::Delete(t.apply(subst)),
            MentalAction::Adopt(t) => MentalAction::Adopt(t.apply(subst)),
            MentalAction::Drop(t) => MentalAction::Drop(t.apply(subst)),
            MentalAction::Exit => MentalAction::Exit,
            MentalAction::Log(t) => MentalAction::Log(t.apply(subst)),
        }
    }

    /// The term a base update would store, if any
    pub fn update_term(&self) -> Option<&Term> {
        match self {
            MentalAction::Insert(t)
            | MentalAction::Delete(t)
            | MentalAction::Adopt(t)
            | MentalAction::Drop(t) => Some(t),
            MentalAction::Exit | MentalAction::Log(_) => None,
        }
    }
}

fn write_call(f: &mut fmt::Formatter<'_>, name: &str, params: &[Term]) -> fmt::Result {
    if params.is_empty() {
        return write!(f, "{}", name);
    }
    write!(f, "{}(", name)?;
    for (i, p) in params.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", p)?;
    }
    write!(f, ")")
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::UserSpec(action) => write!(f, "{}", action),
            Action::ModuleCall(call) => match &call.target {
                ModuleTarget::Named(name) => write_call(f, name, &call.params),
                ModuleTarget::Anonymous(module) => write!(f, "{{{}}}", module.name),
            },
            Action::Mental(action) => write!(f, "{}", action),
        }
    }
}

impl fmt::Display for UserSpecAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_call(f, &self.name, &self.params)
    }
}

impl fmt::Display for MentalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MentalAction::Insert(t) => write!(f, "insert({})", t),
            MentalAction::Delete(t) => write!(f, "delete({})", t),
            MentalAction::Adopt(t) => write!(f, "adopt({})", t),
            MentalAction::Drop(t) => write!(f, "drop({})", t),
            MentalAction::Exit => write!(f, "exit-module"),
            MentalAction::Log(t) => write!(f, "log({})", t),
        }
    }
}

/* ===================== Action Combos ===================== */

/// Ordered, non-empty group of actions fired together by one rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionCombo {
    actions: Vec<Action>,
}

impl ActionCombo {
    pub fn new(actions: Vec<Action>) -> Self {
        debug_assert!(!actions.is_empty(), "action combo must not be empty");
        Self { actions }
    }

    pub fn single(action: Action) -> Self {
        Self {
            actions: vec![action],
        }
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn apply(&self, subst: &Substitution) -> ActionCombo {
        Self {
            actions: self.actions.iter().map(|a| a.apply(subst)).collect(),
        }
    }
}

impl From<Action> for ActionCombo {
    fn from(action: Action) -> Self {
        ActionCombo::single(action)
    }
}

impl fmt::Display for ActionCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, action) in self.actions.iter().enumerate() {
            if i > 0 {
                write!(f, " + ")?;
            }
            write!(f, "{}", action)?;
        }
        Ok(())
    }
}
