//! Rules

use serde::{Deserialize, Serialize};
use std::fmt;

use super::action::ActionCombo;
use super::condition::MentalStateCondition;
use super::SourceInfo;

/// How many satisfying substitutions fire the rule's action
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "t")]
pub enum RuleKind {
    /// `if ... then ...`: the first instantiation that performs an action
    #[default]
    IfThen,
    /// `forall ... do ...`: every instantiation
    ForallDo,
    /// `listall Var <- ... do ...`: once, with `var` bound to all answers
    ListallDo { var: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(default)]
    pub kind: RuleKind,
    #[serde(default)]
    pub condition: MentalStateCondition,
    pub action: ActionCombo,
    #[serde(default)]
    pub source: Option<SourceInfo>,
}

impl Rule {
    pub fn if_then(condition: MentalStateCondition, action: impl Into<ActionCombo>) -> Self {
        Self {
            kind: RuleKind::IfThen,
            condition,
            action: action.into(),
            source: None,
        }
    }

    pub fn forall(condition: MentalStateCondition, action: impl Into<ActionCombo>) -> Self {
        Self {
            kind: RuleKind::ForallDo,
            ..Self::if_then(condition, action)
        }
    }

    pub fn listall(
        var: impl Into<String>,
        condition: MentalStateCondition,
        action: impl Into<ActionCombo>,
    ) -> Self {
        Self {
            kind: RuleKind::ListallDo { var: var.into() },
            ..Self::if_then(condition, action)
        }
    }

    pub fn at(mut self, source: SourceInfo) -> Self {
        self.source = Some(source);
        self
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            RuleKind::IfThen => write!(f, "if {} then {}", self.condition, self.action),
            RuleKind::ForallDo => write!(f, "forall {} do {}", self.condition, self.action),
            RuleKind::ListallDo { var } => {
                write!(f, "listall {} <- {} do {}", var, self.condition, self.action)
            }
        }
    }
}
