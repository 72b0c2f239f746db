//! Mental state conditions
//!
//! A condition is a conjunction of mental literals. Evaluating one is the job
//! of the mental state backend; the interpreter only instantiates conditions
//! and asks which variables they can bind.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::term::{Substitution, Term};

/// Which base a literal queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LiteralKind {
    Bel,
    Goal,
    /// Goal that is not yet believed to be achieved
    AGoal,
    /// Goal that is believed to be achieved
    GoalA,
    Percept,
}

impl LiteralKind {
    fn keyword(self) -> &'static str {
        match self {
            LiteralKind::Bel => "bel",
            LiteralKind::Goal => "goal",
            LiteralKind::AGoal => "a-goal",
            LiteralKind::GoalA => "goal-a",
            LiteralKind::Percept => "percept",
        }
    }
}

fn positive() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MentalLiteral {
    #[serde(default = "positive")]
    pub positive: bool,
    pub kind: LiteralKind,
    pub formula: Term,
}

impl MentalLiteral {
    pub fn new(kind: LiteralKind, formula: Term) -> Self {
        Self {
            positive: true,
            kind,
            formula,
        }
    }

    pub fn negated(mut self) -> Self {
        self.positive = !self.positive;
        self
    }

    /// Goal literals are the ones that can put a goal in focus
    pub fn is_goal_literal(&self) -> bool {
        matches!(self.kind, LiteralKind::Goal | LiteralKind::AGoal | LiteralKind::GoalA)
    }
}

impl fmt::Display for MentalLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.positive {
            write!(f, "{}({})", self.kind.keyword(), self.formula)
        } else {
            write!(f, "not({}({}))", self.kind.keyword(), self.formula)
        }
    }
}

/// Conjunction of mental literals; the empty conjunction is `true`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MentalStateCondition {
    literals: Vec<MentalLiteral>,
}

impl MentalStateCondition {
    pub fn new(literals: Vec<MentalLiteral>) -> Self {
        Self { literals }
    }

    pub fn always() -> Self {
        Self::default()
    }

    pub fn bel(formula: Term) -> Self {
        Self::new(vec![MentalLiteral::new(LiteralKind::Bel, formula)])
    }

    pub fn goal(formula: Term) -> Self {
        Self::new(vec![MentalLiteral::new(LiteralKind::Goal, formula)])
    }

    pub fn and(mut self, literal: MentalLiteral) -> Self {
        self.literals.push(literal);
        self
    }

    pub fn literals(&self) -> &[MentalLiteral] {
        &self.literals
    }

    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    /// Variables a successful evaluation can bind
    ///
    /// Only positive literals bind; variables that occur solely under a
    /// negation stay free.
    pub fn free_vars(&self) -> Vec<String> {
        let mut vars = Vec::new();
        for literal in self.literals.iter().filter(|l| l.positive) {
            literal.formula.collect_vars(&mut vars);
        }
        vars
    }

    pub fn apply(&self, subst: &Substitution) -> MentalStateCondition {
        Self {
            literals: self
                .literals
                .iter()
                .map(|l| MentalLiteral {
                    positive: l.positive,
                    kind: l.kind,
                    formula: l.formula.apply(subst),
                })
                .collect(),
        }
    }
}

impl fmt::Display for MentalStateCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.literals.is_empty() {
            return write!(f, "true");
        }
        for (i, literal) in self.literals.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", literal)?;
        }
        Ok(())
    }
}
