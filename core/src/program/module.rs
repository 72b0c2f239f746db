//! Modules and their execution policies

use serde::{Deserialize, Serialize};
use std::fmt;

use super::rule::Rule;
use super::term::Term;
use super::SourceInfo;

/* ===================== Policies ===================== */

/// Rule evaluation order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleOrder {
    /// Rules in order, a cycle ends at the first rule that performs an action
    #[default]
    Linear,
    /// Rules in order, every rule is tried each cycle
    LinearAll,
    /// Shuffled rules, a cycle ends at the first rule that performs an action
    Random,
    /// Shuffled rules, every rule is tried each cycle
    RandomAll,
    /// Rules in order, instantiations of each rule shuffled
    LinearRandom,
    /// Every rule in order, instantiations of each rule shuffled
    LinearAllRandom,
}

impl RuleOrder {
    /// Whether every rule is tried in a cycle, even after one performed an action
    pub fn is_all(self) -> bool {
        matches!(
            self,
            RuleOrder::LinearAll | RuleOrder::RandomAll | RuleOrder::LinearAllRandom
        )
    }

    pub fn shuffles_rules(self) -> bool {
        matches!(self, RuleOrder::Random | RuleOrder::RandomAll)
    }

    pub fn shuffles_instantiations(self) -> bool {
        matches!(
            self,
            RuleOrder::Random
                | RuleOrder::RandomAll
                | RuleOrder::LinearRandom
                | RuleOrder::LinearAllRandom
        )
    }
}

impl fmt::Display for RuleOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RuleOrder::Linear => "linear",
            RuleOrder::LinearAll => "linearall",
            RuleOrder::Random => "random",
            RuleOrder::RandomAll => "randomall",
            RuleOrder::LinearRandom => "linearrandom",
            RuleOrder::LinearAllRandom => "linearallrandom",
        };
        write!(f, "{}", name)
    }
}

/// When a module stops cycling
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExitCondition {
    NoGoals,
    NoAction,
    #[default]
    Always,
    Never,
}

/// How a module sets up its attention set on entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FocusMethod {
    #[default]
    None,
    /// Start from an empty goal base
    New,
    /// Keep only the goal that triggered the call
    Filter,
    /// Focus on the goal selected by the rule condition
    Select,
}

/// Which executor drives the module's rules
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    #[default]
    Linear,
    Adaptive,
    Planning,
}

/* ===================== Modules ===================== */

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<Term>,
    #[serde(default)]
    pub rules: Vec<Rule>,
    /// Inherited from the caller when absent
    #[serde(default)]
    pub order: Option<RuleOrder>,
    #[serde(default)]
    pub exit: ExitCondition,
    #[serde(default)]
    pub focus: FocusMethod,
    #[serde(default)]
    pub anonymous: bool,
    /// Inserted when the module is entered
    #[serde(default)]
    pub beliefs: Vec<Term>,
    /// Adopted when the module is entered
    #[serde(default)]
    pub goals: Vec<Term>,
    #[serde(default)]
    pub strategy: Strategy,
    #[serde(default)]
    pub source: Option<SourceInfo>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            rules: Vec::new(),
            order: None,
            exit: ExitCondition::default(),
            focus: FocusMethod::default(),
            anonymous: false,
            beliefs: Vec::new(),
            goals: Vec::new(),
            strategy: Strategy::default(),
            source: None,
        }
    }

    /// Inline rule block used as the target of an anonymous call
    pub fn anonymous(name: impl Into<String>, rules: Vec<Rule>) -> Self {
        Self {
            anonymous: true,
            rules,
            ..Self::new(name)
        }
    }

    pub fn parameters(mut self, parameters: Vec<Term>) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn order(mut self, order: RuleOrder) -> Self {
        self.order = Some(order);
        self
    }

    pub fn exit(mut self, exit: ExitCondition) -> Self {
        self.exit = exit;
        self
    }

    pub fn focus(mut self, focus: FocusMethod) -> Self {
        self.focus = focus;
        self
    }

    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn belief(mut self, belief: Term) -> Self {
        self.beliefs.push(belief);
        self
    }

    pub fn goal(mut self, goal: Term) -> Self {
        self.goals.push(goal);
        self
    }

    /// Variables of the formal parameter list
    pub fn parameter_vars(&self) -> Vec<String> {
        let mut vars = Vec::new();
        for param in &self.parameters {
            param.collect_vars(&mut vars);
        }
        vars
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.parameters.is_empty() {
            write!(f, "/{}", self.parameters.len())?;
        }
        Ok(())
    }
}
