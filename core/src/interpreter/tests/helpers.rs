//! Test helpers for interpreter tests
//!
//! In-memory collaborators for driving modules and whole agents:
//! - `MemoryMentalState`: belief, goal and percept lists queried by unification
//! - `RecordingEnvironment`: logs every performed action, can reject or terminate
//! - `RecordingEvents`: keeps every rendered event per channel
//! - `ScriptedLearner` / `ScriptedPlanner`: replay fixed choices and plans

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::environment::{Environment, EnvironmentError};
use crate::events::{render, Channel, EventGenerator};
use crate::interpreter::{
    ActionFailed, Agent, CallStack, Frame, ModuleExecutor, RunContext, RunContextBuilder, RunResult,
};
use crate::learner::{Candidate, Learner};
use crate::mental_state::{FocusedAnswers, MentalState, MentalStateError, MscResult, Update};
use crate::planner::{Plan, Planner, PlannerError};
use crate::program::{
    mgu, AgentProgram, FocusMethod, LiteralKind, MentalLiteral, MentalStateCondition, Module,
    ProgramBuilder, Substitution, Term, UserSpecAction,
};

pub type Log = Arc<Mutex<Vec<String>>>;

/* ===================== Terms ===================== */

pub fn atom(name: &str) -> Term {
    Term::atom(name)
}

pub fn var(name: &str) -> Term {
    Term::var(name)
}

pub fn cmp(functor: &str, args: Vec<Term>) -> Term {
    Term::compound(functor, args)
}

pub fn bel(formula: Term) -> MentalStateCondition {
    MentalStateCondition::bel(formula)
}

pub fn not_bel(formula: Term) -> MentalStateCondition {
    MentalStateCondition::new(vec![MentalLiteral::new(LiteralKind::Bel, formula).negated()])
}

pub fn a_goal(formula: Term) -> MentalStateCondition {
    MentalStateCondition::new(vec![MentalLiteral::new(LiteralKind::AGoal, formula)])
}

/* ===================== Mental state ===================== */

#[derive(Debug, Clone, Default)]
pub struct MemoryMentalState {
    beliefs: Vec<Term>,
    goals: Vec<Term>,
    percepts: Vec<Term>,
    /// Modules that currently have an attention set, innermost last
    pub focus: Vec<String>,
    /// Every `enter_focus` call with the goal it was given
    pub focus_log: Arc<Mutex<Vec<(String, FocusMethod, Option<Term>)>>>,
    /// Group answers of goal literals by goal and ask for focus
    pub focus_on_goals: bool,
    /// Every query fails with this reason
    pub broken: Option<String>,
    /// Fixed answers for conditions, keyed by their text before substitution
    pub canned: Vec<(String, Vec<Substitution>)>,
}

impl MemoryMentalState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_beliefs(mut self, beliefs: Vec<Term>) -> Self {
        self.beliefs.extend(beliefs);
        self
    }

    pub fn with_goals(mut self, goals: Vec<Term>) -> Self {
        self.goals.extend(goals);
        self
    }

    pub fn with_percepts(mut self, percepts: Vec<Term>) -> Self {
        self.percepts.extend(percepts);
        self
    }

    /// Answer `condition` with `answers` whatever the bases hold
    pub fn answering(mut self, condition: &MentalStateCondition, answers: Vec<Substitution>) -> Self {
        self.canned.push((condition.to_string(), answers));
        self
    }

    fn base(&self, kind: LiteralKind) -> Vec<Term> {
        match kind {
            LiteralKind::Bel => self.beliefs.clone(),
            LiteralKind::Percept => self.percepts.clone(),
            LiteralKind::Goal => self.goals.clone(),
            LiteralKind::AGoal => self
                .goals
                .iter()
                .filter(|g| !self.beliefs.contains(g))
                .cloned()
                .collect(),
            LiteralKind::GoalA => self
                .goals
                .iter()
                .filter(|g| self.beliefs.contains(g))
                .cloned()
                .collect(),
        }
    }

    /// Extensions of `answer` satisfying `literal`, with the fact matched
    fn matches(&self, literal: &MentalLiteral, answer: &Substitution) -> Vec<(Substitution, Term)> {
        let formula = literal.formula.apply(answer);
        self.base(literal.kind)
            .into_iter()
            .filter_map(|fact| {
                let unifier = mgu(&formula, &fact)?;
                Some((answer.combine(&unifier)?, fact))
            })
            .collect()
    }

    /// Goals reached by believing them are dropped
    fn drop_achieved(&mut self) {
        let beliefs = &self.beliefs;
        self.goals.retain(|g| !beliefs.contains(g));
    }
}

impl MentalState for MemoryMentalState {
    fn evaluate(
        &mut self,
        condition: &MentalStateCondition,
        subst: &Substitution,
    ) -> Result<MscResult, MentalStateError> {
        if let Some(reason) = &self.broken {
            return Err(MentalStateError::Query {
                query: condition.apply(subst).to_string(),
                reason: reason.clone(),
            });
        }

        let text = condition.to_string();
        if let Some((_, answers)) = self.canned.iter().find(|(c, _)| *c == text) {
            return Ok(MscResult::holds_with(answers.clone()));
        }

        let condition = condition.apply(subst);
        // (answer, focused goal)
        let mut answers: Vec<(Substitution, Option<Term>)> = vec![(Substitution::new(), None)];
        for literal in condition.literals() {
            let mut next = Vec::new();
            for (answer, goal) in answers {
                let found = self.matches(literal, &answer);
                if !literal.positive {
                    if found.is_empty() {
                        next.push((answer, goal));
                    }
                    continue;
                }
                for (extended, fact) in found {
                    let goal = match &goal {
                        None if literal.is_goal_literal() => Some(fact),
                        _ => goal.clone(),
                    };
                    next.push((extended, goal));
                }
            }
            answers = next;
        }

        if answers.is_empty() {
            return Ok(MscResult::failed());
        }
        if !self.focus_on_goals {
            return Ok(MscResult::holds_with(answers.into_iter().map(|(a, _)| a).collect()));
        }

        let mut grouped: Vec<FocusedAnswers> = Vec::new();
        for (answer, goal) in answers {
            match grouped.iter_mut().find(|g| g.goal == goal) {
                Some(group) => group.substitutions.push(answer),
                None => grouped.push(FocusedAnswers {
                    goal,
                    substitutions: vec![answer],
                }),
            }
        }
        Ok(MscResult {
            holds: true,
            focus: true,
            answers: grouped,
        })
    }

    fn insert(&mut self, belief: &Term) -> Result<Update, MentalStateError> {
        let mut update = Update::default();
        if !self.beliefs.contains(belief) {
            self.beliefs.push(belief.clone());
            update.added.push(belief.clone());
        }
        self.drop_achieved();
        Ok(update)
    }

    fn delete(&mut self, belief: &Term) -> Result<Update, MentalStateError> {
        let before = self.beliefs.len();
        self.beliefs.retain(|b| b != belief);
        let mut update = Update::default();
        if self.beliefs.len() < before {
            update.removed.push(belief.clone());
        }
        Ok(update)
    }

    fn adopt(&mut self, goal: &Term) -> Result<Update, MentalStateError> {
        let mut update = Update::default();
        if !self.goals.contains(goal) && !self.beliefs.contains(goal) {
            self.goals.push(goal.clone());
            update.added.push(goal.clone());
        }
        Ok(update)
    }

    fn drop_goal(&mut self, goal: &Term) -> Result<Update, MentalStateError> {
        let mut update = Update::default();
        self.goals.retain(|g| {
            let keep = mgu(g, goal).is_none();
            if !keep {
                update.removed.push(g.clone());
            }
            keep
        });
        Ok(update)
    }

    fn has_goals(&self) -> bool {
        !self.goals.is_empty()
    }

    fn enter_focus(
        &mut self,
        module: &str,
        method: FocusMethod,
        goal: Option<&Term>,
    ) -> Result<(), MentalStateError> {
        self.focus_log
            .lock()
            .unwrap()
            .push((module.to_string(), method, goal.cloned()));
        self.focus.push(module.to_string());
        Ok(())
    }

    fn exit_focus(&mut self, module: &str) -> Result<(), MentalStateError> {
        match self.focus.pop() {
            Some(top) if top == module => Ok(()),
            _ => Err(MentalStateError::NoFocus(module.to_string())),
        }
    }

    fn beliefs(&self) -> Vec<Term> {
        self.beliefs.clone()
    }

    fn goals(&self) -> Vec<Term> {
        self.goals.clone()
    }
}

/* ===================== Environment ===================== */

#[derive(Debug, Default)]
pub struct RecordingEnvironment {
    pub log: Log,
    /// Actions with this name are rejected
    pub reject: Option<String>,
    /// Raise the flag once this many actions were performed
    pub terminate_after: Option<(usize, Arc<AtomicBool>)>,
    pub rewards: VecDeque<f64>,
}

impl RecordingEnvironment {
    pub fn new(log: Log) -> Self {
        Self {
            log,
            ..Self::default()
        }
    }
}

impl Environment for RecordingEnvironment {
    fn perform(&mut self, action: &UserSpecAction) -> Result<(), EnvironmentError> {
        if self.reject.as_deref() == Some(action.name.as_str()) {
            return Err(EnvironmentError::Rejected {
                action: action.to_string(),
                reason: "not allowed".to_string(),
            });
        }
        let mut log = self.log.lock().unwrap();
        log.push(action.to_string());
        if let Some((limit, flag)) = &self.terminate_after {
            if log.len() >= *limit {
                flag.store(true, Ordering::SeqCst);
            }
        }
        Ok(())
    }

    fn reward(&mut self) -> Option<f64> {
        self.rewards.pop_front()
    }
}

/* ===================== Events ===================== */

#[derive(Debug, Default, Clone)]
pub struct RecordingEvents {
    pub log: Arc<Mutex<Vec<(Channel, String)>>>,
}

impl RecordingEvents {
    /// Rendered messages of one channel, in order
    pub fn on(&self, channel: Channel) -> Vec<String> {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, _)| *c == channel)
            .map(|(_, m)| m.clone())
            .collect()
    }
}

impl EventGenerator for RecordingEvents {
    fn event(
        &mut self,
        channel: Channel,
        _subject: &str,
        _source: Option<&crate::program::SourceInfo>,
        template: &str,
        args: &[String],
    ) {
        self.log.lock().unwrap().push((channel, render(template, args)));
    }
}

/* ===================== Learner and planner ===================== */

#[derive(Debug, Default, Clone)]
pub struct ScriptedLearner {
    pub choices: Arc<Mutex<VecDeque<usize>>>,
    /// Candidate lists offered, rendered
    pub offered: Arc<Mutex<Vec<Vec<String>>>>,
    pub rewards: Arc<Mutex<Vec<f64>>>,
}

impl Learner for ScriptedLearner {
    fn act(&mut self, _module: &str, _mental_state: &dyn MentalState, candidates: &[Candidate]) -> usize {
        self.offered
            .lock()
            .unwrap()
            .push(candidates.iter().map(|c| c.instantiated().to_string()).collect());
        self.choices.lock().unwrap().pop_front().unwrap_or(0)
    }

    fn update(&mut self, _module: &str, _mental_state: &dyn MentalState, reward: f64) {
        self.rewards.lock().unwrap().push(reward);
    }
}

#[derive(Debug, Default)]
pub struct ScriptedPlanner {
    /// Answers to successive requests; `None` once exhausted
    pub plans: VecDeque<Option<Plan>>,
    pub requests: Arc<Mutex<usize>>,
    pub fail: bool,
}

impl Planner for ScriptedPlanner {
    fn create_new_plan(
        &mut self,
        module: &Module,
        _mental_state: &dyn MentalState,
        _subst: &Substitution,
    ) -> Result<Option<Plan>, PlannerError> {
        *self.requests.lock().unwrap() += 1;
        if self.fail {
            return Err(PlannerError::Failed {
                module: module.name.clone(),
                reason: "no domain".to_string(),
            });
        }
        Ok(self.plans.pop_front().flatten())
    }
}

/* ===================== Running ===================== */

/// Context for a program with a recording environment and event generator
pub fn context(
    program: AgentProgram,
    mental_state: MemoryMentalState,
) -> (RunContextBuilder, Log, RecordingEvents) {
    let log = Log::default();
    let events = RecordingEvents::default();
    let builder = RunContext::builder(Arc::new(program), Box::new(mental_state))
        .environment(RecordingEnvironment::new(log.clone()))
        .events(events.clone());
    (builder, log, events)
}

/// Program consisting of a single main module
pub fn single(module: Module) -> AgentProgram {
    ProgramBuilder::new().main(module).build().expect("valid program")
}

/// Run one module as the bottom frame of a fresh call stack
pub fn run_module(ctx: &mut RunContext, module: &str) -> Result<RunResult, ActionFailed> {
    let module = ctx.program().module(module).expect("module exists");
    let mut stack = CallStack::new();
    stack.push(Frame::Module(ModuleExecutor::new(module, Substitution::new(), None, None)));
    stack.run_until_done(ctx)
}

/// Run a whole agent and return its result with the performed actions
pub fn run_agent(
    program: AgentProgram,
    mental_state: MemoryMentalState,
) -> (Result<RunResult, ActionFailed>, Vec<String>, Agent) {
    let (builder, log, _) = context(program, mental_state);
    let mut agent = Agent::new(builder.build());
    let result = agent.run();
    let actions = log.lock().unwrap().clone();
    (result, actions, agent)
}

pub fn logged(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}
