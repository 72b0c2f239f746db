//! Per-agent run context
//!
//! Everything an agent's frames need besides the frames themselves. One
//! context belongs to exactly one agent; nothing in it is shared with other
//! agents except the termination flag handed out to the surrounding runtime.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::Config;
use crate::environment::{Environment, NoEnvironment};
use crate::events::{Channel, EventGenerator, NoopEvents};
use crate::learner::{Learner, RandomLearner};
use crate::mental_state::MentalState;
use crate::planner::{NoPlanner, Planner};
use crate::program::{AgentProgram, SourceInfo};

pub struct RunContext {
    pub(crate) program: Arc<AgentProgram>,
    pub(crate) mental_state: Box<dyn MentalState>,
    pub(crate) environment: Box<dyn Environment>,
    pub(crate) learner: Box<dyn Learner>,
    pub(crate) planner: Box<dyn Planner>,
    pub(crate) events: Box<dyn EventGenerator>,
    pub(crate) config: Config,
    rng: StdRng,
    terminated: Arc<AtomicBool>,
    entered: Vec<String>,
}

impl RunContext {
    pub fn builder(program: Arc<AgentProgram>, mental_state: Box<dyn MentalState>) -> RunContextBuilder {
        RunContextBuilder::new(program, mental_state)
    }

    pub fn program(&self) -> &AgentProgram {
        &self.program
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn mental_state(&self) -> &dyn MentalState {
        self.mental_state.as_ref()
    }

    pub fn mental_state_mut(&mut self) -> &mut dyn MentalState {
        self.mental_state.as_mut()
    }

    /// Polled at every module termination check
    pub fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::SeqCst)
    }

    pub fn terminate(&self) {
        self.terminated.store(true, Ordering::SeqCst);
    }

    /// Flag the surrounding runtime can raise from any thread
    pub fn terminate_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.terminated)
    }

    /// Names of the modules currently entered, outermost first
    pub fn entered_modules(&self) -> &[String] {
        &self.entered
    }

    pub(crate) fn enter_module(&mut self, name: &str) {
        self.entered.push(name.to_string());
    }

    pub(crate) fn exit_module(&mut self, name: &str) {
        if let Some(pos) = self.entered.iter().rposition(|m| m == name) {
            self.entered.remove(pos);
        }
    }

    pub(crate) fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }

    pub(crate) fn emit(
        &mut self,
        channel: Channel,
        subject: &dyn std::fmt::Display,
        source: Option<&SourceInfo>,
        template: &str,
        args: &[String],
    ) {
        self.events
            .event(channel, &subject.to_string(), source, template, args);
    }
}

/// Builder for [`RunContext`]; every collaborator but the mental state has a default
pub struct RunContextBuilder {
    program: Arc<AgentProgram>,
    mental_state: Box<dyn MentalState>,
    environment: Option<Box<dyn Environment>>,
    learner: Option<Box<dyn Learner>>,
    planner: Option<Box<dyn Planner>>,
    events: Option<Box<dyn EventGenerator>>,
    config: Config,
    terminated: Option<Arc<AtomicBool>>,
}

impl RunContextBuilder {
    pub fn new(program: Arc<AgentProgram>, mental_state: Box<dyn MentalState>) -> Self {
        Self {
            program,
            mental_state,
            environment: None,
            learner: None,
            planner: None,
            events: None,
            config: Config::default(),
            terminated: None,
        }
    }

    pub fn environment(mut self, environment: impl Environment + 'static) -> Self {
        self.environment = Some(Box::new(environment));
        self
    }

    pub fn learner(mut self, learner: impl Learner + 'static) -> Self {
        self.learner = Some(Box::new(learner));
        self
    }

    pub fn planner(mut self, planner: impl Planner + 'static) -> Self {
        self.planner = Some(Box::new(planner));
        self
    }

    pub fn events(mut self, events: impl EventGenerator + 'static) -> Self {
        self.events = Some(Box::new(events));
        self
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Share an existing termination flag, e.g. one per platform
    pub fn terminated(mut self, flag: Arc<AtomicBool>) -> Self {
        self.terminated = Some(flag);
        self
    }

    pub fn build(self) -> RunContext {
        let seed = self.config.rng_seed;
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        RunContext {
            program: self.program,
            mental_state: self.mental_state,
            environment: self.environment.unwrap_or_else(|| Box::new(NoEnvironment)),
            learner: self
                .learner
                .unwrap_or_else(|| Box::new(RandomLearner::new(seed))),
            planner: self.planner.unwrap_or_else(|| Box::new(NoPlanner)),
            events: self.events.unwrap_or_else(|| Box::new(NoopEvents)),
            config: self.config,
            rng,
            terminated: self.terminated.unwrap_or_default(),
            entered: Vec::new(),
        }
    }
}
