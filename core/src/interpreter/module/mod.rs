//! Module executors
//!
//! A module frame prepares the mental state on entry, then repeatedly picks
//! work, reacts to the result of that work, and decides whether to exit. What
//! "work" means depends on the module's strategy:
//!
//! - [`linear`]: rules in (possibly shuffled) declaration order
//! - [`adaptive`]: a learner chooses among every enabled action combo
//! - [`planning`]: steps of a plan obtained from a planner
//!
//! The exit condition is only evaluated when a pass over the work runs out.
//! A stop status from a child, or agent termination, ends the module at the
//! next resumption regardless of the exit condition.

pub mod adaptive;
pub mod linear;
pub mod planning;

use std::sync::Arc;
use tracing::debug;

use self::adaptive::AdaptiveState;
use self::linear::LinearState;
use self::planning::PlanningState;
use super::combo::ActionComboExecutor;
use super::context::RunContext;
use super::error::ActionFailed;
use super::frame::{Frame, FrameKind, Transition};
use super::result::{RunResult, RunStatus};
use super::rule::RuleExecutor;
use crate::events::Channel;
use crate::program::{ActionCombo, ExitCondition, FocusMethod, Module, RuleOrder, Strategy, Substitution, Term};

#[derive(Debug)]
pub struct ModuleExecutor {
    core: ModuleCore,
    strategy: StrategyState,
}

#[derive(Debug)]
enum StrategyState {
    Linear(LinearState),
    Adaptive(AdaptiveState),
    Planning(PlanningState),
}

impl ModuleExecutor {
    /// Executor for a called module
    ///
    /// `parent_order` is the evaluation order of the calling module; it is
    /// used when the module declares none.
    pub fn new(
        module: Arc<Module>,
        substitution: Substitution,
        parent_order: Option<RuleOrder>,
        focus: Option<Term>,
    ) -> Self {
        let strategy = match module.strategy {
            Strategy::Linear => StrategyState::Linear(LinearState::default()),
            Strategy::Adaptive => StrategyState::Adaptive(AdaptiveState::default()),
            Strategy::Planning => StrategyState::Planning(PlanningState::default()),
        };
        Self {
            core: ModuleCore {
                module,
                substitution,
                parent_order,
                order: parent_order.unwrap_or_default(),
                focus,
                is_main: false,
                prepared: false,
                result: RunResult::START,
                pass_performed: false,
            },
            strategy,
        }
    }

    /// Executor for the agent's main module, which runs the event module
    /// between its cycles
    pub fn main(module: Arc<Module>) -> Self {
        let mut executor = Self::new(module, Substitution::new(), None, None);
        executor.core.is_main = true;
        executor
    }

    pub fn module(&self) -> &Module {
        &self.core.module
    }

    /// Effective rule evaluation order, known once the module was entered
    pub fn order(&self) -> RuleOrder {
        self.core.order
    }

    pub fn result(&self) -> RunResult {
        self.core.result
    }

    pub fn resume(
        &mut self,
        previous: Option<RunResult>,
        ctx: &mut RunContext,
    ) -> Result<Transition, ActionFailed> {
        if !self.core.prepared {
            self.core.prepare(ctx)?;
        }
        match &mut self.strategy {
            StrategyState::Linear(state) => state.resume(&mut self.core, previous, ctx),
            StrategyState::Adaptive(state) => state.resume(&mut self.core, previous, ctx),
            StrategyState::Planning(state) => state.resume(&mut self.core, previous, ctx),
        }
    }
}

/* ===================== Shared lifecycle ===================== */

/// State every strategy shares
#[derive(Debug)]
pub(crate) struct ModuleCore {
    module: Arc<Module>,
    substitution: Substitution,
    parent_order: Option<RuleOrder>,
    order: RuleOrder,
    focus: Option<Term>,
    is_main: bool,
    prepared: bool,
    result: RunResult,
    /// An action was performed during the current pass
    pass_performed: bool,
}

impl ModuleCore {
    fn prepare(&mut self, ctx: &mut RunContext) -> Result<(), ActionFailed> {
        let module = Arc::clone(&self.module);
        self.order = module
            .order
            .or(self.parent_order)
            .unwrap_or(ctx.config.default_rule_order);

        if module.focus != FocusMethod::None {
            ctx.mental_state
                .enter_focus(&module.name, module.focus, self.focus.as_ref())
                .map_err(|e| ActionFailed::new(&*module, e))?;
        }
        for belief in &module.beliefs {
            ctx.mental_state
                .insert(&belief.apply(&self.substitution))
                .map_err(|e| ActionFailed::new(&*module, e))?;
        }
        for goal in &module.goals {
            ctx.mental_state
                .adopt(&goal.apply(&self.substitution))
                .map_err(|e| ActionFailed::new(&*module, e))?;
        }

        ctx.enter_module(&module.name);
        self.prepared = true;
        debug!(module = %module, order = %self.order, substitution = %self.substitution, "entered module");
        ctx.emit(
            Channel::ModuleEntry,
            &*module,
            module.source.as_ref(),
            "entered %s with %s",
            &[module.to_string(), self.substitution.to_string()],
        );
        Ok(())
    }

    pub(crate) fn module(&self) -> &Arc<Module> {
        &self.module
    }

    pub(crate) fn substitution(&self) -> &Substitution {
        &self.substitution
    }

    pub(crate) fn order(&self) -> RuleOrder {
        self.order
    }

    /// Merge the result of a rule or combo this module ran
    pub(crate) fn absorb(&mut self, child: RunResult) {
        self.result = self.result.merge(child);
        if child.performed_action {
            self.pass_performed = true;
        }
    }

    /// Merge the result of an event module pass; its status stays with it
    pub(crate) fn absorb_event_pass(&mut self, child: RunResult) {
        self.result = self.result.merge(RunResult::from_call(child, false));
    }

    /// A child asked to stop, or the agent is being terminated
    pub(crate) fn must_stop(&self, ctx: &RunContext) -> bool {
        !self.result.is_running() || ctx.is_terminated()
    }

    /// Exit condition at the end of a pass
    pub(crate) fn exit_condition_holds(&self, ctx: &RunContext) -> bool {
        match self.module.exit {
            ExitCondition::NoGoals => !ctx.mental_state.has_goals(),
            ExitCondition::NoAction => !self.pass_performed,
            ExitCondition::Always => true,
            ExitCondition::Never => false,
        }
    }

    /// Start a new pass
    pub(crate) fn next_pass(&mut self, ctx: &mut RunContext) {
        self.pass_performed = false;
        if self.is_main {
            ctx.emit(
                Channel::ReasoningCycleSeparator,
                &*self.module,
                None,
                "new cycle of %s",
                &[self.module.name.clone()],
            );
        }
    }

    /// Frames running the event module, when this is the main module and the
    /// agent has one
    pub(crate) fn event_pass(&self, ctx: &RunContext) -> Option<Vec<Frame>> {
        if !self.is_main {
            return None;
        }
        let event = ctx.program.event_module()?;
        let mut frames = Frame::holes_between(FrameKind::Module, FrameKind::Module);
        frames.push(Frame::Module(ModuleExecutor::new(
            event,
            Substitution::new(),
            Some(self.order),
            None,
        )));
        Some(frames)
    }

    pub(crate) fn rule_frame(&self, index: usize) -> Frame {
        Frame::Rule(RuleExecutor::new(
            Arc::clone(&self.module),
            index,
            self.substitution.clone(),
            self.order,
        ))
    }

    /// Frames running a combo directly under this module
    pub(crate) fn combo_frames(
        &self,
        combo: ActionCombo,
        substitution: Substitution,
        focus: Option<Term>,
    ) -> Vec<Frame> {
        let mut frames = Frame::holes_between(FrameKind::Module, FrameKind::ActionCombo);
        frames.push(Frame::ActionCombo(ActionComboExecutor::new(
            combo,
            substitution,
            focus,
            self.order,
        )));
        frames
    }

    /// Leave the module: drop its focus, and report at least a soft stop
    /// unless it is anonymous
    pub(crate) fn finish(&mut self, ctx: &mut RunContext) -> Result<Transition, ActionFailed> {
        let module = Arc::clone(&self.module);
        if ctx.is_terminated() {
            self.result = self.result.merge(RunResult::stopped(RunStatus::HardStop));
        }
        if module.focus != FocusMethod::None {
            ctx.mental_state
                .exit_focus(&module.name)
                .map_err(|e| ActionFailed::new(&*module, e))?;
        }
        ctx.exit_module(&module.name);
        if !module.anonymous {
            self.result = self.result.merge(RunResult::stopped(RunStatus::SoftStop));
        }

        debug!(module = %module, result = %self.result, "exited module");
        ctx.emit(
            Channel::ModuleExit,
            &*module,
            module.source.as_ref(),
            "exited %s",
            &[module.to_string()],
        );
        Ok(Transition::Done(self.result))
    }
}
