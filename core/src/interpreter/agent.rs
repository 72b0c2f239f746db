//! Whole-agent driver
//!
//! Runs the init module to completion, then the main module until it exits,
//! then the shutdown module. Any of the three may be absent. Each phase gets
//! the call stack to itself; a failure in any phase finishes the agent.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};

use super::call_stack::{CallStack, Step};
use super::context::RunContext;
use super::error::ActionFailed;
use super::frame::Frame;
use super::module::ModuleExecutor;
use super::result::RunResult;
use crate::program::Substitution;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Init,
    Main,
    Shutdown,
    Finished,
}

impl Phase {
    fn next(self) -> Phase {
        match self {
            Phase::Init => Phase::Main,
            Phase::Main => Phase::Shutdown,
            Phase::Shutdown | Phase::Finished => Phase::Finished,
        }
    }
}

/// Outcome of [`Agent::step`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AgentStep {
    /// One frame was resumed
    Stepped,
    /// The module of this phase exited
    PhaseDone(Phase, RunResult),
    /// Nothing is left to run
    Finished,
}

pub struct Agent {
    ctx: RunContext,
    stack: CallStack,
    phase: Phase,
    /// Result of the main module, once it exited
    main_result: Option<RunResult>,
}

impl Agent {
    pub fn new(ctx: RunContext) -> Self {
        Self {
            ctx,
            stack: CallStack::new(),
            phase: Phase::Init,
            main_result: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn context(&self) -> &RunContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut RunContext {
        &mut self.ctx
    }

    pub fn call_stack(&self) -> &CallStack {
        &self.stack
    }

    /// Raising this flag stops the agent at its next module termination check
    pub fn terminate_handle(&self) -> Arc<AtomicBool> {
        self.ctx.terminate_handle()
    }

    pub fn into_context(self) -> RunContext {
        self.ctx
    }

    /// Resume one frame, entering the next phase's module when the stack is empty
    pub fn step(&mut self) -> Result<AgentStep, ActionFailed> {
        if self.stack.is_empty() && !self.enter_phase() {
            return Ok(AgentStep::Finished);
        }

        if self.stack.pop(&mut self.ctx) == Step::Continue {
            return Ok(AgentStep::Stepped);
        }

        let phase = self.phase;
        self.phase = phase.next();
        match self.stack.take_result().unwrap_or(Ok(RunResult::START)) {
            Ok(result) => {
                info!(?phase, %result, "agent phase finished");
                if phase == Phase::Main {
                    self.main_result = Some(result);
                }
                Ok(AgentStep::PhaseDone(phase, result))
            }
            Err(err) => {
                warn!(?phase, error = %err, "agent stopped by failure");
                self.phase = Phase::Finished;
                self.stack.clear();
                Err(err)
            }
        }
    }

    /// Run every remaining phase; returns the main module's result
    pub fn run(&mut self) -> Result<RunResult, ActionFailed> {
        while self.step()? != AgentStep::Finished {}
        Ok(self.main_result.unwrap_or(RunResult::START))
    }

    /// Push the module of the first phase that has one
    fn enter_phase(&mut self) -> bool {
        while self.phase != Phase::Finished {
            let program = &self.ctx.program;
            let executor = match self.phase {
                Phase::Init => program
                    .init_module()
                    .map(|m| ModuleExecutor::new(m, Substitution::new(), None, None)),
                Phase::Main => program.main_module().map(ModuleExecutor::main),
                Phase::Shutdown => program
                    .shutdown_module()
                    .map(|m| ModuleExecutor::new(m, Substitution::new(), None, None)),
                Phase::Finished => None,
            };
            match executor {
                Some(executor) => {
                    info!(phase = ?self.phase, module = %executor.module(), "agent phase started");
                    self.stack.push(Frame::Module(executor));
                    return true;
                }
                None => self.phase = self.phase.next(),
            }
        }
        false
    }
}
