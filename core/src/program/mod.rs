//! Agent program representation
//!
//! Read-only view of a parsed agent program: modules made of rules made of
//! action combos. The grammar and validator live elsewhere and hand programs
//! over as JSON; everything here is `serde` deserializable so a program can be
//! loaded straight from that output.
//!
//! AST nodes are long-lived and shared between executors through `Arc`.

pub mod action;
pub mod condition;
pub mod module;
pub mod rule;
pub mod term;

pub use action::{
    Action, ActionCombo, BeliefEffect, MentalAction, ModuleCallAction, ModuleTarget,
    UserSpecAction,
};
pub use condition::{LiteralKind, MentalLiteral, MentalStateCondition};
pub use module::{ExitCondition, FocusMethod, Module, RuleOrder, Strategy};
pub use rule::{Rule, RuleKind};
pub use term::{mgu, Substitution, Term};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Location of a construct in the agent's source files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceInfo {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for SourceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

#[derive(Debug, Error)]
pub enum ProgramError {
    #[error("module {0} is defined more than once")]
    DuplicateModule(String),

    #[error("{role} module {name} is not defined")]
    UnknownRoleModule { role: &'static str, name: String },

    #[error("rule {rule} of module {module} has no actions")]
    EmptyCombo { module: String, rule: usize },

    #[error("invalid program: {0}")]
    Json(#[from] serde_json::Error),
}

/// Every rule of `module`, and of the anonymous modules it calls, has an action
fn check_combos(module: &Module) -> Result<(), ProgramError> {
    for (index, rule) in module.rules.iter().enumerate() {
        if rule.action.is_empty() {
            return Err(ProgramError::EmptyCombo {
                module: module.name.clone(),
                rule: index,
            });
        }
        for action in rule.action.actions() {
            if let Action::ModuleCall(ModuleCallAction {
                target: ModuleTarget::Anonymous(inner),
                ..
            }) = action
            {
                check_combos(inner)?;
            }
        }
    }
    Ok(())
}

/// Serialized form of a program
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgramDef {
    pub modules: Vec<Module>,
    #[serde(default)]
    pub init: Option<String>,
    #[serde(default)]
    pub main: Option<String>,
    #[serde(default)]
    pub event: Option<String>,
    #[serde(default)]
    pub shutdown: Option<String>,
}

/// Registry of an agent's modules, keyed by name
#[derive(Debug, Clone, Default)]
pub struct AgentProgram {
    modules: HashMap<String, Arc<Module>>,
    init: Option<Arc<Module>>,
    main: Option<Arc<Module>>,
    event: Option<Arc<Module>>,
    shutdown: Option<Arc<Module>>,
}

impl AgentProgram {
    pub fn from_def(def: ProgramDef) -> Result<Self, ProgramError> {
        let mut modules = HashMap::new();
        for module in def.modules {
            check_combos(&module)?;
            let name = module.name.clone();
            if modules.insert(name.clone(), Arc::new(module)).is_some() {
                return Err(ProgramError::DuplicateModule(name));
            }
        }

        let role = |role: &'static str, name: Option<String>| match name {
            None => Ok(None),
            Some(name) => modules
                .get(&name)
                .cloned()
                .map(Some)
                .ok_or(ProgramError::UnknownRoleModule { role, name }),
        };

        Ok(Self {
            init: role("init", def.init)?,
            main: role("main", def.main)?,
            event: role("event", def.event)?,
            shutdown: role("shutdown", def.shutdown)?,
            modules,
        })
    }

    pub fn from_json(json: &str) -> Result<Self, ProgramError> {
        let def: ProgramDef = serde_json::from_str(json)?;
        Self::from_def(def)
    }

    pub fn module(&self, name: &str) -> Option<Arc<Module>> {
        self.modules.get(name).cloned()
    }

    pub fn init_module(&self) -> Option<Arc<Module>> {
        self.init.clone()
    }

    pub fn main_module(&self) -> Option<Arc<Module>> {
        self.main.clone()
    }

    pub fn event_module(&self) -> Option<Arc<Module>> {
        self.event.clone()
    }

    pub fn shutdown_module(&self) -> Option<Arc<Module>> {
        self.shutdown.clone()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// Builder for programs assembled in code rather than loaded from JSON
#[derive(Debug, Default)]
pub struct ProgramBuilder {
    def: ProgramDef,
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn module(mut self, module: Module) -> Self {
        self.def.modules.push(module);
        self
    }

    pub fn init(mut self, module: Module) -> Self {
        self.def.init = Some(module.name.clone());
        self.module(module)
    }

    pub fn main(mut self, module: Module) -> Self {
        self.def.main = Some(module.name.clone());
        self.module(module)
    }

    pub fn event(mut self, module: Module) -> Self {
        self.def.event = Some(module.name.clone());
        self.module(module)
    }

    pub fn shutdown(mut self, module: Module) -> Self {
        self.def.shutdown = Some(module.name.clone());
        self.module(module)
    }

    pub fn build(self) -> Result<AgentProgram, ProgramError> {
        AgentProgram::from_def(self.def)
    }
}
