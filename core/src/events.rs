//! Execution telemetry
//!
//! Executors report what they do on named channels. Events are fire and
//! forget: nothing an [`EventGenerator`] does can change control flow or a
//! frame's result, and [`NoopEvents`] must behave exactly like any other
//! generator as far as the agent is concerned.

use std::fmt;
use tracing::debug;

use crate::program::SourceInfo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    ModuleEntry,
    ModuleExit,
    ReasoningCycleSeparator,
    RuleConditionEvaluation,
    RuleFired,
    ActionPrecondEvaluation,
    ActionExecutedUserSpec,
    ActionExecutedBuiltin,
    CallModule,
    Plan,
    Learner,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Channel::ModuleEntry => "module-entry",
            Channel::ModuleExit => "module-exit",
            Channel::ReasoningCycleSeparator => "cycle",
            Channel::RuleConditionEvaluation => "rule-condition",
            Channel::RuleFired => "rule-fired",
            Channel::ActionPrecondEvaluation => "action-precondition",
            Channel::ActionExecutedUserSpec => "action-userspec",
            Channel::ActionExecutedBuiltin => "action-builtin",
            Channel::CallModule => "call-module",
            Channel::Plan => "plan",
            Channel::Learner => "learner",
        };
        write!(f, "{}", name)
    }
}

pub trait EventGenerator: Send {
    /// Report an event; `template` uses `%s` placeholders filled from `args`
    fn event(
        &mut self,
        channel: Channel,
        subject: &str,
        source: Option<&SourceInfo>,
        template: &str,
        args: &[String],
    );
}

/// Substitute `%s` placeholders in order; surplus placeholders stay as is
pub fn render(template: &str, args: &[String]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut args = args.iter();
    let mut rest = template;
    while let Some(pos) = rest.find("%s") {
        out.push_str(&rest[..pos]);
        match args.next() {
            Some(arg) => out.push_str(arg),
            None => out.push_str("%s"),
        }
        rest = &rest[pos + 2..];
    }
    out.push_str(rest);
    out
}

#[derive(Debug, Default)]
pub struct NoopEvents;

impl EventGenerator for NoopEvents {
    fn event(&mut self, _: Channel, _: &str, _: Option<&SourceInfo>, _: &str, _: &[String]) {}
}

/// Forwards every event to `tracing` at debug level
#[derive(Debug, Default)]
pub struct TracingEvents;

impl EventGenerator for TracingEvents {
    fn event(
        &mut self,
        channel: Channel,
        subject: &str,
        source: Option<&SourceInfo>,
        template: &str,
        args: &[String],
    ) {
        let message = render(template, args);
        match source {
            Some(source) => debug!(%channel, subject, %source, "{}", message),
            None => debug!(%channel, subject, "{}", message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_fills_placeholders_in_order() {
        let args = vec!["r1".to_string(), "[X/a]".to_string()];
        assert_eq!(render("rule %s fired with %s", &args), "rule r1 fired with [X/a]");
        assert_eq!(render("%s and %s", &args[..1]), "r1 and %s");
        assert_eq!(render("no placeholders", &args), "no placeholders");
    }
}
