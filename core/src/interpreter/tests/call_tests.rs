//! Tests for module calls: parameter passing and status propagation

use super::helpers::*;
use crate::events::Channel;
use crate::interpreter::{FailureCause, RunStatus};
use crate::program::{
    Action, ActionCombo, ExitCondition, FocusMethod, LiteralKind, MentalLiteral, MentalStateCondition, Module,
    ProgramBuilder, Rule, RuleOrder,
};

fn blocks() -> MemoryMentalState {
    MemoryMentalState::new().with_beliefs(vec![cmp("block", vec![atom("a")])])
}

fn mover(action: Action) -> Module {
    Module::new("move")
        .parameters(vec![var("Y")])
        .rule(Rule::if_then(MentalStateCondition::always(), action))
}

fn caller(params: Vec<crate::program::Term>) -> Module {
    Module::new("main").rule(Rule::if_then(
        bel(cmp("block", vec![var("X")])),
        Action::call("move", params),
    ))
}

#[test]
fn test_call_binds_formal_parameters() {
    let program = ProgramBuilder::new()
        .main(caller(vec![var("X")]))
        .module(mover(Action::user("put", vec![var("Y")])))
        .build()
        .unwrap();
    let (builder, log, events) = context(program, blocks());
    let mut ctx = builder.build();

    run_module(&mut ctx, "main").unwrap();

    assert_eq!(logged(&log), vec!["put(a)"]);
    assert_eq!(events.on(Channel::CallModule), vec!["calling module move/1 with [Y/a]"]);
}

#[test]
fn test_callee_does_not_see_caller_bindings() {
    let program = ProgramBuilder::new()
        .main(caller(vec![var("X")]))
        .module(mover(Action::user("put", vec![var("Y"), var("X")])))
        .build()
        .unwrap();
    let (builder, log, _) = context(program, blocks());
    let mut ctx = builder.build();

    let err = run_module(&mut ctx, "main").unwrap_err();

    assert!(logged(&log).is_empty());
    match err.cause {
        FailureCause::UnboundVariables { vars, .. } => assert_eq!(vars, vec!["X".to_string()]),
        other => panic!("unexpected cause {:?}", other),
    }
}

#[test]
fn test_call_with_unbound_actual_fails() {
    let main = Module::new("main").rule(Rule::if_then(
        MentalStateCondition::always(),
        Action::call("move", vec![var("Z")]),
    ));
    let program = ProgramBuilder::new()
        .main(main)
        .module(mover(Action::user("put", vec![var("Y")])))
        .build()
        .unwrap();
    let (builder, _, events) = context(program, MemoryMentalState::new());
    let mut ctx = builder.build();

    let err = run_module(&mut ctx, "main").unwrap_err();

    assert_eq!(
        err.cause,
        FailureCause::UnboundVariables {
            context: "call of module move/1".to_string(),
            vars: vec!["Z".to_string()],
        }
    );
    assert!(events.on(Channel::CallModule).is_empty());
}

#[test]
fn test_call_of_unknown_module_fails() {
    let main = Module::new("main").rule(Rule::if_then(
        MentalStateCondition::always(),
        Action::call("nowhere", vec![]),
    ));
    let (builder, _, _) = context(single(main), MemoryMentalState::new());
    let mut ctx = builder.build();

    let err = run_module(&mut ctx, "main").unwrap_err();

    assert_eq!(err.cause, FailureCause::UnknownModule("nowhere".to_string()));
    assert_eq!(err.subject, "nowhere");
}

#[test]
fn test_call_with_wrong_arity_fails() {
    let program = ProgramBuilder::new()
        .main(caller(vec![var("X"), atom("table")]))
        .module(mover(Action::user("put", vec![var("Y")])))
        .build()
        .unwrap();
    let (builder, _, _) = context(program, blocks());
    let mut ctx = builder.build();

    let err = run_module(&mut ctx, "main").unwrap_err();

    assert!(matches!(err.cause, FailureCause::Arity { expected: 1, found: 2, .. }));
}

#[test]
fn test_anonymous_module_sees_caller_bindings() {
    let inner = Module::anonymous(
        "inner",
        vec![Rule::if_then(MentalStateCondition::always(), Action::user("grab", vec![var("X")]))],
    );
    let main = Module::new("main").rule(Rule::if_then(
        bel(cmp("block", vec![var("X")])),
        ActionCombo::new(vec![Action::nested(inner), Action::user("done", vec![])]),
    ));
    let (builder, log, _) = context(single(main), blocks());
    let mut ctx = builder.build();

    let result = run_module(&mut ctx, "main").unwrap();

    assert_eq!(logged(&log), vec!["grab(a)", "done"]);
    assert_eq!(result.status, RunStatus::SoftStop);
}

#[test]
fn test_anonymous_exit_stops_the_caller() {
    let inner = Module::anonymous(
        "inner",
        vec![Rule::if_then(MentalStateCondition::always(), Action::exit_module())],
    );
    let main = Module::new("main")
        .exit(ExitCondition::Never)
        .rule(Rule::if_then(MentalStateCondition::always(), Action::nested(inner)));
    let (builder, _, events) = context(single(main), MemoryMentalState::new());
    let mut ctx = builder.build();

    let result = run_module(&mut ctx, "main").unwrap();

    assert_eq!(result.status, RunStatus::SoftStop);
    assert_eq!(events.on(Channel::ModuleExit), vec!["exited inner", "exited main"]);
}

#[test]
fn test_named_module_exit_does_not_stop_the_caller() {
    let sub = Module::new("sub").rule(Rule::if_then(MentalStateCondition::always(), Action::exit_module()));
    let main = Module::new("main")
        .order(RuleOrder::LinearAll)
        .exit(ExitCondition::NoAction)
        .rule(Rule::if_then(
            not_bel(atom("called")),
            ActionCombo::new(vec![Action::insert(atom("called")), Action::call("sub", vec![])]),
        ))
        .rule(Rule::if_then(
            MentalStateCondition::bel(atom("called"))
                .and(MentalLiteral::new(LiteralKind::Bel, atom("continued")).negated()),
            ActionCombo::new(vec![Action::user("continued", vec![]), Action::insert(atom("continued"))]),
        ));
    let program = ProgramBuilder::new().main(main).module(sub).build().unwrap();
    let (builder, log, events) = context(program, MemoryMentalState::new());
    let mut ctx = builder.build();

    let result = run_module(&mut ctx, "main").unwrap();

    assert_eq!(logged(&log), vec!["continued"]);
    assert_eq!(events.on(Channel::ModuleEntry).len(), 2);
    assert_eq!(result.status, RunStatus::SoftStop);
}

#[test]
fn test_called_module_inherits_caller_order() {
    let sub = Module::new("sub")
        .rule(Rule::if_then(MentalStateCondition::always(), Action::user("a", vec![])))
        .rule(Rule::if_then(MentalStateCondition::always(), Action::user("b", vec![])));
    let main = Module::new("main")
        .order(RuleOrder::LinearAll)
        .rule(Rule::if_then(MentalStateCondition::always(), Action::call("sub", vec![])));
    let program = ProgramBuilder::new().main(main).module(sub).build().unwrap();
    let (builder, log, _) = context(program, MemoryMentalState::new());
    let mut ctx = builder.build();

    run_module(&mut ctx, "main").unwrap();

    assert_eq!(logged(&log), vec!["a", "b"]);
}

#[test]
fn test_focused_goal_is_handed_to_called_module() {
    let visit = Module::new("visit")
        .parameters(vec![var("Y")])
        .focus(FocusMethod::Select)
        .rule(Rule::if_then(MentalStateCondition::always(), Action::user("go", vec![var("Y")])));
    let main = Module::new("main").rule(Rule::if_then(
        a_goal(cmp("at", vec![var("X")])).and(MentalLiteral::new(
            LiteralKind::Bel,
            cmp("reachable", vec![var("X")]),
        )),
        Action::call("visit", vec![var("X")]),
    ));
    let program = ProgramBuilder::new().main(main).module(visit).build().unwrap();
    let mut ms = MemoryMentalState::new()
        .with_goals(vec![cmp("at", vec![atom("a")]), cmp("at", vec![atom("b")])])
        .with_beliefs(vec![cmp("reachable", vec![atom("b")])]);
    ms.focus_on_goals = true;
    let focus_log = ms.focus_log.clone();
    let (builder, log, _) = context(program, ms);
    let mut ctx = builder.build();

    run_module(&mut ctx, "main").unwrap();

    assert_eq!(logged(&log), vec!["go(b)"]);
    assert_eq!(
        *focus_log.lock().unwrap(),
        vec![("visit".to_string(), FocusMethod::Select, Some(cmp("at", vec![atom("b")])))]
    );
}

#[test]
fn test_unfocused_call_enters_focus_without_goal() {
    let visit = Module::new("visit")
        .focus(FocusMethod::New)
        .rule(Rule::if_then(MentalStateCondition::always(), Action::user("go", vec![])));
    let main = Module::new("main").rule(Rule::if_then(
        MentalStateCondition::always(),
        Action::call("visit", vec![]),
    ));
    let program = ProgramBuilder::new().main(main).module(visit).build().unwrap();
    let ms = MemoryMentalState::new();
    let focus_log = ms.focus_log.clone();
    let (builder, _, _) = context(program, ms);
    let mut ctx = builder.build();

    run_module(&mut ctx, "main").unwrap();

    assert_eq!(*focus_log.lock().unwrap(), vec![("visit".to_string(), FocusMethod::New, None)]);
}
