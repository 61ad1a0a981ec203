//! Unit tests for core Junro functionality.
mod common;
use common::*;
use junro::prelude::*;

#[test]
fn test_value_display() {
    assert_eq!(format!("{}", Value::Number(42.0)), "42");
    assert_eq!(format!("{}", Value::Number(1.5)), "1.5");
    assert_eq!(format!("{}", Value::Number(f64::NAN)), "NaN");
    assert_eq!(format!("{}", Value::Bool(true)), "true");
    assert_eq!(format!("{}", Value::Null), "null");
}

#[test]
fn test_value_truthiness() {
    assert!(!Value::Number(0.0).is_truthy());
    assert!(!Value::Str(String::new()).is_truthy());
    assert!(!Value::Null.is_truthy());
    assert!(Value::Str("false".into()).is_truthy());
    assert!(Value::Number(-1.0).is_truthy());
}

#[test]
fn test_trace_formatter_short_circuit() {
    let trace = EvaluationTrace::BinaryOp {
        op_symbol: "||",
        left: Box::new(EvaluationTrace::Leaf {
            value: Value::Bool(true),
        }),
        right: Box::new(EvaluationTrace::NotEvaluated),
        outcome: Value::Bool(true),
    };

    let formatted = TraceFormatter::format_trace(&trace);
    assert_eq!(formatted, "true"); // Only the decisive side is shown
}

#[test]
fn test_trace_formatter_nested_parentheses() {
    let sum = EvaluationTrace::BinaryOp {
        op_symbol: "+",
        left: Box::new(EvaluationTrace::Leaf {
            value: Value::Number(1.0),
        }),
        right: Box::new(EvaluationTrace::Leaf {
            value: Value::Number(2.0),
        }),
        outcome: Value::Number(3.0),
    };
    let product = EvaluationTrace::BinaryOp {
        op_symbol: "*",
        left: Box::new(sum),
        right: Box::new(EvaluationTrace::Leaf {
            value: Value::Number(4.0),
        }),
        outcome: Value::Number(12.0),
    };
    assert_eq!(
        TraceFormatter::format_trace(&product),
        "(1 + 2 [3]) * 4 [12]"
    );
}

#[test]
fn test_expression_display_minimal_parentheses() {
    let expr = Expression::Multiply(
        Box::new(Expression::Sum(
            Box::new(Expression::Literal(Value::Number(1.0))),
            Box::new(Expression::Literal(Value::Number(2.0))),
        )),
        Box::new(Expression::Literal(Value::Str("x".into()))),
    );
    assert_eq!(expr.to_string(), "(1 + 2) * \"x\"");
}

#[test]
fn test_graph_rejects_duplicate_ids() {
    let result = Graph::new(
        vec![
            Step::new("a", StepKind::Entry),
            Step::new("a", StepKind::Terminal),
        ],
        vec![],
    );
    assert_eq!(result.unwrap_err(), GraphError::DuplicateStepId("a".into()));
}

#[test]
fn test_graph_validation() {
    assert!(create_linear_graph("hi").validate().is_ok());
    assert_eq!(Graph::default().validate(), Err(GraphError::NoEntryStep));
}

#[test]
fn test_step_defaults() {
    let step = Step::new("w", StepKind::wait(1.0, DurationUnit::default()));
    assert_eq!(step.label, "wait");
    assert_eq!(
        step.kind,
        StepKind::Wait {
            duration: 1.0,
            unit: DurationUnit::Seconds
        }
    );
    assert_eq!(DurationUnit::parse("hours"), Some(DurationUnit::Hours));
    assert_eq!(DurationUnit::parse("days"), None);
}

#[test]
fn test_branch_eligibility() {
    let untagged = Transition::new("c", "t");
    let on_true = Transition::branch("c", "t", BranchTag::True);
    assert!(untagged.is_eligible(true) && untagged.is_eligible(false));
    assert!(on_true.is_eligible(true));
    assert!(!on_true.is_eligible(false));
    assert_eq!(BranchTag::parse("false"), Some(BranchTag::False));
    assert_eq!(BranchTag::parse("bottom"), None);
}

#[test]
fn test_context_keeps_insertion_order() {
    let context = ExecutionContext::new()
        .with("zeta", 1)
        .unwrap()
        .with("alpha", "two")
        .unwrap()
        .with("mid", true)
        .unwrap();
    assert_eq!(
        context.to_json_string(),
        r#"{"zeta":1,"alpha":"two","mid":true}"#
    );
    assert_eq!(context.get("alpha"), Some(Value::Str("two".into())));
    assert_eq!(context.len(), 3);
}

#[test]
fn test_log_entry_serialization() {
    let step = Step::new("n1", StepKind::log("hi")).with_label("Greeter");
    let entry = LogEntry::for_step(&step, "LOG: hi", Severity::Info);
    let value = serde_json::to_value(&entry).unwrap();

    assert_eq!(value["step_id"], "n1");
    assert_eq!(value["step_kind"], "log");
    assert_eq!(value["step_label"], "Greeter");
    assert_eq!(value["severity"], "info");
    let back: LogEntry = serde_json::from_value(value).unwrap();
    assert_eq!(back, entry);
}

#[test]
fn test_timings_defaults() {
    let timings = ExecutionTimings::default();
    assert_eq!(
        (timings.step_enter_ms, timings.step_exit_ms),
        (300, 200)
    );
    assert_eq!(timings.condition_ms, 800);
    assert_eq!(
        (timings.call_request_ms, timings.call_response_ms),
        (600, 400)
    );
    assert_eq!(ExecutionTimings::instant().max_wait_ms, 0);
}

#[test]
fn test_recording_observer_state() {
    let observer = RecordingObserver::new();
    observer.on_step_enter("a");
    observer.on_log(&LogEntry::system("entry", "hello", Severity::Info));
    let state = observer.state();
    assert!(state.is_running);
    assert_eq!(state.current_step_id.as_deref(), Some("a"));
    assert_eq!(state.logs.len(), 1);
}
