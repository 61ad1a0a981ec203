//! Common test utilities for building workflow graphs and observing runs.
use junro::prelude::*;
use serde_json::json;

/// `entry -> log(message) -> terminal`
#[allow(dead_code)]
pub fn create_linear_graph(message: &str) -> Graph {
    Graph::new(
        vec![
            Step::new("start", StepKind::Entry),
            Step::new("say", StepKind::log(message)),
            Step::new("end", StepKind::Terminal),
        ],
        vec![
            Transition::new("start", "say"),
            Transition::new("say", "end"),
        ],
    )
    .unwrap()
}

/// `entry -> condition(expression)`, with `then` on the true branch and `else` on the
/// false branch, both leading to `end`.
#[allow(dead_code)]
pub fn create_branching_graph(expression: &str) -> Graph {
    Graph::new(
        vec![
            Step::new("start", StepKind::Entry),
            Step::new("check", StepKind::condition(expression)),
            Step::new("then", StepKind::log("took the true branch")),
            Step::new("else", StepKind::log("took the false branch")),
            Step::new("end", StepKind::Terminal),
        ],
        vec![
            Transition::new("start", "check"),
            Transition::branch("check", "then", BranchTag::True),
            Transition::branch("check", "else", BranchTag::False),
            Transition::new("then", "end"),
            Transition::new("else", "end"),
        ],
    )
    .unwrap()
}

/// A diamond (`start -> a, b -> join -> end`) plus an orphan step nothing points at.
#[allow(dead_code)]
pub fn create_diamond_graph() -> Graph {
    Graph::new(
        vec![
            Step::new("start", StepKind::Entry),
            Step::new("a", StepKind::log("left")),
            Step::new("b", StepKind::log("right")),
            Step::new("join", StepKind::log("joined")),
            Step::new("end", StepKind::Terminal),
            Step::new("orphan", StepKind::log("never reached")),
        ],
        vec![
            Transition::new("start", "a"),
            Transition::new("start", "b"),
            Transition::new("a", "join"),
            Transition::new("b", "join"),
            Transition::new("join", "end"),
            Transition::new("orphan", "end"),
        ],
    )
    .unwrap()
}

/// `start -> a -> b -> a` with `b -> end` as the way out.
#[allow(dead_code)]
pub fn create_cyclic_graph() -> Graph {
    Graph::new(
        vec![
            Step::new("start", StepKind::Entry),
            Step::new("a", StepKind::log("looping")),
            Step::new("b", StepKind::log("still looping")),
            Step::new("end", StepKind::Terminal),
        ],
        vec![
            Transition::new("start", "a"),
            Transition::new("a", "b"),
            Transition::new("b", "a"),
            Transition::new("b", "end"),
        ],
    )
    .unwrap()
}

/// The demo context: `{value: 15, count: 3, x: 10}`.
#[allow(dead_code)]
pub fn create_demo_context() -> ExecutionContext {
    ExecutionContext::demo()
}

#[allow(dead_code)]
pub fn create_context(value: serde_json::Value) -> ExecutionContext {
    serde_json::from_value(value).unwrap()
}

#[allow(dead_code)]
pub fn empty_context() -> ExecutionContext {
    create_context(json!({}))
}

/// An interpreter without any simulated pauses.
#[allow(dead_code)]
pub fn instant_interpreter(graph: Graph, context: ExecutionContext) -> Interpreter {
    Interpreter::builder(graph)
        .with_context(context)
        .with_timings(ExecutionTimings::instant())
        .build()
}

/// Renders recorded events as short strings such as `enter:start` or `log:LOG: hi`.
#[allow(dead_code)]
pub fn describe(events: &[ObserverEvent]) -> Vec<String> {
    events
        .iter()
        .map(|event| match event {
            ObserverEvent::StepEnter(id) => format!("enter:{}", id),
            ObserverEvent::StepExit(id) => format!("exit:{}", id),
            ObserverEvent::Log(entry) => format!("log:{}", entry.message),
            ObserverEvent::Complete => "complete".to_string(),
            ObserverEvent::Cancelled => "cancelled".to_string(),
        })
        .collect()
}

/// Records everything and cancels the run as soon as the first step is entered.
#[allow(dead_code)]
pub struct CancelOnFirstEnter {
    pub recorder: RecordingObserver,
    pub token: CancellationToken,
}

#[allow(dead_code)]
impl CancelOnFirstEnter {
    pub fn new() -> Self {
        Self {
            recorder: RecordingObserver::new(),
            token: CancellationToken::new(),
        }
    }
}

impl ExecutionObserver for CancelOnFirstEnter {
    fn on_step_enter(&self, step_id: &str) {
        self.recorder.on_step_enter(step_id);
        self.token.cancel();
    }

    fn on_step_exit(&self, step_id: &str) {
        self.recorder.on_step_exit(step_id);
    }

    fn on_log(&self, entry: &LogEntry) {
        self.recorder.on_log(entry);
    }

    fn on_complete(&self) {
        self.recorder.on_complete();
    }

    fn on_cancelled(&self) {
        self.recorder.on_cancelled();
    }
}

#[allow(dead_code)]
pub const SAMPLE_WORKFLOW_JSON: &str = r#"{
    "id": "wf-test",
    "name": "Threshold check",
    "nodes": [
        { "id": "n1", "type": "start", "data": { "label": "Start" } },
        { "id": "n2", "type": "condition", "data": { "label": "Above ten?", "condition": "value > 10" } },
        { "id": "n3", "type": "webhook", "data": { "label": "Alert", "url": "https://example.com/alert", "payload": "{\"level\":\"high\"}" } },
        { "id": "n4", "type": "logger", "data": { "label": "Quiet", "message": "below threshold" } },
        { "id": "n5", "type": "end", "data": { "label": "End" } }
    ],
    "edges": [
        { "id": "e1", "source": "n1", "target": "n2" },
        { "id": "e2", "source": "n2", "target": "n3", "sourceHandle": "true" },
        { "id": "e3", "source": "n2", "target": "n4", "sourceHandle": "false" },
        { "id": "e4", "source": "n3", "target": "n5" },
        { "id": "e5", "source": "n4", "target": "n5" }
    ]
}"#;
