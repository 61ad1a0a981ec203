use crate::error::GraphError;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Target of a `call` step that was configured without a URL.
pub const DEFAULT_CALL_URL: &str = "https://example.com/webhook";
/// Payload of a `call` step that was configured without one.
pub const DEFAULT_CALL_PAYLOAD: &str = "{}";
/// Message of a `log` step that was configured without one.
pub const DEFAULT_LOG_MESSAGE: &str = "No message";

/// Unit of a `wait` step's duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationUnit {
    #[default]
    Seconds,
    Minutes,
    Hours,
}

impl DurationUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            DurationUnit::Seconds => "seconds",
            DurationUnit::Minutes => "minutes",
            DurationUnit::Hours => "hours",
        }
    }

    pub fn parse(unit: &str) -> Option<Self> {
        match unit {
            "seconds" => Some(DurationUnit::Seconds),
            "minutes" => Some(DurationUnit::Minutes),
            "hours" => Some(DurationUnit::Hours),
            _ => None,
        }
    }
}

impl fmt::Display for DurationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a step does, together with the parameters that kind of step needs.
#[derive(Debug, Clone, PartialEq)]
pub enum StepKind {
    /// Where every run begins.
    Entry,
    /// Picks one outgoing branch. An empty expression is always true.
    Condition { expression: String },
    /// Suspends the run for a simulated amount of time.
    Wait { duration: f64, unit: DurationUnit },
    /// A simulated outbound call. No network traffic is generated.
    Call { url: String, payload: String },
    /// Emits a message to the run log.
    Log { message: String },
    /// Ends traversal along the current path.
    Terminal,
    /// A kind this interpreter does not know. Runs treat it as a pass-through.
    Unknown { kind: String },
}

impl StepKind {
    /// The canonical kind name, also used as the default step label.
    pub fn name(&self) -> &str {
        match self {
            StepKind::Entry => "entry",
            StepKind::Condition { .. } => "condition",
            StepKind::Wait { .. } => "wait",
            StepKind::Call { .. } => "call",
            StepKind::Log { .. } => "log",
            StepKind::Terminal => "terminal",
            StepKind::Unknown { kind } => kind,
        }
    }

    pub fn condition(expression: impl Into<String>) -> Self {
        StepKind::Condition {
            expression: expression.into(),
        }
    }

    pub fn wait(duration: f64, unit: DurationUnit) -> Self {
        StepKind::Wait { duration, unit }
    }

    pub fn call(url: impl Into<String>, payload: impl Into<String>) -> Self {
        StepKind::Call {
            url: url.into(),
            payload: payload.into(),
        }
    }

    pub fn log(message: impl Into<String>) -> Self {
        StepKind::Log {
            message: message.into(),
        }
    }
}

/// A node in the workflow graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub id: String,
    pub label: String,
    pub kind: StepKind,
}

impl Step {
    /// Creates a step labelled with its kind name.
    pub fn new(id: impl Into<String>, kind: StepKind) -> Self {
        let label = kind.name().to_string();
        Self {
            id: id.into(),
            label,
            kind,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

/// Branch a transition belongs to when it leaves a `condition` step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BranchTag {
    True,
    False,
}

impl BranchTag {
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "true" => Some(BranchTag::True),
            "false" => Some(BranchTag::False),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BranchTag::True => "true",
            BranchTag::False => "false",
        }
    }

    /// Whether this branch is the one taken for a condition outcome.
    pub fn matches(self, outcome: bool) -> bool {
        self == BranchTag::from(outcome)
    }
}

impl From<bool> for BranchTag {
    fn from(outcome: bool) -> Self {
        if outcome {
            BranchTag::True
        } else {
            BranchTag::False
        }
    }
}

/// A directed edge between two steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub source: String,
    pub target: String,
    pub branch: Option<BranchTag>,
}

impl Transition {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            branch: None,
        }
    }

    pub fn branch(source: impl Into<String>, target: impl Into<String>, tag: BranchTag) -> Self {
        Self {
            branch: Some(tag),
            ..Self::new(source, target)
        }
    }

    /// Whether a condition step may follow this transition for the given outcome.
    /// Untagged transitions are eligible for either outcome.
    pub fn is_eligible(&self, outcome: bool) -> bool {
        self.branch.is_none_or(|tag| tag.matches(outcome))
    }
}

/// An immutable snapshot of a workflow: its steps and transitions in stored order,
/// indexed for lookup by step id.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    steps: Vec<Step>,
    transitions: Vec<Transition>,
    step_index: AHashMap<String, usize>,
    outgoing_index: AHashMap<String, Vec<usize>>,
}

impl Graph {
    /// Builds a graph, rejecting step ids that are used more than once.
    ///
    /// Transitions may point at steps that do not exist; they are treated as dead ends.
    pub fn new(steps: Vec<Step>, transitions: Vec<Transition>) -> Result<Self, GraphError> {
        let mut step_index = AHashMap::with_capacity(steps.len());
        for (position, step) in steps.iter().enumerate() {
            if step_index.insert(step.id.clone(), position).is_some() {
                return Err(GraphError::DuplicateStepId(step.id.clone()));
            }
        }

        let mut outgoing_index: AHashMap<String, Vec<usize>> = AHashMap::new();
        for (position, transition) in transitions.iter().enumerate() {
            outgoing_index
                .entry(transition.source.clone())
                .or_default()
                .push(position);
        }

        Ok(Self {
            steps,
            transitions,
            step_index,
            outgoing_index,
        })
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Checks that the graph has exactly one entry step.
    ///
    /// Running does not require this: a graph without an entry step completes with an
    /// error log, and with several the first one wins.
    pub fn validate(&self) -> Result<(), GraphError> {
        let entries: Vec<&Step> = self.entries().collect();
        match entries.as_slice() {
            [] => Err(GraphError::NoEntryStep),
            [_] => Ok(()),
            many => Err(GraphError::MultipleEntries(
                many.iter().map(|s| s.id.clone()).collect(),
            )),
        }
    }

    pub(super) fn step_at(&self, position: usize) -> Option<&Step> {
        self.steps.get(position)
    }

    pub(super) fn step_position(&self, step_id: &str) -> Option<usize> {
        self.step_index.get(step_id).copied()
    }

    pub(super) fn outgoing_positions(&self, step_id: &str) -> &[usize] {
        self.outgoing_index
            .get(step_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub(super) fn transition_at(&self, position: usize) -> Option<&Transition> {
        self.transitions.get(position)
    }
}
