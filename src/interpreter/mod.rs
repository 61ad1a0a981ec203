//! The execution loop.
//!
//! A run walks the graph breadth-first from its entry step, evaluating each reachable
//! step at most once. Progress is reported through an [`ExecutionObserver`] and a run can
//! be cancelled at any time through a [`CancellationToken`]; cancellation is observed
//! between suspensions, never during one.

use crate::data::ExecutionContext;
use crate::graph::{Graph, Step};
use crate::log::{LogEntry, Severity};
use crate::observer::ExecutionObserver;
use ahash::AHashSet;
use itertools::Itertools;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

mod notifier;
mod step;
mod timings;

use notifier::{Interrupted, Notifier};
use step::StepEvaluator;
pub use step::{Decision, MAX_SIMULATED_WAIT_MS, StepOutcome, duration_ms, payload_preview};
pub use timings::ExecutionTimings;

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    Cancelled,
}

/// Lifecycle of a spawned run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunStatus {
    #[default]
    Idle,
    Running,
    Completed,
    Cancelled,
}

impl RunStatus {
    pub fn is_finished(self) -> bool {
        matches!(self, RunStatus::Completed | RunStatus::Cancelled)
    }
}

impl From<RunOutcome> for RunStatus {
    fn from(outcome: RunOutcome) -> Self {
        match outcome {
            RunOutcome::Completed => RunStatus::Completed,
            RunOutcome::Cancelled => RunStatus::Cancelled,
        }
    }
}

/// Runs workflow graphs.
///
/// An interpreter holds an immutable snapshot of the graph together with the context
/// and timings of its runs. It can be cloned cheaply and run any number of times,
/// concurrently if needed; runs never share state.
#[derive(Debug, Clone)]
pub struct Interpreter {
    graph: Arc<Graph>,
    context: Arc<ExecutionContext>,
    timings: ExecutionTimings,
}

/// Builder for [`Interpreter`].
pub struct InterpreterBuilder {
    graph: Arc<Graph>,
    context: Option<ExecutionContext>,
    timings: ExecutionTimings,
}

impl InterpreterBuilder {
    pub fn new(graph: impl Into<Arc<Graph>>) -> Self {
        Self {
            graph: graph.into(),
            context: None,
            timings: ExecutionTimings::default(),
        }
    }

    /// Sets the variables conditions are evaluated against. Without one the demo
    /// context is used.
    pub fn with_context(mut self, context: ExecutionContext) -> Self {
        self.context = Some(context);
        self
    }

    pub fn with_timings(mut self, timings: ExecutionTimings) -> Self {
        self.timings = timings;
        self
    }

    pub fn build(self) -> Interpreter {
        Interpreter {
            graph: self.graph,
            context: Arc::new(self.context.unwrap_or_else(ExecutionContext::demo)),
            timings: self.timings,
        }
    }
}

impl Interpreter {
    pub fn builder(graph: impl Into<Arc<Graph>>) -> InterpreterBuilder {
        InterpreterBuilder::new(graph)
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn context(&self) -> &ExecutionContext {
        &self.context
    }

    pub fn timings(&self) -> &ExecutionTimings {
        &self.timings
    }

    /// Runs the graph to completion or until `cancel` is triggered.
    ///
    /// The observer receives `on_complete` or `on_cancelled` exactly once, as the last
    /// notification of the run.
    pub async fn run(
        &self,
        observer: &dyn ExecutionObserver,
        cancel: &CancellationToken,
    ) -> RunOutcome {
        let notifier = Notifier::new(observer, cancel);
        match self.traverse(&notifier).await {
            Ok(()) => RunOutcome::Completed,
            Err(Interrupted) => {
                info!("Workflow run cancelled");
                notifier.cancelled();
                RunOutcome::Cancelled
            }
        }
    }

    /// Starts a run on the current tokio runtime.
    pub fn spawn(&self, observer: Arc<dyn ExecutionObserver>) -> RunHandle {
        let cancel = CancellationToken::new();
        let (status_tx, status_rx) = watch::channel(RunStatus::Idle);

        let interpreter = self.clone();
        let token = cancel.clone();
        let task = tokio::spawn(async move {
            status_tx.send_replace(RunStatus::Running);
            let outcome = interpreter.run(observer.as_ref(), &token).await;
            status_tx.send_replace(outcome.into());
            outcome
        });

        RunHandle {
            cancel,
            status: status_rx,
            task,
        }
    }

    async fn traverse(&self, notifier: &Notifier<'_>) -> Result<(), Interrupted> {
        let Some(entry) = self.graph.find_entry() else {
            warn!(steps = self.graph.steps().len(), "Workflow has no entry step");
            notifier.log(&LogEntry::system(
                "entry",
                "No Start node found in workflow",
                Severity::Error,
            ))?;
            return notifier.complete();
        };

        let entries: Vec<&str> = self.graph.entries().map(|s| s.id.as_str()).collect();
        if entries.len() > 1 {
            warn!(
                entries = %entries.iter().join(", "),
                chosen = %entry.id,
                "Multiple entry steps, starting from the first"
            );
        }

        info!(entry = %entry.id, steps = self.graph.steps().len(), "Starting workflow run");
        notifier.log(&LogEntry::system(
            "entry",
            "Starting workflow execution...",
            Severity::Info,
        ))?;
        notifier.log(&LogEntry::system(
            "entry",
            format!("Context variables: {}", self.context.to_json_string()),
            Severity::Info,
        ))?;

        let evaluator = StepEvaluator::new(&self.graph, &self.context, &self.timings);
        let mut visited: AHashSet<&str> = AHashSet::new();
        let mut pending: VecDeque<&Step> = VecDeque::from([entry]);

        while let Some(step) = pending.pop_front() {
            notifier.checkpoint()?;
            if !visited.insert(step.id.as_str()) {
                continue;
            }

            debug!(step = %step.id, kind = step.kind.name(), "Entering step");
            notifier.enter(&step.id)?;
            notifier.pause(self.timings.step_enter_ms).await;

            let outcome = evaluator.evaluate(step, notifier).await?;

            notifier.exit(&step.id)?;
            notifier.pause(self.timings.step_exit_ms).await;

            let next: Vec<&Step> = match &outcome.decision {
                Decision::FollowAll => self
                    .graph
                    .outgoing(&step.id)
                    .into_iter()
                    .filter_map(|t| self.graph.target_of(t))
                    .collect(),
                Decision::Follow(transition) => {
                    self.graph.target_of(transition).into_iter().collect()
                }
                Decision::Halt => Vec::new(),
            };
            debug!(
                step = %step.id,
                decision = ?outcome.decision,
                logs = outcome.logs.len(),
                next = %next.iter().map(|s| s.id.as_str()).join(", "),
                "Step finished"
            );
            pending.extend(
                next.into_iter()
                    .filter(|s| !visited.contains(s.id.as_str())),
            );
        }

        notifier.log(&LogEntry::system(
            "terminal",
            "Execution finished",
            Severity::Success,
        ))?;
        info!(visited = visited.len(), "Workflow run completed");
        notifier.complete()
    }
}

/// A run started with [`Interpreter::spawn`].
#[derive(Debug)]
pub struct RunHandle {
    cancel: CancellationToken,
    status: watch::Receiver<RunStatus>,
    task: JoinHandle<RunOutcome>,
}

impl RunHandle {
    /// Signals the run to stop. The run observes the signal before its next
    /// notification.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// A token that cancels this run when triggered.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn status(&self) -> RunStatus {
        *self.status.borrow()
    }

    /// A receiver that is notified on every status change.
    pub fn subscribe(&self) -> watch::Receiver<RunStatus> {
        self.status.clone()
    }

    /// Waits for the run to end. Fails only if the run panicked.
    pub async fn join(self) -> Result<RunOutcome, JoinError> {
        self.task.await
    }
}

/// Runs `graph` once with the reference timings.
///
/// A missing context falls back to [`ExecutionContext::demo`]. Use
/// [`Interpreter::run`] or [`Interpreter::spawn`] to cancel a run.
pub async fn execute(
    graph: impl Into<Arc<Graph>>,
    observer: &dyn ExecutionObserver,
    context: Option<ExecutionContext>,
) -> RunOutcome {
    let mut builder = Interpreter::builder(graph);
    if let Some(context) = context {
        builder = builder.with_context(context);
    }
    builder
        .build()
        .run(observer, &CancellationToken::new())
        .await
}
