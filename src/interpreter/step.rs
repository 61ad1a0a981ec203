use super::notifier::{Interrupted, Notifier};
use super::timings::ExecutionTimings;
use crate::condition::evaluate_condition;
use crate::data::ExecutionContext;
use crate::graph::{DurationUnit, Graph, Step, StepKind, Transition};
use crate::log::{LogEntry, Severity};
use tracing::debug;

/// Longest wait, in milliseconds, a `wait` step reports as simulated.
pub const MAX_SIMULATED_WAIT_MS: u64 = 5000;

/// Characters of a call payload shown in the run log.
const PAYLOAD_PREVIEW_CHARS: usize = 50;

/// Where traversal goes after a step.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Every outgoing transition whose target is unvisited.
    FollowAll,
    /// Exactly this transition.
    Follow(Transition),
    /// Nowhere.
    Halt,
}

/// The result of evaluating one step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub logs: Vec<LogEntry>,
    pub decision: Decision,
}

/// Performs the effect of a single step and decides where traversal continues.
pub(super) struct StepEvaluator<'a> {
    graph: &'a Graph,
    context: &'a ExecutionContext,
    timings: &'a ExecutionTimings,
}

impl<'a> StepEvaluator<'a> {
    pub(super) fn new(
        graph: &'a Graph,
        context: &'a ExecutionContext,
        timings: &'a ExecutionTimings,
    ) -> Self {
        Self {
            graph,
            context,
            timings,
        }
    }

    /// Evaluates `step`, delivering each log entry to the observer as it is produced.
    pub(super) async fn evaluate(
        &self,
        step: &Step,
        notifier: &Notifier<'_>,
    ) -> Result<StepOutcome, Interrupted> {
        let mut logs = Vec::new();
        let mut emit = |message: String, severity: Severity| -> Result<(), Interrupted> {
            let entry = LogEntry::for_step(step, message, severity);
            notifier.log(&entry)?;
            logs.push(entry);
            Ok(())
        };

        let decision = match &step.kind {
            StepKind::Entry => {
                emit("Workflow started".into(), Severity::Success)?;
                notifier.pause(self.timings.entry_ms).await;
                Decision::FollowAll
            }
            StepKind::Condition { expression } => {
                let outcome = evaluate_condition(expression, self.context);
                let shown = if expression.is_empty() {
                    "empty"
                } else {
                    expression.as_str()
                };
                let (verdict, severity) = if outcome.result {
                    ("TRUE", Severity::Success)
                } else {
                    ("FALSE", Severity::Warning)
                };
                emit(format!("Evaluating: \"{shown}\" → {verdict}"), severity)?;
                notifier.pause(self.timings.condition_ms).await;

                match self.select_branch(&step.id, outcome.result) {
                    Some(transition) => Decision::Follow(transition.clone()),
                    None => {
                        debug!(step = %step.id, result = outcome.result, "No eligible branch");
                        Decision::Halt
                    }
                }
            }
            StepKind::Wait { duration, unit } => {
                let simulated = duration_ms(*duration, *unit).min(MAX_SIMULATED_WAIT_MS);
                emit(
                    format!("Waiting {duration} {unit}... (simulated: {simulated}ms)"),
                    Severity::Info,
                )?;
                notifier
                    .pause(simulated.min(self.timings.max_wait_ms))
                    .await;
                emit("Delay completed".into(), Severity::Success)?;
                Decision::FollowAll
            }
            StepKind::Call { url, payload } => {
                emit(format!("Calling webhook: {url}"), Severity::Info)?;
                notifier.pause(self.timings.call_request_ms).await;
                emit(
                    format!("Payload: {}", payload_preview(payload)),
                    Severity::Info,
                )?;
                notifier.pause(self.timings.call_response_ms).await;
                emit(
                    "Webhook called successfully (simulated)".into(),
                    Severity::Success,
                )?;
                Decision::FollowAll
            }
            StepKind::Log { message } => {
                emit(format!("LOG: {message}"), Severity::Info)?;
                notifier.pause(self.timings.log_ms).await;
                Decision::FollowAll
            }
            StepKind::Terminal => {
                emit("Workflow completed".into(), Severity::Success)?;
                notifier.pause(self.timings.terminal_ms).await;
                Decision::Halt
            }
            StepKind::Unknown { kind } => {
                emit(format!("Unknown node type: {kind}"), Severity::Warning)?;
                Decision::FollowAll
            }
        };

        Ok(StepOutcome { logs, decision })
    }

    /// The first transition leaving `step_id`, in stored order, that resolves and is
    /// eligible for `result`.
    fn select_branch(&self, step_id: &str, result: bool) -> Option<&'a Transition> {
        self.graph
            .outgoing(step_id)
            .into_iter()
            .find(|t| t.is_eligible(result) && self.graph.target_of(t).is_some())
    }
}

/// Real-world length of a wait in milliseconds. Seconds are capped at
/// [`MAX_SIMULATED_WAIT_MS`]; minutes and hours are not.
pub fn duration_ms(duration: f64, unit: DurationUnit) -> u64 {
    let duration = if duration.is_finite() {
        duration.max(0.0)
    } else {
        0.0
    };
    match unit {
        DurationUnit::Seconds => ((duration * 1000.0) as u64).min(MAX_SIMULATED_WAIT_MS),
        DurationUnit::Minutes => (duration * 60_000.0) as u64,
        DurationUnit::Hours => (duration * 3_600_000.0) as u64,
    }
}

/// The first 50 characters of a payload, with `...` appended when it was cut.
pub fn payload_preview(payload: &str) -> String {
    match payload.char_indices().nth(PAYLOAD_PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &payload[..cut]),
        None => payload.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::RecordingObserver;
    use tokio_util::sync::CancellationToken;

    #[tokio::test]
    async fn outcome_logs_match_delivered_entries() {
        let step = Step::new("hook", StepKind::call("https://example.com/x", "{}"));
        let graph = Graph::new(vec![step.clone()], vec![]).unwrap();
        let context = ExecutionContext::new();
        let timings = ExecutionTimings::instant();
        let observer = RecordingObserver::new();
        let cancel = CancellationToken::new();

        let outcome = StepEvaluator::new(&graph, &context, &timings)
            .evaluate(&step, &Notifier::new(&observer, &cancel))
            .await
            .unwrap();

        assert_eq!(outcome.decision, Decision::FollowAll);
        assert_eq!(outcome.logs.len(), 3);
        assert_eq!(outcome.logs, observer.logs());
    }

    #[tokio::test]
    async fn cancellation_stops_before_the_next_entry() {
        let step = Step::new("hook", StepKind::call("https://example.com/x", "{}"));
        let graph = Graph::new(vec![step.clone()], vec![]).unwrap();
        let context = ExecutionContext::new();
        let timings = ExecutionTimings::instant();
        let observer = RecordingObserver::new();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = StepEvaluator::new(&graph, &context, &timings)
            .evaluate(&step, &Notifier::new(&observer, &cancel))
            .await;

        assert_eq!(result, Err(Interrupted));
        assert!(observer.logs().is_empty());
    }

    #[test]
    fn seconds_are_capped_minutes_and_hours_are_not() {
        assert_eq!(duration_ms(2.0, DurationUnit::Seconds), 2000);
        assert_eq!(duration_ms(30.0, DurationUnit::Seconds), 5000);
        assert_eq!(duration_ms(1.0, DurationUnit::Minutes), 60_000);
        assert_eq!(duration_ms(2.0, DurationUnit::Hours), 7_200_000);
        assert_eq!(duration_ms(-3.0, DurationUnit::Minutes), 0);
    }

    #[test]
    fn payload_preview_cuts_at_fifty_characters() {
        let exact = "x".repeat(50);
        assert_eq!(payload_preview(&exact), exact);

        let long = "é".repeat(60);
        let preview = payload_preview(&long);
        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), 53);
    }
}
