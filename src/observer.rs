//! Progress reporting for runs.
//!
//! A run reports through an [`ExecutionObserver`]. Notifications are fire-and-forget:
//! the interpreter never waits on an observer, so implementations should return quickly
//! and hand slow work (rendering, I/O) off elsewhere.

use crate::log::LogEntry;
use std::sync::{Arc, Mutex, PoisonError};

/// Receives the lifecycle notifications of a run.
///
/// For a run that is not cancelled the sequence is: the start and context log entries,
/// then per visited step `on_step_enter`, that step's log entries and `on_step_exit`,
/// then the final log entry and `on_complete`. A cancelled run stops delivering
/// notifications the moment the cancellation is observed and calls `on_cancelled`
/// instead of `on_complete`.
pub trait ExecutionObserver: Send + Sync {
    fn on_step_enter(&self, step_id: &str);

    fn on_step_exit(&self, step_id: &str);

    fn on_log(&self, entry: &LogEntry);

    fn on_complete(&self);

    fn on_cancelled(&self) {}
}

impl<T: ExecutionObserver + ?Sized> ExecutionObserver for Arc<T> {
    fn on_step_enter(&self, step_id: &str) {
        (**self).on_step_enter(step_id)
    }

    fn on_step_exit(&self, step_id: &str) {
        (**self).on_step_exit(step_id)
    }

    fn on_log(&self, entry: &LogEntry) {
        (**self).on_log(entry)
    }

    fn on_complete(&self) {
        (**self).on_complete()
    }

    fn on_cancelled(&self) {
        (**self).on_cancelled()
    }
}

/// A single notification, as recorded by [`RecordingObserver`].
#[derive(Debug, Clone, PartialEq)]
pub enum ObserverEvent {
    StepEnter(String),
    StepExit(String),
    Log(LogEntry),
    Complete,
    Cancelled,
}

/// What a presentation layer needs to render a run in progress.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionState {
    pub is_running: bool,
    /// The step between its enter and exit notifications, if any.
    pub current_step_id: Option<String>,
    pub logs: Vec<LogEntry>,
    /// Steps in the order they were entered.
    pub visited_steps: Vec<String>,
}

#[derive(Debug, Default)]
struct Recording {
    events: Vec<ObserverEvent>,
    state: ExecutionState,
}

/// An observer that records every notification and keeps an [`ExecutionState`].
#[derive(Debug, Default)]
pub struct RecordingObserver {
    inner: Mutex<Recording>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ObserverEvent> {
        self.with(|recording| recording.events.clone())
    }

    pub fn logs(&self) -> Vec<LogEntry> {
        self.with(|recording| recording.state.logs.clone())
    }

    pub fn state(&self) -> ExecutionState {
        self.with(|recording| recording.state.clone())
    }

    /// Ids of the steps entered so far, in order.
    pub fn entered_steps(&self) -> Vec<String> {
        self.with(|recording| recording.state.visited_steps.clone())
    }

    fn with<R>(&self, f: impl FnOnce(&mut Recording) -> R) -> R {
        let mut recording = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut recording)
    }

    fn record(&self, event: ObserverEvent) {
        self.with(|recording| {
            let state = &mut recording.state;
            match &event {
                ObserverEvent::StepEnter(id) => {
                    state.is_running = true;
                    state.current_step_id = Some(id.clone());
                    state.visited_steps.push(id.clone());
                }
                ObserverEvent::StepExit(_) => state.current_step_id = None,
                ObserverEvent::Log(entry) => {
                    state.is_running = true;
                    state.logs.push(entry.clone());
                }
                ObserverEvent::Complete | ObserverEvent::Cancelled => {
                    state.is_running = false;
                    state.current_step_id = None;
                }
            }
            recording.events.push(event);
        })
    }
}

impl ExecutionObserver for RecordingObserver {
    fn on_step_enter(&self, step_id: &str) {
        self.record(ObserverEvent::StepEnter(step_id.to_string()));
    }

    fn on_step_exit(&self, step_id: &str) {
        self.record(ObserverEvent::StepExit(step_id.to_string()));
    }

    fn on_log(&self, entry: &LogEntry) {
        self.record(ObserverEvent::Log(entry.clone()));
    }

    fn on_complete(&self) {
        self.record(ObserverEvent::Complete);
    }

    fn on_cancelled(&self) {
        self.record(ObserverEvent::Cancelled);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::Severity;

    #[test]
    fn tracks_current_step_and_running_flag() {
        let observer = RecordingObserver::new();
        observer.on_log(&LogEntry::system("entry", "start", Severity::Info));
        observer.on_step_enter("a");
        assert_eq!(observer.state().current_step_id.as_deref(), Some("a"));
        assert!(observer.state().is_running);

        observer.on_step_exit("a");
        assert_eq!(observer.state().current_step_id, None);

        observer.on_complete();
        let state = observer.state();
        assert!(!state.is_running);
        assert_eq!(state.visited_steps, ["a"]);
        assert_eq!(state.logs.len(), 1);
        assert_eq!(observer.events().last(), Some(&ObserverEvent::Complete));
    }

    #[test]
    fn arc_forwards_to_inner_observer() {
        let observer = Arc::new(RecordingObserver::new());
        let shared: Arc<dyn ExecutionObserver> = observer.clone();
        shared.on_step_enter("x");
        shared.on_cancelled();
        assert_eq!(
            observer.events(),
            [
                ObserverEvent::StepEnter("x".into()),
                ObserverEvent::Cancelled
            ]
        );
    }
}
