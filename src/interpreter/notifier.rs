use crate::log::LogEntry;
use crate::observer::ExecutionObserver;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Raised when a run observes its cancellation signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Interrupted;

/// Delivers notifications to the observer, checking for cancellation before each one.
pub(crate) struct Notifier<'a> {
    observer: &'a dyn ExecutionObserver,
    cancel: &'a CancellationToken,
}

impl<'a> Notifier<'a> {
    pub(crate) fn new(observer: &'a dyn ExecutionObserver, cancel: &'a CancellationToken) -> Self {
        Self { observer, cancel }
    }

    pub(crate) fn checkpoint(&self) -> Result<(), Interrupted> {
        if self.cancel.is_cancelled() {
            Err(Interrupted)
        } else {
            Ok(())
        }
    }

    pub(crate) fn enter(&self, step_id: &str) -> Result<(), Interrupted> {
        self.checkpoint()?;
        self.observer.on_step_enter(step_id);
        Ok(())
    }

    pub(crate) fn exit(&self, step_id: &str) -> Result<(), Interrupted> {
        self.checkpoint()?;
        self.observer.on_step_exit(step_id);
        Ok(())
    }

    pub(crate) fn log(&self, entry: &LogEntry) -> Result<(), Interrupted> {
        self.checkpoint()?;
        self.observer.on_log(entry);
        Ok(())
    }

    pub(crate) fn complete(&self) -> Result<(), Interrupted> {
        self.checkpoint()?;
        self.observer.on_complete();
        Ok(())
    }

    pub(crate) fn cancelled(&self) {
        self.observer.on_cancelled();
    }

    /// Suspends for `ms` milliseconds. A suspension in progress is never cut short;
    /// cancellation is picked up at the next checkpoint.
    pub(crate) async fn pause(&self, ms: u64) {
        if ms > 0 {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }
}
