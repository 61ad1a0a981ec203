use crate::graph::Step;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Label carried by log entries that do not originate from a step.
pub const SYSTEM_LABEL: &str = "System";

/// How a log entry should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}

/// One line of a run's log. Entries are never modified once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    /// Empty for run-level messages.
    pub step_id: String,
    pub step_kind: String,
    pub step_label: String,
    pub message: String,
    pub severity: Severity,
}

impl LogEntry {
    pub fn new(
        step_id: impl Into<String>,
        step_kind: impl Into<String>,
        step_label: impl Into<String>,
        message: impl Into<String>,
        severity: Severity,
    ) -> Self {
        Self {
            id: format!("log-{}", Uuid::new_v4().simple()),
            timestamp: Utc::now(),
            step_id: step_id.into(),
            step_kind: step_kind.into(),
            step_label: step_label.into(),
            message: message.into(),
            severity,
        }
    }

    /// An entry produced while evaluating `step`.
    pub fn for_step(step: &Step, message: impl Into<String>, severity: Severity) -> Self {
        Self::new(&step.id, step.kind.name(), &step.label, message, severity)
    }

    /// A run-level entry, attributed to the step kind whose phase it belongs to.
    pub fn system(step_kind: &str, message: impl Into<String>, severity: Severity) -> Self {
        Self::new("", step_kind, SYSTEM_LABEL, message, severity)
    }

    /// The parts of an entry that are identical across repeated runs of the same graph.
    pub fn signature(&self) -> (&str, &str, &str, Severity) {
        (&self.step_id, &self.step_kind, &self.message, self.severity)
    }
}
