use serde::{Deserialize, Serialize};

/// Simulated durations of a run, in milliseconds.
///
/// The defaults pace a run so a viewer can follow it step by step. Any field missing
/// from a deserialized configuration keeps its default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionTimings {
    /// Pause after a step is entered, before it is evaluated.
    pub step_enter_ms: u64,
    /// Pause after a step is exited.
    pub step_exit_ms: u64,
    pub entry_ms: u64,
    pub condition_ms: u64,
    /// Simulated round trip of a `call` step, before the payload is logged.
    pub call_request_ms: u64,
    /// Simulated response time of a `call` step, after the payload is logged.
    pub call_response_ms: u64,
    pub log_ms: u64,
    pub terminal_ms: u64,
    /// Upper bound on how long a `wait` step actually suspends.
    pub max_wait_ms: u64,
}

impl Default for ExecutionTimings {
    fn default() -> Self {
        Self {
            step_enter_ms: 300,
            step_exit_ms: 200,
            entry_ms: 500,
            condition_ms: 800,
            call_request_ms: 600,
            call_response_ms: 400,
            log_ms: 500,
            terminal_ms: 500,
            max_wait_ms: 5000,
        }
    }
}

impl ExecutionTimings {
    /// No suspensions at all. Log messages are unaffected.
    pub fn instant() -> Self {
        Self {
            step_enter_ms: 0,
            step_exit_ms: 0,
            entry_ms: 0,
            condition_ms: 0,
            call_request_ms: 0,
            call_response_ms: 0,
            log_ms: 0,
            terminal_ms: 0,
            max_wait_ms: 0,
        }
    }

    pub fn from_json_str(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_configuration_keeps_defaults() {
        let timings = ExecutionTimings::from_json_str(r#"{ "condition_ms": 50 }"#).unwrap();
        assert_eq!(timings.condition_ms, 50);
        assert_eq!(timings.step_enter_ms, 300);
        assert_eq!(timings.max_wait_ms, 5000);
    }

    #[test]
    fn instant_has_no_pauses() {
        let timings = ExecutionTimings::instant();
        assert_eq!(timings.step_enter_ms + timings.call_request_ms, 0);
        assert_eq!(timings.max_wait_ms, 0);
    }
}
