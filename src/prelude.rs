//! Prelude module for convenient imports
//!
//! Re-exports the types needed to build a graph, run it and observe the run.
//!
//! # Example
//!
//! ```rust,no_run
//! use junro::prelude::*;
//!
//! # async fn run_example() -> Result<()> {
//! let graph = WorkflowDocument::from_file("path/to/workflow.json")?.into_graph()?;
//! let context = ExecutionContext::from_file("path/to/context.json")?;
//!
//! let observer = RecordingObserver::new();
//! let outcome = execute(graph, &observer, Some(context)).await;
//!
//! for entry in observer.logs() {
//!     println!("[{}] {}", entry.step_label, entry.message);
//! }
//! println!("Run ended: {:?}", outcome);
//! # Ok(())
//! # }
//! ```

// Graph model
pub use crate::graph::{
    BranchTag, DurationUnit, Graph, GraphStore, IntoGraph, MemoryGraphStore, Step, StepKind,
    Transition,
};

// Running
pub use crate::data::ExecutionContext;
pub use crate::interpreter::{
    ExecutionTimings, Interpreter, RunHandle, RunOutcome, RunStatus, execute,
};
pub use tokio_util::sync::CancellationToken;

// Observing
pub use crate::log::{LogEntry, Severity};
pub use crate::observer::{ExecutionObserver, ExecutionState, ObserverEvent, RecordingObserver};

// Conditions
pub use crate::ast::{EvaluationTrace, Expression, Value};
pub use crate::condition::{ConditionOutcome, Resolution, evaluate_condition};
pub use crate::trace::TraceFormatter;

// Canvas format
pub use crate::ui::WorkflowDocument;

// Error types
pub use crate::error::{ContextError, GraphConversionError, GraphError, StoreError};

// Result type alias for convenience
pub type Result<T, E = Box<dyn std::error::Error>> = std::result::Result<T, E>;
