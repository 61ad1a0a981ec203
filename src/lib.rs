//! # Junro - Workflow Graph Interpreter
//!
//! **Junro** runs node-based workflows: directed graphs of typed steps (entry, condition,
//! wait, call, log, terminal) connected by transitions. A run walks the graph from its
//! entry step, performs each step's simulated effect, and reports progress through an
//! observer while remaining cancellable at any point.
//!
//! ## Core Workflow
//!
//! The interpreter is format-agnostic. It operates on a canonical, immutable [`Graph`]
//! snapshot. The primary workflow is:
//!
//! 1.  **Load Your Data**: Parse your workflow format into your own Rust structs, or use
//!     the bundled canvas format in [`ui::WorkflowDocument`].
//! 2.  **Convert to a Graph**: Implement [`IntoGraph`] for your structs to translate them
//!     into steps and transitions.
//! 3.  **Build an Interpreter**: `Interpreter::builder(graph)` takes the graph together
//!     with the context variables conditions are evaluated against and the timings of the
//!     simulated effects.
//! 4.  **Run**: Await [`Interpreter::run`] with an [`ExecutionObserver`] and a
//!     cancellation token, or start a background run with [`Interpreter::spawn`].
//!
//! ## Quick Start
//!
//! ```rust
//! use junro::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<()> {
//! let graph = Graph::new(
//!     vec![
//!         Step::new("start", StepKind::Entry),
//!         Step::new("check", StepKind::condition("value > 10")),
//!         Step::new("high", StepKind::log("value is high")),
//!         Step::new("low", StepKind::log("value is low")),
//!         Step::new("end", StepKind::Terminal),
//!     ],
//!     vec![
//!         Transition::new("start", "check"),
//!         Transition::branch("check", "high", BranchTag::True),
//!         Transition::branch("check", "low", BranchTag::False),
//!         Transition::new("high", "end"),
//!         Transition::new("low", "end"),
//!     ],
//! )?;
//!
//! let interpreter = Interpreter::builder(graph)
//!     .with_context(ExecutionContext::new().with("value", 15)?)
//!     .with_timings(ExecutionTimings::instant())
//!     .build();
//!
//! let observer = RecordingObserver::new();
//! let outcome = interpreter.run(&observer, &CancellationToken::new()).await;
//!
//! assert_eq!(outcome, RunOutcome::Completed);
//! assert_eq!(observer.entered_steps(), ["start", "check", "high", "end"]);
//! # Ok(())
//! # }
//! ```

pub mod ast;
pub mod condition;
pub mod data;
pub mod error;
pub mod graph;
pub mod interpreter;
pub mod log;
pub mod observer;
pub mod prelude;
pub mod trace;
pub mod ui;

pub use graph::{Graph, IntoGraph};
pub use observer::ExecutionObserver;
