use chrono::Local;
use clap::Parser;
use junro::prelude::*;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Runs a canvas workflow document and prints its log as it happens
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the workflow document JSON file
    workflow_path: String,

    /// Path to a JSON object of context variables (defaults to the demo context)
    #[arg(short, long)]
    context: Option<String>,

    /// Path to a JSON file overriding the simulated timings
    #[arg(short, long, conflicts_with = "instant")]
    timings: Option<String>,

    /// Skip every simulated pause
    #[arg(long)]
    instant: bool,

    /// Print log entries as JSON lines
    #[arg(long)]
    json: bool,

    /// Only check the workflow structure, do not run it
    #[arg(long)]
    validate: bool,
}

/// Prints every log entry to stdout as soon as the run emits it.
struct ConsoleObserver {
    json: bool,
}

impl ExecutionObserver for ConsoleObserver {
    fn on_step_enter(&self, step_id: &str) {
        if !self.json {
            println!("{:>14} >> {}", "", step_id);
        }
    }

    fn on_step_exit(&self, step_id: &str) {
        if !self.json {
            println!("{:>14} << {}", "", step_id);
        }
    }

    fn on_log(&self, entry: &LogEntry) {
        if self.json {
            match serde_json::to_string(entry) {
                Ok(line) => println!("{}", line),
                Err(e) => eprintln!("Failed to serialize log entry: {}", e),
            }
            return;
        }
        let time = entry.timestamp.with_timezone(&Local).format("%H:%M:%S%.3f");
        let marker = match entry.severity {
            Severity::Info => " ",
            Severity::Success => "+",
            Severity::Warning => "!",
            Severity::Error => "x",
        };
        println!("{} {} [{}] {}", time, marker, entry.step_label, entry.message);
    }

    fn on_complete(&self) {
        if !self.json {
            println!("\nRun completed.");
        }
    }

    fn on_cancelled(&self) {
        if !self.json {
            println!("\nRun cancelled.");
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("junro=warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // --- 1. Loading ---
    let document = WorkflowDocument::from_file(&cli.workflow_path).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to load workflow '{}': {}",
            cli.workflow_path, e
        ))
    });
    let name = document.name.clone();
    let graph = document
        .into_graph()
        .unwrap_or_else(|e| exit_with_error(&format!("Invalid workflow '{}': {}", name, e)));

    if cli.validate {
        match graph.validate() {
            Ok(()) => {
                println!(
                    "Workflow '{}' is valid: {} steps, {} transitions.",
                    name,
                    graph.steps().len(),
                    graph.transitions().len()
                );
                return;
            }
            Err(e) => exit_with_error(&format!("Workflow '{}' is not valid: {}", name, e)),
        }
    }

    let context = match &cli.context {
        Some(path) => ExecutionContext::from_file(path).unwrap_or_else(|e| {
            exit_with_error(&format!("Failed to load context '{}': {}", path, e))
        }),
        None => ExecutionContext::demo(),
    };

    let timings = if cli.instant {
        ExecutionTimings::instant()
    } else if let Some(path) = &cli.timings {
        std::fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|content| {
                ExecutionTimings::from_json_str(&content).map_err(|e| e.to_string())
            })
            .unwrap_or_else(|e| {
                exit_with_error(&format!("Failed to load timings '{}': {}", path, e))
            })
    } else {
        ExecutionTimings::default()
    };

    // --- 2. Running ---
    if !cli.json {
        println!("Running workflow '{}' ({} steps)\n", name, graph.steps().len());
    }
    let interpreter = Interpreter::builder(graph)
        .with_context(context)
        .with_timings(timings)
        .build();
    let handle = interpreter.spawn(Arc::new(ConsoleObserver { json: cli.json }));

    let token = handle.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });

    match handle.join().await {
        Ok(RunOutcome::Completed) => {}
        Ok(RunOutcome::Cancelled) => std::process::exit(130),
        Err(e) => exit_with_error(&format!("Run aborted: {}", e)),
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
