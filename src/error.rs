use thiserror::Error;

/// Errors that can occur while tokenizing, parsing or evaluating a condition expression.
///
/// These never escape a run: the condition policy resolves every one of them to `true`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExpressionError {
    #[error("Unexpected character '{found}' at offset {offset}")]
    UnexpectedCharacter { found: char, offset: usize },

    #[error("Unexpected token '{found}', expected {expected}")]
    UnexpectedToken { found: String, expected: String },

    #[error("Unexpected end of expression, expected {0}")]
    UnexpectedEnd(String),

    #[error("Unterminated string literal starting at offset {0}")]
    UnterminatedString(usize),

    #[error("Invalid number literal '{0}'")]
    InvalidNumber(String),

    #[error("Identifier '{0}' is not defined")]
    UnknownIdentifier(String),

    #[error("Expression nesting exceeds the maximum depth of {0}")]
    TooDeep(usize),
}

/// Structural problems with a workflow graph.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("Step id '{0}' is used by more than one step")]
    DuplicateStepId(String),

    #[error("The graph has no entry step")]
    NoEntryStep,

    #[error("The graph has {} entry steps: {}", .0.len(), .0.join(", "))]
    MultipleEntries(Vec<String>),

    #[error("Step '{step_id}' has an unknown duration unit '{unit}'")]
    UnknownDurationUnit { step_id: String, unit: String },
}

/// Errors that can occur when converting a host document into a junro `Graph`.
#[derive(Error, Debug)]
pub enum GraphConversionError {
    #[error("Failed to parse workflow JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read workflow file: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("Invalid workflow data: {0}")]
    Validation(String),
}

/// Errors raised while building an `ExecutionContext`.
#[derive(Error, Debug)]
pub enum ContextError {
    #[error("Context variable '{name}' must be a number, boolean, string or null")]
    NonScalar { name: String },

    #[error("Execution context must be a JSON object")]
    NotAnObject,

    #[error("Failed to parse context JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read context file: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors returned by a `GraphStore`.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Workflow '{0}' was not found in the store")]
    NotFound(String),

    #[error(transparent)]
    Conversion(#[from] GraphConversionError),
}
