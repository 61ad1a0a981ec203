//! Condition evaluation for `condition` steps.
//!
//! A condition is evaluated in three stages:
//!
//! 1.  **Substitution**: every context variable that appears as a whole word is replaced
//!     by its JSON literal (`value > 10` with `{value: 15}` becomes `15 > 10`).
//! 2.  **Screening**: if the substituted text contains a character outside the permitted
//!     set, the condition is considered too complex to evaluate and resolves to `true`.
//! 3.  **Evaluation**: the text is parsed into an [`Expression`] and evaluated; the final
//!     value is coerced to a boolean.
//!
//! Every failure along the way resolves to `true`. A run is never aborted by a bad
//! condition; the [`Resolution`] records why a result was reached.

use crate::ast::Expression;
use crate::data::ExecutionContext;
use crate::error::ExpressionError;
use crate::trace::TraceFormatter;
use regex::{NoExpand, Regex};
use tracing::{debug, trace, warn};

mod engine;
pub mod parsing;

use engine::AstEngine;

/// How a condition reached its boolean result.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The expression was empty or whitespace only.
    Empty,
    /// The expression was evaluated. `explanation` is the formatted evaluation trace.
    Evaluated {
        substituted: String,
        explanation: String,
    },
    /// The substituted expression contained characters outside the permitted set.
    Rejected { substituted: String },
    /// The substituted expression could not be parsed.
    Failed {
        substituted: String,
        error: ExpressionError,
    },
}

/// The outcome of evaluating a condition against a context.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionOutcome {
    pub result: bool,
    pub resolution: Resolution,
}

impl ConditionOutcome {
    fn fail_open(resolution: Resolution) -> Self {
        Self {
            result: true,
            resolution,
        }
    }
}

/// Evaluates a condition expression against the execution context.
pub fn evaluate_condition(expression: &str, context: &ExecutionContext) -> ConditionOutcome {
    if expression.trim().is_empty() {
        return ConditionOutcome::fail_open(Resolution::Empty);
    }

    let substituted = substitute_variables(expression, context);

    if !is_permitted(&substituted) {
        debug!(expression, %substituted, "Complex expression detected, defaulting to true");
        return ConditionOutcome::fail_open(Resolution::Rejected { substituted });
    }

    let ast = match parsing::parse(&substituted) {
        Ok(ast) => ast,
        Err(error) => {
            warn!(expression, %substituted, %error, "Failed to evaluate condition, defaulting to true");
            return ConditionOutcome::fail_open(Resolution::Failed { substituted, error });
        }
    };

    let evaluation = AstEngine::new(&ast).evaluate();
    let result = evaluation.get_outcome().is_truthy();
    let explanation = TraceFormatter::format_trace(&evaluation);
    trace!(expression, %explanation, result, "Condition evaluated");

    ConditionOutcome {
        result,
        resolution: Resolution::Evaluated {
            substituted,
            explanation,
        },
    }
}

/// Replaces every whole-word occurrence of a context variable with its JSON literal.
///
/// Variables are substituted in context insertion order, so a string value that spells
/// the name of a later variable is itself substituted.
pub fn substitute_variables(expression: &str, context: &ExecutionContext) -> String {
    let mut substituted = expression.to_string();
    for (name, value) in context.iter() {
        let pattern = match Regex::new(&format!(r"\b{}\b", regex::escape(name))) {
            Ok(pattern) => pattern,
            Err(error) => {
                warn!(variable = %name, %error, "Skipping variable that cannot be matched");
                continue;
            }
        };
        let literal = value.to_string();
        substituted = pattern
            .replace_all(&substituted, NoExpand(&literal))
            .into_owned();
    }
    substituted
}

/// Returns `true` if every character belongs to the set a condition may contain:
/// ASCII letters and digits, whitespace, and `+ - * / < > = ! & | ( ) . , " '`.
pub fn is_permitted(expression: &str) -> bool {
    expression.chars().all(|c| {
        c.is_ascii_alphanumeric()
            || c.is_whitespace()
            || matches!(
                c,
                '+' | '-' | '*' | '/' | '<' | '>' | '=' | '!' | '&' | '|' | '(' | ')' | '.' | ','
                    | '"' | '\''
            )
    })
}

/// Parses an expression without evaluating it.
pub fn parse_expression(expression: &str) -> Result<Expression, ExpressionError> {
    parsing::parse(expression)
}
