use crate::ast::{EvaluationTrace, Value};

/// Formats evaluation traces into human-readable strings
pub struct TraceFormatter;

impl TraceFormatter {
    /// Format an evaluation trace into a human-readable explanation.
    ///
    /// Every operator is annotated with its intermediate outcome: `15 > 10` reads
    /// `15 > 10 [true]`.
    pub fn format_trace(trace: &EvaluationTrace) -> String {
        Self::format_recursive(trace, 0)
    }

    /// Recursively formats the trace, adding parentheses only when necessary.
    fn format_recursive(trace: &EvaluationTrace, parent_precedence: u8) -> String {
        let current_precedence = trace.precedence();
        let needs_parens = current_precedence < parent_precedence;

        let mut result = String::new();
        if needs_parens {
            result.push('(');
        }

        match trace {
            EvaluationTrace::BinaryOp {
                op_symbol,
                left,
                right,
                outcome,
            } => {
                let left_str = Self::format_recursive(left, current_precedence);

                // Short-circuited operators only show the side that decided the result.
                if !matches!(**right, EvaluationTrace::NotEvaluated) {
                    let right_str = Self::format_recursive(right, current_precedence + 1);
                    result.push_str(&format!(
                        "{} {} {} [{}]",
                        left_str,
                        op_symbol,
                        right_str,
                        Self::format_value(outcome)
                    ));
                } else {
                    result.push_str(&left_str);
                }
            }
            EvaluationTrace::UnaryOp {
                op_symbol,
                child,
                outcome,
            } => {
                let child_str = Self::format_recursive(child, current_precedence);
                result.push_str(&format!(
                    "{}{} [{}]",
                    op_symbol,
                    child_str,
                    Self::format_value(outcome)
                ));
            }
            EvaluationTrace::Leaf { value } => result.push_str(&Self::format_value(value)),
            EvaluationTrace::NotEvaluated => {}
        }

        if needs_parens {
            result.push(')');
        }
        result
    }

    /// Format a value for display, quoting strings so they stay distinguishable.
    fn format_value(value: &Value) -> String {
        match value {
            Value::Str(s) => format!("{:?}", s),
            other => other.to_string(),
        }
    }
}
