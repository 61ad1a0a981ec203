use crate::ast::{EvaluationTrace, Expression, Value};
use std::cmp::Ordering;

// This macro generates a match arm for a binary operation.
macro_rules! eval_op {
    ($self:ident, $l:ident, $r:ident, $op_str:expr, $op_fn:expr, number) => {
        $self.eval_binary($l, $r, $op_str, |a, b| Value::Number($op_fn(a.to_number(), b.to_number())))
    };
    ($self:ident, $l:ident, $r:ident, $op_str:expr, $op_fn:expr, relation) => {
        $self.eval_binary($l, $r, $op_str, |a, b| Value::Bool(compare(a, b).is_some_and($op_fn)))
    };
    ($self:ident, $l:ident, $r:ident, $op_str:expr, $op_fn:expr, equality) => {
        $self.eval_binary($l, $r, $op_str, |a, b| Value::Bool($op_fn(a, b)))
    };
}

/// The recursive engine for evaluating a parsed condition.
///
/// Evaluation itself cannot fail: every operator coerces its operands, so the only
/// failures a condition can hit happen while it is being parsed.
pub(super) struct AstEngine<'a> {
    expression: &'a Expression,
}

impl<'a> AstEngine<'a> {
    pub(super) fn new(expression: &'a Expression) -> Self {
        Self { expression }
    }

    /// Evaluates the AST and returns a trace of the execution.
    pub(super) fn evaluate(&self) -> EvaluationTrace {
        self.evaluate_recursive(self.expression)
    }

    fn evaluate_recursive(&self, expr: &Expression) -> EvaluationTrace {
        match expr {
            // --- Arithmetic Operations ---
            Expression::Sum(l, r) => self.eval_binary(l, r, "+", add),
            Expression::Subtract(l, r) => eval_op!(self, l, r, "-", |a, b| a - b, number),
            Expression::Multiply(l, r) => eval_op!(self, l, r, "*", |a, b| a * b, number),
            Expression::Divide(l, r) => eval_op!(self, l, r, "/", |a, b| a / b, number),
            Expression::Negate(v) => {
                self.eval_unary(v, "-", |value| Value::Number(-value.to_number()))
            }
            Expression::Plus(v) => self.eval_unary(v, "+", |value| Value::Number(value.to_number())),

            // --- Comparison Operations ---
            Expression::GreaterThan(l, r) => {
                eval_op!(self, l, r, ">", |o| o == Ordering::Greater, relation)
            }
            Expression::SmallerThan(l, r) => {
                eval_op!(self, l, r, "<", |o| o == Ordering::Less, relation)
            }
            Expression::GreaterThanOrEqual(l, r) => {
                eval_op!(self, l, r, ">=", |o| o != Ordering::Less, relation)
            }
            Expression::SmallerThanOrEqual(l, r) => {
                eval_op!(self, l, r, "<=", |o| o != Ordering::Greater, relation)
            }

            // --- Equality ---
            Expression::Equal(l, r) => eval_op!(self, l, r, "==", loose_equals, equality),
            Expression::NotEqual(l, r) => {
                eval_op!(self, l, r, "!=", |a, b| !loose_equals(a, b), equality)
            }
            Expression::StrictEqual(l, r) => eval_op!(self, l, r, "===", strict_equals, equality),
            Expression::StrictNotEqual(l, r) => {
                eval_op!(self, l, r, "!==", |a, b| !strict_equals(a, b), equality)
            }

            // --- Logical Operations ---
            // `&&` and `||` yield one of their operands, not a coerced boolean.
            Expression::And(l, r) => {
                let left_trace = self.evaluate_recursive(l);
                let left_value = left_trace.get_outcome();
                if !left_value.is_truthy() {
                    return EvaluationTrace::BinaryOp {
                        op_symbol: "&&",
                        left: Box::new(left_trace),
                        right: Box::new(EvaluationTrace::NotEvaluated),
                        outcome: left_value,
                    };
                }
                let right_trace = self.evaluate_recursive(r);
                let outcome = right_trace.get_outcome();
                EvaluationTrace::BinaryOp {
                    op_symbol: "&&",
                    left: Box::new(left_trace),
                    right: Box::new(right_trace),
                    outcome,
                }
            }
            Expression::Or(l, r) => {
                let left_trace = self.evaluate_recursive(l);
                let left_value = left_trace.get_outcome();
                if left_value.is_truthy() {
                    return EvaluationTrace::BinaryOp {
                        op_symbol: "||",
                        left: Box::new(left_trace),
                        right: Box::new(EvaluationTrace::NotEvaluated),
                        outcome: left_value,
                    };
                }
                let right_trace = self.evaluate_recursive(r);
                let outcome = right_trace.get_outcome();
                EvaluationTrace::BinaryOp {
                    op_symbol: "||",
                    left: Box::new(left_trace),
                    right: Box::new(right_trace),
                    outcome,
                }
            }
            Expression::Not(v) => self.eval_unary(v, "!", |value| Value::Bool(!value.is_truthy())),

            // --- Other Operations ---
            Expression::Sequence(l, r) => self.eval_binary(l, r, ",", |_, b| b.clone()),
            Expression::Literal(val) => EvaluationTrace::Leaf { value: val.clone() },
        }
    }

    fn eval_binary<F>(&self, l: &Expression, r: &Expression, op: &'static str, f: F) -> EvaluationTrace
    where
        F: Fn(&Value, &Value) -> Value,
    {
        let left_trace = self.evaluate_recursive(l);
        let right_trace = self.evaluate_recursive(r);
        let outcome = f(&left_trace.get_outcome(), &right_trace.get_outcome());
        EvaluationTrace::BinaryOp {
            op_symbol: op,
            left: Box::new(left_trace),
            right: Box::new(right_trace),
            outcome,
        }
    }

    fn eval_unary<F>(&self, v: &Expression, op: &'static str, f: F) -> EvaluationTrace
    where
        F: Fn(&Value) -> Value,
    {
        let child_trace = self.evaluate_recursive(v);
        let outcome = f(&child_trace.get_outcome());
        EvaluationTrace::UnaryOp {
            op_symbol: op,
            child: Box::new(child_trace),
            outcome,
        }
    }
}

/// `+` concatenates as soon as either side is a string, and adds otherwise.
fn add(a: &Value, b: &Value) -> Value {
    match (a, b) {
        (Value::Str(_), _) | (_, Value::Str(_)) => Value::Str(format!("{}{}", a, b)),
        _ => Value::Number(a.to_number() + b.to_number()),
    }
}

/// Two strings compare lexicographically; anything else compares numerically.
/// `None` means the operands are unordered (a NaN was involved).
fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Str(x), Value::Str(y)) => Some(x.cmp(y)),
        _ => a.to_number().partial_cmp(&b.to_number()),
    }
}

fn strict_equals(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x == y,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Str(x), Value::Str(y)) => x == y,
        (Value::Null, Value::Null) => true,
        _ => false,
    }
}

fn loose_equals(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::Bool(_), _) => loose_equals(&Value::Number(a.to_number()), b),
        (_, Value::Bool(_)) => loose_equals(a, &Value::Number(b.to_number())),
        (Value::Number(x), Value::Str(_)) => *x == b.to_number(),
        (Value::Str(_), Value::Number(y)) => a.to_number() == *y,
        _ => strict_equals(a, b),
    }
}
