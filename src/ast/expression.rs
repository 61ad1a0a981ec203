use super::Value;
use std::fmt;

/// The Abstract Syntax Tree of a parsed condition expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    // Arithmetic
    Sum(Box<Expression>, Box<Expression>),
    Subtract(Box<Expression>, Box<Expression>),
    Multiply(Box<Expression>, Box<Expression>),
    Divide(Box<Expression>, Box<Expression>),
    Negate(Box<Expression>),
    Plus(Box<Expression>),

    // Logical
    Not(Box<Expression>),
    And(Box<Expression>, Box<Expression>),
    Or(Box<Expression>, Box<Expression>),

    // Comparison
    Equal(Box<Expression>, Box<Expression>),
    NotEqual(Box<Expression>, Box<Expression>),
    StrictEqual(Box<Expression>, Box<Expression>),
    StrictNotEqual(Box<Expression>, Box<Expression>),
    GreaterThan(Box<Expression>, Box<Expression>),
    GreaterThanOrEqual(Box<Expression>, Box<Expression>),
    SmallerThan(Box<Expression>, Box<Expression>),
    SmallerThanOrEqual(Box<Expression>, Box<Expression>),

    /// `a, b`: evaluates both operands and yields the right one.
    Sequence(Box<Expression>, Box<Expression>),

    // Leaf nodes
    Literal(Value),
}

impl Expression {
    /// Binding strength of the operator at the root of this expression.
    /// Higher numbers bind more tightly.
    pub fn precedence(&self) -> u8 {
        match self {
            Expression::Sequence(_, _) => 0,
            Expression::Or(_, _) => 1,
            Expression::And(_, _) => 2,
            Expression::Equal(_, _)
            | Expression::NotEqual(_, _)
            | Expression::StrictEqual(_, _)
            | Expression::StrictNotEqual(_, _) => 3,
            Expression::GreaterThan(_, _)
            | Expression::GreaterThanOrEqual(_, _)
            | Expression::SmallerThan(_, _)
            | Expression::SmallerThanOrEqual(_, _) => 4,
            Expression::Sum(_, _) | Expression::Subtract(_, _) => 5,
            Expression::Multiply(_, _) | Expression::Divide(_, _) => 6,
            Expression::Not(_) | Expression::Negate(_) | Expression::Plus(_) => 7,
            Expression::Literal(_) => 8,
        }
    }

    /// Counts the nodes in the tree.
    pub fn node_count(&self) -> usize {
        match self {
            Expression::Sum(l, r)
            | Expression::Subtract(l, r)
            | Expression::Multiply(l, r)
            | Expression::Divide(l, r)
            | Expression::And(l, r)
            | Expression::Or(l, r)
            | Expression::Equal(l, r)
            | Expression::NotEqual(l, r)
            | Expression::StrictEqual(l, r)
            | Expression::StrictNotEqual(l, r)
            | Expression::GreaterThan(l, r)
            | Expression::GreaterThanOrEqual(l, r)
            | Expression::SmallerThan(l, r)
            | Expression::SmallerThanOrEqual(l, r)
            | Expression::Sequence(l, r) => 1 + l.node_count() + r.node_count(),
            Expression::Negate(v) | Expression::Plus(v) | Expression::Not(v) => 1 + v.node_count(),
            Expression::Literal(_) => 1,
        }
    }

    fn fmt_with_precedence(&self, f: &mut fmt::Formatter<'_>, parent_precedence: u8) -> fmt::Result {
        let current = self.precedence();
        let needs_parens = current < parent_precedence;
        if needs_parens {
            write!(f, "(")?;
        }

        match self {
            Expression::Literal(Value::Str(s)) => write!(f, "{:?}", s)?,
            Expression::Literal(v) => write!(f, "{}", v)?,
            Expression::Not(v) => {
                write!(f, "!")?;
                v.fmt_with_precedence(f, current)?;
            }
            Expression::Negate(v) => {
                write!(f, "-")?;
                v.fmt_with_precedence(f, current)?;
            }
            Expression::Plus(v) => {
                write!(f, "+")?;
                v.fmt_with_precedence(f, current)?;
            }
            Expression::Sequence(l, r) => {
                l.fmt_with_precedence(f, current)?;
                write!(f, ", ")?;
                r.fmt_with_precedence(f, current + 1)?;
            }
            Expression::Sum(l, r) => self.fmt_binary(f, "+", l, r, current)?,
            Expression::Subtract(l, r) => self.fmt_binary(f, "-", l, r, current)?,
            Expression::Multiply(l, r) => self.fmt_binary(f, "*", l, r, current)?,
            Expression::Divide(l, r) => self.fmt_binary(f, "/", l, r, current)?,
            Expression::And(l, r) => self.fmt_binary(f, "&&", l, r, current)?,
            Expression::Or(l, r) => self.fmt_binary(f, "||", l, r, current)?,
            Expression::Equal(l, r) => self.fmt_binary(f, "==", l, r, current)?,
            Expression::NotEqual(l, r) => self.fmt_binary(f, "!=", l, r, current)?,
            Expression::StrictEqual(l, r) => self.fmt_binary(f, "===", l, r, current)?,
            Expression::StrictNotEqual(l, r) => self.fmt_binary(f, "!==", l, r, current)?,
            Expression::GreaterThan(l, r) => self.fmt_binary(f, ">", l, r, current)?,
            Expression::GreaterThanOrEqual(l, r) => self.fmt_binary(f, ">=", l, r, current)?,
            Expression::SmallerThan(l, r) => self.fmt_binary(f, "<", l, r, current)?,
            Expression::SmallerThanOrEqual(l, r) => self.fmt_binary(f, "<=", l, r, current)?,
        }

        if needs_parens {
            write!(f, ")")?;
        }
        Ok(())
    }

    fn fmt_binary(
        &self,
        f: &mut fmt::Formatter<'_>,
        op: &str,
        l: &Expression,
        r: &Expression,
        precedence: u8,
    ) -> fmt::Result {
        // Operators are left-associative, so a right operand of equal strength needs parens.
        l.fmt_with_precedence(f, precedence)?;
        write!(f, " {} ", op)?;
        r.fmt_with_precedence(f, precedence + 1)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_with_precedence(f, 0)
    }
}
