use super::{Builtin, Value};
use std::fmt;

/// The Abstract Syntax Tree of a compiled `logic` node condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    // Arithmetic
    Sum(Box<Expression>, Box<Expression>),
    Subtract(Box<Expression>, Box<Expression>),
    Multiply(Box<Expression>, Box<Expression>),
    Divide(Box<Expression>, Box<Expression>),
    Modulo(Box<Expression>, Box<Expression>),
    Negate(Box<Expression>),

    // Logical
    Not(Box<Expression>),
    And(Box<Expression>, Box<Expression>),
    Or(Box<Expression>, Box<Expression>),

    // Comparison
    Equal(Box<Expression>, Box<Expression>),
    NotEqual(Box<Expression>, Box<Expression>),
    GreaterThan(Box<Expression>, Box<Expression>),
    GreaterThanOrEqual(Box<Expression>, Box<Expression>),
    SmallerThan(Box<Expression>, Box<Expression>),
    SmallerThanOrEqual(Box<Expression>, Box<Expression>),
    /// `needle in haystack`
    In(Box<Expression>, Box<Expression>),
    /// `needle not in haystack`
    NotIn(Box<Expression>, Box<Expression>),

    // Calls and leaves
    Call(Builtin, Box<Expression>),
    /// Shorthand for `len(str(input))`.
    Length,
    Literal(Value),
    Input,
}

impl Expression {
    /// Gets the precedence level for an expression type. Higher numbers bind more tightly.
    pub(crate) fn precedence(&self) -> u8 {
        match self {
            Expression::Or(_, _) => 1,
            Expression::And(_, _) => 2,
            Expression::Not(_) => 3,
            Expression::Equal(_, _)
            | Expression::NotEqual(_, _)
            | Expression::GreaterThan(_, _)
            | Expression::GreaterThanOrEqual(_, _)
            | Expression::SmallerThan(_, _)
            | Expression::SmallerThanOrEqual(_, _)
            | Expression::In(_, _)
            | Expression::NotIn(_, _) => 4,
            Expression::Sum(_, _) | Expression::Subtract(_, _) => 5,
            Expression::Multiply(_, _) | Expression::Divide(_, _) | Expression::Modulo(_, _) => 6,
            Expression::Negate(_) => 7,
            Expression::Call(_, _)
            | Expression::Length
            | Expression::Literal(_)
            | Expression::Input => 8,
        }
    }

    /// Returns true if the expression reads the node input anywhere.
    pub fn reads_input(&self) -> bool {
        match self {
            Expression::Input | Expression::Length => true,
            Expression::Literal(_) => false,
            Expression::Negate(v) | Expression::Not(v) | Expression::Call(_, v) => v.reads_input(),
            Expression::Sum(l, r)
            | Expression::Subtract(l, r)
            | Expression::Multiply(l, r)
            | Expression::Divide(l, r)
            | Expression::Modulo(l, r)
            | Expression::And(l, r)
            | Expression::Or(l, r)
            | Expression::Equal(l, r)
            | Expression::NotEqual(l, r)
            | Expression::GreaterThan(l, r)
            | Expression::GreaterThanOrEqual(l, r)
            | Expression::SmallerThan(l, r)
            | Expression::SmallerThanOrEqual(l, r)
            | Expression::In(l, r)
            | Expression::NotIn(l, r) => l.reads_input() || r.reads_input(),
        }
    }

    /// True when the tree is taller than `limit` levels. Recursion stops at the
    /// limit, so this is safe to call on trees of any height.
    pub(crate) fn depth_exceeds(&self, limit: usize) -> bool {
        let Some(below) = limit.checked_sub(1) else {
            return true;
        };
        match self {
            Expression::Input | Expression::Length | Expression::Literal(_) => false,
            Expression::Negate(v) | Expression::Not(v) | Expression::Call(_, v) => {
                v.depth_exceeds(below)
            }
            Expression::Sum(l, r)
            | Expression::Subtract(l, r)
            | Expression::Multiply(l, r)
            | Expression::Divide(l, r)
            | Expression::Modulo(l, r)
            | Expression::And(l, r)
            | Expression::Or(l, r)
            | Expression::Equal(l, r)
            | Expression::NotEqual(l, r)
            | Expression::GreaterThan(l, r)
            | Expression::GreaterThanOrEqual(l, r)
            | Expression::SmallerThan(l, r)
            | Expression::SmallerThanOrEqual(l, r)
            | Expression::In(l, r)
            | Expression::NotIn(l, r) => l.depth_exceeds(below) || r.depth_exceeds(below),
        }
    }

    /// Recursively formats the expression, adding parentheses only when necessary.
    fn fmt_with_precedence(&self, f: &mut fmt::Formatter<'_>, parent_precedence: u8) -> fmt::Result {
        let current_precedence = self.precedence();
        let needs_parens = current_precedence < parent_precedence;

        if needs_parens {
            write!(f, "(")?;
        }

        match self {
            Expression::Or(l, r) => Self::fmt_binary(f, "or", l, r, current_precedence)?,
            Expression::And(l, r) => Self::fmt_binary(f, "and", l, r, current_precedence)?,
            Expression::Equal(l, r) => Self::fmt_binary(f, "==", l, r, current_precedence)?,
            Expression::NotEqual(l, r) => Self::fmt_binary(f, "!=", l, r, current_precedence)?,
            Expression::GreaterThan(l, r) => Self::fmt_binary(f, ">", l, r, current_precedence)?,
            Expression::GreaterThanOrEqual(l, r) => {
                Self::fmt_binary(f, ">=", l, r, current_precedence)?
            }
            Expression::SmallerThan(l, r) => Self::fmt_binary(f, "<", l, r, current_precedence)?,
            Expression::SmallerThanOrEqual(l, r) => {
                Self::fmt_binary(f, "<=", l, r, current_precedence)?
            }
            Expression::In(l, r) => Self::fmt_binary(f, "in", l, r, current_precedence)?,
            Expression::NotIn(l, r) => Self::fmt_binary(f, "not in", l, r, current_precedence)?,
            Expression::Sum(l, r) => Self::fmt_binary(f, "+", l, r, current_precedence)?,
            Expression::Subtract(l, r) => Self::fmt_binary(f, "-", l, r, current_precedence)?,
            Expression::Multiply(l, r) => Self::fmt_binary(f, "*", l, r, current_precedence)?,
            Expression::Divide(l, r) => Self::fmt_binary(f, "/", l, r, current_precedence)?,
            Expression::Modulo(l, r) => Self::fmt_binary(f, "%", l, r, current_precedence)?,

            Expression::Not(v) => {
                write!(f, "not ")?;
                v.fmt_with_precedence(f, current_precedence)?;
            }
            Expression::Negate(v) => {
                write!(f, "-")?;
                v.fmt_with_precedence(f, current_precedence)?;
            }
            Expression::Call(function, arg) => {
                write!(f, "{}(", function)?;
                arg.fmt_with_precedence(f, 0)?;
                write!(f, ")")?;
            }

            Expression::Length => write!(f, "length")?,
            Expression::Literal(Value::Str(s)) => write!(f, "{}", quote(s))?,
            Expression::Literal(v) => write!(f, "{}", v)?,
            Expression::Input => write!(f, "input")?,
        }

        if needs_parens {
            write!(f, ")")?;
        }
        Ok(())
    }

    fn fmt_binary(
        f: &mut fmt::Formatter<'_>,
        op: &str,
        l: &Expression,
        r: &Expression,
        current_precedence: u8,
    ) -> fmt::Result {
        // Comparisons do not chain, so a nested comparison on the left keeps its parentheses.
        let left_precedence = if current_precedence == 4 {
            current_precedence + 1
        } else {
            current_precedence
        };
        l.fmt_with_precedence(f, left_precedence)?;
        write!(f, " {} ", op)?;
        // Right operands bind one level tighter so `a - (b - c)` keeps its parentheses.
        r.fmt_with_precedence(f, current_precedence + 1)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_with_precedence(f, 0)
    }
}

/// Renders a string the way it would be written in a condition.
pub(crate) fn quote(s: &str) -> String {
    let escaped = s.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{}'", escaped)
}
