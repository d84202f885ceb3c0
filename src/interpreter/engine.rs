use crate::ast::expression::quote;
use crate::ast::{Builtin, EvaluationTrace, Expression, Value};
use crate::error::ConditionError;
use std::cmp::Ordering;

// This macro generates a match arm for a binary operation.
macro_rules! eval_op {
    ($self:ident, $l:ident, $r:ident, $op_str:expr, arithmetic) => {
        $self.eval_arithmetic($l, $r, $op_str)
    };
    ($self:ident, $l:ident, $r:ident, $op_str:expr, $accept:expr, ordering) => {
        $self.eval_ordering($l, $r, $op_str, $accept)
    };
}

/// The core recursive engine for evaluating a condition against a single input string.
pub(super) struct AstEngine<'a> {
    expression: &'a Expression,
    input: &'a str,
}

impl<'a> AstEngine<'a> {
    pub(super) fn new(expression: &'a Expression, input: &'a str) -> Self {
        Self { expression, input }
    }

    /// Evaluates the AST and returns a trace of the execution.
    pub(super) fn evaluate(&self) -> Result<EvaluationTrace, ConditionError> {
        self.evaluate_recursive(self.expression)
    }

    fn evaluate_recursive(&self, expr: &Expression) -> Result<EvaluationTrace, ConditionError> {
        match expr {
            // --- Arithmetic Operations ---
            Expression::Sum(l, r) => eval_op!(self, l, r, "+", arithmetic),
            Expression::Subtract(l, r) => eval_op!(self, l, r, "-", arithmetic),
            Expression::Multiply(l, r) => eval_op!(self, l, r, "*", arithmetic),
            Expression::Divide(l, r) => eval_op!(self, l, r, "/", arithmetic),
            Expression::Modulo(l, r) => eval_op!(self, l, r, "%", arithmetic),
            Expression::Negate(v) => {
                let child_trace = self.evaluate_recursive(v)?;
                let outcome = match child_trace.get_outcome() {
                    Value::Int(n) => n
                        .checked_neg()
                        .map(Value::Int)
                        .unwrap_or(Value::Float(-(n as f64))),
                    Value::Float(n) => Value::Float(-n),
                    Value::Bool(b) => Value::Int(-(b as i64)),
                    val => return Err(type_mismatch("-", "number", val)),
                };
                Ok(EvaluationTrace::UnaryOp {
                    op_symbol: "-",
                    child: Box::new(child_trace),
                    outcome,
                })
            }

            // --- Comparison Operations ---
            Expression::GreaterThan(l, r) => {
                eval_op!(self, l, r, ">", |o| o == Ordering::Greater, ordering)
            }
            Expression::GreaterThanOrEqual(l, r) => {
                eval_op!(self, l, r, ">=", |o| o != Ordering::Less, ordering)
            }
            Expression::SmallerThan(l, r) => {
                eval_op!(self, l, r, "<", |o| o == Ordering::Less, ordering)
            }
            Expression::SmallerThanOrEqual(l, r) => {
                eval_op!(self, l, r, "<=", |o| o != Ordering::Greater, ordering)
            }

            // --- Equality ---
            Expression::Equal(l, r) => {
                let left_trace = self.evaluate_recursive(l)?;
                let right_trace = self.evaluate_recursive(r)?;
                let outcome = Value::Bool(values_equal(
                    &left_trace.get_outcome(),
                    &right_trace.get_outcome(),
                ));
                Ok(EvaluationTrace::BinaryOp {
                    op_symbol: "==",
                    left: Box::new(left_trace),
                    right: Box::new(right_trace),
                    outcome,
                })
            }
            Expression::NotEqual(l, r) => {
                let left_trace = self.evaluate_recursive(l)?;
                let right_trace = self.evaluate_recursive(r)?;
                let outcome = Value::Bool(!values_equal(
                    &left_trace.get_outcome(),
                    &right_trace.get_outcome(),
                ));
                Ok(EvaluationTrace::BinaryOp {
                    op_symbol: "!=",
                    left: Box::new(left_trace),
                    right: Box::new(right_trace),
                    outcome,
                })
            }

            // --- Membership ---
            Expression::In(l, r) => self.eval_membership(l, r, "in", false),
            Expression::NotIn(l, r) => self.eval_membership(l, r, "not in", true),

            // --- Logical Operations ---
            Expression::And(l, r) => {
                let left_trace = self.evaluate_recursive(l)?;
                let left_value = left_trace.get_outcome();
                if !left_value.is_truthy() {
                    return Ok(EvaluationTrace::BinaryOp {
                        op_symbol: "and",
                        left: Box::new(left_trace),
                        right: Box::new(EvaluationTrace::NotEvaluated),
                        outcome: left_value,
                    });
                }
                let right_trace = self.evaluate_recursive(r)?;
                let outcome = right_trace.get_outcome();
                Ok(EvaluationTrace::BinaryOp {
                    op_symbol: "and",
                    left: Box::new(left_trace),
                    right: Box::new(right_trace),
                    outcome,
                })
            }
            Expression::Or(l, r) => {
                let left_trace = self.evaluate_recursive(l)?;
                let left_value = left_trace.get_outcome();
                if left_value.is_truthy() {
                    return Ok(EvaluationTrace::BinaryOp {
                        op_symbol: "or",
                        left: Box::new(left_trace),
                        right: Box::new(EvaluationTrace::NotEvaluated),
                        outcome: left_value,
                    });
                }
                let right_trace = self.evaluate_recursive(r)?;
                let outcome = right_trace.get_outcome();
                Ok(EvaluationTrace::BinaryOp {
                    op_symbol: "or",
                    left: Box::new(left_trace),
                    right: Box::new(right_trace),
                    outcome,
                })
            }
            Expression::Not(v) => {
                let child_trace = self.evaluate_recursive(v)?;
                let outcome = Value::Bool(!child_trace.get_outcome().is_truthy());
                Ok(EvaluationTrace::UnaryOp {
                    op_symbol: "not",
                    child: Box::new(child_trace),
                    outcome,
                })
            }

            // --- Calls and leaves ---
            Expression::Call(builtin, argument) => {
                let argument_trace = self.evaluate_recursive(argument)?;
                let outcome = call_builtin(*builtin, argument_trace.get_outcome())?;
                Ok(EvaluationTrace::Call {
                    function: builtin.name(),
                    argument: Box::new(argument_trace),
                    outcome,
                })
            }
            Expression::Length => Ok(EvaluationTrace::Leaf {
                source: "$length".to_string(),
                value: Value::Int(self.input.chars().count() as i64),
            }),
            Expression::Input => Ok(EvaluationTrace::Leaf {
                source: "$input".to_string(),
                value: Value::Str(self.input.to_string()),
            }),
            Expression::Literal(val) => Ok(EvaluationTrace::Leaf {
                source: match val {
                    Value::Str(s) => quote(s),
                    other => other.to_string(),
                },
                value: val.clone(),
            }),
        }
    }

    fn eval_arithmetic(
        &self,
        l: &Expression,
        r: &Expression,
        op: &'static str,
    ) -> Result<EvaluationTrace, ConditionError> {
        let left_trace = self.evaluate_recursive(l)?;
        let right_trace = self.evaluate_recursive(r)?;
        let outcome = arithmetic(op, left_trace.get_outcome(), right_trace.get_outcome())?;
        Ok(EvaluationTrace::BinaryOp {
            op_symbol: op,
            left: Box::new(left_trace),
            right: Box::new(right_trace),
            outcome,
        })
    }

    fn eval_ordering<F>(
        &self,
        l: &Expression,
        r: &Expression,
        op: &'static str,
        accept: F,
    ) -> Result<EvaluationTrace, ConditionError>
    where
        F: Fn(Ordering) -> bool,
    {
        let left_trace = self.evaluate_recursive(l)?;
        let right_trace = self.evaluate_recursive(r)?;
        let left_value = left_trace.get_outcome();
        let right_value = right_trace.get_outcome();

        let ordering = match (&left_value, &right_value) {
            (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
            _ => match (left_value.as_number(), right_value.as_number()) {
                (Some(a), Some(b)) => a.partial_cmp(&b),
                (Some(_), None) => return Err(type_mismatch(op, "number", right_value)),
                (None, _) => {
                    let expected = if matches!(right_value, Value::Str(_)) {
                        "str"
                    } else {
                        "number"
                    };
                    return Err(type_mismatch(op, expected, left_value));
                }
            },
        };

        // NaN compares false against everything.
        let outcome = Value::Bool(ordering.is_some_and(accept));
        Ok(EvaluationTrace::BinaryOp {
            op_symbol: op,
            left: Box::new(left_trace),
            right: Box::new(right_trace),
            outcome,
        })
    }

    fn eval_membership(
        &self,
        l: &Expression,
        r: &Expression,
        op: &'static str,
        negate: bool,
    ) -> Result<EvaluationTrace, ConditionError> {
        let left_trace = self.evaluate_recursive(l)?;
        let right_trace = self.evaluate_recursive(r)?;
        let found = match (left_trace.get_outcome(), right_trace.get_outcome()) {
            (Value::Str(needle), Value::Str(haystack)) => haystack.contains(&needle),
            (Value::Str(_), other) => return Err(type_mismatch(op, "str", other)),
            (other, _) => return Err(type_mismatch(op, "str", other)),
        };
        Ok(EvaluationTrace::BinaryOp {
            op_symbol: op,
            left: Box::new(left_trace),
            right: Box::new(right_trace),
            outcome: Value::Bool(found != negate),
        })
    }
}

fn type_mismatch(op: &str, expected: &str, found: Value) -> ConditionError {
    ConditionError::TypeMismatch {
        operation: op.to_string(),
        expected: expected.to_string(),
        found,
    }
}

/// Equality across types: numbers (and booleans) compare numerically, strings by
/// content, `None` only to itself. Anything else is unequal.
fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Str(a), Value::Str(b)) => a == b,
        (Value::None, Value::None) => true,
        _ => match (left.as_number(), right.as_number()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        },
    }
}

fn arithmetic(op: &'static str, left: Value, right: Value) -> Result<Value, ConditionError> {
    if op == "+" {
        if let (Value::Str(a), Value::Str(b)) = (&left, &right) {
            return Ok(Value::Str(format!("{}{}", a, b)));
        }
    }

    if let (Some(a), Some(b)) = (left.as_int(), right.as_int()) {
        return int_arithmetic(op, a, b);
    }

    match (left.as_number(), right.as_number()) {
        (Some(a), Some(b)) => float_arithmetic(op, a, b),
        (Some(_), None) => Err(type_mismatch(op, "number", right)),
        (None, _) => Err(type_mismatch(op, "number", left)),
    }
}

fn int_arithmetic(op: &'static str, a: i64, b: i64) -> Result<Value, ConditionError> {
    let checked = match op {
        "+" => a.checked_add(b),
        "-" => a.checked_sub(b),
        "*" => a.checked_mul(b),
        "/" => return float_arithmetic(op, a as f64, b as f64),
        "%" => {
            if b == 0 {
                return Err(ConditionError::DivisionByZero);
            }
            // Result takes the sign of the divisor.
            a.checked_rem(b).map(|rem| if rem != 0 && (rem < 0) != (b < 0) { rem + b } else { rem })
        }
        _ => None,
    };
    match checked {
        Some(n) => Ok(Value::Int(n)),
        None => float_arithmetic(op, a as f64, b as f64),
    }
}

fn float_arithmetic(op: &'static str, a: f64, b: f64) -> Result<Value, ConditionError> {
    let value = match op {
        "+" => a + b,
        "-" => a - b,
        "*" => a * b,
        "/" => {
            if b == 0.0 {
                return Err(ConditionError::DivisionByZero);
            }
            a / b
        }
        "%" => {
            if b == 0.0 {
                return Err(ConditionError::DivisionByZero);
            }
            a - b * (a / b).floor()
        }
        _ => return Err(type_mismatch(op, "arithmetic operator", Value::Float(b))),
    };
    Ok(Value::Float(value))
}

fn call_builtin(builtin: Builtin, argument: Value) -> Result<Value, ConditionError> {
    let invalid = |value: &str| ConditionError::InvalidConversion {
        function: builtin.name().to_string(),
        value: value.to_string(),
    };

    match builtin {
        Builtin::Len => match argument {
            Value::Str(s) => Ok(Value::Int(s.chars().count() as i64)),
            other => Err(type_mismatch("len", "str", other)),
        },
        Builtin::Str => Ok(Value::Str(argument.to_string())),
        Builtin::Bool => Ok(Value::Bool(argument.is_truthy())),
        Builtin::Int => match argument {
            Value::Int(n) => Ok(Value::Int(n)),
            Value::Bool(b) => Ok(Value::Int(b as i64)),
            Value::Float(n) if (i64::MIN as f64..i64::MAX as f64).contains(&n.trunc()) => {
                Ok(Value::Int(n.trunc() as i64))
            }
            Value::Float(n) => Err(invalid(&Value::Float(n).to_string())),
            Value::Str(s) => s
                .trim()
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| invalid(&s)),
            Value::None => Err(type_mismatch("int", "str or number", Value::None)),
        },
        Builtin::Float => match argument {
            Value::Str(s) => s
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| invalid(&s)),
            Value::None => Err(type_mismatch("float", "str or number", Value::None)),
            other => other
                .as_number()
                .map(Value::Float)
                .ok_or_else(|| invalid(&other.to_string())),
        },
    }
}
