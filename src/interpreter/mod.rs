use crate::ast::{EvaluationTrace, Expression, Value};
use crate::compiler::compile_condition;
use crate::error::ConditionError;
use crate::trace::TraceFormatter;
use std::fmt;

mod engine;

/// The result of running a condition against one input.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionOutcome {
    /// The raw value the expression produced.
    pub value: Value,
    /// Truthiness of `value`.
    pub passed: bool,
    /// Human readable explanation, e.g. `$length (was 12) > 10`.
    pub reason: String,
}

/// A compiled `logic` node condition, ready to be evaluated against node inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    source: String,
    expression: Expression,
}

impl Condition {
    pub fn compile(source: &str) -> Result<Self, ConditionError> {
        Ok(Self {
            source: source.to_string(),
            expression: compile_condition(source)?,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    /// Evaluates the condition with `input` bound to the given string.
    pub fn evaluate(&self, input: &str) -> Result<ConditionOutcome, ConditionError> {
        let trace = self.trace(input)?;
        let value = trace.get_outcome();
        Ok(ConditionOutcome {
            passed: value.is_truthy(),
            reason: TraceFormatter::format_trace(&trace),
            value,
        })
    }

    /// Evaluates the condition and returns the full evaluation trace.
    pub fn trace(&self, input: &str) -> Result<EvaluationTrace, ConditionError> {
        engine::AstEngine::new(&self.expression, input).evaluate()
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expression)
    }
}
