//! Compiles `logic` node condition strings into an [`Expression`] tree.

use crate::ast::Expression;
use crate::error::ConditionError;

mod lexer;
mod parser;

pub use parser::MAX_NESTING_DEPTH;
use parser::Parser;

/// Compiles a condition such as `length > 10 and 'urgente' in input` into an AST.
///
/// Only the names `input` and `length` and the builtins `len`, `str`, `int`,
/// `float` and `bool` are available; anything else is rejected at compile time.
pub fn compile_condition(source: &str) -> Result<Expression, ConditionError> {
    let tokens = lexer::tokenize(source)?;
    Parser::new(tokens).parse()
}
