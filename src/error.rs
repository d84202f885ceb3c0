use crate::ast::Value;
use thiserror::Error;

/// Errors that abort a flow execution. Every variant is terminal for the call.
#[derive(Error, Debug, Clone)]
pub enum FlowError {
    #[error("Nó de entrada não encontrado no fluxo.")]
    StartNodeNotFound,

    #[error("Nó {0} não encontrado.")]
    NodeNotFound(String),

    #[error("Tipo de nó desconhecido no nó '{node_id}': {type_name}")]
    UnknownNodeType { node_id: String, type_name: String },

    #[error("Tipo de agente desconhecido no nó '{node_id}': {agent_type}")]
    UnknownAgentType { node_id: String, agent_type: String },

    #[error("Tipo de condição desconhecido no nó '{node_id}': {condition_type}")]
    UnknownConditionType {
        node_id: String,
        condition_type: String,
    },

    #[error("Erro ao avaliar condição no nó '{node_id}': {source}")]
    Condition {
        node_id: String,
        #[source]
        source: ConditionError,
    },

    #[error("Falha do agente no nó '{node_id}': {source}")]
    Agent {
        node_id: String,
        #[source]
        source: AgentError,
    },

    #[error("Fluxo mal formatado: {0}")]
    MalformedFlow(String),
}

/// Errors raised while compiling or evaluating a `logic` node condition.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConditionError {
    #[error("Unexpected character '{character}' at position {position}")]
    UnexpectedCharacter { character: char, position: usize },

    #[error("Unterminated string literal starting at position {0}")]
    UnterminatedString(usize),

    #[error("Invalid numeric literal '{0}'")]
    InvalidLiteral(String),

    #[error("Unexpected token '{found}' at position {position}, expected {expected}")]
    UnexpectedToken {
        found: String,
        expected: String,
        position: usize,
    },

    #[error("Unexpected end of condition, expected {0}")]
    UnexpectedEnd(String),

    #[error("Name '{0}' is not defined")]
    UnknownIdentifier(String),

    #[error("Function '{0}' is not allowed in conditions")]
    UnknownFunction(String),

    #[error("{function}() takes exactly one argument ({found} given)")]
    ArgumentCount { function: String, found: usize },

    #[error(
        "Type mismatch during operation '{operation}': expected {expected}, but found value '{found}'"
    )]
    TypeMismatch {
        operation: String,
        expected: String,
        found: Value,
    },

    #[error("Cannot convert '{value}' with {function}()")]
    InvalidConversion { function: String, value: String },

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Condition is nested more than {limit} levels deep")]
    NestingTooDeep { limit: usize },
}

/// Errors reported by an [`AgentRunner`](crate::agent::AgentRunner).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgentError {
    #[error("{0}")]
    Provider(String),
}
