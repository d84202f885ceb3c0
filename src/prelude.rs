//! Prelude module for convenient imports
//!
//! Re-exports the types most callers need to validate and execute flows.
//!
//! # Example
//!
//! ```rust,no_run
//! use flowrunner::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let flow_json = std::fs::read_to_string("path/to/flow.json")?;
//! let raw: serde_json::Value = serde_json::from_str(&flow_json)?;
//!
//! let report = validate(&raw);
//! if !report.valid {
//!     return Err(report.errors.join("; ").into());
//! }
//!
//! let executor = FlowExecutor::builder().with_runner(EchoRunner).build();
//! let response = ExecutionResponse::from(executor.execute_flow(&raw, "olá"));
//! println!("{}", serde_json::to_string_pretty(&response)?);
//! # Ok(())
//! # }
//! ```

// Validation and execution
pub use crate::executor::{
    ExecutionReport, ExecutionResponse, ExecutionStatus, ExecutorConfig, FlowExecutor,
    FlowExecutorBuilder, Termination,
};
pub use crate::flow::{FlowDefinition, FlowEdge, FlowNode, IntoFlow, ValidationReport, validate};

// Agents
pub use crate::agent::{AgentKind, AgentRequest, AgentRunner, EchoRunner, NoAgentRunner};

// Conditions
pub use crate::ast::{EvaluationTrace, Expression, Value};
pub use crate::interpreter::{Condition, ConditionOutcome};
pub use crate::trace::TraceFormatter;

// Error types
pub use crate::error::{AgentError, ConditionError, FlowError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
