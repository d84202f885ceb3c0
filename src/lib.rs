//! # flowrunner - Agent Flow Validation and Execution
//!
//! **flowrunner** runs declarative node/edge flows of the kind built in visual
//! flow editors: an input node, a chain of AI agent and logic nodes, and an output
//! node. It validates the raw flow JSON, then walks the graph one node at a time,
//! following conditional edges on the output of `logic` nodes.
//!
//! ## Core Workflow
//!
//! 1.  **Validate**: `validate` checks the raw JSON for missing ids, types, data and
//!     dangling edges, returning a report instead of failing.
//! 2.  **Convert**: turn the JSON into a `FlowDefinition` through the `IntoFlow` trait.
//! 3.  **Execute**: build a `FlowExecutor` with an `AgentRunner` for agent nodes and
//!     run it with the initial input.
//! 4.  **Respond**: convert the outcome into an `ExecutionResponse` for the caller.
//!
//! ## Node types
//!
//! - `data`: `dataType: input` starts the walk with the caller's input,
//!   `dataType: output` ends it and passes the last output through.
//! - `agent`: builds a prompt from `instructions` and the previous output according
//!   to `agentType` (`chatbot`, `analyzer`, `generator`, `langchain_agent`) and calls
//!   the runner.
//! - `logic`: evaluates a `condition` such as `length > 10 and 'urgente' in input`
//!   and outputs `"true"` or `"false"`. Edges whose id contains `true` / `false`
//!   are only followed on the matching outcome.
//!
//! ## Quick Start
//!
//! ```rust
//! use flowrunner::prelude::*;
//! use serde_json::json;
//!
//! let raw = json!({
//!     "nodes": [
//!         {"id": "in", "type": "data", "data": {"dataType": "input"}},
//!         {"id": "check", "type": "logic", "data": {"conditionType": "if", "condition": "length > 5"}},
//!         {"id": "long", "type": "data", "data": {"dataType": "output"}},
//!         {"id": "short", "type": "data", "data": {"dataType": "output"}}
//!     ],
//!     "edges": [
//!         {"id": "e1", "source": "in", "target": "check"},
//!         {"id": "e-true", "source": "check", "target": "long"},
//!         {"id": "e-false", "source": "check", "target": "short"}
//!     ]
//! });
//!
//! let report = validate(&raw);
//! assert!(report.valid);
//!
//! let executor = FlowExecutor::new(EchoRunner);
//! let result = executor.execute_flow(&raw, "hello world").unwrap();
//! assert_eq!(result.termination, Termination::Completed);
//! assert_eq!(result.execution_path, vec!["in", "check", "long"]);
//! ```

pub mod agent;
pub mod ast;
pub mod compiler;
pub mod error;
pub mod executor;
pub mod flow;
pub mod interpreter;
pub mod prelude;
pub mod trace;
