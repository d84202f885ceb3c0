use crate::error::FlowError;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a successful walk stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// An output `data` node was executed.
    Completed,
    /// The last executed node had no edge that could be followed.
    Exhausted,
    /// The iteration cap was reached with a node still pending.
    CappedOut,
    /// The next node had already been executed in this run.
    RevisitStopped,
}

impl Termination {
    /// True when the walk stopped on its own rather than being cut short.
    pub fn is_natural(&self) -> bool {
        matches!(self, Termination::Completed | Termination::Exhausted)
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Termination::Completed => "completed",
            Termination::Exhausted => "exhausted",
            Termination::CappedOut => "capped_out",
            Termination::RevisitStopped => "revisit_stopped",
        };
        write!(f, "{}", name)
    }
}

/// The result of a successful flow execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub termination: Termination,
    /// Output of the last executed node.
    pub output: String,
    /// Node ids in the order they were executed.
    pub execution_path: Vec<String>,
    pub node_outputs: AHashMap<String, String>,
    pub iterations: usize,
}

/// Lifecycle status callers record for an execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Completed,
    Failed,
}

/// The JSON body HTTP handlers return for an execution request.
///
/// Serializes to `{success: true, output, execution_path, node_outputs, termination}`
/// or `{success: false, error}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_path: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_outputs: Option<AHashMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub termination: Option<Termination>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionResponse {
    pub fn status(&self) -> ExecutionStatus {
        if self.success {
            ExecutionStatus::Completed
        } else {
            ExecutionStatus::Failed
        }
    }
}

impl From<ExecutionReport> for ExecutionResponse {
    fn from(report: ExecutionReport) -> Self {
        Self {
            success: true,
            output: Some(report.output),
            execution_path: Some(report.execution_path),
            node_outputs: Some(report.node_outputs),
            termination: Some(report.termination),
            error: None,
        }
    }
}

impl From<FlowError> for ExecutionResponse {
    fn from(error: FlowError) -> Self {
        Self {
            success: false,
            output: None,
            execution_path: None,
            node_outputs: None,
            termination: None,
            error: Some(error.to_string()),
        }
    }
}

impl From<Result<ExecutionReport, FlowError>> for ExecutionResponse {
    fn from(result: Result<ExecutionReport, FlowError>) -> Self {
        match result {
            Ok(report) => report.into(),
            Err(error) => error.into(),
        }
    }
}
