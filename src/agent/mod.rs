//! The boundary between the executor and whatever answers `agent` nodes.

use crate::error::AgentError;
use serde::{Deserialize, Serialize};

mod prompt;

pub use prompt::AgentKind;

/// Everything an external AI service needs to answer one agent node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRequest {
    pub prompt: String,
    pub provider: String,
    pub model: String,
    pub temperature: f64,
}

/// Capability injected into the executor to answer `agent` nodes.
///
/// Implementations own their networking, rate limiting and retries; the executor
/// calls `invoke` once per agent node and treats any error as fatal for the run.
pub trait AgentRunner: Send + Sync {
    fn invoke(&self, request: &AgentRequest) -> Result<String, AgentError>;
}

impl<F> AgentRunner for F
where
    F: Fn(&AgentRequest) -> Result<String, AgentError> + Send + Sync,
{
    fn invoke(&self, request: &AgentRequest) -> Result<String, AgentError> {
        self(request)
    }
}

/// Offline runner that answers with the prompt it received.
#[derive(Debug, Default, Clone, Copy)]
pub struct EchoRunner;

impl AgentRunner for EchoRunner {
    fn invoke(&self, request: &AgentRequest) -> Result<String, AgentError> {
        Ok(format!("[Echo] {}", request.prompt))
    }
}

/// Runner for flows that are not expected to contain agent nodes.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoAgentRunner;

impl AgentRunner for NoAgentRunner {
    fn invoke(&self, request: &AgentRequest) -> Result<String, AgentError> {
        Err(AgentError::Provider(format!(
            "Nenhum provedor de IA configurado para '{}'",
            request.provider
        )))
    }
}
