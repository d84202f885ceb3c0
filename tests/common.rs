//! Common test utilities for building flow definitions and runners.
use flowrunner::prelude::*;
use serde_json::json;
use std::sync::{Arc, Mutex};

/// Builds a `data` node with the given `dataType`.
#[allow(dead_code)]
pub fn data_node(id: &str, data_type: &str) -> FlowNode {
    node(id, "data", json!({ "dataType": data_type }))
}

/// Builds a `logic/if` node.
#[allow(dead_code)]
pub fn logic_node(id: &str, condition: &str) -> FlowNode {
    node(
        id,
        "logic",
        json!({ "conditionType": "if", "condition": condition }),
    )
}

/// Builds an `agent` node with an OpenAI provider.
#[allow(dead_code)]
pub fn agent_node(id: &str, agent_type: &str, instructions: &str) -> FlowNode {
    node(
        id,
        "agent",
        json!({
            "agentType": agent_type,
            "provider": "openai",
            "model": "gpt-4o-mini",
            "temperature": 0.2,
            "instructions": instructions,
        }),
    )
}

#[allow(dead_code)]
pub fn node(id: &str, node_type: &str, data: serde_json::Value) -> FlowNode {
    FlowNode {
        id: id.to_string(),
        node_type: node_type.to_string(),
        data: data.as_object().cloned().unwrap_or_default(),
    }
}

#[allow(dead_code)]
pub fn edge(id: &str, source: &str, target: &str) -> FlowEdge {
    FlowEdge {
        id: id.to_string(),
        source: source.to_string(),
        target: target.to_string(),
    }
}

/// Input -> Output.
#[allow(dead_code)]
pub fn create_passthrough_flow() -> FlowDefinition {
    FlowDefinition {
        nodes: vec![data_node("in", "input"), data_node("out", "output")],
        edges: vec![edge("e1", "in", "out")],
    }
}

/// Input -> logic(`condition`) -> "yes" output on the true edge, "no" output on the false edge.
#[allow(dead_code)]
pub fn create_branching_flow(condition: &str) -> FlowDefinition {
    FlowDefinition {
        nodes: vec![
            data_node("in", "input"),
            logic_node("check", condition),
            data_node("yes", "output"),
            data_node("no", "output"),
        ],
        edges: vec![
            edge("e1", "in", "check"),
            edge("check-true", "check", "yes"),
            edge("check-false", "check", "no"),
        ],
    }
}

/// Input -> agent -> Output.
#[allow(dead_code)]
pub fn create_agent_flow(agent_type: &str) -> FlowDefinition {
    FlowDefinition {
        nodes: vec![
            data_node("in", "input"),
            agent_node("agent", agent_type, "Resuma o texto."),
            data_node("out", "output"),
        ],
        edges: vec![edge("e1", "in", "agent"), edge("e2", "agent", "out")],
    }
}

/// Runner that records every request and answers with a fixed reply.
#[allow(dead_code)]
#[derive(Clone, Default)]
pub struct RecordingRunner {
    pub reply: String,
    pub requests: Arc<Mutex<Vec<AgentRequest>>>,
}

#[allow(dead_code)]
impl RecordingRunner {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            requests: Arc::default(),
        }
    }

    pub fn recorded(&self) -> Vec<AgentRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl AgentRunner for RecordingRunner {
    fn invoke(&self, request: &AgentRequest) -> std::result::Result<String, AgentError> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(self.reply.clone())
    }
}
