use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// The canonical definition of a flow, ready for execution.
///
/// Node and edge order is significant: the first matching input node starts the
/// walk and outgoing edges are considered in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowDefinition {
    #[serde(default)]
    pub nodes: Vec<FlowNode>,
    #[serde(default)]
    pub edges: Vec<FlowEdge>,
}

/// A single unit of work in a flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowNode {
    #[serde(deserialize_with = "lenient_text")]
    pub id: String,
    /// Kept as text so unknown types surface when the node is dispatched.
    #[serde(rename = "type", deserialize_with = "lenient_text")]
    pub node_type: String,
    #[serde(default)]
    pub data: Map<String, Value>,
}

/// A directed connection between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowEdge {
    #[serde(default, deserialize_with = "lenient_text")]
    pub id: String,
    #[serde(deserialize_with = "lenient_text")]
    pub source: String,
    #[serde(deserialize_with = "lenient_text")]
    pub target: String,
}

/// Accepts any JSON scalar where an id is expected. Strings are taken as-is and
/// anything else keeps its JSON text, so a node `1` is reachable from source `1`.
fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        other => other.to_string(),
    })
}

/// The node types the executor knows how to dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Data,
    Agent,
    Logic,
}

impl FromStr for NodeKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "data" => Ok(NodeKind::Data),
            "agent" => Ok(NodeKind::Agent),
            "logic" => Ok(NodeKind::Logic),
            _ => Err(()),
        }
    }
}

/// Role of a `data` node, taken from its `dataType` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataRole {
    Input,
    Output,
    /// Missing or unrecognised `dataType`; the node passes its input through.
    PassThrough,
}

/// When an edge may be followed, derived from its id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeGate {
    Always,
    WhenTrue,
    WhenFalse,
}

/// Configuration read from an `agent` node's data.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentSettings {
    pub agent_type: Option<String>,
    pub provider: String,
    pub model: String,
    pub temperature: f64,
    pub instructions: String,
}

/// Configuration read from a `logic` node's data.
#[derive(Debug, Clone, PartialEq)]
pub struct LogicSettings {
    pub condition_type: String,
    pub condition: String,
}

pub const DEFAULT_PROVIDER: &str = "openai";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_CONDITION_TYPE: &str = "if";
pub const DEFAULT_CONDITION: &str = "False";

impl FlowNode {
    /// Reads a string field from the node data.
    pub fn data_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }

    pub fn kind(&self) -> Option<NodeKind> {
        self.node_type.parse().ok()
    }

    pub fn data_role(&self) -> DataRole {
        match self.data_str("dataType") {
            Some("input") => DataRole::Input,
            Some("output") => DataRole::Output,
            _ => DataRole::PassThrough,
        }
    }

    /// True for the `data` node with `dataType == input`.
    pub fn is_input(&self) -> bool {
        self.kind() == Some(NodeKind::Data) && self.data_role() == DataRole::Input
    }

    /// True for the `data` node with `dataType == output`.
    pub fn is_output(&self) -> bool {
        self.kind() == Some(NodeKind::Data) && self.data_role() == DataRole::Output
    }

    pub fn agent_settings(&self) -> AgentSettings {
        let temperature = match self.data.get("temperature") {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        };
        AgentSettings {
            agent_type: self.data_str("agentType").map(str::to_string),
            provider: self
                .data_str("provider")
                .unwrap_or(DEFAULT_PROVIDER)
                .to_string(),
            model: self.data_str("model").unwrap_or(DEFAULT_MODEL).to_string(),
            temperature: temperature.unwrap_or(DEFAULT_TEMPERATURE),
            instructions: self.data_str("instructions").unwrap_or_default().to_string(),
        }
    }

    pub fn logic_settings(&self) -> LogicSettings {
        LogicSettings {
            condition_type: self
                .data_str("conditionType")
                .unwrap_or(DEFAULT_CONDITION_TYPE)
                .to_string(),
            condition: self
                .data_str("condition")
                .unwrap_or(DEFAULT_CONDITION)
                .to_string(),
        }
    }
}

impl FlowEdge {
    /// Edges whose id mentions `true` or `false` (any case) are conditional.
    /// An id mentioning both is treated as a `true` edge.
    pub fn gate(&self) -> EdgeGate {
        let id = self.id.to_lowercase();
        if id.contains("true") {
            EdgeGate::WhenTrue
        } else if id.contains("false") {
            EdgeGate::WhenFalse
        } else {
            EdgeGate::Always
        }
    }
}

impl FlowDefinition {
    /// Finds the node that starts execution: the first input `data` node.
    pub fn start_node(&self) -> Option<&FlowNode> {
        self.nodes.iter().find(|n| n.is_input())
    }

    /// Outgoing edges of a node, in declaration order.
    pub fn outgoing<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a FlowEdge> + 'a {
        self.edges.iter().filter(move |e| e.source == node_id)
    }
}

impl fmt::Display for EdgeGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeGate::Always => write!(f, "always"),
            EdgeGate::WhenTrue => write!(f, "when true"),
            EdgeGate::WhenFalse => write!(f, "when false"),
        }
    }
}
