use super::definition::FlowDefinition;
use crate::error::FlowError;
use serde::Deserialize;

/// A trait for data that can be converted into a `FlowDefinition`.
///
/// Route handlers usually hold the flow as parsed JSON; this is the bridge from
/// that representation to the typed model the executor walks.
///
/// # Example
///
/// ```rust
/// use flowrunner::prelude::*;
///
/// let raw = serde_json::json!({
///     "nodes": [{"id": "in", "type": "data", "data": {"dataType": "input"}}],
///     "edges": []
/// });
/// let flow = raw.into_flow().unwrap();
/// assert_eq!(flow.nodes.len(), 1);
/// ```
pub trait IntoFlow {
    /// Consumes the object and converts it into a flow definition.
    fn into_flow(self) -> Result<FlowDefinition, FlowError>;
}

impl IntoFlow for FlowDefinition {
    fn into_flow(self) -> Result<FlowDefinition, FlowError> {
        Ok(self)
    }
}

impl IntoFlow for serde_json::Value {
    fn into_flow(self) -> Result<FlowDefinition, FlowError> {
        serde_json::from_value(self).map_err(|e| FlowError::MalformedFlow(e.to_string()))
    }
}

impl IntoFlow for &serde_json::Value {
    fn into_flow(self) -> Result<FlowDefinition, FlowError> {
        FlowDefinition::deserialize(self).map_err(|e| FlowError::MalformedFlow(e.to_string()))
    }
}

impl IntoFlow for &str {
    fn into_flow(self) -> Result<FlowDefinition, FlowError> {
        serde_json::from_str(self).map_err(|e| FlowError::MalformedFlow(e.to_string()))
    }
}

impl FlowDefinition {
    /// Parses a flow from JSON text.
    pub fn from_json(json: &str) -> Result<Self, FlowError> {
        json.into_flow()
    }

    /// Converts a parsed JSON value into a flow.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, FlowError> {
        value.into_flow()
    }
}
