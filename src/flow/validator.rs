use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

/// Outcome of a structural check. `valid` is true exactly when `errors` is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
    /// Reserved; no check currently produces warnings.
    pub warnings: Vec<String>,
}

/// Checks a raw flow description for structural errors.
///
/// Works on untyped JSON so that missing keys and wrong shapes can be reported
/// individually instead of failing on the first one. Never fails and has no side
/// effects. A flow with empty `nodes` and `edges` lists is valid; the missing
/// input node only surfaces when the flow is executed.
pub fn validate(flow: &Value) -> ValidationReport {
    let mut errors = Vec::new();

    let nodes = flow.get("nodes").and_then(Value::as_array);
    let edges = flow.get("edges").and_then(Value::as_array);

    if nodes.is_none() {
        errors.push("O fluxo deve conter uma lista de nós ('nodes').".to_string());
    }
    if edges.is_none() {
        errors.push("O fluxo deve conter uma lista de arestas ('edges').".to_string());
    }

    let mut node_ids = AHashSet::new();
    for node in nodes.into_iter().flatten() {
        check_node(node, &mut node_ids, &mut errors);
    }

    for edge in edges.into_iter().flatten() {
        check_edge(edge, &node_ids, &mut errors);
    }

    debug!(errors = errors.len(), "flow validated");

    ValidationReport {
        valid: errors.is_empty(),
        errors,
        warnings: Vec::new(),
    }
}

fn check_node(node: &Value, node_ids: &mut AHashSet<String>, errors: &mut Vec<String>) {
    let empty = Map::new();
    let fields = node.as_object().unwrap_or(&empty);
    let label = describe(fields.get("id"));

    match fields.get("id") {
        Some(id) => {
            node_ids.insert(id_key(id));
        }
        None => errors.push(format!("Nó sem ID: {}", node)),
    }

    if !fields.contains_key("type") {
        errors.push(format!("Nó {} sem tipo.", label));
    }

    let data = fields.get("data").and_then(Value::as_object);
    if data.is_none() {
        errors.push(format!("Nó {} sem dados.", label));
    }

    if fields.get("type").and_then(Value::as_str) == Some("agent") {
        let data = data.unwrap_or(&empty);
        if !data.contains_key("agentType") {
            errors.push(format!("Nó de agente {} sem agentType.", label));
        }
        if !data.contains_key("provider") {
            errors.push(format!("Nó de agente {} sem provedor.", label));
        }
        if !data.contains_key("model") {
            errors.push(format!("Nó de agente {} sem modelo.", label));
        }
    }
}

fn check_edge(edge: &Value, node_ids: &AHashSet<String>, errors: &mut Vec<String>) {
    let (Some(source), Some(target)) = (edge.get("source"), edge.get("target")) else {
        errors.push(format!("Aresta mal formatada: {}", edge));
        return;
    };

    if !node_ids.contains(&id_key(source)) {
        errors.push(format!(
            "Aresta com nó de origem inválido: {}",
            describe(Some(source))
        ));
    }
    if !node_ids.contains(&id_key(target)) {
        errors.push(format!(
            "Aresta com nó de destino inválido: {}",
            describe(Some(target))
        ));
    }
}

/// Key used to match edge endpoints against node ids. Non-string ids keep their
/// JSON text so `1` and `"1"` stay distinct.
fn id_key(id: &Value) -> String {
    id.to_string()
}

fn describe(id: Option<&Value>) -> String {
    match id {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => "None".to_string(),
    }
}
