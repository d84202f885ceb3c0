use crate::flow::{EdgeGate, FlowDefinition};
use itertools::Itertools;
use tracing::debug;

const TRUE_TOKENS: [&str; 5] = ["true", "verdadeiro", "sim", "yes", "1"];
const FALSE_TOKENS: [&str; 5] = ["false", "falso", "não", "no", "0"];

/// Checks whether a node output reads as the expected boolean.
///
/// Tokens outside both sets match neither branch, so an unrecognised output
/// follows no conditional edge at all.
pub fn coerce_bool(output: &str, expected: bool) -> bool {
    let token = output.trim().to_lowercase();
    let tokens: &[&str] = if expected { &TRUE_TOKENS } else { &FALSE_TOKENS };
    tokens.contains(&token.as_str())
}

/// Targets of every outgoing edge of `node_id` that may be followed given the
/// node's own output, in edge declaration order.
pub fn candidates<'a>(flow: &'a FlowDefinition, node_id: &'a str, output: &str) -> Vec<&'a str> {
    flow.outgoing(node_id)
        .filter(|edge| match edge.gate() {
            EdgeGate::Always => true,
            EdgeGate::WhenTrue => coerce_bool(output, true),
            EdgeGate::WhenFalse => coerce_bool(output, false),
        })
        .map(|edge| edge.target.as_str())
        .collect()
}

/// Picks the next node to execute. With several candidates the first declared
/// edge wins.
pub fn next_node<'a>(flow: &'a FlowDefinition, node_id: &'a str, output: &str) -> Option<&'a str> {
    let candidates = candidates(flow, node_id, output);
    if candidates.len() > 1 {
        debug!(
            node = node_id,
            candidates = %candidates.iter().join(", "),
            "several outgoing edges can be followed, taking the first declared"
        );
    }
    candidates.into_iter().next()
}
