use crate::agent::{AgentKind, AgentRequest, AgentRunner};
use crate::error::FlowError;
use crate::flow::{DataRole, DEFAULT_CONDITION_TYPE, FlowNode, NodeKind};
use crate::interpreter::Condition;
use tracing::debug;

/// Per-run state visible to node dispatch.
pub(super) struct ExecutionContext<'a> {
    pub initial_input: &'a str,
    pub last_output: String,
}

/// Runs a single node and returns its output string.
pub(super) fn run_node(
    node: &FlowNode,
    context: &ExecutionContext<'_>,
    runner: &dyn AgentRunner,
) -> Result<String, FlowError> {
    match node.kind() {
        Some(NodeKind::Data) => Ok(run_data(node, context)),
        Some(NodeKind::Agent) => run_agent(node, context, runner),
        Some(NodeKind::Logic) => run_logic(node, context),
        None => Err(FlowError::UnknownNodeType {
            node_id: node.id.clone(),
            type_name: node.node_type.clone(),
        }),
    }
}

fn run_data(node: &FlowNode, context: &ExecutionContext<'_>) -> String {
    match node.data_role() {
        // The input node ignores anything upstream and restarts from the caller's input.
        DataRole::Input => context.initial_input.to_string(),
        DataRole::Output | DataRole::PassThrough => context.last_output.clone(),
    }
}

fn run_agent(
    node: &FlowNode,
    context: &ExecutionContext<'_>,
    runner: &dyn AgentRunner,
) -> Result<String, FlowError> {
    let settings = node.agent_settings();
    let agent_type = settings.agent_type.as_deref().unwrap_or("None");
    let kind: AgentKind = agent_type
        .parse()
        .map_err(|_| FlowError::UnknownAgentType {
            node_id: node.id.clone(),
            agent_type: agent_type.to_string(),
        })?;

    let request = AgentRequest {
        prompt: kind.build_prompt(&settings.instructions, &context.last_output),
        provider: settings.provider,
        model: settings.model,
        temperature: settings.temperature,
    };
    debug!(
        node = %node.id,
        agent = %kind,
        provider = %request.provider,
        model = %request.model,
        "invoking agent"
    );

    runner.invoke(&request).map_err(|source| FlowError::Agent {
        node_id: node.id.clone(),
        source,
    })
}

fn run_logic(node: &FlowNode, context: &ExecutionContext<'_>) -> Result<String, FlowError> {
    let settings = node.logic_settings();
    if settings.condition_type != DEFAULT_CONDITION_TYPE {
        return Err(FlowError::UnknownConditionType {
            node_id: node.id.clone(),
            condition_type: settings.condition_type,
        });
    }

    let as_flow_error = |source| FlowError::Condition {
        node_id: node.id.clone(),
        source,
    };
    let condition = Condition::compile(&settings.condition).map_err(as_flow_error)?;
    let outcome = condition
        .evaluate(&context.last_output)
        .map_err(as_flow_error)?;

    debug!(
        node = %node.id,
        condition = %condition,
        passed = outcome.passed,
        reason = %outcome.reason,
        "condition evaluated"
    );
    Ok(if outcome.passed { "true" } else { "false" }.to_string())
}
