//! Walks a flow graph node by node, from its input node to an output node.

use crate::agent::{AgentRunner, NoAgentRunner};
use crate::error::FlowError;
use crate::flow::{FlowDefinition, FlowNode, IntoFlow};
use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

mod dispatch;
mod report;
pub mod routing;

use dispatch::ExecutionContext;
pub use report::*;

/// Default upper bound on the number of steps in one execution.
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

/// Tunables for the graph walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Hard cap on loop iterations; reaching it ends the run as `CappedOut`.
    pub max_iterations: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

/// Executes flows. One executor can be shared across threads; each call keeps its
/// own visited set, outputs and context.
pub struct FlowExecutor {
    runner: Arc<dyn AgentRunner>,
    config: ExecutorConfig,
}

pub struct FlowExecutorBuilder {
    runner: Arc<dyn AgentRunner>,
    config: ExecutorConfig,
}

impl FlowExecutorBuilder {
    pub fn new() -> Self {
        Self {
            runner: Arc::new(NoAgentRunner),
            config: ExecutorConfig::default(),
        }
    }

    /// Sets the capability used to answer `agent` nodes.
    pub fn with_runner<R: AgentRunner + 'static>(mut self, runner: R) -> Self {
        self.runner = Arc::new(runner);
        self
    }

    pub fn with_shared_runner(mut self, runner: Arc<dyn AgentRunner>) -> Self {
        self.runner = runner;
        self
    }

    pub fn with_config(mut self, config: ExecutorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.config.max_iterations = max_iterations;
        self
    }

    pub fn build(self) -> FlowExecutor {
        FlowExecutor {
            runner: self.runner,
            config: self.config,
        }
    }
}

impl Default for FlowExecutorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FlowExecutor {
    pub fn builder() -> FlowExecutorBuilder {
        FlowExecutorBuilder::new()
    }

    /// Shorthand for an executor with default configuration and the given runner.
    pub fn new<R: AgentRunner + 'static>(runner: R) -> Self {
        Self::builder().with_runner(runner).build()
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Converts `flow` and executes it. Conversion failures are reported as
    /// `FlowError::MalformedFlow`.
    pub fn execute_flow<F: IntoFlow>(
        &self,
        flow: F,
        initial_input: &str,
    ) -> Result<ExecutionReport, FlowError> {
        let flow = flow.into_flow()?;
        self.execute(&flow, initial_input)
    }

    /// Walks `flow` starting at its input node.
    ///
    /// Any dispatch failure aborts the run with no partial result. Revisits and the
    /// iteration cap end the run successfully, tagged in `termination`.
    pub fn execute(
        &self,
        flow: &FlowDefinition,
        initial_input: &str,
    ) -> Result<ExecutionReport, FlowError> {
        let nodes: AHashMap<&str, &FlowNode> =
            flow.nodes.iter().map(|n| (n.id.as_str(), n)).collect();

        let start = flow.start_node().ok_or(FlowError::StartNodeNotFound)?;
        info!(
            start = %start.id,
            nodes = flow.nodes.len(),
            edges = flow.edges.len(),
            "executing flow"
        );

        let mut visited: AHashSet<String> = AHashSet::new();
        let mut execution_path = Vec::new();
        let mut node_outputs = AHashMap::new();
        let mut context = ExecutionContext {
            initial_input,
            last_output: initial_input.to_string(),
        };
        let mut iterations = 0;
        let mut current = start.id.clone();

        let termination = loop {
            if iterations >= self.config.max_iterations {
                warn!(
                    node = %current,
                    max_iterations = self.config.max_iterations,
                    "iteration cap reached, stopping flow"
                );
                break Termination::CappedOut;
            }
            iterations += 1;

            if !visited.insert(current.clone()) {
                warn!(node = %current, "node already executed, stopping flow");
                break Termination::RevisitStopped;
            }

            let node = nodes
                .get(current.as_str())
                .ok_or_else(|| FlowError::NodeNotFound(current.clone()))?;
            execution_path.push(current.clone());

            let output = dispatch::run_node(node, &context, self.runner.as_ref())?;
            debug!(node = %current, kind = %node.node_type, output = %output, "node executed");
            node_outputs.insert(current.clone(), output.clone());
            context.last_output = output;

            if node.is_output() {
                break Termination::Completed;
            }

            match routing::next_node(flow, &node.id, &context.last_output) {
                Some(next) => current = next.to_string(),
                None => break Termination::Exhausted,
            }
        };

        info!(
            termination = %termination,
            steps = execution_path.len(),
            "flow finished"
        );

        Ok(ExecutionReport {
            termination,
            output: context.last_output,
            execution_path,
            node_outputs,
            iterations,
        })
    }
}
