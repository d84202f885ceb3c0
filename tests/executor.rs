mod common;
use common::*;
use flowrunner::prelude::*;
use serde_json::json;

#[cfg(test)]
mod executor_tests {
    use super::*;

    fn run(flow: &FlowDefinition, input: &str) -> std::result::Result<ExecutionReport, FlowError> {
        FlowExecutor::new(EchoRunner).execute(flow, input)
    }

    #[test]
    fn test_passthrough_flow_completes() {
        let report = run(&create_passthrough_flow(), "olá mundo").unwrap();

        assert_eq!(report.termination, Termination::Completed);
        assert_eq!(report.output, "olá mundo");
        assert_eq!(report.execution_path, vec!["in", "out"]);
        assert_eq!(report.node_outputs.get("in").map(String::as_str), Some("olá mundo"));
        assert_eq!(report.node_outputs.get("out").map(String::as_str), Some("olá mundo"));
        assert_eq!(report.iterations, 2);
    }

    #[test]
    fn test_missing_input_node() {
        let flow = FlowDefinition {
            nodes: vec![data_node("out", "output")],
            edges: vec![],
        };
        let err = run(&flow, "x").unwrap_err();

        assert!(matches!(err, FlowError::StartNodeNotFound));
        assert_eq!(err.to_string(), "Nó de entrada não encontrado no fluxo.");
    }

    #[test]
    fn test_empty_flow_has_no_input_node() {
        let err = run(&FlowDefinition::default(), "x").unwrap_err();
        assert!(matches!(err, FlowError::StartNodeNotFound));
    }

    #[test]
    fn test_start_node_found_regardless_of_declaration_order() {
        let flow = FlowDefinition {
            nodes: vec![data_node("out", "output"), data_node("in", "input")],
            edges: vec![edge("e1", "in", "out")],
        };
        let report = run(&flow, "abc").unwrap();
        assert_eq!(report.execution_path, vec!["in", "out"]);
    }

    #[test]
    fn test_walk_stops_at_output_node_even_with_outgoing_edges() {
        let flow = FlowDefinition {
            nodes: vec![
                data_node("in", "input"),
                data_node("out", "output"),
                data_node("after", "output"),
            ],
            edges: vec![edge("e1", "in", "out"), edge("e2", "out", "after")],
        };
        let report = run(&flow, "abc").unwrap();

        assert_eq!(report.termination, Termination::Completed);
        assert_eq!(report.execution_path, vec!["in", "out"]);
        assert!(!report.node_outputs.contains_key("after"));
    }

    #[test]
    fn test_dead_end_is_exhausted() {
        let flow = FlowDefinition {
            nodes: vec![data_node("in", "input"), node("relay", "data", json!({}))],
            edges: vec![edge("e1", "in", "relay")],
        };
        let report = run(&flow, "abc").unwrap();

        assert_eq!(report.termination, Termination::Exhausted);
        assert!(report.termination.is_natural());
        assert_eq!(report.output, "abc");
        assert_eq!(report.execution_path, vec!["in", "relay"]);
    }

    #[test]
    fn test_cycle_stops_on_revisit() {
        let flow = FlowDefinition {
            nodes: vec![
                data_node("in", "input"),
                node("a", "data", json!({})),
                node("b", "data", json!({})),
            ],
            edges: vec![
                edge("e1", "in", "a"),
                edge("e2", "a", "b"),
                edge("e3", "b", "a"),
            ],
        };
        let report = run(&flow, "loop").unwrap();

        assert_eq!(report.termination, Termination::RevisitStopped);
        assert!(!report.termination.is_natural());
        assert_eq!(report.execution_path, vec!["in", "a", "b"]);
        assert!(report.iterations <= flow.nodes.len() + 1);
    }

    #[test]
    fn test_iteration_cap() {
        let flow = FlowDefinition {
            nodes: vec![
                data_node("in", "input"),
                node("a", "data", json!({})),
                data_node("out", "output"),
            ],
            edges: vec![edge("e1", "in", "a"), edge("e2", "a", "out")],
        };
        let executor = FlowExecutor::builder()
            .with_runner(EchoRunner)
            .with_max_iterations(2)
            .build();
        assert_eq!(executor.config().max_iterations, 2);

        let report = executor.execute(&flow, "abc").unwrap();
        assert_eq!(report.termination, Termination::CappedOut);
        assert_eq!(report.execution_path, vec!["in", "a"]);
        assert_eq!(report.iterations, 2);
    }

    #[test]
    fn test_zero_cap_executes_nothing() {
        let executor = FlowExecutor::builder()
            .with_config(ExecutorConfig { max_iterations: 0 })
            .build();
        let report = executor.execute(&create_passthrough_flow(), "abc").unwrap();

        assert_eq!(report.termination, Termination::CappedOut);
        assert!(report.execution_path.is_empty());
        assert_eq!(report.output, "abc");
    }

    #[test]
    fn test_condition_true_branch() {
        let report = run(&create_branching_flow("length > 5"), "hello world").unwrap();

        assert_eq!(report.execution_path, vec!["in", "check", "yes"]);
        assert_eq!(report.node_outputs.get("check").map(String::as_str), Some("true"));
        assert_eq!(report.output, "true");
    }

    #[test]
    fn test_condition_false_branch() {
        let report = run(&create_branching_flow("length > 5"), "oi").unwrap();

        assert_eq!(report.execution_path, vec!["in", "check", "no"]);
        assert_eq!(report.node_outputs.get("check").map(String::as_str), Some("false"));
    }

    #[test]
    fn test_condition_on_input_content() {
        let flow = create_branching_flow("'urgente' in input and not 'spam' in input");

        let urgent = run(&flow, "pedido urgente").unwrap();
        assert_eq!(urgent.execution_path.last().map(String::as_str), Some("yes"));

        let spam = run(&flow, "urgente spam").unwrap();
        assert_eq!(spam.execution_path.last().map(String::as_str), Some("no"));
    }

    #[test]
    fn test_missing_condition_defaults_to_false() {
        let mut flow = create_branching_flow("True");
        flow.nodes[1] = node("check", "logic", json!({}));

        let report = run(&flow, "qualquer coisa").unwrap();
        assert_eq!(report.execution_path, vec!["in", "check", "no"]);
    }

    #[test]
    fn test_unconditional_edge_followed_after_logic() {
        let flow = FlowDefinition {
            nodes: vec![
                data_node("in", "input"),
                logic_node("check", "True"),
                data_node("rejected", "output"),
                data_node("next", "output"),
            ],
            edges: vec![
                edge("e1", "in", "check"),
                edge("check-false", "check", "rejected"),
                edge("e3", "check", "next"),
            ],
        };
        let report = run(&flow, "x").unwrap();
        assert_eq!(report.execution_path, vec!["in", "check", "next"]);
    }

    #[test]
    fn test_first_declared_edge_wins() {
        let flow = FlowDefinition {
            nodes: vec![
                data_node("in", "input"),
                data_node("first", "output"),
                data_node("second", "output"),
            ],
            edges: vec![edge("e1", "in", "first"), edge("e2", "in", "second")],
        };
        let report = run(&flow, "x").unwrap();
        assert_eq!(report.execution_path, vec!["in", "first"]);
    }

    #[test]
    fn test_numeric_output_follows_true_edge_only() {
        let flow = FlowDefinition {
            nodes: vec![
                data_node("in", "input"),
                data_node("yes", "output"),
                data_node("no", "output"),
            ],
            edges: vec![edge("in-false", "in", "no"), edge("in-true", "in", "yes")],
        };

        let report = run(&flow, "1").unwrap();
        assert_eq!(report.execution_path, vec!["in", "yes"]);

        let report = run(&flow, "Não").unwrap();
        assert_eq!(report.execution_path, vec!["in", "no"]);

        // Neither truthy nor falsy: no conditional edge applies.
        let report = run(&flow, "talvez").unwrap();
        assert_eq!(report.termination, Termination::Exhausted);
        assert_eq!(report.execution_path, vec!["in"]);
    }

    #[test]
    fn test_second_input_node_restarts_from_initial_input() {
        let flow = FlowDefinition {
            nodes: vec![
                data_node("in", "input"),
                agent_node("bot", "chatbot", ""),
                data_node("again", "input"),
                data_node("out", "output"),
            ],
            edges: vec![
                edge("e1", "in", "bot"),
                edge("e2", "bot", "again"),
                edge("e3", "again", "out"),
            ],
        };
        let report = run(&flow, "original").unwrap();

        assert_eq!(
            report.node_outputs.get("bot").map(String::as_str),
            Some("[Echo] original")
        );
        assert_eq!(report.output, "original");
    }

    #[test]
    fn test_execution_without_agents_is_idempotent() {
        let flow = create_branching_flow("len(input) % 2 == 0");
        let first = run(&flow, "abcd").unwrap();
        let second = run(&flow, "abcd").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_agent_receives_built_prompt_and_settings() {
        let runner = RecordingRunner::replying("resumo pronto");
        let executor = FlowExecutor::new(runner.clone());

        let report = executor
            .execute(&create_agent_flow("analyzer"), "vendas: 10, 20, 30")
            .unwrap();

        assert_eq!(report.termination, Termination::Completed);
        assert_eq!(report.output, "resumo pronto");
        assert_eq!(report.execution_path, vec!["in", "agent", "out"]);

        let requests = runner.recorded();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].prompt, "Resuma o texto.\nDados: vendas: 10, 20, 30");
        assert_eq!(requests[0].provider, "openai");
        assert_eq!(requests[0].model, "gpt-4o-mini");
        assert_eq!(requests[0].temperature, 0.2);
    }

    #[test]
    fn test_agent_prompt_templates_per_type() {
        let cases = [
            ("chatbot", "Resuma o texto.\n\nMensagem: entrada"),
            ("generator", "Resuma o texto.\nTópico: entrada"),
            ("langchain_agent", "Resuma o texto.\nConsulta: entrada"),
        ];
        for (agent_type, expected) in cases {
            let runner = RecordingRunner::replying("ok");
            FlowExecutor::new(runner.clone())
                .execute(&create_agent_flow(agent_type), "entrada")
                .unwrap();
            assert_eq!(runner.recorded()[0].prompt, expected, "agentType {agent_type}");
        }
    }

    #[test]
    fn test_agent_defaults_when_settings_missing() {
        let flow = FlowDefinition {
            nodes: vec![
                data_node("in", "input"),
                node("agent", "agent", json!({ "agentType": "generator" })),
                data_node("out", "output"),
            ],
            edges: vec![edge("e1", "in", "agent"), edge("e2", "agent", "out")],
        };
        let runner = RecordingRunner::replying("texto");
        FlowExecutor::new(runner.clone()).execute(&flow, "mar").unwrap();

        let request = &runner.recorded()[0];
        assert_eq!(request.prompt, "Gere conteúdo sobre o tópico.\nTópico: mar");
        assert_eq!(request.provider, "openai");
        assert_eq!(request.model, "gpt-3.5-turbo");
        assert_eq!(request.temperature, 0.7);
    }

    #[test]
    fn test_agent_chain_feeds_previous_output() {
        let flow = FlowDefinition {
            nodes: vec![
                data_node("in", "input"),
                agent_node("first", "chatbot", ""),
                agent_node("second", "chatbot", ""),
                data_node("out", "output"),
            ],
            edges: vec![
                edge("e1", "in", "first"),
                edge("e2", "first", "second"),
                edge("e3", "second", "out"),
            ],
        };
        let report = run(&flow, "oi").unwrap();
        assert_eq!(report.output, "[Echo] [Echo] oi");
    }

    #[test]
    fn test_agent_failure_aborts_run() {
        let failing = |_: &AgentRequest| -> std::result::Result<String, AgentError> {
            Err(AgentError::Provider("limite de requisições".to_string()))
        };
        let err = FlowExecutor::new(failing)
            .execute(&create_agent_flow("chatbot"), "oi")
            .unwrap_err();

        match err {
            FlowError::Agent { node_id, source } => {
                assert_eq!(node_id, "agent");
                assert_eq!(source, AgentError::Provider("limite de requisições".to_string()));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_default_executor_has_no_agent_provider() {
        let err = FlowExecutor::builder()
            .build()
            .execute(&create_agent_flow("chatbot"), "oi")
            .unwrap_err();

        assert!(matches!(err, FlowError::Agent { .. }));
        assert!(err.to_string().contains("Nenhum provedor de IA configurado"));
    }

    #[test]
    fn test_unknown_agent_type() {
        let err = run(&create_agent_flow("wizard"), "oi").unwrap_err();
        match err {
            FlowError::UnknownAgentType { node_id, agent_type } => {
                assert_eq!(node_id, "agent");
                assert_eq!(agent_type, "wizard");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_agent_type() {
        let mut flow = create_agent_flow("chatbot");
        flow.nodes[1] = node("agent", "agent", json!({ "provider": "openai" }));

        let err = run(&flow, "oi").unwrap_err();
        assert!(matches!(
            err,
            FlowError::UnknownAgentType { ref agent_type, .. } if agent_type == "None"
        ));
    }

    #[test]
    fn test_unknown_node_type() {
        let flow = FlowDefinition {
            nodes: vec![
                data_node("in", "input"),
                node("hook", "webhook", json!({})),
            ],
            edges: vec![edge("e1", "in", "hook")],
        };
        let err = run(&flow, "x").unwrap_err();
        assert!(matches!(
            err,
            FlowError::UnknownNodeType { ref type_name, .. } if type_name == "webhook"
        ));
    }

    #[test]
    fn test_unknown_condition_type() {
        let mut flow = create_branching_flow("True");
        flow.nodes[1] = node(
            "check",
            "logic",
            json!({ "conditionType": "switch", "condition": "True" }),
        );

        let err = run(&flow, "x").unwrap_err();
        assert!(matches!(
            err,
            FlowError::UnknownConditionType { ref condition_type, .. } if condition_type == "switch"
        ));
    }

    #[test]
    fn test_condition_syntax_error_aborts_run() {
        let err = run(&create_branching_flow("length >"), "x").unwrap_err();
        match err {
            FlowError::Condition { node_id, source } => {
                assert_eq!(node_id, "check");
                assert!(matches!(source, ConditionError::UnexpectedEnd(_)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_condition_runtime_error_aborts_run() {
        let err = run(&create_branching_flow("input > 5"), "abc").unwrap_err();
        assert!(matches!(
            err,
            FlowError::Condition {
                source: ConditionError::TypeMismatch { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_deeply_nested_condition_is_rejected() {
        let condition = format!("{}True", "not ".repeat(50_000));
        let err = run(&create_branching_flow(&condition), "x").unwrap_err();
        assert!(matches!(
            err,
            FlowError::Condition {
                source: ConditionError::NestingTooDeep { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_numeric_ids_validate_and_execute() {
        let raw = json!({
            "nodes": [
                {"id": 1, "type": "data", "data": {"dataType": "input"}},
                {"id": 2, "type": "data", "data": {"dataType": "output"}}
            ],
            "edges": [{"id": 10, "source": 1, "target": 2}]
        });
        assert!(validate(&raw).valid);

        let report = FlowExecutor::new(EchoRunner).execute_flow(&raw, "oi").unwrap();
        assert_eq!(report.termination, Termination::Completed);
        assert_eq!(report.execution_path, vec!["1", "2"]);
        assert_eq!(report.output, "oi");
    }

    #[test]
    fn test_edge_to_missing_node() {
        let flow = FlowDefinition {
            nodes: vec![data_node("in", "input")],
            edges: vec![edge("e1", "in", "ghost")],
        };
        let err = run(&flow, "x").unwrap_err();

        assert!(matches!(err, FlowError::NodeNotFound(ref id) if id == "ghost"));
        assert_eq!(err.to_string(), "Nó ghost não encontrado.");
    }

    #[test]
    fn test_execute_flow_from_json_text() {
        let raw = r#"{
            "nodes": [
                {"id": "in", "type": "data", "data": {"dataType": "input"}},
                {"id": "out", "type": "data", "data": {"dataType": "output"}}
            ],
            "edges": [{"id": "e1", "source": "in", "target": "out"}]
        }"#;
        let report = FlowExecutor::new(EchoRunner).execute_flow(raw, "texto").unwrap();
        assert_eq!(report.output, "texto");
    }

    #[test]
    fn test_execute_flow_rejects_malformed_json() {
        let err = FlowExecutor::new(EchoRunner)
            .execute_flow(json!({ "nodes": [{ "id": 1 }] }), "x")
            .unwrap_err();
        assert!(matches!(err, FlowError::MalformedFlow(_)));
    }

    #[test]
    fn test_executor_is_shareable_across_threads() {
        let executor = std::sync::Arc::new(FlowExecutor::new(EchoRunner));
        let flow = std::sync::Arc::new(create_agent_flow("chatbot"));

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let executor = executor.clone();
                let flow = flow.clone();
                std::thread::spawn(move || executor.execute(&flow, &format!("msg {i}")).unwrap())
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            let report = handle.join().unwrap();
            assert_eq!(report.output, format!("[Echo] Resuma o texto.\n\nMensagem: msg {i}"));
        }
    }
}
