mod common;

use common::{integration, integration_with, FlakyClient};
use graphlink::hooks::{Finding, MemoryWrite, MonitoringTick, PlanningRequest, PreferenceFeedback, RetrievalQuery, ToolUsage};
use graphlink::{EventKind, HookAck, IntegrationConfig, IntegrationError, Priority};
use serde_json::{json, Value};

#[test]
fn test_every_hook_accepts_empty_payload() {
    let client = FlakyClient::new();
    let integration = integration(&client);

    for kind in EventKind::ALL {
        let before = integration.stats().processed;
        let result = integration.dispatch(kind.hook_id(), json!({}));
        assert!(result.is_ok(), "{kind} failed on empty payload: {result:?}");

        let after = integration.stats().processed;
        assert_eq!(after.get(kind), before.get(kind) + 1, "{kind} should count once");
        for other in EventKind::ALL.into_iter().filter(|k| *k != kind) {
            assert_eq!(after.get(other), before.get(other), "{kind} touched {other}");
        }
    }
    assert_eq!(integration.statistics().total_integrations, 7);
}

#[test]
fn test_null_payload_is_treated_as_empty() {
    let client = FlakyClient::new();
    let integration = integration(&client);

    let ack = integration.dispatch("monitoring", Value::Null).unwrap();
    assert_eq!(ack, json!("Monitoring data recorded for step: unknown"));
}

#[test]
fn test_memory_write_defaults_reach_the_graph() {
    let client = FlakyClient::new();
    let integration = integration(&client);

    integration.handle_memory_output(MemoryWrite::default());

    let records = client.records_of(EventKind::MemoryWrite);
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.priority(), Priority::Normal);
    assert_eq!(record.get("content"), Some(&json!("")));
    assert_eq!(record.get("importance"), Some(&json!(0.5)));
    assert_eq!(record.get("memory_type"), Some(&json!("general")));
    assert_eq!(record.get("session_id"), Some(&json!("default")));
}

#[test]
fn test_memory_write_reports_content_length() {
    let client = FlakyClient::new();
    let integration = integration(&client);

    let ack = integration.handle_memory_output(MemoryWrite {
        content: "x".repeat(120),
        importance: 0.8,
        ..MemoryWrite::default()
    });

    assert!(ack.is_recorded());
    assert!(ack.message().contains("120 chars"), "unexpected ack: {ack}");
    assert_eq!(integration.stats().processed.memory_writes, 1);
    assert_eq!(
        client.records_of(EventKind::MemoryWrite)[0].get("importance"),
        Some(&json!(0.8))
    );
}

#[test]
fn test_failed_tool_is_still_logged() {
    let client = FlakyClient::new();
    let integration = integration(&client);

    let ack = integration.handle_tool_usage(ToolUsage {
        tool_name: "web_search".to_string(),
        success: false,
        error: Some("timeout".to_string()),
        ..ToolUsage::default()
    });

    assert_eq!(ack, HookAck::Recorded("Tool usage logged: web_search -> semantic graph".to_string()));
    assert_eq!(integration.stats().processed.tool_usage_logs, 1);

    let record = &client.records_of(EventKind::ToolUsage)[0];
    assert_eq!(record.priority(), Priority::Low);
    assert_eq!(record.get("success"), Some(&json!(false)));
    assert_eq!(record.get("error"), Some(&json!("timeout")));
}

#[test]
fn test_forwarding_failure_is_contained() {
    let client = FlakyClient::failing();
    let integration = integration(&client);

    let acks = [
        integration.handle_memory_output(MemoryWrite::default()),
        integration.handle_tool_usage(ToolUsage::default()),
        integration.handle_finding(Finding::default()),
        integration.handle_monitoring(MonitoringTick::default()),
    ];
    for ack in &acks {
        assert!(!ack.is_recorded(), "expected failure, got {ack}");
        assert!(ack.message().contains("graph offline"));
    }
    assert!(acks[0].message().starts_with("Memory integration error"));
    assert!(acks[1].message().starts_with("Tool usage integration error"));
    assert!(acks[2].message().starts_with("Finding capture error"));
    assert!(acks[3].message().starts_with("Monitoring integration error"));

    let snapshot = integration.stats();
    assert_eq!(snapshot.total_processed(), 0);
    assert_eq!(snapshot.failures.memory_writes, 1);
    assert_eq!(snapshot.failures.monitoring_events, 1);
    assert_eq!(snapshot.total_failures(), 4);
}

#[test]
fn test_retrieval_passes_result_through() {
    let client = FlakyClient::new();
    let integration = integration(&client);
    integration.handle_memory_output(MemoryWrite {
        content: "knowledge graphs improve retrieval".to_string(),
        ..MemoryWrite::default()
    });

    let result = integration.handle_retrieval(RetrievalQuery {
        query: "knowledge graphs".to_string(),
        ..RetrievalQuery::default()
    });
    assert!(!result.is_error());
    assert_eq!(result.results.len(), 1);
    assert_eq!(result.results[0].label, "knowledge graphs improve retrieval");

    let log = &client.records_of(EventKind::Retrieval)[0];
    assert_eq!(log.priority(), Priority::Low);
    assert_eq!(log.get("results_count"), Some(&json!(1)));
    assert_eq!(log.get("strategy"), Some(&json!("hybrid")));
    assert_eq!(integration.stats().processed.retrieval_calls, 1);
}

#[test]
fn test_retrieval_failure_has_error_shape() {
    let client = FlakyClient::failing();
    let integration = integration(&client);

    let result = integration.handle_retrieval(RetrievalQuery::default());
    assert!(result.results.is_empty());
    assert!(result.error.as_deref().unwrap().contains("graph offline"));
    assert_eq!(integration.stats().processed.retrieval_calls, 0);

    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["results"], json!([]));
    assert!(value["error"].is_string());
}

#[test]
fn test_retrieval_log_failure_fails_the_hook() {
    let client = FlakyClient::new();
    client.set_ingest_failing(true);
    let integration = integration(&client);

    let result = integration.handle_retrieval(RetrievalQuery::default());
    assert!(result.is_error());
    assert_eq!(integration.stats().processed.retrieval_calls, 0);
    assert_eq!(integration.stats().failures.retrieval_calls, 1);
}

#[test]
fn test_planning_logs_step_count() {
    let client = FlakyClient::new();
    let integration = integration(&client);

    let plan = integration.handle_planning(PlanningRequest {
        research_question: "Why do transformers need positional encodings?".to_string(),
        max_steps: 3,
        ..PlanningRequest::default()
    });
    assert!(!plan.is_error());
    assert!(!plan.plan_steps.is_empty() && plan.plan_steps.len() <= 3);

    let log = &client.records_of(EventKind::Planning)[0];
    assert_eq!(log.priority(), Priority::Normal);
    assert_eq!(log.get("plan_steps"), Some(&json!(plan.plan_steps.len())));
    assert_eq!(log.get("graph_connectivity"), Some(&plan.graph_connectivity));
}

#[test]
fn test_planning_failure_has_error_shape() {
    let client = FlakyClient::failing();
    let integration = integration(&client);

    let plan = integration.handle_planning(PlanningRequest::default());
    assert!(plan.plan_steps.is_empty());
    assert!(plan.is_error());
    assert_eq!(integration.stats().processed.plan_generations, 0);
}

#[test]
fn test_preference_returns_identifier() {
    let client = FlakyClient::new();
    let integration = integration(&client);

    let ack = integration.handle_preference(PreferenceFeedback {
        user_id: "u1".to_string(),
        preferred_content: "short".to_string(),
        rejected_content: "long".to_string(),
        ..PreferenceFeedback::default()
    });
    let id = ack.preference_id().expect("preference id");
    assert!(id.starts_with("pref_"));
    assert_eq!(ack.to_string(), format!("User preference recorded: {id}"));
    assert_eq!(client.graph.preference_count(), 1);
    assert_eq!(integration.stats().processed.preference_logs, 1);

    client.set_failing(true);
    let ack = integration.handle_preference(PreferenceFeedback::default());
    assert!(!ack.is_recorded());
    assert!(ack.to_string().starts_with("Preference logging error"));
    assert_eq!(integration.stats().processed.preference_logs, 1);
}

#[test]
fn test_monitoring_records_timing_and_errors() {
    let client = FlakyClient::new();
    let integration = integration(&client);

    integration.handle_monitoring(MonitoringTick {
        step_name: "synthesis".to_string(),
        execution_time: 2.5,
        success: false,
        error_type: "llm_timeout".to_string(),
        ..MonitoringTick::default()
    });

    assert_eq!(client.graph.operation_times("synthesis"), vec![2500.0]);
    assert_eq!(client.graph.error_count("llm_timeout"), 1);
    let events = client.graph.context_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].context_type, "monitoring");
    assert_eq!(events[0].content, "Step: synthesis, Time: 2.50s");
    assert_eq!(events[0].relevance, 0.3);

    // Successful steps do not record an error.
    integration.handle_monitoring(MonitoringTick {
        step_name: "synthesis".to_string(),
        ..MonitoringTick::default()
    });
    assert_eq!(client.graph.error_count("llm_timeout"), 1);
    assert_eq!(client.graph.error_count("general_error"), 0);
    assert_eq!(integration.stats().processed.monitoring_events, 2);
}

#[test]
fn test_counting_policy_can_count_failures() {
    let client = FlakyClient::failing();
    let config = IntegrationConfig {
        count_forwarding_failures: true,
        ..IntegrationConfig::default()
    };
    let integration = integration_with(&client, config);

    let ack = integration.handle_finding(Finding::default());
    assert!(!ack.is_recorded());

    let snapshot = integration.stats();
    assert_eq!(snapshot.processed.findings_captured, 1);
    assert_eq!(snapshot.failures.findings_captured, 1);
}

#[test]
fn test_dispatch_rejects_unknown_hook_and_bad_payload() {
    let client = FlakyClient::new();
    let integration = integration(&client);

    let err = integration.dispatch("not_a_hook", json!({})).unwrap_err();
    assert!(matches!(err, IntegrationError::UnknownHook(ref id) if id == "not_a_hook"));

    let err = integration
        .dispatch("memory_writes", json!({ "importance": "very" }))
        .unwrap_err();
    assert!(matches!(err, IntegrationError::InvalidPayload { hook: "memory_writes", .. }));
    assert_eq!(integration.stats().total_processed(), 0);
}

#[test]
fn test_dispatch_treats_null_fields_as_absent() {
    let client = FlakyClient::new();
    let integration = integration(&client);

    let ack = integration
        .dispatch("memory_writes", json!({ "content": null, "importance": 0.8, "session_id": null }))
        .unwrap();
    assert_eq!(ack, json!("Memory content ingested into semantic graph: 0 chars"));

    let record = &client.records_of(EventKind::MemoryWrite)[0];
    assert_eq!(record.get("importance"), Some(&json!(0.8)));
    assert_eq!(record.get("session_id"), Some(&json!("default")));
    assert_eq!(integration.stats().processed.memory_writes, 1);

    let ack = integration
        .dispatch("tool_usage_logs", json!({ "tool_name": "web_search", "success": null, "error": null }))
        .unwrap();
    assert_eq!(ack, json!("Tool usage logged: web_search -> semantic graph"));
    let record = &client.records_of(EventKind::ToolUsage)[0];
    assert_eq!(record.get("success"), Some(&json!(true)));
    assert!(record.get("error").is_none());
}

#[test]
fn test_dispatch_returns_hook_result() {
    let client = FlakyClient::new();
    let integration = integration(&client);

    let ack = integration
        .dispatch("findings_capture", json!({ "finding": "abcd", "confidence": 0.9 }))
        .unwrap();
    assert_eq!(ack, json!("Research finding captured: 4 chars"));

    let retrieval = integration.dispatch("retrieval_calls", json!({ "query": "abcd" })).unwrap();
    assert!(retrieval["results"].is_array());
    assert!(retrieval.get("error").is_none());
}

#[test]
fn test_statistics_shape() {
    let client = FlakyClient::new();
    let integration = integration(&client);
    integration.handle_tool_usage(ToolUsage::default());
    integration.handle_finding(Finding::default());

    let stats = integration.statistics();
    assert_eq!(stats.hooks_registered, 7);
    assert_eq!(stats.total_integrations, 2);
    assert_eq!(stats.total_integrations, stats.integration_stats.total());
    assert_eq!(stats.semantic_graph_stats["graph"]["pending"], 2);

    let value = serde_json::to_value(&stats).unwrap();
    assert_eq!(value["integration_stats"]["tool_usage_logs"], 1);
    assert_eq!(value["integration_stats"]["findings_captured"], 1);
    assert!(value["last_updated"].is_string());
}

#[test]
fn test_statistics_survive_unreachable_graph() {
    let client = FlakyClient::new();
    let integration = integration(&client);
    integration.handle_tool_usage(ToolUsage::default());

    client.set_failing(true);
    let stats = integration.statistics();
    assert_eq!(stats.total_integrations, 1);
    assert!(stats.semantic_graph_stats["error"].is_string());
}
