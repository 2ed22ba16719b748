//! Pure payload -> record mappings, one per forwarded kind.
//!
//! Nothing here touches the ingestion client or the statistics; the
//! integration layer decides what to do with the records.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Value};

use super::payload::{Finding, MemoryWrite, MonitoringTick, PlanningRequest, RetrievalQuery, ToolUsage};
use crate::event::{EventKind, EventRecord, Payload, Priority};
use crate::ingest::{PlanResult, RetrievalResult};

fn stamp(at: DateTime<Utc>) -> Value {
    Value::String(at.to_rfc3339_opts(SecondsFormat::Micros, true))
}

fn object(value: Value) -> Payload {
    match value {
        Value::Object(map) => map,
        _ => Payload::new(),
    }
}

/// Length as the agent reports it: characters, not bytes.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

pub fn memory_write(payload: &MemoryWrite, at: DateTime<Utc>) -> EventRecord {
    let mut fields = object(json!({
        "content": payload.content,
        "importance": payload.importance,
        "memory_type": payload.memory_type,
        "session_id": payload.session_id,
        "timestamp": stamp(at),
        "source": "memory_manager",
    }));
    if let Some(concepts) = &payload.concepts {
        fields.insert("concepts".to_string(), json!(concepts));
    }
    if let Some(citations) = &payload.citations {
        fields.insert("citations".to_string(), Value::Array(citations.clone()));
    }
    EventRecord::new(EventKind::MemoryWrite, fields, Priority::Normal, at)
}

pub fn tool_usage(payload: &ToolUsage, at: DateTime<Utc>) -> EventRecord {
    let mut fields = object(json!({
        "tool_name": payload.tool_name,
        "input": payload.tool_input,
        "output": payload.tool_output,
        "execution_time": payload.execution_time,
        "success": payload.success,
        "timestamp": stamp(at),
        "usage_context": payload.context,
    }));
    if let Some(error) = &payload.error {
        fields.insert("error".to_string(), Value::String(error.clone()));
    }
    EventRecord::new(EventKind::ToolUsage, fields, Priority::Low, at)
}

pub fn finding(payload: &Finding, at: DateTime<Utc>) -> EventRecord {
    let fields = object(json!({
        "finding": payload.finding,
        "analysis": payload.analysis,
        "confidence": payload.confidence,
        "sources": payload.sources,
        "step_info": payload.step_info,
        "research_step": payload.research_step(),
        "timestamp": stamp(at),
    }));
    EventRecord::new(EventKind::Finding, fields, Priority::Normal, at)
}

/// Log record written after a retrieval call returned.
pub fn retrieval_log(query: &RetrievalQuery, result: &RetrievalResult, at: DateTime<Utc>) -> EventRecord {
    let fields = object(json!({
        "query": query.query,
        "strategy": query.strategy,
        "results_count": result.results.len(),
        "timestamp": stamp(at),
    }));
    EventRecord::new(EventKind::Retrieval, fields, Priority::Low, at)
}

/// Log record written after a plan was generated.
pub fn planning_log(request: &PlanningRequest, plan: &PlanResult, at: DateTime<Utc>) -> EventRecord {
    let fields = object(json!({
        "research_question": request.research_question,
        "strategy": request.strategy,
        "plan_steps": plan.plan_steps.len(),
        "graph_connectivity": plan.graph_connectivity,
        "timestamp": stamp(at),
    }));
    EventRecord::new(EventKind::Planning, fields, Priority::Normal, at)
}

/// Content of the context event emitted for a monitoring tick.
pub fn monitoring_context(tick: &MonitoringTick) -> String {
    format!("Step: {}, Time: {:.2}s", tick.step_name, tick.execution_time)
}

pub fn memory_ack(payload: &MemoryWrite) -> String {
    format!(
        "Memory content ingested into semantic graph: {} chars",
        char_len(&payload.content)
    )
}

pub fn tool_ack(payload: &ToolUsage) -> String {
    format!("Tool usage logged: {} -> semantic graph", payload.tool_name)
}

pub fn finding_ack(payload: &Finding) -> String {
    format!("Research finding captured: {} chars", char_len(&payload.finding))
}

pub fn preference_ack(preference_id: &str) -> String {
    format!("User preference recorded: {preference_id}")
}

pub fn monitoring_ack(tick: &MonitoringTick) -> String {
    format!("Monitoring data recorded for step: {}", tick.step_name)
}
