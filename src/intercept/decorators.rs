//! Decorating implementations of the host capabilities.
//!
//! Each decorator calls the original first and returns its result (or its
//! error) unchanged. Memory saves, research steps and RLHF captures only
//! report after a successful original call. Tool invocations also report
//! failures, before handing the error back.

use std::sync::Arc;
use std::time::Instant;

use serde_json::{json, Map, Value};
use tracing::warn;

use super::capability::{display_value, FeedbackCollector, MemoryManager, ResearchLoop, ResearchState, ToolExecutor, ToolInvocation};
use crate::hooks::{payload, Finding, MemoryWrite, ToolUsage};
use crate::integration::Integration;

pub struct InstrumentedMemoryManager {
    inner: Arc<dyn MemoryManager>,
    integration: Arc<Integration>,
}

impl InstrumentedMemoryManager {
    pub(crate) fn new(inner: Arc<dyn MemoryManager>, integration: Arc<Integration>) -> Self {
        Self { inner, integration }
    }

    fn payload(&self, content: &str, importance: f64, extras: &Map<String, Value>) -> MemoryWrite {
        let session_id = self
            .inner
            .current_episode_id()
            .unwrap_or_else(|| self.integration.config().default_session_id.clone());
        let base = MemoryWrite {
            content: content.to_string(),
            importance,
            memory_type: "research_finding".to_string(),
            session_id,
            ..MemoryWrite::default()
        };
        if extras.is_empty() {
            return base;
        }

        // Extras override the base fields, as keyword arguments would. A null
        // extra overrides nothing.
        let mut merged = match serde_json::to_value(&base) {
            Ok(Value::Object(map)) => map,
            _ => return base,
        };
        merged.extend(
            extras
                .iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        match payload::from_json(Value::Object(merged)) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "ignoring malformed memory extras");
                base
            }
        }
    }
}

impl MemoryManager for InstrumentedMemoryManager {
    fn save_research_finding(&self, content: &str, importance: f64, extras: &Map<String, Value>) -> anyhow::Result<Value> {
        let result = self.inner.save_research_finding(content, importance, extras)?;
        let payload = self.payload(content, importance, extras);
        self.integration.handle_memory_output(payload);
        Ok(result)
    }

    fn current_episode_id(&self) -> Option<String> {
        self.inner.current_episode_id()
    }

    fn is_instrumented(&self) -> bool {
        true
    }
}

pub struct InstrumentedToolExecutor {
    inner: Arc<dyn ToolExecutor>,
    integration: Arc<Integration>,
}

impl InstrumentedToolExecutor {
    pub(crate) fn new(inner: Arc<dyn ToolExecutor>, integration: Arc<Integration>) -> Self {
        Self { inner, integration }
    }
}

impl ToolExecutor for InstrumentedToolExecutor {
    fn invoke(&self, invocation: &ToolInvocation) -> anyhow::Result<Value> {
        let started = Instant::now();
        let outcome = self.inner.invoke(invocation);
        let execution_time = started.elapsed().as_secs_f64();

        let (tool_output, error) = match &outcome {
            Ok(value) => (display_value(value), None),
            Err(e) => (format!("Tool execution failed: {e}"), Some(e.to_string())),
        };
        let payload = ToolUsage {
            tool_name: invocation.tool.clone(),
            tool_input: display_value(&invocation.tool_input),
            tool_output,
            execution_time,
            success: error.is_none(),
            error,
            context: self.integration.config().tool_usage_context.clone(),
        };
        self.integration.handle_tool_usage(payload);

        outcome
    }

    fn is_instrumented(&self) -> bool {
        true
    }
}

pub struct InstrumentedResearchLoop {
    inner: Arc<dyn ResearchLoop>,
    integration: Arc<Integration>,
}

impl InstrumentedResearchLoop {
    pub(crate) fn new(inner: Arc<dyn ResearchLoop>, integration: Arc<Integration>) -> Self {
        Self { inner, integration }
    }
}

impl ResearchLoop for InstrumentedResearchLoop {
    fn execute_research_step(&self, state: ResearchState) -> anyhow::Result<ResearchState> {
        let state = self.inner.execute_research_step(state)?;

        if let Some(latest) = state.latest_finding() {
            let mut step_info = Map::new();
            step_info.insert("step_number".to_string(), json!(latest.step));
            step_info.insert("step_description".to_string(), json!(latest.step_description));
            let payload = Finding {
                finding: latest.analysis.clone(),
                analysis: latest.analysis.clone(),
                confidence: self.integration.config().research_finding_confidence,
                sources: latest.external_research.clone(),
                step_info,
            };
            self.integration.handle_finding(payload);
        }

        Ok(state)
    }

    fn is_instrumented(&self) -> bool {
        true
    }
}

pub struct InstrumentedFeedbackCollector {
    inner: Arc<dyn FeedbackCollector>,
    integration: Arc<Integration>,
}

impl InstrumentedFeedbackCollector {
    pub(crate) fn new(inner: Arc<dyn FeedbackCollector>, integration: Arc<Integration>) -> Self {
        Self { inner, integration }
    }
}

impl FeedbackCollector for InstrumentedFeedbackCollector {
    fn capture_research_output(&self, result: &Value, question: &str, session_id: &str) -> anyhow::Result<Value> {
        let captured = self.inner.capture_research_output(result, question, session_id)?;
        self.integration.record_context_event(
            "rlhf_capture",
            &format!("Research output captured for feedback: {session_id}"),
            0.5,
        );
        Ok(captured)
    }

    fn is_instrumented(&self) -> bool {
        true
    }
}
