use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::capability::{FeedbackCollector, MemoryManager, ResearchLoop, ToolExecutor};
use super::decorators::{InstrumentedFeedbackCollector, InstrumentedMemoryManager, InstrumentedResearchLoop, InstrumentedToolExecutor};
use crate::config::IntegrationConfig;
use crate::error::IntegrationError;
use crate::ingest::IngestionClient;
use crate::integration::Integration;

/// The capabilities a research agent hands to the integration for wiring.
///
/// The agent calls through these handles; wiring swaps them for decorated
/// ones in place.
#[derive(Clone, Default)]
pub struct HostAgent {
    pub memory_manager: Option<Arc<dyn MemoryManager>>,
    pub tool_executor: Option<Arc<dyn ToolExecutor>>,
    pub research_loop: Option<Arc<dyn ResearchLoop>>,
    pub feedback_collector: Option<Arc<dyn FeedbackCollector>>,
    pub rlhf_enabled: bool,
}

/// Which capabilities `attach` instrumented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AttachReport {
    pub memory_manager: bool,
    pub tool_executor: bool,
    pub research_loop: bool,
    pub feedback_collector: bool,
}

// A capability that is already a decorator, from this integration or any
// other, comes back unchanged: a handle carries at most one layer.
impl Integration {
    pub fn instrument_memory_manager(self: &Arc<Self>, host: &Arc<dyn MemoryManager>) -> Arc<dyn MemoryManager> {
        if host.is_instrumented() {
            debug!(method = "save_research_finding", "memory manager already instrumented");
            return Arc::clone(host);
        }
        let integration = Arc::clone(self);
        let wrapped = self.bindings().bind(host, "save_research_finding", move |inner| {
            Arc::new(InstrumentedMemoryManager::new(inner, integration)) as Arc<dyn MemoryManager>
        });
        info!("memory manager integrated with semantic graph");
        wrapped
    }

    pub fn instrument_tool_executor(self: &Arc<Self>, host: &Arc<dyn ToolExecutor>) -> Arc<dyn ToolExecutor> {
        if host.is_instrumented() {
            debug!(method = "invoke", "tool executor already instrumented");
            return Arc::clone(host);
        }
        let integration = Arc::clone(self);
        let wrapped = self.bindings().bind(host, "invoke", move |inner| {
            Arc::new(InstrumentedToolExecutor::new(inner, integration)) as Arc<dyn ToolExecutor>
        });
        info!("tool executor integrated with semantic graph");
        wrapped
    }

    pub fn instrument_research_loop(self: &Arc<Self>, host: &Arc<dyn ResearchLoop>) -> Arc<dyn ResearchLoop> {
        if host.is_instrumented() {
            debug!(method = "execute_research_step", "research loop already instrumented");
            return Arc::clone(host);
        }
        let integration = Arc::clone(self);
        let wrapped = self.bindings().bind(host, "execute_research_step", move |inner| {
            Arc::new(InstrumentedResearchLoop::new(inner, integration)) as Arc<dyn ResearchLoop>
        });
        info!("research loop integrated with semantic graph");
        wrapped
    }

    pub fn instrument_feedback_collector(self: &Arc<Self>, host: &Arc<dyn FeedbackCollector>) -> Arc<dyn FeedbackCollector> {
        if host.is_instrumented() {
            debug!(method = "capture_research_output", "feedback collector already instrumented");
            return Arc::clone(host);
        }
        let integration = Arc::clone(self);
        let wrapped = self.bindings().bind(host, "capture_research_output", move |inner| {
            Arc::new(InstrumentedFeedbackCollector::new(inner, integration)) as Arc<dyn FeedbackCollector>
        });
        info!("RLHF feedback collector integrated with semantic graph");
        wrapped
    }

    /// Instruments every capability `agent` exposes.
    ///
    /// The research loop is required. The feedback collector is only wired
    /// when RLHF is enabled. On error the agent is left untouched.
    pub fn attach(self: &Arc<Self>, agent: &mut HostAgent) -> Result<AttachReport, IntegrationError> {
        let research_loop = agent
            .research_loop
            .as_ref()
            .ok_or(IntegrationError::MissingCollaborator("research_loop"))?;

        let research_loop = self.instrument_research_loop(research_loop);
        let memory_manager = agent.memory_manager.as_ref().map(|m| self.instrument_memory_manager(m));
        let tool_executor = agent.tool_executor.as_ref().map(|t| self.instrument_tool_executor(t));
        let feedback_collector = match (&agent.feedback_collector, agent.rlhf_enabled) {
            (Some(collector), true) => Some(self.instrument_feedback_collector(collector)),
            _ => None,
        };

        let report = AttachReport {
            memory_manager: memory_manager.is_some(),
            tool_executor: tool_executor.is_some(),
            research_loop: true,
            feedback_collector: feedback_collector.is_some(),
        };

        agent.research_loop = Some(research_loop);
        if memory_manager.is_some() {
            agent.memory_manager = memory_manager;
        }
        if tool_executor.is_some() {
            agent.tool_executor = tool_executor;
        }
        if feedback_collector.is_some() {
            agent.feedback_collector = feedback_collector;
        }
        Ok(report)
    }
}

/// Builds an integration over `client` and attaches it to `agent`.
///
/// Returns `None` when wiring fails; the agent then keeps running with its
/// original, uninstrumented capabilities.
pub fn integrate_research_agent(
    agent: &mut HostAgent,
    client: Arc<dyn IngestionClient>,
    config: IntegrationConfig,
) -> Option<Arc<Integration>> {
    let integration = Arc::new(Integration::with_config(client, config));
    match integration.attach(agent) {
        Ok(report) => {
            info!(?report, "research agent integration with semantic graph completed");
            Some(integration)
        }
        Err(e) => {
            warn!(error = %e, "semantic graph integration failed, running uninstrumented");
            None
        }
    }
}
