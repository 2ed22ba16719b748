use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};

use crate::config::IntegrationConfig;
use crate::error::{ForwardingError, IntegrationError};
use crate::event::{EventKind, EventRecord};
use crate::hooks::normalize;
use crate::hooks::{
    Finding, HookAck, HookRegistry, MemoryWrite, MonitoringTick, PlanningRequest, PreferenceAck, PreferenceFeedback,
    RetrievalQuery, ToolUsage,
};
use crate::ingest::{IngestionClient, PlanResult, RetrievalResult};
use crate::intercept::{BindingInfo, BindingTable};
use crate::telemetry::{HealthReporter, HealthSnapshot, IntegrationStats, StatsAggregator, StatsSnapshot};

#[derive(Debug, Clone, Serialize)]
pub struct IntegrationStatistics {
    pub integration_stats: IntegrationStats,
    pub semantic_graph_stats: Value,
    pub hooks_registered: usize,
    pub total_integrations: u64,
    pub last_updated: DateTime<Utc>,
}

/// Connects a research agent's lifecycle events to the semantic graph.
///
/// Owns its statistics, hook registry and binding table; the ingestion
/// client is shared.
pub struct Integration {
    client: Arc<dyn IngestionClient>,
    registry: HookRegistry,
    stats: StatsAggregator,
    bindings: BindingTable,
    config: IntegrationConfig,
}

impl Integration {
    pub fn new(client: Arc<dyn IngestionClient>) -> Self {
        Self::with_config(client, IntegrationConfig::default())
    }

    pub fn with_config(client: Arc<dyn IngestionClient>, config: IntegrationConfig) -> Self {
        let registry = HookRegistry::standard();
        info!(hooks = registry.len(), "research agent semantic graph integration initialized");
        Self {
            client,
            registry,
            stats: StatsAggregator::new(),
            bindings: BindingTable::new(),
            config,
        }
    }

    pub fn config(&self) -> &IntegrationConfig {
        &self.config
    }

    pub fn client(&self) -> &Arc<dyn IngestionClient> {
        &self.client
    }

    pub fn registry(&self) -> &HookRegistry {
        &self.registry
    }

    pub fn hooks_registered(&self) -> usize {
        self.registry.len()
    }

    pub(crate) fn bindings(&self) -> &BindingTable {
        &self.bindings
    }

    pub fn active_bindings(&self) -> Vec<BindingInfo> {
        self.bindings.infos()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    fn forward(&self, record: EventRecord) -> Result<(), ForwardingError> {
        debug!(kind = %record.kind(), priority = record.priority().as_u8(), "forwarding record");
        self.client.ingest(record)
    }

    /// Counts a hook's outcome and logs failures.
    fn settle<T>(&self, kind: EventKind, outcome: Result<T, ForwardingError>) -> Result<T, ForwardingError> {
        match &outcome {
            Ok(_) => {
                self.stats.increment(kind);
            }
            Err(e) => {
                error!(hook = kind.hook_id(), error = %e, "semantic graph integration failed");
                self.stats.record_failure(kind);
                if self.config.count_forwarding_failures {
                    self.stats.increment(kind);
                }
            }
        }
        outcome
    }

    /// Memory write -> graph ingestion.
    pub fn handle_memory_output(&self, payload: MemoryWrite) -> HookAck {
        let record = normalize::memory_write(&payload, Utc::now());
        match self.settle(EventKind::MemoryWrite, self.forward(record)) {
            Ok(()) => HookAck::Recorded(normalize::memory_ack(&payload)),
            Err(e) => HookAck::Failed(format!("Memory integration error: {e}")),
        }
    }

    /// Tool invocation -> graph ingestion. Failed tools are logged like
    /// successful ones.
    pub fn handle_tool_usage(&self, payload: ToolUsage) -> HookAck {
        let record = normalize::tool_usage(&payload, Utc::now());
        match self.settle(EventKind::ToolUsage, self.forward(record)) {
            Ok(()) => HookAck::Recorded(normalize::tool_ack(&payload)),
            Err(e) => HookAck::Failed(format!("Tool usage integration error: {e}")),
        }
    }

    pub fn handle_finding(&self, payload: Finding) -> HookAck {
        let record = normalize::finding(&payload, Utc::now());
        match self.settle(EventKind::Finding, self.forward(record)) {
            Ok(()) => HookAck::Recorded(normalize::finding_ack(&payload)),
            Err(e) => HookAck::Failed(format!("Finding capture error: {e}")),
        }
    }

    /// Graph-aware retrieval. The result is returned as the pipeline gave it;
    /// a failure of either the retrieval or its log yields an empty, errored
    /// result.
    pub fn handle_retrieval(&self, query: RetrievalQuery) -> RetrievalResult {
        let outcome = self.client.enhanced_retrieval(&query).and_then(|result| {
            self.forward(normalize::retrieval_log(&query, &result, Utc::now()))?;
            Ok(result)
        });
        match self.settle(EventKind::Retrieval, outcome) {
            Ok(result) => result,
            Err(e) => RetrievalResult::failed(e.to_string()),
        }
    }

    pub fn handle_planning(&self, request: PlanningRequest) -> PlanResult {
        let outcome = self.client.enhanced_planning(&request).and_then(|plan| {
            self.forward(normalize::planning_log(&request, &plan, Utc::now()))?;
            Ok(plan)
        });
        match self.settle(EventKind::Planning, outcome) {
            Ok(plan) => plan,
            Err(e) => PlanResult::failed(e.to_string()),
        }
    }

    pub fn handle_preference(&self, feedback: PreferenceFeedback) -> PreferenceAck {
        let outcome = self.client.record_user_feedback(&feedback);
        match self.settle(EventKind::Preference, outcome) {
            Ok(preference_id) => PreferenceAck::Recorded { preference_id },
            Err(e) => PreferenceAck::Failed(format!("Preference logging error: {e}")),
        }
    }

    /// Step timing, error counts and a context event for one monitoring tick.
    pub fn handle_monitoring(&self, tick: MonitoringTick) -> HookAck {
        let outcome = self.report_monitoring(&tick);
        match self.settle(EventKind::Monitoring, outcome) {
            Ok(()) => HookAck::Recorded(normalize::monitoring_ack(&tick)),
            Err(e) => HookAck::Failed(format!("Monitoring integration error: {e}")),
        }
    }

    fn report_monitoring(&self, tick: &MonitoringTick) -> Result<(), ForwardingError> {
        self.client
            .record_operation_time(&tick.step_name, tick.execution_time * 1000.0)?;
        if !tick.success {
            self.client.record_error(&tick.error_type)?;
        }
        self.client
            .record_context_event("monitoring", &normalize::monitoring_context(tick), 0.3)
    }

    /// Uncounted context event; failures are logged and swallowed.
    pub fn record_context_event(&self, context_type: &str, content: &str, relevance: f64) -> bool {
        match self.client.record_context_event(context_type, content, relevance) {
            Ok(()) => true,
            Err(e) => {
                error!(context_type, error = %e, "context event failed");
                false
            }
        }
    }

    /// Runs the hook registered under `hook_id` on a raw JSON payload.
    pub fn dispatch(&self, hook_id: &str, raw: Value) -> Result<Value, IntegrationError> {
        let hook = self
            .registry
            .resolve(hook_id)
            .ok_or_else(|| IntegrationError::UnknownHook(hook_id.to_string()))?;
        hook(self, raw)
    }

    pub fn statistics(&self) -> IntegrationStatistics {
        let snapshot = self.stats.snapshot();
        let semantic_graph_stats = self.client.comprehensive_stats().unwrap_or_else(|e| {
            warn!(error = %e, "semantic graph stats unavailable");
            json!({ "error": e.to_string() })
        });
        IntegrationStatistics {
            integration_stats: snapshot.processed,
            semantic_graph_stats,
            hooks_registered: self.registry.len(),
            total_integrations: snapshot.total_processed(),
            last_updated: Utc::now(),
        }
    }

    pub fn health(&self) -> HealthSnapshot {
        let snapshot = self.stats.snapshot();
        let downstream = self.client.dashboard().unwrap_or_else(|e| {
            warn!(error = %e, "semantic graph dashboard unavailable");
            json!({ "error": e.to_string() })
        });
        HealthReporter::report(&snapshot, self.registry.len(), downstream)
    }

    /// Drains whatever the ingestion pipeline has buffered.
    pub fn process_pending_events(&self) -> Result<(), ForwardingError> {
        info!("processing pending semantic graph events");
        self.client.flush_pending().inspect_err(|e| {
            error!(error = %e, "flushing pending events failed");
        })
    }
}
