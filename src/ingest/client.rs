use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ForwardingError;
use crate::event::EventRecord;
use crate::hooks::payload::{PlanningRequest, PreferenceFeedback, RetrievalQuery};

/// One hit returned by graph-aware retrieval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedItem {
    pub label: String,
    pub score: f64,
    pub method: String,
}

/// Result of an enhanced retrieval call.
///
/// A hook that fails to forward returns this with `error` set and no results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    #[serde(default)]
    pub results: Vec<RetrievedItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RetrievalResult {
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            results: Vec::new(),
            error: Some(error.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanStep {
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools_suggested: Option<Vec<String>>,
}

/// Result of an enhanced planning call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanResult {
    #[serde(default)]
    pub plan_steps: Vec<PlanStep>,
    #[serde(default)]
    pub graph_connectivity: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PlanResult {
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            plan_steps: Vec::new(),
            graph_connectivity: Value::Null,
            error: Some(error.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Boundary to the knowledge-graph ingestion pipeline.
///
/// Every call is synchronous and may fail; callers in this crate catch the
/// failure once and never retry.
pub trait IngestionClient: Send + Sync {
    /// Fire-and-forget ingest of a normalized record.
    fn ingest(&self, record: EventRecord) -> Result<(), ForwardingError>;

    fn enhanced_retrieval(&self, query: &RetrievalQuery) -> Result<RetrievalResult, ForwardingError>;

    fn enhanced_planning(&self, request: &PlanningRequest) -> Result<PlanResult, ForwardingError>;

    /// Returns the identifier the pipeline assigned to the preference.
    fn record_user_feedback(&self, feedback: &PreferenceFeedback) -> Result<String, ForwardingError>;

    fn record_operation_time(&self, name: &str, millis: f64) -> Result<(), ForwardingError>;

    fn record_error(&self, kind: &str) -> Result<(), ForwardingError>;

    fn record_context_event(&self, context_type: &str, content: &str, relevance: f64) -> Result<(), ForwardingError>;

    /// Nested statistics (graph size, ingestion counters, health score).
    fn comprehensive_stats(&self) -> Result<Value, ForwardingError>;

    /// Health data for the monitoring dashboard.
    fn dashboard(&self) -> Result<Value, ForwardingError>;

    /// Drain whatever the pipeline buffers internally.
    fn flush_pending(&self) -> Result<(), ForwardingError>;
}
