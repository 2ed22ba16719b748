use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::{json, Value};
use uuid::Uuid;

use super::client::{IngestionClient, PlanResult, PlanStep, RetrievalResult, RetrievedItem};
use crate::error::ForwardingError;
use crate::event::EventRecord;
use crate::hooks::payload::{PlanningRequest, PreferenceFeedback, RetrievalQuery};

const LABEL_FIELDS: [&str; 6] = ["content", "finding", "tool_name", "query", "research_question", "step_name"];
const MAX_LABEL_CHARS: usize = 80;
/// Bound on every retained buffer; the oldest entries are dropped first.
const MAX_RETAINED: usize = 10_000;

#[derive(Debug, Clone, PartialEq)]
pub struct ContextEvent {
    pub context_type: String,
    pub content: String,
    pub relevance: f64,
}

#[derive(Debug, Default)]
struct GraphState {
    capacity: usize,
    pending: VecDeque<EventRecord>,
    nodes: VecDeque<EventRecord>,
    ingested_by_source: BTreeMap<&'static str, u64>,
    preferences: VecDeque<(String, PreferenceFeedback)>,
    operation_times: HashMap<String, VecDeque<f64>>,
    operations: u64,
    errors: BTreeMap<String, u64>,
    context_events: VecDeque<ContextEvent>,
    flushes: u64,
}

fn push_bounded<T>(buffer: &mut VecDeque<T>, item: T, capacity: usize) {
    if buffer.len() >= capacity {
        buffer.pop_front();
    }
    buffer.push_back(item);
}

impl GraphState {
    fn operations(&self) -> u64 {
        self.operations
    }

    fn error_total(&self) -> u64 {
        self.errors.values().sum()
    }

    /// `1 - errors / operations`, 1.0 before any operation was timed.
    fn health_score(&self) -> f64 {
        let operations = self.operations();
        if operations == 0 {
            return 1.0;
        }
        (1.0 - self.error_total() as f64 / operations as f64).clamp(0.0, 1.0)
    }

    fn search(&self, query: &str, top_k: usize, node_types: Option<&[String]>, method: &str) -> Vec<RetrievedItem> {
        let terms = tokenize(query);
        if terms.is_empty() || top_k == 0 {
            return Vec::new();
        }

        let mut hits: Vec<RetrievedItem> = self
            .nodes
            .iter()
            .chain(self.pending.iter())
            .filter(|record| match node_types {
                Some(types) => types.iter().any(|t| t == record.kind().source()),
                None => true,
            })
            .filter_map(|record| {
                let haystack = tokenize(&record_text(record));
                let matched = terms.iter().filter(|term| haystack.contains(term)).count();
                (matched > 0).then(|| RetrievedItem {
                    label: label(record),
                    score: matched as f64 / terms.len() as f64,
                    method: method.to_string(),
                })
            })
            .collect();

        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        hits.truncate(top_k);
        hits
    }
}

/// Self-contained ingestion pipeline kept entirely in memory.
///
/// Ingested records wait in a pending queue until `flush_pending` moves them
/// into the node store. Retrieval looks at both. Flushed nodes, preferences,
/// timings per operation and context events are each capped; counters are not.
#[derive(Debug)]
pub struct InMemoryGraphClient {
    state: Mutex<GraphState>,
}

impl Default for InMemoryGraphClient {
    fn default() -> Self {
        Self::with_capacity(MAX_RETAINED)
    }
}

impl InMemoryGraphClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            state: Mutex::new(GraphState {
                capacity: capacity.max(1),
                ..GraphState::default()
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, GraphState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn pending_len(&self) -> usize {
        self.state().pending.len()
    }

    pub fn node_count(&self) -> usize {
        self.state().nodes.len()
    }

    /// Every ingested record, flushed first, then pending.
    pub fn records(&self) -> Vec<EventRecord> {
        let state = self.state();
        state.nodes.iter().chain(state.pending.iter()).cloned().collect()
    }

    pub fn context_events(&self) -> Vec<ContextEvent> {
        self.state().context_events.iter().cloned().collect()
    }

    pub fn error_count(&self, kind: &str) -> u64 {
        self.state().errors.get(kind).copied().unwrap_or(0)
    }

    pub fn operation_times(&self, name: &str) -> Vec<f64> {
        self.state()
            .operation_times
            .get(name)
            .map(|times| times.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn preference_count(&self) -> usize {
        self.state().preferences.len()
    }
}

impl IngestionClient for InMemoryGraphClient {
    fn ingest(&self, record: EventRecord) -> Result<(), ForwardingError> {
        let mut state = self.state();
        *state.ingested_by_source.entry(record.kind().source()).or_insert(0) += 1;
        state.pending.push_back(record);
        Ok(())
    }

    fn enhanced_retrieval(&self, query: &RetrievalQuery) -> Result<RetrievalResult, ForwardingError> {
        let state = self.state();
        let results = state.search(&query.query, query.top_k, query.node_types.as_deref(), &query.strategy);
        Ok(RetrievalResult { results, error: None })
    }

    fn enhanced_planning(&self, request: &PlanningRequest) -> Result<PlanResult, ForwardingError> {
        let state = self.state();
        let related = state.search(&request.research_question, request.max_steps, None, &request.strategy);

        let mut plan_steps = vec![PlanStep {
            description: format!("Investigate background for: {}", request.research_question),
            tools_suggested: Some(vec!["web_search".to_string()]),
        }];
        plan_steps.extend(related.iter().map(|hit| PlanStep {
            description: format!("Review related knowledge: {}", hit.label),
            tools_suggested: None,
        }));
        plan_steps.push(PlanStep {
            description: "Synthesize findings into an answer".to_string(),
            tools_suggested: None,
        });
        plan_steps.truncate(request.max_steps);

        Ok(PlanResult {
            plan_steps,
            graph_connectivity: json!({
                "nodes": state.nodes.len() + state.pending.len(),
                "related_nodes": related.len(),
            }),
            error: None,
        })
    }

    fn record_user_feedback(&self, feedback: &PreferenceFeedback) -> Result<String, ForwardingError> {
        let preference_id = format!("pref_{}", Uuid::new_v4());
        let mut state = self.state();
        let capacity = state.capacity;
        push_bounded(&mut state.preferences, (preference_id.clone(), feedback.clone()), capacity);
        Ok(preference_id)
    }

    fn record_operation_time(&self, name: &str, millis: f64) -> Result<(), ForwardingError> {
        let mut state = self.state();
        let capacity = state.capacity;
        state.operations += 1;
        let times = state.operation_times.entry(name.to_string()).or_default();
        push_bounded(times, millis, capacity);
        Ok(())
    }

    fn record_error(&self, kind: &str) -> Result<(), ForwardingError> {
        *self.state().errors.entry(kind.to_string()).or_insert(0) += 1;
        Ok(())
    }

    fn record_context_event(&self, context_type: &str, content: &str, relevance: f64) -> Result<(), ForwardingError> {
        let event = ContextEvent {
            context_type: context_type.to_string(),
            content: content.to_string(),
            relevance,
        };
        let mut state = self.state();
        let capacity = state.capacity;
        push_bounded(&mut state.context_events, event, capacity);
        Ok(())
    }

    fn comprehensive_stats(&self) -> Result<Value, ForwardingError> {
        let state = self.state();
        Ok(json!({
            "graph": {
                "nodes": state.nodes.len(),
                "pending": state.pending.len(),
            },
            "ingestion": {
                "by_source": state.ingested_by_source,
                "flushes": state.flushes,
            },
            "preferences": state.preferences.len(),
            "context_events": state.context_events.len(),
            "health_score": state.health_score(),
        }))
    }

    fn dashboard(&self) -> Result<Value, ForwardingError> {
        let state = self.state();
        Ok(json!({
            "health_score": state.health_score(),
            "total_operations": state.operations(),
            "total_errors": state.error_total(),
            "pending_events": state.pending.len(),
            "nodes": state.nodes.len(),
        }))
    }

    fn flush_pending(&self) -> Result<(), ForwardingError> {
        let mut state = self.state();
        let capacity = state.capacity;
        let drained: Vec<EventRecord> = state.pending.drain(..).collect();
        for record in drained {
            push_bounded(&mut state.nodes, record, capacity);
        }
        state.flushes += 1;
        Ok(())
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| word.chars().count() > 2)
        .map(str::to_lowercase)
        .collect()
}

fn record_text(record: &EventRecord) -> String {
    record
        .payload()
        .values()
        .filter_map(Value::as_str)
        .collect::<Vec<_>>()
        .join(" ")
}

fn label(record: &EventRecord) -> String {
    LABEL_FIELDS
        .iter()
        .filter_map(|field| record.get(field).and_then(Value::as_str))
        .find(|text| !text.is_empty())
        .map(|text| text.chars().take(MAX_LABEL_CHARS).collect())
        .unwrap_or_else(|| record.kind().source().to_string())
}
