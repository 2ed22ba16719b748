#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use graphlink::error::ForwardingError;
use graphlink::event::EventRecord;
use graphlink::hooks::{PlanningRequest, PreferenceFeedback, RetrievalQuery};
use graphlink::ingest::{IngestionClient, InMemoryGraphClient, PlanResult, RetrievalResult};
use graphlink::intercept::{FeedbackCollector, MemoryManager, ResearchFinding, ResearchLoop, ResearchState, ToolExecutor, ToolInvocation};
use graphlink::{EventKind, Integration, IntegrationConfig};
use serde_json::{json, Map, Value};

/// In-memory graph whose calls can be made to fail on demand.
#[derive(Default)]
pub struct FlakyClient {
    pub graph: InMemoryGraphClient,
    fail_all: AtomicBool,
    fail_ingest: AtomicBool,
}

impl FlakyClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        let client = Self::new();
        client.set_failing(true);
        client
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail_all.store(failing, Ordering::SeqCst);
    }

    /// Only `ingest` fails; request/response calls still work.
    pub fn set_ingest_failing(&self, failing: bool) {
        self.fail_ingest.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), ForwardingError> {
        if self.fail_all.load(Ordering::SeqCst) {
            Err(ForwardingError::Backend("graph offline".to_string()))
        } else {
            Ok(())
        }
    }

    pub fn records_of(&self, kind: EventKind) -> Vec<EventRecord> {
        self.graph.records().into_iter().filter(|r| r.kind() == kind).collect()
    }
}

impl IngestionClient for FlakyClient {
    fn ingest(&self, record: EventRecord) -> Result<(), ForwardingError> {
        self.check()?;
        if self.fail_ingest.load(Ordering::SeqCst) {
            return Err(ForwardingError::Rejected("ingest disabled".to_string()));
        }
        self.graph.ingest(record)
    }

    fn enhanced_retrieval(&self, query: &RetrievalQuery) -> Result<RetrievalResult, ForwardingError> {
        self.check()?;
        self.graph.enhanced_retrieval(query)
    }

    fn enhanced_planning(&self, request: &PlanningRequest) -> Result<PlanResult, ForwardingError> {
        self.check()?;
        self.graph.enhanced_planning(request)
    }

    fn record_user_feedback(&self, feedback: &PreferenceFeedback) -> Result<String, ForwardingError> {
        self.check()?;
        self.graph.record_user_feedback(feedback)
    }

    fn record_operation_time(&self, name: &str, millis: f64) -> Result<(), ForwardingError> {
        self.check()?;
        self.graph.record_operation_time(name, millis)
    }

    fn record_error(&self, kind: &str) -> Result<(), ForwardingError> {
        self.check()?;
        self.graph.record_error(kind)
    }

    fn record_context_event(&self, context_type: &str, content: &str, relevance: f64) -> Result<(), ForwardingError> {
        self.check()?;
        self.graph.record_context_event(context_type, content, relevance)
    }

    fn comprehensive_stats(&self) -> Result<Value, ForwardingError> {
        self.check()?;
        self.graph.comprehensive_stats()
    }

    fn dashboard(&self) -> Result<Value, ForwardingError> {
        self.check()?;
        self.graph.dashboard()
    }

    fn flush_pending(&self) -> Result<(), ForwardingError> {
        self.check()?;
        self.graph.flush_pending()
    }
}

pub fn integration(client: &Arc<FlakyClient>) -> Arc<Integration> {
    Arc::new(Integration::new(client.clone()))
}

pub fn integration_with(client: &Arc<FlakyClient>, config: IntegrationConfig) -> Arc<Integration> {
    Arc::new(Integration::with_config(client.clone(), config))
}

/// Host error type, used to check that decorators hand errors back untouched.
#[derive(Debug, thiserror::Error)]
#[error("rate limited by {0}")]
pub struct RateLimited(pub String);

/// Tool executor that counts calls and fails for the tool named "broken".
#[derive(Default)]
pub struct CountingTools {
    pub calls: AtomicUsize,
}

impl ToolExecutor for CountingTools {
    fn invoke(&self, invocation: &ToolInvocation) -> anyhow::Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match invocation.tool.as_str() {
            "broken" => Err(RateLimited("search-api".to_string()).into()),
            name => Ok(json!(format!("{name} ok"))),
        }
    }
}

#[derive(Default)]
pub struct Notebook {
    pub saved: Mutex<Vec<String>>,
    pub fail: AtomicBool,
    pub episode: Option<String>,
}

impl MemoryManager for Notebook {
    fn save_research_finding(&self, content: &str, _importance: f64, _extras: &Map<String, Value>) -> anyhow::Result<Value> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(RateLimited("disk".to_string()).into());
        }
        let mut saved = self.saved.lock().unwrap();
        saved.push(content.to_string());
        Ok(json!({ "id": saved.len() }))
    }

    fn current_episode_id(&self) -> Option<String> {
        self.episode.clone()
    }
}

/// Research loop that appends one finding per step, or fails when asked.
#[derive(Default)]
pub struct Stepper {
    pub fail: AtomicBool,
    pub skip_findings: AtomicBool,
}

impl ResearchLoop for Stepper {
    fn execute_research_step(&self, mut state: ResearchState) -> anyhow::Result<ResearchState> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(RateLimited("planner".to_string()).into());
        }
        if !self.skip_findings.load(Ordering::SeqCst) {
            let step = state.findings.len() as u64 + 1;
            state.findings.push(ResearchFinding {
                step,
                step_description: format!("step {step}"),
                analysis: format!("analysis for step {step}"),
                external_research: vec![json!("source-a")],
            });
        }
        Ok(state)
    }
}

#[derive(Default)]
pub struct Collector {
    pub fail: AtomicBool,
}

impl FeedbackCollector for Collector {
    fn capture_research_output(&self, result: &Value, _question: &str, session_id: &str) -> anyhow::Result<Value> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(RateLimited("collector".to_string()).into());
        }
        Ok(json!({ "session": session_id, "result": result }))
    }
}
