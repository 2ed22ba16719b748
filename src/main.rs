use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{anyhow, Context};
use graphlink::hooks::{MonitoringTick, PlanningRequest, PreferenceFeedback, RetrievalQuery};
use graphlink::intercept::{
    FeedbackCollector, MemoryManager, ResearchFinding, ResearchLoop, ResearchState, ToolExecutor, ToolInvocation,
};
use graphlink::{integrate_research_agent, HostAgent, InMemoryGraphClient, IntegrationConfig};
use serde_json::{json, Map, Value};
use tracing_subscriber::EnvFilter;

/// Demo host: keeps saved findings in a notebook.
#[derive(Default)]
struct Notebook {
    entries: Mutex<Vec<String>>,
}

impl MemoryManager for Notebook {
    fn save_research_finding(&self, content: &str, _importance: f64, _extras: &Map<String, Value>) -> anyhow::Result<Value> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.push(content.to_string());
        Ok(json!({ "saved": entries.len() }))
    }

    fn current_episode_id(&self) -> Option<String> {
        Some("demo-episode".to_string())
    }
}

struct Toolbox;

impl ToolExecutor for Toolbox {
    fn invoke(&self, invocation: &ToolInvocation) -> anyhow::Result<Value> {
        match invocation.tool.as_str() {
            "calculator" => Ok(json!(42)),
            "web_search" => Ok(json!(["graph neural networks survey", "message passing primer"])),
            other => Err(anyhow!("tool `{other}` is unavailable")),
        }
    }
}

struct StepwiseResearch;

impl ResearchLoop for StepwiseResearch {
    fn execute_research_step(&self, mut state: ResearchState) -> anyhow::Result<ResearchState> {
        let step = state.findings.len() as u64 + 1;
        state.findings.push(ResearchFinding {
            step,
            step_description: format!("step {step} of {}", state.question),
            analysis: format!("Graph neural networks propagate messages along edges (step {step})"),
            external_research: vec![json!("https://example.org/gnn")],
        });
        Ok(state)
    }
}

struct ConsoleFeedback;

impl FeedbackCollector for ConsoleFeedback {
    fn capture_research_output(&self, result: &Value, question: &str, _session_id: &str) -> anyhow::Result<Value> {
        Ok(json!({ "question": question, "captured": result }))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    tracing::info!("graphlink demo starting");

    let config = match std::env::var("GRAPHLINK_CONFIG") {
        Ok(path) => IntegrationConfig::from_path(&path).with_context(|| format!("loading {path}"))?,
        Err(_) => IntegrationConfig::default(),
    };

    let client = Arc::new(InMemoryGraphClient::new());
    let mut agent = HostAgent {
        memory_manager: Some(Arc::new(Notebook::default())),
        tool_executor: Some(Arc::new(Toolbox)),
        research_loop: Some(Arc::new(StepwiseResearch)),
        feedback_collector: Some(Arc::new(ConsoleFeedback)),
        rlhf_enabled: true,
    };

    let Some(integration) = integrate_research_agent(&mut agent, client.clone(), config) else {
        tracing::warn!("running without semantic graph integration");
        return Ok(());
    };

    let research = agent.research_loop.clone().context("research loop missing")?;
    let mut state = ResearchState::new("How do graph neural networks work?");
    for _ in 0..3 {
        state = research.execute_research_step(state)?;
    }

    if let Some(memory) = &agent.memory_manager {
        let mut extras = Map::new();
        extras.insert("concepts".to_string(), json!(["gnn", "message passing"]));
        memory.save_research_finding("GNNs aggregate neighbour features.", 0.8, &extras)?;
    }

    // Parallel tool calls; one of them fails on purpose.
    let tools = agent.tool_executor.clone().context("tool executor missing")?;
    let calls = ["calculator", "web_search", "broken_tool"].map(|name| {
        let tools = Arc::clone(&tools);
        tokio::task::spawn_blocking(move || tools.invoke(&ToolInvocation::new(name, json!({ "q": "gnn" }))))
    });
    for call in calls {
        match call.await? {
            Ok(output) => tracing::info!(%output, "tool returned"),
            Err(e) => tracing::warn!(error = %e, "tool failed"),
        }
    }

    let retrieval = integration.handle_retrieval(RetrievalQuery {
        query: "graph neural networks".to_string(),
        ..RetrievalQuery::default()
    });
    tracing::info!(hits = retrieval.results.len(), "retrieval finished");

    let plan = integration.handle_planning(PlanningRequest {
        research_question: state.question.clone(),
        ..PlanningRequest::default()
    });
    tracing::info!(steps = plan.plan_steps.len(), "plan generated");

    let preference = integration.handle_preference(PreferenceFeedback {
        user_id: "demo_user".to_string(),
        preferred_content: "Concise answer with citations".to_string(),
        rejected_content: "Long answer without sources".to_string(),
        ..PreferenceFeedback::default()
    });
    tracing::info!(%preference, "preference logged");

    integration.handle_monitoring(MonitoringTick {
        step_name: "research_cycle".to_string(),
        execution_time: 1.25,
        ..MonitoringTick::default()
    });

    if let Some(feedback) = &agent.feedback_collector {
        feedback.capture_research_output(&json!({ "answer": "see findings" }), &state.question, "demo-session")?;
    }

    integration.process_pending_events()?;

    println!("{}", serde_json::to_string_pretty(&integration.statistics())?);
    println!("{}", serde_json::to_string_pretty(&integration.health())?);
    Ok(())
}
