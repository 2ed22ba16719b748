//! Capabilities the host agent exposes and this crate decorates.
//!
//! Host failures are opaque `anyhow::Error`s; decorators hand them back to
//! the caller untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub trait MemoryManager: Send + Sync {
    fn save_research_finding(&self, content: &str, importance: f64, extras: &Map<String, Value>) -> anyhow::Result<Value>;

    /// Episode the memory manager is currently writing into, if any.
    fn current_episode_id(&self) -> Option<String> {
        None
    }

    /// True for decorators produced by this crate.
    #[doc(hidden)]
    fn is_instrumented(&self) -> bool {
        false
    }
}

pub trait ToolExecutor: Send + Sync {
    fn invoke(&self, invocation: &ToolInvocation) -> anyhow::Result<Value>;

    #[doc(hidden)]
    fn is_instrumented(&self) -> bool {
        false
    }
}

pub trait ResearchLoop: Send + Sync {
    fn execute_research_step(&self, state: ResearchState) -> anyhow::Result<ResearchState>;

    #[doc(hidden)]
    fn is_instrumented(&self) -> bool {
        false
    }
}

pub trait FeedbackCollector: Send + Sync {
    fn capture_research_output(&self, result: &Value, question: &str, session_id: &str) -> anyhow::Result<Value>;

    #[doc(hidden)]
    fn is_instrumented(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolInvocation {
    pub tool: String,
    pub tool_input: Value,
}

impl ToolInvocation {
    pub fn new(tool: impl Into<String>, tool_input: impl Into<Value>) -> Self {
        Self {
            tool: tool.into(),
            tool_input: tool_input.into(),
        }
    }
}

impl Default for ToolInvocation {
    fn default() -> Self {
        Self {
            tool: "unknown".to_string(),
            tool_input: Value::String(String::new()),
        }
    }
}

/// One finding appended by a research step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResearchFinding {
    pub step: u64,
    pub step_description: String,
    pub analysis: String,
    pub external_research: Vec<Value>,
}

/// Research loop state. Findings are kept in the order the steps produced them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResearchState {
    pub question: String,
    pub findings: Vec<ResearchFinding>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ResearchState {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            ..Self::default()
        }
    }

    pub fn latest_finding(&self) -> Option<&ResearchFinding> {
        self.findings.last()
    }
}

/// Text form of a host value: strings verbatim, anything else as JSON.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
