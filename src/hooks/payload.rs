//! Typed hook payloads.
//!
//! Every field is defaulted, so a payload deserialized from a partial (or
//! empty) JSON object is always valid. A field of the wrong type is rejected.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Deserializes a hook payload from loosely shaped JSON.
///
/// Members set to `null` count as absent and take their defaults; a `null`
/// payload is an empty one.
pub fn from_json<T: DeserializeOwned>(raw: Value) -> serde_json::Result<T> {
    let raw = match raw {
        Value::Null => Value::Object(Map::new()),
        Value::Object(mut fields) => {
            fields.retain(|_, value| !value.is_null());
            Value::Object(fields)
        }
        other => other,
    };
    serde_json::from_value(raw)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryWrite {
    pub content: String,
    pub importance: f64,
    pub memory_type: String,
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concepts: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub citations: Option<Vec<Value>>,
}

impl Default for MemoryWrite {
    fn default() -> Self {
        Self {
            content: String::new(),
            importance: 0.5,
            memory_type: "general".to_string(),
            session_id: "default".to_string(),
            concepts: None,
            citations: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolUsage {
    pub tool_name: String,
    pub tool_input: String,
    pub tool_output: String,
    /// Seconds.
    pub execution_time: f64,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub context: String,
}

impl Default for ToolUsage {
    fn default() -> Self {
        Self {
            tool_name: String::new(),
            tool_input: String::new(),
            tool_output: String::new(),
            execution_time: 0.0,
            success: true,
            error: None,
            context: "research".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Finding {
    pub finding: String,
    pub analysis: String,
    pub confidence: f64,
    pub sources: Vec<Value>,
    pub step_info: Map<String, Value>,
}

impl Finding {
    /// `step_info.step_number`, or 0 when absent or not a number.
    pub fn research_step(&self) -> u64 {
        self.step_info
            .get("step_number")
            .and_then(Value::as_u64)
            .unwrap_or(0)
    }
}

impl Default for Finding {
    fn default() -> Self {
        Self {
            finding: String::new(),
            analysis: String::new(),
            confidence: 0.5,
            sources: Vec::new(),
            step_info: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalQuery {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_embedding: Option<Vec<f32>>,
    pub strategy: String,
    pub top_k: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_types: Option<Vec<String>>,
}

impl Default for RetrievalQuery {
    fn default() -> Self {
        Self {
            query: String::new(),
            query_embedding: None,
            strategy: "hybrid".to_string(),
            top_k: 10,
            node_types: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanningRequest {
    pub research_question: String,
    pub context: Map<String, Value>,
    pub strategy: String,
    pub max_steps: usize,
}

impl Default for PlanningRequest {
    fn default() -> Self {
        Self {
            research_question: String::new(),
            context: Map::new(),
            strategy: "hybrid".to_string(),
            max_steps: 8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferenceFeedback {
    pub user_id: String,
    pub preferred_content: String,
    pub rejected_content: String,
    pub feedback_type: String,
    pub confidence: f64,
    pub context: String,
}

impl Default for PreferenceFeedback {
    fn default() -> Self {
        Self {
            user_id: "anonymous".to_string(),
            preferred_content: String::new(),
            rejected_content: String::new(),
            feedback_type: "quality".to_string(),
            confidence: 1.0,
            context: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringTick {
    pub step_name: String,
    /// Seconds.
    pub execution_time: f64,
    pub success: bool,
    pub metrics: Map<String, Value>,
    pub error_type: String,
}

impl Default for MonitoringTick {
    fn default() -> Self {
        Self {
            step_name: "unknown".to_string(),
            execution_time: 0.0,
            success: true,
            metrics: Map::new(),
            error_type: "general_error".to_string(),
        }
    }
}
