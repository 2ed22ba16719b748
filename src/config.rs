use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::IntegrationError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegrationConfig {
    /// Count an event as processed even when forwarding it failed.
    pub count_forwarding_failures: bool,
    /// Confidence attached to findings lifted from research-loop steps.
    pub research_finding_confidence: f64,
    /// Session id used when the memory manager has no current episode.
    pub default_session_id: String,
    pub tool_usage_context: String,
}

impl Default for IntegrationConfig {
    fn default() -> Self {
        Self {
            count_forwarding_failures: false,
            research_finding_confidence: 0.7,
            default_session_id: "default".to_string(),
            tool_usage_context: "research".to_string(),
        }
    }
}

impl IntegrationConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, IntegrationError> {
        serde_json::from_str(raw).map_err(IntegrationError::ConfigParse)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, IntegrationError> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }
}
