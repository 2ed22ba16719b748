use serde::{Deserialize, Serialize};
use std::fmt;

/// The seven lifecycle categories intercepted from the research agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    MemoryWrite,
    ToolUsage,
    Finding,
    Retrieval,
    Planning,
    Preference,
    Monitoring,
}

impl EventKind {
    pub const ALL: [EventKind; 7] = [
        EventKind::MemoryWrite,
        EventKind::ToolUsage,
        EventKind::Finding,
        EventKind::Retrieval,
        EventKind::Planning,
        EventKind::Preference,
        EventKind::Monitoring,
    ];

    /// Stable slot used by fixed-size per-kind tables.
    pub const fn index(self) -> usize {
        match self {
            EventKind::MemoryWrite => 0,
            EventKind::ToolUsage => 1,
            EventKind::Finding => 2,
            EventKind::Retrieval => 3,
            EventKind::Planning => 4,
            EventKind::Preference => 5,
            EventKind::Monitoring => 6,
        }
    }

    /// Identifier the hook is registered under.
    pub const fn hook_id(self) -> &'static str {
        match self {
            EventKind::MemoryWrite => "memory_writes",
            EventKind::ToolUsage => "tool_usage_logs",
            EventKind::Finding => "findings_capture",
            EventKind::Retrieval => "retrieval_calls",
            EventKind::Planning => "plan_generation",
            EventKind::Preference => "preference_logging",
            EventKind::Monitoring => "monitoring",
        }
    }

    /// Key of the statistics counter for this kind.
    pub const fn counter_key(self) -> &'static str {
        match self {
            EventKind::MemoryWrite => "memory_writes",
            EventKind::ToolUsage => "tool_usage_logs",
            EventKind::Finding => "findings_captured",
            EventKind::Retrieval => "retrieval_calls",
            EventKind::Planning => "plan_generations",
            EventKind::Preference => "preference_logs",
            EventKind::Monitoring => "monitoring_events",
        }
    }

    /// Ingestion source label the downstream pipeline files records under.
    pub const fn source(self) -> &'static str {
        match self {
            EventKind::MemoryWrite => "memory",
            EventKind::ToolUsage => "tool_usage",
            EventKind::Finding => "research_findings",
            EventKind::Retrieval => "retrieval_logs",
            EventKind::Planning => "planner_outputs",
            EventKind::Preference => "user_feedback",
            EventKind::Monitoring => "monitoring",
        }
    }

    pub fn from_hook_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.hook_id() == id)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.hook_id())
    }
}

/// Forwarding priority attached to every record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    Low = 1,
    Normal = 2,
    /// Reserved; no hook emits it.
    High = 3,
}

impl Priority {
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

impl Serialize for Priority {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.as_u8())
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match u8::deserialize(deserializer)? {
            1 => Ok(Priority::Low),
            2 => Ok(Priority::Normal),
            3 => Ok(Priority::High),
            other => Err(serde::de::Error::custom(format!("priority out of range: {other}"))),
        }
    }
}
