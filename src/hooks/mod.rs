//! Hook payloads, normalizers and the registry that names them.

pub mod normalize;
pub mod payload;
pub mod registry;

use std::fmt;

pub use payload::{Finding, MemoryWrite, MonitoringTick, PlanningRequest, PreferenceFeedback, RetrievalQuery, ToolUsage};
pub use registry::{HookFn, HookRegistry};

/// Outcome of a fire-and-forget hook.
///
/// `Failed` is the error-shaped return: the forwarding call failed, the
/// failure was logged, and nothing propagates to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookAck {
    Recorded(String),
    Failed(String),
}

impl HookAck {
    pub fn is_recorded(&self) -> bool {
        matches!(self, HookAck::Recorded(_))
    }

    pub fn message(&self) -> &str {
        match self {
            HookAck::Recorded(message) | HookAck::Failed(message) => message,
        }
    }
}

impl fmt::Display for HookAck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Outcome of the preference hook: the pipeline's preference identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreferenceAck {
    Recorded { preference_id: String },
    Failed(String),
}

impl PreferenceAck {
    pub fn preference_id(&self) -> Option<&str> {
        match self {
            PreferenceAck::Recorded { preference_id } => Some(preference_id),
            PreferenceAck::Failed(_) => None,
        }
    }

    pub fn is_recorded(&self) -> bool {
        self.preference_id().is_some()
    }
}

impl fmt::Display for PreferenceAck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreferenceAck::Recorded { preference_id } => f.write_str(&normalize::preference_ack(preference_id)),
            PreferenceAck::Failed(message) => f.write_str(message),
        }
    }
}
