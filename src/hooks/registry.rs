use std::collections::BTreeMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::payload;
use crate::error::IntegrationError;
use crate::event::EventKind;
use crate::integration::Integration;

/// Type-erased hook: raw JSON payload in, hook result as JSON out.
pub type HookFn = fn(&Integration, Value) -> Result<Value, IntegrationError>;

/// Event kind -> hook handler.
#[derive(Clone, Default)]
pub struct HookRegistry {
    hooks: BTreeMap<EventKind, HookFn>,
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookRegistry")
            .field("hooks", &self.hook_ids())
            .finish()
    }
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the seven standard hooks.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(EventKind::MemoryWrite, |integration, raw| {
            let payload = parse(EventKind::MemoryWrite, raw)?;
            Ok(Value::String(integration.handle_memory_output(payload).to_string()))
        });
        registry.register(EventKind::ToolUsage, |integration, raw| {
            let payload = parse(EventKind::ToolUsage, raw)?;
            Ok(Value::String(integration.handle_tool_usage(payload).to_string()))
        });
        registry.register(EventKind::Finding, |integration, raw| {
            let payload = parse(EventKind::Finding, raw)?;
            Ok(Value::String(integration.handle_finding(payload).to_string()))
        });
        registry.register(EventKind::Retrieval, |integration, raw| {
            let payload = parse(EventKind::Retrieval, raw)?;
            to_json(EventKind::Retrieval, &integration.handle_retrieval(payload))
        });
        registry.register(EventKind::Planning, |integration, raw| {
            let payload = parse(EventKind::Planning, raw)?;
            to_json(EventKind::Planning, &integration.handle_planning(payload))
        });
        registry.register(EventKind::Preference, |integration, raw| {
            let payload = parse(EventKind::Preference, raw)?;
            Ok(Value::String(integration.handle_preference(payload).to_string()))
        });
        registry.register(EventKind::Monitoring, |integration, raw| {
            let payload = parse(EventKind::Monitoring, raw)?;
            Ok(Value::String(integration.handle_monitoring(payload).to_string()))
        });
        registry
    }

    /// Registers `hook` for `kind`, replacing any previous one.
    pub fn register(&mut self, kind: EventKind, hook: HookFn) {
        self.hooks.insert(kind, hook);
    }

    pub fn get(&self, kind: EventKind) -> Option<HookFn> {
        self.hooks.get(&kind).copied()
    }

    pub fn resolve(&self, hook_id: &str) -> Option<HookFn> {
        EventKind::from_hook_id(hook_id).and_then(|kind| self.get(kind))
    }

    pub fn contains(&self, kind: EventKind) -> bool {
        self.hooks.contains_key(&kind)
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    pub fn hook_ids(&self) -> Vec<&'static str> {
        self.hooks.keys().map(|kind| kind.hook_id()).collect()
    }
}

fn parse<T: DeserializeOwned>(kind: EventKind, raw: Value) -> Result<T, IntegrationError> {
    payload::from_json(raw).map_err(|source| IntegrationError::InvalidPayload {
        hook: kind.hook_id(),
        source,
    })
}

fn to_json<T: serde::Serialize>(kind: EventKind, value: &T) -> Result<Value, IntegrationError> {
    serde_json::to_value(value).map_err(|source| IntegrationError::InvalidPayload {
        hook: kind.hook_id(),
        source,
    })
}
