use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::kind::{EventKind, Priority};

pub type Payload = Map<String, Value>;

/// Canonical, immutable record handed to the ingestion pipeline.
///
/// Built by a normalizer and consumed by value by exactly one
/// `IngestionClient::ingest` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    kind: EventKind,
    payload: Payload,
    priority: Priority,
    timestamp: DateTime<Utc>,
}

impl EventRecord {
    pub fn new(kind: EventKind, payload: Payload, priority: Priority, timestamp: DateTime<Utc>) -> Self {
        Self {
            kind,
            payload,
            priority,
            timestamp,
        }
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.payload.get(field)
    }

    pub fn into_payload(self) -> Payload {
        self.payload
    }
}
