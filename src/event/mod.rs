//! Canonical event model shared by the hooks and the ingestion client.

pub mod kind;
pub mod record;

pub use kind::{EventKind, Priority};
pub use record::{EventRecord, Payload};
