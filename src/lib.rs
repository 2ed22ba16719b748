pub mod config;
pub mod error;
pub mod event;
pub mod hooks;
pub mod ingest;
pub mod integration;
pub mod intercept;
pub mod telemetry;

// Re-export specific items for convenient access
pub use config::IntegrationConfig;
pub use error::{ForwardingError, IntegrationError};
pub use event::{EventKind, EventRecord, Priority};
pub use hooks::{HookAck, PreferenceAck};
pub use ingest::{IngestionClient, InMemoryGraphClient};
pub use integration::{Integration, IntegrationStatistics};
pub use intercept::{integrate_research_agent, HostAgent};
pub use telemetry::{HealthSnapshot, HealthStatus};
