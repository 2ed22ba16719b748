//! Integration statistics and health.
//!
//! Read-only with respect to the host: nothing here feeds back into the
//! hooks or the decorated capabilities.

pub mod health;
pub mod stats;

pub use health::{HealthReporter, HealthSnapshot, HealthStatus};
pub use stats::{IntegrationStats, StatsAggregator, StatsSnapshot};
