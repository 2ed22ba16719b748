use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::stats::StatsSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Idle,
    Active,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthSnapshot {
    pub status: HealthStatus,
    pub integration_points_active: usize,
    pub total_events_processed: u64,
    pub semantic_graph_health: Value,
    pub integration_errors: u64,
    pub last_activity: Option<DateTime<Utc>>,
}

impl HealthSnapshot {
    pub fn is_active(&self) -> bool {
        self.status == HealthStatus::Active
    }
}

/// Derives integration health. Pure; reads nothing but its arguments.
pub struct HealthReporter;

impl HealthReporter {
    pub fn report(stats: &StatsSnapshot, points_active: usize, downstream: Value) -> HealthSnapshot {
        let total = stats.total_processed();
        // Counters never decrease, so once active always active.
        let status = if total > 0 { HealthStatus::Active } else { HealthStatus::Idle };

        HealthSnapshot {
            status,
            integration_points_active: points_active,
            total_events_processed: total,
            semantic_graph_health: downstream,
            integration_errors: stats.total_failures(),
            last_activity: stats.last_activity,
        }
    }
}
