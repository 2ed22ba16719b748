use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::event::EventKind;

/// Per-kind counters at one point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationStats {
    pub memory_writes: u64,
    pub tool_usage_logs: u64,
    pub findings_captured: u64,
    pub retrieval_calls: u64,
    pub plan_generations: u64,
    pub preference_logs: u64,
    pub monitoring_events: u64,
}

impl IntegrationStats {
    fn from_counts(counts: [u64; 7]) -> Self {
        Self {
            memory_writes: counts[EventKind::MemoryWrite.index()],
            tool_usage_logs: counts[EventKind::ToolUsage.index()],
            findings_captured: counts[EventKind::Finding.index()],
            retrieval_calls: counts[EventKind::Retrieval.index()],
            plan_generations: counts[EventKind::Planning.index()],
            preference_logs: counts[EventKind::Preference.index()],
            monitoring_events: counts[EventKind::Monitoring.index()],
        }
    }

    pub fn get(&self, kind: EventKind) -> u64 {
        match kind {
            EventKind::MemoryWrite => self.memory_writes,
            EventKind::ToolUsage => self.tool_usage_logs,
            EventKind::Finding => self.findings_captured,
            EventKind::Retrieval => self.retrieval_calls,
            EventKind::Planning => self.plan_generations,
            EventKind::Preference => self.preference_logs,
            EventKind::Monitoring => self.monitoring_events,
        }
    }

    pub fn total(&self) -> u64 {
        EventKind::ALL.iter().map(|kind| self.get(*kind)).sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub processed: IntegrationStats,
    pub failures: IntegrationStats,
    pub last_activity: Option<DateTime<Utc>>,
}

impl StatsSnapshot {
    pub fn total_processed(&self) -> u64 {
        self.processed.total()
    }

    pub fn total_failures(&self) -> u64 {
        self.failures.total()
    }
}

const NEVER: i64 = i64::MIN;

/// Monotonic per-kind counters, one set per integration instance.
///
/// Lock-free: `last_activity` is kept as epoch microseconds.
#[derive(Debug)]
pub struct StatsAggregator {
    processed: [AtomicU64; 7],
    failures: [AtomicU64; 7],
    last_activity_micros: AtomicI64,
}

impl Default for StatsAggregator {
    fn default() -> Self {
        Self {
            processed: Default::default(),
            failures: Default::default(),
            last_activity_micros: AtomicI64::new(NEVER),
        }
    }
}

impl StatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one processed event of `kind` and returns the new count.
    pub fn increment(&self, kind: EventKind) -> u64 {
        // Stamp before counting so a reader that sees the count also sees the stamp.
        self.last_activity_micros
            .fetch_max(Utc::now().timestamp_micros(), Ordering::SeqCst);
        self.processed[kind.index()].fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Counts one forwarding failure of `kind`.
    pub fn record_failure(&self, kind: EventKind) -> u64 {
        self.failures[kind.index()].fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn count(&self, kind: EventKind) -> u64 {
        self.processed[kind.index()].load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let processed = load_all(&self.processed);
        let failures = load_all(&self.failures);
        let last_activity = match self.last_activity_micros.load(Ordering::SeqCst) {
            NEVER => None,
            micros => DateTime::<Utc>::from_timestamp_micros(micros),
        };
        StatsSnapshot {
            processed: IntegrationStats::from_counts(processed),
            failures: IntegrationStats::from_counts(failures),
            last_activity,
        }
    }
}

fn load_all(counters: &[AtomicU64; 7]) -> [u64; 7] {
    let mut out = [0; 7];
    for (slot, counter) in out.iter_mut().zip(counters) {
        *slot = counter.load(Ordering::SeqCst);
    }
    out
}
