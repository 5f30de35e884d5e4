use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;

use crate::scheduler::SchedulerState;
use crate::scrape::{CycleOutcome, CycleReport};

/// Per-exchange scrape bookkeeping, served by `/v1/status`.
#[derive(Debug, Clone, Serialize)]
pub struct ScrapeStatus {
    pub exchange: String,
    pub interval_ms: u64,
    pub state: SchedulerState,
    pub cycles_started: u64,
    pub cycles_skipped: u64,
    pub cycles_finished: u64,
    pub last_outcome: Option<CycleOutcome>,
    pub last_finished_at: Option<DateTime<Utc>>,
    pub last_duration_ms: Option<u64>,
}

pub type SharedStatus = Arc<RwLock<ScrapeStatus>>;

impl ScrapeStatus {
    pub fn new(exchange: impl Into<String>, interval: Duration) -> Self {
        Self {
            exchange: exchange.into(),
            interval_ms: interval.as_millis() as u64,
            state: SchedulerState::Idle,
            cycles_started: 0,
            cycles_skipped: 0,
            cycles_finished: 0,
            last_outcome: None,
            last_finished_at: None,
            last_duration_ms: None,
        }
    }

    pub fn shared(self) -> SharedStatus {
        Arc::new(RwLock::new(self))
    }

    pub(crate) fn record(&mut self, report: &CycleReport) {
        self.cycles_finished += 1;
        self.last_outcome = Some(report.outcome.clone());
        self.last_finished_at = Some(Utc::now());
        self.last_duration_ms = Some(report.elapsed.as_millis() as u64);
    }
}
