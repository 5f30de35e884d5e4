//! Shared state for the HTTP handlers.
//!
//! Handlers receive `State<Arc<AppState>>`. The registry is written by the
//! scrapers and only read here.

use pfx_runtime::{ScrapeStatus, SharedStatus};
use prometheus::Registry;

/// Static build metadata included in health responses.
#[derive(Clone, Debug)]
pub struct BuildInfo {
    pub service: &'static str,
    pub version: &'static str,
}

impl Default for BuildInfo {
    fn default() -> Self {
        Self {
            service: "pfx-daemon",
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

pub struct AppState {
    pub build: BuildInfo,
    pub registry: Registry,
    /// One entry per running scraper, in exchange-name order.
    pub scrapers: Vec<SharedStatus>,
}

impl AppState {
    pub fn new(registry: Registry, scrapers: Vec<SharedStatus>) -> Self {
        Self {
            build: BuildInfo::default(),
            registry,
            scrapers,
        }
    }

    /// Point-in-time copy of every scraper's status.
    pub async fn scrape_statuses(&self) -> Vec<ScrapeStatus> {
        let mut out = Vec::with_capacity(self.scrapers.len());
        for s in &self.scrapers {
            out.push(s.read().await.clone());
        }
        out
    }
}
