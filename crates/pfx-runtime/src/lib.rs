//! pfx-runtime
//!
//! Drives scraping: [`ScrapeCycle`] turns one portfolio fetch into gauge
//! writes, [`Scheduler`] runs it on a fixed interval per exchange and keeps
//! a [`ScrapeStatus`] for the daemon to report.

mod cache;
mod scheduler;
mod scrape;
mod status;

pub use cache::InstrumentCache;
pub use scheduler::{Scheduler, SchedulerConfig, SchedulerHandle, SchedulerState};
pub use scrape::{CycleOutcome, CycleReport, ScrapeCycle, DEFAULT_CURRENCY};
pub use status::{ScrapeStatus, SharedStatus};
