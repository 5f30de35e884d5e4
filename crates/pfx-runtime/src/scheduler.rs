//! Per-exchange scrape scheduler.
//!
//! `Idle -> Running -> Stopped`. The first cycle starts one interval after
//! `spawn`, then one per interval. Cycles run as their own tasks so a slow
//! cycle never delays the next tick; `OverlapPolicy` decides whether a tick
//! may start a cycle while another is still in flight.
//!
//! Shutdown stops ticking and then waits for in-flight cycles, so anything
//! they publish is visible once [`SchedulerHandle::shutdown`] returns.

use std::sync::Arc;
use std::time::Duration;

use pfx_config::{ConfigError, ExchangeConfig, OverlapPolicy};
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::scrape::ScrapeCycle;
use crate::status::{ScrapeStatus, SharedStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerState {
    Idle,
    Running,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    pub interval: Duration,
    pub overlap: OverlapPolicy,
}

impl SchedulerConfig {
    pub fn from_exchange(cfg: &ExchangeConfig) -> Self {
        Self {
            interval: cfg.interval,
            overlap: cfg.overlap,
        }
    }
}

pub struct Scheduler {
    cycle: Arc<ScrapeCycle>,
    config: SchedulerConfig,
    status: SharedStatus,
}

impl Scheduler {
    pub fn new(cycle: ScrapeCycle, config: SchedulerConfig) -> Result<Self, ConfigError> {
        if config.interval.is_zero() {
            return Err(ConfigError::NonPositiveDuration {
                field: format!("exchanges.{}.interval", cycle.exchange()),
                value: format!("{:?}", config.interval),
            });
        }
        if Instant::now().checked_add(config.interval).is_none() {
            return Err(ConfigError::DurationOutOfRange {
                field: format!("exchanges.{}.interval", cycle.exchange()),
                value: format!("{:?}", config.interval),
            });
        }
        let status = ScrapeStatus::new(cycle.exchange(), config.interval).shared();
        Ok(Self {
            cycle: Arc::new(cycle),
            config,
            status,
        })
    }

    pub fn status(&self) -> SharedStatus {
        Arc::clone(&self.status)
    }

    /// Start ticking on the current tokio runtime.
    pub fn spawn(self) -> SchedulerHandle {
        let (stop_tx, stop_rx) = watch::channel(false);
        let status = Arc::clone(&self.status);
        let span = info_span!("scraper", exchange = %self.cycle.exchange());
        let task = tokio::spawn(self.run(stop_rx).instrument(span));
        SchedulerHandle {
            stop: stop_tx,
            task: Some(task),
            status,
        }
    }

    async fn run(self, mut stop: watch::Receiver<bool>) {
        let Scheduler {
            cycle,
            config,
            status,
        } = self;

        let Some(first_tick) = Instant::now().checked_add(config.interval) else {
            error!(interval = ?config.interval, "interval cannot be scheduled; scraper not started");
            status.write().await.state = SchedulerState::Stopped;
            return;
        };

        status.write().await.state = SchedulerState::Running;
        info!(
            interval_ms = config.interval.as_millis() as u64,
            overlap = ?config.overlap,
            "scraper started"
        );

        let mut ticker = interval_at(first_tick, config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut in_flight: JoinSet<()> = JoinSet::new();

        loop {
            tokio::select! {
                biased;
                changed = stop.changed() => {
                    // a dropped handle counts as a stop request
                    if changed.is_err() || *stop.borrow() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    while let Some(joined) = in_flight.try_join_next() {
                        log_cycle_panic(joined);
                    }
                    if config.overlap == OverlapPolicy::Skip && !in_flight.is_empty() {
                        warn!("previous scrape cycle still running; skipping tick");
                        status.write().await.cycles_skipped += 1;
                        continue;
                    }
                    status.write().await.cycles_started += 1;
                    let cycle = Arc::clone(&cycle);
                    let status = Arc::clone(&status);
                    in_flight.spawn(
                        async move {
                            let report = cycle.run().await;
                            status.write().await.record(&report);
                        }
                        .in_current_span(),
                    );
                }
            }
        }

        let pending = in_flight.len();
        if pending > 0 {
            debug!(pending, "waiting for in-flight scrape cycles");
        }
        while let Some(joined) = in_flight.join_next().await {
            log_cycle_panic(joined);
        }

        status.write().await.state = SchedulerState::Stopped;
        info!("scraper stopped");
    }
}

fn log_cycle_panic(joined: Result<(), JoinError>) {
    if let Err(err) = joined {
        warn!(error = %err, "scrape cycle task ended abnormally");
    }
}

/// Owner of a running scheduler. Dropping it stops the loop without waiting.
pub struct SchedulerHandle {
    stop: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
    status: SharedStatus,
}

impl SchedulerHandle {
    pub fn status(&self) -> SharedStatus {
        Arc::clone(&self.status)
    }

    pub async fn state(&self) -> SchedulerState {
        self.status.read().await.state
    }

    /// Signal stop and wait for the loop and any in-flight cycle to finish.
    pub async fn shutdown(mut self) {
        let _ = self.stop.send(true);
        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                warn!(error = %err, "scraper task ended abnormally");
            }
        }
    }
}

impl Drop for SchedulerHandle {
    fn drop(&mut self) {
        let _ = self.stop.send(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pfx_testkit::{RecordingSink, ScriptedPortfolioApi};

    fn cycle() -> ScrapeCycle {
        ScrapeCycle::new(
            Arc::new(ScriptedPortfolioApi::new("tinkoff")),
            Arc::new(RecordingSink::new()),
        )
    }

    #[test]
    fn zero_interval_is_rejected() {
        let err = Scheduler::new(
            cycle(),
            SchedulerConfig {
                interval: Duration::ZERO,
                overlap: OverlapPolicy::Skip,
            },
        )
        .err()
        .expect("zero interval must fail");
        assert!(matches!(err, ConfigError::NonPositiveDuration { .. }));
        assert!(err.to_string().contains("exchanges.tinkoff.interval"));
    }

    #[test]
    fn unschedulable_interval_is_rejected() {
        let err = Scheduler::new(
            cycle(),
            SchedulerConfig {
                interval: Duration::from_secs(i64::MAX as u64),
                overlap: OverlapPolicy::Skip,
            },
        )
        .err()
        .expect("interval past the clock range must fail");
        assert!(matches!(err, ConfigError::DurationOutOfRange { .. }));
        assert!(err.to_string().contains("exchanges.tinkoff.interval"));
    }

    #[test]
    fn config_follows_exchange_settings() {
        let mut ex = ExchangeConfig::with_interval(Duration::from_secs(5));
        ex.overlap = OverlapPolicy::Allow;
        let cfg = SchedulerConfig::from_exchange(&ex);
        assert_eq!(cfg.interval, Duration::from_secs(5));
        assert_eq!(cfg.overlap, OverlapPolicy::Allow);
    }

    #[tokio::test]
    async fn new_scheduler_is_idle_until_spawned() {
        let s = Scheduler::new(
            cycle(),
            SchedulerConfig {
                interval: Duration::from_secs(60),
                overlap: OverlapPolicy::Skip,
            },
        )
        .unwrap();
        assert_eq!(s.status().read().await.state, SchedulerState::Idle);
        let handle = s.spawn();
        handle.shutdown().await;
    }
}
