//! One scrape cycle: fetch, normalize, publish.
//!
//! # Failure policy
//! - account listing fails or is empty: nothing is published;
//! - portfolio fetch fails: nothing is published;
//! - an instrument lookup fails: that position is skipped, the rest publish.
//!
//! Nothing here returns an error. Values from earlier cycles stay published
//! when a cycle bails out.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use pfx_metrics::MetricsSink;
use pfx_portfolio::{ApiError, InstrumentMeta, PortfolioApi, Position};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::cache::InstrumentCache;

/// Settlement currency requested when none is configured.
pub const DEFAULT_CURRENCY: &str = "RUB";

/// How a cycle ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CycleOutcome {
    AccountsFailed,
    NoAccounts,
    PortfolioFailed,
    Published {
        positions_published: usize,
        positions_failed: usize,
    },
}

impl CycleOutcome {
    /// `true` when account-level metrics were written this cycle.
    pub fn published(&self) -> bool {
        matches!(self, CycleOutcome::Published { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub outcome: CycleOutcome,
    pub elapsed: Duration,
}

pub struct ScrapeCycle {
    api: Arc<dyn PortfolioApi>,
    sink: Arc<dyn MetricsSink>,
    currency: String,
    cache: Option<Mutex<InstrumentCache>>,
}

impl ScrapeCycle {
    pub fn new(api: Arc<dyn PortfolioApi>, sink: Arc<dyn MetricsSink>) -> Self {
        Self {
            api,
            sink,
            currency: DEFAULT_CURRENCY.to_string(),
            cache: None,
        }
    }

    /// Currency the portfolio is valued in and the `currency` label value.
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into().trim().to_ascii_uppercase();
        self
    }

    /// Cache up to `capacity` instrument lookups across cycles; `0` disables.
    pub fn with_instrument_cache(mut self, capacity: usize) -> Self {
        self.cache = (capacity > 0).then(|| Mutex::new(InstrumentCache::new(capacity)));
        self
    }

    pub fn exchange(&self) -> &str {
        self.api.exchange()
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub async fn run(&self) -> CycleReport {
        let started = Instant::now();
        let outcome = self.scrape().await;
        let elapsed = started.elapsed();
        match &outcome {
            CycleOutcome::Published {
                positions_published,
                positions_failed,
            } => info!(
                positions_published,
                positions_failed,
                elapsed_ms = elapsed.as_millis() as u64,
                "scrape cycle published"
            ),
            other => debug!(outcome = ?other, "scrape cycle ended early"),
        }
        CycleReport { outcome, elapsed }
    }

    async fn scrape(&self) -> CycleOutcome {
        let accounts = match self.api.list_accounts().await {
            Ok(a) => a,
            Err(err) => {
                error!(operation = "list_accounts", error = %err, "failed to get accounts");
                return CycleOutcome::AccountsFailed;
            }
        };

        let Some(account) = accounts.into_iter().next() else {
            warn!(operation = "list_accounts", "no accounts returned");
            return CycleOutcome::NoAccounts;
        };

        let snapshot = match self.api.get_portfolio(&account.id, &self.currency).await {
            Ok(s) => s,
            Err(err) => {
                error!(
                    operation = "get_portfolio",
                    account_id = %account.id,
                    account_name = %account.name,
                    currency = %self.currency,
                    error = %err,
                    "failed to get portfolio"
                );
                return CycleOutcome::PortfolioFailed;
            }
        };

        self.sink
            .update_account_money_value(&self.currency, snapshot.total_amount.to_f64());
        self.sink
            .update_account_relative_yield(snapshot.expected_yield.to_f64());

        let mut positions_published = 0;
        let mut positions_failed = 0;
        for position in &snapshot.positions {
            match self.resolve(&position.instrument_id).await {
                Ok(meta) => {
                    self.publish_position(position, &meta);
                    positions_published += 1;
                }
                Err(err) => {
                    warn!(
                        operation = "resolve_instrument",
                        instrument_id = %position.instrument_id,
                        error = %err,
                        "failed to get instrument data; skipping position"
                    );
                    positions_failed += 1;
                }
            }
        }

        CycleOutcome::Published {
            positions_published,
            positions_failed,
        }
    }

    fn publish_position(&self, position: &Position, meta: &InstrumentMeta) {
        let ticker = meta.ticker.as_str();
        self.sink
            .update_share_relative_yield(ticker, position.expected_yield.to_f64());
        self.sink
            .update_share_count(ticker, position.quantity.to_f64());
        self.sink
            .update_share_price(ticker, meta.lot_price(position.current_price.to_f64()));
    }

    async fn resolve(&self, instrument_id: &str) -> Result<InstrumentMeta, ApiError> {
        let cached = self
            .cache
            .as_ref()
            .and_then(|c| lock(c).get(instrument_id).cloned());
        if let Some(hit) = cached {
            return Ok(hit);
        }
        let meta = self.api.resolve_instrument(instrument_id).await?;
        if let Some(cache) = &self.cache {
            lock(cache).insert(meta.clone());
        }
        Ok(meta)
    }
}

// a panic while holding the guard cannot leave the cache half-written
fn lock(cache: &Mutex<InstrumentCache>) -> std::sync::MutexGuard<'_, InstrumentCache> {
    cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
