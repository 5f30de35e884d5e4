//! pfx-metrics
//!
//! The metric sink: a capability trait the scrape cycle writes through, and
//! its Prometheus implementation. Every update is an idempotent overwrite
//! (last write wins) and is visible to `/metrics` readers immediately.

pub mod gauges;

use prometheus::{Encoder, Registry, TextEncoder};
use thiserror::Error;

pub use gauges::{ExchangeSink, Metric, PortfolioGauges};

/// Content type of [`encode_text`] output.
pub const TEXT_CONTENT_TYPE: &str = prometheus::TEXT_FORMAT;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("failed to register metric {metric}: {source}")]
    Registration {
        metric: &'static str,
        #[source]
        source: prometheus::Error,
    },
    #[error("failed to encode metrics: {0}")]
    Encode(#[from] prometheus::Error),
    #[error("encoded metrics are not utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Write-only view of the published portfolio metrics.
///
/// The exchange label is bound by the implementation. Methods never fail
/// and never return anything; a sink that cannot store a label combination
/// must refuse at construction instead.
pub trait MetricsSink: Send + Sync {
    fn update_account_money_value(&self, currency: &str, value: f64);
    fn update_account_relative_yield(&self, value: f64);
    fn update_share_relative_yield(&self, ticker: &str, value: f64);
    fn update_share_count(&self, ticker: &str, value: f64);
    /// `value` is already scaled to one lot.
    fn update_share_price(&self, ticker: &str, value: f64);
    /// Reserved; the scrape cycle does not publish this yet.
    fn update_opened_positions(&self, currency: &str, value: f64);
}

/// Render the registry in the Prometheus text exposition format.
pub fn encode_text(registry: &Registry) -> Result<String, MetricsError> {
    let encoder = TextEncoder::new();
    let families = registry.gather();
    let mut buffer = Vec::new();
    encoder.encode(&families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}
