//! Turn a validated [`ExporterConfig`] into ready-to-spawn scrapers.
//!
//! Construction never touches the network. Any failure here aborts startup.

use std::sync::Arc;

use anyhow::{Context, Result};
use pfx_config::{ExchangeConfig, ExporterConfig, UnusedKeyReport};
use pfx_metrics::{ExchangeSink, PortfolioGauges};
use pfx_portfolio::PortfolioApi;
use pfx_runtime::{Scheduler, SchedulerConfig, ScrapeCycle};
use pfx_tinkoff::TinkoffClient;
use tracing::{info, warn};

/// Exchanges this build can scrape.
pub const SUPPORTED_EXCHANGES: &[&str] = &[pfx_tinkoff::EXCHANGE];

/// One scheduler per supported exchange, in exchange-name order.
///
/// Exchanges without an integration are logged and skipped.
pub fn build_schedulers(
    cfg: &ExporterConfig,
    gauges: &Arc<PortfolioGauges>,
) -> Result<Vec<Scheduler>> {
    let mut out = Vec::new();
    for (name, ex) in &cfg.exchanges {
        let Some((api, currency)) = build_api(name, ex)? else {
            warn!(exchange = %name, supported = ?SUPPORTED_EXCHANGES, "no integration for exchange; ignoring");
            continue;
        };
        let sink = Arc::new(ExchangeSink::new(Arc::clone(gauges), name.as_str()));
        let cycle = ScrapeCycle::new(api, sink)
            .with_currency(&currency)
            .with_instrument_cache(ex.instrument_cache);
        let scheduler = Scheduler::new(cycle, SchedulerConfig::from_exchange(ex))
            .with_context(|| format!("exchange '{name}'"))?;
        info!(
            exchange = %name,
            interval_ms = ex.interval.as_millis() as u64,
            request_timeout_ms = ex.request_timeout.as_millis() as u64,
            currency = %currency,
            "scraper configured"
        );
        out.push(scheduler);
    }
    Ok(out)
}

/// Client plus the validated valuation currency for one exchange.
fn build_api(name: &str, ex: &ExchangeConfig) -> Result<Option<(Arc<dyn PortfolioApi>, String)>> {
    match name {
        pfx_tinkoff::EXCHANGE => {
            let init = || format!("failed to initialize {name} exporter");
            let currency = pfx_tinkoff::portfolio_currency(&ex.params).with_context(init)?;
            let client: Arc<dyn PortfolioApi> = Arc::new(
                TinkoffClient::from_params(&ex.params, ex.request_timeout).with_context(init)?,
            );
            Ok(Some((client, currency)))
        }
        _ => Ok(None),
    }
}

/// Log every config leaf the exporter never reads.
pub fn warn_unused_keys(report: &UnusedKeyReport) {
    for pointer in &report.unused_leaf_pointers {
        warn!(key = %pointer, "config key is not used by the exporter");
    }
}
