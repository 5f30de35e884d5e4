//! scenario_remote_failure_keeps_metrics
//!
//! Account or portfolio failures end the cycle without touching gauges, so
//! the previous cycle's values stay exported.

use std::sync::Arc;

use pfx_metrics::{ExchangeSink, Metric, PortfolioGauges};
use pfx_portfolio::MoneyValue;
use pfx_runtime::{CycleOutcome, ScrapeCycle};
use pfx_testkit::{account, snapshot, RecordingSink, ScriptedPortfolioApi};
use prometheus::Registry;

#[tokio::test]
async fn account_listing_failure_publishes_nothing() {
    let api = Arc::new(ScriptedPortfolioApi::new("tinkoff").failing_accounts());
    let sink = Arc::new(RecordingSink::new());

    let report = ScrapeCycle::new(api.clone(), sink.clone()).run().await;

    assert_eq!(report.outcome, CycleOutcome::AccountsFailed);
    assert_eq!(api.portfolio_calls(), 0);
    assert_eq!(sink.update_count(), 0);
}

#[tokio::test]
async fn portfolio_failure_publishes_nothing() {
    // accounts present, no scripted portfolio
    let api = Arc::new(
        ScriptedPortfolioApi::new("tinkoff").with_accounts(vec![account("acc-1", "Main")]),
    );
    let sink = Arc::new(RecordingSink::new());

    let report = ScrapeCycle::new(api.clone(), sink.clone()).run().await;

    assert_eq!(report.outcome, CycleOutcome::PortfolioFailed);
    assert_eq!(api.portfolio_calls(), 1);
    assert!(api.instrument_lookups().is_empty());
    assert_eq!(sink.update_count(), 0);
}

#[tokio::test]
async fn failed_cycle_leaves_previous_gauge_values() {
    let registry = Registry::new();
    let gauges = PortfolioGauges::register(&registry).unwrap();
    let sink = Arc::new(ExchangeSink::new(gauges.clone(), "tinkoff"));

    let good = Arc::new(
        ScriptedPortfolioApi::new("tinkoff")
            .with_accounts(vec![account("acc-1", "Main")])
            .with_portfolio(snapshot("acc-1", MoneyValue::new("rub", 500, 0), Vec::new())),
    );
    ScrapeCycle::new(good, sink.clone()).run().await;
    assert_eq!(
        gauges.value(Metric::MoneyValue, &["tinkoff", "RUB"]),
        Some(500.0)
    );

    let bad = Arc::new(
        ScriptedPortfolioApi::new("tinkoff").with_accounts(vec![account("acc-1", "Main")]),
    );
    let report = ScrapeCycle::new(bad, sink).run().await;

    assert_eq!(report.outcome, CycleOutcome::PortfolioFailed);
    assert_eq!(
        gauges.value(Metric::MoneyValue, &["tinkoff", "RUB"]),
        Some(500.0)
    );
}
