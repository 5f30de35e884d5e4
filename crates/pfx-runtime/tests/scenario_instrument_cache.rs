//! scenario_instrument_cache
//!
//! With a cache, repeat cycles stop resolving known instruments; failures
//! are retried every cycle. Published values are identical either way.

use std::sync::Arc;

use pfx_metrics::Metric;
use pfx_portfolio::MoneyValue;
use pfx_runtime::ScrapeCycle;
use pfx_testkit::{
    account, instrument, position, snapshot, RecordingSink, ScriptedPortfolioApi,
};

fn api() -> Arc<ScriptedPortfolioApi> {
    Arc::new(
        ScriptedPortfolioApi::new("tinkoff")
            .with_accounts(vec![account("acc-1", "Main")])
            .with_portfolio(snapshot(
                "acc-1",
                MoneyValue::new("rub", 1, 0),
                vec![position("uid-a", 1, 10), position("uid-bad", 1, 10)],
            ))
            .with_instrument(instrument("uid-a", "AAA", 100))
            .failing_instrument("uid-bad"),
    )
}

#[tokio::test]
async fn cached_lookups_are_not_repeated() {
    let api = api();
    let sink = Arc::new(RecordingSink::new());
    let cycle = ScrapeCycle::new(api.clone(), sink.clone()).with_instrument_cache(8);

    cycle.run().await;
    cycle.run().await;

    assert_eq!(
        api.instrument_lookups(),
        vec!["uid-a", "uid-bad", "uid-bad"]
    );
    assert_eq!(sink.value(Metric::SharePrice, Some("AAA")), Some(1000.0));
}

#[tokio::test]
async fn zero_capacity_resolves_every_cycle() {
    let api = api();
    let sink = Arc::new(RecordingSink::new());
    let cycle = ScrapeCycle::new(api.clone(), sink.clone()).with_instrument_cache(0);

    cycle.run().await;
    cycle.run().await;

    assert_eq!(api.instrument_lookups().len(), 4);
    assert_eq!(sink.value(Metric::SharePrice, Some("AAA")), Some(1000.0));
}
