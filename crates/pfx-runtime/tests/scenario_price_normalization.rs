//! scenario_price_normalization
//!
//! Published share price is the per-unit price multiplied by the lot size,
//! and fractional quotations survive the conversion.

use std::sync::Arc;

use pfx_metrics::Metric;
use pfx_portfolio::{MoneyValue, Position, Quotation};
use pfx_runtime::ScrapeCycle;
use pfx_testkit::{account, instrument, snapshot, RecordingSink, ScriptedPortfolioApi};

fn api_with(position: Position, lot: i64) -> Arc<ScriptedPortfolioApi> {
    let id = position.instrument_id.clone();
    Arc::new(
        ScriptedPortfolioApi::new("tinkoff")
            .with_accounts(vec![account("acc-1", "Main")])
            .with_portfolio(snapshot(
                "acc-1",
                MoneyValue::new("rub", 0, 0),
                vec![position],
            ))
            .with_instrument(instrument(&id, "SBER", lot)),
    )
}

#[tokio::test]
async fn price_is_multiplied_by_lot() {
    let api = api_with(pfx_testkit::position("uid-sber", 5, 100), 10);
    let sink = Arc::new(RecordingSink::new());

    ScrapeCycle::new(api, sink.clone()).run().await;

    assert_eq!(sink.value(Metric::SharePrice, Some("SBER")), Some(1000.0));
    assert_eq!(sink.value(Metric::SharesCount, Some("SBER")), Some(5.0));
}

#[tokio::test]
async fn fractional_values_are_converted() {
    let pos = Position {
        instrument_id: "uid-sber".to_string(),
        quantity: Quotation::new(1, 500_000_000),
        current_price: MoneyValue::new("rub", 2, 250_000_000),
        expected_yield: Quotation::new(0, 125_000_000),
    };
    let api = api_with(pos, 1);
    let sink = Arc::new(RecordingSink::new());

    ScrapeCycle::new(api, sink.clone()).run().await;

    assert_eq!(sink.value(Metric::SharesCount, Some("SBER")), Some(1.5));
    assert_eq!(sink.value(Metric::SharePrice, Some("SBER")), Some(2.25));
    assert_eq!(
        sink.value(Metric::ShareRelativeYield, Some("SBER")),
        Some(0.125)
    );
}

#[tokio::test]
async fn first_account_and_configured_currency_are_requested() {
    let api = Arc::new(
        ScriptedPortfolioApi::new("tinkoff")
            .with_accounts(vec![account("first", "A"), account("second", "B")])
            .with_portfolio(snapshot("first", MoneyValue::new("usd", 7, 0), Vec::new())),
    );
    let sink = Arc::new(RecordingSink::new());

    ScrapeCycle::new(api.clone(), sink.clone())
        .with_currency("usd")
        .run()
        .await;

    assert_eq!(
        api.portfolio_requests(),
        vec![("first".to_string(), "USD".to_string())]
    );
    assert_eq!(sink.value(Metric::MoneyValue, Some("USD")), Some(7.0));
}
