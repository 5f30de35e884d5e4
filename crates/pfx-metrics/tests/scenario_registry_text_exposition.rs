//! scenario_registry_text_exposition
//!
//! Registration is a one-time startup step that fails loudly on conflicts,
//! and the text encoder renders whatever the sink last wrote.

use prometheus::Registry;

use pfx_metrics::{encode_text, ExchangeSink, MetricsError, MetricsSink, PortfolioGauges};

#[test]
fn double_registration_on_one_registry_fails() {
    let registry = Registry::new();
    PortfolioGauges::register(&registry).expect("first registration succeeds");
    let err = match PortfolioGauges::register(&registry) {
        Ok(_) => panic!("second registration must fail"),
        Err(e) => e,
    };
    assert!(matches!(err, MetricsError::Registration { metric: "money_value", .. }));
}

#[test]
fn exposition_contains_written_series() {
    let registry = Registry::new();
    let sink = ExchangeSink::new(PortfolioGauges::register(&registry).unwrap(), "tinkoff");
    sink.update_account_money_value("RUB", 1500.5);
    sink.update_share_price("SBER", 1000.0);

    let text = encode_text(&registry).unwrap();
    assert!(text.contains("# TYPE money_value gauge"));
    assert!(text.contains(r#"money_value{currency="RUB",exchange="tinkoff"} 1500.5"#));
    assert!(text.contains(r#"share_price{exchange="tinkoff",share="SBER"} 1000"#));
}

#[test]
fn empty_families_are_not_rendered() {
    let registry = Registry::new();
    let _gauges = PortfolioGauges::register(&registry).unwrap();
    let text = encode_text(&registry).unwrap();
    assert!(!text.contains("share_price{"));
}
