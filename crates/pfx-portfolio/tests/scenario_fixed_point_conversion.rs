//! scenario_fixed_point_conversion
//!
//! Broker quantities and prices arrive as `(units, nano)` pairs and must
//! convert to the exact `f64` a human would read off the decimal.

use pfx_portfolio::{MoneyValue, Quotation};

#[test]
fn quantity_two_and_a_half() {
    let qty = Quotation::new(2, 500_000_000);
    assert_eq!(qty.to_f64(), 2.5);
}

#[test]
fn whole_units_only() {
    assert_eq!(Quotation::new(150, 0).to_f64(), 150.0);
}

#[test]
fn money_value_ignores_currency_for_amount() {
    let m = MoneyValue::new("rub", 1_234, 560_000_000);
    assert!((m.to_f64() - 1234.56).abs() < 1e-9);
    assert_eq!(m.amount(), Quotation::new(1_234, 560_000_000));
}

#[test]
fn large_units_keep_f64_precision() {
    // 2^53 is the last integer f64 represents exactly.
    let q = Quotation::new(9_007_199_254_740_992, 0);
    assert_eq!(q.to_f64(), 9_007_199_254_740_992.0);
}

#[test]
fn wire_shape_decodes_from_broker_json() {
    let raw = r#"{"currency":"rub","units":"-12","nano":-340000000}"#;
    let m: MoneyValue = serde_json::from_str(raw).expect("valid money value");
    assert_eq!(m.units, -12);
    assert!((m.to_f64() + 12.34).abs() < 1e-9);
}
