use std::collections::BTreeMap;
use std::sync::Mutex;

use pfx_metrics::{Metric, MetricsSink};

/// One recorded sink call.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedUpdate {
    pub metric: Metric,
    /// Secondary label (currency or ticker); `None` for account yield.
    pub label: Option<String>,
    pub value: f64,
}

/// In-memory [`MetricsSink`] that keeps the full write log plus the
/// last-written value per key.
#[derive(Debug, Default)]
pub struct RecordingSink {
    log: Mutex<Vec<RecordedUpdate>>,
    latest: Mutex<BTreeMap<(Metric, Option<String>), f64>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, metric: Metric, label: Option<&str>, value: f64) {
        let label = label.map(str::to_string);
        self.latest
            .lock()
            .unwrap()
            .insert((metric, label.clone()), value);
        self.log.lock().unwrap().push(RecordedUpdate {
            metric,
            label,
            value,
        });
    }

    /// Every update in call order.
    pub fn updates(&self) -> Vec<RecordedUpdate> {
        self.log.lock().unwrap().clone()
    }

    pub fn update_count(&self) -> usize {
        self.log.lock().unwrap().len()
    }

    /// Last value written for `(metric, label)`.
    pub fn value(&self, metric: Metric, label: Option<&str>) -> Option<f64> {
        self.latest
            .lock()
            .unwrap()
            .get(&(metric, label.map(str::to_string)))
            .copied()
    }

    /// Distinct secondary labels written for `metric`, sorted.
    pub fn labels(&self, metric: Metric) -> Vec<String> {
        self.latest
            .lock()
            .unwrap()
            .keys()
            .filter(|(m, _)| *m == metric)
            .filter_map(|(_, l)| l.clone())
            .collect()
    }
}

impl MetricsSink for RecordingSink {
    fn update_account_money_value(&self, currency: &str, value: f64) {
        self.record(Metric::MoneyValue, Some(currency), value);
    }

    fn update_account_relative_yield(&self, value: f64) {
        self.record(Metric::TotalRelativeYield, None, value);
    }

    fn update_share_relative_yield(&self, ticker: &str, value: f64) {
        self.record(Metric::ShareRelativeYield, Some(ticker), value);
    }

    fn update_share_count(&self, ticker: &str, value: f64) {
        self.record(Metric::SharesCount, Some(ticker), value);
    }

    fn update_share_price(&self, ticker: &str, value: f64) {
        self.record(Metric::SharePrice, Some(ticker), value);
    }

    fn update_opened_positions(&self, currency: &str, value: f64) {
        self.record(Metric::OpenedPositions, Some(currency), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_value_wins_but_log_keeps_history() {
        let s = RecordingSink::new();
        s.update_share_price("SBER", 1.0);
        s.update_share_price("SBER", 2.0);
        assert_eq!(s.value(Metric::SharePrice, Some("SBER")), Some(2.0));
        assert_eq!(s.update_count(), 2);
        assert_eq!(s.labels(Metric::SharePrice), vec!["SBER".to_string()]);
    }
}
