//! Prometheus-backed gauge families.
//!
//! [`PortfolioGauges`] registers the fixed set of families once per
//! registry. [`ExchangeSink`] is a cheap handle that binds the `exchange`
//! label and implements [`MetricsSink`]; many handles may share one
//! `PortfolioGauges`.

use std::sync::Arc;

use prometheus::core::Collector;
use prometheus::{GaugeVec, Opts, Registry};

use crate::{MetricsError, MetricsSink};

// ---------------------------------------------------------------------------
// Metric catalogue
// ---------------------------------------------------------------------------

/// Every metric family the exporter publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Metric {
    MoneyValue,
    SharesCount,
    OpenedPositions,
    TotalRelativeYield,
    ShareRelativeYield,
    SharePrice,
}

impl Metric {
    pub const ALL: [Metric; 6] = [
        Metric::MoneyValue,
        Metric::SharesCount,
        Metric::OpenedPositions,
        Metric::TotalRelativeYield,
        Metric::ShareRelativeYield,
        Metric::SharePrice,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Metric::MoneyValue => "money_value",
            Metric::SharesCount => "shares_count",
            Metric::OpenedPositions => "opened_positions",
            Metric::TotalRelativeYield => "total_relative_yield",
            Metric::ShareRelativeYield => "share_relative_yield",
            Metric::SharePrice => "share_price",
        }
    }

    fn help(self) -> &'static str {
        match self {
            Metric::MoneyValue => "money value of all account shares",
            Metric::SharesCount => "amount of shares in portfolio",
            Metric::OpenedPositions => "number of opened positions",
            Metric::TotalRelativeYield => "relative yield of portfolio",
            Metric::ShareRelativeYield => "relative yield of a single share position",
            Metric::SharePrice => "share price multiplied by lot size",
        }
    }

    /// Label names, `exchange` always first.
    pub fn labels(self) -> &'static [&'static str] {
        match self {
            Metric::MoneyValue | Metric::OpenedPositions => &["exchange", "currency"],
            Metric::TotalRelativeYield => &["exchange"],
            Metric::SharesCount | Metric::ShareRelativeYield | Metric::SharePrice => {
                &["exchange", "share"]
            }
        }
    }
}

// ---------------------------------------------------------------------------
// PortfolioGauges
// ---------------------------------------------------------------------------

/// The registered gauge families.
pub struct PortfolioGauges {
    money_value: GaugeVec,
    shares_count: GaugeVec,
    opened_positions: GaugeVec,
    total_relative_yield: GaugeVec,
    share_relative_yield: GaugeVec,
    share_price: GaugeVec,
}

impl PortfolioGauges {
    /// Create and register every family on `registry`.
    ///
    /// Fails if any family is already registered there or a name/label is
    /// invalid; callers treat that as a fatal startup error.
    pub fn register(registry: &Registry) -> Result<Arc<Self>, MetricsError> {
        let make = |m: Metric| -> Result<GaugeVec, MetricsError> {
            let vec = GaugeVec::new(Opts::new(m.name(), m.help()), m.labels())
                .map_err(|source| MetricsError::Registration { metric: m.name(), source })?;
            registry
                .register(Box::new(vec.clone()))
                .map_err(|source| MetricsError::Registration { metric: m.name(), source })?;
            Ok(vec)
        };

        Ok(Arc::new(Self {
            money_value: make(Metric::MoneyValue)?,
            shares_count: make(Metric::SharesCount)?,
            opened_positions: make(Metric::OpenedPositions)?,
            total_relative_yield: make(Metric::TotalRelativeYield)?,
            share_relative_yield: make(Metric::ShareRelativeYield)?,
            share_price: make(Metric::SharePrice)?,
        }))
    }

    fn vec(&self, m: Metric) -> &GaugeVec {
        match m {
            Metric::MoneyValue => &self.money_value,
            Metric::SharesCount => &self.shares_count,
            Metric::OpenedPositions => &self.opened_positions,
            Metric::TotalRelativeYield => &self.total_relative_yield,
            Metric::ShareRelativeYield => &self.share_relative_yield,
            Metric::SharePrice => &self.share_price,
        }
    }

    fn set(&self, m: Metric, labels: &[&str], value: f64) {
        // label arity is fixed by `Metric::labels`, so this lookup cannot fail
        self.vec(m).with_label_values(labels).set(value);
    }

    /// Current value of one series, or `None` if it was never written.
    ///
    /// Reads through the collector so an absent series is not created.
    pub fn value(&self, m: Metric, labels: &[&str]) -> Option<f64> {
        let names = m.labels();
        self.vec(m)
            .collect()
            .iter()
            .flat_map(|mf| mf.get_metric().iter())
            .find(|metric| {
                let pairs = metric.get_label();
                pairs.len() == labels.len()
                    && names.iter().zip(labels.iter()).all(|(name, want)| {
                        pairs
                            .iter()
                            .any(|lp| lp.get_name() == *name && lp.get_value() == *want)
                    })
            })
            .map(|metric| metric.get_gauge().get_value())
    }

    /// Number of live series in one family.
    pub fn series_count(&self, m: Metric) -> usize {
        self.vec(m)
            .collect()
            .iter()
            .map(|mf| mf.get_metric().len())
            .sum()
    }
}

// ---------------------------------------------------------------------------
// ExchangeSink
// ---------------------------------------------------------------------------

/// [`MetricsSink`] bound to one exchange label.
#[derive(Clone)]
pub struct ExchangeSink {
    gauges: Arc<PortfolioGauges>,
    exchange: String,
}

impl ExchangeSink {
    pub fn new(gauges: Arc<PortfolioGauges>, exchange: impl Into<String>) -> Self {
        Self {
            gauges,
            exchange: exchange.into(),
        }
    }

    pub fn exchange(&self) -> &str {
        &self.exchange
    }

    pub fn gauges(&self) -> &Arc<PortfolioGauges> {
        &self.gauges
    }
}

impl MetricsSink for ExchangeSink {
    fn update_account_money_value(&self, currency: &str, value: f64) {
        self.gauges
            .set(Metric::MoneyValue, &[self.exchange.as_str(), currency], value);
    }

    fn update_account_relative_yield(&self, value: f64) {
        self.gauges
            .set(Metric::TotalRelativeYield, &[self.exchange.as_str()], value);
    }

    fn update_share_relative_yield(&self, ticker: &str, value: f64) {
        self.gauges
            .set(Metric::ShareRelativeYield, &[self.exchange.as_str(), ticker], value);
    }

    fn update_share_count(&self, ticker: &str, value: f64) {
        self.gauges
            .set(Metric::SharesCount, &[self.exchange.as_str(), ticker], value);
    }

    fn update_share_price(&self, ticker: &str, value: f64) {
        self.gauges
            .set(Metric::SharePrice, &[self.exchange.as_str(), ticker], value);
    }

    fn update_opened_positions(&self, currency: &str, value: f64) {
        self.gauges
            .set(Metric::OpenedPositions, &[self.exchange.as_str(), currency], value);
    }
}
