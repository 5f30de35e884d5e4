use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use pfx_portfolio::{
    Account, ApiError, InstrumentMeta, MoneyValue, PortfolioApi, PortfolioSnapshot, Position,
    Quotation,
};

/// Scripted in-process [`PortfolioApi`].
///
/// Every response is fixed up front; calls are counted and the instrument
/// lookups are logged in order so tests can assert what the cycle asked for.
pub struct ScriptedPortfolioApi {
    exchange: String,
    accounts: Option<Vec<Account>>,
    portfolio: Option<PortfolioSnapshot>,
    instruments: BTreeMap<String, InstrumentMeta>,
    failing_instruments: BTreeSet<String>,
    list_delay: Duration,

    list_calls: AtomicUsize,
    portfolio_calls: AtomicUsize,
    portfolio_requests: Mutex<Vec<(String, String)>>,
    instrument_lookups: Mutex<Vec<String>>,
}

impl ScriptedPortfolioApi {
    /// An API with no accounts and no portfolio.
    pub fn new(exchange: impl Into<String>) -> Self {
        Self {
            exchange: exchange.into(),
            accounts: Some(Vec::new()),
            portfolio: None,
            instruments: BTreeMap::new(),
            failing_instruments: BTreeSet::new(),
            list_delay: Duration::ZERO,
            list_calls: AtomicUsize::new(0),
            portfolio_calls: AtomicUsize::new(0),
            portfolio_requests: Mutex::new(Vec::new()),
            instrument_lookups: Mutex::new(Vec::new()),
        }
    }

    pub fn with_accounts(mut self, accounts: Vec<Account>) -> Self {
        self.accounts = Some(accounts);
        self
    }

    /// `list_accounts` fails with a transport error.
    pub fn failing_accounts(mut self) -> Self {
        self.accounts = None;
        self
    }

    pub fn with_portfolio(mut self, snapshot: PortfolioSnapshot) -> Self {
        self.portfolio = Some(snapshot);
        self
    }

    pub fn with_instrument(mut self, meta: InstrumentMeta) -> Self {
        self.instruments.insert(meta.instrument_id.clone(), meta);
        self
    }

    pub fn failing_instrument(mut self, instrument_id: impl Into<String>) -> Self {
        self.failing_instruments.insert(instrument_id.into());
        self
    }

    /// Make `list_accounts` sleep before answering, to hold a cycle in flight.
    pub fn with_list_delay(mut self, delay: Duration) -> Self {
        self.list_delay = delay;
        self
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn portfolio_calls(&self) -> usize {
        self.portfolio_calls.load(Ordering::SeqCst)
    }

    /// `(account_id, currency)` of each `get_portfolio` call.
    pub fn portfolio_requests(&self) -> Vec<(String, String)> {
        self.portfolio_requests.lock().unwrap().clone()
    }

    pub fn instrument_lookups(&self) -> Vec<String> {
        self.instrument_lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl PortfolioApi for ScriptedPortfolioApi {
    fn exchange(&self) -> &str {
        &self.exchange
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, ApiError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if !self.list_delay.is_zero() {
            tokio::time::sleep(self.list_delay).await;
        }
        self.accounts
            .clone()
            .ok_or_else(|| ApiError::Transport("scripted accounts failure".to_string()))
    }

    async fn get_portfolio(
        &self,
        account_id: &str,
        currency: &str,
    ) -> Result<PortfolioSnapshot, ApiError> {
        self.portfolio_calls.fetch_add(1, Ordering::SeqCst);
        self.portfolio_requests
            .lock()
            .unwrap()
            .push((account_id.to_string(), currency.to_string()));
        self.portfolio.clone().ok_or_else(|| ApiError::Api {
            code: Some(50002),
            message: "scripted portfolio failure".to_string(),
        })
    }

    async fn resolve_instrument(&self, instrument_id: &str) -> Result<InstrumentMeta, ApiError> {
        self.instrument_lookups
            .lock()
            .unwrap()
            .push(instrument_id.to_string());
        if self.failing_instruments.contains(instrument_id) {
            return Err(ApiError::Api {
                code: Some(50004),
                message: format!("instrument {instrument_id} not found"),
            });
        }
        self.instruments
            .get(instrument_id)
            .cloned()
            .ok_or_else(|| ApiError::Decode(format!("no scripted instrument {instrument_id}")))
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

pub fn account(id: &str, name: &str) -> Account {
    Account {
        id: id.to_string(),
        name: name.to_string(),
    }
}

pub fn instrument(id: &str, ticker: &str, lot: i64) -> InstrumentMeta {
    InstrumentMeta {
        instrument_id: id.to_string(),
        ticker: ticker.to_string(),
        lot,
    }
}

/// A position with whole-unit quantity and price and a zero yield.
pub fn position(instrument_id: &str, quantity: i64, price: i64) -> Position {
    Position {
        instrument_id: instrument_id.to_string(),
        quantity: Quotation::new(quantity, 0),
        current_price: MoneyValue::new("rub", price, 0),
        expected_yield: Quotation::ZERO,
    }
}

pub fn snapshot(account_id: &str, total: MoneyValue, positions: Vec<Position>) -> PortfolioSnapshot {
    PortfolioSnapshot {
        account_id: account_id.to_string(),
        total_amount: total,
        expected_yield: Quotation::ZERO,
        positions,
    }
}
