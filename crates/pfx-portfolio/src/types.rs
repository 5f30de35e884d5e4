//! Per-cycle portfolio entities.
//!
//! Everything here is rebuilt on every scrape cycle and dropped at its end.

use serde::{Deserialize, Serialize};

use crate::quotation::{MoneyValue, Quotation};

/// A brokerage account as listed by the remote API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub name: String,
}

/// One position inside a [`PortfolioSnapshot`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Opaque instrument identifier (broker UID).
    pub instrument_id: String,
    pub quantity: Quotation,
    /// Price of one unit (not one lot).
    pub current_price: MoneyValue,
    pub expected_yield: Quotation,
}

/// Portfolio valuation for a single account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    pub account_id: String,
    /// Total portfolio value in the requested settlement currency.
    pub total_amount: MoneyValue,
    pub expected_yield: Quotation,
    /// Positions in the order the remote API returned them.
    pub positions: Vec<Position>,
}

/// Static instrument metadata resolved by identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentMeta {
    pub instrument_id: String,
    pub ticker: String,
    /// Units represented by one tradable lot.
    pub lot: i64,
}

impl InstrumentMeta {
    /// Scale a per-unit price into the value of one lot.
    pub fn lot_price(&self, unit_price: f64) -> f64 {
        unit_price * self.lot as f64
    }
}
