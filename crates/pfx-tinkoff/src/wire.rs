//! JSON gateway payloads.
//!
//! Field names follow the gateway's camelCase mapping. Only the fields the
//! exporter reads are declared; everything else is ignored.

use serde::{Deserialize, Serialize};

use pfx_portfolio::{Account, InstrumentMeta, MoneyValue, PortfolioSnapshot, Position, Quotation};

pub(crate) const INSTRUMENT_ID_TYPE_UID: &str = "INSTRUMENT_ID_TYPE_UID";

#[derive(Debug, Serialize)]
pub(crate) struct GetAccountsRequest {}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PortfolioRequest<'a> {
    pub account_id: &'a str,
    pub currency: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InstrumentRequest<'a> {
    pub id_type: &'static str,
    pub id: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GetAccountsResponse {
    #[serde(default)]
    pub accounts: Vec<AccountDto>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AccountDto {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PortfolioResponse {
    #[serde(default)]
    pub total_amount_portfolio: MoneyValue,
    #[serde(default)]
    pub expected_yield: Quotation,
    #[serde(default)]
    pub positions: Vec<PositionDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PositionDto {
    #[serde(default)]
    pub instrument_uid: String,
    #[serde(default)]
    pub quantity: Quotation,
    #[serde(default)]
    pub current_price: MoneyValue,
    #[serde(default)]
    pub expected_yield: Quotation,
}

#[derive(Debug, Deserialize)]
pub(crate) struct InstrumentResponse {
    pub instrument: InstrumentDto,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InstrumentDto {
    pub ticker: String,
    #[serde(default)]
    pub lot: i64,
}

/// Error body returned with non-2xx statuses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub code: Option<i64>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl From<AccountDto> for Account {
    fn from(a: AccountDto) -> Self {
        Account {
            id: a.id,
            name: a.name,
        }
    }
}

impl PortfolioResponse {
    pub(crate) fn into_snapshot(self, account_id: &str) -> PortfolioSnapshot {
        PortfolioSnapshot {
            account_id: account_id.to_string(),
            total_amount: self.total_amount_portfolio,
            expected_yield: self.expected_yield,
            positions: self
                .positions
                .into_iter()
                .map(|p| Position {
                    instrument_id: p.instrument_uid,
                    quantity: p.quantity,
                    current_price: p.current_price,
                    expected_yield: p.expected_yield,
                })
                .collect(),
        }
    }
}

impl InstrumentResponse {
    pub(crate) fn into_meta(self, instrument_id: &str) -> InstrumentMeta {
        InstrumentMeta {
            instrument_id: instrument_id.to_string(),
            ticker: self.instrument.ticker,
            lot: self.instrument.lot,
        }
    }
}
