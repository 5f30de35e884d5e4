//! pfx-tinkoff
//!
//! [`PortfolioApi`](pfx_portfolio::PortfolioApi) implementation for Tinkoff
//! Invest, speaking the broker's REST/JSON gateway.

mod client;
mod credentials;
mod currency;
mod endpoint;
mod wire;

pub use client::{TinkoffClient, EXCHANGE};
pub use credentials::{CredentialHeaders, APP_NAME_HEADER};
pub use currency::{portfolio_currency, DEFAULT_PORTFOLIO_CURRENCY, SUPPORTED_CURRENCIES};
pub use endpoint::{normalize_endpoint, DEFAULT_API_ENDPOINT};
