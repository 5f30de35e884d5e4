//! Remote portfolio API boundary.
//!
//! This module defines **only** the trait and its error type. Concrete
//! clients (HTTP, gRPC, fakes) live in their own crates and implement
//! [`PortfolioApi`]; the scrape cycle only ever sees `Arc<dyn PortfolioApi>`.

use async_trait::async_trait;
use thiserror::Error;

use crate::types::{Account, InstrumentMeta, PortfolioSnapshot};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors that a [`PortfolioApi`] implementation may return.
///
/// The scrape cycle treats every variant the same way (log, then skip); the
/// split exists for diagnostics.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network or transport failure.
    #[error("transport error: {0}")]
    Transport(String),
    /// The remote service answered with an application-level error.
    #[error("{}", fmt_api(.code, .message))]
    Api { code: Option<i64>, message: String },
    /// A response payload could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),
    /// A required configuration value is missing or invalid.
    #[error("config error: {0}")]
    Config(String),
    /// The call did not complete within the configured request timeout.
    #[error("request timed out")]
    Timeout,
}

fn fmt_api(code: &Option<i64>, message: &str) -> String {
    match code {
        Some(c) => format!("remote api error code={c}: {message}"),
        None => format!("remote api error: {message}"),
    }
}

impl ApiError {
    /// `true` for errors raised while constructing a client.
    pub fn is_config(&self) -> bool {
        matches!(self, ApiError::Config(_))
    }
}

// ---------------------------------------------------------------------------
// PortfolioApi trait
// ---------------------------------------------------------------------------

/// Read-only portfolio operations against one brokerage.
///
/// Implementations must be `Send + Sync` so a single client can be shared by
/// the scheduler and every cycle task it spawns.
#[async_trait]
pub trait PortfolioApi: Send + Sync {
    /// Exchange label under which this client's data is published (e.g. `"tinkoff"`).
    fn exchange(&self) -> &str;

    /// List accounts in the order the broker returns them.
    async fn list_accounts(&self) -> Result<Vec<Account>, ApiError>;

    /// Fetch a valuation of `account_id` expressed in `currency`.
    async fn get_portfolio(
        &self,
        account_id: &str,
        currency: &str,
    ) -> Result<PortfolioSnapshot, ApiError>;

    /// Resolve ticker and lot size for an instrument identifier.
    async fn resolve_instrument(&self, instrument_id: &str) -> Result<InstrumentMeta, ApiError>;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
