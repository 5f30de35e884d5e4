use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use pfx_config::{ConfigError, ExchangeParams};
use pfx_portfolio::{Account, ApiError, InstrumentMeta, PortfolioApi, PortfolioSnapshot};

use crate::credentials::CredentialHeaders;
use crate::endpoint::{method_url, normalize_endpoint};
use crate::wire::{
    ErrorBody, GetAccountsRequest, GetAccountsResponse, InstrumentRequest, InstrumentResponse,
    PortfolioRequest, PortfolioResponse, INSTRUMENT_ID_TYPE_UID,
};

pub const EXCHANGE: &str = "tinkoff";

const GET_ACCOUNTS: &str = "UsersService/GetAccounts";
const GET_PORTFOLIO: &str = "OperationsService/GetPortfolio";
const GET_INSTRUMENT_BY: &str = "InstrumentsService/GetInstrumentBy";

/// Tinkoff Invest client over the broker's REST/JSON gateway.
///
/// Construction performs no I/O; the first request opens the connection.
/// Every call is bounded by `request_timeout`.
#[derive(Clone)]
pub struct TinkoffClient {
    http: Client,
    base_url: String,
    credentials: CredentialHeaders,
    request_timeout: Duration,
}

impl TinkoffClient {
    /// Build from exchange params.
    ///
    /// Requires `api_key` (or `api_key_env`) and `app_name`; `api_endpoint`
    /// is optional.
    pub fn from_params(params: &ExchangeParams, request_timeout: Duration) -> Result<Self, ApiError> {
        let api_key = params
            .secret("api_key")
            .map_err(config_error)?
            .ok_or_else(|| config_error(ConfigError::MissingParam("api_key".to_string())))?;
        let app_name = params.require("app_name").map_err(config_error)?;
        let base_url = normalize_endpoint(params.get("api_endpoint"));
        Self::new(&api_key, app_name, base_url, request_timeout)
    }

    pub fn new(
        api_key: &str,
        app_name: &str,
        base_url: String,
        request_timeout: Duration,
    ) -> Result<Self, ApiError> {
        if api_key.trim().is_empty() {
            return Err(ApiError::Config("missing api_key".to_string()));
        }
        if app_name.trim().is_empty() {
            return Err(ApiError::Config("missing app_name".to_string()));
        }
        if request_timeout.is_zero() {
            return Err(ApiError::Config("request_timeout must be positive".to_string()));
        }
        let credentials = CredentialHeaders::new(api_key.trim(), app_name.trim())?;
        let http = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| ApiError::Transport(format!("http client init failed: {e}")))?;
        Ok(Self {
            http,
            base_url,
            credentials,
            request_timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    async fn call<Req, Resp>(&self, method: &'static str, body: &Req) -> Result<Resp, ApiError>
    where
        Req: Serialize + ?Sized + Sync,
        Resp: DeserializeOwned,
    {
        let url = method_url(&self.base_url, method);
        debug!(method, "tinkoff request");

        let resp = self
            .credentials
            .apply(self.http.post(url))
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = resp.status();
        let bytes = resp.bytes().await.map_err(transport_error)?;

        if !status.is_success() {
            return Err(error_from_body(status, &bytes));
        }
        serde_json::from_slice(&bytes)
            .map_err(|e| ApiError::Decode(format!("{method} response: {e}")))
    }
}

impl fmt::Debug for TinkoffClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TinkoffClient")
            .field("base_url", &self.base_url)
            .field("credentials", &self.credentials)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

#[async_trait]
impl PortfolioApi for TinkoffClient {
    fn exchange(&self) -> &str {
        EXCHANGE
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, ApiError> {
        let resp: GetAccountsResponse = self.call(GET_ACCOUNTS, &GetAccountsRequest {}).await?;
        Ok(resp.accounts.into_iter().map(Account::from).collect())
    }

    async fn get_portfolio(
        &self,
        account_id: &str,
        currency: &str,
    ) -> Result<PortfolioSnapshot, ApiError> {
        let req = PortfolioRequest {
            account_id,
            currency,
        };
        let resp: PortfolioResponse = self.call(GET_PORTFOLIO, &req).await?;
        Ok(resp.into_snapshot(account_id))
    }

    async fn resolve_instrument(&self, instrument_id: &str) -> Result<InstrumentMeta, ApiError> {
        let req = InstrumentRequest {
            id_type: INSTRUMENT_ID_TYPE_UID,
            id: instrument_id,
        };
        let resp: InstrumentResponse = self.call(GET_INSTRUMENT_BY, &req).await?;
        Ok(resp.into_meta(instrument_id))
    }
}

fn config_error(e: ConfigError) -> ApiError {
    ApiError::Config(e.to_string())
}

fn transport_error(e: reqwest::Error) -> ApiError {
    if e.is_timeout() {
        ApiError::Timeout
    } else {
        ApiError::Transport(e.to_string())
    }
}

fn error_from_body(status: StatusCode, bytes: &[u8]) -> ApiError {
    match serde_json::from_slice::<ErrorBody>(bytes) {
        Ok(body) => {
            let message = match body.description.filter(|d| !d.is_empty()) {
                Some(d) if !body.message.is_empty() => format!("{} ({d})", body.message),
                Some(d) => d,
                None if body.message.is_empty() => format!("http status {}", status.as_u16()),
                None => body.message,
            };
            ApiError::Api {
                code: body.code,
                message,
            }
        }
        Err(_) => ApiError::Decode(format!(
            "http status {} with undecodable error body",
            status.as_u16()
        )),
    }
}
