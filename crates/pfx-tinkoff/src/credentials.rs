use std::fmt;

use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::RequestBuilder;

use pfx_portfolio::ApiError;

pub const APP_NAME_HEADER: &str = "x-app-name";

/// Per-request credentials for the broker API.
///
/// Applied to every outgoing request builder; nothing is stored in the
/// client's default headers so each call site is explicit.
#[derive(Clone)]
pub struct CredentialHeaders {
    authorization: HeaderValue,
    app_name: HeaderValue,
}

impl CredentialHeaders {
    pub fn new(api_key: &str, app_name: &str) -> Result<Self, ApiError> {
        let mut authorization = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|_| ApiError::Config("api_key contains invalid header characters".into()))?;
        authorization.set_sensitive(true);
        let app_name = HeaderValue::from_str(app_name)
            .map_err(|_| ApiError::Config("app_name contains invalid header characters".into()))?;
        Ok(Self {
            authorization,
            app_name,
        })
    }

    pub fn apply(&self, req: RequestBuilder) -> RequestBuilder {
        req.header(AUTHORIZATION, self.authorization.clone())
            .header(APP_NAME_HEADER, self.app_name.clone())
    }

    pub fn app_name(&self) -> &str {
        self.app_name.to_str().unwrap_or_default()
    }
}

impl fmt::Debug for CredentialHeaders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialHeaders")
            .field("authorization", &"Bearer <REDACTED>")
            .field("app_name", &self.app_name())
            .finish()
    }
}
