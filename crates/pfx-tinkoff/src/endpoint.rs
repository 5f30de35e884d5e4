/// REST gateway used when `api_endpoint` is not configured.
pub const DEFAULT_API_ENDPOINT: &str = "https://invest-public-api.tinkoff.ru/rest";

const SERVICE_PREFIX: &str = "tinkoff.public.invest.api.contract.v1";

/// Base URL for the broker's JSON gateway.
///
/// Accepts either a full `http(s)://` URL (used as given) or the bare
/// `host:port` form the broker documents for gRPC, which maps to
/// `https://host:port/rest`.
pub fn normalize_endpoint(raw: Option<&str>) -> String {
    let raw = match raw.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => return DEFAULT_API_ENDPOINT.to_string(),
    };
    let base = raw.trim_end_matches('/');
    if base.starts_with("http://") || base.starts_with("https://") {
        base.to_string()
    } else {
        format!("https://{base}/rest")
    }
}

/// Full URL of one RPC method, e.g. `UsersService/GetAccounts`.
pub(crate) fn method_url(base: &str, method: &str) -> String {
    format!("{base}/{SERVICE_PREFIX}.{method}")
}
