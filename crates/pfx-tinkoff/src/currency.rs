use pfx_config::ExchangeParams;
use pfx_portfolio::ApiError;

/// Valuation currencies `OperationsService/GetPortfolio` accepts.
pub const SUPPORTED_CURRENCIES: &[&str] = &["RUB", "USD", "EUR"];

/// Currency used when `currency` is not configured.
pub const DEFAULT_PORTFOLIO_CURRENCY: &str = "RUB";

/// Validated, upper-cased `currency` param.
pub fn portfolio_currency(params: &ExchangeParams) -> Result<String, ApiError> {
    let raw = match params.get("currency").map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => return Ok(DEFAULT_PORTFOLIO_CURRENCY.to_string()),
    };
    let code = raw.to_ascii_uppercase();
    if SUPPORTED_CURRENCIES.contains(&code.as_str()) {
        Ok(code)
    } else {
        Err(ApiError::Config(format!(
            "currency '{raw}' is not supported (expected one of {})",
            SUPPORTED_CURRENCIES.join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> ExchangeParams {
        pairs.iter().copied().collect()
    }

    #[test]
    fn missing_or_blank_defaults_to_rub() {
        assert_eq!(portfolio_currency(&params(&[])).unwrap(), "RUB");
        assert_eq!(portfolio_currency(&params(&[("currency", " ")])).unwrap(), "RUB");
    }

    #[test]
    fn known_codes_are_normalized() {
        assert_eq!(portfolio_currency(&params(&[("currency", " usd ")])).unwrap(), "USD");
        assert_eq!(portfolio_currency(&params(&[("currency", "EUR")])).unwrap(), "EUR");
    }

    #[test]
    fn unknown_code_is_config_error() {
        let err = portfolio_currency(&params(&[("currency", "cny")])).unwrap_err();
        assert!(err.is_config());
        let msg = err.to_string();
        assert!(msg.contains("cny"), "{msg}");
        assert!(msg.contains("RUB, USD, EUR"), "{msg}");
    }
}
