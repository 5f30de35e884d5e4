//! Free-form per-exchange parameters.
//!
//! # Contract
//! - Values are plain strings; YAML numbers and booleans are stringified.
//! - A secret parameter `<name>` may be supplied directly or indirectly via
//!   `<name>_env`, which holds the NAME of an environment variable. The direct
//!   value wins when both are present.
//! - `Debug` output redacts every value whose key looks secret.
//! - Error messages reference key and env var NAMES, never values.

use std::collections::BTreeMap;
use std::fmt;

use crate::ConfigError;

/// Key fragments whose values are redacted in `Debug`.
const SECRET_KEY_MARKERS: &[&str] = &["key", "token", "secret", "password"];

#[derive(Clone, Default, PartialEq, Eq)]
pub struct ExchangeParams {
    values: BTreeMap<String, String>,
}

impl fmt::Debug for ExchangeParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (k, v) in &self.values {
            if is_secret_key(k) && !k.ends_with("_env") {
                map.entry(k, &"<REDACTED>");
            } else {
                map.entry(k, v);
            }
        }
        map.finish()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ExchangeParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl ExchangeParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Non-blank value of `key`, trimmed.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Like [`get`](Self::get) but missing values are a configuration error.
    pub fn require(&self, key: &str) -> Result<&str, ConfigError> {
        self.get(key)
            .ok_or_else(|| ConfigError::MissingParam(key.to_string()))
    }

    /// Resolve a secret parameter directly or through `<key>_env`.
    ///
    /// Returns `Ok(None)` when neither form is configured, and an error when
    /// `<key>_env` names a variable that is unset or blank.
    pub fn secret(&self, key: &str) -> Result<Option<String>, ConfigError> {
        if let Some(v) = self.get(key) {
            return Ok(Some(v.to_string()));
        }
        let env_key = format!("{key}_env");
        let Some(var_name) = self.get(&env_key) else {
            return Ok(None);
        };
        match std::env::var(var_name) {
            Ok(v) if !v.trim().is_empty() => Ok(Some(v.trim().to_string())),
            _ => Err(ConfigError::MissingEnv {
                key: env_key,
                var: var_name.to_string(),
            }),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub(crate) fn from_json(v: &serde_json::Value) -> Result<Self, ConfigError> {
        let mut out = Self::new();
        let serde_json::Value::Object(map) = v else {
            if v.is_null() {
                return Ok(out);
            }
            return Err(ConfigError::Invalid(
                "exchange params must be a mapping".to_string(),
            ));
        };
        for (k, val) in map {
            let s = match val {
                serde_json::Value::String(s) => s.clone(),
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Bool(b) => b.to_string(),
                serde_json::Value::Null => continue,
                _ => {
                    return Err(ConfigError::Invalid(format!(
                        "exchange param '{k}' must be a scalar"
                    )))
                }
            };
            out.insert(k.clone(), s);
        }
        Ok(out)
    }
}

fn is_secret_key(k: &str) -> bool {
    let lower = k.to_ascii_lowercase();
    SECRET_KEY_MARKERS.iter().any(|m| lower.contains(m))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_secret_values() {
        let p: ExchangeParams = [("api_key", "t.super-secret"), ("app_name", "exporter")]
            .into_iter()
            .collect();
        let dbg = format!("{p:?}");
        assert!(!dbg.contains("t.super-secret"));
        assert!(dbg.contains("<REDACTED>"));
        assert!(dbg.contains("exporter"));
    }

    #[test]
    fn blank_values_count_as_missing() {
        let p: ExchangeParams = [("app_name", "   ")].into_iter().collect();
        assert!(p.get("app_name").is_none());
        assert!(matches!(
            p.require("app_name"),
            Err(ConfigError::MissingParam(ref k)) if k == "app_name"
        ));
    }

    #[test]
    fn scalars_are_stringified() {
        let v = serde_json::json!({"app_name": 42, "flag": true, "gone": null});
        let p = ExchangeParams::from_json(&v).unwrap();
        assert_eq!(p.get("app_name"), Some("42"));
        assert_eq!(p.get("flag"), Some("true"));
        assert!(p.get("gone").is_none());
    }

    #[test]
    fn nested_values_are_rejected() {
        let v = serde_json::json!({"api_key": {"nested": 1}});
        assert!(ExchangeParams::from_json(&v).is_err());
    }
}
