//! pfx-config
//!
//! Exporter configuration: layered YAML files merged into one JSON document,
//! hashed for provenance, then validated into a typed [`ExporterConfig`].
//!
//! Every validation failure is a [`ConfigError`] and is fatal at startup.

pub mod consumption;
pub mod duration;
pub mod params;

use std::collections::BTreeMap;
use std::fs;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use thiserror::Error;

pub use consumption::{report_unused_keys, UnusedKeyReport};
pub use duration::parse_duration;
pub use params::ExchangeParams;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 80;
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
    #[error("invalid duration '{value}': {reason}")]
    Duration { value: String, reason: String },
    #[error("{field} must be a positive duration (got {value})")]
    NonPositiveDuration { field: String, value: String },
    #[error("{field} is too large to schedule (got {value})")]
    DurationOutOfRange { field: String, value: String },
    #[error("request_timeout {timeout:?} exceeds scrape interval {interval:?}")]
    TimeoutExceedsInterval {
        timeout: Duration,
        interval: Duration,
    },
    #[error("missing required parameter '{0}'")]
    MissingParam(String),
    #[error("parameter '{key}' names env var '{var}' which is not set or empty")]
    MissingEnv { key: String, var: String },
}

// ---------------------------------------------------------------------------
// Typed config
// ---------------------------------------------------------------------------

/// What the scheduler does when a tick fires while a cycle is still running.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapPolicy {
    /// Skip the tick; at most one cycle in flight.
    #[default]
    Skip,
    /// Start another cycle regardless.
    Allow,
}

impl OverlapPolicy {
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(OverlapPolicy::Skip),
            "allow" => Ok(OverlapPolicy::Allow),
            other => Err(ConfigError::Invalid(format!(
                "overlap must be one of: skip | allow (got '{other}')"
            ))),
        }
    }
}

/// Per-exchange scrape settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ExchangeConfig {
    pub interval: Duration,
    /// Upper bound for each remote call; never longer than `interval`.
    pub request_timeout: Duration,
    pub overlap: OverlapPolicy,
    /// Instrument metadata cache capacity; `0` disables caching.
    pub instrument_cache: usize,
    pub params: ExchangeParams,
}

impl ExchangeConfig {
    /// Settings with defaults and the given interval; used by tests and embedders.
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            request_timeout: interval,
            overlap: OverlapPolicy::default(),
            instrument_cache: 0,
            params: ExchangeParams::new(),
        }
    }

    fn from_json(name: &str, v: &Value) -> Result<Self, ConfigError> {
        if !(v.is_object() || v.is_null()) {
            return Err(ConfigError::Invalid(format!(
                "exchanges.{name} must be a mapping"
            )));
        }
        let field = |key: &str| v.get(key).filter(|x| !x.is_null());

        let interval = match field("interval") {
            Some(x) => duration::duration_from_json("interval", x)?,
            None => DEFAULT_INTERVAL,
        };
        if interval.is_zero() {
            return Err(ConfigError::NonPositiveDuration {
                field: format!("exchanges.{name}.interval"),
                value: format!("{interval:?}"),
            });
        }

        let request_timeout = match field("request_timeout") {
            Some(x) => duration::duration_from_json("request_timeout", x)?,
            None => interval,
        };
        if request_timeout.is_zero() {
            return Err(ConfigError::NonPositiveDuration {
                field: format!("exchanges.{name}.request_timeout"),
                value: format!("{request_timeout:?}"),
            });
        }
        if request_timeout > interval {
            return Err(ConfigError::TimeoutExceedsInterval {
                timeout: request_timeout,
                interval,
            });
        }

        let overlap = match field("overlap") {
            Some(Value::String(s)) => OverlapPolicy::parse(s)?,
            Some(other) => {
                return Err(ConfigError::Invalid(format!(
                    "exchanges.{name}.overlap must be a string (got {other})"
                )))
            }
            None => OverlapPolicy::default(),
        };

        let instrument_cache = match field("instrument_cache") {
            Some(x) => x.as_u64().ok_or_else(|| {
                ConfigError::Invalid(format!(
                    "exchanges.{name}.instrument_cache must be a non-negative integer"
                ))
            })? as usize,
            None => 0,
        };

        let params = match field("params") {
            Some(x) => ExchangeParams::from_json(x)?,
            None => ExchangeParams::new(),
        };

        Ok(Self {
            interval,
            request_timeout,
            overlap,
            instrument_cache,
            params,
        })
    }
}

/// Top-level exporter settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ExporterConfig {
    pub host: String,
    pub port: u16,
    /// Exchange name -> settings, in name order.
    pub exchanges: BTreeMap<String, ExchangeConfig>,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            exchanges: BTreeMap::new(),
        }
    }
}

impl ExporterConfig {
    /// Validate a merged config document.
    pub fn from_json(v: &Value) -> Result<Self, ConfigError> {
        let mut cfg = ExporterConfig::default();
        if v.is_null() {
            return Ok(cfg);
        }
        if !v.is_object() {
            return Err(ConfigError::Invalid("top level must be a mapping".to_string()));
        }

        match v.get("host") {
            Some(Value::String(h)) if !h.trim().is_empty() => cfg.host = h.trim().to_string(),
            Some(Value::Null) | None => {}
            Some(other) => {
                return Err(ConfigError::Invalid(format!(
                    "host must be a non-empty string (got {other})"
                )))
            }
        }

        match v.get("port") {
            Some(Value::Number(n)) => {
                cfg.port = n
                    .as_u64()
                    .and_then(|p| u16::try_from(p).ok())
                    .ok_or_else(|| ConfigError::Invalid(format!("port out of range: {n}")))?;
            }
            Some(Value::Null) | None => {}
            Some(other) => {
                return Err(ConfigError::Invalid(format!(
                    "port must be an integer (got {other})"
                )))
            }
        }

        match v.get("exchanges") {
            Some(Value::Object(map)) => {
                for (name, ex) in map {
                    cfg.exchanges
                        .insert(name.clone(), ExchangeConfig::from_json(name, ex)?);
                }
            }
            Some(Value::Null) | None => {}
            Some(_) => return Err(ConfigError::Invalid("exchanges must be a mapping".to_string())),
        }

        Ok(cfg)
    }

    /// `host:port` string the metrics server binds to.
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// ---------------------------------------------------------------------------
// Layered loading
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// SHA-256 of `canonical_json`, hex encoded.
    pub config_hash: String,
    pub canonical_json: String,
    pub config_json: Value,
    pub config: ExporterConfig,
}

pub fn load_layered_yaml(paths: &[&str]) -> Result<LoadedConfig, ConfigError> {
    let mut docs: Vec<String> = Vec::new();
    for p in paths {
        let raw = fs::read_to_string(p).map_err(|source| ConfigError::Read {
            path: p.to_string(),
            source,
        })?;
        docs.push(raw);
    }

    let doc_refs: Vec<&str> = docs.iter().map(|s| s.as_str()).collect();
    load_layered_yaml_from_strings(&doc_refs)
}

pub fn load_layered_yaml_from_strings(yaml_docs: &[&str]) -> Result<LoadedConfig, ConfigError> {
    // Earlier docs are base, later docs override.
    let mut merged = Value::Null;
    for raw in yaml_docs {
        let v_yaml: serde_yaml::Value = serde_yaml::from_str(raw)?;
        let v_json = serde_json::to_value(v_yaml)
            .map_err(|e| ConfigError::Invalid(format!("yaml->json conversion failed: {e}")))?;
        merged = deep_merge(merged, v_json);
    }

    let config = ExporterConfig::from_json(&merged)?;
    let canonical_json = serde_json::to_string(&merged)
        .map_err(|e| ConfigError::Invalid(format!("canonical json serialize failed: {e}")))?;
    let config_hash = sha256_hex(canonical_json.as_bytes());

    Ok(LoadedConfig {
        config_hash,
        canonical_json,
        config_json: merged,
        config,
    })
}

fn deep_merge(a: Value, b: Value) -> Value {
    match (a, b) {
        (Value::Object(mut a_map), Value::Object(b_map)) => {
            for (k, b_val) in b_map {
                let a_val = a_map.remove(&k).unwrap_or(Value::Null);
                a_map.insert(k, deep_merge(a_val, b_val));
            }
            Value::Object(a_map)
        }
        // an empty overlay document keeps the base
        (a_other, Value::Null) => a_other,
        (_, b_other) => b_other,
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
