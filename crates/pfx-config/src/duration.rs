//! Duration strings in config files.
//!
//! Accepted forms:
//! - a YAML integer: whole seconds (`interval: 30`);
//! - a unit string, optionally compound: `"500ms"`, `"30s"`, `"1m30s"`, `"1.5h"`.
//!
//! Units: `ns`, `us` (or `µs`), `ms`, `s`, `m`, `h`. A bare `"0"` is zero.
//! Signs are rejected here; a negative duration is never a valid setting.

use std::time::Duration;

use crate::ConfigError;

const UNITS: &[(&str, f64)] = &[
    ("ns", 1e-9),
    ("us", 1e-6),
    ("µs", 1e-6),
    ("ms", 1e-3),
    ("s", 1.0),
    ("m", 60.0),
    ("h", 3600.0),
];

/// Parse a unit duration string such as `"1m30s"`.
pub fn parse_duration(raw: &str) -> Result<Duration, ConfigError> {
    let s = raw.trim();
    let invalid = |reason: &str| ConfigError::Duration {
        value: raw.to_string(),
        reason: reason.to_string(),
    };

    if s.is_empty() {
        return Err(invalid("empty duration"));
    }
    if s.starts_with('-') || s.starts_with('+') {
        return Err(invalid("signed durations are not allowed"));
    }
    if s == "0" {
        return Ok(Duration::ZERO);
    }

    let mut total_secs = 0f64;
    let mut rest = s;
    while !rest.is_empty() {
        let num_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if num_len == 0 {
            return Err(invalid("expected a number"));
        }
        let value: f64 = rest[..num_len]
            .parse()
            .map_err(|_| invalid("malformed number"))?;
        rest = &rest[num_len..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        if unit_len == 0 {
            return Err(invalid("missing unit"));
        }
        let unit = &rest[..unit_len];
        let scale = UNITS
            .iter()
            .find(|(name, _)| *name == unit)
            .map(|(_, scale)| *scale)
            .ok_or_else(|| invalid(&format!("unknown unit '{unit}'")))?;
        total_secs += value * scale;
        rest = &rest[unit_len..];
    }

    Duration::try_from_secs_f64(total_secs).map_err(|_| invalid("out of range"))
}

/// Parse a YAML-sourced value: an integer number of seconds or a unit string.
pub(crate) fn duration_from_json(
    field: &str,
    v: &serde_json::Value,
) -> Result<Duration, ConfigError> {
    match v {
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(secs) if secs >= 0 => Ok(Duration::from_secs(secs as u64)),
            Some(_) => Err(ConfigError::NonPositiveDuration {
                field: field.to_string(),
                value: n.to_string(),
            }),
            None => Err(ConfigError::Duration {
                value: n.to_string(),
                reason: "integer seconds expected; use a unit string for fractions".to_string(),
            }),
        },
        serde_json::Value::String(s) if s.trim_start().starts_with('-') => {
            Err(ConfigError::NonPositiveDuration {
                field: field.to_string(),
                value: s.clone(),
            })
        }
        serde_json::Value::String(s) => parse_duration(s),
        other => Err(ConfigError::Duration {
            value: other.to_string(),
            reason: "expected integer seconds or a duration string".to_string(),
        }),
    }
}
