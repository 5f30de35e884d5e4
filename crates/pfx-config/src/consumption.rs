//! Config consumption map + unused-key report.
//!
//! "Consumed patterns" are JSON-pointer prefixes where a `*` segment matches
//! any single key. A leaf pointer under a consumed prefix is considered read
//! by the exporter; every other leaf is reported as unused. The daemon logs
//! the report as warnings; it never aborts startup.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Pointers the exporter actually reads. Keep in sync with `ExporterConfig::from_json`.
pub static CONSUMED: &[&str] = &[
    "/host",
    "/port",
    "/exchanges/*/interval",
    "/exchanges/*/request_timeout",
    "/exchanges/*/overlap",
    "/exchanges/*/instrument_cache",
    // free-form; the integration decides which keys matter
    "/exchanges/*/params",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnusedKeyReport {
    /// Sorted, unique leaf pointers not covered by any consumed pattern.
    pub unused_leaf_pointers: Vec<String>,
}

impl UnusedKeyReport {
    pub fn is_clean(&self) -> bool {
        self.unused_leaf_pointers.is_empty()
    }
}

/// Report leaves of `config_json` that no consumed pattern covers.
pub fn report_unused_keys(config_json: &Value) -> UnusedKeyReport {
    let mut leaves = Vec::new();
    collect_leaf_pointers(config_json, "", &mut leaves);

    let mut unused: Vec<String> = leaves
        .into_iter()
        .filter(|leaf| !CONSUMED.iter().any(|p| pattern_covers(p, leaf)))
        .collect();
    unused.sort();
    unused.dedup();

    UnusedKeyReport {
        unused_leaf_pointers: unused,
    }
}

/// `true` if `pattern` is a segment-wise prefix of `leaf`.
///
/// - `*` matches exactly one segment
/// - `/a/b` covers `/a/b` and `/a/b/c` but NOT `/a/bc`
fn pattern_covers(pattern: &str, leaf: &str) -> bool {
    let pat: Vec<&str> = pattern.trim_start_matches('/').split('/').collect();
    let segs: Vec<&str> = leaf.trim_start_matches('/').split('/').collect();
    if segs.len() < pat.len() {
        return false;
    }
    pat.iter().zip(segs.iter()).all(|(p, s)| *p == "*" || p == s)
}

pub(crate) fn collect_leaf_pointers(v: &Value, prefix: &str, out: &mut Vec<String>) {
    match v {
        Value::Object(map) => {
            for (k, vv) in map.iter() {
                let next = format!("{}/{}", prefix, escape_pointer_token(k));
                collect_leaf_pointers(vv, &next, out);
            }
        }
        Value::Array(arr) => {
            for (i, vv) in arr.iter().enumerate() {
                let next = format!("{}/{}", prefix, i);
                collect_leaf_pointers(vv, &next, out);
            }
        }
        _ => {
            let p = if prefix.is_empty() {
                "/".to_string()
            } else {
                prefix.to_string()
            };
            out.push(p);
        }
    }
}

fn escape_pointer_token(s: &str) -> String {
    s.replace('~', "~0").replace('/', "~1")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_matches_one_segment() {
        assert!(pattern_covers("/exchanges/*/interval", "/exchanges/tinkoff/interval"));
        assert!(pattern_covers("/exchanges/*/params", "/exchanges/x/params/api_key"));
        assert!(!pattern_covers("/exchanges/*/interval", "/exchanges/tinkoff/intervals"));
        assert!(!pattern_covers("/exchanges/*/interval", "/exchanges"));
    }

    #[test]
    fn leaf_pointers_escape_slashes() {
        let v = serde_json::json!({"a/b": {"c~d": 1}});
        let mut out = Vec::new();
        collect_leaf_pointers(&v, "", &mut out);
        assert_eq!(out, vec!["/a~1b/c~0d".to_string()]);
    }
}
