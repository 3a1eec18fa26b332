//! Lenient string coercion for environment overrides.
//!
//! Overrides arrive as flat string key/value pairs (`FLOATING_BALL_*`
//! environment variables). Each value is converted by the type of the
//! matching default; keys without a default fall back to heuristic
//! inference.

use serde_json::{Number, Value};
use std::collections::BTreeMap;

pub type JsonMap = serde_json::Map<String, Value>;

const ENV_PREFIX: &str = "FLOATING_BALL_";

/// Collects `FLOATING_BALL_*` environment variables as override pairs,
/// keys lowercased without the prefix.
pub fn env_overrides() -> BTreeMap<String, String> {
    collect_prefixed(std::env::vars())
}

pub fn collect_prefixed(
    vars: impl Iterator<Item = (String, String)>,
) -> BTreeMap<String, String> {
    vars.filter_map(|(key, value)| {
        key.strip_prefix(ENV_PREFIX)
            .filter(|rest| !rest.is_empty())
            .map(|rest| (rest.to_ascii_lowercase(), value))
    })
    .collect()
}

/// Applies raw overrides on top of `defaults`, coercing each value by the
/// type of the matching default. A value that cannot be coerced leaves the
/// default in place.
pub fn merge_coerced(defaults: &JsonMap, overrides: &BTreeMap<String, String>) -> JsonMap {
    let mut result = defaults.clone();
    for (key, raw) in overrides {
        let coerced = match defaults.get(key) {
            Some(default) => coerce_to_match(default, raw),
            None => Some(infer(raw)),
        };
        if let Some(value) = coerced {
            result.insert(key.clone(), value);
        }
    }
    result
}

fn coerce_to_match(default: &Value, raw: &str) -> Option<Value> {
    match default {
        Value::Bool(_) => Some(Value::Bool(raw == "true")),
        Value::Number(_) => parse_number(raw),
        Value::Array(_) | Value::Null => serde_json::from_str(raw).ok(),
        Value::Object(base) => {
            // object defaults take a JSON patch, shallow-merged in
            let patch: JsonMap = serde_json::from_str(raw).ok()?;
            let mut merged = base.clone();
            for (key, value) in patch {
                merged.insert(key, value);
            }
            Some(Value::Object(merged))
        }
        Value::String(_) => Some(Value::String(raw.to_string())),
    }
}

/// Heuristic conversion for keys with no matching default: `"null"`,
/// boolean literals, numbers, then JSON, then the raw string.
pub fn infer(raw: &str) -> Value {
    match raw {
        "null" => Value::Null,
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => {
            if let Some(number) = parse_number(raw) {
                return number;
            }
            serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
        }
    }
}

fn parse_number(raw: &str) -> Option<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(int) = trimmed.parse::<i64>() {
        return Some(Value::Number(Number::from(int)));
    }
    trimmed
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
}

/// Top-level key replacement, the merge semantics used everywhere in this
/// crate.
pub fn shallow_merge(mut base: JsonMap, overrides: &JsonMap) -> JsonMap {
    for (key, value) in overrides {
        base.insert(key.clone(), value.clone());
    }
    base
}
