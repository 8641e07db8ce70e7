//! util: shared helpers for reading loosely-typed snapshot JSON.
//!
//! Contains:
//! - json_str / json_u64 / json_i64 / json_bool: tolerant scalar accessors.
//! - json_timestamp: unix seconds (number or numeric string) or RFC 3339 text.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{Map, Value};

/// String field; numbers are stringified, empty strings and null are absent.
pub fn json_str(map: &Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub fn json_u64(map: &Map<String, Value>, key: &str) -> Option<u64> {
    match map.get(key)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn json_i64(map: &Map<String, Value>, key: &str) -> Option<i64> {
    match map.get(key)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Booleans may be stored as true/false, 0/1 or "0"/"1".
pub fn json_bool(map: &Map<String, Value>, key: &str) -> Option<bool> {
    match map.get(key)? {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_i64().map(|v| v != 0),
        Value::String(s) => Some(truthy(s)),
        _ => None,
    }
}

pub fn json_timestamp(map: &Map<String, Value>, key: &str) -> Option<DateTime<Utc>> {
    match map.get(key)? {
        Value::Number(n) => n.as_i64().and_then(|secs| Utc.timestamp_opt(secs, 0).single()),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(secs) = s.parse::<i64>() {
                return Utc.timestamp_opt(secs, 0).single();
            }
            DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|d| d.with_timezone(&Utc))
        }
        _ => None,
    }
}

fn truthy(s: &str) -> bool {
    let s = s.trim().to_ascii_lowercase();
    s == "1" || s == "true" || s == "yes" || s == "on"
}
