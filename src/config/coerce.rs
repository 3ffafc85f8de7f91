//! Parse-with-fallback helpers for loosely typed config rows.
//!
//! Rows come from a spreadsheet export, so a numeric column may hold a JSON
//! number, a numeric string, an empty string, or nothing at all. Every getter
//! here returns the documented fallback instead of failing.

use serde_json::{Map, Value};
use tracing::warn;

/// A single untyped config row.
pub type Row = Map<String, Value>;

/// Reads a value as `f64`. Accepts numbers, numeric strings and booleans.
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
            }
        }
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Numeric field with fallback. A present but unparsable value is logged.
pub fn number(row: &Row, key: &str, default: f64) -> f64 {
    match row.get(key) {
        None => default,
        Some(v) if is_blank(v) => default,
        Some(v) => as_number(v).unwrap_or_else(|| {
            warn!(key, value = %v, default, "unparsable numeric field, using default");
            default
        }),
    }
}

pub fn int(row: &Row, key: &str, default: i32) -> i32 {
    number(row, key, default as f64).floor() as i32
}

/// Non-negative integer field; negative values clamp to zero.
pub fn uint(row: &Row, key: &str, default: u32) -> u32 {
    number(row, key, default as f64).floor().max(0.0) as u32
}

pub fn boolean(row: &Row, key: &str, default: bool) -> bool {
    match row.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "y" | "1" | "x" => true,
            "false" | "no" | "n" | "0" => false,
            "" => default,
            other => {
                warn!(key, value = other, default, "unparsable boolean field, using default");
                default
            }
        },
        Some(Value::Number(n)) => n.as_f64().map(|v| v != 0.0).unwrap_or(default),
        _ => default,
    }
}

/// String field, trimmed. Numbers are rendered so numeric ids still work.
pub fn string(row: &Row, key: &str) -> Option<String> {
    match row.get(key)? {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub fn string_or(row: &Row, key: &str, default: &str) -> String {
    string(row, key).unwrap_or_else(|| default.to_string())
}

/// List field. Accepts a JSON array or a comma separated string.
pub fn list(row: &Row, key: &str) -> Vec<String> {
    match row.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .filter(|s| !s.is_empty())
            .collect(),
        Some(Value::String(s)) => s
            .split(',')
            .map(|part| part.trim().to_string())
            .filter(|part| !part.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        match value {
            Value::Object(map) => map,
            _ => Row::new(),
        }
    }

    #[test]
    fn test_number_accepts_numeric_strings() {
        let r = row(json!({"hp": "42", "ac": 7, "dmg": " 3.5 "}));
        assert_eq!(number(&r, "hp", 0.0), 42.0);
        assert_eq!(number(&r, "ac", 0.0), 7.0);
        assert_eq!(number(&r, "dmg", 0.0), 3.5);
    }

    #[test]
    fn test_number_falls_back_on_missing_blank_or_garbage() {
        let r = row(json!({"blank": "", "junk": "lots", "null": null}));
        assert_eq!(number(&r, "missing", 9.0), 9.0);
        assert_eq!(number(&r, "blank", 9.0), 9.0);
        assert_eq!(number(&r, "junk", 9.0), 9.0);
        assert_eq!(number(&r, "null", 9.0), 9.0);
    }

    #[test]
    fn test_uint_clamps_negative() {
        let r = row(json!({"weight": -4}));
        assert_eq!(uint(&r, "weight", 1), 0);
    }

    #[test]
    fn test_boolean_spreadsheet_spellings() {
        let r = row(json!({"a": "TRUE", "b": "no", "c": 1, "d": "maybe"}));
        assert!(boolean(&r, "a", false));
        assert!(!boolean(&r, "b", true));
        assert!(boolean(&r, "c", false));
        assert!(boolean(&r, "d", true));
    }

    #[test]
    fn test_list_from_csv_and_array() {
        let r = row(json!({"csv": "kick, bash,,", "arr": ["a", 2]}));
        assert_eq!(list(&r, "csv"), vec!["kick", "bash"]);
        assert_eq!(list(&r, "arr"), vec!["a", "2"]);
        assert!(list(&r, "none").is_empty());
    }
}
