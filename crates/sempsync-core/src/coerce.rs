//! Desired-state value coercion.
//!
//! The calling automation layer stringifies every scalar before it reaches a
//! task, so `"5"` must compare equal to a remote `5`. The direct broker wants
//! the values typed; the hosted-cloud API wants the opposite and takes every
//! scalar as a string.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Number, Value};

use crate::types::Settings;

lazy_static! {
    static ref INT_RE: Regex = Regex::new(r"^[0-9]+$").unwrap();
    static ref FLOAT_RE: Regex = Regex::new(r"^[0-9]+\.[0-9]$").unwrap();
}

/// Coerce stringified scalars into typed values, recursing into nested maps:
/// all-digit strings become integers, single-fraction-digit decimals become
/// floats. Everything else is left untouched.
pub fn coerce_broker(settings: &mut Settings) {
    for (_, value) in settings.iter_mut() {
        match value {
            Value::String(s) => {
                if INT_RE.is_match(s) {
                    if let Ok(n) = s.parse::<u64>() {
                        *value = Value::Number(Number::from(n));
                    }
                } else if FLOAT_RE.is_match(s) {
                    if let Ok(f) = s.parse::<f64>() {
                        if let Some(n) = Number::from_f64(f) {
                            *value = Value::Number(n);
                        }
                    }
                }
            }
            Value::Object(inner) => coerce_broker(inner),
            _ => {}
        }
    }
}

/// The inverse direction for the hosted-cloud API: numbers become decimal
/// strings and booleans become `"true"` / `"false"`.
pub fn stringify_cloud(settings: &mut Settings) {
    for (_, value) in settings.iter_mut() {
        match value {
            Value::Number(n) => {
                *value = Value::String(n.to_string());
            }
            Value::Bool(b) => {
                *value = Value::String(b.to_string());
            }
            Value::Object(inner) => stringify_cloud(inner),
            _ => {}
        }
    }
}

/// Merge maps left to right; later maps override earlier ones.
pub fn merge_maps(maps: &[&Settings]) -> Settings {
    let mut out = Map::new();
    for m in maps {
        for (k, v) in m.iter() {
            out.insert(k.clone(), v.clone());
        }
    }
    out
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn settings(v: Value) -> Settings {
        v.as_object().unwrap().clone()
    }

    #[test]
    fn digit_strings_become_integers() {
        let mut s = settings(json!({"count": "5", "name": "q1"}));
        coerce_broker(&mut s);
        assert_eq!(s["count"], json!(5));
        assert_eq!(s["name"], json!("q1"));
    }

    #[test]
    fn decimal_strings_become_floats() {
        let mut s = settings(json!({"rate": "1.5"}));
        coerce_broker(&mut s);
        assert_eq!(s["rate"], json!(1.5));
    }

    #[test]
    fn multi_fraction_digits_stay_strings() {
        // the compare pattern accepts exactly one fraction digit
        let mut s = settings(json!({"rate": "1.55"}));
        coerce_broker(&mut s);
        assert_eq!(s["rate"], json!("1.55"));
    }

    #[test]
    fn nested_maps_recurse() {
        let mut s = settings(json!({"eventBindCountThreshold": {"setPercent": "80", "clearPercent": "60"}}));
        coerce_broker(&mut s);
        assert_eq!(s["eventBindCountThreshold"]["setPercent"], json!(80));
        assert_eq!(s["eventBindCountThreshold"]["clearPercent"], json!(60));
    }

    #[test]
    fn coerced_value_compares_equal_to_remote() {
        let mut desired = settings(json!({"maxMsgSpoolUsage": "800"}));
        coerce_broker(&mut desired);
        let current = settings(json!({"maxMsgSpoolUsage": 800}));
        assert_eq!(desired["maxMsgSpoolUsage"], current["maxMsgSpoolUsage"]);
    }

    #[test]
    fn booleans_untouched_in_broker_direction() {
        let mut s = settings(json!({"enabled": true}));
        coerce_broker(&mut s);
        assert_eq!(s["enabled"], json!(true));
    }

    #[test]
    fn cloud_stringifies_numbers_and_bools() {
        let mut s = settings(json!({"maxConnections": 100, "enabled": true, "label": "x"}));
        stringify_cloud(&mut s);
        assert_eq!(s["maxConnections"], json!("100"));
        assert_eq!(s["enabled"], json!("true"));
        assert_eq!(s["label"], json!("x"));
    }

    #[test]
    fn merge_later_maps_win() {
        let a = settings(json!({"enabled": false, "queueName": "a"}));
        let b = settings(json!({"enabled": true}));
        let merged = merge_maps(&[&a, &b]);
        assert_eq!(merged["enabled"], json!(true));
        assert_eq!(merged["queueName"], json!("a"));
    }

    #[test]
    fn merge_empty_input() {
        let merged = merge_maps(&[]);
        assert!(merged.is_empty());
    }
}
