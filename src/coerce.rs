//! Loose conversions between caller-supplied JSON values and the typed
//! record fields. Clients send form data and JSON interchangeably, so numbers
//! may arrive as strings and are accepted either way.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Whether a value counts as "present": not null, false, empty or zero.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// String form of a field value, used for substring matching.
pub fn text_form(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => i.to_string(),
            (None, Some(f)) if f.fract() == 0.0 && f.abs() < 1e15 => {
                format!("{}", f as i64)
            }
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}

pub fn as_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
        }
        _ => None,
    }
}

pub fn as_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

// Stored records are read leniently: one odd field must not make the whole
// document unreadable. Values that do not coerce fall back to the default.

pub fn lenient_int<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(as_int(&value).unwrap_or_default())
}

pub fn lenient_float<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(as_float(&value).unwrap_or_default())
}

/// Any value as text, `null` as the empty string.
pub fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(String::new()),
        value => Ok(text_form(&value)),
    }
}

pub fn opt_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => Ok(Some(text_form(&value))),
    }
}

pub fn opt_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => as_int(&value).map(Some).ok_or_else(|| {
            serde::de::Error::custom(format!("expected integer, got {}", value))
        }),
    }
}

pub fn opt_float<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => as_float(&value).map(Some).ok_or_else(|| {
            serde::de::Error::custom(format!("expected number, got {}", value))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn truthiness_matches_presence_rules() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(false)));
        assert!(is_truthy(&json!("0")));
        assert!(is_truthy(&json!(2)));
    }

    #[test]
    fn text_form_drops_integral_fraction() {
        assert_eq!(text_form(&json!(5000.0)), "5000");
        assert_eq!(text_form(&json!(12.5)), "12.5");
        assert_eq!(text_form(&json!(10)), "10");
        assert_eq!(text_form(&json!("Mumbai")), "Mumbai");
        assert_eq!(text_form(&json!(true)), "true");
    }

    #[test]
    fn numeric_strings_coerce() {
        assert_eq!(as_int(&json!("2")), Some(2));
        assert_eq!(as_int(&json!(" 7 ")), Some(7));
        assert_eq!(as_int(&json!("3.9")), Some(3));
        assert_eq!(as_int(&json!("two")), None);
        assert_eq!(as_float(&json!("99.5")), Some(99.5));
        assert_eq!(as_float(&json!(10000)), Some(10000.0));
        assert_eq!(as_float(&json!("NaN")), None);
    }

    #[derive(serde::Deserialize)]
    struct Loose {
        #[serde(default, deserialize_with = "lenient_int")]
        age: i64,
        #[serde(default, deserialize_with = "text")]
        name: String,
        #[serde(default, deserialize_with = "opt_text")]
        breed: Option<String>,
    }

    #[test]
    fn lenient_fields_fall_back_to_defaults() {
        let loose: Loose =
            serde_json::from_value(json!({ "age": null, "name": 5 })).unwrap();
        assert_eq!(loose.age, 0);
        assert_eq!(loose.name, "5");
        assert_eq!(loose.breed, None);

        let loose: Loose =
            serde_json::from_value(json!({ "age": "old", "breed": null })).unwrap();
        assert_eq!(loose.age, 0);
        assert_eq!(loose.name, "");
        assert_eq!(loose.breed, None);
    }
}
