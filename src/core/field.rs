//! Typed key-value fields attached to log records

use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Value type for structured logging fields
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    String(String),
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
    /// Encoded as floating-point milliseconds
    Duration(Duration),
    /// Display text of an error
    Error(String),
    /// Anything else that serializes to JSON
    Json(serde_json::Value),
    Null,
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s) => write!(f, "{}", s),
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::Uint(u) => write!(f, "{}", u),
            FieldValue::Float(fl) => write!(f, "{}", fl),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Duration(d) => write!(f, "{}ms", duration_millis(d)),
            FieldValue::Error(e) => write!(f, "{}", e),
            FieldValue::Json(v) => write!(f, "{}", v),
            FieldValue::Null => write!(f, "null"),
        }
    }
}

fn duration_millis(d: &Duration) -> f64 {
    d.as_nanos() as f64 / 1e6
}

impl FieldValue {
    /// Convert to serde_json::Value for encoding
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        match self {
            FieldValue::String(s) => serde_json::Value::String(s.clone()),
            FieldValue::Int(i) => serde_json::Value::Number((*i).into()),
            FieldValue::Uint(u) => serde_json::Value::Number((*u).into()),
            FieldValue::Float(f) => float_value(*f),
            FieldValue::Bool(b) => serde_json::Value::Bool(*b),
            FieldValue::Duration(d) => float_value(duration_millis(d)),
            FieldValue::Error(e) => serde_json::Value::String(e.clone()),
            FieldValue::Json(v) => v.clone(),
            FieldValue::Null => serde_json::Value::Null,
        }
    }

    /// True when the value is a plain string, the only kind usable as a key
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }
}

fn float_value(f: f64) -> serde_json::Value {
    serde_json::Number::from_f64(f)
        .map(serde_json::Value::Number)
        .unwrap_or_else(|| serde_json::Value::String(f.to_string()))
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Int(i)
    }
}

impl From<i32> for FieldValue {
    fn from(i: i32) -> Self {
        FieldValue::Int(i64::from(i))
    }
}

impl From<u64> for FieldValue {
    fn from(u: u64) -> Self {
        FieldValue::Uint(u)
    }
}

impl From<u32> for FieldValue {
    fn from(u: u32) -> Self {
        FieldValue::Uint(u64::from(u))
    }
}

impl From<u16> for FieldValue {
    fn from(u: u16) -> Self {
        FieldValue::Uint(u64::from(u))
    }
}

impl From<usize> for FieldValue {
    fn from(u: usize) -> Self {
        FieldValue::Uint(u as u64)
    }
}

impl From<f64> for FieldValue {
    fn from(f: f64) -> Self {
        FieldValue::Float(f)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<Duration> for FieldValue {
    fn from(d: Duration) -> Self {
        FieldValue::Duration(d)
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::String(s) => FieldValue::String(s),
            serde_json::Value::Bool(b) => FieldValue::Bool(b),
            serde_json::Value::Null => FieldValue::Null,
            other => FieldValue::Json(other),
        }
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

/// A single structured key-value pair
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub key: String,
    pub value: FieldValue,
}

impl Field {
    pub fn new(key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn string(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(key, FieldValue::String(value.into()))
    }

    pub fn int(key: impl Into<String>, value: i64) -> Self {
        Self::new(key, FieldValue::Int(value))
    }

    pub fn uint(key: impl Into<String>, value: u64) -> Self {
        Self::new(key, FieldValue::Uint(value))
    }

    pub fn float(key: impl Into<String>, value: f64) -> Self {
        Self::new(key, FieldValue::Float(value))
    }

    pub fn bool(key: impl Into<String>, value: bool) -> Self {
        Self::new(key, FieldValue::Bool(value))
    }

    pub fn duration(key: impl Into<String>, value: Duration) -> Self {
        Self::new(key, FieldValue::Duration(value))
    }

    /// Attach an error under the conventional `error` key
    pub fn error(err: &dyn std::error::Error) -> Self {
        Self::named_error("error", err)
    }

    pub fn named_error(key: impl Into<String>, err: &dyn std::error::Error) -> Self {
        Self::new(key, FieldValue::Error(err.to_string()))
    }

    /// Serialize any value; a value that fails to serialize is recorded
    /// under `<key>Error` instead
    pub fn any<T: Serialize + ?Sized>(key: impl Into<String>, value: &T) -> Self {
        let key = key.into();
        match serde_json::to_value(value) {
            Ok(v) => Self::new(key, v),
            Err(e) => Self::new(format!("{}Error", key), FieldValue::Error(e.to_string())),
        }
    }
}

impl<K: Into<String>, V: Into<FieldValue>> From<(K, V)> for Field {
    fn from((key, value): (K, V)) -> Self {
        Field::new(key, value)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_field_constructors() {
        assert_eq!(Field::int("port", 8080).value, FieldValue::Int(8080));
        assert_eq!(Field::bool("ok", true).value, FieldValue::Bool(true));
        assert_eq!(
            Field::string("user", "alice").value,
            FieldValue::String("alice".into())
        );
    }

    #[test]
    fn test_duration_encodes_as_millis() {
        let field = Field::duration("elapsed", Duration::from_micros(1500));
        assert_eq!(field.value.to_json_value(), serde_json::json!(1.5));
    }

    #[test]
    fn test_error_field() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let field = Field::error(&io_err);
        assert_eq!(field.key, "error");
        assert_eq!(field.to_string(), "error=no such file");
    }

    #[test]
    fn test_any_serializes_structs() {
        let mut map = BTreeMap::new();
        map.insert("a", 1);
        let field = Field::any("map", &map);
        assert_eq!(field.value.to_json_value(), serde_json::json!({"a": 1}));
    }

    #[test]
    fn test_non_finite_float_is_stringified() {
        let value = FieldValue::Float(f64::NAN).to_json_value();
        assert_eq!(value, serde_json::json!("NaN"));
    }
}
