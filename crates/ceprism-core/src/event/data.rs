//! Event payload and extension value types.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::{CeError, Result};
use crate::spec::format_time;

/// Opaque event payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Data {
    /// Structured JSON (object, array or scalar).
    Json(Value),
    /// Text as received or set by the producer.
    String(String),
    /// Raw bytes.
    Binary(Bytes),
}

impl Data {
    /// Structured-mode `data` member: JSON values stay JSON, strings stay strings.
    pub fn from_json_value(v: Value) -> Self {
        match v {
            Value::String(s) => Data::String(s),
            other => Data::Json(other),
        }
    }

    /// Bytes written as an HTTP body.
    pub fn to_body(&self) -> Result<Bytes> {
        match self {
            Data::Json(v) => serde_json::to_vec(v)
                .map(Bytes::from)
                .map_err(|e| CeError::Internal(format!("serialize data failed: {e}"))),
            Data::String(s) => Ok(Bytes::copy_from_slice(s.as_bytes())),
            Data::Binary(b) => Ok(b.clone()),
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Data::Json(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Data::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Data::Binary(b) => Some(b),
            _ => None,
        }
    }
}

impl From<Value> for Data {
    fn from(v: Value) -> Self {
        Data::Json(v)
    }
}

impl From<String> for Data {
    fn from(s: String) -> Self {
        Data::String(s)
    }
}

impl From<&str> for Data {
    fn from(s: &str) -> Self {
        Data::String(s.to_string())
    }
}

impl From<Bytes> for Data {
    fn from(b: Bytes) -> Self {
        Data::Binary(b)
    }
}

impl From<Vec<u8>> for Data {
    fn from(b: Vec<u8>) -> Self {
        Data::Binary(Bytes::from(b))
    }
}

/// Whether a MIME type denotes JSON (`application/json`, `text/json`, `*+json`).
pub fn is_json_media_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json" || essence == "text/json" || essence.ends_with("+json")
}

/// Extension attribute value.
///
/// 1.0 restricts extensions to the first five variants; `Json` is only
/// accepted on 0.1 - 0.3 events.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtensionValue {
    Bool(bool),
    Integer(i64),
    String(String),
    Time(DateTime<Utc>),
    Binary(Bytes),
    Json(Value),
}

impl ExtensionValue {
    /// Map a JSON member onto the narrowest matching variant.
    pub fn from_json(v: Value) -> Self {
        match v {
            Value::Bool(b) => ExtensionValue::Bool(b),
            Value::String(s) => ExtensionValue::String(s),
            Value::Number(n) => match n.as_i64() {
                Some(i) => ExtensionValue::Integer(i),
                None => ExtensionValue::Json(Value::Number(n)),
            },
            other => ExtensionValue::Json(other),
        }
    }

    /// True for the types allowed on 1.0 events.
    pub fn is_restricted_type(&self) -> bool {
        !matches!(self, ExtensionValue::Json(_))
    }

    /// Header value form.
    pub fn to_wire_string(&self) -> String {
        match self {
            ExtensionValue::Bool(b) => b.to_string(),
            ExtensionValue::Integer(i) => i.to_string(),
            ExtensionValue::String(s) => s.clone(),
            ExtensionValue::Time(t) => format_time(t),
            ExtensionValue::Binary(b) => STANDARD.encode(b),
            ExtensionValue::Json(Value::String(s)) => s.clone(),
            ExtensionValue::Json(v) => v.to_string(),
        }
    }

    /// Structured-mode member form.
    pub fn to_json(&self) -> Value {
        match self {
            ExtensionValue::Bool(b) => Value::Bool(*b),
            ExtensionValue::Integer(i) => Value::from(*i),
            ExtensionValue::String(s) => Value::String(s.clone()),
            ExtensionValue::Time(t) => Value::String(format_time(t)),
            ExtensionValue::Binary(b) => Value::String(STANDARD.encode(b)),
            ExtensionValue::Json(v) => v.clone(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ExtensionValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<bool> for ExtensionValue {
    fn from(b: bool) -> Self {
        ExtensionValue::Bool(b)
    }
}

impl From<i64> for ExtensionValue {
    fn from(i: i64) -> Self {
        ExtensionValue::Integer(i)
    }
}

impl From<i32> for ExtensionValue {
    fn from(i: i32) -> Self {
        ExtensionValue::Integer(i64::from(i))
    }
}

impl From<String> for ExtensionValue {
    fn from(s: String) -> Self {
        ExtensionValue::String(s)
    }
}

impl From<&str> for ExtensionValue {
    fn from(s: &str) -> Self {
        ExtensionValue::String(s.to_string())
    }
}

impl From<DateTime<Utc>> for ExtensionValue {
    fn from(t: DateTime<Utc>) -> Self {
        ExtensionValue::Time(t)
    }
}

impl From<Bytes> for ExtensionValue {
    fn from(b: Bytes) -> Self {
        ExtensionValue::Binary(b)
    }
}

impl From<Value> for ExtensionValue {
    fn from(v: Value) -> Self {
        ExtensionValue::from_json(v)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_media_types() {
        assert!(is_json_media_type("application/json"));
        assert!(is_json_media_type("Application/JSON; charset=utf-8"));
        assert!(is_json_media_type("application/cloudevents+json"));
        assert!(!is_json_media_type("application/octet-stream"));
        assert!(!is_json_media_type("text/plain"));
    }

    #[test]
    fn extension_from_json_narrows() {
        assert_eq!(ExtensionValue::from_json(json!(true)), ExtensionValue::Bool(true));
        assert_eq!(ExtensionValue::from_json(json!(7)), ExtensionValue::Integer(7));
        assert!(!ExtensionValue::from_json(json!(1.5)).is_restricted_type());
        assert!(!ExtensionValue::from_json(json!({"a": 1})).is_restricted_type());
    }

    #[test]
    fn extension_wire_strings() {
        assert_eq!(ExtensionValue::Bool(false).to_wire_string(), "false");
        assert_eq!(ExtensionValue::Integer(-3).to_wire_string(), "-3");
        assert_eq!(
            ExtensionValue::Binary(Bytes::from_static(b"hi")).to_wire_string(),
            "aGk="
        );
        assert_eq!(ExtensionValue::Json(json!({"a": 1})).to_wire_string(), r#"{"a":1}"#);
    }
}
