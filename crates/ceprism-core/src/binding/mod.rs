//! HTTP protocol bindings (binary + structured) and the receive dispatcher.
//!
//! Bindings are synchronous and stateless: every call works on a private,
//! lower-cased copy of the caller's headers and borrows the immutable
//! version tables from [`crate::spec::registry`]. The async HTTP edge lives
//! in the gateway crate.

pub mod binary;
pub mod dispatcher;
pub mod parser;
pub mod structured;

use std::collections::BTreeMap;
use std::fmt;

use bytes::Bytes;
use serde_json::Value;

use crate::error::{CeError, Result};
use crate::event::Event;
use crate::spec::SpecVersion;

pub use binary::BinaryBinding;
pub use dispatcher::Dispatcher;
pub use structured::StructuredBinding;

/// Header map as seen by the bindings. Values are always strings.
pub type Headers = BTreeMap<String, String>;

pub const CONTENT_TYPE: &str = "content-type";

pub const MIME_JSON: &str = "application/json";
pub const MIME_OCTET_STREAM: &str = "application/octet-stream";
pub const MIME_CE_PREFIX: &str = "application/cloudevents";
pub const MIME_CE_JSON: &str = "application/cloudevents+json";
/// Content-type written by structured-mode emitters.
pub const CE_JSON_CONTENT_TYPE: &str = "application/cloudevents+json; charset=utf-8";

/// Content types a binary-mode receiver accepts.
pub const BINARY_CONTENT_TYPES: [&str; 2] = [MIME_JSON, MIME_OCTET_STREAM];
/// Content types a structured-mode receiver accepts.
pub const STRUCTURED_CONTENT_TYPES: [&str; 1] = [MIME_CE_JSON];

/// Wire encoding of an event over HTTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Binary,
    Structured,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Binary => "binary",
            Mode::Structured => "structured",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request body handed to a receiver.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Already-parsed JSON (object or array are valid bodies).
    Json(Value),
    Text(String),
    Binary(Bytes),
}

impl Payload {
    /// UTF-8 bodies become `Text`, anything else stays `Binary`.
    pub fn from_bytes(body: Bytes) -> Self {
        match std::str::from_utf8(&body) {
            Ok(s) => Payload::Text(s.to_string()),
            Err(_) => Payload::Binary(body),
        }
    }

    pub fn as_bytes(&self) -> Result<Bytes> {
        match self {
            Payload::Json(v) => serde_json::to_vec(v)
                .map(Bytes::from)
                .map_err(|e| CeError::Internal(format!("serialize payload failed: {e}"))),
            Payload::Text(s) => Ok(Bytes::copy_from_slice(s.as_bytes())),
            Payload::Binary(b) => Ok(b.clone()),
        }
    }
}

impl From<Value> for Payload {
    fn from(v: Value) -> Self {
        Payload::Json(v)
    }
}

impl From<&str> for Payload {
    fn from(s: &str) -> Self {
        Payload::Text(s.to_string())
    }
}

impl From<String> for Payload {
    fn from(s: String) -> Self {
        Payload::Text(s)
    }
}

impl From<Bytes> for Payload {
    fn from(b: Bytes) -> Self {
        Payload::Binary(b)
    }
}

/// Serialized event ready for the HTTP collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub headers: Headers,
    pub body: Bytes,
}

/// One binding (mode x version): receive-side check/parse and emit-side
/// serialization.
pub trait Binding: Send + Sync {
    fn mode(&self) -> Mode;
    fn version(&self) -> SpecVersion;
    /// Validate the request shape without building an event.
    fn check(&self, payload: &Payload, headers: &Headers) -> Result<()>;
    /// Check, then build and validate an event. Never returns a partial event.
    fn parse(&self, payload: &Payload, headers: &Headers) -> Result<Event>;
    /// Validate the event and render headers + body.
    fn serialize(&self, event: &Event) -> Result<Message>;
}

/// Serialize `event` in `mode` using the binding of its own spec version.
pub fn serialize(mode: Mode, event: &Event) -> Result<Message> {
    match mode {
        Mode::Binary => BinaryBinding::new(event.spec_version()).serialize(event),
        Mode::Structured => StructuredBinding::new(event.spec_version()).serialize(event),
    }
}

/// Private copy of `headers` with lower-cased names and trimmed values.
pub fn normalize_headers(headers: &Headers) -> Headers {
    headers
        .iter()
        .map(|(k, v)| (k.to_ascii_lowercase(), v.trim().to_string()))
        .collect()
}

/// Media type essence: parameters dropped, lower-cased.
pub fn media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Argument checks shared by every receiver.
pub(crate) fn check_payload(payload: &Payload) -> Result<()> {
    match payload {
        Payload::Json(Value::Null) => Err(CeError::Argument("payload is null or undefined".into())),
        Payload::Json(Value::Object(_) | Value::Array(_)) => Ok(()),
        Payload::Json(_) => Err(CeError::Argument(
            "payload must be an object or a string".into(),
        )),
        Payload::Text(_) | Payload::Binary(_) => Ok(()),
    }
}
