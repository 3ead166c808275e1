//! Conversions between axum's HTTP types and the core binding types.
//!
//! - `HeaderMap` => `Headers` (names lower-cased by `http`, values must be UTF-8)
//! - body `Bytes` => `Payload` (UTF-8 text stays text)
//! - `Message` => `Response`

use axum::{
    body::Body,
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::Response,
};
use bytes::Bytes;

use ceprism_core::error::{CeError, Result};
use ceprism_core::{Headers, Message, Payload};

/// Repeated header names are joined with `", "`. Non UTF-8 values are
/// dropped; no CloudEvents attribute can carry them.
pub fn headers_from(map: &HeaderMap) -> Headers {
    let mut out = Headers::new();
    for (name, value) in map {
        let Ok(v) = value.to_str() else {
            tracing::debug!(header = %name, "dropping non utf-8 header value");
            continue;
        };
        out.entry(name.as_str().to_string())
            .and_modify(|existing: &mut String| {
                existing.push_str(", ");
                existing.push_str(v);
            })
            .or_insert_with(|| v.to_string());
    }
    out
}

pub fn payload_from(body: Bytes) -> Payload {
    Payload::from_bytes(body)
}

pub fn message_response(status: StatusCode, msg: Message) -> Result<Response> {
    let mut res = Response::new(Body::from(msg.body));
    *res.status_mut() = status;
    for (k, v) in msg.headers {
        let name = HeaderName::from_bytes(k.as_bytes())
            .map_err(|e| CeError::Internal(format!("invalid header name {k}: {e}")))?;
        let value = HeaderValue::from_str(&v)
            .map_err(|e| CeError::Internal(format!("invalid header value for {k}: {e}")))?;
        res.headers_mut().insert(name, value);
    }
    Ok(res)
}
