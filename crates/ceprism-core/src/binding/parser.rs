//! Body parsers keyed by (content encoding, media type).
//!
//! The table is two-level: the outer key is the event's
//! `datacontentencoding` (or none), the inner key the media type of the
//! request. A missing entry is a configuration error, not a client error.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::Value;

use crate::error::{CeError, Result};
use crate::event::Data;
use crate::spec::ContentEncoding;

use super::{Payload, MIME_CE_JSON, MIME_JSON, MIME_OCTET_STREAM};

/// Turns a request body into event data.
pub type BodyParser = fn(&Payload) -> Result<Data>;

static PLAIN: [(&str, BodyParser); 2] = [(MIME_JSON, parse_json), (MIME_OCTET_STREAM, passthrough)];

static BASE64: [(&str, BodyParser); 2] = [
    (MIME_JSON, parse_base64_json),
    (MIME_OCTET_STREAM, passthrough),
];

fn table(encoding: Option<ContentEncoding>) -> &'static [(&'static str, BodyParser)] {
    match encoding {
        None => &PLAIN,
        Some(ContentEncoding::Base64) => &BASE64,
    }
}

/// Look up the parser for a binary-mode body.
pub fn body_parser(encoding: Option<ContentEncoding>, media_type: &str) -> Result<BodyParser> {
    table(encoding)
        .iter()
        .find(|(mt, _)| *mt == media_type)
        .map(|(_, p)| *p)
        .ok_or_else(|| {
            CeError::Internal(format!(
                "no body parser registered for encoding={} content-type={media_type}",
                encoding.map(ContentEncoding::as_str).unwrap_or("none")
            ))
        })
}

/// Parse a whole structured-mode document.
pub fn parse_document(media_type: &str, payload: &Payload) -> Result<Value> {
    if media_type != MIME_CE_JSON {
        return Err(CeError::Internal(format!(
            "no document parser registered for content-type={media_type}"
        )));
    }
    let doc = json_value(payload)?;
    if !doc.is_object() {
        return Err(CeError::validation(
            "invalid payload: structured event must be a JSON object",
        ));
    }
    Ok(doc)
}

fn json_value(payload: &Payload) -> Result<Value> {
    let parsed = match payload {
        Payload::Json(v) => return Ok(v.clone()),
        Payload::Text(s) => serde_json::from_str(s),
        Payload::Binary(b) => serde_json::from_slice(b),
    };
    parsed.map_err(|e| CeError::validation_with("invalid json payload", vec![e.to_string()]))
}

fn parse_json(payload: &Payload) -> Result<Data> {
    json_value(payload).map(Data::Json)
}

fn passthrough(payload: &Payload) -> Result<Data> {
    Ok(match payload {
        Payload::Json(v) => Data::Json(v.clone()),
        Payload::Text(s) => Data::String(s.clone()),
        Payload::Binary(b) => Data::Binary(b.clone()),
    })
}

fn parse_base64_json(payload: &Payload) -> Result<Data> {
    let decoded = match payload {
        Payload::Json(v) => return Ok(Data::Json(v.clone())),
        Payload::Text(s) => STANDARD.decode(s.trim()),
        Payload::Binary(b) => STANDARD.decode(b.trim_ascii()),
    }
    .map_err(|e| CeError::validation_with("invalid base64 payload", vec![e.to_string()]))?;

    serde_json::from_slice(&decoded)
        .map(Data::Json)
        .map_err(|e| CeError::validation_with("invalid json payload", vec![e.to_string()]))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn base64_json_matches_plain_json() {
        let plain = body_parser(None, MIME_JSON).unwrap();
        let b64 = body_parser(Some(ContentEncoding::Base64), MIME_JSON).unwrap();

        let direct = plain(&Payload::from(r#"{"much":"wow"}"#)).unwrap();
        let encoded = b64(&Payload::from("eyJtdWNoIjoid293In0=")).unwrap();
        assert_eq!(direct, encoded);
        assert_eq!(direct, Data::Json(json!({"much": "wow"})));
    }

    #[test]
    fn octet_stream_is_identity() {
        let p = body_parser(None, MIME_OCTET_STREAM).unwrap();
        assert_eq!(p(&Payload::from("raw")).unwrap(), Data::String("raw".into()));
    }

    #[test]
    fn unknown_media_type_is_a_configuration_error() {
        let err = body_parser(None, "text/html").unwrap_err();
        assert_eq!(err.client_code().as_str(), "INTERNAL");
    }

    #[test]
    fn invalid_json_is_a_validation_error() {
        let p = body_parser(None, MIME_JSON).unwrap();
        let err = p(&Payload::from("{nope")).unwrap_err();
        assert_eq!(err.to_string(), "invalid json payload");
    }
}
