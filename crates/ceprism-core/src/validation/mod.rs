//! Event validation.
//!
//! Two stages:
//! 1. Structural: the formatted document against the version's JSON Schema.
//!    Failures carry every validator message.
//! 2. Semantic (only after the schema passed): version-specific rules, today
//!    0.3's content-encoding legality and base64 well-formedness.
//!
//! Compiled validators are built once per version and shared read-only.

mod schemas;

use std::sync::OnceLock;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use jsonschema::{Draft, Validator};
use serde_json::Value;

use crate::error::{CeError, Result};
use crate::event::{Data, Event};
use crate::spec::{ContentEncoding, SpecVersion};

type Compiled = std::result::Result<Validator, String>;

static VALIDATORS: [OnceLock<Compiled>; 4] = [
    OnceLock::new(),
    OnceLock::new(),
    OnceLock::new(),
    OnceLock::new(),
];

fn slot(version: SpecVersion) -> usize {
    match version {
        SpecVersion::V01 => 0,
        SpecVersion::V02 => 1,
        SpecVersion::V03 => 2,
        SpecVersion::V10 => 3,
    }
}

fn compile(version: SpecVersion) -> Compiled {
    let schema: Value = serde_json::from_str(schemas::schema_text(version))
        .map_err(|e| format!("schema {version} is not valid json: {e}"))?;
    jsonschema::options()
        .with_draft(Draft::Draft7)
        .should_validate_formats(true)
        .build(&schema)
        .map_err(|e| format!("schema {version} failed to compile: {e}"))
}

fn validator(version: SpecVersion) -> Result<&'static Validator> {
    match VALIDATORS[slot(version)].get_or_init(|| compile(version)) {
        Ok(v) => Ok(v),
        Err(msg) => Err(CeError::Internal(msg.clone())),
    }
}

/// Structural check of a candidate attribute document.
pub fn validate_document(version: SpecVersion, doc: &Value) -> Result<()> {
    let errors: Vec<String> = validator(version)?
        .iter_errors(doc)
        .map(|e| e.to_string())
        .collect();
    if errors.is_empty() {
        Ok(())
    } else {
        tracing::debug!(%version, count = errors.len(), "schema validation failed");
        Err(CeError::validation_with("invalid payload", errors))
    }
}

/// Full check of an event: schema, then semantic rules.
pub fn check(event: &Event) -> Result<()> {
    check_document(event, &event.document())
}

pub(crate) fn check_document(event: &Event, doc: &Value) -> Result<()> {
    validate_document(event.spec_version(), doc)?;
    check_semantics(event, doc)
}

fn check_semantics(event: &Event, doc: &Value) -> Result<()> {
    if event.spec_version() != SpecVersion::V03 {
        return Ok(());
    }

    let Some(raw) = doc.get("datacontentencoding").and_then(Value::as_str) else {
        return Ok(());
    };
    if !ContentEncoding::SUPPORTED
        .iter()
        .any(|s| s.eq_ignore_ascii_case(raw))
    {
        return Err(CeError::validation_with(
            "unsupported datacontentencoding",
            vec![format!(
                "{raw} is not one of: {}",
                ContentEncoding::SUPPORTED.join(", ")
            )],
        ));
    }

    if let Some(Data::String(s)) = event.raw_data() {
        let round_trips = matches!(STANDARD.decode(s), Ok(bytes) if STANDARD.encode(&bytes) == *s);
        if !round_trips {
            return Err(CeError::validation_with(
                "invalid content encoding of data",
                vec![format!("datacontentencoding is {raw} but data does not round-trip")],
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::ClientCode;
    use serde_json::json;

    #[test]
    fn every_schema_compiles() {
        for v in SpecVersion::ALL {
            assert!(validator(v).is_ok(), "{v}");
        }
    }

    #[test]
    fn missing_required_fields_are_listed() {
        let err = validate_document(SpecVersion::V10, &json!({"specversion": "1.0"})).unwrap_err();
        assert_eq!(err.client_code(), ClientCode::ValidationFailed);
        assert!(err.details().len() >= 3);
    }

    #[test]
    fn bad_time_format_fails() {
        let doc = json!({
            "specversion": "1.0", "id": "1", "type": "t", "source": "/s",
            "time": "yesterday"
        });
        assert!(validate_document(SpecVersion::V10, &doc).is_err());
    }

    #[test]
    fn empty_type_fails() {
        let doc = json!({"specversion": "1.0", "id": "1", "type": "", "source": "/s"});
        assert!(validate_document(SpecVersion::V10, &doc).is_err());
    }

    #[test]
    fn base64_data_must_round_trip() {
        let mut ev = Event::new(SpecVersion::V03);
        ev.set_source("/s")
            .set_type("t")
            .set_data_content_encoding(ContentEncoding::Base64)
            .unwrap();

        ev.set_data("eyJhIjoxfQ==");
        assert!(check(&ev).is_ok());

        ev.set_data("not base64!");
        let err = check(&ev).unwrap_err();
        assert_eq!(err.to_string(), "invalid content encoding of data");
    }
}
