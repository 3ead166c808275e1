//! Structured-mode binding: the whole event as one JSON document.

use std::collections::BTreeSet;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use serde_json::Value;

use crate::error::{CeError, Result};
use crate::event::{Data, Event, ExtensionValue};
use crate::spec::{BindingSchema, ExtensionLayout, SpecVersion};
use crate::validation;

use super::parser::parse_document;
use super::{
    check_payload, media_type, normalize_headers, Binding, Headers, Message, Mode, Payload,
    CE_JSON_CONTENT_TYPE, CONTENT_TYPE, STRUCTURED_CONTENT_TYPES,
};

/// Structured-mode receiver/emitter bound to one spec version.
#[derive(Debug, Clone, Copy)]
pub struct StructuredBinding {
    schema: &'static BindingSchema,
    allowed_content_types: &'static [&'static str],
}

impl StructuredBinding {
    pub fn new(version: SpecVersion) -> Self {
        Self {
            schema: version.schema(),
            allowed_content_types: &STRUCTURED_CONTENT_TYPES,
        }
    }

    fn check_normalized(&self, payload: &Payload, headers: &Headers) -> Result<()> {
        check_payload(payload)?;

        let ct = headers.get(CONTENT_TYPE).map(String::as_str).unwrap_or_default();
        if !self.allowed_content_types.contains(&media_type(ct).as_str()) {
            return Err(CeError::validation_with(
                "invalid content type",
                vec![format!(
                    "'{ct}' is not one of: {}",
                    self.allowed_content_types.join(", ")
                )],
            ));
        }
        Ok(())
    }

    fn apply_data(&self, event: &mut Event, doc: &serde_json::Map<String, Value>) -> Result<()> {
        if let Some(field) = self.schema.data_base64_field {
            if let Some(v) = doc.get(field) {
                let s = v.as_str().ok_or_else(|| {
                    CeError::validation(format!("invalid payload: {field} must be a string"))
                })?;
                let bytes = STANDARD.decode(s).map_err(|e| {
                    CeError::validation_with("invalid payload", vec![format!("{field}: {e}")])
                })?;
                event.set_data(Bytes::from(bytes));
                return Ok(());
            }
        }
        if let Some(v) = doc.get("data") {
            event.set_data(Data::from_json_value(v.clone()));
        }
        Ok(())
    }
}

impl Binding for StructuredBinding {
    fn mode(&self) -> Mode {
        Mode::Structured
    }

    fn version(&self) -> SpecVersion {
        self.schema.version
    }

    fn check(&self, payload: &Payload, headers: &Headers) -> Result<()> {
        self.check_normalized(payload, &normalize_headers(headers))
    }

    fn parse(&self, payload: &Payload, headers: &Headers) -> Result<Event> {
        let headers = normalize_headers(headers);
        self.check_normalized(payload, &headers)?;

        let ct = headers.get(CONTENT_TYPE).map(String::as_str).unwrap_or_default();
        let doc = parse_document(&media_type(ct), payload)?;
        validation::validate_document(self.schema.version, &doc)?;

        let Value::Object(map) = doc else {
            return Err(CeError::validation("invalid payload: expected a JSON object"));
        };

        let declared = map
            .get(self.schema.version_field)
            .and_then(Value::as_str)
            .unwrap_or_default();
        if declared != self.schema.version.as_str() {
            return Err(CeError::validation_with(
                "invalid spec version",
                vec![format!("expected {}, got '{declared}'", self.schema.version)],
            ));
        }

        let mut event = Event::empty(self.schema.version);
        let mut processed: BTreeSet<&str> = BTreeSet::new();

        for rule in self.schema.rules {
            let Some(v) = map.get(rule.field) else {
                continue;
            };
            let raw = v.as_str().ok_or_else(|| {
                CeError::validation(format!("invalid payload: {} must be a string", rule.field))
            })?;
            event.set_attribute(rule.attr, (rule.parse)(raw)?)?;
            processed.insert(rule.field);
        }

        self.apply_data(&mut event, &map)?;
        processed.insert("data");
        if let Some(field) = self.schema.data_base64_field {
            processed.insert(field);
        }

        match self.schema.extension_layout {
            ExtensionLayout::TopLevel => {
                for (name, value) in &map {
                    if processed.contains(name.as_str()) {
                        continue;
                    }
                    tracing::debug!(extension = %name, "structured extension field");
                    event.add_extension(name.clone(), ExtensionValue::from_json(value.clone()))?;
                }
            }
            ExtensionLayout::Nested(field) => {
                if let Some(Value::Object(exts)) = map.get(field) {
                    for (name, value) in exts {
                        event.add_extension(name.clone(), ExtensionValue::from_json(value.clone()))?;
                    }
                }
            }
        }

        event.check()?;
        Ok(event)
    }

    fn serialize(&self, event: &Event) -> Result<Message> {
        if event.spec_version() != self.schema.version {
            return Err(CeError::validation_with(
                "invalid spec version",
                vec![format!(
                    "binding is {}, event is {}",
                    self.schema.version,
                    event.spec_version()
                )],
            ));
        }
        let body = event.to_json()?;
        let mut headers = Headers::new();
        headers.insert(CONTENT_TYPE.to_string(), CE_JSON_CONTENT_TYPE.to_string());
        Ok(Message {
            headers,
            body: Bytes::from(body),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ce_headers() -> Headers {
        let mut h = Headers::new();
        h.insert("Content-Type".into(), "application/cloudevents+json; charset=utf-8".into());
        h
    }

    #[test]
    fn plain_json_content_type_is_rejected() {
        let mut h = Headers::new();
        h.insert("content-type".into(), "application/json".into());
        let err = StructuredBinding::new(SpecVersion::V10)
            .check(&Payload::Json(json!({})), &h)
            .unwrap_err();
        assert_eq!(err.to_string(), "invalid content type");
    }

    #[test]
    fn data_base64_becomes_binary() {
        let doc = json!({
            "specversion": "1.0", "id": "1", "type": "t", "source": "/s",
            "data_base64": "AQID"
        });
        let ev = StructuredBinding::new(SpecVersion::V10)
            .parse(&Payload::Json(doc), &ce_headers())
            .unwrap();
        assert_eq!(ev.raw_data(), Some(&Data::Binary(Bytes::from_static(&[1, 2, 3]))));
        assert!(ev.extensions().is_empty());
    }

    #[test]
    fn unmapped_fields_become_extensions() {
        let doc = json!({
            "specversion": "0.3", "id": "1", "type": "t", "source": "/s",
            "tenant": "acme", "nested": {"a": 1}
        });
        let ev = StructuredBinding::new(SpecVersion::V03)
            .parse(&Payload::Json(doc), &ce_headers())
            .unwrap();
        assert_eq!(ev.extension("tenant"), Some(&ExtensionValue::String("acme".into())));
        assert_eq!(ev.extension("nested"), Some(&ExtensionValue::Json(json!({"a": 1}))));
    }

    #[test]
    fn v01_reads_nested_extensions() {
        let doc = json!({
            "cloudEventsVersion": "0.1", "eventID": "1", "eventType": "t",
            "source": "/s", "extensions": {"tenant": "acme"}
        });
        let ev = StructuredBinding::new(SpecVersion::V01)
            .parse(&Payload::Json(doc), &ce_headers())
            .unwrap();
        assert_eq!(ev.ty(), "t");
        assert_eq!(ev.extension("tenant").and_then(ExtensionValue::as_str), Some("acme"));
    }

    #[test]
    fn serialize_sets_structured_content_type() {
        let mut ev = Event::new(SpecVersion::V10);
        ev.set_source("/s").set_type("t").set_data(json!({"k": "v"}));
        let msg = StructuredBinding::new(SpecVersion::V10).serialize(&ev).unwrap();
        assert_eq!(msg.headers.get("content-type").map(String::as_str), Some(CE_JSON_CONTENT_TYPE));
        let body: Value = serde_json::from_slice(&msg.body).unwrap();
        assert_eq!(body["data"], json!({"k": "v"}));
    }
}
