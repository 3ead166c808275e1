//! The versioned CloudEvent envelope.
//!
//! A single [`Event`] type covers every spec version. Which attributes an
//! event may carry is decided by its version's binding table: asking a 1.0
//! event for `schemaURL` (or a 0.3 event for `dataSchema`) is an
//! [`CeError::Attribute`], never a silent `None`.
//!
//! Validation is not continuous. Setters accept anything of the right
//! shape; [`Event::check`] and [`Event::format`] are the validation points.

pub mod builder;
pub mod data;

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::error::{CeError, Result};
use crate::spec::{
    parse_time, Attribute, AttributeValue, BindingSchema, ContentEncoding, ExtensionLayout,
    SpecVersion,
};
use crate::validation;

pub use builder::EventBuilder;
pub use data::{is_json_media_type, Data, ExtensionValue};

/// In-memory representation of one CloudEvent.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    spec: SpecVersion,
    id: String,
    source: String,
    ty: String,
    time: Option<DateTime<Utc>>,
    data_content_type: Option<String>,
    // dataschema on 1.0, schemaurl on 0.1 - 0.3
    schema: Option<String>,
    data_content_encoding: Option<ContentEncoding>,
    subject: Option<String>,
    event_type_version: Option<String>,
    data: Option<Data>,
    extensions: BTreeMap<String, ExtensionValue>,
}

impl Event {
    /// New event with a generated id and the current time.
    pub fn new(spec: SpecVersion) -> Self {
        let mut ev = Self::empty(spec);
        ev.id = uuid::Uuid::new_v4().to_string();
        ev.time = Some(Utc::now());
        ev
    }

    /// Event with no attribute set; used by receivers so that only what was
    /// on the wire ends up in the envelope.
    pub(crate) fn empty(spec: SpecVersion) -> Self {
        Self {
            spec,
            id: String::new(),
            source: String::new(),
            ty: String::new(),
            time: None,
            data_content_type: None,
            schema: None,
            data_content_encoding: None,
            subject: None,
            event_type_version: None,
            data: None,
            extensions: BTreeMap::new(),
        }
    }

    pub fn builder(spec: SpecVersion) -> EventBuilder {
        EventBuilder::new(spec)
    }

    fn binding(&self) -> &'static BindingSchema {
        self.spec.schema()
    }

    fn gate(&self, attr: Attribute, verb: &str) -> Result<()> {
        if self.binding().supports(attr) {
            Ok(())
        } else {
            Err(CeError::Attribute(format!(
                "cannot {verb} {} on version {} event",
                attr.display_name(),
                self.spec
            )))
        }
    }

    // --------------------
    // Getters
    // --------------------
    pub fn spec_version(&self) -> SpecVersion {
        self.spec
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn ty(&self) -> &str {
        &self.ty
    }

    pub fn time(&self) -> Option<&DateTime<Utc>> {
        self.time.as_ref()
    }

    pub fn data_content_type(&self) -> Option<&str> {
        self.data_content_type.as_deref()
    }

    pub fn data_schema(&self) -> Result<Option<&str>> {
        self.gate(Attribute::DataSchema, "get")?;
        Ok(self.schema.as_deref())
    }

    pub fn schema_url(&self) -> Result<Option<&str>> {
        self.gate(Attribute::SchemaUrl, "get")?;
        Ok(self.schema.as_deref())
    }

    pub fn data_content_encoding(&self) -> Result<Option<ContentEncoding>> {
        self.gate(Attribute::DataContentEncoding, "get")?;
        Ok(self.data_content_encoding)
    }

    pub fn subject(&self) -> Result<Option<&str>> {
        self.gate(Attribute::Subject, "get")?;
        Ok(self.subject.as_deref())
    }

    pub fn event_type_version(&self) -> Result<Option<&str>> {
        self.gate(Attribute::EventTypeVersion, "get")?;
        Ok(self.event_type_version.as_deref())
    }

    /// Payload as stored, without coercion.
    pub fn raw_data(&self) -> Option<&Data> {
        self.data.as_ref()
    }

    /// Payload with content-type-aware coercion: a JSON-encoded string under
    /// a JSON content type is returned parsed.
    pub fn data(&self) -> Option<Data> {
        let data = self.data.as_ref()?;
        if let (Data::String(s), Some(ct)) = (data, self.data_content_type.as_deref()) {
            if is_json_media_type(ct) {
                if let Ok(v) = serde_json::from_str::<Value>(s) {
                    return Some(Data::Json(v));
                }
            }
        }
        Some(data.clone())
    }

    /// Extension lookup. Names are case-insensitive.
    pub fn extension(&self, name: &str) -> Option<&ExtensionValue> {
        self.extensions.get(&name.to_ascii_lowercase())
    }

    pub fn extensions(&self) -> &BTreeMap<String, ExtensionValue> {
        &self.extensions
    }

    /// Generic attribute getter. `None` when unset or not part of this version.
    pub fn attribute(&self, attr: Attribute) -> Option<AttributeValue> {
        if !self.binding().supports(attr) {
            return None;
        }
        let text = |s: &str| (!s.is_empty()).then(|| AttributeValue::Text(s.to_string()));
        match attr {
            Attribute::SpecVersion => Some(AttributeValue::Version(self.spec)),
            Attribute::Id => text(&self.id),
            Attribute::Source => text(&self.source),
            Attribute::Type => text(&self.ty),
            Attribute::Time => self.time.map(AttributeValue::Time),
            Attribute::DataContentType => self.data_content_type.as_deref().and_then(text),
            Attribute::DataSchema | Attribute::SchemaUrl => self.schema.as_deref().and_then(text),
            Attribute::DataContentEncoding => {
                self.data_content_encoding.map(AttributeValue::Encoding)
            }
            Attribute::Subject => self.subject.as_deref().and_then(text),
            Attribute::EventTypeVersion => self.event_type_version.as_deref().and_then(text),
        }
    }

    // --------------------
    // Setters
    // --------------------
    pub fn set_id(&mut self, id: impl Into<String>) -> &mut Self {
        self.id = id.into();
        self
    }

    pub fn set_source(&mut self, source: impl Into<String>) -> &mut Self {
        self.source = source.into();
        self
    }

    pub fn set_type(&mut self, ty: impl Into<String>) -> &mut Self {
        self.ty = ty.into();
        self
    }

    pub fn set_time(&mut self, time: DateTime<Utc>) -> &mut Self {
        self.time = Some(time);
        self
    }

    pub fn set_data_content_type(&mut self, ct: impl Into<String>) -> &mut Self {
        self.data_content_type = Some(ct.into());
        self
    }

    pub fn set_data_schema(&mut self, uri: impl Into<String>) -> Result<&mut Self> {
        self.gate(Attribute::DataSchema, "set")?;
        self.schema = Some(uri.into());
        Ok(self)
    }

    pub fn set_schema_url(&mut self, uri: impl Into<String>) -> Result<&mut Self> {
        self.gate(Attribute::SchemaUrl, "set")?;
        self.schema = Some(uri.into());
        Ok(self)
    }

    pub fn set_data_content_encoding(&mut self, enc: ContentEncoding) -> Result<&mut Self> {
        self.gate(Attribute::DataContentEncoding, "set")?;
        self.data_content_encoding = Some(enc);
        Ok(self)
    }

    pub fn set_subject(&mut self, subject: impl Into<String>) -> Result<&mut Self> {
        self.gate(Attribute::Subject, "set")?;
        self.subject = Some(subject.into());
        Ok(self)
    }

    pub fn set_event_type_version(&mut self, v: impl Into<String>) -> Result<&mut Self> {
        self.gate(Attribute::EventTypeVersion, "set")?;
        self.event_type_version = Some(v.into());
        Ok(self)
    }

    pub fn set_data(&mut self, data: impl Into<Data>) -> &mut Self {
        self.data = Some(data.into());
        self
    }

    pub fn clear_data(&mut self) -> &mut Self {
        self.data = None;
        self
    }

    /// Generic attribute setter used by the transcoders.
    pub fn set_attribute(&mut self, attr: Attribute, value: AttributeValue) -> Result<&mut Self> {
        self.gate(attr, "set")?;
        match (attr, value) {
            (Attribute::SpecVersion, AttributeValue::Version(v)) => {
                if v != self.spec {
                    return Err(CeError::Attribute(format!(
                        "cannot change specversion of a version {} event to {v}",
                        self.spec
                    )));
                }
            }
            (Attribute::Id, AttributeValue::Text(s)) => self.id = s,
            (Attribute::Source, AttributeValue::Text(s)) => self.source = s,
            (Attribute::Type, AttributeValue::Text(s)) => self.ty = s,
            (Attribute::Time, AttributeValue::Time(t)) => self.time = Some(t),
            (Attribute::Time, AttributeValue::Text(s)) => self.time = Some(parse_time(&s)?),
            (Attribute::DataContentType, AttributeValue::Text(s)) => {
                self.data_content_type = Some(s)
            }
            (Attribute::DataSchema | Attribute::SchemaUrl, AttributeValue::Text(s)) => {
                self.schema = Some(s)
            }
            (Attribute::DataContentEncoding, AttributeValue::Encoding(e)) => {
                self.data_content_encoding = Some(e)
            }
            (Attribute::DataContentEncoding, AttributeValue::Text(s)) => {
                self.data_content_encoding = Some(s.parse()?)
            }
            (Attribute::Subject, AttributeValue::Text(s)) => self.subject = Some(s),
            (Attribute::EventTypeVersion, AttributeValue::Text(s)) => {
                self.event_type_version = Some(s)
            }
            (attr, value) => {
                return Err(CeError::Attribute(format!(
                    "invalid value for {}: {value:?}",
                    attr.display_name()
                )))
            }
        }
        Ok(self)
    }

    /// Add an extension attribute. Fails on reserved names, and on 1.0 on
    /// names outside `[a-z0-9]` or values outside the 1.0 type system.
    ///
    /// Older versions accept any case but store the name lower-cased, since
    /// HTTP header names are case-insensitive and binary mode would fold
    /// them anyway.
    pub fn add_extension(
        &mut self,
        name: impl Into<String>,
        value: impl Into<ExtensionValue>,
    ) -> Result<&mut Self> {
        let mut name = name.into();
        let value = value.into();

        if name.is_empty() {
            return Err(CeError::Attribute("extension name must not be empty".into()));
        }
        if self.binding().is_reserved(&name) {
            return Err(CeError::Attribute(format!("reserved attribute name: {name}")));
        }
        if self.spec == SpecVersion::V10 {
            if !name
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
            {
                return Err(CeError::Attribute(format!(
                    "invalid extension name: {name} (lower-case letters and digits only)"
                )));
            }
            if !value.is_restricted_type() {
                return Err(CeError::Attribute(format!(
                    "invalid extension value type for {name}"
                )));
            }
        } else {
            name.make_ascii_lowercase();
        }

        self.extensions.insert(name, value);
        Ok(self)
    }

    pub fn remove_extension(&mut self, name: &str) -> Option<ExtensionValue> {
        self.extensions.remove(&name.to_ascii_lowercase())
    }

    // --------------------
    // Validation / serialization
    // --------------------

    /// Validate against the version's schema and semantic rules.
    pub fn check(&self) -> Result<()> {
        validation::check(self)
    }

    /// Validate, then return the structured JSON document.
    pub fn format(&self) -> Result<Value> {
        let doc = self.document();
        validation::check_document(self, &doc)?;
        Ok(doc)
    }

    /// `format()` rendered as a JSON string.
    pub fn to_json(&self) -> Result<String> {
        let doc = self.format()?;
        serde_json::to_string(&doc)
            .map_err(|e| CeError::Internal(format!("serialize event failed: {e}")))
    }

    /// Base64 form of binary data on versions that carry a `data_base64` field.
    pub fn data_base64(&self) -> Option<String> {
        self.binding().data_base64_field?;
        match &self.data {
            Some(Data::Binary(b)) => Some(STANDARD.encode(b)),
            _ => None,
        }
    }

    /// Structured document without validation.
    pub(crate) fn document(&self) -> Value {
        let binding = self.binding();
        let mut map = Map::new();

        for rule in binding.rules {
            if let Some(v) = self.attribute(rule.attr) {
                map.insert(rule.field.to_string(), Value::String(v.to_wire_string()));
            }
        }

        match self.data() {
            Some(Data::Json(v)) => {
                map.insert("data".into(), v);
            }
            Some(Data::String(s)) => {
                map.insert("data".into(), Value::String(s));
            }
            Some(Data::Binary(b)) => {
                let encoded = Value::String(STANDARD.encode(&b));
                let field = binding.data_base64_field.unwrap_or("data");
                map.insert(field.to_string(), encoded);
            }
            None => {}
        }

        match binding.extension_layout {
            ExtensionLayout::TopLevel => {
                for (k, v) in &self.extensions {
                    map.insert(k.clone(), v.to_json());
                }
            }
            ExtensionLayout::Nested(field) => {
                if !self.extensions.is_empty() {
                    let nested: Map<String, Value> = self
                        .extensions
                        .iter()
                        .map(|(k, v)| (k.clone(), v.to_json()))
                        .collect();
                    map.insert(field.to_string(), Value::Object(nested));
                }
            }
        }

        Value::Object(map)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_event_has_defaults() {
        let ev = Event::new(SpecVersion::V10);
        assert!(!ev.id().is_empty());
        assert!(ev.time().is_some());
        assert_eq!(ev.spec_version(), SpecVersion::V10);
    }

    #[test]
    fn schema_url_rejected_on_v10() {
        let mut ev = Event::new(SpecVersion::V10);
        let err = ev.set_schema_url("http://x").unwrap_err();
        assert_eq!(err.to_string(), "attribute error: cannot set schemaURL on version 1.0 event");
        assert!(ev.schema_url().is_err());
    }

    #[test]
    fn data_schema_rejected_on_v03() {
        let mut ev = Event::new(SpecVersion::V03);
        let err = ev.set_data_schema("http://x").unwrap_err();
        assert!(err.to_string().contains("cannot set dataSchema on version 0.3 event"));
        assert!(ev.data_schema().is_err());
    }

    #[test]
    fn json_string_data_is_parsed_on_read() {
        let mut ev = Event::new(SpecVersion::V10);
        ev.set_data_content_type("application/json")
            .set_data(r#"{"much":"wow"}"#);
        assert_eq!(ev.data(), Some(Data::Json(json!({"much": "wow"}))));
        assert_eq!(ev.raw_data(), Some(&Data::String(r#"{"much":"wow"}"#.into())));
    }

    #[test]
    fn binary_data_becomes_data_base64_on_v10() {
        let mut ev = Event::new(SpecVersion::V10);
        ev.set_source("/s").set_type("t").set_data(vec![1u8, 2, 3]);
        let doc = ev.format().unwrap();
        assert_eq!(doc["data_base64"], json!("AQID"));
        assert!(doc.get("data").is_none());
    }

    #[test]
    fn v01_extensions_are_nested() {
        let mut ev = Event::new(SpecVersion::V01);
        ev.set_source("/s").set_type("t");
        ev.add_extension("tenant", "acme").unwrap();
        let doc = ev.format().unwrap();
        assert_eq!(doc["extensions"]["tenant"], json!("acme"));
        assert_eq!(doc["cloudEventsVersion"], json!("0.1"));
    }

    #[test]
    fn v10_extension_value_types_are_restricted() {
        let mut ev = Event::new(SpecVersion::V10);
        assert!(ev.add_extension("obj", json!({"a": 1})).is_err());
        assert!(ev.add_extension("Upper", "x").is_err());
        assert!(ev.add_extension("count", 3i64).is_ok());

        let mut old = Event::new(SpecVersion::V03);
        assert!(old.add_extension("obj", json!({"a": 1})).is_ok());
    }
}
