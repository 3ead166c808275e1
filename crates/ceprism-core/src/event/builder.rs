//! Fallible construction of events.

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::spec::{Attribute, AttributeValue, ContentEncoding, SpecVersion};

use super::{Data, Event, ExtensionValue};

/// Collects attributes and applies them through the event setters on
/// [`EventBuilder::build`], so version mismatches surface as the same
/// attribute errors the setters raise.
#[derive(Debug, Clone)]
pub struct EventBuilder {
    spec: SpecVersion,
    attrs: Vec<(Attribute, AttributeValue)>,
    data: Option<Data>,
    extensions: Vec<(String, ExtensionValue)>,
}

impl EventBuilder {
    pub fn new(spec: SpecVersion) -> Self {
        Self {
            spec,
            attrs: Vec::new(),
            data: None,
            extensions: Vec::new(),
        }
    }

    fn text(mut self, attr: Attribute, v: impl Into<String>) -> Self {
        self.attrs.push((attr, AttributeValue::Text(v.into())));
        self
    }

    pub fn id(self, id: impl Into<String>) -> Self {
        self.text(Attribute::Id, id)
    }

    pub fn source(self, source: impl Into<String>) -> Self {
        self.text(Attribute::Source, source)
    }

    pub fn ty(self, ty: impl Into<String>) -> Self {
        self.text(Attribute::Type, ty)
    }

    pub fn time(mut self, time: DateTime<Utc>) -> Self {
        self.attrs.push((Attribute::Time, AttributeValue::Time(time)));
        self
    }

    pub fn data_content_type(self, ct: impl Into<String>) -> Self {
        self.text(Attribute::DataContentType, ct)
    }

    pub fn data_schema(self, uri: impl Into<String>) -> Self {
        self.text(Attribute::DataSchema, uri)
    }

    pub fn schema_url(self, uri: impl Into<String>) -> Self {
        self.text(Attribute::SchemaUrl, uri)
    }

    pub fn data_content_encoding(mut self, enc: ContentEncoding) -> Self {
        self.attrs
            .push((Attribute::DataContentEncoding, AttributeValue::Encoding(enc)));
        self
    }

    pub fn subject(self, subject: impl Into<String>) -> Self {
        self.text(Attribute::Subject, subject)
    }

    pub fn event_type_version(self, v: impl Into<String>) -> Self {
        self.text(Attribute::EventTypeVersion, v)
    }

    pub fn data(mut self, data: impl Into<Data>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn extension(mut self, name: impl Into<String>, value: impl Into<ExtensionValue>) -> Self {
        self.extensions.push((name.into(), value.into()));
        self
    }

    /// Apply everything to a fresh [`Event::new`]. Does not validate.
    pub fn build(self) -> Result<Event> {
        let mut ev = Event::new(self.spec);
        for (attr, value) in self.attrs {
            ev.set_attribute(attr, value)?;
        }
        if let Some(data) = self.data {
            ev.set_data(data);
        }
        for (name, value) in self.extensions {
            ev.add_extension(name, value)?;
        }
        Ok(ev)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::ClientCode;

    #[test]
    fn build_rejects_wrong_version_attribute() {
        let err = EventBuilder::new(SpecVersion::V10)
            .source("/s")
            .schema_url("http://schema")
            .build()
            .unwrap_err();
        assert_eq!(err.client_code(), ClientCode::InvalidAttribute);
        assert!(err.to_string().contains("cannot set schemaURL on version 1.0 event"));
    }

    #[test]
    fn build_rejects_reserved_extension() {
        let err = EventBuilder::new(SpecVersion::V03)
            .extension("subject", "x")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("reserved attribute name"));
    }

    #[test]
    fn build_applies_attributes() {
        let ev = EventBuilder::new(SpecVersion::V03)
            .id("1")
            .source("/s")
            .ty("t")
            .schema_url("http://schema")
            .data_content_encoding(ContentEncoding::Base64)
            .build()
            .unwrap();
        assert_eq!(ev.id(), "1");
        assert_eq!(ev.schema_url().unwrap(), Some("http://schema"));
        assert_eq!(
            ev.data_content_encoding().unwrap(),
            Some(ContentEncoding::Base64)
        );
    }
}
