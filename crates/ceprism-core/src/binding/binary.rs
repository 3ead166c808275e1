//! Binary-mode binding: attributes in `ce-*` headers, data in the body.
//!
//! One implementation serves every spec version; the differences (header
//! names, required headers, extension prefix, 0.3's encoding pre-check) come
//! from the version's [`BindingSchema`].

use std::borrow::Cow;
use std::collections::BTreeSet;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;

use crate::error::{CeError, Result};
use crate::event::{Data, Event, ExtensionValue};
use crate::spec::{BindingSchema, ContentEncoding, SpecVersion};

use super::parser::body_parser;
use super::{
    check_payload, media_type, normalize_headers, Binding, Headers, Message, Mode, Payload,
    BINARY_CONTENT_TYPES, CONTENT_TYPE, MIME_JSON, MIME_OCTET_STREAM,
};

/// Binary-mode receiver/emitter bound to one spec version.
#[derive(Debug, Clone, Copy)]
pub struct BinaryBinding {
    schema: &'static BindingSchema,
    allowed_content_types: &'static [&'static str],
}

impl BinaryBinding {
    pub fn new(version: SpecVersion) -> Self {
        Self {
            schema: version.schema(),
            allowed_content_types: &BINARY_CONTENT_TYPES,
        }
    }

    fn check_normalized(&self, payload: &Payload, headers: &Headers) -> Result<()> {
        check_payload(payload)?;

        if let Some(hook) = self.schema.header_check {
            hook(headers)?;
        }

        if let Some(ct) = headers.get(CONTENT_TYPE) {
            let mt = media_type(ct);
            if !self.allowed_content_types.contains(&mt.as_str()) {
                return Err(CeError::validation_with(
                    "invalid content type",
                    vec![format!(
                        "{ct} is not one of: {}",
                        self.allowed_content_types.join(", ")
                    )],
                ));
            }
        }

        if let Some(missing) = self
            .schema
            .required_headers
            .iter()
            .find(|h| !headers.contains_key(**h))
        {
            return Err(CeError::validation(format!("header '{missing}' not found")));
        }

        let declared = headers
            .get(self.schema.version_header)
            .map(String::as_str)
            .unwrap_or_default();
        if declared != self.schema.version.as_str() {
            return Err(CeError::validation_with(
                "invalid spec version",
                vec![format!(
                    "expected {}, got '{declared}'",
                    self.schema.version
                )],
            ));
        }

        Ok(())
    }

    /// 1.0 bodies that arrive base64-wrapped are unwrapped before parsing.
    ///
    /// Text that merely happens to be valid base64 is indistinguishable from
    /// a wrapped body. Decoded bytes are only used when they are UTF-8, or
    /// when the body is declared as `application/octet-stream`.
    fn unwrap_base64<'a>(&self, payload: &'a Payload, content_type: &str) -> Cow<'a, Payload> {
        if self.schema.version != SpecVersion::V10 {
            return Cow::Borrowed(payload);
        }
        let Payload::Text(s) = payload else {
            return Cow::Borrowed(payload);
        };
        if s.is_empty() {
            return Cow::Borrowed(payload);
        }
        let decoded = match STANDARD.decode(s) {
            Ok(bytes) if STANDARD.encode(&bytes) == *s => bytes,
            _ => return Cow::Borrowed(payload),
        };
        match String::from_utf8(decoded) {
            Ok(text) => Cow::Owned(Payload::Text(text)),
            Err(e) if media_type(content_type) == MIME_OCTET_STREAM => {
                Cow::Owned(Payload::Binary(Bytes::from(e.into_bytes())))
            }
            Err(_) => Cow::Borrowed(payload),
        }
    }

    /// Body for `event`, written so this binding's own `parse` reads back the
    /// same data.
    fn data_body(&self, event: &Event) -> Result<Bytes> {
        if let Some(b64) = event.data_base64() {
            return Ok(Bytes::from(b64));
        }

        if event.data_content_encoding().unwrap_or(None) == Some(ContentEncoding::Base64) {
            return match event.raw_data() {
                // check() already proved it is canonical base64
                Some(Data::String(s)) => Ok(Bytes::copy_from_slice(s.as_bytes())),
                Some(data) => Ok(Bytes::from(STANDARD.encode(data.to_body()?))),
                None => Ok(Bytes::new()),
            };
        }

        let octet = event
            .data_content_type()
            .is_some_and(|ct| media_type(ct) == MIME_OCTET_STREAM);
        match event.data() {
            // 1.0 receivers unwrap base64 octet-stream text; wrap it first
            Some(Data::String(s)) if octet && self.schema.version == SpecVersion::V10 => {
                Ok(Bytes::from(STANDARD.encode(s.as_bytes())))
            }
            Some(data) => data.to_body(),
            None => Ok(Bytes::new()),
        }
    }
}

fn is_empty_body(payload: &Payload) -> bool {
    match payload {
        Payload::Text(s) => s.is_empty(),
        Payload::Binary(b) => b.is_empty(),
        Payload::Json(_) => false,
    }
}

impl Binding for BinaryBinding {
    fn mode(&self) -> Mode {
        Mode::Binary
    }

    fn version(&self) -> SpecVersion {
        self.schema.version
    }

    fn check(&self, payload: &Payload, headers: &Headers) -> Result<()> {
        self.check_normalized(payload, &normalize_headers(headers))
    }

    fn parse(&self, payload: &Payload, headers: &Headers) -> Result<Event> {
        let mut headers = normalize_headers(headers);
        self.check_normalized(payload, &headers)?;

        let content_type = headers
            .entry(CONTENT_TYPE.to_string())
            .or_insert_with(|| MIME_JSON.to_string())
            .clone();
        let payload = self.unwrap_base64(payload, &content_type);

        let mut event = Event::empty(self.schema.version);
        let mut processed: BTreeSet<&str> = BTreeSet::new();

        for rule in self.schema.rules {
            if let Some(raw) = headers.get(rule.header) {
                let value = (rule.parse)(raw)?;
                event.set_attribute(rule.attr, value)?;
                processed.insert(rule.header);
            }
        }

        let encoding = event.data_content_encoding().unwrap_or(None);
        let parser = body_parser(encoding, &media_type(&content_type))?;
        let data = if is_empty_body(&payload) {
            None
        } else {
            Some(parser(&*payload)?)
        };

        let prefix = self.schema.extension_prefix;
        for (name, value) in &headers {
            if processed.contains(name.as_str()) {
                continue;
            }
            if let Some(ext) = name.strip_prefix(prefix) {
                tracing::debug!(extension = %ext, "binary extension header");
                event.add_extension(ext, ExtensionValue::String(value.clone()))?;
            }
        }

        if let Some(data) = data {
            event.set_data(data);
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
        event.check()?;

        let mut headers = Headers::new();
        for rule in self.schema.rules {
            if let Some(v) = event.attribute(rule.attr) {
                let s = v.to_wire_string();
                if !s.is_empty() {
                    headers.insert(rule.header.to_string(), s);
                }
            }
        }
        headers
            .entry(CONTENT_TYPE.to_string())
            .or_insert_with(|| MIME_JSON.to_string());

        for (name, value) in event.extensions() {
            headers.insert(
                format!("{}{}", self.schema.extension_prefix, name),
                value.to_wire_string(),
            );
        }

        Ok(Message {
            headers,
            body: self.data_body(event)?,
        })
    }
}
