//! Attribute schema registry.
//!
//! One immutable [`BindingSchema`] per spec version: header names, structured
//! field names, parse functions, required headers, extension prefix and the
//! reserved-name set. Transcoders borrow these tables; they are never mutated.

use crate::binding::Headers;
use crate::error::Result;

use super::{parse_time, Attribute, AttributeValue, ContentEncoding, SpecVersion};

/// Pure parser from wire text to an attribute value.
pub type ParseFn = fn(&str) -> Result<AttributeValue>;

/// Optional pre-check over normalized headers.
pub type HeaderCheckFn = fn(&Headers) -> Result<()>;

/// Mapping of one attribute to its binary header, structured field and parser.
#[derive(Debug)]
pub struct AttributeRule {
    pub attr: Attribute,
    /// Binary-mode header name (lower-case).
    pub header: &'static str,
    /// Structured-mode field name.
    pub field: &'static str,
    pub parse: ParseFn,
}

/// Where structured-mode extensions live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionLayout {
    /// One top-level field per extension.
    TopLevel,
    /// All extensions inside a single object field.
    Nested(&'static str),
}

/// Binding tables of one spec version.
#[derive(Debug)]
pub struct BindingSchema {
    pub version: SpecVersion,
    pub rules: &'static [AttributeRule],
    pub required_headers: &'static [&'static str],
    /// Header carrying the spec version.
    pub version_header: &'static str,
    /// Header whose presence identifies a binary-mode message.
    pub id_header: &'static str,
    /// Structured field carrying the spec version.
    pub version_field: &'static str,
    pub extension_prefix: &'static str,
    pub extension_layout: ExtensionLayout,
    /// Structured field holding base64 data, if the version defines one.
    pub data_base64_field: Option<&'static str>,
    pub reserved: &'static [&'static str],
    pub header_check: Option<HeaderCheckFn>,
}

impl BindingSchema {
    pub fn rule(&self, attr: Attribute) -> Option<&'static AttributeRule> {
        self.rules.iter().find(|r| r.attr == attr)
    }

    /// Whether events of this version carry `attr` at all.
    pub fn supports(&self, attr: Attribute) -> bool {
        self.rule(attr).is_some()
    }

    pub fn rule_for_header(&self, header: &str) -> Option<&'static AttributeRule> {
        self.rules.iter().find(|r| r.header == header)
    }

    pub fn rule_for_field(&self, field: &str) -> Option<&'static AttributeRule> {
        self.rules.iter().find(|r| r.field == field)
    }

    /// Reserved names are matched case-insensitively.
    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved.iter().any(|r| r.eq_ignore_ascii_case(name))
    }
}

/// Registry lookup.
pub fn schema_for(version: SpecVersion) -> &'static BindingSchema {
    match version {
        SpecVersion::V01 => &V01,
        SpecVersion::V02 => &V02,
        SpecVersion::V03 => &V03,
        SpecVersion::V10 => &V10,
    }
}

// --------------------
// Parse functions
// --------------------
fn parse_text(s: &str) -> Result<AttributeValue> {
    Ok(AttributeValue::Text(s.to_string()))
}

fn parse_timestamp(s: &str) -> Result<AttributeValue> {
    parse_time(s).map(AttributeValue::Time)
}

fn parse_encoding(s: &str) -> Result<AttributeValue> {
    s.parse::<ContentEncoding>().map(AttributeValue::Encoding)
}

// The version header is redundant with the selected binding: constant parsers.
fn spec_v01(_: &str) -> Result<AttributeValue> {
    Ok(AttributeValue::Version(SpecVersion::V01))
}
fn spec_v02(_: &str) -> Result<AttributeValue> {
    Ok(AttributeValue::Version(SpecVersion::V02))
}
fn spec_v03(_: &str) -> Result<AttributeValue> {
    Ok(AttributeValue::Version(SpecVersion::V03))
}
fn spec_v10(_: &str) -> Result<AttributeValue> {
    Ok(AttributeValue::Version(SpecVersion::V10))
}

fn check_content_encoding(headers: &Headers) -> Result<()> {
    if let Some(enc) = headers.get("ce-datacontentencoding") {
        enc.parse::<ContentEncoding>()?;
    }
    Ok(())
}

const fn rule(attr: Attribute, header: &'static str, field: &'static str, parse: ParseFn) -> AttributeRule {
    AttributeRule {
        attr,
        header,
        field,
        parse,
    }
}

// --------------------
// 1.0
// --------------------
static V10_RULES: [AttributeRule; 8] = [
    rule(Attribute::SpecVersion, "ce-specversion", "specversion", spec_v10),
    rule(Attribute::Id, "ce-id", "id", parse_text),
    rule(Attribute::Type, "ce-type", "type", parse_text),
    rule(Attribute::Source, "ce-source", "source", parse_text),
    rule(Attribute::Time, "ce-time", "time", parse_timestamp),
    rule(Attribute::DataSchema, "ce-dataschema", "dataschema", parse_text),
    rule(Attribute::Subject, "ce-subject", "subject", parse_text),
    rule(Attribute::DataContentType, "content-type", "datacontenttype", parse_text),
];

static V10: BindingSchema = BindingSchema {
    version: SpecVersion::V10,
    rules: &V10_RULES,
    required_headers: &["ce-type", "ce-specversion", "ce-source", "ce-id"],
    version_header: "ce-specversion",
    id_header: "ce-id",
    version_field: "specversion",
    extension_prefix: "ce-",
    extension_layout: ExtensionLayout::TopLevel,
    data_base64_field: Some("data_base64"),
    reserved: &[
        "specversion",
        "id",
        "type",
        "source",
        "time",
        "dataschema",
        "subject",
        "datacontenttype",
        "data",
        "data_base64",
    ],
    header_check: None,
};

// --------------------
// 0.3
// --------------------
static V03_RULES: [AttributeRule; 9] = [
    rule(Attribute::SpecVersion, "ce-specversion", "specversion", spec_v03),
    rule(Attribute::Id, "ce-id", "id", parse_text),
    rule(Attribute::Type, "ce-type", "type", parse_text),
    rule(Attribute::Source, "ce-source", "source", parse_text),
    rule(Attribute::Time, "ce-time", "time", parse_timestamp),
    rule(Attribute::SchemaUrl, "ce-schemaurl", "schemaurl", parse_text),
    rule(Attribute::Subject, "ce-subject", "subject", parse_text),
    rule(Attribute::DataContentType, "content-type", "datacontenttype", parse_text),
    rule(
        Attribute::DataContentEncoding,
        "ce-datacontentencoding",
        "datacontentencoding",
        parse_encoding,
    ),
];

static V03: BindingSchema = BindingSchema {
    version: SpecVersion::V03,
    rules: &V03_RULES,
    required_headers: &["ce-type", "ce-specversion", "ce-source", "ce-id"],
    version_header: "ce-specversion",
    id_header: "ce-id",
    version_field: "specversion",
    extension_prefix: "ce-",
    extension_layout: ExtensionLayout::TopLevel,
    data_base64_field: None,
    reserved: &[
        "specversion",
        "id",
        "type",
        "source",
        "time",
        "schemaurl",
        "subject",
        "datacontenttype",
        "datacontentencoding",
        "data",
    ],
    header_check: Some(check_content_encoding),
};

// --------------------
// 0.2
// --------------------
static V02_RULES: [AttributeRule; 7] = [
    rule(Attribute::SpecVersion, "ce-specversion", "specversion", spec_v02),
    rule(Attribute::Id, "ce-id", "id", parse_text),
    rule(Attribute::Type, "ce-type", "type", parse_text),
    rule(Attribute::Source, "ce-source", "source", parse_text),
    rule(Attribute::Time, "ce-time", "time", parse_timestamp),
    rule(Attribute::SchemaUrl, "ce-schemaurl", "schemaurl", parse_text),
    rule(Attribute::DataContentType, "content-type", "contenttype", parse_text),
];

static V02: BindingSchema = BindingSchema {
    version: SpecVersion::V02,
    rules: &V02_RULES,
    required_headers: &["ce-type", "ce-specversion", "ce-source", "ce-id"],
    version_header: "ce-specversion",
    id_header: "ce-id",
    version_field: "specversion",
    extension_prefix: "ce-",
    extension_layout: ExtensionLayout::TopLevel,
    data_base64_field: None,
    reserved: &[
        "specversion",
        "id",
        "type",
        "source",
        "time",
        "schemaurl",
        "subject",
        "contenttype",
        "datacontenttype",
        "data",
    ],
    header_check: None,
};

// --------------------
// 0.1
// --------------------
static V01_RULES: [AttributeRule; 8] = [
    rule(Attribute::SpecVersion, "ce-cloudeventsversion", "cloudEventsVersion", spec_v01),
    rule(Attribute::Id, "ce-eventid", "eventID", parse_text),
    rule(Attribute::Type, "ce-eventtype", "eventType", parse_text),
    rule(Attribute::EventTypeVersion, "ce-eventtypeversion", "eventTypeVersion", parse_text),
    rule(Attribute::Source, "ce-source", "source", parse_text),
    rule(Attribute::Time, "ce-eventtime", "eventTime", parse_timestamp),
    rule(Attribute::SchemaUrl, "ce-schemaurl", "schemaURL", parse_text),
    rule(Attribute::DataContentType, "content-type", "contentType", parse_text),
];

static V01: BindingSchema = BindingSchema {
    version: SpecVersion::V01,
    rules: &V01_RULES,
    required_headers: &["ce-eventtype", "ce-cloudeventsversion", "ce-source", "ce-eventid"],
    version_header: "ce-cloudeventsversion",
    id_header: "ce-eventid",
    version_field: "cloudEventsVersion",
    extension_prefix: "ce-x-",
    extension_layout: ExtensionLayout::Nested("extensions"),
    data_base64_field: None,
    reserved: &[
        "cloudeventsversion",
        "eventid",
        "eventtype",
        "eventtypeversion",
        "eventtime",
        "contenttype",
        "extensions",
        "specversion",
        "id",
        "type",
        "source",
        "time",
        "schemaurl",
        "subject",
        "datacontenttype",
        "data",
    ],
    header_check: None,
};
