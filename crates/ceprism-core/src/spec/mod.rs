//! Spec versions, attribute identities, and the per-version binding tables.
//!
//! Every version-dependent decision (which attributes exist, how they are
//! named on the wire, which names are reserved) is answered by the static
//! [`registry::BindingSchema`] of that version. Nothing here is mutable
//! after process start.

pub mod registry;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::{CeError, Result};

pub use registry::{schema_for, AttributeRule, BindingSchema, ExtensionLayout};

/// CloudEvents specification revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SpecVersion {
    V01,
    V02,
    V03,
    V10,
}

impl SpecVersion {
    /// Version assumed when a message does not say.
    pub const LATEST: SpecVersion = SpecVersion::V10;

    /// All versions, oldest first.
    pub const ALL: [SpecVersion; 4] = [
        SpecVersion::V01,
        SpecVersion::V02,
        SpecVersion::V03,
        SpecVersion::V10,
    ];

    /// Wire literal (`"1.0"`, `"0.3"`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            SpecVersion::V01 => "0.1",
            SpecVersion::V02 => "0.2",
            SpecVersion::V03 => "0.3",
            SpecVersion::V10 => "1.0",
        }
    }

    /// Binding tables for this version.
    pub fn schema(self) -> &'static BindingSchema {
        schema_for(self)
    }
}

impl fmt::Display for SpecVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpecVersion {
    type Err = CeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "0.1" => Ok(SpecVersion::V01),
            "0.2" => Ok(SpecVersion::V02),
            "0.3" => Ok(SpecVersion::V03),
            "1.0" => Ok(SpecVersion::V10),
            other => Err(CeError::UnsupportedVersion(other.to_string())),
        }
    }
}

/// Canonical attribute identity, independent of its wire name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    SpecVersion,
    Id,
    Source,
    Type,
    Time,
    DataContentType,
    /// 1.0 only.
    DataSchema,
    /// 0.1 - 0.3.
    SchemaUrl,
    /// 0.3 only.
    DataContentEncoding,
    /// 0.3 and 1.0.
    Subject,
    /// 0.1 only.
    EventTypeVersion,
}

impl Attribute {
    /// Name used in error messages.
    pub fn display_name(self) -> &'static str {
        match self {
            Attribute::SpecVersion => "specversion",
            Attribute::Id => "id",
            Attribute::Source => "source",
            Attribute::Type => "type",
            Attribute::Time => "time",
            Attribute::DataContentType => "dataContentType",
            Attribute::DataSchema => "dataSchema",
            Attribute::SchemaUrl => "schemaURL",
            Attribute::DataContentEncoding => "dataContentEncoding",
            Attribute::Subject => "subject",
            Attribute::EventTypeVersion => "eventTypeVersion",
        }
    }
}

/// Supported `datacontentencoding` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentEncoding {
    Base64,
}

impl ContentEncoding {
    pub const SUPPORTED: [&'static str; 1] = ["base64"];

    pub fn as_str(self) -> &'static str {
        match self {
            ContentEncoding::Base64 => "base64",
        }
    }
}

impl FromStr for ContentEncoding {
    type Err = CeError;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().eq_ignore_ascii_case("base64") {
            Ok(ContentEncoding::Base64)
        } else {
            Err(CeError::validation(format!(
                "unsupported datacontentencoding: {s}"
            )))
        }
    }
}

/// Parsed value of a context attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Text(String),
    Time(DateTime<Utc>),
    Version(SpecVersion),
    Encoding(ContentEncoding),
}

impl AttributeValue {
    /// Wire text for headers and JSON string fields.
    pub fn to_wire_string(&self) -> String {
        match self {
            AttributeValue::Text(s) => s.clone(),
            AttributeValue::Time(t) => format_time(t),
            AttributeValue::Version(v) => v.as_str().to_string(),
            AttributeValue::Encoding(e) => e.as_str().to_string(),
        }
    }
}

/// RFC-3339 rendering used on the wire (`Z` suffix, sub-seconds only when set).
pub fn format_time(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Parse an RFC-3339 timestamp into UTC.
pub fn parse_time(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s.trim())
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| CeError::validation(format!("invalid time '{s}': {e}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn version_literals_round_trip() {
        for v in SpecVersion::ALL {
            assert_eq!(v.as_str().parse::<SpecVersion>().ok(), Some(v));
        }
        assert!("2.0".parse::<SpecVersion>().is_err());
    }

    #[test]
    fn encoding_is_case_insensitive() {
        assert_eq!(
            "BASE64".parse::<ContentEncoding>().ok(),
            Some(ContentEncoding::Base64)
        );
        assert!("gzip".parse::<ContentEncoding>().is_err());
    }

    #[test]
    fn time_keeps_zulu_form() {
        let t = parse_time("2019-06-16T11:42:00Z").unwrap();
        assert_eq!(format_time(&t), "2019-06-16T11:42:00Z");
        let t = parse_time("2019-06-16T13:42:00+02:00").unwrap();
        assert_eq!(format_time(&t), "2019-06-16T11:42:00Z");
    }
}
