//! JSON Schema (draft-07) documents for each spec version.

use crate::spec::SpecVersion;

pub(super) fn schema_text(version: SpecVersion) -> &'static str {
    match version {
        SpecVersion::V01 => V01,
        SpecVersion::V02 => V02,
        SpecVersion::V03 => V03,
        SpecVersion::V10 => V10,
    }
}

const V10: &str = r#"{
  "$schema": "http://json-schema.org/draft-07/schema#",
  "$id": "https://cloudevents.io/schemas/v1.0/event.json",
  "type": "object",
  "properties": {
    "specversion": { "type": "string", "minLength": 1 },
    "id": { "type": "string", "minLength": 1 },
    "source": { "type": "string", "format": "uri-reference", "minLength": 1 },
    "type": { "type": "string", "minLength": 1 },
    "time": { "type": "string", "format": "date-time" },
    "datacontenttype": { "type": "string", "minLength": 1 },
    "dataschema": { "type": "string", "format": "uri-reference", "minLength": 1 },
    "subject": { "type": "string", "minLength": 1 },
    "data_base64": { "type": "string" }
  },
  "required": ["specversion", "id", "type", "source"]
}"#;

const V03: &str = r#"{
  "$schema": "http://json-schema.org/draft-07/schema#",
  "$id": "https://cloudevents.io/schemas/v0.3/event.json",
  "type": "object",
  "properties": {
    "specversion": { "type": "string", "minLength": 1 },
    "id": { "type": "string", "minLength": 1 },
    "source": { "type": "string", "format": "uri-reference", "minLength": 1 },
    "type": { "type": "string", "minLength": 1 },
    "time": { "type": "string", "format": "date-time" },
    "datacontenttype": { "type": "string", "minLength": 1 },
    "datacontentencoding": { "type": "string", "minLength": 1 },
    "schemaurl": { "type": "string", "format": "uri-reference", "minLength": 1 },
    "subject": { "type": "string", "minLength": 1 }
  },
  "required": ["specversion", "id", "type", "source"]
}"#;

const V02: &str = r#"{
  "$schema": "http://json-schema.org/draft-07/schema#",
  "$id": "https://cloudevents.io/schemas/v0.2/event.json",
  "type": "object",
  "properties": {
    "specversion": { "type": "string", "minLength": 1 },
    "id": { "type": "string", "minLength": 1 },
    "source": { "type": "string", "format": "uri-reference", "minLength": 1 },
    "type": { "type": "string", "minLength": 1 },
    "time": { "type": "string", "format": "date-time" },
    "contenttype": { "type": "string", "minLength": 1 },
    "schemaurl": { "type": "string", "format": "uri-reference", "minLength": 1 }
  },
  "required": ["specversion", "id", "type", "source"]
}"#;

const V01: &str = r#"{
  "$schema": "http://json-schema.org/draft-07/schema#",
  "$id": "https://cloudevents.io/schemas/v0.1/event.json",
  "type": "object",
  "properties": {
    "cloudEventsVersion": { "type": "string", "minLength": 1 },
    "eventID": { "type": "string", "minLength": 1 },
    "source": { "type": "string", "format": "uri-reference", "minLength": 1 },
    "eventType": { "type": "string", "minLength": 1 },
    "eventTypeVersion": { "type": "string", "minLength": 1 },
    "eventTime": { "type": "string", "format": "date-time" },
    "contentType": { "type": "string", "minLength": 1 },
    "schemaURL": { "type": "string", "format": "uri-reference", "minLength": 1 },
    "extensions": { "type": "object" }
  },
  "required": ["cloudEventsVersion", "eventID", "eventType", "source"]
}"#;
