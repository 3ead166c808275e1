//! Receive-side dispatcher: resolve {binary|structured} x {spec version}
//! from the request and route to the registered binding.

use std::collections::HashMap;

use serde_json::Value;

use crate::error::{CeError, Result};
use crate::event::Event;
use crate::spec::SpecVersion;

use super::{
    media_type, normalize_headers, BinaryBinding, Binding, Headers, Mode, Payload,
    StructuredBinding, CONTENT_TYPE, MIME_CE_PREFIX, STRUCTURED_CONTENT_TYPES,
};

/// Registry of bindings keyed by (mode, version).
///
/// Built once, then only read: `accept` takes `&self` and can be shared
/// across tasks behind an `Arc`.
pub struct Dispatcher {
    bindings: HashMap<(Mode, SpecVersion), Box<dyn Binding>>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    /// Dispatcher with binary and structured bindings for every version.
    pub fn new() -> Self {
        let mut d = Self::empty();
        for v in SpecVersion::ALL {
            d.register(Box::new(BinaryBinding::new(v)));
            d.register(Box::new(StructuredBinding::new(v)));
        }
        d
    }

    /// Dispatcher with nothing registered.
    pub fn empty() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    pub fn register(&mut self, binding: Box<dyn Binding>) {
        self.bindings
            .insert((binding.mode(), binding.version()), binding);
    }

    pub fn registered(&self) -> Vec<(Mode, SpecVersion)> {
        let mut keys: Vec<_> = self.bindings.keys().copied().collect();
        keys.sort_by_key(|(m, v)| (m.as_str(), *v));
        keys
    }

    /// Classify a request by its headers.
    pub fn resolve_mode(headers: &Headers) -> Result<Mode> {
        let headers = normalize_headers(headers);

        if let Some(ct) = headers.get(CONTENT_TYPE) {
            let mt = media_type(ct);
            if mt.starts_with(MIME_CE_PREFIX) {
                if STRUCTURED_CONTENT_TYPES.contains(&mt.as_str()) {
                    return Ok(Mode::Structured);
                }
                return Err(CeError::validation_with(
                    "structured+type not allowed",
                    vec![format!("{ct} is not one of: {}", STRUCTURED_CONTENT_TYPES.join(", "))],
                ));
            }
        }

        let has_id = SpecVersion::ALL
            .iter()
            .any(|v| headers.contains_key(v.schema().id_header));
        if has_id {
            return Ok(Mode::Binary);
        }

        Err(CeError::UnrecognizedMode("no cloud event detected".into()))
    }

    /// Spec version declared by the request; [`SpecVersion::LATEST`] when
    /// absent or unrecognized (the latter with a warning).
    pub fn resolve_version(mode: Mode, headers: &Headers, payload: &Payload) -> SpecVersion {
        let declared = match mode {
            Mode::Binary => {
                let headers = normalize_headers(headers);
                version_from(|v| headers.get(v.schema().version_header).cloned())
            }
            Mode::Structured => {
                let doc = match payload {
                    Payload::Json(v) => Some(v.clone()),
                    Payload::Text(s) => serde_json::from_str::<Value>(s).ok(),
                    Payload::Binary(b) => serde_json::from_slice::<Value>(b).ok(),
                };
                version_from(|v| {
                    doc.as_ref()?
                        .get(v.schema().version_field)?
                        .as_str()
                        .map(str::to_string)
                })
            }
        };

        let Some(raw) = declared else {
            return SpecVersion::LATEST;
        };
        match raw.parse::<SpecVersion>() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(
                    %mode,
                    declared = %raw,
                    fallback = %SpecVersion::LATEST,
                    "unrecognized spec version, using default"
                );
                SpecVersion::LATEST
            }
        }
    }

    /// Resolve mode and version, then parse with the matching binding.
    pub fn accept(&self, headers: &Headers, payload: &Payload) -> Result<Event> {
        let mode = Self::resolve_mode(headers)?;
        let version = Self::resolve_version(mode, headers, payload);
        tracing::debug!(%mode, %version, "cloudevent binding resolved");

        let binding = self.bindings.get(&(mode, version)).ok_or_else(|| {
            CeError::UnsupportedVersion(format!("no {mode} binding registered for {version}"))
        })?;
        binding.parse(payload, headers)
    }
}

/// First version-carrying slot found, newest version names first.
fn version_from(mut lookup: impl FnMut(SpecVersion) -> Option<String>) -> Option<String> {
    SpecVersion::ALL.iter().rev().find_map(|v| lookup(*v))
}
