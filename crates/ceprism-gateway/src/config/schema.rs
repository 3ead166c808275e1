use std::net::SocketAddr;

use serde::Deserialize;
use ceprism_core::error::{CeError, Result};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    pub version: u32,

    #[serde(default)]
    pub gateway: GatewaySection,

    #[serde(default)]
    pub policy: PolicySection,

    #[serde(default)]
    pub routes: Vec<RouteConfig>,

    #[serde(default = "default_handler")]
    pub default_handler: HandlerKind,
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(CeError::UnsupportedVersion(format!(
                "config version {} (expected 1)",
                self.version
            )));
        }

        self.gateway.validate()?;
        self.policy.validate()?;
        for r in &self.routes {
            validate_pattern("routes[].type", &r.event_type)?;
        }

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewaySection {
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Route the receiver is mounted on.
    #[serde(default = "default_path")]
    pub path: String,

    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// `source` attribute of events the gateway emits (echo replies).
    #[serde(default = "default_source")]
    pub source: String,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            path: default_path(),
            max_body_bytes: default_max_body_bytes(),
            source: default_source(),
        }
    }
}

impl GatewaySection {
    pub fn validate(&self) -> Result<()> {
        self.listen.parse::<SocketAddr>().map_err(|_| {
            CeError::Argument(format!(
                "gateway.listen must be a valid SocketAddr: {}",
                self.listen
            ))
        })?;
        if !self.path.starts_with('/') || self.path == "/" {
            return Err(CeError::Argument(
                "gateway.path must start with '/' and not be the root".into(),
            ));
        }
        if crate::ops::PATHS.contains(&self.path.as_str()) {
            return Err(CeError::Argument(format!(
                "gateway.path collides with an ops endpoint: {}",
                self.path
            )));
        }
        if !(1024..=16 * 1024 * 1024).contains(&self.max_body_bytes) {
            return Err(CeError::Argument(
                "gateway.max_body_bytes must be between 1024 and 16777216".into(),
            ));
        }
        if self.source.is_empty() {
            return Err(CeError::Argument("gateway.source must not be empty".into()));
        }
        Ok(())
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}
fn default_path() -> String {
    "/events".into()
}
fn default_max_body_bytes() -> usize {
    1024 * 1024
}
fn default_source() -> String {
    "/ceprism-gateway".into()
}

/// Which events the receiver is willing to hand to a handler.
///
/// Entries are exact values or `prefix*` wildcards; `*` alone admits
/// everything.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicySection {
    #[serde(default = "default_allow_all")]
    pub type_allowlist: Vec<String>,

    #[serde(default = "default_allow_all")]
    pub source_allowlist: Vec<String>,
}

impl Default for PolicySection {
    fn default() -> Self {
        Self {
            type_allowlist: default_allow_all(),
            source_allowlist: default_allow_all(),
        }
    }
}

impl PolicySection {
    pub fn validate(&self) -> Result<()> {
        if self.type_allowlist.is_empty() {
            return Err(CeError::Argument("policy.type_allowlist must not be empty".into()));
        }
        if self.source_allowlist.is_empty() {
            return Err(CeError::Argument("policy.source_allowlist must not be empty".into()));
        }
        for p in &self.type_allowlist {
            validate_pattern("policy.type_allowlist", p)?;
        }
        for p in &self.source_allowlist {
            validate_pattern("policy.source_allowlist", p)?;
        }
        Ok(())
    }
}

fn default_allow_all() -> Vec<String> {
    vec!["*".into()]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandlerKind {
    /// Log the event and acknowledge with 202.
    Log,
    /// Reply with a binary-mode copy of the event.
    Echo,
}

impl HandlerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            HandlerKind::Log => "log",
            HandlerKind::Echo => "echo",
        }
    }
}

fn default_handler() -> HandlerKind {
    HandlerKind::Log
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteConfig {
    /// Event type pattern (`exact` or `prefix*`).
    #[serde(rename = "type")]
    pub event_type: String,
    pub handler: HandlerKind,
}

fn validate_pattern(field: &str, p: &str) -> Result<()> {
    if p.is_empty() {
        return Err(CeError::Argument(format!("{field}: empty pattern")));
    }
    if p.strip_suffix('*').unwrap_or(p).contains('*') {
        return Err(CeError::Argument(format!(
            "{field}: '*' is only allowed as the last character: {p}"
        )));
    }
    Ok(())
}
