//! Allowlist compilation and matching utilities.
//!
//! Entries are exact strings or `prefix*` wildcards (`*` alone matches
//! anything).

use ceprism_core::error::{CeError, Result};

/// Compiled allowlist entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    Exact(String),
    Prefix(String), // "" => wildcard
}

impl Pattern {
    pub fn compile(raw: &str) -> Result<Self> {
        match raw.strip_suffix('*') {
            Some(prefix) if prefix.contains('*') => Err(CeError::Argument(format!(
                "invalid allowlist entry: {raw} ('*' must be last)"
            ))),
            Some(prefix) => Ok(Pattern::Prefix(prefix.to_string())),
            None if raw.is_empty() => Err(CeError::Argument("empty allowlist entry".into())),
            None => Ok(Pattern::Exact(raw.to_string())),
        }
    }

    pub fn matches(&self, value: &str) -> bool {
        match self {
            Pattern::Exact(s) => s == value,
            Pattern::Prefix(p) => value.starts_with(p.as_str()),
        }
    }

    /// Exact entries win over prefixes; longer prefixes win over shorter.
    pub fn specificity(&self) -> (bool, usize) {
        match self {
            Pattern::Exact(s) => (true, s.len()),
            Pattern::Prefix(p) => (false, p.len()),
        }
    }
}

pub fn compile_rules(raw: &[String]) -> Result<Vec<Pattern>> {
    raw.iter().map(|s| Pattern::compile(s)).collect()
}

pub fn is_allowed(rules: &[Pattern], value: &str) -> bool {
    rules.iter().any(|r| r.matches(value))
}
