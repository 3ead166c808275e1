//! Receive policy: which event types and sources the gateway admits.
//!
//! Compiled once from configuration, then shared read-only.

pub mod allowlist;

use ceprism_core::error::Result;
use ceprism_core::Event;

use crate::config::PolicySection;

use allowlist::{compile_rules, is_allowed, Pattern};

/// Decision from policy evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyDecision {
    Pass,
    /// Rejected; surfaced to the producer as NOT_ALLOWED.
    Reject { msg: &'static str },
}

pub struct EventPolicy {
    type_rules: Vec<Pattern>,
    source_rules: Vec<Pattern>,
}

impl EventPolicy {
    pub fn new(cfg: &PolicySection) -> Result<Self> {
        Ok(Self {
            type_rules: compile_rules(&cfg.type_allowlist)?,
            source_rules: compile_rules(&cfg.source_allowlist)?,
        })
    }

    pub fn evaluate(&self, event: &Event) -> PolicyDecision {
        if !is_allowed(&self.type_rules, event.ty()) {
            return PolicyDecision::Reject {
                msg: "event type not allowed",
            };
        }
        if !is_allowed(&self.source_rules, event.source()) {
            return PolicyDecision::Reject {
                msg: "event source not allowed",
            };
        }
        PolicyDecision::Pass
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use ceprism_core::SpecVersion;

    fn event(ty: &str, source: &str) -> Event {
        let mut ev = Event::new(SpecVersion::V10);
        ev.set_type(ty).set_source(source);
        ev
    }

    #[test]
    fn type_then_source() {
        let policy = EventPolicy::new(&PolicySection {
            type_allowlist: vec!["com.example.*".into()],
            source_allowlist: vec!["/orders".into()],
        })
        .unwrap();

        assert_eq!(policy.evaluate(&event("com.example.a", "/orders")), PolicyDecision::Pass);
        assert!(matches!(
            policy.evaluate(&event("org.other", "/orders")),
            PolicyDecision::Reject { msg: "event type not allowed" }
        ));
        assert!(matches!(
            policy.evaluate(&event("com.example.a", "/billing")),
            PolicyDecision::Reject { msg: "event source not allowed" }
        ));
    }
}
