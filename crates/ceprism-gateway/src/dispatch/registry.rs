use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use ceprism_core::error::{CeError, Result};
use ceprism_core::Event;

use crate::config::{HandlerKind, RouteConfig};
use crate::policy::allowlist::Pattern;

/// What a handler sends back to the producer.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Acknowledge without a body (202).
    Ack,
    /// Answer with an event, written in binary mode.
    Event(Event),
}

/// Consumer of accepted events.
#[async_trait]
pub trait EventHandler: Send + Sync {
    fn kind(&self) -> HandlerKind;
    async fn handle(&self, event: Event) -> Result<Reply>;
}

/// Handler registry plus the type-pattern routing table.
pub struct HandlerRegistry {
    handlers: DashMap<HandlerKind, Arc<dyn EventHandler>>,
    routes: Vec<(Pattern, HandlerKind)>,
    default: HandlerKind,
}

impl HandlerRegistry {
    pub fn new(routes: &[RouteConfig], default: HandlerKind) -> Result<Self> {
        let mut compiled = routes
            .iter()
            .map(|r| -> Result<(Pattern, HandlerKind)> {
                Ok((Pattern::compile(&r.event_type)?, r.handler))
            })
            .collect::<Result<Vec<_>>>()?;
        // most specific first; stable so equal entries keep config order
        compiled.sort_by(|a, b| b.0.specificity().cmp(&a.0.specificity()));

        Ok(Self {
            handlers: DashMap::new(),
            routes: compiled,
            default,
        })
    }

    pub fn register(&self, handler: Arc<dyn EventHandler>) {
        self.handlers.insert(handler.kind(), handler);
    }

    pub fn registered_kinds(&self) -> Vec<HandlerKind> {
        self.handlers.iter().map(|e| *e.key()).collect()
    }

    /// Every handler kind the routing table can select.
    pub fn routed_kinds(&self) -> Vec<HandlerKind> {
        let mut kinds: Vec<_> = self.routes.iter().map(|(_, k)| *k).collect();
        kinds.push(self.default);
        kinds.sort_by_key(|k| k.as_str());
        kinds.dedup();
        kinds
    }

    pub fn resolve(&self, event_type: &str) -> HandlerKind {
        self.routes
            .iter()
            .find(|(p, _)| p.matches(event_type))
            .map(|(_, k)| *k)
            .unwrap_or(self.default)
    }

    pub async fn dispatch(&self, event: Event) -> Result<Reply> {
        let kind = self.resolve(event.ty());
        let handler = self
            .handlers
            .get(&kind)
            .ok_or_else(|| CeError::Internal(format!("no handler registered for {}", kind.as_str())))?
            .value()
            .clone();
        handler.handle(event).await
    }
}
