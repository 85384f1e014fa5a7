//! Audit sinks: where recorded events go.

use parking_lot::Mutex;
use tracing::info;

use super::entity::AuditEvent;

pub trait AuditSink: Send + Sync {
    fn emit(&self, event: &AuditEvent);
}

/// Writes each event as one structured log line on the `audit` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn emit(&self, event: &AuditEvent) {
        let json = |v: &Option<serde_json::Value>| v.as_ref().map(|v| v.to_string()).unwrap_or_default();

        info!(
            target: "audit",
            action = %event.action,
            entity_type = %event.entity_type,
            entity_id = event.entity_id.as_deref().unwrap_or_default(),
            actor_id = %event.actor.user_id,
            actor_email = %event.actor.email,
            method = %event.request.method,
            path = %event.request.path,
            user_agent = event.request.user_agent.as_deref().unwrap_or_default(),
            source_ip = event.request.source_ip.as_deref().unwrap_or_default(),
            status = event.status,
            latency_ms = event.latency_ms,
            payload = %json(&event.payload),
            before = %json(&event.before),
            after = %json(&event.after),
            occurred_at = %event.occurred_at.to_rfc3339(),
            "AUDIT {} {}", event.action, event.entity_type
        );
    }
}

/// Keeps events in memory so tests can inspect them.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().clone()
    }
}

impl AuditSink for MemoryAuditSink {
    fn emit(&self, event: &AuditEvent) {
        self.events.lock().push(event.clone());
    }
}
