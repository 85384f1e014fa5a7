//! Audit Logger
//!
//! Decides which requests are audited and turns a finished request into an
//! [`AuditEvent`] for the configured sink.

use std::sync::Arc;
use std::time::Duration;

use axum::http::Method;
use chrono::Utc;

use super::entity::{AuditAction, AuditEvent, AuditEntityScope, EntityChange, EntityType, RequestMetadata};
use super::sink::AuditSink;
use crate::auth::ActorIdentity;

/// A path family whose mutations are audited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditedFamily {
    pub prefix: String,
    pub entity_type: EntityType,
    /// Sub-paths under `prefix` that are not audited.
    pub excluded: Vec<String>,
}

impl AuditedFamily {
    fn matches(&self, path: &str) -> bool {
        let Some(rest) = path.strip_prefix(self.prefix.as_str()) else {
            return false;
        };
        if !(rest.is_empty() || rest.starts_with('/')) {
            return false;
        }
        !self
            .excluded
            .iter()
            .any(|ex| rest == ex || rest.starts_with(&format!("{}/", ex)))
    }
}

pub struct AuditLogger {
    families: Vec<AuditedFamily>,
    sink: Arc<dyn AuditSink>,
}

impl AuditLogger {
    pub fn new(families: Vec<AuditedFamily>, sink: Arc<dyn AuditSink>) -> Self {
        Self { families, sink }
    }

    /// Account mutations (except role-set lookups) and role mutations under
    /// `base`.
    pub fn with_default_families(base: &str, sink: Arc<dyn AuditSink>) -> Self {
        let base = base.trim_end_matches('/');
        Self::new(
            vec![
                AuditedFamily {
                    prefix: format!("{}/accounts", base),
                    entity_type: EntityType::User,
                    excluded: vec!["/with-roles".to_string()],
                },
                AuditedFamily {
                    prefix: format!("{}/roles", base),
                    entity_type: EntityType::Role,
                    excluded: Vec::new(),
                },
            ],
            sink,
        )
    }

    /// The action and entity type when this request must be audited.
    pub fn classify(&self, method: &Method, path: &str) -> Option<AuditEntityScope> {
        let action = AuditAction::from_method(method)?;
        let family = self.families.iter().find(|f| f.matches(path))?;
        Some(AuditEntityScope {
            action,
            entity_type: family.entity_type,
        })
    }

    pub fn record(
        &self,
        scope: AuditEntityScope,
        actor: ActorIdentity,
        request: RequestMetadata,
        status: u16,
        latency: Duration,
        change: Option<EntityChange>,
    ) {
        let (entity_id, payload, before, after) = match change {
            Some(c) => (Some(c.entity_id), c.payload, c.before, c.after),
            None => (None, None, None, None),
        };

        let event = AuditEvent {
            action: scope.action,
            entity_type: scope.entity_type,
            entity_id,
            actor,
            request,
            status,
            latency_ms: u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
            payload,
            before,
            after,
            occurred_at: Utc::now(),
        };
        self.sink.emit(&event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::sink::MemoryAuditSink;

    fn logger() -> (AuditLogger, Arc<MemoryAuditSink>) {
        let sink = Arc::new(MemoryAuditSink::new());
        (AuditLogger::with_default_families("/users", sink.clone()), sink)
    }

    #[test]
    fn test_classifies_account_and_role_mutations() {
        let (logger, _) = logger();

        let scope = logger.classify(&Method::POST, "/users/accounts").unwrap();
        assert_eq!(scope.action, AuditAction::Add);
        assert_eq!(scope.entity_type, EntityType::User);

        let scope = logger.classify(&Method::PUT, "/users/accounts/abc").unwrap();
        assert_eq!(scope.action, AuditAction::Update);

        let scope = logger.classify(&Method::DELETE, "/users/roles/3").unwrap();
        assert_eq!(scope.action, AuditAction::Delete);
        assert_eq!(scope.entity_type, EntityType::Role);
    }

    #[test]
    fn test_skips_reads_exclusions_and_other_families() {
        let (logger, _) = logger();
        assert!(logger.classify(&Method::GET, "/users/accounts").is_none());
        assert!(logger.classify(&Method::POST, "/users/accounts/with-roles").is_none());
        assert!(logger.classify(&Method::POST, "/users/access-points").is_none());
        assert!(logger.classify(&Method::POST, "/users/role-access").is_none());
        assert!(logger.classify(&Method::POST, "/users/accountsx").is_none());
    }

    #[test]
    fn test_record_without_change_has_no_snapshot() {
        let (logger, sink) = logger();
        let scope = logger.classify(&Method::DELETE, "/users/accounts/x").unwrap();
        let actor = ActorIdentity::new("u-1", "admin@example.com");
        let request = RequestMetadata {
            method: "DELETE".to_string(),
            path: "/users/accounts/x".to_string(),
            user_agent: None,
            source_ip: None,
        };

        logger.record(scope, actor.clone(), request, 404, Duration::from_millis(3), None);

        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].actor, actor);
        assert_eq!(events[0].status, 404);
        assert!(events[0].entity_id.is_none());
        assert!(events[0].before.is_none());
    }
}
