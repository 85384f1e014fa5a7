//! Audit Event Entity
//!
//! One event is recorded per audited mutation request: who did it, what was
//! requested, how the request ended, and the record before and after.

use std::fmt;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Request};
use axum::http::{header::USER_AGENT, Method};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::auth::ActorIdentity;
use crate::usecase::Change;

const FORWARDED_FOR: &str = "x-forwarded-for";

/// Audit action type, derived from the HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditAction {
    Add,
    Update,
    Delete,
}

impl AuditAction {
    /// POST adds, PUT and PATCH update, DELETE deletes. Reads are not audited.
    pub fn from_method(method: &Method) -> Option<Self> {
        match *method {
            Method::POST => Some(Self::Add),
            Method::PUT | Method::PATCH => Some(Self::Update),
            Method::DELETE => Some(Self::Delete),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
    User,
    Role,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Role => "ROLE",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an audited request is about, known before the handler runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditEntityScope {
    pub action: AuditAction,
    pub entity_type: EntityType,
}

/// Outcome of a mutation handed from a handler to the audit layer through
/// the response extensions.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityChange {
    pub entity_type: EntityType,
    pub entity_id: String,
    pub payload: Option<Value>,
    pub before: Option<Value>,
    pub after: Option<Value>,
}

impl EntityChange {
    pub fn new<T: Serialize>(entity_type: EntityType, entity_id: impl Into<String>, change: &Change<T>) -> Self {
        Self {
            entity_type,
            entity_id: entity_id.into(),
            payload: None,
            before: change.before.as_ref().and_then(to_json),
            after: change.after.as_ref().and_then(to_json),
        }
    }

    /// Attach the request body that produced this change.
    pub fn with_payload<P: Serialize>(mut self, payload: &P) -> Self {
        self.payload = to_json(payload);
        self
    }
}

fn to_json<T: Serialize>(value: &T) -> Option<Value> {
    serde_json::to_value(value).ok()
}

/// Request attributes captured before the handler runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestMetadata {
    pub method: String,
    pub path: String,
    pub user_agent: Option<String>,
    pub source_ip: Option<String>,
}

impl RequestMetadata {
    /// The source address is the first `X-Forwarded-For` hop when present,
    /// otherwise the peer address of the connection.
    pub fn from_request(req: &Request) -> Self {
        let headers = req.headers();
        let user_agent = headers
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let forwarded = headers
            .get(FORWARDED_FOR)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string);

        let source_ip = forwarded.or_else(|| {
            req.extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        });

        Self {
            method: req.method().to_string(),
            path: req.uri().path().to_string(),
            user_agent,
            source_ip,
        }
    }
}

/// A recorded audit event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    pub action: AuditAction,
    pub entity_type: EntityType,
    /// Absent when the handler failed before producing a change
    pub entity_id: Option<String>,
    pub actor: ActorIdentity,
    pub request: RequestMetadata,
    pub status: u16,
    pub latency_ms: u64,
    pub payload: Option<Value>,
    pub before: Option<Value>,
    pub after: Option<Value>,
    pub occurred_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn test_action_from_method() {
        assert_eq!(AuditAction::from_method(&Method::POST), Some(AuditAction::Add));
        assert_eq!(AuditAction::from_method(&Method::PUT), Some(AuditAction::Update));
        assert_eq!(AuditAction::from_method(&Method::PATCH), Some(AuditAction::Update));
        assert_eq!(AuditAction::from_method(&Method::DELETE), Some(AuditAction::Delete));
        assert_eq!(AuditAction::from_method(&Method::GET), None);
    }

    #[test]
    fn test_action_labels() {
        assert_eq!(serde_json::to_value(AuditAction::Add).unwrap(), serde_json::json!("add"));
        assert_eq!(serde_json::to_value(AuditAction::Update).unwrap(), serde_json::json!("update"));
        assert_eq!(serde_json::to_value(AuditAction::Delete).unwrap(), serde_json::json!("delete"));
        assert_eq!(AuditAction::Add.to_string(), "add");
        assert_eq!(AuditAction::Delete.as_str(), "delete");
    }

    #[test]
    fn test_entity_change_snapshots() {
        let change = Change::updated(serde_json::json!({"name": "old"}), serde_json::json!({"name": "new"}));
        let entity = EntityChange::new(EntityType::Role, "4", &change).with_payload(&serde_json::json!({"name": "new"}));
        assert_eq!(entity.entity_id, "4");
        assert_eq!(entity.before, Some(serde_json::json!({"name": "old"})));
        assert_eq!(entity.after, Some(serde_json::json!({"name": "new"})));
        assert!(entity.payload.is_some());
    }

    #[test]
    fn test_metadata_prefers_forwarded_for() {
        let mut req = Request::builder()
            .method(Method::POST)
            .uri("/users/accounts?x=1")
            .header(USER_AGENT, "curl/8.0")
            .header(FORWARDED_FOR, "203.0.113.9, 10.0.0.1")
            .body(Body::empty())
            .unwrap();
        req.extensions_mut()
            .insert(ConnectInfo("127.0.0.1:9000".parse::<SocketAddr>().unwrap()));

        let meta = RequestMetadata::from_request(&req);
        assert_eq!(meta.method, "POST");
        assert_eq!(meta.path, "/users/accounts");
        assert_eq!(meta.user_agent.as_deref(), Some("curl/8.0"));
        assert_eq!(meta.source_ip.as_deref(), Some("203.0.113.9"));
    }

    #[test]
    fn test_metadata_falls_back_to_peer_address() {
        let mut req = Request::builder().uri("/users/roles").body(Body::empty()).unwrap();
        req.extensions_mut()
            .insert(ConnectInfo("192.0.2.5:443".parse::<SocketAddr>().unwrap()));
        assert_eq!(RequestMetadata::from_request(&req).source_ip.as_deref(), Some("192.0.2.5"));
    }
}
