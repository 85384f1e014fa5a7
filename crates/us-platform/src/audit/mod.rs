//! Audit logging for account and role mutations.

pub mod entity;
pub mod logger;
pub mod middleware;
pub mod sink;

pub use entity::{AuditAction, AuditEntityScope, AuditEvent, EntityChange, EntityType, RequestMetadata};
pub use logger::{AuditLogger, AuditedFamily};
pub use middleware::audit_requests;
pub use sink::{AuditSink, MemoryAuditSink, TracingAuditSink};
