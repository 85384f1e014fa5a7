//! Audit middleware.
//!
//! Wraps the whole router. For audited requests it captures metadata before
//! the handler, then reads the actor and the entity change from the response
//! extensions and records one event.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::error;

use super::entity::{EntityChange, RequestMetadata};
use super::logger::AuditLogger;
use crate::auth::{ActorIdentity, IdentityRejected};
use crate::shared::error::PlatformError;

pub async fn audit_requests(
    State(logger): State<Arc<AuditLogger>>,
    req: Request,
    next: Next,
) -> Response {
    let Some(scope) = logger.classify(req.method(), req.uri().path()) else {
        return next.run(req).await;
    };

    let started = Instant::now();
    let metadata = RequestMetadata::from_request(&req);
    let mut response = next.run(req).await;
    let latency = started.elapsed();

    if response.extensions().get::<IdentityRejected>().is_some() {
        return response;
    }

    let Some(actor) = response.extensions().get::<ActorIdentity>().cloned() else {
        if is_unrouted(response.status()) {
            return response;
        }
        error!(
            method = %metadata.method,
            path = %metadata.path,
            "Audited request completed without an actor identity"
        );
        return PlatformError::internal("Request has no actor identity to audit").into_response();
    };

    let change = response.extensions_mut().remove::<EntityChange>();
    logger.record(scope, actor, metadata, response.status().as_u16(), latency, change);
    response
}

/// No handler matched the path or method, so nothing was mutated.
fn is_unrouted(status: StatusCode) -> bool {
    matches!(status, StatusCode::NOT_FOUND | StatusCode::METHOD_NOT_ALLOWED)
}
