//! Identity middleware for mutation routes.

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::{from_fn_with_state, Next},
    response::{IntoResponse, Response},
    routing::MethodRouter,
};
use tracing::warn;

use super::identity::{ActorIdentity, ActorIdentityExtractor, ID_TOKEN_HEADER};
use crate::shared::error::PlatformError;

/// Marks a response produced by a rejected identity token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityRejected;

/// Verify the caller's identity token before the handler runs.
///
/// The actor is attached to the request for handlers and to the response for
/// the audit layer. A rejected token short-circuits with 403 (or 500 when the
/// key set itself is broken).
pub async fn require_actor(
    State(extractor): State<Arc<ActorIdentityExtractor>>,
    mut req: Request,
    next: Next,
) -> Response {
    let token = req
        .headers()
        .get(ID_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    match extractor.extract(token) {
        Ok(actor) => {
            req.extensions_mut().insert(actor.clone());
            let mut response = next.run(req).await;
            response.extensions_mut().insert(actor);
            response
        }
        Err(e) => {
            warn!(path = %req.uri().path(), error = %e, "Identity token rejected");
            let mut response = PlatformError::from(e).into_response();
            response.extensions_mut().insert(IdentityRejected);
            response
        }
    }
}

/// Put the handlers of `method_router` behind [`require_actor`]. Methods the
/// router does not serve still get 405 without a token check.
pub fn actor_required<S>(method_router: MethodRouter<S>, identity: &Arc<ActorIdentityExtractor>) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    method_router.route_layer(from_fn_with_state(identity.clone(), require_actor))
}

/// Handler extractor for the verified actor.
pub struct Actor(pub ActorIdentity);

impl std::ops::Deref for Actor {
    type Target = ActorIdentity;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = PlatformError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<ActorIdentity>()
            .cloned()
            .map(Actor)
            .ok_or_else(|| PlatformError::internal("No actor identity attached to request"))
    }
}
