//! Actor identity for mutation requests.

pub mod identity;
pub mod middleware;

pub use identity::{ActorIdentity, ActorIdentityExtractor, IdentityError, ID_TOKEN_HEADER};
pub use middleware::{actor_required, require_actor, Actor, IdentityRejected};
