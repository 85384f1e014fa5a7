//! User account aggregate

pub mod api;
pub mod entity;
pub mod filter;
pub mod mutation;
pub mod query;
pub mod repository;

pub use entity::{User, UserPayload};
pub use filter::{Clause, RoleCriterion, UserCriteria, UserFilter};
pub use mutation::AccountMutationService;
pub use query::AccountQueryService;
pub use repository::UserRepository;
