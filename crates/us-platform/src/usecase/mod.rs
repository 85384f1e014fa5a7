//! Use case infrastructure shared by the account, role, access point and
//! role-access services.

pub mod change;
pub mod error;

pub use change::Change;
pub use error::UseCaseError;

pub type UseCaseResult<T> = Result<T, UseCaseError>;
