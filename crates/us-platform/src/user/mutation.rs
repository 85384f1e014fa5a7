//! Account Mutation Service
//!
//! Create, update and delete run inside one store transaction each. After a
//! successful commit of an update or delete the account's cache entry is
//! evicted; a failed eviction is logged and does not affect the result.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::cache::{CacheInvalidator, EvictionOutcome};
use crate::store::rollback;
use crate::usecase::{Change, UseCaseError, UseCaseResult};
use crate::user::entity::{User, UserPayload};
use crate::user::repository::UserRepository;

pub struct AccountMutationService {
    repo: Arc<UserRepository>,
    cache: Arc<dyn CacheInvalidator>,
}

impl AccountMutationService {
    pub fn new(repo: Arc<UserRepository>, cache: Arc<dyn CacheInvalidator>) -> Self {
        Self { repo, cache }
    }

    pub async fn create(&self, payload: UserPayload) -> UseCaseResult<Change<User>> {
        payload.validate()?;
        let user = User::new(payload);

        let mut tx = self
            .repo
            .begin()
            .await
            .map_err(|e| UseCaseError::storage("Failed to begin transaction", e))?;

        if let Err(e) = self.repo.insert(&mut tx, &user).await {
            rollback(tx).await;
            return Err(UseCaseError::storage("Failed to insert user", e));
        }

        tx.commit()
            .await
            .map_err(|e| UseCaseError::storage("Failed to commit user", e))?;

        info!(user_id = %user.id, "User created");
        Ok(Change::created(user))
    }

    /// Replace the account's fields. The identifier is taken from `id`, never
    /// from the payload, and an absent role keeps the stored one.
    pub async fn update(&self, id: &str, payload: UserPayload) -> UseCaseResult<Change<User>> {
        let id = require_id(id)?;
        payload.validate()?;

        let mut tx = self
            .repo
            .begin()
            .await
            .map_err(|e| UseCaseError::storage("Failed to begin transaction", e))?;

        let existing = match self.repo.find_by_id_in(&mut tx, id).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                rollback(tx).await;
                return Err(not_found(id));
            }
            Err(e) => {
                rollback(tx).await;
                return Err(UseCaseError::storage("Failed to fetch user", e));
            }
        };

        let updated = existing.merged(payload);
        if let Err(e) = self.repo.update(&mut tx, &updated).await {
            rollback(tx).await;
            return Err(UseCaseError::storage("Failed to update user", e));
        }

        tx.commit()
            .await
            .map_err(|e| UseCaseError::storage("Failed to commit user", e))?;

        info!(user_id = %id, "User updated");
        self.evict(id).await;
        Ok(Change::updated(existing, updated))
    }

    pub async fn delete(&self, id: &str) -> UseCaseResult<Change<User>> {
        let id = require_id(id)?;

        let mut tx = self
            .repo
            .begin()
            .await
            .map_err(|e| UseCaseError::storage("Failed to begin transaction", e))?;

        let existing = match self.repo.find_by_id_in(&mut tx, id).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                rollback(tx).await;
                return Err(not_found(id));
            }
            Err(e) => {
                rollback(tx).await;
                return Err(UseCaseError::storage("Failed to fetch user", e));
            }
        };

        if let Err(e) = self.repo.delete(&mut tx, id).await {
            rollback(tx).await;
            return Err(UseCaseError::storage("Failed to delete user", e));
        }

        tx.commit()
            .await
            .map_err(|e| UseCaseError::storage("Failed to commit user deletion", e))?;

        info!(user_id = %id, "User deleted");
        self.evict(id).await;
        Ok(Change::deleted(existing))
    }

    async fn evict(&self, id: &str) {
        match self.cache.evict(id).await {
            EvictionOutcome::Evicted { removed } => debug!(user_id = %id, removed, "Cache entry evicted"),
            EvictionOutcome::Failed(e) => {
                warn!(user_id = %id, error = %e, "Cache eviction failed, entry may be stale")
            }
        }
    }
}

fn require_id(id: &str) -> UseCaseResult<&str> {
    let id = id.trim();
    if id.is_empty() {
        return Err(UseCaseError::bad_input("USER_ID_REQUIRED", "User ID cannot be empty"));
    }
    Ok(id)
}

fn not_found(id: &str) -> UseCaseError {
    UseCaseError::not_found("USER_NOT_FOUND", format!("User not found with id {}", id))
}
