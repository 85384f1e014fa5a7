//! Role Service
//!
//! CRUD over roles. Each mutation runs in its own transaction. Roles are
//! not cached, so nothing is evicted.

use std::sync::Arc;

use tracing::info;

use crate::role::entity::{Role, RolePayload};
use crate::role::repository::RoleRepository;
use crate::store::rollback;
use crate::usecase::{Change, UseCaseError, UseCaseResult};

pub struct RoleService {
    repo: Arc<RoleRepository>,
}

impl RoleService {
    pub fn new(repo: Arc<RoleRepository>) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> UseCaseResult<Vec<Role>> {
        self.repo
            .find_all()
            .await
            .map_err(|e| UseCaseError::storage("Failed to list roles", e))
    }

    pub async fn get(&self, id: i64) -> UseCaseResult<Role> {
        self.repo
            .find_by_id(id)
            .await
            .map_err(|e| UseCaseError::storage("Failed to fetch role", e))?
            .ok_or_else(|| not_found(id))
    }

    pub async fn create(&self, payload: RolePayload) -> UseCaseResult<Change<Role>> {
        payload.validate()?;

        let mut tx = self
            .repo
            .begin()
            .await
            .map_err(|e| UseCaseError::storage("Failed to begin transaction", e))?;

        let role = match self.repo.insert(&mut tx, payload.name.trim()).await {
            Ok(role) => role,
            Err(e) => {
                rollback(tx).await;
                return Err(UseCaseError::storage("Failed to insert role", e));
            }
        };

        tx.commit()
            .await
            .map_err(|e| UseCaseError::storage("Failed to commit role", e))?;

        info!(role_id = role.id, "Role created");
        Ok(Change::created(role))
    }

    pub async fn update(&self, id: i64, payload: RolePayload) -> UseCaseResult<Change<Role>> {
        payload.validate()?;

        let mut tx = self
            .repo
            .begin()
            .await
            .map_err(|e| UseCaseError::storage("Failed to begin transaction", e))?;

        let existing = match self.repo.find_by_id_in(&mut tx, id).await {
            Ok(Some(role)) => role,
            Ok(None) => {
                rollback(tx).await;
                return Err(not_found(id));
            }
            Err(e) => {
                rollback(tx).await;
                return Err(UseCaseError::storage("Failed to fetch role", e));
            }
        };

        let updated = Role {
            id,
            name: payload.name.trim().to_string(),
        };
        if let Err(e) = self.repo.update(&mut tx, &updated).await {
            rollback(tx).await;
            return Err(UseCaseError::storage("Failed to update role", e));
        }

        tx.commit()
            .await
            .map_err(|e| UseCaseError::storage("Failed to commit role", e))?;

        info!(role_id = id, "Role updated");
        Ok(Change::updated(existing, updated))
    }

    pub async fn delete(&self, id: i64) -> UseCaseResult<Change<Role>> {
        let mut tx = self
            .repo
            .begin()
            .await
            .map_err(|e| UseCaseError::storage("Failed to begin transaction", e))?;

        let existing = match self.repo.find_by_id_in(&mut tx, id).await {
            Ok(Some(role)) => role,
            Ok(None) => {
                rollback(tx).await;
                return Err(not_found(id));
            }
            Err(e) => {
                rollback(tx).await;
                return Err(UseCaseError::storage("Failed to fetch role", e));
            }
        };

        if let Err(e) = self.repo.delete(&mut tx, id).await {
            rollback(tx).await;
            return Err(UseCaseError::storage("Failed to delete role", e));
        }

        tx.commit()
            .await
            .map_err(|e| UseCaseError::storage("Failed to commit role deletion", e))?;

        info!(role_id = id, "Role deleted");
        Ok(Change::deleted(existing))
    }
}

fn not_found(id: i64) -> UseCaseError {
    UseCaseError::not_found("ROLE_NOT_FOUND", format!("Role not found with id {}", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test_support::memory_pool;

    async fn service() -> RoleService {
        RoleService::new(Arc::new(RoleRepository::new(memory_pool().await)))
    }

    #[tokio::test]
    async fn test_create_assigns_increasing_ids() {
        let service = service().await;
        let admin = service.create(RolePayload::new("admin")).await.unwrap().after.unwrap();
        let viewer = service.create(RolePayload::new("viewer")).await.unwrap().after.unwrap();

        assert!(viewer.id > admin.id);
        assert_eq!(service.get(admin.id).await.unwrap(), admin);
        assert_eq!(service.list().await.unwrap(), vec![admin, viewer]);
    }

    #[tokio::test]
    async fn test_create_requires_name() {
        let err = service().await.create(RolePayload::new("  ")).await.unwrap_err();
        assert!(err.is_bad_input());
    }

    #[tokio::test]
    async fn test_update_returns_before_and_after() {
        let service = service().await;
        let role = service.create(RolePayload::new("admin")).await.unwrap().after.unwrap();

        let change = service.update(role.id, RolePayload::new("owner")).await.unwrap();
        assert_eq!(change.before, Some(role.clone()));
        assert_eq!(change.after.as_ref().map(|r| r.name.as_str()), Some("owner"));
        assert_eq!(service.get(role.id).await.unwrap().name, "owner");

        assert!(service.update(999, RolePayload::new("x")).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_delete_removes_role() {
        let service = service().await;
        let role = service.create(RolePayload::new("admin")).await.unwrap().after.unwrap();

        let change = service.delete(role.id).await.unwrap();
        assert_eq!(change.before, Some(role.clone()));
        assert!(service.get(role.id).await.unwrap_err().is_not_found());
        assert!(service.delete(role.id).await.unwrap_err().is_not_found());
    }
}
