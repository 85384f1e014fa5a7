//! Role Access Service
//!
//! Grants are created and deleted by their (role, access point) pair.
//! Creating an existing pair is rejected; deleting a missing pair is a
//! not-found condition rather than a silent success.

use std::sync::Arc;

use tracing::info;

use crate::details;
use crate::role_access::entity::RoleAccess;
use crate::role_access::repository::RoleAccessRepository;
use crate::store::rollback;
use crate::usecase::{Change, UseCaseError, UseCaseResult};

pub struct RoleAccessService {
    repo: Arc<RoleAccessRepository>,
}

impl RoleAccessService {
    pub fn new(repo: Arc<RoleAccessRepository>) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> UseCaseResult<Vec<RoleAccess>> {
        self.repo
            .find_all()
            .await
            .map_err(|e| UseCaseError::storage("Failed to list role access grants", e))
    }

    pub async fn create(&self, grant: RoleAccess) -> UseCaseResult<Change<RoleAccess>> {
        grant.validate()?;

        let mut tx = self
            .repo
            .begin()
            .await
            .map_err(|e| UseCaseError::storage("Failed to begin transaction", e))?;

        match self.repo.exists_in(&mut tx, &grant).await {
            Ok(false) => {}
            Ok(true) => {
                rollback(tx).await;
                return Err(UseCaseError::validation_with_details(
                    "ROLE_ACCESS_EXISTS",
                    "Role access already exists",
                    details! { "roleId" => grant.role_id, "apId" => grant.ap_id },
                ));
            }
            Err(e) => {
                rollback(tx).await;
                return Err(UseCaseError::storage("Failed to check role access", e));
            }
        }

        if let Err(e) = self.repo.insert(&mut tx, &grant).await {
            rollback(tx).await;
            return Err(UseCaseError::storage("Failed to insert role access", e));
        }

        tx.commit()
            .await
            .map_err(|e| UseCaseError::storage("Failed to commit role access", e))?;

        info!(role_id = grant.role_id, ap_id = grant.ap_id, "Role access granted");
        Ok(Change::created(grant))
    }

    pub async fn delete(&self, grant: RoleAccess) -> UseCaseResult<Change<RoleAccess>> {
        grant.validate()?;

        let mut tx = self
            .repo
            .begin()
            .await
            .map_err(|e| UseCaseError::storage("Failed to begin transaction", e))?;

        let removed = match self.repo.delete(&mut tx, &grant).await {
            Ok(removed) => removed,
            Err(e) => {
                rollback(tx).await;
                return Err(UseCaseError::storage("Failed to delete role access", e));
            }
        };

        if removed == 0 {
            rollback(tx).await;
            return Err(UseCaseError::not_found_with_details(
                "ROLE_ACCESS_NOT_FOUND",
                "Role access is not found",
                details! { "roleId" => grant.role_id, "apId" => grant.ap_id },
            ));
        }

        tx.commit()
            .await
            .map_err(|e| UseCaseError::storage("Failed to commit role access deletion", e))?;

        info!(role_id = grant.role_id, ap_id = grant.ap_id, "Role access revoked");
        Ok(Change::deleted(grant))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test_support::memory_pool;

    async fn service() -> RoleAccessService {
        RoleAccessService::new(Arc::new(RoleAccessRepository::new(memory_pool().await)))
    }

    #[tokio::test]
    async fn test_delete_missing_pair_is_not_found() {
        let service = service().await;
        service.create(RoleAccess::new(1, 3)).await.unwrap();

        let err = service.delete(RoleAccess::new(1, 2)).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(service.list().await.unwrap(), vec![RoleAccess::new(1, 3)]);
    }

    #[tokio::test]
    async fn test_delete_existing_pair() {
        let service = service().await;
        service.create(RoleAccess::new(1, 3)).await.unwrap();

        let change = service.delete(RoleAccess::new(1, 3)).await.unwrap();
        assert_eq!(change.before, Some(RoleAccess::new(1, 3)));
        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_pair_is_rejected() {
        let service = service().await;
        service.create(RoleAccess::new(2, 5)).await.unwrap();

        let err = service.create(RoleAccess::new(2, 5)).await.unwrap_err();
        assert!(err.is_bad_input());
        assert_eq!(err.code(), "ROLE_ACCESS_EXISTS");
        assert_eq!(service.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_ids_are_required() {
        let service = service().await;
        assert!(service.create(RoleAccess::new(0, 1)).await.unwrap_err().is_bad_input());
        assert!(service.delete(RoleAccess::new(1, 0)).await.unwrap_err().is_bad_input());
    }
}
