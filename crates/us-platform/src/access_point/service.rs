//! Access Point Service

use std::sync::Arc;

use tracing::info;

use crate::access_point::entity::{AccessPoint, AccessPointPayload};
use crate::access_point::repository::AccessPointRepository;
use crate::store::rollback;
use crate::usecase::{Change, UseCaseError, UseCaseResult};

pub struct AccessPointService {
    repo: Arc<AccessPointRepository>,
}

impl AccessPointService {
    pub fn new(repo: Arc<AccessPointRepository>) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> UseCaseResult<Vec<AccessPoint>> {
        self.repo
            .find_all()
            .await
            .map_err(|e| UseCaseError::storage("Failed to list access points", e))
    }

    pub async fn get(&self, id: i64) -> UseCaseResult<AccessPoint> {
        self.repo
            .find_by_id(id)
            .await
            .map_err(|e| UseCaseError::storage("Failed to fetch access point", e))?
            .ok_or_else(|| not_found(id))
    }

    pub async fn create(&self, payload: AccessPointPayload) -> UseCaseResult<Change<AccessPoint>> {
        payload.validate()?;

        let mut tx = self
            .repo
            .begin()
            .await
            .map_err(|e| UseCaseError::storage("Failed to begin transaction", e))?;

        let access_point = match self.repo.insert(&mut tx, &payload).await {
            Ok(ap) => ap,
            Err(e) => {
                rollback(tx).await;
                return Err(UseCaseError::storage("Failed to insert access point", e));
            }
        };

        tx.commit()
            .await
            .map_err(|e| UseCaseError::storage("Failed to commit access point", e))?;

        info!(access_point_id = access_point.id, "Access point created");
        Ok(Change::created(access_point))
    }

    pub async fn update(&self, id: i64, payload: AccessPointPayload) -> UseCaseResult<Change<AccessPoint>> {
        payload.validate()?;

        let mut tx = self
            .repo
            .begin()
            .await
            .map_err(|e| UseCaseError::storage("Failed to begin transaction", e))?;

        let existing = match self.repo.find_by_id_in(&mut tx, id).await {
            Ok(Some(ap)) => ap,
            Ok(None) => {
                rollback(tx).await;
                return Err(not_found(id));
            }
            Err(e) => {
                rollback(tx).await;
                return Err(UseCaseError::storage("Failed to fetch access point", e));
            }
        };

        let updated = AccessPoint {
            id,
            name: payload.name.trim().to_string(),
            endpoint: payload.endpoint.trim().to_string(),
        };
        if let Err(e) = self.repo.update(&mut tx, &updated).await {
            rollback(tx).await;
            return Err(UseCaseError::storage("Failed to update access point", e));
        }

        tx.commit()
            .await
            .map_err(|e| UseCaseError::storage("Failed to commit access point", e))?;

        info!(access_point_id = id, "Access point updated");
        Ok(Change::updated(existing, updated))
    }

    pub async fn delete(&self, id: i64) -> UseCaseResult<Change<AccessPoint>> {
        let mut tx = self
            .repo
            .begin()
            .await
            .map_err(|e| UseCaseError::storage("Failed to begin transaction", e))?;

        let existing = match self.repo.find_by_id_in(&mut tx, id).await {
            Ok(Some(ap)) => ap,
            Ok(None) => {
                rollback(tx).await;
                return Err(not_found(id));
            }
            Err(e) => {
                rollback(tx).await;
                return Err(UseCaseError::storage("Failed to fetch access point", e));
            }
        };

        if let Err(e) = self.repo.delete(&mut tx, id).await {
            rollback(tx).await;
            return Err(UseCaseError::storage("Failed to delete access point", e));
        }

        tx.commit()
            .await
            .map_err(|e| UseCaseError::storage("Failed to commit access point deletion", e))?;

        info!(access_point_id = id, "Access point deleted");
        Ok(Change::deleted(existing))
    }
}

fn not_found(id: i64) -> UseCaseError {
    UseCaseError::not_found(
        "ACCESS_POINT_NOT_FOUND",
        format!("Access point not found with id {}", id),
    )
}
