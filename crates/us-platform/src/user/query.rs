//! Account Query Service
//!
//! Read-only access to accounts: filtered listing, lookup by id, offset
//! pagination and role-set membership.

use std::sync::Arc;

use tracing::debug;

use crate::usecase::{UseCaseError, UseCaseResult};
use crate::user::entity::User;
use crate::user::filter::{UserCriteria, UserFilter};
use crate::user::repository::UserRepository;

pub struct AccountQueryService {
    repo: Arc<UserRepository>,
}

impl AccountQueryService {
    pub fn new(repo: Arc<UserRepository>) -> Self {
        Self { repo }
    }

    /// Accounts matching every supplied criterion. See [`UserFilter`] for how
    /// the role criterion is interpreted.
    pub async fn list(&self, criteria: &UserCriteria) -> UseCaseResult<Vec<User>> {
        let filter = UserFilter::from_criteria(criteria);
        let users = self
            .repo
            .find(&filter)
            .await
            .map_err(|e| UseCaseError::storage("Failed to list users", e))?;
        debug!(count = users.len(), "Listed users");
        Ok(users)
    }

    pub async fn get_by_id(&self, id: &str) -> UseCaseResult<User> {
        let id = id.trim();
        if id.is_empty() {
            return Err(UseCaseError::bad_input("USER_ID_REQUIRED", "User ID cannot be empty"));
        }

        self.repo
            .find_by_id(id)
            .await
            .map_err(|e| UseCaseError::storage("Failed to fetch user", e))?
            .ok_or_else(|| UseCaseError::not_found("USER_NOT_FOUND", format!("User not found with id {}", id)))
    }

    /// Page `page` (1-based) of `size` records in storage order. A page past
    /// the end is empty.
    pub async fn paginate(&self, page: u32, size: u32) -> UseCaseResult<Vec<User>> {
        if page == 0 || size == 0 {
            return Err(UseCaseError::bad_input(
                "PAGINATION_INVALID",
                "page and size must be positive integers",
            ));
        }

        let offset = (i64::from(page) - 1) * i64::from(size);
        self.repo
            .find_page(offset, i64::from(size))
            .await
            .map_err(|e| UseCaseError::storage("Failed to fetch page of users", e))
    }

    /// Accounts whose role is in `roles`. Accounts without a role never match.
    pub async fn list_by_roles(&self, roles: &[i64]) -> UseCaseResult<Vec<User>> {
        if roles.is_empty() {
            return Ok(Vec::new());
        }

        self.repo
            .find(&UserFilter::roles(roles))
            .await
            .map_err(|e| UseCaseError::storage("Failed to list users by role", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test_support::memory_pool;
    use crate::user::entity::UserPayload;

    async fn seeded(users: &[(&str, &str, &str, Option<i64>)]) -> (AccountQueryService, Vec<User>) {
        let repo = Arc::new(UserRepository::new(memory_pool().await));
        let mut stored = Vec::new();
        for (first, last, email, role) in users {
            let mut payload = UserPayload::new(*first, *last, *email);
            payload.role = *role;
            let user = User::new(payload);
            let mut tx = repo.begin().await.unwrap();
            repo.insert(&mut tx, &user).await.unwrap();
            tx.commit().await.unwrap();
            stored.push(user);
        }
        (AccountQueryService::new(repo), stored)
    }

    #[tokio::test]
    async fn test_role_zero_returns_only_unassigned() {
        let (service, _) = seeded(&[
            ("Ann", "Null", "ann@example.com", None),
            ("Bob", "Two", "bob@example.com", Some(2)),
            ("Cid", "Null", "cid@example.com", None),
        ])
        .await;

        let criteria = UserCriteria { role: Some(0), ..Default::default() };
        let users = service.list(&criteria).await.unwrap();
        assert_eq!(users.len(), 2);
        assert!(users.iter().all(|u| u.role.is_none()));

        let users = service.list(&UserCriteria::default()).await.unwrap();
        assert_eq!(users.len(), 2);
    }

    #[tokio::test]
    async fn test_exact_role_with_name_prefix() {
        let (service, _) = seeded(&[
            ("Jo", "Smith", "jo@example.com", Some(3)),
            ("Al", "Jones", "al@example.com", Some(3)),
            ("Jo", "Brown", "jb@example.com", Some(2)),
            ("Max", "Other", "max@example.com", Some(3)),
        ])
        .await;

        let criteria = UserCriteria {
            role: Some(3),
            name: Some("Jo".to_string()),
            ..Default::default()
        };
        let mut names: Vec<String> = service
            .list(&criteria)
            .await
            .unwrap()
            .into_iter()
            .map(|u| format!("{} {}", u.first_name, u.last_name))
            .collect();
        names.sort();
        assert_eq!(names, vec!["Al Jones".to_string(), "Jo Smith".to_string()]);
    }

    #[tokio::test]
    async fn test_any_role_and_prefixes() {
        let (service, stored) = seeded(&[
            ("Ann", "A", "ann@corp.io", None),
            ("Ben", "B", "ben@corp.io", Some(1)),
            ("Cal", "C", "cal@home.net", Some(2)),
        ])
        .await;

        let all = UserCriteria { role: Some(-1), ..Default::default() };
        assert_eq!(service.list(&all).await.unwrap().len(), 3);

        let by_email = UserCriteria {
            role: Some(-1),
            email: Some("ben@".to_string()),
            ..Default::default()
        };
        assert_eq!(service.list(&by_email).await.unwrap(), vec![stored[1].clone()]);

        let id_prefix = stored[2].id[..8].to_string();
        let by_id = UserCriteria { role: Some(-1), id: Some(id_prefix), ..Default::default() };
        assert_eq!(service.list(&by_id).await.unwrap(), vec![stored[2].clone()]);
    }

    #[tokio::test]
    async fn test_wildcards_match_literally() {
        let (service, _) = seeded(&[
            ("A_b", "X", "x@example.com", None),
            ("Acb", "Y", "y@example.com", None),
        ])
        .await;

        let criteria = UserCriteria { name: Some("A_".to_string()), ..Default::default() };
        let users = service.list(&criteria).await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].first_name, "A_b");
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let (service, stored) = seeded(&[("Ann", "A", "ann@corp.io", None)]).await;

        assert_eq!(service.get_by_id(&stored[0].id).await.unwrap(), stored[0]);
        assert!(service.get_by_id("").await.unwrap_err().is_bad_input());
        assert!(service.get_by_id("missing").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_paginate_windows() {
        let rows: Vec<(String, String)> = (0..25)
            .map(|i| (format!("User{:02}", i), format!("user{:02}@example.com", i)))
            .collect();
        let fixtures: Vec<(&str, &str, &str, Option<i64>)> = rows
            .iter()
            .map(|(name, email)| (name.as_str(), "Paged", email.as_str(), None))
            .collect();
        let (service, stored) = seeded(&fixtures).await;

        let page = service.paginate(2, 10).await.unwrap();
        assert_eq!(page, stored[10..20].to_vec());
        assert_eq!(service.paginate(3, 10).await.unwrap().len(), 5);
        assert!(service.paginate(4, 10).await.unwrap().is_empty());
        assert!(service.paginate(0, 10).await.unwrap_err().is_bad_input());
    }

    #[tokio::test]
    async fn test_list_by_roles() {
        let (service, _) = seeded(&[
            ("Ann", "A", "ann@corp.io", None),
            ("Ben", "B", "ben@corp.io", Some(1)),
            ("Cal", "C", "cal@corp.io", Some(2)),
            ("Dee", "D", "dee@corp.io", Some(3)),
        ])
        .await;

        let users = service.list_by_roles(&[1, 3]).await.unwrap();
        let mut roles: Vec<i64> = users.iter().filter_map(|u| u.role).collect();
        roles.sort();
        assert_eq!(roles, vec![1, 3]);
        assert!(service.list_by_roles(&[]).await.unwrap().is_empty());
        assert!(service.list_by_roles(&[9]).await.unwrap().is_empty());
    }
}
