//! Shared fixtures for the integration tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use common::AppResult;
use domain::{DomainError, HashCost, UniqueField, User};
use user_service_lib::repository::{
    ListOptions, SortField, SortOrder, UserFilter, UserRepository,
};
use user_service_lib::service::UserManager;
use user_service_lib::usecase::UserUseCase;

/// Vec-backed repository with the same soft delete rules and unique indexes
/// as the SQL store. Uniqueness spans soft-deleted rows.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
}

impl InMemoryUserRepository {
    fn live(&self) -> Vec<User> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.deleted_at.is_none())
            .cloned()
            .collect()
    }

    /// Mirrors the unique indexes on `email` and `username`.
    fn check_unique(users: &[User], user: &User) -> AppResult<()> {
        let others = || users.iter().filter(|u| u.id != user.id);
        if others().any(|u| u.email == user.email) {
            return Err(DomainError::UserAlreadyExists(UniqueField::Email).into());
        }
        if others().any(|u| u.username == user.username) {
            return Err(DomainError::UserAlreadyExists(UniqueField::Username).into());
        }
        Ok(())
    }

    /// Every row including soft-deleted ones.
    #[allow(dead_code)]
    pub fn all(&self) -> Vec<User> {
        self.users.lock().unwrap().clone()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: &User) -> AppResult<User> {
        let mut users = self.users.lock().unwrap();
        Self::check_unique(&users, user)?;
        users.push(user.clone());
        Ok(user.clone())
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.live().into_iter().find(|u| u.id == id))
    }

    async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self.live().into_iter().find(|u| u.email == email))
    }

    async fn get_by_username(&self, username: &str) -> AppResult<Option<User>> {
        Ok(self.live().into_iter().find(|u| u.username == username))
    }

    async fn update(&self, user: &User) -> AppResult<User> {
        let mut users = self.users.lock().unwrap();
        Self::check_unique(&users, user)?;
        let stored = users
            .iter_mut()
            .find(|u| u.id == user.id && u.deleted_at.is_none())
            .ok_or(DomainError::UserNotFound)?;

        let mut updated = user.clone();
        updated.created_at = stored.created_at;
        updated.updated_at = Utc::now();
        *stored = updated.clone();
        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let mut users = self.users.lock().unwrap();
        let stored = users
            .iter_mut()
            .find(|u| u.id == id && u.deleted_at.is_none())
            .ok_or(DomainError::UserNotFound)?;
        stored.deleted_at = Some(Utc::now());
        Ok(())
    }

    async fn list(&self, offset: u64, limit: u64) -> AppResult<Vec<User>> {
        self.list_with_options(&ListOptions {
            offset,
            limit,
            ..Default::default()
        })
        .await
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(self.live().len() as u64)
    }

    async fn exists(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.get_by_id(id).await?.is_some())
    }

    async fn exists_by_email(&self, email: &str) -> AppResult<bool> {
        Ok(self.get_by_email(email).await?.is_some())
    }

    async fn exists_by_username(&self, username: &str) -> AppResult<bool> {
        Ok(self.get_by_username(username).await?.is_some())
    }

    async fn list_with_options(&self, options: &ListOptions) -> AppResult<Vec<User>> {
        let mut users: Vec<User> = self
            .live()
            .into_iter()
            .filter(|u| options.filter.matches(u))
            .collect();

        users.sort_by(|a, b| {
            let ordering = match options.sort.field {
                SortField::CreatedAt => a.created_at.cmp(&b.created_at),
                SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
                SortField::Email => a.email.cmp(&b.email),
                SortField::Username => a.username.cmp(&b.username),
            };
            match options.sort.order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });

        Ok(users
            .into_iter()
            .skip(options.offset as usize)
            .take(options.limit as usize)
            .collect())
    }

    async fn count_with_filter(&self, filter: &UserFilter) -> AppResult<u64> {
        Ok(self.live().iter().filter(|u| filter.matches(u)).count() as u64)
    }
}

/// Use case wired to a fresh in-memory repository with a cheap hash cost.
pub fn use_case() -> (UserUseCase, Arc<InMemoryUserRepository>) {
    let repo = Arc::new(InMemoryUserRepository::default());
    let service = Arc::new(UserManager::new(repo.clone(), HashCost::minimal()));
    (UserUseCase::new(repo.clone(), service), repo)
}
