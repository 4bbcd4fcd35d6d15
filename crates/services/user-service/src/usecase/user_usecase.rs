//! User use cases: orchestration between the transport and the domain.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use common::{AppError, AppResult, OptionExt};
use domain::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE};

use super::dto::{
    AuthenticateDto, ChangePasswordDto, CreateUserDto, FilterDto, ListUsersDto, SearchUsersDto,
    UpdateUserDto, UserDto,
};
use crate::repository::{ListOptions, UserFilter, UserRepository, UserSort};
use crate::service::UserService;

/// Application-level entry points for user management.
#[derive(Clone)]
pub struct UserUseCase {
    repo: Arc<dyn UserRepository>,
    service: Arc<dyn UserService>,
}

fn parse_id(id: &str) -> AppResult<Uuid> {
    Uuid::parse_str(id).map_err(|_| AppError::invalid_argument("invalid user ID"))
}

impl UserUseCase {
    pub fn new(repo: Arc<dyn UserRepository>, service: Arc<dyn UserService>) -> Self {
        Self { repo, service }
    }

    pub async fn create_user(&self, dto: CreateUserDto) -> AppResult<UserDto> {
        let mut user = dto.to_entity();
        self.service.create_user(&mut user, &dto.password).await?;
        Ok(UserDto::from(user))
    }

    pub async fn get_user(&self, id: &str) -> AppResult<UserDto> {
        let id = parse_id(id)?;
        let user = self.repo.get_by_id(id).await?.ok_or_not_found()?;
        Ok(UserDto::from(user))
    }

    /// One page of users, newest first.
    ///
    /// `page` below 1 becomes 1 and `page_size` below 1 becomes the default.
    pub async fn list_users(
        &self,
        page: i64,
        page_size: i64,
        filter: Option<FilterDto>,
    ) -> AppResult<ListUsersDto> {
        let page = u64::try_from(page).ok().filter(|p| *p >= 1).unwrap_or(DEFAULT_PAGE);
        let page_size = u64::try_from(page_size)
            .ok()
            .filter(|s| *s >= 1)
            .unwrap_or(DEFAULT_PAGE_SIZE);

        let filter = filter
            .map(|f| UserFilter {
                email: f.email,
                username: f.username,
                is_active: f.is_active,
                is_admin: f.is_admin,
            })
            .unwrap_or_default();

        let options = ListOptions {
            offset: (page - 1) * page_size,
            limit: page_size,
            filter,
            sort: UserSort::default(),
        };

        let users = self.repo.list_with_options(&options).await?;
        let total_items = self.repo.count_with_filter(&options.filter).await?;

        Ok(ListUsersDto {
            users: users.iter().map(UserDto::from).collect(),
            page,
            page_size,
            total_items,
            total_pages: total_items.div_ceil(page_size),
        })
    }

    /// Apply the changes, then return the reloaded user.
    pub async fn update_user(&self, dto: UpdateUserDto) -> AppResult<UserDto> {
        self.service.update_user(dto.id, &dto.changes).await?;
        let user = self.repo.get_by_id(dto.id).await?.ok_or_not_found()?;
        Ok(UserDto::from(user))
    }

    /// Soft delete. `hard_delete` is accepted but the repository only soft deletes.
    pub async fn delete_user(&self, id: &str, hard_delete: bool) -> AppResult<()> {
        let user_id = parse_id(id)?;
        if hard_delete {
            debug!(user_id = %user_id, "Hard delete requested, performing soft delete");
        }

        if !self.repo.exists(user_id).await? {
            return Err(domain::DomainError::UserNotFound.into());
        }

        self.repo.delete(user_id).await?;
        info!(user_id = %user_id, "User deleted");
        Ok(())
    }

    /// Look up each id independently. Ids that are malformed, missing or fail
    /// to load are reported in the second element, in request order.
    pub async fn batch_get_users(
        &self,
        ids: &[String],
    ) -> AppResult<(HashMap<String, UserDto>, Vec<String>)> {
        let mut users = HashMap::new();
        let mut not_found = Vec::new();

        for id in ids {
            let Ok(user_id) = Uuid::parse_str(id) else {
                not_found.push(id.clone());
                continue;
            };

            match self.repo.get_by_id(user_id).await {
                Ok(Some(user)) => {
                    users.insert(id.clone(), UserDto::from(user));
                }
                Ok(None) => not_found.push(id.clone()),
                Err(err) => {
                    debug!(user_id = %user_id, error = %err, "Batch lookup failed");
                    not_found.push(id.clone());
                }
            }
        }

        Ok((users, not_found))
    }

    /// Listing with the query matched against email only.
    pub async fn search_users(&self, dto: SearchUsersDto) -> AppResult<ListUsersDto> {
        let mut filter = dto.filter.unwrap_or_default();
        if !dto.query.is_empty() {
            filter.email = Some(dto.query);
        }
        self.list_users(dto.page, dto.page_size, Some(filter)).await
    }

    pub async fn change_password(&self, dto: ChangePasswordDto) -> AppResult<()> {
        self.service
            .change_password(dto.user_id, &dto.old_password, &dto.new_password)
            .await
    }

    pub async fn authenticate_user(&self, dto: AuthenticateDto) -> AppResult<UserDto> {
        let user = self
            .service
            .authenticate(&dto.identifier, &dto.password)
            .await?;
        Ok(UserDto::from(user))
    }
}
