//! User repository implementation with soft delete support.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveValue::{NotSet, Set, Unchanged},
    ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Select, SqlErr,
};
use uuid::Uuid;

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use super::query::{ListOptions, SortField, SortOrder, UserFilter};
use common::{AppError, AppResult};
use domain::{DomainError, UniqueField, User};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
///
/// Every query excludes soft-deleted records.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user and return the stored row
    async fn create(&self, user: &User) -> AppResult<User>;

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    async fn get_by_email(&self, email: &str) -> AppResult<Option<User>>;

    async fn get_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// Persist all mutable fields of `user`
    async fn update(&self, user: &User) -> AppResult<User>;

    /// Soft delete user by ID (sets deleted_at timestamp)
    async fn delete(&self, id: Uuid) -> AppResult<()>;

    async fn list(&self, offset: u64, limit: u64) -> AppResult<Vec<User>>;

    async fn count(&self) -> AppResult<u64>;

    async fn exists(&self, id: Uuid) -> AppResult<bool>;

    async fn exists_by_email(&self, email: &str) -> AppResult<bool>;

    async fn exists_by_username(&self, username: &str) -> AppResult<bool>;

    /// Filtered, sorted page of users
    async fn list_with_options(&self, options: &ListOptions) -> AppResult<Vec<User>>;

    /// Number of users matching `filter`
    async fn count_with_filter(&self, filter: &UserFilter) -> AppResult<u64>;
}

/// Concrete implementation of UserRepository with soft delete
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Permanently remove every user, soft-deleted ones included.
    ///
    /// Maintenance path for seeding; not part of the repository contract.
    pub async fn purge(&self) -> AppResult<u64> {
        let result = UserEntity::delete_many().exec(&self.db).await?;
        Ok(result.rows_affected)
    }

    fn live() -> Select<UserEntity> {
        UserEntity::find().filter(user::Column::DeletedAt.is_null())
    }

    fn filtered(filter: &UserFilter) -> Select<UserEntity> {
        let mut condition = Condition::all();
        if let Some(email) = filter.email.as_deref() {
            condition = condition.add(user::Column::Email.contains(email));
        }
        if let Some(username) = filter.username.as_deref() {
            condition = condition.add(user::Column::Username.contains(username));
        }
        if let Some(active) = filter.is_active {
            condition = condition.add(user::Column::IsActive.eq(active));
        }
        if let Some(admin) = filter.is_admin {
            condition = condition.add(user::Column::IsAdmin.eq(admin));
        }
        Self::live().filter(condition)
    }
}

fn sort_column(field: SortField) -> user::Column {
    match field {
        SortField::CreatedAt => user::Column::CreatedAt,
        SortField::UpdatedAt => user::Column::UpdatedAt,
        SortField::Email => user::Column::Email,
        SortField::Username => user::Column::Username,
    }
}

/// Unique index violations surface as the domain conflict they stand for.
///
/// The unique indexes cover soft-deleted rows too, so they also reject
/// reuse of a deleted user's email or username.
fn map_write_error(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            DomainError::UserAlreadyExists(violated_field(&detail)).into()
        }
        _ => AppError::from(err),
    }
}

/// Which identity column a unique violation message names.
fn violated_field(detail: &str) -> UniqueField {
    if detail.contains("username") {
        UniqueField::Username
    } else {
        UniqueField::Email
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn create(&self, user: &User) -> AppResult<User> {
        let now = Utc::now();
        let id = if user.id.is_nil() { Uuid::new_v4() } else { user.id };

        let active_model = ActiveModel {
            id: Set(id),
            email: Set(user.email.clone()),
            username: Set(user.username.clone()),
            first_name: Set(user.first_name.clone()),
            last_name: Set(user.last_name.clone()),
            password_hash: Set(user.password_hash.clone()),
            is_active: Set(user.is_active),
            is_admin: Set(user.is_admin),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        };

        let model = UserEntity::insert(active_model)
            .exec_with_returning(&self.db)
            .await
            .map_err(map_write_error)?;
        Ok(User::from(model))
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let result = Self::live()
            .filter(user::Column::Id.eq(id))
            .one(&self.db)
            .await?;

        Ok(result.map(User::from))
    }

    async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let result = Self::live()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?;

        Ok(result.map(User::from))
    }

    async fn get_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let result = Self::live()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await?;

        Ok(result.map(User::from))
    }

    async fn update(&self, user: &User) -> AppResult<User> {
        let active = ActiveModel {
            id: Unchanged(user.id),
            email: Set(user.email.clone()),
            username: Set(user.username.clone()),
            first_name: Set(user.first_name.clone()),
            last_name: Set(user.last_name.clone()),
            password_hash: Set(user.password_hash.clone()),
            is_active: Set(user.is_active),
            is_admin: Set(user.is_admin),
            created_at: NotSet,
            updated_at: Set(Utc::now()),
            deleted_at: NotSet,
        };

        // Only live rows can be updated
        let model = UserEntity::update(active)
            .filter(user::Column::DeletedAt.is_null())
            .exec(&self.db)
            .await
            .map_err(|err| match err {
                DbErr::RecordNotUpdated => DomainError::UserNotFound.into(),
                other => map_write_error(other),
            })?;
        Ok(User::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        // Soft delete: set deleted_at timestamp
        let now = Utc::now();
        let result = UserEntity::update_many()
            .col_expr(user::Column::DeletedAt, Expr::value(now))
            .col_expr(user::Column::UpdatedAt, Expr::value(now))
            .filter(user::Column::Id.eq(id))
            .filter(user::Column::DeletedAt.is_null())
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(DomainError::UserNotFound.into());
        }

        Ok(())
    }

    async fn list(&self, offset: u64, limit: u64) -> AppResult<Vec<User>> {
        let models = Self::live()
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(User::from).collect())
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(Self::live().count(&self.db).await?)
    }

    async fn exists(&self, id: Uuid) -> AppResult<bool> {
        let count = Self::live()
            .filter(user::Column::Id.eq(id))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    async fn exists_by_email(&self, email: &str) -> AppResult<bool> {
        let count = Self::live()
            .filter(user::Column::Email.eq(email))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    async fn exists_by_username(&self, username: &str) -> AppResult<bool> {
        let count = Self::live()
            .filter(user::Column::Username.eq(username))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    async fn list_with_options(&self, options: &ListOptions) -> AppResult<Vec<User>> {
        let order = match options.sort.order {
            SortOrder::Asc => Order::Asc,
            SortOrder::Desc => Order::Desc,
        };

        let models = Self::filtered(&options.filter)
            .order_by(sort_column(options.sort.field), order)
            .offset(options.offset)
            .limit(options.limit)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(User::from).collect())
    }

    async fn count_with_filter(&self, filter: &UserFilter) -> AppResult<u64> {
        Ok(Self::filtered(filter).count(&self.db).await?)
    }
}
