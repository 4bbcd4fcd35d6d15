//! Data carried between the transport adapters and the use cases.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use domain::{User, UserChanges};

/// New user request.
#[derive(Debug, Clone)]
pub struct CreateUserDto {
    pub email: String,
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub is_admin: bool,
}

impl CreateUserDto {
    /// Entity skeleton to hand to the domain service (no credential yet).
    pub fn to_entity(&self) -> User {
        let mut user = User::new(
            self.email.clone(),
            self.username.clone(),
            self.first_name.clone(),
            self.last_name.clone(),
        );
        user.is_active = self.is_active;
        user.is_admin = self.is_admin;
        user
    }
}

#[derive(Debug, Clone)]
pub struct UpdateUserDto {
    pub id: Uuid,
    pub changes: UserChanges,
}

/// Outward view of a user. Never carries the credential.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserDto {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub is_active: bool,
    pub is_admin: bool,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<&User> for UserDto {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            full_name: user.full_name(),
            is_active: user.is_active,
            is_admin: user.is_admin,
            status: user.status().to_string(),
            created_at: user.created_at,
            updated_at: user.updated_at,
            deleted_at: user.deleted_at,
        }
    }
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self::from(&user)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListUsersDto {
    pub users: Vec<UserDto>,
    pub page: u64,
    pub page_size: u64,
    pub total_items: u64,
    pub total_pages: u64,
}

impl ListUsersDto {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}

/// Listing constraints as received from the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterDto {
    pub email: Option<String>,
    pub username: Option<String>,
    pub is_active: Option<bool>,
    pub is_admin: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct SearchUsersDto {
    pub query: String,
    pub page: i64,
    pub page_size: i64,
    pub filter: Option<FilterDto>,
}

#[derive(Debug, Clone)]
pub struct ChangePasswordDto {
    pub user_id: Uuid,
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug, Clone)]
pub struct AuthenticateDto {
    /// Email or username
    pub identifier: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_dto_derives_presentation_fields() {
        let mut user = User::new("ada@example.com", "ada_l", "", "");
        user.password_hash = "$argon2id$secret".to_string();
        let dto = UserDto::from(&user);

        assert_eq!(dto.full_name, "ada_l");
        assert_eq!(dto.status, "active");

        let json = serde_json::to_value(&dto).unwrap();
        assert!(json.get("password_hash").is_none());
    }

    #[test]
    fn test_create_dto_carries_flags() {
        let dto = CreateUserDto {
            email: "a@b.co".into(),
            username: "abc".into(),
            password: "password1".into(),
            first_name: "A".into(),
            last_name: String::new(),
            is_active: false,
            is_admin: true,
        };
        let user = dto.to_entity();
        assert!(!user.is_active);
        assert!(user.is_admin);
        assert!(user.password_hash.is_empty());
    }

    #[test]
    fn test_page_navigation() {
        let page = ListUsersDto {
            users: vec![],
            page: 2,
            page_size: 10,
            total_items: 25,
            total_pages: 3,
        };
        assert!(page.has_next());
        assert!(page.has_previous());
    }
}
