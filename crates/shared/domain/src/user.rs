//! User aggregate root and derived status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{MIN_PASSWORD_LENGTH, STATUS_ACTIVE, STATUS_INACTIVE, STATUS_SUSPENDED};
use crate::error::{DomainError, DomainResult};

/// Derived account status (computed, never stored).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Inactive,
    Suspended,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => STATUS_ACTIVE,
            UserStatus::Inactive => STATUS_INACTIVE,
            UserStatus::Suspended => STATUS_SUSPENDED,
        }
    }
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User domain entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_active: bool,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Soft delete timestamp (None = live row, Some = deleted)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    /// Create a new, active, non-admin user with a fresh id and no credential.
    pub fn new(
        email: impl Into<String>,
        username: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            username: username.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            password_hash: String::new(),
            is_active: true,
            is_admin: false,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Derived status: inactive wins over suspended.
    pub fn status(&self) -> UserStatus {
        if !self.is_active {
            UserStatus::Inactive
        } else if self.deleted_at.is_some() {
            UserStatus::Suspended
        } else {
            UserStatus::Active
        }
    }

    /// Display name, or the username when no name parts are set.
    pub fn full_name(&self) -> String {
        match (self.first_name.is_empty(), self.last_name.is_empty()) {
            (true, true) => self.username.clone(),
            (false, true) => self.first_name.clone(),
            (true, false) => self.last_name.clone(),
            (false, false) => format!("{} {}", self.first_name, self.last_name),
        }
    }

    /// Raw entity validation.
    ///
    /// Only checks presence of email/username and that the stored credential
    /// field holds at least 8 characters; format rules live in the value objects.
    pub fn validate(&self) -> DomainResult<()> {
        if self.email.is_empty() {
            return Err(DomainError::InvalidEmail("email is required".to_string()));
        }
        if self.username.is_empty() {
            return Err(DomainError::InvalidUsername("username is required".to_string()));
        }
        if self.password_hash.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(DomainError::PasswordTooShort);
        }
        Ok(())
    }
}
