//! Domain-level errors.
//!
//! These errors represent business rule violations and domain logic failures.
//! They are independent of infrastructure concerns (gRPC, database).

use std::fmt;

use thiserror::Error;

/// Unique user attribute that caused a conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Email,
    Username,
}

impl fmt::Display for UniqueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UniqueField::Email => write!(f, "email"),
            UniqueField::Username => write!(f, "username"),
        }
    }
}

/// Domain-specific errors for business rule violations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Email failed normalization or format checks
    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    /// Username failed length or character checks
    #[error("invalid username: {0}")]
    InvalidUsername(String),

    /// Person name failed validation
    #[error("invalid name: {0}")]
    InvalidName(String),

    #[error("password must be at least {} characters", crate::MIN_PASSWORD_LENGTH)]
    PasswordTooShort,

    /// Email or username already taken
    #[error("user already exists: {0} already in use")]
    UserAlreadyExists(UniqueField),

    #[error("user not found")]
    UserNotFound,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("user account is not active")]
    AccountNotActive,

    /// Internal domain error
    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        DomainError::Internal(msg.into())
    }

    /// True for errors caused by malformed caller input.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            DomainError::InvalidEmail(_)
                | DomainError::InvalidUsername(_)
                | DomainError::InvalidName(_)
                | DomainError::PasswordTooShort
        )
    }
}

/// Result type alias for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
