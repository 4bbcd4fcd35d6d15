//! Unified error handling for the gRPC services.
//!
//! Provides a single error type that wraps domain rule violations, storage
//! failures and boundary errors, and converts into a Tonic `Status` without
//! leaking internal detail to the caller.

use domain::DomainError;
use thiserror::Error;
use tonic::{Code, Status};

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    /// Business rule or validation failure from the domain layer
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Malformed request shape at the boundary
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Authentication required: {0}")]
    Unauthenticated(String),

    #[cfg(feature = "database")]
    #[error("Database error")]
    Database(#[from] sea_orm::DbErr),

    #[error("Internal server error")]
    Internal(String),
}

impl AppError {
    /// Get error code for logs and clients
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Domain(err) => match err {
                DomainError::InvalidEmail(_) => "INVALID_EMAIL",
                DomainError::InvalidUsername(_) => "INVALID_USERNAME",
                DomainError::InvalidName(_) => "INVALID_NAME",
                DomainError::PasswordTooShort => "PASSWORD_TOO_SHORT",
                DomainError::UserAlreadyExists(_) => "USER_ALREADY_EXISTS",
                DomainError::UserNotFound => "USER_NOT_FOUND",
                DomainError::InvalidCredentials => "INVALID_CREDENTIALS",
                DomainError::AccountNotActive => "ACCOUNT_NOT_ACTIVE",
                DomainError::Internal(_) => "INTERNAL_ERROR",
            },
            AppError::InvalidArgument(_) => "INVALID_ARGUMENT",
            AppError::Unauthenticated(_) => "UNAUTHENTICATED",
            #[cfg(feature = "database")]
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get gRPC status code
    pub fn grpc_code(&self) -> Code {
        match self {
            AppError::Domain(err) => match err {
                e if e.is_validation() => Code::InvalidArgument,
                DomainError::UserAlreadyExists(_) => Code::AlreadyExists,
                DomainError::UserNotFound => Code::NotFound,
                DomainError::InvalidCredentials => Code::Unauthenticated,
                DomainError::AccountNotActive => Code::PermissionDenied,
                _ => Code::Internal,
            },
            AppError::InvalidArgument(_) => Code::InvalidArgument,
            AppError::Unauthenticated(_) => Code::Unauthenticated,
            _ => Code::Internal,
        }
    }

    /// Get user-facing message (hides internal details)
    pub fn user_message(&self) -> String {
        match self {
            AppError::Domain(DomainError::Internal(msg)) => {
                tracing::error!("Domain internal error: {}", msg);
                "An internal error occurred".to_string()
            }
            AppError::Domain(err) => err.to_string(),
            AppError::InvalidArgument(msg) => msg.clone(),
            AppError::Unauthenticated(msg) => msg.clone(),
            #[cfg(feature = "database")]
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "An internal error occurred".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }
        }
    }

    /// Domain error carried by this error, if any.
    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            AppError::Domain(err) => Some(err),
            _ => None,
        }
    }
}

impl From<AppError> for Status {
    fn from(err: AppError) -> Self {
        tracing::debug!(code = err.code(), "Request failed");
        Status::new(err.grpc_code(), err.user_message())
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Extension trait for Option -> AppError conversion
pub trait OptionExt<T> {
    fn ok_or_not_found(self) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self) -> AppResult<T> {
        self.ok_or(AppError::Domain(DomainError::UserNotFound))
    }
}

/// Convenience constructors
impl AppError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        AppError::InvalidArgument(msg.into())
    }

    pub fn unauthenticated(msg: impl Into<String>) -> Self {
        AppError::Unauthenticated(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::UniqueField;

    #[test]
    fn test_validation_errors_are_invalid_argument() {
        let status = Status::from(AppError::from(DomainError::PasswordTooShort));
        assert_eq!(status.code(), Code::InvalidArgument);
        assert_eq!(status.message(), "password must be at least 8 characters");
    }

    #[test]
    fn test_domain_classes_map_to_codes() {
        let cases = [
            (DomainError::UserNotFound, Code::NotFound),
            (DomainError::UserAlreadyExists(UniqueField::Email), Code::AlreadyExists),
            (DomainError::InvalidCredentials, Code::Unauthenticated),
            (DomainError::AccountNotActive, Code::PermissionDenied),
            (DomainError::InvalidUsername("x".into()), Code::InvalidArgument),
        ];
        for (err, code) in cases {
            assert_eq!(Status::from(AppError::from(err)).code(), code);
        }
    }

    #[test]
    fn test_internal_detail_is_hidden() {
        let status = Status::from(AppError::internal("connection refused at 10.0.0.3"));
        assert_eq!(status.code(), Code::Internal);
        assert_eq!(status.message(), "An internal error occurred");

        let status = Status::from(AppError::from(DomainError::internal("argon2 blew up")));
        assert_eq!(status.code(), Code::Internal);
        assert!(!status.message().contains("argon2"));
    }

    #[test]
    fn test_not_found_helper() {
        let err = None::<u8>.ok_or_not_found().unwrap_err();
        assert_eq!(err.as_domain(), Some(&DomainError::UserNotFound));
        assert_eq!(err.code(), "USER_NOT_FOUND");
    }

    #[test]
    fn test_boundary_errors() {
        let status = Status::from(AppError::invalid_argument("invalid user ID"));
        assert_eq!(status.code(), Code::InvalidArgument);
        assert_eq!(status.message(), "invalid user ID");

        let status = Status::from(AppError::unauthenticated("authorization header not found"));
        assert_eq!(status.code(), Code::Unauthenticated);
    }
}
