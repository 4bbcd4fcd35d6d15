//! Domain-level constants.
//!
//! These constants define business rules and validation requirements.

// =============================================================================
// Validation
// =============================================================================

/// Minimum password length requirement
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum accepted email length
pub const MAX_EMAIL_LENGTH: usize = 255;

/// Minimum username length
pub const MIN_USERNAME_LENGTH: usize = 3;

/// Maximum username length
pub const MAX_USERNAME_LENGTH: usize = 100;

/// Maximum length of a first or last name
pub const MAX_NAME_LENGTH: usize = 100;

// =============================================================================
// User Status
// =============================================================================

pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_INACTIVE: &str = "inactive";
pub const STATUS_SUSPENDED: &str = "suspended";

// =============================================================================
// Pagination
// =============================================================================

/// Page used when the caller sends none or an invalid one
pub const DEFAULT_PAGE: u64 = 1;

/// Page size used when the caller sends none or an invalid one
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Largest page size accepted at the transport boundary
pub const MAX_PAGE_SIZE: u64 = 100;

/// Largest number of ids accepted by a batch lookup
pub const MAX_BATCH_SIZE: usize = 100;
