//! Listing options understood by the repository.

use domain::User;

/// Optional constraints for listing users. The default matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    /// Substring match on email
    pub email: Option<String>,
    /// Substring match on username
    pub username: Option<String>,
    pub is_active: Option<bool>,
    pub is_admin: Option<bool>,
}

impl UserFilter {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// In-memory equivalent of the storage query.
    pub fn matches(&self, user: &User) -> bool {
        self.email.as_deref().map_or(true, |e| user.email.contains(e))
            && self
                .username
                .as_deref()
                .map_or(true, |u| user.username.contains(u))
            && self.is_active.map_or(true, |a| user.is_active == a)
            && self.is_admin.map_or(true, |a| user.is_admin == a)
    }
}

/// Column a listing can be ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    Email,
    Username,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Ordering of a listing. Defaults to newest first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserSort {
    pub field: SortField,
    pub order: SortOrder,
}

/// A page of a filtered, sorted listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    pub offset: u64,
    pub limit: u64,
    pub filter: UserFilter,
    pub sort: UserSort,
}
