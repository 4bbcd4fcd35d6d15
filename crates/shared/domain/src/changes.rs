//! Partial update changeset and its pure merge.

use crate::error::DomainResult;
use crate::user::User;
use crate::value_objects::{Email, Username};

/// Fields a caller asked to change. `None` leaves the field untouched.
///
/// Account flags (`is_active`, `is_admin`) are not part of a profile update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub email: Option<String>,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Result of merging a changeset into the current entity.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedUser {
    pub user: User,
    /// Normalized new email when it must be checked for uniqueness
    pub new_email: Option<Email>,
    /// Normalized new username when it must be checked for uniqueness
    pub new_username: Option<Username>,
}

impl UserChanges {
    /// True when the changeset carries nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge into `current` without touching storage.
    ///
    /// Email and username are revalidated only when non-empty and different
    /// from the current raw value (the comparison is on the raw input, not
    /// the normalized form). Names replace the current value when non-empty,
    /// with no name revalidation.
    pub fn merge_into(&self, current: &User) -> DomainResult<MergedUser> {
        let mut user = current.clone();

        let new_email = match non_empty(&self.email) {
            Some(raw) if raw != current.email => {
                let email = Email::parse(raw)?;
                user.email = email.as_str().to_string();
                Some(email)
            }
            _ => None,
        };

        let new_username = match non_empty(&self.username) {
            Some(raw) if raw != current.username => {
                let username = Username::parse(raw)?;
                user.username = username.as_str().to_string();
                Some(username)
            }
            _ => None,
        };

        if let Some(first) = non_empty(&self.first_name) {
            user.first_name = first.to_string();
        }
        if let Some(last) = non_empty(&self.last_name) {
            user.last_name = last.to_string();
        }

        Ok(MergedUser {
            user,
            new_email,
            new_username,
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
