//! Value objects guarding the user's identity fields.
//!
//! Each value object normalizes its raw input once at construction and is
//! immutable afterwards. Equality is by normalized value.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::constants::{MAX_EMAIL_LENGTH, MAX_NAME_LENGTH, MAX_USERNAME_LENGTH, MIN_USERNAME_LENGTH};
use crate::error::{DomainError, DomainResult};

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9._%+\-]+@[a-z0-9.\-]+\.[a-z]{2,}$").expect("valid email regex"));

static USERNAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9_]*$").expect("valid username regex"));

/// Validated, lowercased email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Email(String);

impl Email {
    /// Trim, lowercase and validate a raw email.
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let email = raw.trim().to_lowercase();

        if email.len() > MAX_EMAIL_LENGTH || !EMAIL_PATTERN.is_match(&email) {
            return Err(DomainError::InvalidEmail(email));
        }

        Ok(Self(email))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validated username.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Username(String);

impl Username {
    /// Trim and validate a raw username.
    ///
    /// Must be 3..=100 characters, start with a letter and continue with
    /// letters, digits or underscores.
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let username = raw.trim();
        let length = username.chars().count();

        if length < MIN_USERNAME_LENGTH {
            return Err(DomainError::InvalidUsername(format!(
                "username must be at least {} characters",
                MIN_USERNAME_LENGTH
            )));
        }
        if length > MAX_USERNAME_LENGTH {
            return Err(DomainError::InvalidUsername(format!(
                "username must not exceed {} characters",
                MAX_USERNAME_LENGTH
            )));
        }
        if !USERNAME_PATTERN.is_match(username) {
            return Err(DomainError::InvalidUsername(
                "username must start with a letter and contain only letters, numbers, and underscores"
                    .to_string(),
            ));
        }

        Ok(Self(username.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A person's first and last name, at least one of them present.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PersonName {
    first: String,
    last: String,
}

impl PersonName {
    pub fn new(first: &str, last: &str) -> DomainResult<Self> {
        let first = first.trim();
        let last = last.trim();

        if first.is_empty() && last.is_empty() {
            return Err(DomainError::InvalidName(
                "at least one name must be provided".to_string(),
            ));
        }
        if first.chars().count() > MAX_NAME_LENGTH || last.chars().count() > MAX_NAME_LENGTH {
            return Err(DomainError::InvalidName("name too long".to_string()));
        }

        Ok(Self {
            first: first.to_string(),
            last: last.to_string(),
        })
    }

    /// Full display name, falling back to whichever side is present.
    pub fn full_name(&self) -> String {
        match (self.first.is_empty(), self.last.is_empty()) {
            (true, _) => self.last.clone(),
            (_, true) => self.first.clone(),
            _ => format!("{} {}", self.first, self.last),
        }
    }

    /// Consume into `(first, last)`.
    pub fn into_parts(self) -> (String, String) {
        (self.first, self.last)
    }
}

impl fmt::Display for PersonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}
