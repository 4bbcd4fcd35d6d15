//! Domain layer - Core business entities and value objects.
//!
//! This crate contains pure domain logic with no infrastructure dependencies:
//! the `User` aggregate, the value objects that guard its fields, the
//! changeset used for partial updates and password hashing.

pub mod changes;
pub mod constants;
pub mod error;
pub mod password;
pub mod user;
pub mod value_objects;

pub use changes::{MergedUser, UserChanges};
pub use constants::*;
pub use error::{DomainError, DomainResult, UniqueField};
pub use password::{HashCost, Password};
pub use user::{User, UserStatus};
pub use value_objects::{Email, PersonName, Username};
