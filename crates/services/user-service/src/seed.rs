//! Development data seeding from a JSON fixture.
//!
//! Users are written straight through the repository: passwords are hashed by
//! the domain service, but the service's create-time validation is skipped and
//! only the entity's own `validate()` runs.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use common::AppError;
use domain::User;

use crate::repository::UserRepository;
use crate::service::UserService;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to decode seed data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to seed user {email}: {source}")]
    User {
        email: String,
        #[source]
        source: AppError,
    },

    #[error(transparent)]
    App(#[from] AppError),
}

/// One fixture user.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedUser {
    pub email: String,
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub password: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_admin: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedData {
    pub users: Vec<SeedUser>,
}

impl SeedData {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SeedError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

/// Outcome of a seeding run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub created: usize,
    pub skipped: usize,
    /// Live users after seeding
    pub total: u64,
}

/// Insert every fixture user whose email and username are both free.
pub async fn seed_users(
    repo: &dyn UserRepository,
    service: &dyn UserService,
    users: &[SeedUser],
) -> Result<SeedReport, SeedError> {
    let mut report = SeedReport::default();
    info!(count = users.len(), "Seeding users");

    for seed in users {
        if repo.exists_by_email(&seed.email).await?
            || repo.exists_by_username(&seed.username).await?
        {
            info!(email = %seed.email, username = %seed.username, "User already exists, skipping");
            report.skipped += 1;
            continue;
        }

        let created = create_one(repo, service, seed)
            .await
            .map_err(|source| SeedError::User {
                email: seed.email.clone(),
                source,
            })?;
        info!(email = %created.email, name = %created.full_name(), "Created user");
        report.created += 1;
    }

    report.total = repo.count().await?;
    info!(total = report.total, "Total users in database");
    Ok(report)
}

async fn create_one(
    repo: &dyn UserRepository,
    service: &dyn UserService,
    seed: &SeedUser,
) -> Result<User, AppError> {
    let mut user = User::new(
        seed.email.clone(),
        seed.username.clone(),
        seed.first_name.clone(),
        seed.last_name.clone(),
    );
    user.is_active = seed.is_active;
    user.is_admin = seed.is_admin;
    user.password_hash = service.hash_password(&seed.password).await?;
    user.validate()?;

    repo.create(&user).await
}
