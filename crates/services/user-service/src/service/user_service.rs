//! User domain service - account rules, credentials and uniqueness.
//!
//! Stateless apart from its collaborators, so one instance is shared behind
//! an `Arc` by every request.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use common::{AppResult, OptionExt};
use domain::{
    DomainError, DomainResult, Email, HashCost, Password, PersonName, UniqueField, User,
    UserChanges, Username,
};

use crate::repository::UserRepository;

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Validate, normalize and persist a new user with the given password.
    ///
    /// On success `user` is replaced by the stored row.
    async fn create_user(&self, user: &mut User, password: &str) -> AppResult<()>;

    /// Apply a partial update to a live user.
    async fn update_user(&self, id: Uuid, changes: &UserChanges) -> AppResult<User>;

    /// Replace the password after checking the current one.
    async fn change_password(&self, id: Uuid, old_password: &str, new_password: &str)
        -> AppResult<()>;

    /// Resolve an email or username plus password to an active user.
    async fn authenticate(&self, identifier: &str, password: &str) -> AppResult<User>;

    /// Hash a plaintext password off the async worker threads.
    async fn hash_password(&self, password: &str) -> DomainResult<String>;

    /// Check a plaintext password against a stored hash off the async
    /// worker threads.
    async fn verify_password(&self, hash: &str, password: &str) -> DomainResult<()>;
}

/// Concrete implementation of UserService using repository.
pub struct UserManager {
    repo: Arc<dyn UserRepository>,
    cost: HashCost,
}

impl UserManager {
    /// Create new user service instance with repository
    pub fn new(repo: Arc<dyn UserRepository>, cost: HashCost) -> Self {
        Self { repo, cost }
    }

    async fn ensure_email_free(&self, email: &Email) -> AppResult<()> {
        if self.repo.exists_by_email(email.as_str()).await? {
            return Err(DomainError::UserAlreadyExists(UniqueField::Email).into());
        }
        Ok(())
    }

    async fn ensure_username_free(&self, username: &Username) -> AppResult<()> {
        if self.repo.exists_by_username(username.as_str()).await? {
            return Err(DomainError::UserAlreadyExists(UniqueField::Username).into());
        }
        Ok(())
    }
}

#[async_trait]
impl UserService for UserManager {
    async fn create_user(&self, user: &mut User, password: &str) -> AppResult<()> {
        let email = Email::parse(&user.email)?;
        let username = Username::parse(&user.username)?;
        let name = PersonName::new(&user.first_name, &user.last_name)?;
        let password_hash = self.hash_password(password).await?;

        self.ensure_email_free(&email).await?;
        self.ensure_username_free(&username).await?;

        user.email = email.into_inner();
        user.username = username.into_inner();
        let (first_name, last_name) = name.into_parts();
        user.first_name = first_name;
        user.last_name = last_name;
        user.password_hash = password_hash;

        *user = self.repo.create(user).await?;
        info!(user_id = %user.id, "User created");
        Ok(())
    }

    async fn update_user(&self, id: Uuid, changes: &UserChanges) -> AppResult<User> {
        let current = self.repo.get_by_id(id).await?.ok_or_not_found()?;
        let merged = changes.merge_into(&current)?;

        if let Some(email) = &merged.new_email {
            self.ensure_email_free(email).await?;
        }
        if let Some(username) = &merged.new_username {
            self.ensure_username_free(username).await?;
        }

        let updated = self.repo.update(&merged.user).await?;
        debug!(user_id = %id, "User updated");
        Ok(updated)
    }

    async fn change_password(
        &self,
        id: Uuid,
        old_password: &str,
        new_password: &str,
    ) -> AppResult<()> {
        let mut user = self.repo.get_by_id(id).await?.ok_or_not_found()?;

        self.verify_password(&user.password_hash, old_password).await?;
        user.password_hash = self.hash_password(new_password).await?;

        self.repo.update(&user).await?;
        info!(user_id = %id, "Password changed");
        Ok(())
    }

    async fn authenticate(&self, identifier: &str, password: &str) -> AppResult<User> {
        // Lookups use the identifier as given, without normalization
        let mut found = None;
        if Email::parse(identifier).is_ok() {
            found = self.repo.get_by_email(identifier).await?;
        }
        if found.is_none() {
            found = self.repo.get_by_username(identifier).await?;
        }

        let user = found.ok_or(DomainError::InvalidCredentials)?;
        self.verify_password(&user.password_hash, password).await?;

        if !user.is_active {
            return Err(DomainError::AccountNotActive.into());
        }

        Ok(user)
    }

    async fn hash_password(&self, password: &str) -> DomainResult<String> {
        let cost = self.cost;
        let plain = password.to_owned();
        blocking(move || Password::hash(&plain, &cost).map(Password::into_string)).await
    }

    async fn verify_password(&self, hash: &str, password: &str) -> DomainResult<()> {
        let stored = Password::from_hash(hash);
        let plain = password.to_owned();
        if blocking(move || Ok(stored.verify(&plain))).await? {
            Ok(())
        } else {
            Err(DomainError::InvalidCredentials)
        }
    }
}

/// Argon2 is CPU-bound; run it on the blocking pool.
async fn blocking<T, F>(work: F) -> DomainResult<T>
where
    F: FnOnce() -> DomainResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| DomainError::internal(format!("password task failed: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockUserRepository;
    use mockall::predicate::eq;
    use std::time::{Duration, Instant};

    fn cost() -> HashCost {
        HashCost::minimal()
    }

    fn stored_user(password: &str) -> User {
        let mut user = User::new("ada@example.com", "ada_l", "Ada", "Lovelace");
        user.password_hash = Password::hash(password, &cost()).unwrap().into_string();
        user
    }

    fn manager(repo: MockUserRepository) -> UserManager {
        UserManager::new(Arc::new(repo), cost())
    }

    #[tokio::test]
    async fn test_create_user_normalizes_and_persists() {
        let mut repo = MockUserRepository::new();
        repo.expect_exists_by_email()
            .with(eq("ada@example.com"))
            .returning(|_| Ok(false));
        repo.expect_exists_by_username()
            .with(eq("ada_l"))
            .returning(|_| Ok(false));
        repo.expect_create()
            .times(1)
            .returning(|user| Ok(user.clone()));

        let service = manager(repo);
        let mut user = User::new("  ADA@Example.com ", " ada_l ", " Ada ", "Lovelace");
        service.create_user(&mut user, "s3cretpass").await.unwrap();

        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.username, "ada_l");
        assert_eq!(user.first_name, "Ada");
        assert_ne!(user.password_hash, "s3cretpass");
        assert!(service
            .verify_password(&user.password_hash, "s3cretpass")
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_create_user_duplicate_email_writes_nothing() {
        let mut repo = MockUserRepository::new();
        repo.expect_exists_by_email().returning(|_| Ok(true));
        repo.expect_exists_by_username().never();
        repo.expect_create().never();

        let mut user = User::new("ada@example.com", "ada_l", "Ada", "");
        let err = manager(repo)
            .create_user(&mut user, "s3cretpass")
            .await
            .unwrap_err();

        assert_eq!(
            err.as_domain(),
            Some(&DomainError::UserAlreadyExists(UniqueField::Email))
        );
    }

    #[tokio::test]
    async fn test_create_user_duplicate_username() {
        let mut repo = MockUserRepository::new();
        repo.expect_exists_by_email().returning(|_| Ok(false));
        repo.expect_exists_by_username().returning(|_| Ok(true));
        repo.expect_create().never();

        let mut user = User::new("ada@example.com", "ada_l", "Ada", "");
        let err = manager(repo)
            .create_user(&mut user, "s3cretpass")
            .await
            .unwrap_err();

        assert_eq!(
            err.as_domain(),
            Some(&DomainError::UserAlreadyExists(UniqueField::Username))
        );
    }

    #[tokio::test]
    async fn test_create_user_validation_order() {
        let mut repo = MockUserRepository::new();
        repo.expect_create().never();
        let service = manager(repo);

        let mut user = User::new("not-an-email", "1bad", "", "");
        let err = service.create_user(&mut user, "short").await.unwrap_err();
        assert!(matches!(err.as_domain(), Some(DomainError::InvalidEmail(_))));

        let mut user = User::new("ada@example.com", "1bad", "", "");
        let err = service.create_user(&mut user, "short").await.unwrap_err();
        assert!(matches!(err.as_domain(), Some(DomainError::InvalidUsername(_))));

        let mut user = User::new("ada@example.com", "ada_l", "", "");
        let err = service.create_user(&mut user, "short").await.unwrap_err();
        assert!(matches!(err.as_domain(), Some(DomainError::InvalidName(_))));

        let mut user = User::new("ada@example.com", "ada_l", "Ada", "");
        let err = service.create_user(&mut user, "short").await.unwrap_err();
        assert_eq!(err.as_domain(), Some(&DomainError::PasswordTooShort));
    }

    #[tokio::test]
    async fn test_update_missing_user_writes_nothing() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_id().returning(|_| Ok(None));
        repo.expect_update().never();

        let changes = UserChanges {
            first_name: Some("Grace".into()),
            ..Default::default()
        };
        let err = manager(repo)
            .update_user(Uuid::new_v4(), &changes)
            .await
            .unwrap_err();

        assert_eq!(err.as_domain(), Some(&DomainError::UserNotFound));
    }

    #[tokio::test]
    async fn test_update_checks_new_email_uniqueness() {
        let user = stored_user("s3cretpass");
        let id = user.id;

        let mut repo = MockUserRepository::new();
        repo.expect_get_by_id()
            .with(eq(id))
            .returning(move |_| Ok(Some(user.clone())));
        repo.expect_exists_by_email()
            .with(eq("taken@example.com"))
            .returning(|_| Ok(true));
        repo.expect_update().never();

        let changes = UserChanges {
            email: Some("Taken@Example.com".into()),
            ..Default::default()
        };
        let err = manager(repo).update_user(id, &changes).await.unwrap_err();

        assert_eq!(
            err.as_domain(),
            Some(&DomainError::UserAlreadyExists(UniqueField::Email))
        );
    }

    #[tokio::test]
    async fn test_update_unchanged_identity_skips_uniqueness() {
        let user = stored_user("s3cretpass");
        let id = user.id;
        assert!(!user.is_admin);

        let mut repo = MockUserRepository::new();
        repo.expect_get_by_id()
            .returning(move |_| Ok(Some(user.clone())));
        repo.expect_exists_by_email().never();
        repo.expect_exists_by_username().never();
        repo.expect_update()
            .times(1)
            .returning(|user| Ok(user.clone()));

        let changes = UserChanges {
            email: Some("ada@example.com".into()),
            username: Some("ada_l".into()),
            last_name: Some("Byron".into()),
            ..Default::default()
        };
        let updated = manager(repo).update_user(id, &changes).await.unwrap();

        assert_eq!(updated.last_name, "Byron");
        assert!(!updated.is_admin);
    }

    #[tokio::test]
    async fn test_change_password_wrong_old_password() {
        let user = stored_user("s3cretpass");

        let mut repo = MockUserRepository::new();
        repo.expect_get_by_id()
            .returning(move |_| Ok(Some(user.clone())));
        repo.expect_update().never();

        let err = manager(repo)
            .change_password(Uuid::new_v4(), "wrongpass", "n3wpassword")
            .await
            .unwrap_err();

        assert_eq!(err.as_domain(), Some(&DomainError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_change_password_rehashes() {
        let user = stored_user("s3cretpass");
        let old_hash = user.password_hash.clone();

        let mut repo = MockUserRepository::new();
        repo.expect_get_by_id()
            .returning(move |_| Ok(Some(user.clone())));
        repo.expect_update()
            .withf(move |u| u.password_hash != old_hash)
            .times(1)
            .returning(|u| Ok(u.clone()));

        manager(repo)
            .change_password(Uuid::new_v4(), "s3cretpass", "n3wpassword")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_change_password_new_too_short() {
        let user = stored_user("s3cretpass");

        let mut repo = MockUserRepository::new();
        repo.expect_get_by_id()
            .returning(move |_| Ok(Some(user.clone())));
        repo.expect_update().never();

        let err = manager(repo)
            .change_password(Uuid::new_v4(), "s3cretpass", "short")
            .await
            .unwrap_err();
        assert_eq!(err.as_domain(), Some(&DomainError::PasswordTooShort));
    }

    #[tokio::test]
    async fn test_authenticate_by_email() {
        let user = stored_user("s3cretpass");

        let mut repo = MockUserRepository::new();
        repo.expect_get_by_email()
            .with(eq("ada@example.com"))
            .returning(move |_| Ok(Some(user.clone())));
        repo.expect_get_by_username().never();

        let found = manager(repo)
            .authenticate("ada@example.com", "s3cretpass")
            .await
            .unwrap();
        assert_eq!(found.username, "ada_l");
    }

    #[tokio::test]
    async fn test_authenticate_falls_back_to_username() {
        let user = stored_user("s3cretpass");

        let mut repo = MockUserRepository::new();
        repo.expect_get_by_email().never();
        repo.expect_get_by_username()
            .with(eq("ada_l"))
            .returning(move |_| Ok(Some(user.clone())));

        assert!(manager(repo)
            .authenticate("ada_l", "s3cretpass")
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_authenticate_unknown_identifier() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_email().returning(|_| Ok(None));
        repo.expect_get_by_username().returning(|_| Ok(None));

        let err = manager(repo)
            .authenticate("ghost@example.com", "s3cretpass")
            .await
            .unwrap_err();
        assert_eq!(err.as_domain(), Some(&DomainError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_authenticate_wrong_password_vs_inactive() {
        let mut inactive = stored_user("s3cretpass");
        inactive.is_active = false;

        let mut repo = MockUserRepository::new();
        repo.expect_get_by_email()
            .returning(move |_| Ok(Some(inactive.clone())));
        let service = manager(repo);

        // Password is checked before the account state
        let err = service
            .authenticate("ada@example.com", "wrongpass")
            .await
            .unwrap_err();
        assert_eq!(err.as_domain(), Some(&DomainError::InvalidCredentials));

        let err = service
            .authenticate("ada@example.com", "s3cretpass")
            .await
            .unwrap_err();
        assert_eq!(err.as_domain(), Some(&DomainError::AccountNotActive));
    }

    #[tokio::test]
    async fn test_verify_password_malformed_hash() {
        let service = manager(MockUserRepository::new());
        assert_eq!(
            service.verify_password("garbage", "s3cretpass").await,
            Err(DomainError::InvalidCredentials)
        );
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_hashing_leaves_runtime_free() {
        let service = UserManager::new(Arc::new(MockUserRepository::new()), HashCost::default());

        let hashed = async {
            let hash = service.hash_password("s3cretpass").await;
            (hash, Instant::now())
        };
        let ticked = async {
            tokio::time::sleep(Duration::from_millis(1)).await;
            Instant::now()
        };
        let ((hash, hashed_at), ticked_at) = tokio::join!(hashed, ticked);

        assert!(hash.is_ok());
        assert!(ticked_at < hashed_at);
    }
}
