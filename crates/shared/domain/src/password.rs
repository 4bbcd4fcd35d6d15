//! Password value object - hashing and verification of credentials.
//!
//! Hashes are Argon2id PHC strings: the salt and the cost parameters travel
//! inside the hash, so verification never needs the current `HashCost`.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

use crate::constants::MIN_PASSWORD_LENGTH;
use crate::error::{DomainError, DomainResult};

/// Argon2 work factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashCost {
    /// Memory size in KiB
    pub memory_kib: u32,
    /// Number of passes
    pub iterations: u32,
    /// Degree of parallelism
    pub parallelism: u32,
}

impl HashCost {
    /// Cheapest parameters Argon2 accepts. Only for tests and tooling.
    pub fn minimal() -> Self {
        Self {
            memory_kib: Params::MIN_M_COST,
            iterations: Params::MIN_T_COST,
            parallelism: Params::MIN_P_COST,
        }
    }

    fn hasher(&self) -> DomainResult<Argon2<'static>> {
        let params = Params::new(self.memory_kib, self.iterations, self.parallelism, None)
            .map_err(|e| DomainError::internal(format!("Invalid hash parameters: {}", e)))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

impl Default for HashCost {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

/// Password value object that handles hashing and verification.
#[derive(Clone, PartialEq, Eq)]
pub struct Password {
    hash: String,
}

// Don't expose hash in debug output
impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Password")
            .field("hash", &"[REDACTED]")
            .finish()
    }
}

impl Password {
    /// Hash a plain text password with the given cost.
    ///
    /// # Errors
    /// `PasswordTooShort` when the plain text has fewer than 8 characters;
    /// the hash is never attempted in that case.
    pub fn hash(plain_text: &str, cost: &HashCost) -> DomainResult<Self> {
        if plain_text.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(DomainError::PasswordTooShort);
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = cost
            .hasher()?
            .hash_password(plain_text.as_bytes(), &salt)
            .map_err(|e| DomainError::internal(format!("Password hash failed: {}", e)))?;

        Ok(Self {
            hash: hash.to_string(),
        })
    }

    /// Wrap an existing hash (from the database).
    pub fn from_hash(hash: impl Into<String>) -> Self {
        Self { hash: hash.into() }
    }

    /// Get the hash string for storage.
    pub fn as_str(&self) -> &str {
        &self.hash
    }

    /// Consume and return the hash string.
    pub fn into_string(self) -> String {
        self.hash
    }

    /// Verify a plain text password against this hash.
    ///
    /// A malformed stored hash is reported the same way as a wrong password.
    pub fn verify(&self, plain_text: &str) -> bool {
        match PasswordHash::new(&self.hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(plain_text.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }
}

impl From<Password> for String {
    fn from(password: Password) -> Self {
        password.hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cost() -> HashCost {
        HashCost::minimal()
    }

    #[test]
    fn test_password_hash_and_verify() {
        let plain = "SecurePassword123!";
        let password = Password::hash(plain, &cost()).unwrap();

        assert!(password.verify(plain));
        assert!(!password.verify("WrongPassword123"));
    }

    #[test]
    fn test_hash_is_not_plaintext() {
        let plain = "SecurePassword123!";
        let password = Password::hash(plain, &cost()).unwrap();

        assert_ne!(password.as_str(), plain);
        assert!(password.as_str().starts_with("$argon2id$"));
    }

    #[test]
    fn test_password_from_hash() {
        let plain = "TestPassword123";
        let hash = Password::hash(plain, &cost()).unwrap().into_string();

        let restored = Password::from_hash(hash);
        assert!(restored.verify(plain));
    }

    #[test]
    fn test_same_password_different_salts() {
        let plain = "SamePassword123";
        let pass1 = Password::hash(plain, &cost()).unwrap();
        let pass2 = Password::hash(plain, &cost()).unwrap();

        assert_ne!(pass1.as_str(), pass2.as_str());
        assert!(pass1.verify(plain));
        assert!(pass2.verify(plain));
    }

    #[test]
    fn test_verification_uses_embedded_cost() {
        let plain = "CostlyPassword1";
        let custom = HashCost {
            memory_kib: 16,
            iterations: 2,
            parallelism: 1,
        };
        let password = Password::hash(plain, &custom).unwrap();

        assert!(password.as_str().contains("m=16,t=2,p=1"));
        assert!(password.verify(plain));
    }

    #[test]
    fn test_password_too_short() {
        let result = Password::hash("short", &cost());
        assert_eq!(result.unwrap_err(), DomainError::PasswordTooShort);
    }

    #[test]
    fn test_password_minimum_length() {
        assert!(Password::hash("12345678", &cost()).is_ok());
    }

    #[test]
    fn test_malformed_hash_does_not_verify() {
        let password = Password::from_hash("not-a-phc-string");
        assert!(!password.verify("whatever123"));
    }

    #[test]
    fn test_invalid_cost_is_internal_error() {
        let bad = HashCost {
            memory_kib: 0,
            iterations: 0,
            parallelism: 0,
        };
        assert!(matches!(
            Password::hash("LongEnough1", &bad),
            Err(DomainError::Internal(_))
        ));
    }

    #[test]
    fn test_debug_redacts_hash() {
        let password = Password::hash("SecurePassword123!", &cost()).unwrap();
        let debug = format!("{:?}", password);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("argon2"));
    }
}
