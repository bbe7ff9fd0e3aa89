//! Password hashing (argon2id, PHC string format).

use std::sync::OnceLock;

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PasswordError {
    #[error("failed to hash password: {0}")]
    Hash(String),
}

/// Hash a plaintext password with a fresh random salt.
pub fn hash_password(plain: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::Hash(e.to_string()))
}

/// Check a plaintext password against a stored PHC hash.
///
/// A malformed stored hash verifies as `false`.
pub fn verify_password(plain: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        tracing::warn!("stored password hash is not a valid PHC string");
        return false;
    };
    Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok()
}

/// Hashes stored passwords and checks login attempts against them.
///
/// `verify` with no stored hash (unknown login) must cost the same as a real
/// mismatch, so response time does not reveal which emails are registered.
pub trait CredentialHasher: Send + Sync {
    fn hash(&self, plain: &str) -> Result<String, PasswordError>;

    fn verify(&self, plain: &str, stored_hash: Option<&str>) -> bool;
}

/// Argon2id with the crate's default parameters.
#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2Hasher;

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, plain: &str) -> Result<String, PasswordError> {
        hash_password(plain)
    }

    fn verify(&self, plain: &str, stored_hash: Option<&str>) -> bool {
        match stored_hash {
            Some(stored) => verify_password(plain, stored),
            None => {
                if let Some(dummy) = dummy_hash() {
                    let _ = verify_password(plain, dummy);
                }
                false
            }
        }
    }
}

/// Hash of a throwaway secret with the same parameters as real hashes.
fn dummy_hash() -> Option<&'static str> {
    static DUMMY: OnceLock<Option<String>> = OnceLock::new();
    DUMMY
        .get_or_init(|| hash_password("subway-unknown-member").ok())
        .as_deref()
}

impl<H> CredentialHasher for std::sync::Arc<H>
where
    H: CredentialHasher + ?Sized,
{
    fn hash(&self, plain: &str) -> Result<String, PasswordError> {
        (**self).hash(plain)
    }

    fn verify(&self, plain: &str, stored_hash: Option<&str>) -> bool {
        (**self).verify(plain, stored_hash)
    }
}
