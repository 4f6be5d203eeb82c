//! Password hashing with Argon2id.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

/// Prefix of every PHC string produced by [`hash_password`].
pub const ARGON2_PREFIX: &str = "$argon2";

/// Hashing failed inside the argon2 crate.
#[derive(Debug, thiserror::Error)]
#[error("password hashing failed")]
pub struct HashError;

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `HashError` if argon2 rejects the input.
pub fn hash_password(password: &str) -> Result<String, HashError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| HashError)
}

/// Hash `password` unless it is already an argon2 PHC string.
///
/// # Errors
///
/// Returns `HashError` if hashing is needed and fails.
pub fn ensure_hashed(password: String) -> Result<String, HashError> {
    if password.starts_with(ARGON2_PREFIX) {
        return Ok(password);
    }
    hash_password(&password)
}

/// Verify a password against a stored PHC string.
///
/// A malformed stored hash never verifies.
#[must_use]
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        tracing::warn!("stored password hash is not a PHC string");
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("password123").unwrap();
        assert!(hash.starts_with(ARGON2_PREFIX));
        assert!(verify_password("password123", &hash));
        assert!(!verify_password("password124", &hash));
    }

    #[test]
    fn test_ensure_hashed_is_idempotent() {
        let once = ensure_hashed("password123".to_string()).unwrap();
        let twice = ensure_hashed(once.clone()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_verify_rejects_plaintext_hash() {
        assert!(!verify_password("password123", "password123"));
    }
}
