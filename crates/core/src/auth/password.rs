//! Argon2id password hashing.
//!
//! Hashes are stored as PHC strings, so the parameters and salt travel with
//! the hash and verification needs no side-channel configuration.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, PasswordHash,
};
use thiserror::Error;

/// Errors from password hashing and verification.
#[derive(Debug, Error)]
pub enum PasswordError {
    /// Hashing the password failed.
    #[error("failed to hash password: {0}")]
    HashError(String),

    /// Verification failed for a reason other than a wrong password.
    #[error("failed to verify password: {0}")]
    VerifyError(String),

    /// The stored hash is not a parseable PHC string.
    #[error("invalid password hash format")]
    InvalidHash,
}

/// Hashes a plaintext password with Argon2id and a fresh random salt.
///
/// # Errors
///
/// Returns `PasswordError::HashError` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::HashError(e.to_string()))
}

/// Checks a plaintext password against a stored PHC hash.
///
/// A wrong password is `Ok(false)`, not an error; only malformed hashes and
/// unexpected backend failures surface as `Err`.
///
/// # Errors
///
/// Returns `PasswordError::InvalidHash` if the hash cannot be parsed, or
/// `PasswordError::VerifyError` on an unexpected failure.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidHash)?;

    let argon2 = Argon2::default();

    match argon2.verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_hash_is_phc_argon2id() {
        let hash = hash_password("hunter2hunter2").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert_ne!(hash, "hunter2hunter2");
    }

    #[test]
    fn test_round_trip_accepts_only_the_right_password() {
        let hash = hash_password("correct horse battery staple").unwrap();
        assert!(verify_password("correct horse battery staple", &hash).unwrap());
        assert!(!verify_password("correct horse battery", &hash).unwrap());
        assert!(!verify_password("", &hash).unwrap());
    }

    #[test]
    fn test_salts_make_hashes_unique() {
        let first = hash_password("same input").unwrap();
        let second = hash_password("same input").unwrap();
        assert_ne!(first, second);

        // Both still verify despite differing.
        assert!(verify_password("same input", &first).unwrap());
        assert!(verify_password("same input", &second).unwrap());
    }

    #[test]
    fn test_non_ascii_passwords_round_trip() {
        let hash = hash_password("pässwörd-ütf8-🔑").unwrap();
        assert!(verify_password("pässwörd-ütf8-🔑", &hash).unwrap());
    }

    #[rstest]
    #[case("")]
    #[case("not-a-hash")]
    #[case("$argon2id$truncated")]
    fn test_malformed_hashes_are_rejected(#[case] stored: &str) {
        let result = verify_password("anything", stored);
        assert!(matches!(result, Err(PasswordError::InvalidHash)));
    }
}
