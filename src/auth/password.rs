//! Password hashing and verification using Argon2
//!
//! Uses argon2id variant with recommended parameters for password hashing.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::types::HuddleError;

/// Hash a password using Argon2id
///
/// Returns the PHC-formatted hash string that includes the salt and parameters.
pub fn hash_password(password: &str) -> Result<String, HuddleError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| HuddleError::Auth(format!("Failed to hash password: {e}")))
}

/// Verify a password against a stored hash
///
/// Returns true if the password matches the hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, HuddleError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| HuddleError::Auth(format!("Invalid password hash format: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let hash = hash_password("stride-length7").unwrap();

        // PHC format carries algorithm, salt and parameters
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("stride-length7", &hash).unwrap());
        assert!(!verify_password("stride-length8", &hash).unwrap());
    }

    #[test]
    fn test_salting_varies_hashes() {
        let first = hash_password("same-password1").unwrap();
        let second = hash_password("same-password1").unwrap();

        assert_ne!(first, second);
        assert!(verify_password("same-password1", &first).unwrap());
        assert!(verify_password("same-password1", &second).unwrap());
    }

    #[test]
    fn test_garbage_hash_is_error_not_mismatch() {
        assert!(verify_password("password", "not-a-phc-string").is_err());
    }
}
