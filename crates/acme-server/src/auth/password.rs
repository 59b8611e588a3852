//! Password hashing, verification and policy
//!
//! Hashes are Argon2id PHC strings (`$argon2id$v=19$m=19456,t=2,p=1$...`)
//! stored in `application_users.password_hash`.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use thiserror::Error;

/// Minimum number of characters in a password
pub const PASSWORD_MIN_LENGTH: usize = 6;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    Hash(String),

    #[error("Invalid password hash: {0}")]
    MalformedHash(String),
}

/// A single failed password rule, reported by code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordPolicyViolation {
    TooShort,
    RequiresDigit,
}

impl PasswordPolicyViolation {
    pub fn code(self) -> &'static str {
        match self {
            PasswordPolicyViolation::TooShort => "PasswordTooShort",
            PasswordPolicyViolation::RequiresDigit => "PasswordRequiresDigit",
        }
    }
}

/// Hash a password using Argon2id with a random salt
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::Hash(e.to_string()))?;
    Ok(hash.to_string())
}

/// `Ok(false)` on mismatch, `Err` only when the stored hash cannot be parsed
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(hash).map_err(|e| PasswordError::MalformedHash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// At least [`PASSWORD_MIN_LENGTH`] characters and one digit. Case and
/// symbols are not required.
pub fn check_password_policy(password: &str) -> Vec<PasswordPolicyViolation> {
    let mut violations = Vec::new();

    if password.chars().count() < PASSWORD_MIN_LENGTH {
        violations.push(PasswordPolicyViolation::TooShort);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        violations.push(PasswordPolicyViolation::RequiresDigit);
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let hash = hash_password("pa$$w0rd").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("pa$$w0rd", &hash).unwrap());
        assert!(!verify_password("password", &hash).unwrap());
    }

    #[test]
    fn test_salts_differ() {
        assert_ne!(hash_password("pa$$w0rd").unwrap(), hash_password("pa$$w0rd").unwrap());
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        assert!(matches!(
            verify_password("pa$$w0rd", "plain-text"),
            Err(PasswordError::MalformedHash(_))
        ));
    }

    #[test]
    fn test_policy() {
        assert!(check_password_policy("pa$$w0rd").is_empty());
        assert!(check_password_policy("abcde1").is_empty());
        assert_eq!(check_password_policy("ab1"), vec![PasswordPolicyViolation::TooShort]);
        assert_eq!(
            check_password_policy("password"),
            vec![PasswordPolicyViolation::RequiresDigit]
        );
        assert_eq!(check_password_policy("").len(), 2);
    }
}
