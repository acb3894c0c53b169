//! Customer and staff accounts: user records, email normalization and Argon2
//! password hashing.

use std::sync::OnceLock;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use skyport_shared::ValidationError;
use uuid::Uuid;

use crate::{CoreError, CoreResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_staff: bool,
    pub created_at: DateTime<Utc>,
}

/// A user together with the stored password hash. Never serialized.
#[derive(Debug, Clone)]
pub struct StoredUser {
    pub user: User,
    pub password_hash: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password_hash: Option<String>,
}

/// Emails are compared case-insensitively, so they are stored lower-cased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    };
    if !valid {
        return Err(ValidationError::new("email", "enter a valid email address"));
    }
    Ok(())
}

pub fn validate_password(password: &str, min_length: usize) -> Result<(), ValidationError> {
    if password.chars().count() < min_length {
        return Err(ValidationError::new(
            "password",
            format!("must be at least {} characters long", min_length),
        ));
    }
    Ok(())
}

/// Hash with Argon2id and a random salt. Returns the PHC string.
pub fn hash_password(password: &str) -> CoreResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CoreError::Storage(format!("password hashing failed: {}", e)))
}

pub fn verify_password(password: &str, hash: &str) -> CoreResult<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| CoreError::Storage(format!("stored password hash is malformed: {}", e)))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(CoreError::Storage(format!("password verification failed: {}", e))),
    }
}

static UNKNOWN_ACCOUNT_HASH: OnceLock<Option<String>> = OnceLock::new();

/// Check a login attempt. A missing account still costs one Argon2
/// verification, so response time does not reveal which emails exist.
pub fn verify_credentials(password: &str, stored_hash: Option<&str>) -> CoreResult<bool> {
    match stored_hash {
        Some(hash) => verify_password(password, hash),
        None => {
            let dummy = UNKNOWN_ACCOUNT_HASH
                .get_or_init(|| hash_password("skyport-unknown-account").ok());
            if let Some(dummy) = dummy {
                verify_password(password, dummy)?;
            }
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct-horse").expect("hashing should succeed");
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct-horse", &hash).unwrap());
        assert!(!verify_password("wrong-horse", &hash).unwrap());
    }

    #[test]
    fn test_unknown_account_never_verifies() {
        assert!(!verify_credentials("correct-horse", None).unwrap());
        // Matching the dummy password must not log anyone in either.
        assert!(!verify_credentials("skyport-unknown-account", None).unwrap());

        let hash = hash_password("correct-horse").unwrap();
        assert!(verify_credentials("correct-horse", Some(&hash)).unwrap());
        assert!(!verify_credentials("wrong-horse", Some(&hash)).unwrap());
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        assert!(verify_password("anything", "not-a-phc-string").is_err());
    }

    #[test]
    fn test_email_rules() {
        assert_eq!(normalize_email("  Pilot@Example.COM "), "pilot@example.com");
        assert!(validate_email("pilot@example.com").is_ok());
        assert!(validate_email("pilot.example.com").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("pilot@localhost").is_err());
    }

    #[test]
    fn test_password_length() {
        assert!(validate_password("12345678", 8).is_ok());
        assert_eq!(validate_password("1234567", 8).unwrap_err().field, "password");
    }
}
