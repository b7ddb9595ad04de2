//! Password hashing with Argon2id and the account password policy.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use thiserror::Error;

/// Error type for password operations.
#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    HashError(String),

    #[error("Failed to verify password: {0}")]
    VerifyError(String),

    #[error("Invalid password hash format")]
    InvalidHashFormat,
}

// OWASP 2024 Argon2id profile: 19 MiB, 2 iterations, 1 lane.
const MEMORY_COST: u32 = 19456;
const TIME_COST: u32 = 2;
const PARALLELISM: u32 = 1;
const OUTPUT_LEN: usize = 32;

/// Minimum number of characters in an account password.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Passwords rejected outright regardless of length.
const COMMON_PASSWORDS: &[&str] = &[
    "password",
    "password1",
    "password123",
    "12345678",
    "123456789",
    "1234567890",
    "qwerty123",
    "qwertyuiop",
    "iloveyou",
    "admin123",
    "welcome1",
    "letmein1",
    "football",
    "baseball",
    "sunshine",
    "princess",
];

fn create_argon2() -> Result<Argon2<'static>, PasswordError> {
    let params = Params::new(MEMORY_COST, TIME_COST, PARALLELISM, Some(OUTPUT_LEN))
        .map_err(|e| PasswordError::HashError(format!("Failed to create Argon2 params: {}", e)))?;

    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hashes a password and returns a PHC string (`$argon2id$v=19$...`).
///
/// ```
/// use shared::password::hash_password;
///
/// let hash = hash_password("correct horse battery").unwrap();
/// assert!(hash.starts_with("$argon2id$"));
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = create_argon2()?;

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::HashError(e.to_string()))
}

/// Verifies a password against a stored PHC hash.
///
/// The parameters embedded in the hash are used, so older hashes keep
/// verifying after a parameter change.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidHashFormat)?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(e.to_string())),
    }
}

/// Checks a new password against the account password policy.
///
/// Returns every violated rule as a user-facing message. `email` is the
/// address the password will belong to; a password resembling it is refused.
pub fn check_password_policy(password: &str, email: &str) -> Result<(), Vec<String>> {
    let mut problems = Vec::new();

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        problems.push(format!(
            "This password is too short. It must contain at least {} characters.",
            MIN_PASSWORD_LENGTH
        ));
    }

    if !password.is_empty() && password.chars().all(|c| c.is_ascii_digit()) {
        problems.push("This password is entirely numeric.".to_string());
    }

    let lowered = password.to_lowercase();
    if COMMON_PASSWORDS.contains(&lowered.as_str()) {
        problems.push("This password is too common.".to_string());
    }

    let email = email.trim().to_lowercase();
    let local_part = email.split('@').next().unwrap_or_default();
    if !lowered.is_empty()
        && (lowered == email || (local_part.len() >= 3 && lowered.contains(local_part)))
    {
        problems.push("The password is too similar to the email address.".to_string());
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(problems)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password_returns_phc_format() {
        let hash = hash_password("test_password").unwrap();
        assert!(hash.starts_with("$argon2id$v=19$m=19456,t=2,p=1$"));
    }

    #[test]
    fn test_hash_password_produces_unique_hashes() {
        let hash1 = hash_password("same_password").unwrap();
        let hash2 = hash_password("same_password").unwrap();
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_verify_password_correct_and_incorrect() {
        let hash = hash_password("Tenant-Pass-2024").unwrap();
        assert!(verify_password("Tenant-Pass-2024", &hash).unwrap());
        assert!(!verify_password("tenant-pass-2024", &hash).unwrap());
    }

    #[test]
    fn test_verify_password_invalid_hash() {
        let result = verify_password("password", "invalid_hash_format");
        assert!(matches!(result, Err(PasswordError::InvalidHashFormat)));
    }

    #[test]
    fn test_hash_password_unicode() {
        let password = "hasło-Żółć-2024";
        let hash = hash_password(password).unwrap();
        assert!(verify_password(password, &hash).unwrap());
    }

    #[test]
    fn test_policy_accepts_reasonable_password() {
        assert!(check_password_policy("blue-window-42", "anna@example.com").is_ok());
    }

    #[test]
    fn test_policy_rejects_short_password() {
        let problems = check_password_policy("a1b2", "anna@example.com").unwrap_err();
        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("too short"));
    }

    #[test]
    fn test_policy_rejects_numeric_password() {
        let problems = check_password_policy("83749265", "anna@example.com").unwrap_err();
        assert!(problems.iter().any(|p| p.contains("entirely numeric")));
    }

    #[test]
    fn test_policy_rejects_common_password() {
        let problems = check_password_policy("Password123", "anna@example.com").unwrap_err();
        assert!(problems.iter().any(|p| p.contains("too common")));
    }

    #[test]
    fn test_policy_rejects_password_like_email() {
        let problems =
            check_password_policy("annakowalska99", "annakowalska@example.com").unwrap_err();
        assert!(problems.iter().any(|p| p.contains("similar")));
    }

    #[test]
    fn test_policy_reports_every_violation() {
        let problems = check_password_policy("1234", "x@example.com").unwrap_err();
        assert_eq!(problems.len(), 2);
    }

    #[test]
    fn test_password_error_display() {
        let err = PasswordError::HashError("test error".to_string());
        assert!(err.to_string().contains("test error"));
        assert_eq!(
            PasswordError::InvalidHashFormat.to_string(),
            "Invalid password hash format"
        );
    }
}
