/// Password Hashing and Verification
///
/// Handles password hashing with bcrypt and password strength validation.

use bcrypt::{hash, verify};

use crate::error::{AppError, HashingError, ValidationError};

const MIN_PASSWORD_LENGTH: usize = 6;
const MAX_PASSWORD_LENGTH: usize = 128;

/// Verified against when a login names an unknown user, so that both failure
/// paths spend one bcrypt verification.
const DUMMY_PASSWORD: &str = "gatekeeper-timing-equalizer";

/// bcrypt hasher with a fixed work factor
#[derive(Clone)]
pub struct PasswordHasher {
    cost: u32,
    dummy_hash: String,
}

impl PasswordHasher {
    /// # Errors
    /// Returns `HashingError` if `cost` is outside bcrypt's accepted range
    pub fn new(cost: u32) -> Result<Self, AppError> {
        let dummy_hash = hash(DUMMY_PASSWORD, cost)
            .map_err(|e| HashingError(format!("invalid bcrypt cost {}: {}", cost, e)))?;
        Ok(Self { cost, dummy_hash })
    }

    /// Hash a password using bcrypt
    ///
    /// Output is salted: hashing the same input twice yields different digests.
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        hash(password, self.cost).map_err(|e| HashingError(e.to_string()).into())
    }

    /// Verify a password against its hash
    ///
    /// A mismatch is `Ok(false)`; only a structurally malformed hash is an error.
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, AppError> {
        verify(password, hash).map_err(|e| HashingError(e.to_string()).into())
    }

    /// Burn one verification against the dummy hash. Always `false`.
    pub fn verify_dummy(&self, password: &str) -> bool {
        let _ = verify(password, &self.dummy_hash);
        false
    }
}

/// Validate password strength requirements
///
/// Requirements:
/// - Minimum 6 characters
/// - Maximum 128 characters
/// - At least one digit
/// - At least one lowercase letter
/// - At least one uppercase letter
pub fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::EmptyField("password".to_string()));
    }

    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::TooShort(
            "password".to_string(),
            MIN_PASSWORD_LENGTH,
        ));
    }

    // bcrypt only reads 72 bytes; the upper bound keeps hashing cost predictable
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::TooLong(
            "password".to_string(),
            MAX_PASSWORD_LENGTH,
        ));
    }

    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_lowercase = password.chars().any(|c| c.is_lowercase());
    let has_uppercase = password.chars().any(|c| c.is_uppercase());

    if !has_digit || !has_lowercase || !has_uppercase {
        return Err(ValidationError::InvalidFormat(
            "password must contain at least one digit, one lowercase letter, and one uppercase letter"
                .to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> PasswordHasher {
        PasswordHasher::new(4).expect("Failed to build hasher")
    }

    #[test]
    fn test_hash_password() {
        let password = "Secret1!";
        let hash = hasher().hash(password).expect("Failed to hash password");

        assert_ne!(password, hash);
        assert!(hash.starts_with("$2"));
    }

    #[test]
    fn test_hash_is_salted() {
        let hasher = hasher();
        let first = hasher.hash("Secret1!").expect("Failed to hash password");
        let second = hasher.hash("Secret1!").expect("Failed to hash password");

        assert_ne!(first, second);
        assert_eq!(first.len(), second.len());
    }

    #[test]
    fn test_verify_password() {
        let hasher = hasher();
        let hash = hasher.hash("Secret1!").expect("Failed to hash password");

        assert!(hasher.verify("Secret1!", &hash).expect("Failed to verify password"));
    }

    #[test]
    fn test_verify_wrong_password() {
        let hasher = hasher();
        let hash = hasher.hash("Secret1!").expect("Failed to hash password");

        let is_valid = hasher.verify("Other2!", &hash).expect("Failed to verify password");
        assert!(!is_valid);
    }

    #[test]
    fn test_verify_malformed_hash_is_hashing_error() {
        let result = hasher().verify("Secret1!", "not-a-bcrypt-hash");
        assert!(matches!(result, Err(AppError::Hashing(_))));
    }

    #[test]
    fn test_invalid_cost_is_rejected() {
        assert!(PasswordHasher::new(99).is_err());
    }

    #[test]
    fn test_verify_dummy_is_always_false() {
        let hasher = hasher();
        assert!(!hasher.verify_dummy(DUMMY_PASSWORD));
        assert!(!hasher.verify_dummy("anything"));
    }

    #[test]
    fn test_password_policy() {
        assert!(validate_password_strength("Secret1!").is_ok());
        assert!(validate_password_strength("Other2!").is_ok());

        assert!(matches!(
            validate_password_strength(""),
            Err(ValidationError::EmptyField(_))
        ));
        assert!(matches!(
            validate_password_strength("Ab1"),
            Err(ValidationError::TooShort(_, MIN_PASSWORD_LENGTH))
        ));

        let long_password = "a".repeat(MAX_PASSWORD_LENGTH + 1) + "A1";
        assert!(matches!(
            validate_password_strength(&long_password),
            Err(ValidationError::TooLong(_, MAX_PASSWORD_LENGTH))
        ));
    }

    #[test]
    fn test_password_character_classes() {
        assert!(validate_password_strength("NoDigitsHere").is_err());
        assert!(validate_password_strength("NOLOWERCASE1").is_err());
        assert!(validate_password_strength("nouppercase1").is_err());
    }
}
