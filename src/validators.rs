/// Input validators
///
/// Usernames are the login identifier, so they are normalized (trimmed) once
/// here and stored exactly as returned.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ValidationError;

const MIN_USERNAME_LENGTH: usize = 3;
const MAX_USERNAME_LENGTH: usize = 64;

lazy_static! {
    // Letters, digits and the punctuation found in handles and email addresses
    static ref USERNAME_REGEX: Regex = Regex::new(r"^[A-Za-z0-9._@+-]+$").unwrap();
}

/// Validates a username and returns its trimmed form
/// - Length between 3 and 64 characters
/// - Only `[A-Za-z0-9._@+-]`
pub fn is_valid_username(username: &str) -> Result<String, ValidationError> {
    let trimmed = username.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("username".to_string()));
    }

    if trimmed.len() < MIN_USERNAME_LENGTH {
        return Err(ValidationError::TooShort(
            "username".to_string(),
            MIN_USERNAME_LENGTH,
        ));
    }

    if trimmed.len() > MAX_USERNAME_LENGTH {
        return Err(ValidationError::TooLong(
            "username".to_string(),
            MAX_USERNAME_LENGTH,
        ));
    }

    if !USERNAME_REGEX.is_match(trimmed) {
        return Err(ValidationError::InvalidFormat(
            "username may only contain letters, digits and . _ @ + -".to_string(),
        ));
    }

    Ok(trimmed.to_string())
}
