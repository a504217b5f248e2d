//! Account rules shared by registration and login.

use crate::error::CoreError;

/// Maximum username length (characters).
pub const MAX_USERNAME_LENGTH: usize = 80;

/// Default minimum password length when none is configured.
pub const DEFAULT_MIN_PASSWORD_LENGTH: usize = 8;

/// Canonical form of a username: surrounding whitespace removed.
pub fn normalize_username(username: &str) -> &str {
    username.trim()
}

/// Validate that a username is non-blank, bounded, and has no inner whitespace.
pub fn validate_username(username: &str) -> Result<(), CoreError> {
    let name = normalize_username(username);
    if name.is_empty() {
        return Err(CoreError::Validation("Username must not be empty".into()));
    }
    if name.chars().count() > MAX_USERNAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Username exceeds maximum length of {MAX_USERNAME_LENGTH} characters"
        )));
    }
    if name.chars().any(char::is_whitespace) {
        return Err(CoreError::Validation(
            "Username must not contain whitespace".into(),
        ));
    }
    Ok(())
}

/// Validate that a password meets the minimum length.
pub fn validate_password_strength(password: &str, min_length: usize) -> Result<(), CoreError> {
    if password.chars().count() < min_length {
        return Err(CoreError::Validation(format!(
            "Password must be at least {min_length} characters long"
        )));
    }
    Ok(())
}
