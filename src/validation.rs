//! Local input checks run before a request is sent.
//!
//! Limits mirror the backend's so obviously bad input fails fast without a
//! round trip. Like the backend, lengths are UTF-8 byte counts, so a title of
//! 41 three-byte characters is already over 120. Passing here does not
//! guarantee the server accepts the input, and nothing in this module touches
//! the session.

pub const USERNAME_MIN: usize = 3;
pub const USERNAME_MAX: usize = 32;
pub const PASSWORD_MIN: usize = 8;
pub const PASSWORD_MAX: usize = 72;
pub const TITLE_MAX: usize = 120;
pub const CONTENT_MAX: usize = 50_000;
pub const COMMENT_MAX: usize = 2_000;
pub const COLLECTION_NAME_MAX: usize = 80;
pub const COLLECTION_DESCRIPTION_MAX: usize = 500;
pub const SEARCH_QUERY_MAX: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self { field, message: message.into() }
    }

    #[must_use]
    pub fn code(&self) -> &'static str {
        "VALIDATION_ERROR"
    }
}

fn check_len(field: &'static str, label: &str, value: &str, min: usize, max: usize) -> Result<(), ValidationError> {
    let len = value.len();
    if len < min || len > max {
        let message = if min == 0 {
            format!("{label} length must be <={max}")
        } else {
            format!("{label} length must be {min}-{max}")
        };
        return Err(ValidationError::new(field, message));
    }
    Ok(())
}

/// # Errors
///
/// Fails on length outside 3-32 or characters other than ASCII letters,
/// digits and underscore.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    check_len("username", "username", username, USERNAME_MIN, USERNAME_MAX)?;
    if !username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(ValidationError::new(
            "username",
            "username only allows letters, digits and underscore",
        ));
    }
    Ok(())
}

/// # Errors
///
/// Fails on length outside 8-72.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    check_len("password", "password", password, PASSWORD_MIN, PASSWORD_MAX)
}

/// Checks run before a password change is submitted.
///
/// # Errors
///
/// Fails when the new password is out of range, the confirmation differs,
/// or the new password equals the current one.
pub fn validate_password_change(current: &str, new: &str, confirm: &str) -> Result<(), ValidationError> {
    check_len("newPassword", "password", new, PASSWORD_MIN, PASSWORD_MAX)?;
    if new != confirm {
        return Err(ValidationError::new("confirmPassword", "new passwords do not match"));
    }
    if new == current {
        return Err(ValidationError::new("newPassword", "new password must differ from the current one"));
    }
    Ok(())
}

/// # Errors
///
/// Fails on length outside 1-120.
pub fn validate_title(title: &str) -> Result<(), ValidationError> {
    check_len("title", "title", title, 1, TITLE_MAX)
}

/// # Errors
///
/// Fails on length outside 1-50000.
pub fn validate_content(content: &str) -> Result<(), ValidationError> {
    check_len("contentMarkdown", "content", content, 1, CONTENT_MAX)
}

/// # Errors
///
/// Fails on length outside 1-2000.
pub fn validate_comment(content: &str) -> Result<(), ValidationError> {
    check_len("content", "comment content", content, 1, COMMENT_MAX)
}

/// # Errors
///
/// Fails on length outside 1-80.
pub fn validate_collection_name(name: &str) -> Result<(), ValidationError> {
    check_len("name", "collection name", name, 1, COLLECTION_NAME_MAX)
}

/// # Errors
///
/// Fails above 500 bytes.
pub fn validate_collection_description(description: &str) -> Result<(), ValidationError> {
    check_len("description", "collection description", description, 0, COLLECTION_DESCRIPTION_MAX)
}

/// # Errors
///
/// Fails on length outside 1-100.
pub fn validate_search_query(q: &str) -> Result<(), ValidationError> {
    check_len("q", "search query", q, 1, SEARCH_QUERY_MAX)
}

#[cfg(test)]
#[path = "validation_test.rs"]
mod tests;
