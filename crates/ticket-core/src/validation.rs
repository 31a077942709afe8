//! Input validation for ticket and user fields.

use std::fmt;

/// Validation error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Empty value where one is required.
    Empty(String),
    /// Value too long.
    TooLong { field: String, max: usize, actual: usize },
    /// Invalid email format.
    InvalidEmail(String),
    /// Referenced category id is not a known category.
    UnknownCategory(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::Empty(field) => write!(f, "{} cannot be empty", field),
            ValidationError::TooLong { field, max, actual } => {
                write!(f, "{} is too long ({} chars, max {})", field, actual, max)
            }
            ValidationError::InvalidEmail(msg) => write!(f, "Invalid email: {}", msg),
            ValidationError::UnknownCategory(id) => write!(f, "Unknown category: {}", id),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Maximum allowed length for ticket subjects.
pub const MAX_SUBJECT_LENGTH: usize = 200;

/// Maximum allowed length for ticket descriptions and comments.
pub const MAX_BODY_LENGTH: usize = 10_000;

/// Maximum allowed length for email addresses.
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Maximum allowed length for category names.
pub const MAX_CATEGORY_NAME_LENGTH: usize = 80;

/// Validate a required free-text field: non-empty after trimming, bounded.
pub fn validate_text(field: &str, value: &str, max: usize) -> Result<(), ValidationError> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Empty(field.to_string()));
    }

    if value.len() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
            actual: value.len(),
        });
    }

    Ok(())
}

/// Validate a ticket subject.
pub fn validate_subject(subject: &str) -> Result<(), ValidationError> {
    validate_text("subject", subject, MAX_SUBJECT_LENGTH)
}

/// Validate a ticket description.
pub fn validate_description(description: &str) -> Result<(), ValidationError> {
    validate_text("description", description, MAX_BODY_LENGTH)
}

/// Validate a comment body.
pub fn validate_comment(content: &str) -> Result<(), ValidationError> {
    validate_text("comment", content, MAX_BODY_LENGTH)
}

/// Validate a category name.
pub fn validate_category_name(name: &str) -> Result<(), ValidationError> {
    validate_text("category name", name, MAX_CATEGORY_NAME_LENGTH)
}

/// Validate an email address (basic RFC 5322 format check).
///
/// This is a basic validation that checks:
/// - Contains exactly one @
/// - Has at least one character before @
/// - Has at least one character after @
/// - Has at least one dot after @
/// - Is not too long
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Empty("email".to_string()));
    }

    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong {
            field: "email".to_string(),
            max: MAX_EMAIL_LENGTH,
            actual: email.len(),
        });
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return Err(ValidationError::InvalidEmail(
            "must contain exactly one @ symbol".to_string(),
        ));
    }

    let (local, domain) = (parts[0], parts[1]);

    if local.is_empty() {
        return Err(ValidationError::InvalidEmail(
            "missing local part (before @)".to_string(),
        ));
    }

    if domain.is_empty() {
        return Err(ValidationError::InvalidEmail(
            "missing domain (after @)".to_string(),
        ));
    }

    if !domain.contains('.') {
        return Err(ValidationError::InvalidEmail(
            "domain must contain at least one dot".to_string(),
        ));
    }

    if domain.starts_with('.') || domain.ends_with('.') {
        return Err(ValidationError::InvalidEmail(
            "domain cannot start or end with a dot".to_string(),
        ));
    }

    if domain.contains("..") {
        return Err(ValidationError::InvalidEmail(
            "domain cannot contain consecutive dots".to_string(),
        ));
    }

    Ok(())
}
