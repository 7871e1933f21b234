//! Form checks run before anything is sent to the server.

use std::sync::OnceLock;

use regex::Regex;

use crate::api::{Credentials, Registration};
use crate::bugs::models::{BugChanges, BugStatus, NewBug};

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MIN_NAME_LEN: usize = 2;
pub const MAX_TITLE_LEN: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("All fields are required")]
    AllFieldsRequired,

    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("Password must be at least 6 characters long")]
    PasswordTooShort,

    #[error("Name must be at least 2 characters long")]
    NameTooShort,

    #[error("Title must be at most 200 characters long")]
    TitleTooLong,

    #[error("Nothing to update")]
    NoChanges,

    #[error("Invalid status value")]
    InvalidStatus,
}

fn blank(s: &str) -> bool {
    s.trim().is_empty()
}

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

fn email_regex() -> Option<&'static Regex> {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL
        .get_or_init(|| match Regex::new(EMAIL_PATTERN) {
            Ok(re) => Some(re),
            Err(e) => {
                tracing::error!("Bad email pattern: {}", e);
                None
            }
        })
        .as_ref()
}

/// `local@domain.tld` with no whitespace; the server does the real check.
pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_some_and(|re| re.is_match(email.trim()))
}

pub fn validate_login(credentials: &Credentials) -> Result<(), ValidationError> {
    if blank(&credentials.email) {
        return Err(ValidationError::Required("Email"));
    }
    if credentials.password.is_empty() {
        return Err(ValidationError::Required("Password"));
    }
    Ok(())
}

/// Checks in the order the registration form reports them.
pub fn validate_registration(registration: &Registration) -> Result<(), ValidationError> {
    if blank(&registration.name) || blank(&registration.email) || registration.password.is_empty()
    {
        return Err(ValidationError::AllFieldsRequired);
    }
    if !is_valid_email(&registration.email) {
        return Err(ValidationError::InvalidEmail);
    }
    if registration.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort);
    }
    if registration.name.trim().chars().count() < MIN_NAME_LEN {
        return Err(ValidationError::NameTooShort);
    }
    Ok(())
}

pub fn validate_new_bug(bug: &NewBug) -> Result<(), ValidationError> {
    if blank(&bug.title) {
        return Err(ValidationError::Required("Title"));
    }
    if blank(&bug.description) {
        return Err(ValidationError::Required("Description"));
    }
    if bug.title.trim().chars().count() > MAX_TITLE_LEN {
        return Err(ValidationError::TitleTooLong);
    }
    Ok(())
}

pub fn validate_changes(changes: &BugChanges) -> Result<(), ValidationError> {
    if changes.is_empty() {
        return Err(ValidationError::NoChanges);
    }
    if changes.title.as_deref().is_some_and(blank) {
        return Err(ValidationError::Required("Title"));
    }
    if changes.description.as_deref().is_some_and(blank) {
        return Err(ValidationError::Required("Description"));
    }
    if changes
        .title
        .as_deref()
        .is_some_and(|t| t.trim().chars().count() > MAX_TITLE_LEN)
    {
        return Err(ValidationError::TitleTooLong);
    }
    Ok(())
}

/// Statuses a client may request; `closed` is set by the backend only.
pub fn validate_status_change(status: BugStatus) -> Result<(), ValidationError> {
    if !status.is_settable() {
        return Err(ValidationError::InvalidStatus);
    }
    Ok(())
}
