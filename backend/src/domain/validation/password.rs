//! Password validation.
//!
//! Passwords are never normalised and never echoed: every issue raised here
//! leaves its `value` empty.

use super::{IssueKind, IssueList, RawField, ValidationIssue, char_len, fields, issues_of};
use crate::domain::user::Password;

/// Minimum accepted password length in characters.
pub const PASSWORD_MIN_LEN: usize = 8;
/// Maximum accepted password length in characters.
pub const PASSWORD_MAX_LEN: usize = 100;

/// Run every password rule, returning the untouched password on success.
///
/// The strength rule only fires when the length is within bounds.
pub fn check_password(raw: &RawField) -> Result<Password, IssueList> {
    let text = present_text(raw)?;

    let length = char_len(text);
    if !(PASSWORD_MIN_LEN..=PASSWORD_MAX_LEN).contains(&length) {
        return Err(IssueList::single(ValidationIssue::new(
            IssueKind::PasswordBadLength,
            fields::PASSWORD,
            format!(
                "Password must be between {PASSWORD_MIN_LEN} and {PASSWORD_MAX_LEN} characters"
            ),
        )));
    }

    if !is_strong(text) {
        return Err(IssueList::single(ValidationIssue::new(
            IssueKind::PasswordWeak,
            fields::PASSWORD,
            "Password must contain at least one lowercase letter, one uppercase letter, and one number",
        )));
    }

    Ok(Password::new(text))
}

/// Presence and type checks only, used where strength rules do not apply.
pub fn check_password_present(raw: &RawField) -> Result<Password, IssueList> {
    present_text(raw).map(Password::new)
}

/// Validate a password field, returning every issue found.
pub fn validate_password(raw: &RawField) -> Vec<ValidationIssue> {
    issues_of(check_password(raw))
}

fn present_text(raw: &RawField) -> Result<&str, IssueList> {
    match raw {
        RawField::Text(text) if !text.is_empty() => Ok(text.as_str()),
        RawField::Other(_) => Err(IssueList::single(ValidationIssue::new(
            IssueKind::PasswordNotString,
            fields::PASSWORD,
            "Password must be a string",
        ))),
        RawField::Absent | RawField::Null | RawField::Text(_) => Err(IssueList::single(
            ValidationIssue::new(IssueKind::PasswordRequired, fields::PASSWORD, "Password is required"),
        )),
    }
}

fn is_strong(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_lowercase())
        && text.chars().any(|c| c.is_ascii_uppercase())
        && text.chars().any(|c| c.is_ascii_digit())
}
