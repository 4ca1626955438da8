//! Email address validation and normalisation.

use std::sync::OnceLock;

use regex::Regex;

use super::{IssueKind, IssueList, RawField, ValidationIssue, char_len, fields, issues_of};
use crate::domain::user::EmailAddress;

/// Minimum accepted email length in characters.
pub const EMAIL_MIN_LEN: usize = 5;
/// Maximum accepted email length in characters.
pub const EMAIL_MAX_LEN: usize = 254;

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        // Local part, `@`, up to three domain labels of at most 63 characters,
        // then an alphabetic TLD of 2 to 63 characters.
        let pattern = concat!(
            r"^[a-zA-Z0-9](?:[a-zA-Z0-9._-]{0,61}[a-zA-Z0-9])?",
            r"@[a-zA-Z0-9](?:[a-zA-Z0-9_-]{0,61}[a-zA-Z0-9])?",
            r"(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9_-]{0,61}[a-zA-Z0-9])?){0,2}",
            r"\.[a-zA-Z]{2,63}$",
        );
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Lower-case and trim an email address.
///
/// Idempotent: normalising an already normalised address returns it unchanged.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Run every email rule, returning the normalised address on success.
///
/// Length and format are checked independently against the trimmed input, so
/// a short malformed value reports both problems at once.
pub fn check_email(raw: &RawField) -> Result<EmailAddress, IssueList> {
    let text = match raw {
        RawField::Absent | RawField::Null => return Err(required()),
        RawField::Other(_) => {
            return Err(IssueList::single(
                ValidationIssue::new(IssueKind::EmailNotString, fields::EMAIL, "Email must be a string")
                    .with_value(raw.echo()),
            ));
        }
        RawField::Text(text) => text,
    };

    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(required());
    }

    let mut issues = Vec::new();
    let length = char_len(trimmed);
    if !(EMAIL_MIN_LEN..=EMAIL_MAX_LEN).contains(&length) {
        issues.push(
            ValidationIssue::new(
                IssueKind::EmailBadLength,
                fields::EMAIL,
                format!("Email must be between {EMAIL_MIN_LEN} and {EMAIL_MAX_LEN} characters"),
            )
            .with_value(raw.echo()),
        );
    }
    if !email_regex().is_match(trimmed) {
        issues.push(
            ValidationIssue::new(
                IssueKind::EmailBadFormat,
                fields::EMAIL,
                "Please provide a valid email address",
            )
            .with_value(raw.echo()),
        );
    }

    match IssueList::new(issues) {
        Some(issues) => Err(issues),
        None => Ok(EmailAddress::from_normalized(normalize_email(trimmed))),
    }
}

/// Validate an email field, returning every issue found.
pub fn validate_email(raw: &RawField) -> Vec<ValidationIssue> {
    issues_of(check_email(raw))
}

fn required() -> IssueList {
    IssueList::single(ValidationIssue::new(
        IssueKind::EmailRequired,
        fields::EMAIL,
        "Email is required",
    ))
}
