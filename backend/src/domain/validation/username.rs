//! Username validation.

use std::sync::OnceLock;

use regex::Regex;

use super::{IssueKind, IssueList, RawField, ValidationIssue, char_len, fields, issues_of};
use crate::domain::user::Username;

/// Minimum accepted username length in characters.
pub const USERNAME_MIN_LEN: usize = 3;
/// Maximum accepted username length in characters.
pub const USERNAME_MAX_LEN: usize = 50;

static USERNAME_RE: OnceLock<Regex> = OnceLock::new();

fn username_regex() -> &'static Regex {
    USERNAME_RE.get_or_init(|| {
        // Length is enforced separately.
        Regex::new("^[a-zA-Z0-9_-]+$")
            .unwrap_or_else(|error| panic!("username regex failed to compile: {error}"))
    })
}

/// Run every username rule.
///
/// A blank optional username yields `Ok(None)`. Length and character checks
/// fire independently.
pub fn check_username(raw: &RawField, required: bool) -> Result<Option<Username>, IssueList> {
    let text = match raw {
        RawField::Other(_) => {
            return Err(IssueList::single(
                ValidationIssue::new(
                    IssueKind::UsernameNotString,
                    fields::USERNAME,
                    "Username must be a string",
                )
                .with_value(raw.echo()),
            ));
        }
        RawField::Text(text) if !text.is_empty() => text,
        RawField::Absent | RawField::Null | RawField::Text(_) => {
            if required {
                return Err(IssueList::single(ValidationIssue::new(
                    IssueKind::UsernameRequired,
                    fields::USERNAME,
                    "Username is required",
                )));
            }
            return Ok(None);
        }
    };

    let mut issues = Vec::new();
    let length = char_len(text);
    if !(USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&length) {
        issues.push(
            ValidationIssue::new(
                IssueKind::UsernameBadLength,
                fields::USERNAME,
                format!(
                    "Username must be between {USERNAME_MIN_LEN} and {USERNAME_MAX_LEN} characters"
                ),
            )
            .with_value(raw.echo()),
        );
    }
    if !username_regex().is_match(text) {
        issues.push(
            ValidationIssue::new(
                IssueKind::UsernameBadFormat,
                fields::USERNAME,
                "Username can only contain letters, numbers, underscores, and hyphens",
            )
            .with_value(raw.echo()),
        );
    }

    match IssueList::new(issues) {
        Some(issues) => Err(issues),
        None => Ok(Some(Username::from_validated(text.clone()))),
    }
}

/// Validate a username field, returning every issue found.
pub fn validate_username(raw: &RawField, required: bool) -> Vec<ValidationIssue> {
    issues_of(check_username(raw, required))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn kinds(raw: RawField, required: bool) -> Vec<IssueKind> {
        validate_username(&raw, required)
            .iter()
            .map(ValidationIssue::kind)
            .collect()
    }

    #[rstest]
    #[case(RawField::Absent)]
    #[case(RawField::Null)]
    #[case(RawField::text(""))]
    fn blank_optional_username_is_null(#[case] raw: RawField) {
        assert_eq!(check_username(&raw, false), Ok(None));
    }

    #[rstest]
    fn blank_required_username_is_rejected() {
        assert_eq!(kinds(RawField::Absent, true), vec![IssueKind::UsernameRequired]);
    }

    #[rstest]
    fn non_string_username_is_rejected() {
        assert_eq!(
            kinds(RawField::Other(json!(7)), false),
            vec![IssueKind::UsernameNotString]
        );
    }

    #[rstest]
    #[case("ab", vec![IssueKind::UsernameBadLength])]
    #[case("has space", vec![IssueKind::UsernameBadFormat])]
    #[case("a!", vec![IssueKind::UsernameBadLength, IssueKind::UsernameBadFormat])]
    fn invalid_username_reports_each_rule(#[case] value: &str, #[case] expected: Vec<IssueKind>) {
        assert_eq!(kinds(RawField::text(value), false), expected);
    }

    #[rstest]
    fn overlong_username_reports_length() {
        let value = "u".repeat(USERNAME_MAX_LEN + 1);
        assert_eq!(kinds(RawField::text(value), false), vec![IssueKind::UsernameBadLength]);
    }

    #[rstest]
    #[case("ada")]
    #[case("Grace_Hopper-1906")]
    fn valid_username_is_kept_verbatim(#[case] value: &str) {
        let username = check_username(&RawField::text(value), true)
            .expect("valid username")
            .expect("present username");
        assert_eq!(username.as_ref(), value);
    }
}
