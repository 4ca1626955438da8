//! Positive integer identifier validation for path parameters.

use serde_json::Value;

use super::{IssueKind, IssueList, ValidationIssue, fields, issues_of};
use crate::domain::user::UserId;

/// Parse a strictly positive base-10 identifier.
///
/// The parsed value must print back to exactly the input, so leading zeros,
/// signs, surrounding whitespace, fractions and out-of-range values are all
/// rejected with a single `IdNotPositiveInteger` issue.
pub fn check_positive_integer_id(raw: &str) -> Result<UserId, IssueList> {
    raw.parse::<i64>()
        .ok()
        .filter(|parsed| parsed.to_string() == raw)
        .and_then(UserId::new)
        .ok_or_else(|| {
            IssueList::single(
                ValidationIssue::new(
                    IssueKind::IdNotPositiveInteger,
                    fields::ID,
                    "ID must be a positive integer",
                )
                .with_value(Some(Value::String(raw.to_owned()))),
            )
        })
}

/// Validate a path identifier, returning at most one issue.
pub fn validate_positive_integer_id(raw: &str) -> Vec<ValidationIssue> {
    issues_of(check_positive_integer_id(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("0")]
    #[case("-5")]
    #[case("abc")]
    #[case("3.2")]
    #[case("03")]
    #[case(" 3")]
    #[case("+3")]
    #[case("")]
    #[case("99999999999999999999")]
    fn rejects_non_canonical_or_non_positive_ids(#[case] raw: &str) {
        let issues = validate_positive_integer_id(raw);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind(), IssueKind::IdNotPositiveInteger);
        assert_eq!(issues[0].field(), "id");
        assert_eq!(issues[0].value(), Some(&Value::String(raw.to_owned())));
    }

    #[rstest]
    #[case("1", 1)]
    #[case("42", 42)]
    #[case("9223372036854775807", i64::MAX)]
    fn accepts_canonical_positive_ids(#[case] raw: &str, #[case] expected: i64) {
        let id = check_positive_integer_id(raw).expect("valid id");
        assert_eq!(id.get(), expected);
    }
}
