//! Per-request accumulation of validation issues.

use super::{IssueKind, IssueList, ValidationIssue, fields};
use crate::domain::gate::ValidationOutcome;

/// Accumulates issues from several validators for one request.
///
/// Issues keep the order in which fields were checked.
///
/// # Examples
/// ```
/// use accounts_backend::domain::validation::{IssueCollector, RawField, validate_email};
///
/// let mut collector = IssueCollector::new();
/// collector.extend(validate_email(&RawField::Absent));
/// assert!(!collector.is_empty());
/// assert_eq!(collector.to_list().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct IssueCollector {
    issues: Vec<ValidationIssue>,
}

impl IssueCollector {
    /// Start an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one issue.
    pub fn push(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    /// Append issues in order.
    pub fn extend(&mut self, issues: impl IntoIterator<Item = ValidationIssue>) {
        self.issues.extend(issues);
    }

    /// Record the issues of a `check_*` result and return its value, if any.
    pub fn check<T>(&mut self, result: Result<T, IssueList>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(issues) => {
                self.extend(issues);
                None
            }
        }
    }

    /// Whether no issue has been recorded.
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Number of recorded issues.
    pub fn len(&self) -> usize {
        self.issues.len()
    }

    /// Snapshot of the recorded issues in collection order.
    pub fn to_list(&self) -> Vec<ValidationIssue> {
        self.issues.clone()
    }

    /// Turn the collected issues and an assembled payload into an outcome.
    ///
    /// Any recorded issue rejects the request. A missing payload with no
    /// issues cannot happen for well-formed callers; it is reported as a
    /// malformed body rather than accepted.
    pub fn conclude<T>(self, payload: Option<T>) -> ValidationOutcome<T> {
        if let Some(issues) = IssueList::new(self.issues) {
            return ValidationOutcome::Rejected(issues);
        }
        match payload {
            Some(payload) => ValidationOutcome::Accepted(payload),
            None => ValidationOutcome::Rejected(IssueList::single(ValidationIssue::new(
                IssueKind::BodyMalformed,
                fields::BODY,
                "Request body could not be validated",
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::validation::{RawField, check_email, validate_password};
    use rstest::rstest;

    #[rstest]
    fn keeps_check_order() {
        let mut collector = IssueCollector::new();
        collector.extend(validate_password(&RawField::text("short")));
        let email = collector.check(check_email(&RawField::Absent));

        assert!(email.is_none());
        let kinds: Vec<_> = collector.to_list().iter().map(ValidationIssue::kind).collect();
        assert_eq!(kinds, vec![IssueKind::PasswordBadLength, IssueKind::EmailRequired]);
    }

    #[rstest]
    fn empty_collector_accepts_payload() {
        let collector = IssueCollector::new();
        assert!(collector.is_empty());
        assert_eq!(collector.conclude(Some(7)), ValidationOutcome::Accepted(7));
    }

    #[rstest]
    fn issues_reject_even_with_payload() {
        let mut collector = IssueCollector::new();
        collector.push(ValidationIssue::new(IssueKind::EmailRequired, fields::EMAIL, "m"));
        match collector.conclude(Some(7)) {
            ValidationOutcome::Rejected(issues) => assert_eq!(issues.len(), 1),
            ValidationOutcome::Accepted(_) => panic!("expected rejection"),
        }
    }

    #[rstest]
    fn missing_payload_never_accepts() {
        let outcome: ValidationOutcome<u8> = IssueCollector::new().conclude(None);
        match outcome {
            ValidationOutcome::Rejected(issues) => {
                assert_eq!(issues.kinds(), vec![IssueKind::BodyMalformed]);
            }
            ValidationOutcome::Accepted(_) => panic!("expected rejection"),
        }
    }
}
