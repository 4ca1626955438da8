//! Field validators and the issue model they produce.
//!
//! Purpose: turn one already-extracted wire value into zero or more
//! [`ValidationIssue`]s without touching request or response objects, so each
//! rule is testable on its own.
//!
//! Public surface:
//! - [`RawField`]: runtime tag of an untyped JSON field.
//! - [`IssueKind`]: closed set of failing rules.
//! - [`ValidationIssue`]: one failed constraint on one field.
//! - `validate_*`: pure validators returning issue sequences.
//! - `check_*`: the same rules returning the normalised value on success.

mod collector;
mod email;
mod id;
mod password;
mod username;

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub use self::collector::IssueCollector;
pub use self::email::{
    EMAIL_MAX_LEN, EMAIL_MIN_LEN, check_email, normalize_email, validate_email,
};
pub use self::id::{check_positive_integer_id, validate_positive_integer_id};
pub use self::password::{
    PASSWORD_MAX_LEN, PASSWORD_MIN_LEN, check_password, check_password_present,
    validate_password,
};
pub use self::username::{
    USERNAME_MAX_LEN, USERNAME_MIN_LEN, check_username, validate_username,
};

/// Input field names used by the validators.
pub mod fields {
    /// Email address field.
    pub const EMAIL: &str = "email";
    /// Password field.
    pub const PASSWORD: &str = "password";
    /// Optional username field.
    pub const USERNAME: &str = "username";
    /// Path identifier field.
    pub const ID: &str = "id";
    /// Whole request body, used when the body itself cannot be decoded.
    pub const BODY: &str = "body";
}

/// Runtime tag for one field of an untyped JSON body.
///
/// Request bodies are deserialised into structs of `RawField`s with
/// `#[serde(default)]`, so a missing key becomes [`RawField::Absent`] while an
/// explicit `null` becomes [`RawField::Null`]. This is the only place where a
/// "not a string" check is still needed.
///
/// # Examples
/// ```
/// use accounts_backend::domain::validation::RawField;
///
/// let field: RawField = serde_json::from_str("\"ada@example.com\"").expect("json");
/// assert_eq!(field.as_text(), Some("ada@example.com"));
/// assert!(!field.is_blank());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RawField {
    /// The key was not present.
    #[default]
    Absent,
    /// The key was present with a JSON `null`.
    Null,
    /// The key held a JSON string.
    Text(String),
    /// The key held any other JSON value.
    Other(Value),
}

impl RawField {
    /// Build a text field.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Whether the field was sent at all.
    pub fn is_present(&self) -> bool {
        !matches!(self, Self::Absent)
    }

    /// Absent, `null`, or the empty string.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Absent | Self::Null => true,
            Self::Text(value) => value.is_empty(),
            Self::Other(_) => false,
        }
    }

    /// Borrow the string content, if this is a text field.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    /// The value to echo back in an issue, or `None` when nothing was sent.
    pub fn echo(&self) -> Option<Value> {
        match self {
            Self::Absent | Self::Null => None,
            Self::Text(value) => Some(Value::String(value.clone())),
            Self::Other(value) => Some(value.clone()),
        }
    }
}

impl<'de> Deserialize<'de> for RawField {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Null => Self::Null,
            Value::String(text) => Self::Text(text),
            other => Self::Other(other),
        })
    }
}

/// Closed enumeration of failing rules.
///
/// Serialised by variant name (for example `"EmailRequired"`), which is the
/// `name` clients see on each issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssueKind {
    EmailRequired,
    EmailNotString,
    EmailBadLength,
    EmailBadFormat,
    PasswordRequired,
    PasswordNotString,
    PasswordBadLength,
    PasswordWeak,
    UsernameRequired,
    UsernameNotString,
    UsernameBadLength,
    UsernameBadFormat,
    IdNotPositiveInteger,
    /// The request body was not decodable JSON.
    BodyMalformed,
    /// The store refused a column value.
    ConstraintViolated,
    /// The store already holds this value in a unique column.
    DuplicateValue,
    /// The referenced record does not exist.
    ResourceMissing,
}

impl IssueKind {
    /// Stable identifier used on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EmailRequired => "EmailRequired",
            Self::EmailNotString => "EmailNotString",
            Self::EmailBadLength => "EmailBadLength",
            Self::EmailBadFormat => "EmailBadFormat",
            Self::PasswordRequired => "PasswordRequired",
            Self::PasswordNotString => "PasswordNotString",
            Self::PasswordBadLength => "PasswordBadLength",
            Self::PasswordWeak => "PasswordWeak",
            Self::UsernameRequired => "UsernameRequired",
            Self::UsernameNotString => "UsernameNotString",
            Self::UsernameBadLength => "UsernameBadLength",
            Self::UsernameBadFormat => "UsernameBadFormat",
            Self::IdNotPositiveInteger => "IdNotPositiveInteger",
            Self::BodyMalformed => "BodyMalformed",
            Self::ConstraintViolated => "ConstraintViolated",
            Self::DuplicateValue => "DuplicateValue",
            Self::ResourceMissing => "ResourceMissing",
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One failed constraint on one input field.
///
/// ## Invariants
/// - `field` is never empty; a blank name is replaced by `"field"`.
/// - `value` is `None` when the field was missing. Password issues never
///   carry a value.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationIssue {
    kind: IssueKind,
    field: String,
    message: String,
    value: Option<Value>,
}

impl ValidationIssue {
    /// Create an issue without an echoed value.
    pub fn new(kind: IssueKind, field: impl Into<String>, message: impl Into<String>) -> Self {
        let field = field.into();
        let field = if field.trim().is_empty() {
            "field".to_owned()
        } else {
            field
        };
        Self {
            kind,
            field,
            message: message.into(),
            value: None,
        }
    }

    /// Attach the offending raw value.
    pub fn with_value(mut self, value: Option<Value>) -> Self {
        self.value = value;
        self
    }

    /// Failing rule.
    pub fn kind(&self) -> IssueKind {
        self.kind
    }

    /// Offending input field.
    pub fn field(&self) -> &str {
        self.field.as_str()
    }

    /// Human-readable explanation.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Offending raw value, if one was sent and may be echoed.
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }
}

/// Ordered, non-empty sequence of issues.
///
/// Only [`IssueList::new`] and [`IssueList::single`] construct it, so a
/// rejection can never be empty.
#[derive(Debug, Clone, PartialEq)]
pub struct IssueList(Vec<ValidationIssue>);

impl IssueList {
    /// Wrap `issues`, returning `None` when there are none.
    pub fn new(issues: Vec<ValidationIssue>) -> Option<Self> {
        if issues.is_empty() {
            None
        } else {
            Some(Self(issues))
        }
    }

    /// A list holding exactly one issue.
    pub fn single(issue: ValidationIssue) -> Self {
        Self(vec![issue])
    }

    /// Number of issues; always at least one.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; provided for API symmetry with slices.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Iterate in collection order.
    pub fn iter(&self) -> std::slice::Iter<'_, ValidationIssue> {
        self.0.iter()
    }

    /// Borrow the issues in collection order.
    pub fn as_slice(&self) -> &[ValidationIssue] {
        self.0.as_slice()
    }

    /// Issue kinds in collection order.
    pub fn kinds(&self) -> Vec<IssueKind> {
        self.0.iter().map(ValidationIssue::kind).collect()
    }

    /// Unwrap into the underlying vector.
    pub fn into_vec(self) -> Vec<ValidationIssue> {
        self.0
    }
}

impl IntoIterator for IssueList {
    type Item = ValidationIssue;
    type IntoIter = std::vec::IntoIter<ValidationIssue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a IssueList {
    type Item = &'a ValidationIssue;
    type IntoIter = std::slice::Iter<'a, ValidationIssue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Convert the outcome of a `check_*` function into a plain issue sequence.
pub(crate) fn issues_of<T>(result: Result<T, IssueList>) -> Vec<ValidationIssue> {
    match result {
        Ok(_) => Vec::new(),
        Err(issues) => issues.into_vec(),
    }
}

/// Count characters rather than bytes so length limits match what users see.
pub(crate) fn char_len(value: &str) -> usize {
    value.chars().count()
}
