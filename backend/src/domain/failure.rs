//! Tagged failure signalled by every upstream component.
//!
//! Validators, the gate, access predicates, the account service and the
//! store adapters never build responses. They return a [`Failure`], and the
//! HTTP error normaliser matches on it exhaustively to pick the problem type,
//! status and issues.

use std::fmt;

use super::gate::{IssueList, RouteKind};
use super::ports::{HashingError, UserPersistenceError};
use super::user::UserId;
use super::validation::{IssueKind, ValidationIssue};

/// Resources that can be reported missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    User,
    Route,
}

impl Resource {
    /// Capitalised label used in titles and details.
    pub fn label(self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Route => "Route",
        }
    }

    /// Problem type path segment, for example `/user-not-found`.
    pub fn not_found_type(self) -> &'static str {
        match self {
            Self::User => "/user-not-found",
            Self::Route => "/route-not-found",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Why a request body could not be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyFault {
    /// Not syntactically valid JSON, or not the expected shape.
    Syntax,
    /// Larger than the accepted body limit.
    TooLarge,
    /// Missing or non-JSON `Content-Type`.
    ContentType,
    /// The payload stream failed before it was complete.
    Unreadable,
}

impl BodyFault {
    /// Client-facing issue message.
    pub fn message(self) -> &'static str {
        match self {
            Self::Syntax => "Request body must be valid JSON",
            Self::TooLarge => "Request body exceeds the size limit",
            Self::ContentType => "Content-Type must be application/json",
            Self::Unreadable => "Request body could not be read",
        }
    }
}

/// Every way a request can fail.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Failure {
    /// The validation gate rejected the input.
    #[error("{}", .route.rejection_detail())]
    Validation { route: RouteKind, issues: IssueList },
    /// The body was not decodable JSON.
    #[error("request body is malformed: {message}")]
    MalformedBody { fault: BodyFault, message: String },
    /// The store refused one or more column values.
    #[error("store rejected the submitted values")]
    StoreRejected { issues: IssueList },
    /// No identity is bound to the request.
    #[error("User is not logged in")]
    AuthenticationRequired,
    /// The identity does not own the target resource.
    #[error("You can only access your own resources")]
    AuthorizationDenied,
    /// Unknown email or wrong password.
    #[error("Invalid email or password")]
    InvalidCredentials,
    /// The target resource does not exist.
    #[error("{resource} not found")]
    NotFound {
        resource: Resource,
        id: Option<String>,
    },
    /// A unique column already holds the value.
    #[error("{field} already exists")]
    Duplicate { field: String, value: Option<String> },
    /// A foreign key points at a missing row.
    #[error("referenced record does not exist ({constraint})")]
    ReferenceMissing { constraint: String },
    /// The store cannot be reached.
    #[error("store unavailable: {message}")]
    Unavailable { message: String },
    /// Anything else.
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl Failure {
    /// Missing user with a known id.
    pub fn user_not_found(id: UserId) -> Self {
        Self::NotFound {
            resource: Resource::User,
            id: Some(id.to_string()),
        }
    }

    /// No route matches the request path.
    pub fn route_not_found(path: impl Into<String>) -> Self {
        Self::NotFound {
            resource: Resource::Route,
            id: Some(path.into()),
        }
    }

    /// Unclassified failure carrying server-side detail.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Undecodable request body.
    pub fn malformed_body(fault: BodyFault, message: impl Into<String>) -> Self {
        Self::MalformedBody {
            fault,
            message: message.into(),
        }
    }
}

impl From<UserPersistenceError> for Failure {
    fn from(error: UserPersistenceError) -> Self {
        match error {
            UserPersistenceError::Validation { field, message } => Self::StoreRejected {
                issues: IssueList::single(ValidationIssue::new(
                    IssueKind::ConstraintViolated,
                    field,
                    message,
                )),
            },
            UserPersistenceError::Uniqueness { field, value } => Self::Duplicate { field, value },
            UserPersistenceError::ForeignKey { constraint } => Self::ReferenceMissing { constraint },
            UserPersistenceError::Connection { message } => Self::Unavailable { message },
            UserPersistenceError::NotFound { id } => Self::NotFound {
                resource: Resource::User,
                id: Some(id.to_string()),
            },
            UserPersistenceError::Query { message } => Self::Internal { message },
        }
    }
}

impl From<HashingError> for Failure {
    fn from(error: HashingError) -> Self {
        Self::internal(error.to_string())
    }
}
