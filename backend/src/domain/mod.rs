//! Domain primitives, validation and account use-cases.
//!
//! Purpose: keep request validation, access checks and failure
//! classification free of HTTP and database types so every rule can be tested
//! in isolation. Inbound adapters translate [`Failure`] into responses;
//! outbound adapters implement the [`ports`].
//!
//! Public surface:
//! - [`validation`]: field validators and the issue model.
//! - [`ValidationGate`]: per-route accept/reject decision.
//! - [`require_authenticated`] / [`require_ownership`]: access predicates.
//! - [`Failure`]: the single upstream error currency.
//! - [`UserAccounts`]: account use-cases over the store and hasher ports.

pub mod access;
pub mod accounts;
pub mod failure;
pub mod gate;
pub mod ports;
pub mod trace_id;
pub mod user;
pub mod validation;

pub use self::access::{Identity, require_authenticated, require_ownership};
pub use self::accounts::UserAccounts;
pub use self::failure::{BodyFault, Failure, Resource};
pub use self::gate::{
    GatedPayload, LoginCredentials, NewUserRequest, RawInput, RawUserBody, RouteKind, UserPatch,
    ValidationGate, ValidationOutcome,
};
pub use self::trace_id::TraceId;
pub use self::user::{
    EmailAddress, FieldUpdate, NewUser, Password, PasswordHash, User, UserChanges, UserId,
    Username,
};
pub use self::validation::{IssueKind, IssueList, ValidationIssue};
