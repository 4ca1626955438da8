//! Validation gate: per-route accept/reject decision over raw request input.
//!
//! Handlers hand the gate an untouched [`RawInput`]. The gate runs the field
//! validators relevant to that route and returns either a normalised payload
//! or the complete, ordered issue list. It never writes a response; a
//! rejection is turned into [`Failure::Validation`] and left for the error
//! normaliser.
//!
//! Update semantics per field (`PUT /users/{id}`):
//!
//! | field      | absent | `null` / `""`                | other value      |
//! |------------|--------|------------------------------|------------------|
//! | `email`    | keep   | reject (`EmailRequired`)     | validate and set |
//! | `password` | keep   | reject (`PasswordRequired`)  | validate and set |
//! | `username` | keep   | clear to `NULL`              | validate and set |
//!
//! Blank means "clear" only for nullable columns; non-nullable columns reject
//! it as missing.

use serde::Deserialize;

use super::failure::Failure;
use super::user::{EmailAddress, FieldUpdate, Password, UserId, Username};
use super::validation::{
    IssueCollector, RawField, check_email, check_password, check_password_present,
    check_positive_integer_id, check_username,
};

pub use super::validation::IssueList;

/// Route families with their own validation rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteKind {
    /// Account creation (`POST /auth/register`, `POST /users`).
    UserCreate,
    /// Partial account update (`PUT /users/{id}` body).
    UserUpdate,
    /// Any route carrying a user id in its path.
    UserIdParam,
    /// Credential check (`POST /auth/login`).
    Login,
}

impl RouteKind {
    /// Summary used as the `detail` of a validation rejection.
    pub fn rejection_detail(self) -> &'static str {
        match self {
            Self::UserCreate => "Validation failed for user creation",
            Self::UserUpdate => "Validation failed for user update",
            Self::UserIdParam => "ID validation failed",
            Self::Login => "Validation failed for login",
        }
    }
}

/// Untyped user body as sent on the wire.
///
/// Unknown keys are ignored; missing keys stay [`RawField::Absent`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawUserBody {
    pub email: RawField,
    pub password: RawField,
    pub username: RawField,
}

/// Raw input tagged with the route it arrived on.
///
/// The route travels with the data so a body can never be checked against
/// the rules of another route.
#[derive(Debug, Clone, PartialEq)]
pub enum RawInput {
    UserCreate(RawUserBody),
    UserUpdate(RawUserBody),
    UserIdParam(String),
    Login(RawUserBody),
}

impl RawInput {
    /// Route family of this input.
    pub fn kind(&self) -> RouteKind {
        match self {
            Self::UserCreate(_) => RouteKind::UserCreate,
            Self::UserUpdate(_) => RouteKind::UserUpdate,
            Self::UserIdParam(_) => RouteKind::UserIdParam,
            Self::Login(_) => RouteKind::Login,
        }
    }
}

/// Result of gating one request.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome<T> {
    /// Every check passed; the payload is normalised.
    Accepted(T),
    /// At least one check failed.
    Rejected(IssueList),
}

impl<T> ValidationOutcome<T> {
    /// Whether the request may proceed.
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }

    /// Transform an accepted payload.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ValidationOutcome<U> {
        match self {
            Self::Accepted(payload) => ValidationOutcome::Accepted(f(payload)),
            Self::Rejected(issues) => ValidationOutcome::Rejected(issues),
        }
    }

    /// Convert into a `Result`, signalling a rejection as a validation failure.
    pub fn into_result(self, route: RouteKind) -> Result<T, Failure> {
        match self {
            Self::Accepted(payload) => Ok(payload),
            Self::Rejected(issues) => Err(Failure::Validation { route, issues }),
        }
    }
}

/// Normalised account creation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserRequest {
    pub email: EmailAddress,
    pub password: Password,
    pub username: Option<Username>,
}

/// Normalised partial update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub email: Option<EmailAddress>,
    pub password: Option<Password>,
    pub username: FieldUpdate<Username>,
}

impl UserPatch {
    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.password.is_none() && self.username.is_keep()
    }
}

/// Normalised login attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    pub email: EmailAddress,
    pub password: Password,
}

/// Accepted payload of [`ValidationGate::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatedPayload {
    NewUser(NewUserRequest),
    UserPatch(UserPatch),
    UserId(UserId),
    Login(LoginCredentials),
}

/// Per-route entry check.
///
/// Stateless; every call works on a local collector, so the gate can be used
/// from any number of concurrent requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationGate;

impl ValidationGate {
    /// Run the checks for the route the input arrived on.
    pub fn run(input: &RawInput) -> ValidationOutcome<GatedPayload> {
        match input {
            RawInput::UserCreate(body) => Self::user_create(body).map(GatedPayload::NewUser),
            RawInput::UserUpdate(body) => Self::user_update(body).map(GatedPayload::UserPatch),
            RawInput::UserIdParam(raw) => Self::user_id_param(raw).map(GatedPayload::UserId),
            RawInput::Login(body) => Self::login(body).map(GatedPayload::Login),
        }
    }

    /// Email, password and optional username for a new account.
    pub fn user_create(body: &RawUserBody) -> ValidationOutcome<NewUserRequest> {
        let mut collector = IssueCollector::new();
        let email = collector.check(check_email(&body.email));
        let password = collector.check(check_password(&body.password));
        let username = collector.check(check_username(&body.username, false));

        let payload = match (email, password, username) {
            (Some(email), Some(password), Some(username)) => Some(NewUserRequest {
                email,
                password,
                username,
            }),
            _ => None,
        };
        collector.conclude(payload)
    }

    /// Only the fields present in the body are validated.
    pub fn user_update(body: &RawUserBody) -> ValidationOutcome<UserPatch> {
        let mut collector = IssueCollector::new();
        let mut patch = UserPatch::default();

        if body.email.is_present() {
            patch.email = collector.check(check_email(&body.email));
        }
        if body.password.is_present() {
            patch.password = collector.check(check_password(&body.password));
        }
        if body.username.is_present() {
            patch.username = match collector.check(check_username(&body.username, false)) {
                Some(Some(username)) => FieldUpdate::Set(username),
                Some(None) => FieldUpdate::Clear,
                None => FieldUpdate::Keep,
            };
        }

        collector.conclude(Some(patch))
    }

    /// Path identifier check.
    pub fn user_id_param(raw: &str) -> ValidationOutcome<UserId> {
        let mut collector = IssueCollector::new();
        let id = collector.check(check_positive_integer_id(raw));
        collector.conclude(id)
    }

    /// Full email rules; password presence only.
    pub fn login(body: &RawUserBody) -> ValidationOutcome<LoginCredentials> {
        let mut collector = IssueCollector::new();
        let email = collector.check(check_email(&body.email));
        let password = collector.check(check_password_present(&body.password));

        let payload = match (email, password) {
            (Some(email), Some(password)) => Some(LoginCredentials { email, password }),
            _ => None,
        };
        collector.conclude(payload)
    }
}
