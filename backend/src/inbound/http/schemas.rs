//! OpenAPI-only request and response shapes.
//!
//! Request bodies are deserialised into the untyped
//! [`crate::domain::RawUserBody`] so the validation gate can report
//! "not a string" issues. These wrappers document the expected JSON instead.

use utoipa::ToSchema;

/// Body for account creation.
#[derive(ToSchema)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct UserBodySchema {
    /// 5 to 254 characters; stored lower-cased and trimmed.
    #[schema(example = "ada@example.com")]
    email: String,
    /// 8 to 100 characters with a lowercase letter, an uppercase letter and a
    /// digit.
    #[schema(example = "Abc12345")]
    password: String,
    /// Optional; 3 to 50 letters, digits, `_` or `-`.
    #[schema(example = "ada")]
    username: Option<String>,
}

/// Body for a partial update. Absent keys are left unchanged; a `null` or
/// empty `username` clears it.
#[derive(ToSchema)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct UserPatchSchema {
    #[schema(example = "ada@example.com")]
    email: Option<String>,
    password: Option<String>,
    #[schema(example = "ada")]
    username: Option<String>,
}

/// Body for `POST /auth/login`.
#[derive(ToSchema)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct LoginBodySchema {
    #[schema(example = "ada@example.com")]
    email: String,
    #[schema(example = "Abc12345")]
    password: String,
}

/// Success envelope without data.
#[derive(ToSchema)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct MessageEnvelopeSchema {
    #[schema(example = true)]
    success: bool,
    #[schema(example = "Logout successful")]
    message: String,
}
