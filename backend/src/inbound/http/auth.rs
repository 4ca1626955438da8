//! Authentication handlers.
//!
//! ```text
//! POST /api/v1/auth/register {"email":"ada@example.com","password":"Abc12345"}
//! POST /api/v1/auth/login    {"email":"ada@example.com","password":"Abc12345"}
//! POST /api/v1/auth/logout
//! GET  /api/v1/auth/me
//! ```

use actix_web::{HttpResponse, get, post, web};

use crate::domain::{RawUserBody, RouteKind, ValidationGate, require_authenticated};
use crate::inbound::http::ApiResult;
use crate::inbound::http::envelope::{SuccessEnvelope, UserView};
use crate::inbound::http::problem::ProblemDetail;
use crate::inbound::http::schemas::{LoginBodySchema, MessageEnvelopeSchema, UserBodySchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Create an account and sign it in.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = UserBodySchema,
    responses(
        (status = 201, description = "User registered", body = SuccessEnvelope<UserView>,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Validation failed", body = ProblemDetail,
            content_type = "application/problem+json"),
        (status = 409, description = "Email or username taken", body = ProblemDetail,
            content_type = "application/problem+json"),
        (status = 503, description = "Store unavailable", body = ProblemDetail,
            content_type = "application/problem+json")
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/auth/register")]
pub async fn register(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RawUserBody>,
) -> ApiResult<HttpResponse> {
    let request = ValidationGate::user_create(&payload).into_result(RouteKind::UserCreate)?;
    let user = state.accounts.register(request).await?;
    session.bind_identity(user.id)?;
    Ok(HttpResponse::Created().json(
        SuccessEnvelope::data(UserView::from(user)).with_message("User registered successfully"),
    ))
}

/// Check credentials and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginBodySchema,
    responses(
        (status = 200, description = "Login success", body = SuccessEnvelope<UserView>,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Validation failed", body = ProblemDetail,
            content_type = "application/problem+json"),
        (status = 401, description = "Invalid credentials", body = ProblemDetail,
            content_type = "application/problem+json")
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RawUserBody>,
) -> ApiResult<HttpResponse> {
    let credentials = ValidationGate::login(&payload).into_result(RouteKind::Login)?;
    let user = state.accounts.authenticate(credentials).await?;
    session.bind_identity(user.id)?;
    Ok(HttpResponse::Ok()
        .json(SuccessEnvelope::data(UserView::from(user)).with_message("Login successful")))
}

/// End the current session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses(
        (status = 200, description = "Logged out", body = MessageEnvelopeSchema),
        (status = 401, description = "Not logged in", body = ProblemDetail,
            content_type = "application/problem+json")
    ),
    tags = ["auth"],
    operation_id = "logout"
)]
#[post("/auth/logout")]
pub async fn logout(session: SessionContext) -> ApiResult<HttpResponse> {
    require_authenticated(session.identity()?)?;
    session.purge();
    Ok(HttpResponse::Ok().json(SuccessEnvelope::message("Logout successful")))
}

/// Current user.
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Current user", body = SuccessEnvelope<UserView>),
        (status = 401, description = "Not logged in", body = ProblemDetail,
            content_type = "application/problem+json"),
        (status = 404, description = "Session user no longer exists", body = ProblemDetail,
            content_type = "application/problem+json")
    ),
    tags = ["auth"],
    operation_id = "currentUser"
)]
#[get("/auth/me")]
pub async fn me(state: web::Data<HttpState>, session: SessionContext) -> ApiResult<HttpResponse> {
    let identity = require_authenticated(session.identity()?)?;
    let user = state.accounts.find(identity.user_id()).await?;
    Ok(HttpResponse::Ok().json(SuccessEnvelope::data(UserView::from(user))))
}
