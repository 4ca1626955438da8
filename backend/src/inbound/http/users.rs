//! Users resource handlers.
//!
//! Mutating routes check in a fixed order: the path id passes the gate, the
//! caller is authenticated, the caller owns the id, and only then is the body
//! gated and the store touched.

use actix_web::{HttpResponse, delete, get, post, put, web};

use crate::domain::{
    RawUserBody, RouteKind, UserId, ValidationGate, require_authenticated, require_ownership,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::envelope::{SuccessEnvelope, UserView};
use crate::inbound::http::problem::ProblemDetail;
use crate::inbound::http::schemas::{UserBodySchema, UserPatchSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

fn gated_id(raw: &str) -> ApiResult<UserId> {
    ValidationGate::user_id_param(raw).into_result(RouteKind::UserIdParam)
}

/// List users.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    responses(
        (status = 200, description = "Users", body = SuccessEnvelope<Vec<UserView>>),
        (status = 401, description = "Not logged in", body = ProblemDetail,
            content_type = "application/problem+json")
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    require_authenticated(session.identity()?)?;
    let users: Vec<UserView> = state
        .accounts
        .list()
        .await?
        .into_iter()
        .map(UserView::from)
        .collect();
    Ok(HttpResponse::Ok().json(SuccessEnvelope::data(users)))
}

/// Fetch one user.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "Positive integer user id")),
    responses(
        (status = 200, description = "User", body = SuccessEnvelope<UserView>),
        (status = 400, description = "Invalid id", body = ProblemDetail,
            content_type = "application/problem+json"),
        (status = 401, description = "Not logged in", body = ProblemDetail,
            content_type = "application/problem+json"),
        (status = 404, description = "No such user", body = ProblemDetail,
            content_type = "application/problem+json")
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = gated_id(&path)?;
    require_authenticated(session.identity()?)?;
    let user = state.accounts.find(id).await?;
    Ok(HttpResponse::Ok().json(SuccessEnvelope::data(UserView::from(user))))
}

/// Create a user without signing in as it.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = UserBodySchema,
    responses(
        (status = 201, description = "User created", body = SuccessEnvelope<UserView>),
        (status = 400, description = "Validation failed", body = ProblemDetail,
            content_type = "application/problem+json"),
        (status = 409, description = "Email or username taken", body = ProblemDetail,
            content_type = "application/problem+json")
    ),
    tags = ["users"],
    operation_id = "createUser",
    security([])
)]
#[post("/users")]
pub async fn create_user(
    state: web::Data<HttpState>,
    payload: web::Json<RawUserBody>,
) -> ApiResult<HttpResponse> {
    let request = ValidationGate::user_create(&payload).into_result(RouteKind::UserCreate)?;
    let user = state.accounts.register(request).await?;
    Ok(HttpResponse::Created().json(
        SuccessEnvelope::data(UserView::from(user)).with_message("User created successfully"),
    ))
}

/// Partially update the caller's own account.
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "Positive integer user id")),
    request_body = UserPatchSchema,
    responses(
        (status = 200, description = "User updated", body = SuccessEnvelope<UserView>),
        (status = 400, description = "Validation failed", body = ProblemDetail,
            content_type = "application/problem+json"),
        (status = 401, description = "Not logged in", body = ProblemDetail,
            content_type = "application/problem+json"),
        (status = 403, description = "Not the owner", body = ProblemDetail,
            content_type = "application/problem+json"),
        (status = 404, description = "No such user", body = ProblemDetail,
            content_type = "application/problem+json"),
        (status = 409, description = "Email or username taken", body = ProblemDetail,
            content_type = "application/problem+json")
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[put("/users/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: Result<web::Json<RawUserBody>, actix_web::Error>,
) -> ApiResult<HttpResponse> {
    let id = gated_id(&path)?;
    let identity = require_authenticated(session.identity()?)?;
    require_ownership(&identity, id)?;
    let body = payload?.into_inner();
    let patch = ValidationGate::user_update(&body).into_result(RouteKind::UserUpdate)?;
    let user = state.accounts.update(id, patch).await?;
    Ok(HttpResponse::Ok().json(
        SuccessEnvelope::data(UserView::from(user)).with_message("User updated successfully"),
    ))
}

/// Delete the caller's own account and end its session.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "Positive integer user id")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "Invalid id", body = ProblemDetail,
            content_type = "application/problem+json"),
        (status = 401, description = "Not logged in", body = ProblemDetail,
            content_type = "application/problem+json"),
        (status = 403, description = "Not the owner", body = ProblemDetail,
            content_type = "application/problem+json"),
        (status = 404, description = "No such user", body = ProblemDetail,
            content_type = "application/problem+json")
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = gated_id(&path)?;
    let identity = require_authenticated(session.identity()?)?;
    require_ownership(&identity, id)?;
    state.accounts.delete(id).await?;
    session.purge();
    Ok(HttpResponse::NoContent().finish())
}
