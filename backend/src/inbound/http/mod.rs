//! HTTP inbound adapter exposing REST endpoints.
//!
//! Every error leaving a handler is a [`Failure`]; the [`ProblemResponses`]
//! middleware turns it into an `application/problem+json` body.

pub mod auth;
pub mod envelope;
pub mod health;
pub mod problem;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;

use actix_web::error::JsonPayloadError;
use actix_web::{HttpRequest, HttpResponse, web};

use crate::domain::{BodyFault, Failure};

pub use problem::{ErrorNormalizer, ErrorPolicy, ProblemDetail, ProblemResponses};

/// Handler result carrying a domain failure.
pub type ApiResult<T> = Result<T, Failure>;

/// Map body parse errors onto the malformed-body failure.
///
/// Installed through `web::JsonConfig` so the rejection flows through the
/// same normaliser as every other failure.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    Failure::malformed_body(body_fault(&err), err.to_string()).into()
}

fn body_fault(err: &JsonPayloadError) -> BodyFault {
    match err {
        JsonPayloadError::OverflowKnownLength { .. } | JsonPayloadError::Overflow { .. } => {
            BodyFault::TooLarge
        }
        JsonPayloadError::ContentType => BodyFault::ContentType,
        JsonPayloadError::Deserialize(_) => BodyFault::Syntax,
        _ => BodyFault::Unreadable,
    }
}

/// JSON extractor configuration shared by the versioned API.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(json_error_handler)
}

/// Register the `/api/v1` scope and the health probes.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use accounts_backend::inbound::http::{configure, unmatched_route};
///
/// let _app = App::new()
///     .configure(configure)
///     .default_service(web::to(unmatched_route));
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health::ready).service(health::live).service(
        web::scope("/api/v1")
            .app_data(json_config())
            .service(auth::register)
            .service(auth::login)
            .service(auth::logout)
            .service(auth::me)
            .service(users::list_users)
            .service(users::create_user)
            .service(users::get_user)
            .service(users::update_user)
            .service(users::delete_user),
    );
}

/// Fallback for paths no route matched.
pub async fn unmatched_route(req: HttpRequest) -> ApiResult<HttpResponse> {
    Err(Failure::route_not_found(req.path()))
}

#[cfg(test)]
mod tests;
