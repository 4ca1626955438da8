//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::body::MessageBody;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, test as actix_test, web};
use serde_json::{Value, json};

use crate::domain::ports::{HashingError, PasswordHasher};
use crate::domain::user::{Password, PasswordHash};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::{
    ErrorNormalizer, ErrorPolicy, ProblemResponses, configure, unmatched_route,
};
use crate::outbound::memory::InMemoryUserRepository;

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Reversible "hash" so tests skip Argon2 work factors.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainHasher;

impl PasswordHasher for PlainHasher {
    fn hash(&self, password: &Password) -> Result<PasswordHash, HashingError> {
        Ok(PasswordHash::new(format!("plain:{}", password.expose())))
    }

    fn verify(&self, password: &Password, hash: &PasswordHash) -> bool {
        hash.as_str()
            .strip_prefix("plain:")
            .is_some_and(|stored| stored == password.expose())
    }
}

/// State over an empty in-memory store.
pub fn memory_state() -> HttpState {
    HttpState::new(
        Arc::new(InMemoryUserRepository::default()),
        Arc::new(PlainHasher),
    )
}

/// Full application as the server wires it, minus tracing.
pub fn test_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .wrap(ProblemResponses::new(ErrorNormalizer::new(
            ErrorPolicy::production(),
        )))
        .wrap(test_session_middleware())
        .configure(configure)
        .default_service(web::to(unmatched_route))
}

/// Register through the API and return the new id with its session cookie.
pub async fn register<S, B>(app: &S, email: &str, username: Option<&str>) -> (i64, Cookie<'static>)
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let mut body = json!({ "email": email, "password": "Abc12345" });
    if let Some(name) = username {
        body["username"] = json!(name);
    }
    let req = actix_test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(&body)
        .to_request();
    let res = actix_test::call_service(app, req).await;
    assert_eq!(res.status(), actix_web::http::StatusCode::CREATED);
    let cookie = session_cookie(&res);
    let value: Value = actix_test::read_body_json(res).await;
    let id = value["data"]["id"].as_i64().expect("registered id");
    (id, cookie)
}

/// Extract the `session` cookie set on a response.
pub fn session_cookie<B>(res: &ServiceResponse<B>) -> Cookie<'static> {
    res.response()
        .cookies()
        .find(|c| c.name() == "session")
        .map(Cookie::into_owned)
        .expect("session cookie")
}
