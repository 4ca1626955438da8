//! Server construction and middleware wiring.

mod config;

pub use config::ServerConfig;

use std::sync::Arc;

use actix_session::SessionMiddleware;
use actix_session::storage::CookieSessionStore;
use actix_web::body::MessageBody;
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::{info, warn};

use accounts_backend::Trace;
#[cfg(debug_assertions)]
use accounts_backend::doc::ApiDoc;
use accounts_backend::domain::ports::UserRepository;
use accounts_backend::inbound::http::health::HealthState;
use accounts_backend::inbound::http::session_config::session_middleware;
use accounts_backend::inbound::http::state::HttpState;
use accounts_backend::inbound::http::{
    ErrorNormalizer, ProblemResponses, configure, unmatched_route,
};
use accounts_backend::outbound::crypto::Argon2PasswordHasher;
use accounts_backend::outbound::memory::InMemoryUserRepository;
use accounts_backend::outbound::persistence::DieselUserRepository;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

fn build_http_state(config: &ServerConfig) -> HttpState {
    let users: Arc<dyn UserRepository> = match &config.db_pool {
        Some(pool) => Arc::new(DieselUserRepository::new(pool.clone())),
        None => {
            warn!("no database configured; users are kept in memory");
            Arc::new(InMemoryUserRepository::default())
        }
    };
    HttpState::new(users, Arc::new(Argon2PasswordHasher::default()))
}

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    normalizer: ErrorNormalizer,
}

fn build_app(
    deps: AppDependencies,
    session: SessionMiddleware<CookieSessionStore>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        normalizer,
    } = deps;

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .configure(configure);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app.default_service(web::to(unmatched_route))
        .wrap(ProblemResponses::new(normalizer))
        .wrap(session)
        .wrap(Trace)
}

/// Construct an Actix HTTP server and mark it ready once bound.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let http_state = web::Data::new(build_http_state(&config));
    let ServerConfig {
        session,
        bind_addr,
        error_policy,
        db_pool: _,
    } = config;
    let deps = AppDependencies {
        health_state: health_state.clone(),
        http_state,
        normalizer: ErrorNormalizer::new(error_policy),
    };
    let server = HttpServer::new(move || build_app(deps.clone(), session_middleware(&session)))
        .bind(bind_addr)?
        .run();

    info!(%bind_addr, "listening");
    health_state.mark_ready();
    Ok(server)
}

#[cfg(test)]
mod tests {
    //! Wiring of the full application stack.

    use super::*;
    use accounts_backend::inbound::http::ErrorPolicy;
    use accounts_backend::inbound::http::session_config::SessionSettings;
    use actix_web::cookie::Key;
    use actix_web::http::StatusCode;
    use actix_web::http::header::CONTENT_TYPE;
    use actix_web::test as actix_test;

    fn dependencies() -> AppDependencies {
        AppDependencies {
            health_state: web::Data::new(HealthState::new()),
            http_state: web::Data::new(HttpState::new(
                Arc::new(InMemoryUserRepository::default()),
                Arc::new(Argon2PasswordHasher::default()),
            )),
            normalizer: ErrorNormalizer::new(ErrorPolicy::production()),
        }
    }

    fn session() -> SessionSettings {
        SessionSettings {
            key: Key::generate(),
            cookie_secure: false,
        }
    }

    #[actix_web::test]
    async fn app_serves_health_checks_and_problem_bodies() {
        let settings = session();
        let app =
            actix_test::init_service(build_app(dependencies(), session_middleware(&settings)))
                .await;

        let live = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/health/live").to_request(),
        )
        .await;
        assert_eq!(live.status(), StatusCode::OK);
        assert!(live.headers().contains_key("trace-id"));

        let missing = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/nowhere").to_request(),
        )
        .await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            missing
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok()),
            Some("application/problem+json")
        );
    }

    #[actix_web::test]
    async fn one_settings_value_builds_many_workers() {
        let settings = session();
        let deps = dependencies();
        let factory = move || build_app(deps.clone(), session_middleware(&settings));

        let first = actix_test::init_service(factory()).await;
        let second = actix_test::init_service(factory()).await;
        for app in [&first, &second] {
            let res = actix_test::call_service(
                app,
                actix_test::TestRequest::get().uri("/health/ready").to_request(),
            )
            .await;
            assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
        }
    }
}
