//! Error normaliser: the single place that turns a [`Failure`] into a
//! response.
//!
//! Handlers, extractors and the domain only *signal* failures. The
//! [`ProblemResponses`] middleware finds the [`Failure`] attached to an error
//! response, renders exactly one [`ProblemDetail`] with
//! `Content-Type: application/problem+json`, and replaces the response body.
//!
//! | failure                        | type                   | status |
//! |--------------------------------|------------------------|--------|
//! | gate rejection, bad body, store validation | `/validation-error` | 400 |
//! | not authenticated              | `/not-authenticated`   | 401    |
//! | bad credentials                | `/invalid-credentials` | 401    |
//! | not owner                      | `/forbidden`           | 403    |
//! | missing resource               | `/user-not-found`, `/route-not-found` | 404 |
//! | unique column conflict         | `/duplicate-entry`     | 409    |
//! | missing foreign key target     | `/reference-error`     | 400    |
//! | store unreachable              | `/service-unavailable` | 503    |
//! | anything else                  | `/internal-error`      | 500    |

use std::sync::Arc;
use std::task::{Context, Poll};

use actix_web::body::{EitherBody, MessageBody};
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::StatusCode;
use actix_web::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use actix_web::{HttpRequest, HttpResponse, ResponseError};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, warn};
use utoipa::ToSchema;

use crate::domain::validation::fields;
use crate::domain::{Failure, IssueKind, Resource, TraceId, ValidationIssue};

/// Media type of every error body.
pub const APPLICATION_PROBLEM_JSON: &str = "application/problem+json";

/// `instance` used when the request path is not available.
pub const UNKNOWN_INSTANCE: &str = "about:blank";

/// Detail shown for unclassified failures outside development mode.
const REDACTED_DETAIL: &str = "Something went wrong";

/// Uniform error envelope.
///
/// ## Invariants
/// - Built once per failing request and never modified afterwards.
/// - `issues` is non-empty only for validation-style failures, duplicates and
///   missing users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProblemDetail {
    #[serde(rename = "type")]
    #[schema(example = "/validation-error")]
    problem_type: String,
    #[schema(example = "Validation Error")]
    title: String,
    #[schema(example = 400)]
    status: u16,
    #[schema(example = "Validation failed for user creation")]
    detail: String,
    #[schema(example = "/api/v1/users")]
    instance: String,
    issues: Vec<IssueBody>,
}

impl ProblemDetail {
    /// Category URI such as `/validation-error`.
    pub fn problem_type(&self) -> &str {
        &self.problem_type
    }

    /// Short category label.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// HTTP status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Human-readable summary.
    pub fn detail(&self) -> &str {
        &self.detail
    }

    /// Request path that failed.
    pub fn instance(&self) -> &str {
        &self.instance
    }

    /// Ordered issues.
    pub fn issues(&self) -> &[IssueBody] {
        &self.issues
    }
}

/// Wire form of one [`ValidationIssue`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct IssueBody {
    /// Failing rule, for example `EmailRequired`.
    #[schema(example = "EmailRequired")]
    pub name: String,
    #[schema(example = "Email is required")]
    pub message: String,
    pub data: IssueData,
}

/// Offending field and value; `value` is `null` when nothing was sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct IssueData {
    #[schema(example = "email")]
    pub field: String,
    pub value: Option<Value>,
}

impl From<&ValidationIssue> for IssueBody {
    fn from(issue: &ValidationIssue) -> Self {
        Self {
            name: issue.kind().as_str().to_owned(),
            message: issue.message().to_owned(),
            data: IssueData {
                field: issue.field().to_owned(),
                value: issue.value().cloned(),
            },
        }
    }
}

/// How much internal detail reaches clients. Fixed at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ErrorPolicy {
    pub expose_internal_detail: bool,
}

impl ErrorPolicy {
    /// Redact unclassified failures.
    pub fn production() -> Self {
        Self {
            expose_internal_detail: false,
        }
    }

    /// Show unclassified failure messages to clients.
    pub fn development() -> Self {
        Self {
            expose_internal_detail: true,
        }
    }
}

/// Maps failures to problem documents under a fixed [`ErrorPolicy`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorNormalizer {
    policy: ErrorPolicy,
}

impl ErrorNormalizer {
    /// Create a normaliser bound to `policy`.
    pub fn new(policy: ErrorPolicy) -> Self {
        Self { policy }
    }

    /// Policy in force.
    pub fn policy(&self) -> ErrorPolicy {
        self.policy
    }

    /// Status code for `failure`.
    pub fn status_for(failure: &Failure) -> StatusCode {
        match failure {
            Failure::Validation { .. }
            | Failure::MalformedBody { .. }
            | Failure::StoreRejected { .. }
            | Failure::ReferenceMissing { .. } => StatusCode::BAD_REQUEST,
            Failure::AuthenticationRequired | Failure::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            Failure::AuthorizationDenied => StatusCode::FORBIDDEN,
            Failure::NotFound { .. } => StatusCode::NOT_FOUND,
            Failure::Duplicate { .. } => StatusCode::CONFLICT,
            Failure::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Failure::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Build the problem document without side effects.
    pub fn render(&self, failure: &Failure, instance: &str) -> ProblemDetail {
        let status = Self::status_for(failure).as_u16();
        let problem = |problem_type: &str, title: &str, detail: String, issues: Vec<IssueBody>| {
            ProblemDetail {
                problem_type: problem_type.to_owned(),
                title: title.to_owned(),
                status,
                detail,
                instance: instance.to_owned(),
                issues,
            }
        };

        match failure {
            Failure::Validation { route, issues } => problem(
                "/validation-error",
                "Validation Error",
                route.rejection_detail().to_owned(),
                issues.iter().map(IssueBody::from).collect(),
            ),
            Failure::MalformedBody { fault, .. } => problem(
                "/validation-error",
                "Validation Error",
                "Request body could not be parsed".to_owned(),
                vec![IssueBody::from(&ValidationIssue::new(
                    IssueKind::BodyMalformed,
                    fields::BODY,
                    fault.message(),
                ))],
            ),
            Failure::StoreRejected { issues } => problem(
                "/validation-error",
                "Validation Error",
                "Validation failed".to_owned(),
                issues.iter().map(IssueBody::from).collect(),
            ),
            Failure::AuthenticationRequired => problem(
                "/not-authenticated",
                "Not Authenticated",
                "User is not logged in".to_owned(),
                Vec::new(),
            ),
            Failure::InvalidCredentials => problem(
                "/invalid-credentials",
                "Invalid Credentials",
                "Invalid email or password".to_owned(),
                Vec::new(),
            ),
            Failure::AuthorizationDenied => problem(
                "/forbidden",
                "Forbidden",
                "You can only access your own resources".to_owned(),
                Vec::new(),
            ),
            Failure::NotFound { resource, id } => {
                let detail = match id {
                    Some(id) if *resource == Resource::User => {
                        format!("{resource} with ID {id} not found")
                    }
                    Some(id) => format!("{resource} {id} not found"),
                    None => format!("{resource} not found"),
                };
                let issues = match (resource, id) {
                    (Resource::User, Some(id)) => vec![IssueBody::from(
                        &ValidationIssue::new(
                            IssueKind::ResourceMissing,
                            fields::ID,
                            format!("No user exists with ID {id}"),
                        )
                        .with_value(Some(Value::String(id.clone()))),
                    )],
                    _ => Vec::new(),
                };
                problem(
                    resource.not_found_type(),
                    &format!("{resource} Not Found"),
                    detail,
                    issues,
                )
            }
            Failure::Duplicate { field, value } => {
                let label = capitalise(field);
                problem(
                    "/duplicate-entry",
                    "Duplicate Entry",
                    format!("{label} already exists"),
                    vec![IssueBody::from(
                        &ValidationIssue::new(
                            IssueKind::DuplicateValue,
                            field.as_str(),
                            format!("{label} already exists"),
                        )
                        .with_value(value.clone().map(Value::String)),
                    )],
                )
            }
            Failure::ReferenceMissing { .. } => problem(
                "/reference-error",
                "Reference Error",
                "Referenced record does not exist".to_owned(),
                Vec::new(),
            ),
            Failure::Unavailable { .. } => problem(
                "/service-unavailable",
                "Service Unavailable",
                "Unable to connect to database".to_owned(),
                Vec::new(),
            ),
            Failure::Internal { message } => {
                let detail = if self.policy.expose_internal_detail {
                    message.clone()
                } else {
                    REDACTED_DETAIL.to_owned()
                };
                problem("/internal-error", "Internal Server Error", detail, Vec::new())
            }
        }
    }

    /// Log `failure` once and build its response.
    pub fn respond(&self, failure: &Failure, instance: &str) -> HttpResponse {
        log_failure(failure, instance);
        problem_response(&self.render(failure, instance))
    }
}

fn log_failure(failure: &Failure, instance: &str) {
    let trace_id = TraceId::current().map(|id| id.to_string());
    let trace_id = trace_id.as_deref();
    match failure {
        Failure::Validation { route, issues } => {
            let kinds: Vec<&str> = issues.iter().map(|issue| issue.kind().as_str()).collect();
            debug!(?route, ?kinds, instance, trace_id, "request rejected by validation gate");
        }
        Failure::MalformedBody { fault, message } => {
            debug!(?fault, %message, instance, trace_id, "malformed request body");
        }
        Failure::StoreRejected { issues } => {
            let fields: Vec<&str> = issues.iter().map(ValidationIssue::field).collect();
            warn!(?fields, instance, trace_id, "store rejected submitted values");
        }
        Failure::AuthenticationRequired
        | Failure::AuthorizationDenied
        | Failure::InvalidCredentials => {
            warn!(error = %failure, instance, trace_id, "access denied");
        }
        Failure::NotFound { .. } => {
            debug!(error = %failure, instance, trace_id, "resource not found");
        }
        Failure::Duplicate { field, .. } => {
            warn!(%field, instance, trace_id, "uniqueness conflict");
        }
        Failure::ReferenceMissing { constraint } => {
            warn!(%constraint, instance, trace_id, "foreign key violation");
        }
        Failure::Unavailable { message } => {
            error!(%message, instance, trace_id, "store unavailable");
        }
        Failure::Internal { message } => {
            error!(%message, instance, trace_id, "unhandled failure");
        }
    }
}

fn problem_response(problem: &ProblemDetail) -> HttpResponse {
    let status = StatusCode::from_u16(problem.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    HttpResponse::build(status)
        .content_type(APPLICATION_PROBLEM_JSON)
        .json(problem)
}

fn capitalise(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => "Field".to_owned(),
    }
}

fn instance_of(req: &HttpRequest) -> String {
    req.uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_owned())
        .unwrap_or_else(|| req.path().to_owned())
}

impl ResponseError for Failure {
    fn status_code(&self) -> StatusCode {
        ErrorNormalizer::status_for(self)
    }

    /// Fallback rendering for errors that bypass [`ProblemResponses`].
    ///
    /// No request is reachable here, so `instance` is [`UNKNOWN_INSTANCE`].
    fn error_response(&self) -> HttpResponse {
        problem_response(
            &ErrorNormalizer::new(ErrorPolicy::production()).render(self, UNKNOWN_INSTANCE),
        )
    }
}

impl From<actix_web::Error> for Failure {
    fn from(err: actix_web::Error) -> Self {
        match err.as_error::<Failure>() {
            Some(failure) => failure.clone(),
            None => Failure::internal(err.to_string()),
        }
    }
}

/// Middleware factory that routes every [`Failure`] through one
/// [`ErrorNormalizer`].
///
/// # Examples
/// ```
/// use actix_web::App;
/// use accounts_backend::inbound::http::problem::{ErrorNormalizer, ErrorPolicy, ProblemResponses};
///
/// let _app = App::new().wrap(ProblemResponses::new(ErrorNormalizer::new(ErrorPolicy::production())));
/// ```
#[derive(Clone)]
pub struct ProblemResponses {
    normalizer: Arc<ErrorNormalizer>,
}

impl ProblemResponses {
    /// Wrap `normalizer`.
    pub fn new(normalizer: ErrorNormalizer) -> Self {
        Self {
            normalizer: Arc::new(normalizer),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for ProblemResponses
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = ProblemResponsesMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ProblemResponsesMiddleware {
            service,
            normalizer: Arc::clone(&self.normalizer),
        }))
    }
}

/// Service wrapper produced by [`ProblemResponses`].
pub struct ProblemResponsesMiddleware<S> {
    service: S,
    normalizer: Arc<ErrorNormalizer>,
}

impl<S, B> Service<ServiceRequest> for ProblemResponsesMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let normalizer = Arc::clone(&self.normalizer);
        let fut = self.service.call(req);
        Box::pin(async move {
            let res = fut.await?;
            let failure = res
                .response()
                .error()
                .and_then(|err| err.as_error::<Failure>())
                .cloned();
            let Some(failure) = failure else {
                return Ok(res.map_into_left_body());
            };

            let instance = instance_of(res.request());
            let (req, original) = res.into_parts();
            let mut replacement = normalizer.respond(&failure, &instance);
            for (name, value) in original.headers() {
                if name != CONTENT_TYPE && name != CONTENT_LENGTH {
                    replacement
                        .headers_mut()
                        .append(name.clone(), value.clone());
                }
            }
            Ok(ServiceResponse::new(req, replacement).map_into_right_body())
        })
    }
}
