//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! The session is the collaborator that binds an [`Identity`] to a request.
//! Handlers only ask for the optional identity and hand it to the access
//! predicates; they never inspect cookies.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::{Failure, Identity, UserId};

pub(crate) const USER_ID_KEY: &str = "user_id";

/// Newtype wrapper that exposes identity-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Bind `user_id` to the session, rotating the session key.
    pub fn bind_identity(&self, user_id: UserId) -> Result<(), Failure> {
        self.0.renew();
        self.0
            .insert(USER_ID_KEY, user_id.get())
            .map_err(|error| Failure::internal(format!("failed to persist session: {error}")))
    }

    /// Identity bound to this request, if any.
    ///
    /// A tampered or non-positive id is treated as no identity.
    pub fn identity(&self) -> Result<Option<Identity>, Failure> {
        let raw = self
            .0
            .get::<i64>(USER_ID_KEY)
            .map_err(|error| Failure::internal(format!("failed to read session: {error}")))?;
        Ok(raw.and_then(|raw| match UserId::new(raw) {
            Some(id) => Some(Identity::new(id)),
            None => {
                warn!(raw, "invalid user id in session cookie");
                None
            }
        }))
    }

    /// Drop every session value and expire the cookie.
    pub fn purge(&self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
