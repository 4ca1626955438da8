//! Access predicates over the identity bound to a request.
//!
//! Call order on mutating routes: the path id passes the gate first, then
//! [`require_authenticated`], then [`require_ownership`]. An unvalidated id is
//! never compared.

use super::failure::Failure;
use super::user::UserId;

/// Authenticated subject attached to the current request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    user_id: UserId,
}

impl Identity {
    /// Identity for the given user.
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }

    /// Identifier of the authenticated user.
    pub fn user_id(&self) -> UserId {
        self.user_id
    }
}

/// Fail with [`Failure::AuthenticationRequired`] when no identity is bound.
pub fn require_authenticated(identity: Option<Identity>) -> Result<Identity, Failure> {
    identity.ok_or(Failure::AuthenticationRequired)
}

/// Fail with [`Failure::AuthorizationDenied`] unless `identity` owns the
/// resource.
pub fn require_ownership(identity: &Identity, owner: UserId) -> Result<(), Failure> {
    if identity.user_id == owner {
        Ok(())
    } else {
        Err(Failure::AuthorizationDenied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn id(raw: i64) -> UserId {
        UserId::new(raw).expect("positive id")
    }

    #[rstest]
    fn missing_identity_is_not_authenticated() {
        assert!(matches!(
            require_authenticated(None),
            Err(Failure::AuthenticationRequired)
        ));
    }

    #[rstest]
    fn bound_identity_passes_through() {
        let identity = Identity::new(id(5));
        assert_eq!(require_authenticated(Some(identity)).ok(), Some(identity));
    }

    #[rstest]
    #[case(5, 5, true)]
    #[case(5, 6, false)]
    fn ownership_requires_matching_ids(#[case] subject: i64, #[case] owner: i64, #[case] allowed: bool) {
        let result = require_ownership(&Identity::new(id(subject)), id(owner));
        if allowed {
            assert!(result.is_ok());
        } else {
            assert!(matches!(result, Err(Failure::AuthorizationDenied)));
        }
    }
}
