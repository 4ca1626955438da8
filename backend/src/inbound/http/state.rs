//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on the account service and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{PasswordHasher, UserRepository};
use crate::domain::UserAccounts;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: UserAccounts,
}

impl HttpState {
    /// Build state over the store and hasher collaborators.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use accounts_backend::inbound::http::state::HttpState;
    /// use accounts_backend::outbound::crypto::Argon2PasswordHasher;
    /// use accounts_backend::outbound::memory::InMemoryUserRepository;
    ///
    /// let state = HttpState::new(
    ///     Arc::new(InMemoryUserRepository::default()),
    ///     Arc::new(Argon2PasswordHasher::default()),
    /// );
    /// let _accounts = state.accounts.clone();
    /// ```
    pub fn new(users: Arc<dyn UserRepository>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self {
            accounts: UserAccounts::new(users, hasher),
        }
    }
}
