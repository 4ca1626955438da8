//! Port for one-way password hashing.

use crate::domain::user::{Password, PasswordHash};

use super::define_port_error;

define_port_error! {
    /// Errors raised while producing a password hash.
    pub enum HashingError {
        /// The hashing backend failed.
        Backend { message: String } => "password hashing failed: {message}",
    }
}

/// Hashes and verifies passwords.
///
/// Implementations are CPU bound; callers run them off the async executor.
#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    /// Produce a salted hash of `password`.
    fn hash(&self, password: &Password) -> Result<PasswordHash, HashingError>;

    /// Whether `password` matches `hash`. Malformed hashes never match.
    fn verify(&self, password: &Password, hash: &PasswordHash) -> bool;
}
