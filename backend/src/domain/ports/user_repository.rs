//! Port abstraction for user account storage and its typed failures.
//!
//! Adapters must classify every failure into one of the variants below so
//! the error normaliser can map it without inspecting driver errors.

use async_trait::async_trait;

use crate::domain::{NewUser, User, UserChanges, UserId};
use crate::domain::user::EmailAddress;

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// The store rejected a column value (not-null, check constraint).
        Validation { field: String, message: String } =>
            "user repository rejected {field}: {message}",
        /// A unique column already holds the value.
        Uniqueness { field: String, value: Option<String> } =>
            "user repository uniqueness violation on {field}",
        /// A foreign key references a missing row.
        ForeignKey { constraint: String } =>
            "user repository foreign key violation: {constraint}",
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// The addressed user does not exist.
        NotFound { id: i64 } => "user {id} not found",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Store a new account and return it with its assigned id.
    async fn insert(&self, user: &NewUser) -> Result<User, UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user by normalised email address.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// All users ordered by id.
    async fn list(&self) -> Result<Vec<User>, UserPersistenceError>;

    /// Apply `changes` and return the updated record.
    ///
    /// Fails with [`UserPersistenceError::NotFound`] when the id is unknown.
    async fn update(
        &self,
        id: UserId,
        changes: &UserChanges,
    ) -> Result<User, UserPersistenceError>;

    /// Remove a user.
    ///
    /// Fails with [`UserPersistenceError::NotFound`] when the id is unknown.
    async fn delete(&self, id: UserId) -> Result<(), UserPersistenceError>;
}
