//! Account use-cases behind the HTTP routes.
//!
//! Combines the store and hasher collaborators. Inputs are already gated
//! payloads; every failure is returned as a [`Failure`] for the error
//! normaliser to render.

use std::sync::Arc;

use tracing::info;

use super::failure::Failure;
use super::gate::{LoginCredentials, NewUserRequest, UserPatch};
use super::ports::{PasswordHasher, UserRepository};
use super::user::{NewUser, Password, PasswordHash, User, UserChanges, UserId};

/// Account service shared by all handlers.
#[derive(Clone)]
pub struct UserAccounts {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl UserAccounts {
    /// Create a service over the given collaborators.
    pub fn new(users: Arc<dyn UserRepository>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { users, hasher }
    }

    /// Hash the password and store a new account.
    pub async fn register(&self, request: NewUserRequest) -> Result<User, Failure> {
        let NewUserRequest {
            email,
            password,
            username,
        } = request;
        let password_hash = self.hash(password).await?;
        let user = self
            .users
            .insert(&NewUser {
                email,
                username,
                password_hash,
            })
            .await?;
        info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    /// Check credentials. Unknown email and wrong password fail identically.
    pub async fn authenticate(&self, credentials: LoginCredentials) -> Result<User, Failure> {
        let LoginCredentials { email, password } = credentials;
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(Failure::InvalidCredentials)?;

        if self.verify(password, user.password_hash.clone()).await? {
            Ok(user)
        } else {
            Err(Failure::InvalidCredentials)
        }
    }

    /// Fetch one account.
    pub async fn find(&self, id: UserId) -> Result<User, Failure> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| Failure::user_not_found(id))
    }

    /// All accounts ordered by id.
    pub async fn list(&self) -> Result<Vec<User>, Failure> {
        Ok(self.users.list().await?)
    }

    /// Apply a gated patch. An empty patch returns the current record.
    pub async fn update(&self, id: UserId, patch: UserPatch) -> Result<User, Failure> {
        if patch.is_empty() {
            return self.find(id).await;
        }

        let UserPatch {
            email,
            password,
            username,
        } = patch;
        let password_hash = match password {
            Some(password) => Some(self.hash(password).await?),
            None => None,
        };
        let changes = UserChanges {
            email,
            username,
            password_hash,
        };
        let user = self.users.update(id, &changes).await?;
        info!(user_id = %user.id, "user updated");
        Ok(user)
    }

    /// Remove an account.
    pub async fn delete(&self, id: UserId) -> Result<(), Failure> {
        self.users.delete(id).await?;
        info!(user_id = %id, "user deleted");
        Ok(())
    }

    async fn hash(&self, password: Password) -> Result<PasswordHash, Failure> {
        let hasher = Arc::clone(&self.hasher);
        let hashed = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|err| Failure::internal(format!("password hashing task failed: {err}")))?;
        Ok(hashed?)
    }

    async fn verify(&self, password: Password, hash: PasswordHash) -> Result<bool, Failure> {
        let hasher = Arc::clone(&self.hasher);
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|err| Failure::internal(format!("password verification task failed: {err}")))
    }
}

#[cfg(test)]
#[path = "accounts_tests.rs"]
mod tests;
