//! In-process user store.
//!
//! Used when no database URL is configured and by the HTTP tests. Enforces
//! the same unique columns as the `users` table and assigns ids from a
//! monotonically increasing counter, so ids are never reused after delete.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::{Clock, DefaultClock};
use tokio::sync::RwLock;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::user::EmailAddress;
use crate::domain::{FieldUpdate, NewUser, User, UserChanges, UserId, Username};

#[derive(Default)]
struct Table {
    last_id: i64,
    rows: BTreeMap<UserId, User>,
}

impl Table {
    fn ensure_unique(
        &self,
        email: Option<&EmailAddress>,
        username: Option<&Username>,
        except: Option<UserId>,
    ) -> Result<(), UserPersistenceError> {
        let others = self.rows.values().filter(|row| Some(row.id) != except);
        for row in others {
            if let Some(email) = email.filter(|email| **email == row.email) {
                return Err(UserPersistenceError::uniqueness(
                    "email",
                    Some(email.to_string()),
                ));
            }
            if let Some(name) = username.filter(|name| row.username.as_ref() == Some(*name)) {
                return Err(UserPersistenceError::uniqueness(
                    "username",
                    Some(name.to_string()),
                ));
            }
        }
        Ok(())
    }
}

/// `UserRepository` over a locked map.
pub struct InMemoryUserRepository {
    table: RwLock<Table>,
    clock: Arc<dyn Clock>,
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::with_clock(Arc::new(DefaultClock))
    }
}

impl InMemoryUserRepository {
    /// Store stamping rows with `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            table: RwLock::new(Table::default()),
            clock,
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: &NewUser) -> Result<User, UserPersistenceError> {
        let mut table = self.table.write().await;
        table.ensure_unique(Some(&user.email), user.username.as_ref(), None)?;

        let next = table
            .last_id
            .checked_add(1)
            .and_then(UserId::new)
            .ok_or_else(|| UserPersistenceError::query("user id sequence exhausted"))?;
        let now = self.clock.utc();
        let row = User {
            id: next,
            email: user.email.clone(),
            username: user.username.clone(),
            password_hash: user.password_hash.clone(),
            email_verified: false,
            created_at: now,
            updated_at: now,
        };
        table.last_id = next.get();
        table.rows.insert(next, row.clone());
        Ok(row)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError> {
        let table = self.table.read().await;
        Ok(table.rows.values().find(|row| row.email == *email).cloned())
    }

    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        Ok(self.table.read().await.rows.values().cloned().collect())
    }

    async fn update(
        &self,
        id: UserId,
        changes: &UserChanges,
    ) -> Result<User, UserPersistenceError> {
        let mut table = self.table.write().await;
        let new_username = match &changes.username {
            FieldUpdate::Set(name) => Some(name),
            _ => None,
        };
        table.ensure_unique(changes.email.as_ref(), new_username, Some(id))?;

        let now = self.clock.utc();
        let row = table
            .rows
            .get_mut(&id)
            .ok_or_else(|| UserPersistenceError::not_found(id.get()))?;
        changes.clone().apply_to(row, now);
        Ok(row.clone())
    }

    async fn delete(&self, id: UserId) -> Result<(), UserPersistenceError> {
        self.table
            .write()
            .await
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| UserPersistenceError::not_found(id.get()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::PasswordHash;
    use chrono::{TimeZone, Utc};
    use mockable::MockClock;
    use rstest::{fixture, rstest};

    fn new_user(email: &str, username: Option<&str>) -> NewUser {
        NewUser {
            email: EmailAddress::from_normalized(email.to_owned()),
            username: username.map(|name| Username::from_validated(name.to_owned())),
            password_hash: PasswordHash::new("hash"),
        }
    }

    #[fixture]
    fn repo() -> InMemoryUserRepository {
        let mut clock = MockClock::new();
        clock
            .expect_utc()
            .returning(|| Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).single().expect("valid instant"));
        InMemoryUserRepository::with_clock(Arc::new(clock))
    }

    #[rstest]
    #[tokio::test]
    async fn ids_are_sequential_and_never_reused(repo: InMemoryUserRepository) {
        let first = repo.insert(&new_user("a@example.com", None)).await.expect("insert");
        repo.delete(first.id).await.expect("delete");
        let second = repo.insert(&new_user("b@example.com", None)).await.expect("insert");

        assert_eq!(first.id.get(), 1);
        assert_eq!(second.id.get(), 2);
        assert!(!second.email_verified);
    }

    #[rstest]
    #[case(new_user("a@example.com", Some("other")), "email")]
    #[case(new_user("b@example.com", Some("ada")), "username")]
    #[tokio::test]
    async fn duplicate_columns_are_reported(
        repo: InMemoryUserRepository,
        #[case] candidate: NewUser,
        #[case] field: &str,
    ) {
        repo.insert(&new_user("a@example.com", Some("ada"))).await.expect("insert");

        let err = repo.insert(&candidate).await.expect_err("duplicate");
        assert!(matches!(
            err,
            UserPersistenceError::Uniqueness { field: ref f, value: Some(_) } if f == field
        ));
    }

    #[rstest]
    #[tokio::test]
    async fn update_may_keep_own_email(repo: InMemoryUserRepository) {
        let user = repo.insert(&new_user("a@example.com", Some("ada"))).await.expect("insert");
        let changes = UserChanges {
            email: Some(EmailAddress::from_normalized("a@example.com".to_owned())),
            username: FieldUpdate::Clear,
            password_hash: None,
        };

        let updated = repo.update(user.id, &changes).await.expect("update");
        assert_eq!(updated.username, None);
        assert_eq!(updated.email, user.email);
    }

    #[rstest]
    #[tokio::test]
    async fn missing_rows_are_not_found(repo: InMemoryUserRepository) {
        let id = UserId::new(9).expect("positive id");

        assert_eq!(repo.find_by_id(id).await.expect("lookup"), None);
        assert_eq!(
            repo.delete(id).await,
            Err(UserPersistenceError::not_found(9))
        );
        assert_eq!(
            repo.update(id, &UserChanges::default()).await,
            Err(UserPersistenceError::not_found(9))
        );
    }

    #[rstest]
    #[tokio::test]
    async fn lookup_by_email_matches_exactly(repo: InMemoryUserRepository) {
        repo.insert(&new_user("a@example.com", None)).await.expect("insert");
        let email = EmailAddress::from_normalized("a@example.com".to_owned());

        let found = repo.find_by_email(&email).await.expect("lookup");
        assert_eq!(found.map(|user| user.id.get()), Some(1));
    }
}
