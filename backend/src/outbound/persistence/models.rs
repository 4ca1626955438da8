//! Internal Diesel row structs for the `users` table.
//!
//! Never exposed to the domain; [`UserRow::into_domain`] is the only way out.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::domain::ports::UserPersistenceError;
use crate::domain::{EmailAddress, FieldUpdate, User, UserChanges, UserId, Username};
use crate::domain::user::PasswordHash;

use super::schema::users;

/// Columns read back for a user. Verification and reset token columns stay
/// in the table only.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i64,
    pub email: String,
    pub username: Option<String>,
    pub password_hash: String,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRow {
    pub(crate) fn into_domain(self) -> Result<User, UserPersistenceError> {
        let id = UserId::new(self.id).ok_or_else(|| {
            UserPersistenceError::query(format!("stored user id {} is not positive", self.id))
        })?;
        Ok(User {
            id,
            email: EmailAddress::from_normalized(self.email),
            username: self.username.map(Username::from_validated),
            password_hash: PasswordHash::new(self.password_hash),
            email_verified: self.email_verified,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub email: &'a str,
    pub username: Option<&'a str>,
    pub password_hash: &'a str,
}

/// Partial update. `None` leaves a column alone; for `username`,
/// `Some(None)` writes `NULL`.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserChangeset<'a> {
    pub email: Option<&'a str>,
    pub username: Option<Option<&'a str>>,
    pub password_hash: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> UserChangeset<'a> {
    pub(crate) fn from_changes(changes: &'a UserChanges, now: DateTime<Utc>) -> Self {
        Self {
            email: changes.email.as_ref().map(AsRef::as_ref),
            username: match &changes.username {
                FieldUpdate::Keep => None,
                FieldUpdate::Clear => Some(None),
                FieldUpdate::Set(name) => Some(Some(name.as_ref())),
            },
            password_hash: changes.password_hash.as_ref().map(PasswordHash::as_str),
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn row(id: i64) -> UserRow {
        let now = Utc::now();
        UserRow {
            id,
            email: "ada@example.com".to_owned(),
            username: Some("ada".to_owned()),
            password_hash: "$argon2id$stub".to_owned(),
            email_verified: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[rstest]
    fn rows_convert_to_users() {
        let user = row(4).into_domain().expect("valid row");
        assert_eq!(user.id.get(), 4);
        assert_eq!(user.email.as_ref(), "ada@example.com");
        assert_eq!(user.username.as_ref().map(AsRef::as_ref), Some("ada"));
        assert!(user.email_verified);
    }

    #[rstest]
    fn non_positive_ids_are_query_errors() {
        assert!(matches!(
            row(0).into_domain(),
            Err(UserPersistenceError::Query { .. })
        ));
    }

    #[rstest]
    #[case(FieldUpdate::Keep, None)]
    #[case(FieldUpdate::Clear, Some(None))]
    #[case(FieldUpdate::Set(Username::from_validated("ada".to_owned())), Some(Some("ada")))]
    fn username_updates_map_to_nested_options(
        #[case] update: FieldUpdate<Username>,
        #[case] expected: Option<Option<&str>>,
    ) {
        let changes = UserChanges {
            username: update,
            ..UserChanges::default()
        };
        let changeset = UserChangeset::from_changes(&changes, Utc::now());
        assert_eq!(changeset.username, expected);
        assert_eq!(changeset.email, None);
    }
}
