//! Classification of Diesel and pool failures into [`UserPersistenceError`].
//!
//! Constraint names follow PostgreSQL's defaults (`users_<column>_key`,
//! `users_<column>_check`), so the column can be read back from the name.

use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::UserPersistenceError;

use super::pool::PoolError;

const TABLE_PREFIX: &str = "users_";

pub(super) fn map_pool_error(error: PoolError) -> UserPersistenceError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            UserPersistenceError::connection(message)
        }
    }
}

pub(super) fn map_diesel_error(error: DieselError) -> UserPersistenceError {
    match error {
        DieselError::DatabaseError(kind, info) => classify(kind, &*info),
        DieselError::NotFound => UserPersistenceError::query("record not found"),
        DieselError::QueryBuilderError(_) => UserPersistenceError::query("database query error"),
        other => {
            debug!(error = %other, "diesel operation failed");
            UserPersistenceError::query("database error")
        }
    }
}

fn classify(kind: DatabaseErrorKind, info: &dyn DatabaseErrorInformation) -> UserPersistenceError {
    debug!(
        ?kind,
        constraint = info.constraint_name(),
        column = info.column_name(),
        "database rejected statement"
    );
    match kind {
        DatabaseErrorKind::UniqueViolation => {
            let conflict = info.details().and_then(parse_key_detail);
            let field = conflict
                .as_ref()
                .map(|(column, _)| column.clone())
                .or_else(|| info.constraint_name().and_then(column_of).map(str::to_owned))
                .unwrap_or_else(|| "value".to_owned());
            UserPersistenceError::uniqueness(field, conflict.map(|(_, value)| value))
        }
        DatabaseErrorKind::ForeignKeyViolation => UserPersistenceError::foreign_key(
            info.constraint_name().unwrap_or("unknown"),
        ),
        DatabaseErrorKind::NotNullViolation => UserPersistenceError::validation(
            info.column_name().unwrap_or("value"),
            "must not be null",
        ),
        DatabaseErrorKind::CheckViolation => UserPersistenceError::validation(
            info.constraint_name().and_then(column_of).unwrap_or("value"),
            "violates a check constraint",
        ),
        DatabaseErrorKind::ClosedConnection | DatabaseErrorKind::UnableToSendCommand => {
            UserPersistenceError::connection("database connection error")
        }
        _ => UserPersistenceError::query("database error"),
    }
}

/// Column named by a `users_<column>_<suffix>` constraint.
fn column_of(constraint: &str) -> Option<&str> {
    constraint
        .strip_prefix(TABLE_PREFIX)
        .and_then(|rest| rest.rsplit_once('_'))
        .map(|(column, _)| column)
        .filter(|column| !column.is_empty())
}

/// Parse PostgreSQL's `Key (column)=(value) already exists.` detail.
fn parse_key_detail(detail: &str) -> Option<(String, String)> {
    let rest = detail.strip_prefix("Key (")?;
    let (column, rest) = rest.split_once(")=(")?;
    let (value, _) = rest.rsplit_once(')')?;
    Some((column.to_owned(), value.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[derive(Default)]
    struct Info {
        details: Option<&'static str>,
        column: Option<&'static str>,
        constraint: Option<&'static str>,
    }

    impl DatabaseErrorInformation for Info {
        fn message(&self) -> &str {
            "rejected"
        }
        fn details(&self) -> Option<&str> {
            self.details
        }
        fn hint(&self) -> Option<&str> {
            None
        }
        fn table_name(&self) -> Option<&str> {
            Some("users")
        }
        fn column_name(&self) -> Option<&str> {
            self.column
        }
        fn constraint_name(&self) -> Option<&str> {
            self.constraint
        }
        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    fn db_error(kind: DatabaseErrorKind, info: Info) -> DieselError {
        DieselError::DatabaseError(kind, Box::new(info))
    }

    #[rstest]
    fn unique_violation_names_column_and_value() {
        let err = map_diesel_error(db_error(
            DatabaseErrorKind::UniqueViolation,
            Info {
                details: Some("Key (email)=(ada@example.com) already exists."),
                constraint: Some("users_email_key"),
                ..Info::default()
            },
        ));
        assert_eq!(
            err,
            UserPersistenceError::uniqueness("email", Some("ada@example.com".to_owned()))
        );
    }

    #[rstest]
    fn unique_violation_falls_back_to_constraint_name() {
        let err = map_diesel_error(db_error(
            DatabaseErrorKind::UniqueViolation,
            Info {
                constraint: Some("users_username_key"),
                ..Info::default()
            },
        ));
        assert_eq!(err, UserPersistenceError::uniqueness("username", None::<String>));
    }

    #[rstest]
    #[case(
        DatabaseErrorKind::NotNullViolation,
        Info { column: Some("password_hash"), ..Info::default() },
        UserPersistenceError::validation("password_hash", "must not be null")
    )]
    #[case(
        DatabaseErrorKind::CheckViolation,
        Info { constraint: Some("users_email_check"), ..Info::default() },
        UserPersistenceError::validation("email", "violates a check constraint")
    )]
    #[case(
        DatabaseErrorKind::ForeignKeyViolation,
        Info { constraint: Some("sessions_user_id_fkey"), ..Info::default() },
        UserPersistenceError::foreign_key("sessions_user_id_fkey")
    )]
    #[case(
        DatabaseErrorKind::ClosedConnection,
        Info::default(),
        UserPersistenceError::connection("database connection error")
    )]
    #[case(
        DatabaseErrorKind::SerializationFailure,
        Info::default(),
        UserPersistenceError::query("database error")
    )]
    fn database_errors_are_classified(
        #[case] kind: DatabaseErrorKind,
        #[case] info: Info,
        #[case] expected: UserPersistenceError,
    ) {
        assert_eq!(map_diesel_error(db_error(kind, info)), expected);
    }

    #[rstest]
    fn pool_failures_are_connection_errors() {
        assert_eq!(
            map_pool_error(PoolError::checkout("timed out")),
            UserPersistenceError::connection("timed out")
        );
    }

    #[rstest]
    #[case("users_email_key", Some("email"))]
    #[case("users_password_hash_check", Some("password_hash"))]
    #[case("other_email_key", None)]
    #[case("users__key", None)]
    fn constraint_columns(#[case] constraint: &str, #[case] expected: Option<&str>) {
        assert_eq!(column_of(constraint), expected);
    }

    #[rstest]
    #[case("Key (email)=(a@b.co) already exists.", Some(("email", "a@b.co")))]
    #[case("Key (username)=(x) y) already exists.", Some(("username", "x) y")))]
    #[case("unexpected", None)]
    fn key_details(#[case] detail: &str, #[case] expected: Option<(&str, &str)>) {
        let parsed = parse_key_detail(detail);
        assert_eq!(
            parsed.as_ref().map(|(c, v)| (c.as_str(), v.as_str())),
            expected
        );
    }
}
