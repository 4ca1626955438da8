//! Diesel table definitions for the PostgreSQL schema.
//!
//! Must match `migrations/*/up.sql`. Regenerate with `diesel print-schema`
//! after a migration changes the table.

diesel::table! {
    /// Registered accounts.
    users (id) {
        id -> Int8,
        #[max_length = 254]
        email -> Varchar,
        #[max_length = 50]
        username -> Nullable<Varchar>,
        #[max_length = 255]
        password_hash -> Varchar,
        email_verified -> Bool,
        #[max_length = 255]
        email_verification_token -> Nullable<Varchar>,
        email_verification_expiry -> Nullable<Timestamptz>,
        #[max_length = 255]
        reset_token -> Nullable<Varchar>,
        reset_token_expiry -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}
