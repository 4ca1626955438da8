//! PostgreSQL persistence for user accounts using Diesel ORM.
//!
//! Row structs and the table definition stay private to this module; the
//! repository translates rows into domain users and driver failures into
//! [`crate::domain::ports::UserPersistenceError`] variants.
//!
//! ```ignore
//! use accounts_backend::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/accounts")).await?;
//! let repo = DieselUserRepository::new(pool);
//! ```

mod diesel_error_mapping;
mod diesel_user_repository;
mod models;
mod pool;
mod schema;

pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
