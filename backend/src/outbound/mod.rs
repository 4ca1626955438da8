//! Outbound adapters implementing domain ports.
//!
//! - **memory**: in-process user store
//! - **persistence**: PostgreSQL user store via Diesel
//! - **crypto**: Argon2id password hashing
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no business rules.

pub mod crypto;
pub mod memory;
pub mod persistence;
