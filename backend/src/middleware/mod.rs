//! Request middleware.
//!
//! Purpose: cross-cutting request lifecycle concerns. Error rendering lives
//! with the HTTP adapter in [`crate::inbound::http::problem`].

pub mod trace;

pub use trace::Trace;
