//! # Rollcall Shared Library
//!
//! Types, queries and authentication primitives shared by the Rollcall
//! API server and its test harness.
//!
//! ## Module Organization
//!
//! - `db`: Connection pool and schema migrations
//! - `models`: Contacts, phones, classes, students and users with their queries
//! - `auth`: Password hashing, session tokens, URL signing, owner checks

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the Rollcall shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
