//! # Taskly Shared Library
//!
//! Domain types, persistence and business logic for the Taskly task tracker.
//! The HTTP surface lives in `taskly-api`; everything here is transport
//! agnostic apart from the header parsing in [`auth::guard`].
//!
//! ## Module Organization
//!
//! - `auth`: Password hashing, tokens, registration/login and the request guard
//! - `db`: PostgreSQL pool and migrations
//! - `error`: Service error type shared by every operation
//! - `models`: Users and tasks
//! - `repository`: Storage traits with in-memory and PostgreSQL adapters
//! - `services`: Owner-scoped task operations

pub mod auth;
pub mod db;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

/// Current version of the Taskly shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
