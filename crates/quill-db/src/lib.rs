//! Quill Database Layer
//!
//! This crate provides the persistence layer for Quill: typed records for
//! users, posts and sessions, the schema bootstrap, and the SQL behind each
//! operation. SQLite is reached through a sqlx connection pool.

pub mod error;
pub mod models;
pub mod repository;
pub mod utils;

pub use error::DbError;
pub use models::*;
pub use repository::Database;

/// Re-export sqlx types for convenience
pub use sqlx::SqlitePool;
