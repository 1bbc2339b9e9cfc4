//! Quill Core Business Logic
//!
//! This crate provides the post repository: validation of submitted posts
//! and ownership-gated mutation on top of the database layer.

pub mod error;
pub mod posts;

pub use error::CoreError;
pub use posts::PostRepository;
