//! Database layer: repositories over SQLite and their DTOs.
//!
//! Each table has a repository in [`handlers`] implementing the shared
//! [`handlers::repository::Repository`] trait, with request/response DTOs in
//! [`models`]. Errors from sqlx are translated into [`errors::DbError`] so
//! the API layer never matches on raw driver errors.

pub mod errors;
pub mod handlers;
pub mod models;
