//! Route handler functions, one module per resource.

pub mod advices;
pub mod auth;
pub mod users;
pub mod weather;
