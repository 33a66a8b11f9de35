//! Database request/response DTOs.

pub mod advices;
pub mod users;
