//! HTTP API layer: route handlers and their request/response models.

pub mod handlers;
pub mod models;
