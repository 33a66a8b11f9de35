pub mod advices;
pub mod auth;
pub mod users;
