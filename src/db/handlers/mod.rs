//! Table repositories.

pub mod advices;
pub mod repository;
pub mod users;

pub use advices::Advices;
pub use repository::Repository;
pub use users::Users;
