//! Common type definitions shared across the API, auth and database layers.
//!
//! Entity IDs are plain `i64` rowids wrapped in type aliases for readability.
//! [`Resource`] and [`Operation`] describe what an authorization check was
//! guarding, so a 403 can say "Insufficient permissions to Create advice"
//! without the handler formatting its own message.

use std::fmt;

// Type aliases for IDs
pub type AdviceId = i64;
pub type UserId = i64;

/// Actions a caller can attempt against a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
}

/// Resources guarded by authorization checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Advices,
    Users,
    Weather,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Create => write!(f, "create"),
            Operation::Read => write!(f, "read"),
            Operation::Update => write!(f, "update"),
            Operation::Delete => write!(f, "delete"),
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Advices => write!(f, "advice"),
            Resource::Users => write!(f, "user"),
            Resource::Weather => write!(f, "weather"),
        }
    }
}
