//! Authentication and authorization.
//!
//! Callers authenticate with a bearer JWT obtained from `POST /login`. The
//! token carries the user's id, email and role set; handlers receive it
//! through the [`current_user`] extractor. Role-gated routes use the
//! [`permissions::RequiresAdmin`] guard, which runs before the handler body
//! and rejects non-admin callers with a 403.
//!
//! # Modules
//!
//! - [`current_user`]: extractor for the authenticated user
//! - [`password`]: password hashing and verification using Argon2
//! - [`permissions`]: role guards for protected routes
//! - [`session`]: JWT creation and verification

pub mod current_user;
pub mod password;
pub mod permissions;
pub mod session;
