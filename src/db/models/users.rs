//! Database DTOs for users.

use crate::api::models::users::Role;
use crate::types::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fields persisted when creating a user. The password arrives already
/// hashed; plaintext never reaches this layer.
#[derive(Debug, Clone)]
pub struct UserCreateDBRequest {
    pub email: String,
    pub password_hash: String,
    pub post_code: String,
    pub roles: Vec<Role>,
}

/// Partial update: `None` fields keep their stored values. A `Some` password
/// hash replaces the stored one; roles replace the whole role set.
#[derive(Debug, Clone, Default)]
pub struct UserUpdateDBRequest {
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub post_code: Option<String>,
    pub roles: Option<Vec<Role>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDBResponse {
    pub id: UserId,
    pub email: String,
    pub password_hash: String,
    pub post_code: String,
    pub roles: Vec<Role>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
