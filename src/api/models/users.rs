//! API request/response models for users.

use crate::db::models::users::UserDBResponse;
use crate::types::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Role enum for access control
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    User,
}

// User request models.
//
// Every field is optional at the deserialization boundary so that missing
// fields surface as structured validation errors rather than a rejected body.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserCreate {
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(rename = "postcode")]
    pub post_code: Option<String>,
    /// Accepted but ignored: new accounts always start with the base role.
    #[serde(default)]
    pub roles: Option<Vec<Role>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(rename = "postcode")]
    pub post_code: Option<String>,
    pub roles: Option<Vec<Role>>,
}

// User response model. The password hash never leaves the database layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: UserId,
    pub email: String,
    #[serde(rename = "postcode")]
    pub post_code: String,
    pub roles: Vec<Role>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserDBResponse> for UserResponse {
    fn from(db: UserDBResponse) -> Self {
        Self {
            id: db.id,
            email: db.email,
            post_code: db.post_code,
            roles: db.roles,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

/// The authenticated caller, as carried by the session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub email: String,
    pub roles: Vec<Role>,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.roles.contains(&Role::Admin)
    }
}

impl From<UserDBResponse> for CurrentUser {
    fn from(db: UserDBResponse) -> Self {
        Self {
            id: db.id,
            email: db.email,
            roles: db.roles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"ADMIN\"");
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"USER\"");
    }

    #[test]
    fn test_user_create_tolerates_missing_fields() {
        let parsed: UserCreate = serde_json::from_str(r#"{"email": "a@b.com"}"#).unwrap();
        assert_eq!(parsed.email.as_deref(), Some("a@b.com"));
        assert!(parsed.password.is_none());
        assert!(parsed.post_code.is_none());
    }

    #[test]
    fn test_user_response_hides_password_hash() {
        let response = UserResponse::from(UserDBResponse {
            id: 1,
            email: "a@b.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            post_code: "75001".to_string(),
            roles: vec![Role::User],
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        });

        let body = serde_json::to_string(&response).unwrap();
        assert!(!body.contains("argon2"));
        assert!(body.contains("\"postcode\":\"75001\""));
    }

    #[test]
    fn test_is_admin() {
        let admin = CurrentUser {
            id: 1,
            email: "a@b.com".to_string(),
            roles: vec![Role::Admin, Role::User],
        };
        assert!(admin.is_admin());

        let user = CurrentUser {
            id: 2,
            email: "c@d.com".to_string(),
            roles: vec![Role::User],
        };
        assert!(!user.is_admin());
    }
}
