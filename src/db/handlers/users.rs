//! Database repository for user accounts and their roles.

use crate::api::models::users::Role;
use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::users::{UserCreateDBRequest, UserDBResponse, UserUpdateDBRequest},
};
use crate::types::UserId;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteConnection};
use tracing::instrument;

/// Filter for listing users. Currently empty; kept so the repository trait
/// stays uniform across tables.
#[derive(Debug, Clone, Default)]
pub struct UserFilter {}

// Database entity model, without the roles side table
#[derive(Debug, Clone, FromRow)]
struct User {
    pub id: UserId,
    pub email: String,
    pub password_hash: String,
    pub post_code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    fn into_response(self, roles: Vec<Role>) -> UserDBResponse {
        UserDBResponse {
            id: self.id,
            email: self.email,
            password_hash: self.password_hash,
            post_code: self.post_code,
            roles,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

pub struct Users<'c> {
    db: &'c mut SqliteConnection,
}

impl<'c> Users<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }

    async fn roles_for(&mut self, user_id: UserId) -> Result<Vec<Role>> {
        let roles = sqlx::query_scalar::<_, Role>(
            "SELECT role FROM user_roles WHERE user_id = ? ORDER BY role",
        )
        .bind(user_id)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(roles)
    }

    async fn replace_roles(&mut self, user_id: UserId, roles: &[Role]) -> Result<()> {
        sqlx::query("DELETE FROM user_roles WHERE user_id = ?")
            .bind(user_id)
            .execute(&mut *self.db)
            .await?;

        for role in roles {
            sqlx::query("INSERT OR IGNORE INTO user_roles (user_id, role) VALUES (?, ?)")
                .bind(user_id)
                .bind(role)
                .execute(&mut *self.db)
                .await?;
        }

        Ok(())
    }

    /// Look up a user by email address, for login.
    #[instrument(skip(self, email), err)]
    pub async fn get_user_by_email(&mut self, email: &str) -> Result<Option<UserDBResponse>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&mut *self.db)
            .await?;

        match user {
            Some(user) => {
                let roles = self.roles_for(user.id).await?;
                Ok(Some(user.into_response(roles)))
            }
            None => Ok(None),
        }
    }
}

/// Every account keeps the base role, whatever the caller asked for.
fn with_base_role(roles: &[Role]) -> Vec<Role> {
    let mut roles = roles.to_vec();
    if !roles.contains(&Role::User) {
        roles.push(Role::User);
    }
    roles.sort();
    roles.dedup();
    roles
}

#[async_trait::async_trait]
impl<'c> Repository for Users<'c> {
    type CreateRequest = UserCreateDBRequest;
    type UpdateRequest = UserUpdateDBRequest;
    type Response = UserDBResponse;
    type Id = UserId;
    type Filter = UserFilter;

    #[instrument(skip(self, request), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let now = Utc::now();
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, post_code, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&request.email)
        .bind(&request.password_hash)
        .bind(&request.post_code)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *self.db)
        .await?;

        let roles = with_base_role(&request.roles);
        self.replace_roles(user.id, &roles).await?;

        Ok(user.into_response(roles))
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        match user {
            Some(user) => {
                let roles = self.roles_for(user.id).await?;
                Ok(Some(user.into_response(roles)))
            }
            None => Ok(None),
        }
    }

    #[instrument(skip(self, _filter), err)]
    async fn list(&mut self, _filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY id")
            .fetch_all(&mut *self.db)
            .await?;

        let mut responses = Vec::with_capacity(users.len());
        for user in users {
            let roles = self.roles_for(user.id).await?;
            responses.push(user.into_response(roles));
        }

        Ok(responses)
    }

    #[instrument(skip(self, request), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                email = COALESCE(?, email),
                password_hash = COALESCE(?, password_hash),
                post_code = COALESCE(?, post_code),
                updated_at = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&request.email)
        .bind(&request.password_hash)
        .bind(&request.post_code)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        let roles = match &request.roles {
            Some(roles) => {
                let roles = with_base_role(roles);
                self.replace_roles(user.id, &roles).await?;
                roles
            }
            None => self.roles_for(user.id).await?,
        };

        Ok(user.into_response(roles))
    }

    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        // user_roles rows go with the user via ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
