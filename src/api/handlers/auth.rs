//! Login handler issuing JWT session tokens.

use crate::{
    AppState,
    api::models::{
        auth::{LoginRequest, LoginResponse},
        users::{CurrentUser, UserResponse},
    },
    auth::{password, session},
    db::{errors::DbError, handlers::Users},
    errors::{Error, Result},
};
use axum::{Json, extract::State};
use tracing::instrument;

/// POST /login
///
/// A wrong password and an unknown email produce the same response, so the
/// endpoint cannot be used to enumerate accounts.
#[instrument(skip(state, request))]
pub async fn login(State(state): State<AppState>, Json(request): Json<LoginRequest>) -> Result<Json<LoginResponse>> {
    let invalid_credentials = || Error::Unauthenticated {
        message: Some("Invalid email or password".to_string()),
    };

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let user = Users::new(&mut conn)
        .get_user_by_email(&request.email)
        .await?
        .ok_or_else(invalid_credentials)?;

    let stored_hash = user.password_hash.clone();
    let supplied = request.password;
    let verified = tokio::task::spawn_blocking(move || password::verify_string(&supplied, &stored_hash))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("join password verification task: {e}"),
        })??;

    if !verified {
        return Err(invalid_credentials());
    }

    let current_user = CurrentUser::from(user.clone());
    let token = session::create_session_token(&current_user, &state.config)?;

    Ok(Json(LoginResponse {
        token,
        user: UserResponse::from(user),
    }))
}

#[cfg(test)]
mod tests {
    use crate::{api::models::users::Role, test_utils::*};
    use axum::http::StatusCode;
    use serde_json::{Value, json};
    use sqlx::SqlitePool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_login_issues_usable_token(pool: SqlitePool) {
        let config = create_test_config();
        create_test_user(&pool, "admin@test.com", vec![Role::Admin]).await;
        let server = create_test_app_with_config(pool, config);

        let response = server
            .post("/login")
            .json(&json!({"email": "admin@test.com", "password": TEST_PASSWORD}))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["user"]["email"], "admin@test.com");
        let token = body["token"].as_str().unwrap().to_string();

        // The token carries the ADMIN role
        server.get("/user").authorization_bearer(&token).await.assert_status_ok();
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_wrong_password_and_unknown_email_look_alike(pool: SqlitePool) {
        let config = create_test_config();
        create_test_user(&pool, "user@test.com", vec![Role::User]).await;
        let server = create_test_app_with_config(pool, config);

        let wrong_password = server
            .post("/login")
            .json(&json!({"email": "user@test.com", "password": "nope"}))
            .await;
        wrong_password.assert_status(StatusCode::UNAUTHORIZED);

        let unknown_email = server
            .post("/login")
            .json(&json!({"email": "nobody@test.com", "password": "nope"}))
            .await;
        unknown_email.assert_status(StatusCode::UNAUTHORIZED);

        assert_eq!(wrong_password.json::<Value>()["message"], unknown_email.json::<Value>()["message"]);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_garbage_bearer_token_is_unauthorized(pool: SqlitePool) {
        let server = create_test_app(pool);

        server
            .get("/user")
            .authorization_bearer("not.a.real.token")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}
