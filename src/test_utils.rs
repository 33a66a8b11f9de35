//! Test utilities for integration testing.

use crate::{
    AppState, Config, build_router,
    api::models::users::{CurrentUser, Role},
    auth::{password, session},
    cache::TaggedCache,
    db::{
        handlers::{Repository, Users},
        models::users::{UserCreateDBRequest, UserDBResponse},
    },
    weather::WeatherClient,
};
use axum_test::TestServer;
use sqlx::SqlitePool;

pub const TEST_PASSWORD: &str = "correct horse battery staple";

pub fn create_test_config() -> Config {
    Config {
        secret_key: Some("test-secret-key-for-testing-only".to_string()),
        ..Default::default()
    }
}

pub fn create_test_app(pool: SqlitePool) -> TestServer {
    create_test_app_with_config(pool, create_test_config())
}

pub fn create_test_app_with_config(pool: SqlitePool, config: Config) -> TestServer {
    let state = AppState {
        db: pool,
        cache: TaggedCache::new(config.cache.max_capacity),
        weather: WeatherClient::new(&config.weather).expect("Failed to build weather client"),
        config,
    };

    TestServer::new(build_router(state)).expect("Failed to create test server")
}

pub async fn create_test_user(pool: &SqlitePool, email: &str, roles: Vec<Role>) -> UserDBResponse {
    let password_hash = password::hash_string(TEST_PASSWORD).expect("Failed to hash test password");

    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut users_repo = Users::new(&mut conn);

    let user_create = UserCreateDBRequest {
        email: email.to_string(),
        password_hash,
        post_code: "75001".to_string(),
        roles,
    };

    users_repo.create(&user_create).await.expect("Failed to create test user")
}

pub fn session_token_for(user: &UserDBResponse, config: &Config) -> String {
    let current_user = CurrentUser::from(user.clone());
    session::create_session_token(&current_user, config).expect("Failed to create session token")
}

/// Create an admin account and return a bearer token for it.
pub async fn admin_token(pool: &SqlitePool, config: &Config) -> String {
    let admin = create_test_user(pool, "admin@test.com", vec![Role::Admin]).await;
    session_token_for(&admin, config)
}

/// Create a regular account and return a bearer token for it.
pub async fn user_token(pool: &SqlitePool, config: &Config) -> String {
    let user = create_test_user(pool, "user@test.com", vec![Role::User]).await;
    session_token_for(&user, config)
}
