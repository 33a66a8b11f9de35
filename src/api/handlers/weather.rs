//! Weather proxy handlers.
//!
//! Both endpoints read through the shared cache under a `weather_{location}`
//! key. Only successful upstream bodies are cached; an upstream failure is
//! answered with a message payload and the next request tries the upstream
//! again. The payload still ships with a 200, matching what clients of the
//! earlier revisions expect.

use crate::{
    AppState,
    api::models::users::CurrentUser,
    db::{errors::DbError, handlers::{Repository, Users}},
    errors::{Error, Result},
};
use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::instrument;

const UPSTREAM_FAILURE_BODY: &str = r#"{"message":"Failed to fetch weather data"}"#;

/// GET /weather — weather for the authenticated user's postcode.
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn weather_for_current_user(State(state): State<AppState>, user: CurrentUser) -> Result<Response> {
    // The token may outlive the account; a vanished profile is a server-side
    // inconsistency, not a client error
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let profile = Users::new(&mut conn)
        .get_by_id(user.id)
        .await?
        .ok_or_else(|| Error::Internal {
            operation: format!("load profile for authenticated user {}", user.id),
        })?;

    if profile.post_code.is_empty() {
        return Err(Error::Internal {
            operation: format!("user {} has no postcode on file", user.id),
        });
    }

    weather_for_location(&state, &profile.post_code).await
}

/// GET /weather/{city}
#[instrument(skip(state))]
pub async fn weather_for_city(State(state): State<AppState>, Path(city): Path<String>) -> Result<Response> {
    weather_for_location(&state, &city).await
}

async fn weather_for_location(state: &AppState, location: &str) -> Result<Response> {
    let cache_key = format!("weather_{location}");

    if let Some(cached) = state.cache.get(&cache_key).await {
        return Ok(json_body(cached.to_string()));
    }

    let upstream = state.weather.fetch(location).await?;

    if !upstream.success {
        return Ok(json_body(UPSTREAM_FAILURE_BODY.to_string()));
    }

    state
        .cache
        .insert(cache_key, upstream.body.as_str(), state.config.weather.cache_ttl, &[])
        .await;

    Ok(json_body(upstream.body))
}

fn json_body(body: String) -> Response {
    (StatusCode::OK, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

#[cfg(test)]
mod tests {
    use crate::{Config, test_utils::*};
    use axum::http::StatusCode;
    use serde_json::Value;
    use sqlx::SqlitePool;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn weather_test_config() -> (MockServer, Config) {
        let server = MockServer::start().await;
        let mut config = create_test_config();
        config.weather.base_url = server.uri().parse().unwrap();
        config.weather.api_key = Some("test-key".to_string());
        (server, config)
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_city_weather_is_cached(pool: SqlitePool) {
        let (mock_server, config) = weather_test_config().await;

        // Exactly one upstream call is allowed; the second read must be a
        // cache hit
        Mock::given(method("GET"))
            .and(query_param("q", "Paris"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"main":{"temp":21.5}}"#))
            .expect(1)
            .mount(&mock_server)
            .await;

        let server = create_test_app_with_config(pool, config);

        let first = server.get("/weather/Paris").await;
        first.assert_status_ok();
        assert_eq!(first.text(), r#"{"main":{"temp":21.5}}"#);

        let second = server.get("/weather/Paris").await;
        second.assert_status_ok();
        assert_eq!(second.text(), r#"{"main":{"temp":21.5}}"#);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_upstream_failure_is_reported_but_not_cached(pool: SqlitePool) {
        let (mock_server, config) = weather_test_config().await;

        // First call fails upstream, second succeeds
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"main":{"temp":3.0}}"#))
            .mount(&mock_server)
            .await;

        let server = create_test_app_with_config(pool, config);

        let first = server.get("/weather/Oslo").await;
        first.assert_status_ok();
        let body: Value = first.json();
        assert_eq!(body["message"], "Failed to fetch weather data");

        // The failure was not cached; the retry reaches the upstream
        let second = server.get("/weather/Oslo").await;
        assert_eq!(second.text(), r#"{"main":{"temp":3.0}}"#);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_current_user_weather_uses_postcode(pool: SqlitePool) {
        let (mock_server, config) = weather_test_config().await;

        // Test users are provisioned with postcode 75001
        Mock::given(method("GET"))
            .and(query_param("q", "75001"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"main":{"temp":18.0}}"#))
            .expect(1)
            .mount(&mock_server)
            .await;

        let token = user_token(&pool, &config).await;
        let server = create_test_app_with_config(pool, config);

        let response = server.get("/weather").authorization_bearer(&token).await;
        response.assert_status_ok();
        assert_eq!(response.text(), r#"{"main":{"temp":18.0}}"#);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_current_user_weather_requires_authentication(pool: SqlitePool) {
        let (_mock_server, config) = weather_test_config().await;
        let server = create_test_app_with_config(pool, config);

        server.get("/weather").await.assert_status(StatusCode::UNAUTHORIZED);
    }
}
