//! Handlers for user account endpoints. All of them are ADMIN-gated;
//! administrators provision accounts, there is no self-registration.
//!
//! The listing is cached under [`USERS_CACHE_TAG`]; every mutation bumps the
//! tag after the write lands so readers never see a deleted or stale account
//! for the cache TTL.

use crate::{
    AppState,
    api::models::users::{Role, UserCreate, UserResponse, UserUpdate},
    auth::{password, permissions::RequiresAdmin},
    cache::USERS_CACHE_TAG,
    db::{
        errors::DbError,
        handlers::{Repository, Users, users::UserFilter},
        models::users::{UserCreateDBRequest, UserUpdateDBRequest},
    },
    errors::{Error, Result},
    types::UserId,
    validation::{is_valid_post_code, validate_user, validate_user_update},
};
use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use tracing::instrument;

const USER_NOT_FOUND: &str = "User not found";
const INVALID_POST_CODE: &str = "The postcode is invalid, it must match the format: 10000";
const USERS_LIST_CACHE_KEY: &str = "users_list";

/// Hash a password off the async runtime; argon2 is deliberately slow.
async fn hash_password(plaintext: String) -> Result<String> {
    tokio::task::spawn_blocking(move || password::hash_string(&plaintext))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("join password hashing task: {e}"),
        })?
}

/// POST /user
#[instrument(skip(state, request))]
pub async fn create_user(
    State(state): State<AppState>,
    RequiresAdmin(_admin): RequiresAdmin,
    Json(request): Json<UserCreate>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    let errors = validate_user(request.email.as_deref(), request.password.as_deref(), request.post_code.as_deref());
    if !errors.is_empty() {
        return Err(Error::Validation(errors));
    }

    // The pattern check runs after generic validation and has its own message
    let post_code = request.post_code.unwrap_or_default();
    if !is_valid_post_code(&post_code) {
        return Err(Error::BadRequest {
            message: INVALID_POST_CODE.to_string(),
        });
    }

    let password_hash = hash_password(request.password.unwrap_or_default()).await?;

    // Client-supplied roles are ignored; every new account starts as USER
    let db_request = UserCreateDBRequest {
        email: request.email.unwrap_or_default(),
        password_hash,
        post_code,
        roles: vec![Role::User],
    };

    // The account row and its roles land in one transaction; a failure on
    // either write rolls both back
    let mut tx = state.db.begin().await.map_err(DbError::from)?;
    let created = Users::new(&mut tx).create(&db_request).await?;
    tx.commit().await.map_err(DbError::from)?;

    state.cache.invalidate_tag(USERS_CACHE_TAG);

    Ok((StatusCode::CREATED, Json(UserResponse::from(created))))
}

/// GET /user — cached listing of all accounts (sanitized).
#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>, RequiresAdmin(_admin): RequiresAdmin) -> Result<Response> {
    if let Some(cached) = state.cache.get(USERS_LIST_CACHE_KEY).await {
        return Ok(json_body(cached.to_string()));
    }

    // Pin the tag version before the read; a mutation committing while the
    // listing is built still invalidates the entry we are about to insert
    let snapshot = state.cache.snapshot_tags(&[USERS_CACHE_TAG]);

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let users = Users::new(&mut conn).list(&UserFilter::default()).await?;
    let users: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();

    let body = serde_json::to_string(&users).map_err(|e| Error::Internal {
        operation: format!("serialize users listing: {e}"),
    })?;
    state
        .cache
        .insert_pinned(USERS_LIST_CACHE_KEY, body.as_str(), state.config.cache.users_ttl, snapshot)
        .await;

    Ok(json_body(body))
}

/// GET /user/{id}
#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    RequiresAdmin(_admin): RequiresAdmin,
    Path(id): Path<UserId>,
) -> Result<Json<UserResponse>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let user = Users::new(&mut conn)
        .get_by_id(id)
        .await?
        .ok_or_else(|| Error::NotFound {
            message: USER_NOT_FOUND.to_string(),
        })?;

    Ok(Json(UserResponse::from(user)))
}

/// PUT /user/{id} — merges supplied fields into the stored record, then
/// re-validates the merged result.
#[instrument(skip(state, request))]
pub async fn update_user(
    State(state): State<AppState>,
    RequiresAdmin(_admin): RequiresAdmin,
    Path(id): Path<UserId>,
    Json(request): Json<UserUpdate>,
) -> Result<Json<UserResponse>> {
    // Read-merge-write runs in one transaction so the users row and the
    // roles side table cannot diverge
    let mut tx = state.db.begin().await.map_err(DbError::from)?;
    let mut repo = Users::new(&mut tx);

    let existing = repo.get_by_id(id).await?.ok_or_else(|| Error::NotFound {
        message: USER_NOT_FOUND.to_string(),
    })?;

    let merged_email = request.email.as_deref().unwrap_or(&existing.email);
    let merged_post_code = request.post_code.as_deref().unwrap_or(&existing.post_code);
    let errors = validate_user_update(merged_email, request.password.as_deref(), merged_post_code);
    if !errors.is_empty() {
        return Err(Error::Validation(errors));
    }

    if !is_valid_post_code(merged_post_code) {
        return Err(Error::BadRequest {
            message: INVALID_POST_CODE.to_string(),
        });
    }

    let password_hash = match request.password {
        Some(plaintext) => Some(hash_password(plaintext).await?),
        None => None,
    };

    let db_request = UserUpdateDBRequest {
        email: request.email,
        password_hash,
        post_code: request.post_code,
        roles: request.roles,
    };
    let updated = repo.update(id, &db_request).await.map_err(|e| match e {
        DbError::NotFound => Error::NotFound {
            message: USER_NOT_FOUND.to_string(),
        },
        other => Error::Database(other),
    })?;
    tx.commit().await.map_err(DbError::from)?;

    state.cache.invalidate_tag(USERS_CACHE_TAG);

    Ok(Json(UserResponse::from(updated)))
}

/// DELETE /user/{id}
#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    RequiresAdmin(_admin): RequiresAdmin,
    Path(id): Path<UserId>,
) -> Result<Json<Value>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let removed = Users::new(&mut conn).delete(id).await?;

    if !removed {
        return Err(Error::NotFound {
            message: USER_NOT_FOUND.to_string(),
        });
    }

    state.cache.invalidate_tag(USERS_CACHE_TAG);

    Ok(Json(json!({ "message": "User deleted" })))
}

fn json_body(body: String) -> Response {
    (StatusCode::OK, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}
