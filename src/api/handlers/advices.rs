//! Handlers for gardening advice endpoints.
//!
//! Reads are open; mutations require the ADMIN role via [`RequiresAdmin`].
//! Note the status-code quirk on update: it answers 201, kept for parity
//! with existing clients.

use crate::{
    AppState,
    api::models::advices::{AdviceCreate, AdviceResponse, AdviceUpdate},
    auth::permissions::RequiresAdmin,
    db::{
        errors::DbError,
        handlers::{
            Advices, Repository,
            advices::AdviceFilter,
        },
        models::advices::{AdviceCreateDBRequest, AdviceUpdateDBRequest},
    },
    errors::{Error, Result},
    types::AdviceId,
    validation::validate_advice,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{Datelike, Utc};
use serde_json::{Value, json};
use tracing::instrument;

const NO_ADVICE_FOR_ID: &str = "No advice found for this ID";

/// GET /advices/all
#[instrument(skip(state))]
pub async fn list_all_advices(State(state): State<AppState>) -> Result<Json<Vec<AdviceResponse>>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let advices = Advices::new(&mut conn).list(&AdviceFilter::default()).await?;

    Ok(Json(advices.into_iter().map(AdviceResponse::from).collect()))
}

/// GET /advices/{id}
#[instrument(skip(state))]
pub async fn get_advice(State(state): State<AppState>, Path(id): Path<AdviceId>) -> Result<Json<AdviceResponse>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let advice = Advices::new(&mut conn)
        .get_by_id(id)
        .await?
        .ok_or_else(|| Error::NotFound {
            message: NO_ADVICE_FOR_ID.to_string(),
        })?;

    Ok(Json(AdviceResponse::from(advice)))
}

/// GET /advices — advices for the current calendar month. An empty month is
/// still a 200 with an empty list.
#[instrument(skip(state))]
pub async fn list_current_month_advices(State(state): State<AppState>) -> Result<Json<Vec<AdviceResponse>>> {
    let month = i64::from(Utc::now().month());

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let advices = Advices::new(&mut conn).list(&AdviceFilter::for_month(month)).await?;

    Ok(Json(advices.into_iter().map(AdviceResponse::from).collect()))
}

/// GET /advices/month/{month} — collection lookup where an empty result is a
/// 404, unlike the current-month listing.
#[instrument(skip(state))]
pub async fn list_advices_for_month(
    State(state): State<AppState>,
    Path(month): Path<i64>,
) -> Result<Json<Vec<AdviceResponse>>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let advices = Advices::new(&mut conn).list(&AdviceFilter::for_month(month)).await?;

    if advices.is_empty() {
        return Err(Error::NotFound {
            message: "No advice found for this month".to_string(),
        });
    }

    Ok(Json(advices.into_iter().map(AdviceResponse::from).collect()))
}

/// POST /advices
#[instrument(skip(state, request))]
pub async fn create_advice(
    State(state): State<AppState>,
    RequiresAdmin(_admin): RequiresAdmin,
    Json(request): Json<AdviceCreate>,
) -> Result<(StatusCode, Json<AdviceResponse>)> {
    let errors = validate_advice(request.advice_text.as_deref(), request.month);
    if !errors.is_empty() {
        return Err(Error::Validation(errors));
    }

    // Validation guarantees both fields are present
    let db_request = AdviceCreateDBRequest {
        advice_text: request.advice_text.unwrap_or_default(),
        month: request.month.unwrap_or_default(),
    };

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let created = Advices::new(&mut conn).create(&db_request).await?;

    Ok((StatusCode::CREATED, Json(AdviceResponse::from(created))))
}

/// PUT /advices/{id} — field-level merge; absent fields keep stored values.
/// The merged record is re-validated before anything is persisted.
#[instrument(skip(state, request))]
pub async fn update_advice(
    State(state): State<AppState>,
    RequiresAdmin(_admin): RequiresAdmin,
    Path(id): Path<AdviceId>,
    Json(request): Json<AdviceUpdate>,
) -> Result<(StatusCode, Json<AdviceResponse>)> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let mut repo = Advices::new(&mut conn);

    let existing = repo.get_by_id(id).await?.ok_or_else(|| Error::NotFound {
        message: NO_ADVICE_FOR_ID.to_string(),
    })?;

    let merged_text = request.advice_text.as_deref().unwrap_or(&existing.advice_text);
    let merged_month = request.month.unwrap_or(existing.month);
    let errors = validate_advice(Some(merged_text), Some(merged_month));
    if !errors.is_empty() {
        return Err(Error::Validation(errors));
    }

    let db_request = AdviceUpdateDBRequest {
        advice_text: request.advice_text,
        month: request.month,
    };
    let updated = repo.update(id, &db_request).await.map_err(|e| match e {
        DbError::NotFound => Error::NotFound {
            message: NO_ADVICE_FOR_ID.to_string(),
        },
        other => Error::Database(other),
    })?;

    Ok((StatusCode::CREATED, Json(AdviceResponse::from(updated))))
}

/// DELETE /advices/{id}
#[instrument(skip(state))]
pub async fn delete_advice(
    State(state): State<AppState>,
    RequiresAdmin(_admin): RequiresAdmin,
    Path(id): Path<AdviceId>,
) -> Result<Json<Value>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let removed = Advices::new(&mut conn).delete(id).await?;

    if !removed {
        return Err(Error::NotFound {
            message: NO_ADVICE_FOR_ID.to_string(),
        });
    }

    Ok(Json(json!({ "message": "Advice deleted successfully" })))
}
