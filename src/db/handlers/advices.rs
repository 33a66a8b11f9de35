//! Database repository for advice entries.

use crate::types::AdviceId;
use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::advices::{AdviceCreateDBRequest, AdviceDBResponse, AdviceUpdateDBRequest},
};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteConnection};
use tracing::instrument;

/// Filter for listing advices
#[derive(Debug, Clone, Default)]
pub struct AdviceFilter {
    /// Restrict to one calendar month; `None` lists everything
    pub month: Option<i64>,
}

impl AdviceFilter {
    pub fn for_month(month: i64) -> Self {
        Self { month: Some(month) }
    }
}

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct Advice {
    pub id: AdviceId,
    pub advice_text: String,
    pub month: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Advice> for AdviceDBResponse {
    fn from(advice: Advice) -> Self {
        Self {
            id: advice.id,
            advice_text: advice.advice_text,
            month: advice.month,
            created_at: advice.created_at,
            updated_at: advice.updated_at,
        }
    }
}

pub struct Advices<'c> {
    db: &'c mut SqliteConnection,
}

impl<'c> Advices<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Advices<'c> {
    type CreateRequest = AdviceCreateDBRequest;
    type UpdateRequest = AdviceUpdateDBRequest;
    type Response = AdviceDBResponse;
    type Id = AdviceId;
    type Filter = AdviceFilter;

    #[instrument(skip(self, request), fields(month = request.month), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let now = Utc::now();
        let advice = sqlx::query_as::<_, Advice>(
            r#"
            INSERT INTO advices (advice_text, month, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&request.advice_text)
        .bind(request.month)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(AdviceDBResponse::from(advice))
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let advice = sqlx::query_as::<_, Advice>("SELECT * FROM advices WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(advice.map(AdviceDBResponse::from))
    }

    #[instrument(skip(self, filter), fields(month = filter.month), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        // Insertion order keeps listings implementation-stable
        let advices = match filter.month {
            Some(month) => {
                sqlx::query_as::<_, Advice>("SELECT * FROM advices WHERE month = ? ORDER BY id")
                    .bind(month)
                    .fetch_all(&mut *self.db)
                    .await?
            }
            None => {
                sqlx::query_as::<_, Advice>("SELECT * FROM advices ORDER BY id")
                    .fetch_all(&mut *self.db)
                    .await?
            }
        };

        Ok(advices.into_iter().map(AdviceDBResponse::from).collect())
    }

    #[instrument(skip(self, request), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        // Atomic read-modify-write: absent fields keep their stored values
        let advice = sqlx::query_as::<_, Advice>(
            r#"
            UPDATE advices SET
                advice_text = COALESCE(?, advice_text),
                month = COALESCE(?, month),
                updated_at = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&request.advice_text)
        .bind(request.month)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(AdviceDBResponse::from(advice))
    }

    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM advices WHERE id = ?")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::SqlitePool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_advice(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Advices::new(&mut conn);

        let created = repo
            .create(&AdviceCreateDBRequest {
                advice_text: "Sow carrots under cover".to_string(),
                month: 3,
            })
            .await
            .unwrap();

        assert!(created.id > 0);
        assert_eq!(created.advice_text, "Sow carrots under cover");
        assert_eq!(created.month, 3);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_filters_by_month(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Advices::new(&mut conn);

        for (text, month) in [("Prune roses", 2), ("Water daily", 7), ("Mulch beds", 7)] {
            repo.create(&AdviceCreateDBRequest {
                advice_text: text.to_string(),
                month,
            })
            .await
            .unwrap();
        }

        let july = repo.list(&AdviceFilter::for_month(7)).await.unwrap();
        assert_eq!(july.len(), 2);
        assert!(july.iter().all(|a| a.month == 7));

        let all = repo.list(&AdviceFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);

        let empty = repo.list(&AdviceFilter::for_month(11)).await.unwrap();
        assert!(empty.is_empty());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_partial_update_keeps_unspecified_fields(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Advices::new(&mut conn);

        let created = repo
            .create(&AdviceCreateDBRequest {
                advice_text: "A".to_string(),
                month: 3,
            })
            .await
            .unwrap();

        let updated = repo
            .update(
                created.id,
                &AdviceUpdateDBRequest {
                    advice_text: None,
                    month: Some(5),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.advice_text, "A");
        assert_eq!(updated.month, 5);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_missing_id_is_not_found(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Advices::new(&mut conn);

        let result = repo.update(9999, &AdviceUpdateDBRequest::default()).await;
        assert!(matches!(result, Err(DbError::NotFound)));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_delete_twice(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Advices::new(&mut conn);

        let created = repo
            .create(&AdviceCreateDBRequest {
                advice_text: "Plant bulbs".to_string(),
                month: 10,
            })
            .await
            .unwrap();

        assert!(repo.delete(created.id).await.unwrap());
        assert!(!repo.delete(created.id).await.unwrap());
    }
}
