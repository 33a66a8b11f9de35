//! API request/response models for advice entries.

use crate::db::models::advices::AdviceDBResponse;
use crate::types::AdviceId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Advice request models. Fields are optional at the deserialization boundary
// so missing fields surface as validation errors, not a rejected body.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AdviceCreate {
    pub advice_text: Option<String>,
    pub month: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AdviceUpdate {
    pub advice_text: Option<String>,
    pub month: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdviceResponse {
    pub id: AdviceId,
    pub advice_text: String,
    pub month: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<AdviceDBResponse> for AdviceResponse {
    fn from(db: AdviceDBResponse) -> Self {
        Self {
            id: db.id,
            advice_text: db.advice_text,
            month: db.month,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}
