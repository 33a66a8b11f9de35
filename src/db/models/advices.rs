//! Database DTOs for advice entries.

use crate::types::AdviceId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fields persisted when creating an advice. Validation has already run by
/// the time this is constructed.
#[derive(Debug, Clone)]
pub struct AdviceCreateDBRequest {
    pub advice_text: String,
    pub month: i64,
}

/// Partial update: `None` fields keep their stored values.
#[derive(Debug, Clone, Default)]
pub struct AdviceUpdateDBRequest {
    pub advice_text: Option<String>,
    pub month: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdviceDBResponse {
    pub id: AdviceId,
    pub advice_text: String,
    pub month: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
