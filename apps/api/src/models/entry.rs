use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One persisted half-hour record. At most one row exists per
/// `(date, start_time)`; the store upserts on that key.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntryRow {
    pub id: Uuid,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub activity: String,
    pub thought: Option<String>,
    pub is_same_as_previous: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEntryRequest {
    pub date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    #[serde(default)]
    pub activity: Option<String>,
    #[serde(default)]
    pub thought: Option<String>,
    #[serde(default)]
    pub is_same_as_previous: Option<bool>,
}

/// Partial update body for PUT /api/entries/:id. Only provided fields are
/// written; `thought` distinguishes "omitted" from "set to null" by
/// normalizing empty strings to NULL, matching the create path.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEntryRequest {
    pub activity: Option<String>,
    pub thought: Option<String>,
    pub is_same_as_previous: Option<bool>,
}
