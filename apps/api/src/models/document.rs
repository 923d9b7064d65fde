use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A saved AI analysis document. Created by an explicit user action after
/// an analysis run, deleted explicitly, never mutated.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SavedNoteRow {
    pub id: Uuid,
    pub content: String,
    pub source_date: Option<String>,
    pub created_at: DateTime<Utc>,
}
