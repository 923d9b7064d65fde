use sqlx::PgPool;
use uuid::Uuid;

use crate::models::entry::TimeEntryRow;

/// Fields written by an upsert. The `(date, start_time)` pair is the
/// logical identity; a second create for an occupied slot updates in place.
pub struct EntryWrite<'a> {
    pub date: &'a str,
    pub start_time: &'a str,
    pub end_time: &'a str,
    pub activity: &'a str,
    pub thought: Option<&'a str>,
    pub is_same_as_previous: bool,
}

pub async fn list_for_date(pool: &PgPool, date: &str) -> Result<Vec<TimeEntryRow>, sqlx::Error> {
    sqlx::query_as::<_, TimeEntryRow>(
        "SELECT * FROM time_entries WHERE date = $1 ORDER BY start_time ASC",
    )
    .bind(date)
    .fetch_all(pool)
    .await
}

pub async fn get(pool: &PgPool, id: Uuid) -> Result<Option<TimeEntryRow>, sqlx::Error> {
    sqlx::query_as::<_, TimeEntryRow>("SELECT * FROM time_entries WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_slot(
    pool: &PgPool,
    date: &str,
    start_time: &str,
) -> Result<Option<TimeEntryRow>, sqlx::Error> {
    sqlx::query_as::<_, TimeEntryRow>(
        "SELECT * FROM time_entries WHERE date = $1 AND start_time = $2",
    )
    .bind(date)
    .bind(start_time)
    .fetch_optional(pool)
    .await
}

pub async fn upsert(pool: &PgPool, write: EntryWrite<'_>) -> Result<TimeEntryRow, sqlx::Error> {
    sqlx::query_as::<_, TimeEntryRow>(
        r#"
        INSERT INTO time_entries (id, date, start_time, end_time, activity, thought, is_same_as_previous)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (date, start_time) DO UPDATE
            SET activity = EXCLUDED.activity,
                thought = EXCLUDED.thought,
                is_same_as_previous = EXCLUDED.is_same_as_previous,
                updated_at = now()
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(write.date)
    .bind(write.start_time)
    .bind(write.end_time)
    .bind(write.activity)
    .bind(write.thought)
    .bind(write.is_same_as_previous)
    .fetch_one(pool)
    .await
}

/// Writes the full mutable field set. Callers resolve partial-update
/// semantics against the existing row before calling.
pub async fn update(
    pool: &PgPool,
    id: Uuid,
    activity: &str,
    thought: Option<&str>,
    is_same_as_previous: bool,
) -> Result<TimeEntryRow, sqlx::Error> {
    sqlx::query_as::<_, TimeEntryRow>(
        r#"
        UPDATE time_entries
        SET activity = $2, thought = $3, is_same_as_previous = $4, updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(activity)
    .bind(thought)
    .bind(is_same_as_previous)
    .fetch_one(pool)
    .await
}

/// Returns true when a row was actually deleted.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM time_entries WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
