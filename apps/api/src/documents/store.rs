use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::document::SavedNoteRow;

/// Discriminator for analysis documents; the only document type today.
pub const DOC_TYPE: &str = "analysis";

/// List filters for GET /api/analysis-documents. `date` wins over the
/// from/to pair; `q` matches content (case-insensitive) or source date.
#[derive(Debug, Default)]
pub struct DocumentFilter {
    pub date: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub q: Option<String>,
    pub page: i64,
    pub page_size: i64,
}

fn push_filters<'a>(builder: &mut QueryBuilder<'a, Postgres>, filter: &'a DocumentFilter) {
    builder.push(" WHERE type = ").push_bind(DOC_TYPE);

    if let Some(date) = &filter.date {
        builder.push(" AND source_date = ").push_bind(date);
    } else {
        if let Some(from) = &filter.from {
            builder.push(" AND source_date >= ").push_bind(from);
        }
        if let Some(to) = &filter.to {
            builder.push(" AND source_date <= ").push_bind(to);
        }
    }

    if let Some(q) = &filter.q {
        builder
            .push(" AND (content ILIKE '%' || ")
            .push_bind(q)
            .push(" || '%' OR source_date LIKE '%' || ")
            .push_bind(q)
            .push(" || '%')");
    }
}

/// Returns `(total, page_of_documents)`, newest first.
pub async fn list(
    pool: &PgPool,
    filter: &DocumentFilter,
) -> Result<(i64, Vec<SavedNoteRow>), sqlx::Error> {
    let mut count_query: QueryBuilder<Postgres> =
        QueryBuilder::new("SELECT COUNT(*) FROM saved_notes");
    push_filters(&mut count_query, filter);
    let total: i64 = count_query.build_query_scalar().fetch_one(pool).await?;

    let mut select_query: QueryBuilder<Postgres> =
        QueryBuilder::new("SELECT id, content, source_date, created_at FROM saved_notes");
    push_filters(&mut select_query, filter);
    select_query
        .push(" ORDER BY created_at DESC LIMIT ")
        .push_bind(filter.page_size)
        .push(" OFFSET ")
        .push_bind((filter.page - 1) * filter.page_size);
    let docs = select_query
        .build_query_as::<SavedNoteRow>()
        .fetch_all(pool)
        .await?;

    Ok((total, docs))
}

pub async fn insert(
    pool: &PgPool,
    source_date: &str,
    content: &str,
) -> Result<SavedNoteRow, sqlx::Error> {
    sqlx::query_as::<_, SavedNoteRow>(
        r#"
        INSERT INTO saved_notes (id, content, source_date, type)
        VALUES ($1, $2, $3, $4)
        RETURNING id, content, source_date, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(content)
    .bind(source_date)
    .bind(DOC_TYPE)
    .fetch_one(pool)
    .await
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM saved_notes WHERE id = $1 AND type = $2")
        .bind(id)
        .bind(DOC_TYPE)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// `(source_date, content)` pairs inside an inclusive date window, oldest
/// first, as the input for range summaries.
pub async fn list_range(
    pool: &PgPool,
    start: &str,
    end: &str,
) -> Result<Vec<(String, String)>, sqlx::Error> {
    let rows: Vec<(Option<String>, String)> = sqlx::query_as(
        r#"
        SELECT source_date, content FROM saved_notes
        WHERE type = $1 AND source_date >= $2 AND source_date <= $3
        ORDER BY source_date ASC
        "#,
    )
    .bind(DOC_TYPE)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(date, content)| (date.unwrap_or_default(), content))
        .collect())
}
