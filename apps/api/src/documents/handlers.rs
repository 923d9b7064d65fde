use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth;
use crate::documents::store::{self, DocumentFilter};
use crate::entries::validate::is_valid_date_key;
use crate::errors::ApiError;
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: i64 = 20;
const MAX_PAGE_SIZE: i64 = 50;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDocumentsQuery {
    pub date: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub q: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SaveDocumentRequest {
    pub date: Option<String>,
    pub content: Option<String>,
}

/// GET /api/analysis-documents
pub async fn list_documents(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(q): Query<ListDocumentsQuery>,
) -> Result<Json<Value>, ApiError> {
    auth::require(&state.db, &headers).await?;

    for (value, label) in [(&q.date, "date"), (&q.from, "from"), (&q.to, "to")] {
        if let Some(value) = value {
            if !is_valid_date_key(value) {
                return Err(ApiError::Validation(format!(
                    "Invalid {label} date format. Use YYYY-MM-DD"
                )));
            }
        }
    }

    let filter = DocumentFilter {
        date: q.date,
        from: q.from,
        to: q.to,
        q: q.q.filter(|s| !s.is_empty()),
        page: q.page.unwrap_or(1).max(1),
        page_size: q
            .page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE),
    };

    let (total, docs) = store::list(&state.db, &filter).await?;
    Ok(Json(json!({
        "success": true,
        "data": docs,
        "meta": { "total": total, "page": filter.page, "pageSize": filter.page_size },
    })))
}

/// POST /api/analysis-documents
pub async fn save_document(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<SaveDocumentRequest>,
) -> Result<Response, ApiError> {
    auth::require(&state.db, &headers).await?;

    let date = body
        .date
        .filter(|d| is_valid_date_key(d))
        .ok_or_else(|| ApiError::Validation("Date is required (format: YYYY-MM-DD)".to_string()))?;
    let content = body
        .content
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| ApiError::Validation("Content is required".to_string()))?;

    let doc = store::insert(&state.db, &date, &content).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": doc })),
    )
        .into_response())
}

/// DELETE /api/analysis-documents/:id
pub async fn delete_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    auth::require(&state.db, &headers).await?;

    if !store::delete(&state.db, id).await? {
        return Err(ApiError::NotFound("Document not found".to_string()));
    }
    Ok(Json(json!({ "success": true })))
}
