use axum::{
    extract::State,
    http::HeaderMap,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::analysis::range::AnalysisRange;
use crate::auth;
use crate::documents;
use crate::entries::{store as entry_store, validate::is_valid_date_key};
use crate::errors::ApiError;
use crate::llm::{AnalysisProvider, ZhipuClient};
use crate::settings;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RangeSummaryRequest {
    pub range: Option<String>,
}

/// Builds the provider client from the persisted settings, or 400 when no
/// key has been configured yet.
async fn provider(state: &AppState) -> Result<ZhipuClient, ApiError> {
    let settings = settings::load(&state.db).await?;
    let api_key = settings.api_key().ok_or_else(|| {
        ApiError::Validation(
            "Zhipu API key not configured. Please configure in settings.".to_string(),
        )
    })?;
    Ok(ZhipuClient::new(
        api_key.to_string(),
        settings.model().to_string(),
    ))
}

/// POST /api/analyze
/// Runs the daily AI analysis over one date's entries. Provider parse
/// failures degrade to the empty analysis inside the client; only
/// transport/API failures reach the error path.
pub async fn analyze_day(
    State(state): State<AppState>,
    Json(body): Json<AnalyzeRequest>,
) -> Result<Json<Value>, ApiError> {
    let date = body
        .date
        .filter(|d| is_valid_date_key(d))
        .ok_or_else(|| ApiError::Validation("Date is required (format: YYYY-MM-DD)".to_string()))?;

    let entries = entry_store::list_for_date(&state.db, &date).await?;
    if entries.is_empty() {
        return Err(ApiError::NotFound(
            "No entries found for this date".to_string(),
        ));
    }

    let analysis = provider(&state)
        .await?
        .analyze_day(&entries)
        .await
        .map_err(|e| ApiError::Provider(e.to_string()))?;

    Ok(Json(json!({ "success": true, "data": analysis })))
}

/// POST /api/analysis-documents/summary
/// Summarizes the saved documents over a closed 30d/365d window ending
/// today (UTC). Unknown range values fall back to 30d.
pub async fn range_summary(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Option<Json<RangeSummaryRequest>>,
) -> Result<Json<Value>, ApiError> {
    auth::require(&state.db, &headers).await?;

    let range = AnalysisRange::parse(
        body.as_ref()
            .and_then(|Json(b)| b.range.as_deref()),
    );
    let (start, end) = range.window(Utc::now().date_naive());

    let docs = documents::store::list_range(&state.db, &start, &end).await?;
    if docs.is_empty() {
        return Err(ApiError::NotFound(
            "No saved documents in range".to_string(),
        ));
    }

    let content = provider(&state)
        .await?
        .summarize_range(&docs, range.label())
        .await
        .map_err(|e| ApiError::Provider(e.to_string()))?;

    Ok(Json(json!({ "success": true, "data": { "content": content } })))
}
