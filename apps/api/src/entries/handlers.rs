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
use crate::entries::store::{self, EntryWrite};
use crate::entries::validate::{is_valid_clock, is_valid_date_key, previous_slot};
use crate::errors::ApiError;
use crate::models::entry::{CreateEntryRequest, UpdateEntryRequest};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct DateQuery {
    pub date: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviousQuery {
    pub date: Option<String>,
    pub start_time: Option<String>,
}

/// GET /api/entries?date=YYYY-MM-DD
/// Historical envelope: the list rides under `entries`, not `data`.
pub async fn list_entries(
    State(state): State<AppState>,
    Query(q): Query<DateQuery>,
) -> Result<Json<Value>, ApiError> {
    let date = q.date.ok_or_else(|| {
        ApiError::Validation("Date query parameter is required (format: YYYY-MM-DD)".to_string())
    })?;
    if !is_valid_date_key(&date) {
        return Err(ApiError::Validation(
            "Invalid date format. Use YYYY-MM-DD".to_string(),
        ));
    }

    let entries = store::list_for_date(&state.db, &date).await?;
    Ok(Json(json!({ "success": true, "entries": entries })))
}

/// POST /api/entries
/// Blank activity + blank thought without the same-as-previous marker is a
/// deliberate no-op: 200 with `data: null`, nothing persisted. A second
/// create for an occupied slot updates the existing row instead of
/// duplicating it.
pub async fn create_entry(
    State(state): State<AppState>,
    Json(body): Json<CreateEntryRequest>,
) -> Result<Response, ApiError> {
    let (Some(date), Some(start_time), Some(end_time)) = (body.date, body.start_time, body.end_time)
    else {
        return Err(ApiError::Validation(
            "Missing required fields: date, startTime, endTime".to_string(),
        ));
    };

    let activity = body.activity.unwrap_or_default();
    let thought = body.thought.unwrap_or_default();
    let is_same_as_previous = body.is_same_as_previous.unwrap_or(false);

    let has_activity = !activity.trim().is_empty();
    let has_thought = !thought.trim().is_empty();
    if !has_activity && !has_thought && !is_same_as_previous {
        return Ok((StatusCode::OK, Json(json!({ "success": true, "data": null }))).into_response());
    }

    if !is_valid_date_key(&date) {
        return Err(ApiError::Validation(
            "Invalid date format. Use YYYY-MM-DD".to_string(),
        ));
    }
    if !is_valid_clock(&start_time) || !is_valid_clock(&end_time) {
        return Err(ApiError::Validation(
            "Invalid time format. Use HH:MM".to_string(),
        ));
    }

    let entry = store::upsert(
        &state.db,
        EntryWrite {
            date: &date,
            start_time: &start_time,
            end_time: &end_time,
            activity: &activity,
            thought: has_thought.then_some(thought.as_str()),
            is_same_as_previous,
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": entry })),
    )
        .into_response())
}

/// GET /api/entries/:id
pub async fn get_entry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    auth::require(&state.db, &headers).await?;

    let entry = store::get(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Time entry not found".to_string()))?;
    Ok(Json(json!({ "success": true, "data": entry })))
}

/// PUT /api/entries/:id
/// Partial update: only provided fields are written. A provided-but-empty
/// thought clears it to NULL.
pub async fn update_entry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(body): Json<UpdateEntryRequest>,
) -> Result<Json<Value>, ApiError> {
    auth::require(&state.db, &headers).await?;

    let existing = store::get(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Time entry not found".to_string()))?;

    let activity = body.activity.unwrap_or(existing.activity);
    let thought = match body.thought {
        Some(t) if !t.is_empty() => Some(t),
        Some(_) => None,
        None => existing.thought,
    };
    let is_same_as_previous = body
        .is_same_as_previous
        .unwrap_or(existing.is_same_as_previous);

    let updated = store::update(
        &state.db,
        id,
        &activity,
        thought.as_deref(),
        is_same_as_previous,
    )
    .await?;

    Ok(Json(json!({ "success": true, "data": updated })))
}

/// DELETE /api/entries/:id
pub async fn delete_entry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    auth::require(&state.db, &headers).await?;

    if !store::delete(&state.db, id).await? {
        return Err(ApiError::NotFound("Time entry not found".to_string()));
    }

    Ok(Json(json!({
        "success": true,
        "data": { "message": "Time entry deleted successfully" },
    })))
}

/// GET /api/entries/previous?date=YYYY-MM-DD&startTime=HH:MM
/// The slot exactly 30 minutes earlier; `data: null` when nothing is there.
pub async fn previous_entry(
    State(state): State<AppState>,
    Query(q): Query<PreviousQuery>,
) -> Result<Json<Value>, ApiError> {
    let (Some(date), Some(start_time)) = (q.date, q.start_time) else {
        return Err(ApiError::Validation(
            "Date and startTime query parameters are required".to_string(),
        ));
    };

    let (prev_date, prev_start) = previous_slot(&date, &start_time).ok_or_else(|| {
        ApiError::Validation("Invalid date or startTime format".to_string())
    })?;

    let entry = store::find_by_slot(&state.db, &prev_date, &prev_start).await?;
    Ok(Json(json!({ "success": true, "data": entry })))
}
