use axum::{extract::State, http::HeaderMap, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::PgPool;

use crate::errors::ApiError;
use crate::settings;
use crate::state::AppState;

/// Pulls the caller's token from `Authorization: Bearer <t>` or the
/// `x-app-token` fallback header.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(auth) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
        if let Some(token) = auth.strip_prefix("Bearer ") {
            let token = token.trim();
            if !token.is_empty() {
                return Some(token.to_string());
            }
        }
    }
    headers
        .get("x-app-token")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Single shared-secret gate. When no access token is configured the
/// instance runs open (bootstrap mode); otherwise the request token must
/// match exactly.
pub async fn require(pool: &PgPool, headers: &HeaderMap) -> Result<(), ApiError> {
    let stored = settings::load(pool).await?.access_token;
    let Some(stored) = stored.filter(|t| !t.is_empty()) else {
        return Ok(());
    };

    match extract_token(headers) {
        Some(token) if token == stored => Ok(()),
        _ => Err(ApiError::Unauthorized),
    }
}

#[derive(Deserialize)]
pub struct VerifyBody {
    pub token: Option<String>,
}

/// POST /api/auth/verify
/// Accepts the token from the auth headers or the JSON body; body parse
/// errors are ignored rather than rejected.
pub async fn verify_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Option<Json<VerifyBody>>,
) -> Result<Json<Value>, ApiError> {
    let stored = settings::load(&state.db).await?.access_token;
    let Some(stored) = stored.filter(|t| !t.is_empty()) else {
        return Ok(Json(json!({ "success": true })));
    };

    let token = extract_token(&headers).or(body.and_then(|Json(b)| b.token));
    match token {
        Some(token) if token == stored => Ok(Json(json!({ "success": true }))),
        _ => Err(ApiError::Unauthorized),
    }
}
