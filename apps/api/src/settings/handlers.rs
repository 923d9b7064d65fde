use axum::{extract::State, http::HeaderMap, Json};
use serde_json::{json, Value};

use crate::auth;
use crate::errors::ApiError;
use crate::settings::{self, SettingsPatch, DEFAULT_MODEL};
use crate::state::AppState;

/// Replaces every character of the key with an asterisk so the client can
/// show "something is set" without ever seeing the value.
pub fn mask_key(key: &str) -> String {
    "*".repeat(key.chars().count())
}

/// GET /api/config
/// The access token never leaves the server; the API key is masked and a
/// boolean flag distinguishes "unset" from "set but hidden".
pub async fn get_config(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    auth::require(&state.db, &headers).await?;

    let settings = settings::load(&state.db).await?;
    let key = settings.zhipu_api_key.as_deref().unwrap_or("");

    Ok(Json(json!({
        "success": true,
        "config": {
            "zhipuModel": settings.model(),
            "zhipuApiKey": mask_key(key),
            "zhipuApiKeyMasked": !key.is_empty(),
        },
    })))
}

/// POST /api/config
/// Read-modify-write with shallow merge: omitted fields keep their stored
/// values. The default model falls back to glm-4 on first save.
pub async fn save_config(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(patch): Json<SettingsPatch>,
) -> Result<Json<Value>, ApiError> {
    auth::require(&state.db, &headers).await?;

    let mut settings = settings::load(&state.db).await?;
    settings.merge(patch);
    if settings.zhipu_model.is_none() {
        settings.zhipu_model = Some(DEFAULT_MODEL.to_string());
    }
    settings::store(&state.db, &settings).await?;

    Ok(Json(json!({ "success": true })))
}
