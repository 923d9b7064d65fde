pub mod handlers;

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::warn;

/// Fixed row key for the single settings record.
pub const CONFIG_KEY: &str = "app_config";

pub const DEFAULT_MODEL: &str = "glm-4";

/// The persisted settings aggregate. One JSON blob under one row, but read
/// and written through this typed struct so merge semantics are explicit
/// instead of spread-over-untyped-JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zhipu_api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zhipu_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

/// Shallow-merge patch: provided fields overwrite, omitted fields are
/// preserved. An explicitly provided empty API key clears it; an empty
/// model string is ignored (the row keeps its previous model).
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    pub zhipu_api_key: Option<String>,
    pub zhipu_model: Option<String>,
    pub access_token: Option<String>,
}

impl AppSettings {
    pub fn merge(&mut self, patch: SettingsPatch) {
        if let Some(key) = patch.zhipu_api_key {
            self.zhipu_api_key = Some(key);
        }
        if let Some(model) = patch.zhipu_model.filter(|m| !m.is_empty()) {
            self.zhipu_model = Some(model);
        }
        if let Some(token) = patch.access_token {
            self.access_token = Some(token);
        }
    }

    pub fn model(&self) -> &str {
        self.zhipu_model
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_MODEL)
    }

    pub fn api_key(&self) -> Option<&str> {
        self.zhipu_api_key.as_deref().filter(|k| !k.is_empty())
    }
}

/// Loads the settings row. A missing row or an unreadable blob both yield
/// defaults; bad JSON is logged, not surfaced.
pub async fn load(pool: &PgPool) -> Result<AppSettings, sqlx::Error> {
    let value: Option<String> =
        sqlx::query_scalar("SELECT value FROM app_config WHERE key = $1")
            .bind(CONFIG_KEY)
            .fetch_optional(pool)
            .await?;

    Ok(value
        .and_then(|raw| {
            serde_json::from_str(&raw)
                .map_err(|e| warn!("Unreadable app_config blob, using defaults: {e}"))
                .ok()
        })
        .unwrap_or_default())
}

pub async fn store(pool: &PgPool, settings: &AppSettings) -> Result<(), sqlx::Error> {
    let value = serde_json::to_string(settings).unwrap_or_else(|_| "{}".to_string());
    sqlx::query(
        r#"
        INSERT INTO app_config (key, value) VALUES ($1, $2)
        ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value
        "#,
    )
    .bind(CONFIG_KEY)
    .bind(value)
    .execute(pool)
    .await?;
    Ok(())
}
