//! HTTP client for the entries API. Responses arrive wrapped in the
//! `{"success": ..., "data" | "entries" | "error": ...}` envelope; this
//! module unwraps it and surfaces server-side failures as `ClientError`.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use uuid::Uuid;

use crate::model::{EntryPatch, NewEntry, TimeEntry};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server rejected request ({status}): {message}")]
    Api { status: StatusCode, message: String },
}

/// The entry operations the session needs. Mocked in tests; `HttpEntryApi`
/// is the real implementation.
#[async_trait]
pub trait EntryApi: Send + Sync {
    async fn fetch_entries(&self, date: &str) -> Result<Vec<TimeEntry>, ClientError>;

    /// Returns `None` when the server treats the create as a blank no-op.
    async fn create_entry(&self, entry: &NewEntry) -> Result<Option<TimeEntry>, ClientError>;

    async fn update_entry(&self, id: Uuid, patch: &EntryPatch) -> Result<TimeEntry, ClientError>;

    async fn delete_entry(&self, id: Uuid) -> Result<(), ClientError>;

    async fn previous_entry(
        &self,
        date: &str,
        start_time: &str,
    ) -> Result<Option<TimeEntry>, ClientError>;
}

#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    #[serde(default = "default_success")]
    success: bool,
    data: Option<T>,
    error: Option<String>,
}

// The list endpoint uses its own key.
#[derive(Debug, Deserialize)]
struct EntriesEnvelope {
    #[serde(default = "default_success")]
    success: bool,
    #[serde(default)]
    entries: Vec<TimeEntry>,
    error: Option<String>,
}

fn default_success() -> bool {
    false
}

#[derive(Debug, Clone)]
pub struct HttpEntryApi {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpEntryApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.token = (!token.trim().is_empty()).then_some(token);
        self
    }

    fn authed(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn read_data<T: for<'de> Deserialize<'de>>(
        &self,
        req: RequestBuilder,
    ) -> Result<Option<T>, ClientError> {
        let response = req.send().await?;
        let status = response.status();
        let envelope: DataEnvelope<T> = response.json().await?;
        if !envelope.success {
            return Err(ClientError::Api {
                status,
                message: envelope
                    .error
                    .unwrap_or_else(|| "unknown server error".to_string()),
            });
        }
        Ok(envelope.data)
    }
}

#[async_trait]
impl EntryApi for HttpEntryApi {
    async fn fetch_entries(&self, date: &str) -> Result<Vec<TimeEntry>, ClientError> {
        let req = self
            .http
            .get(self.url("/api/entries"))
            .query(&[("date", date)]);
        let response = req.send().await?;
        let status = response.status();
        let envelope: EntriesEnvelope = response.json().await?;
        if !envelope.success {
            return Err(ClientError::Api {
                status,
                message: envelope
                    .error
                    .unwrap_or_else(|| "unknown server error".to_string()),
            });
        }
        Ok(envelope.entries)
    }

    async fn create_entry(&self, entry: &NewEntry) -> Result<Option<TimeEntry>, ClientError> {
        let req = self.http.post(self.url("/api/entries")).json(entry);
        self.read_data(req).await
    }

    async fn update_entry(&self, id: Uuid, patch: &EntryPatch) -> Result<TimeEntry, ClientError> {
        let req = self
            .http
            .put(self.url(&format!("/api/entries/{id}")))
            .json(patch);
        let req = self.authed(req);
        let data: Option<TimeEntry> = self.read_data(req).await?;
        data.ok_or(ClientError::Api {
            status: StatusCode::OK,
            message: "update returned no entry".to_string(),
        })
    }

    async fn delete_entry(&self, id: Uuid) -> Result<(), ClientError> {
        let req = self.http.delete(self.url(&format!("/api/entries/{id}")));
        let req = self.authed(req);
        let _: Option<serde_json::Value> = self.read_data(req).await?;
        Ok(())
    }

    async fn previous_entry(
        &self,
        date: &str,
        start_time: &str,
    ) -> Result<Option<TimeEntry>, ClientError> {
        let req = self
            .http
            .get(self.url("/api/entries/previous"))
            .query(&[("date", date), ("startTime", start_time)]);
        self.read_data(req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let api = HttpEntryApi::new("http://localhost:3000/");
        assert_eq!(api.url("/api/entries"), "http://localhost:3000/api/entries");
    }

    #[test]
    fn test_blank_token_ignored() {
        let api = HttpEntryApi::new("http://localhost:3000").with_token("  ");
        assert!(api.token.is_none());
        let api = HttpEntryApi::new("http://localhost:3000").with_token("secret");
        assert_eq!(api.token.as_deref(), Some("secret"));
    }
}
