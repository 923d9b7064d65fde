//! HttpEntryApi against a stub server: envelope unwrapping, the `entries`
//! list key, blank-create no-ops, auth headers, and error surfacing.

use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use timeline::{EntryApi, EntryId, EntryPatch, HttpEntryApi, NewEntry};

fn entry_json(id: Uuid, start: &str, end: &str, activity: &str) -> serde_json::Value {
    json!({
        "id": id,
        "date": "2024-01-01",
        "startTime": start,
        "endTime": end,
        "activity": activity,
        "thought": null,
        "isSameAsPrevious": false,
    })
}

#[tokio::test]
async fn fetch_entries_unwraps_entries_key() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();
    Mock::given(method("GET"))
        .and(path("/api/entries"))
        .and(query_param("date", "2024-01-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "entries": [entry_json(id, "09:00", "09:30", "写代码")],
        })))
        .mount(&server)
        .await;

    let api = HttpEntryApi::new(server.uri());
    let entries = api.fetch_entries("2024-01-01").await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].id, EntryId::Persisted(id));
    assert_eq!(entries[0].activity, "写代码");
}

#[tokio::test]
async fn blank_create_is_reported_as_none() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/entries"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": null,
            "message": "No content to save",
        })))
        .mount(&server)
        .await;

    let api = HttpEntryApi::new(server.uri());
    let created = api
        .create_entry(&NewEntry {
            date: "2024-01-01".to_string(),
            start_time: "09:00".to_string(),
            end_time: "09:30".to_string(),
            activity: String::new(),
            thought: None,
            is_same_as_previous: false,
        })
        .await
        .unwrap();
    assert!(created.is_none());
}

#[tokio::test]
async fn create_returns_persisted_row() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();
    Mock::given(method("POST"))
        .and(path("/api/entries"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "success": true,
            "data": entry_json(id, "09:00", "09:30", "写代码"),
        })))
        .mount(&server)
        .await;

    let api = HttpEntryApi::new(server.uri());
    let created = api
        .create_entry(&NewEntry {
            date: "2024-01-01".to_string(),
            start_time: "09:00".to_string(),
            end_time: "09:30".to_string(),
            activity: "写代码".to_string(),
            thought: None,
            is_same_as_previous: false,
        })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(created.id, EntryId::Persisted(id));
}

#[tokio::test]
async fn update_sends_bearer_token() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();
    Mock::given(method("PUT"))
        .and(path(format!("/api/entries/{id}")))
        .and(header("authorization", "Bearer secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": entry_json(id, "09:00", "09:30", "改设计"),
        })))
        .mount(&server)
        .await;

    let api = HttpEntryApi::new(server.uri()).with_token("secret");
    let updated = api
        .update_entry(
            id,
            &EntryPatch {
                activity: Some("改设计".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.activity, "改设计");
}

#[tokio::test]
async fn error_envelope_surfaces_server_message() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();
    Mock::given(method("DELETE"))
        .and(path(format!("/api/entries/{id}")))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "success": false,
            "error": "Time entry not found",
        })))
        .mount(&server)
        .await;

    let api = HttpEntryApi::new(server.uri());
    let err = api.delete_entry(id).await.unwrap_err();
    let message = err.to_string();
    assert!(message.contains("Time entry not found"), "{message}");
    assert!(message.contains("404"), "{message}");
}

#[tokio::test]
async fn previous_entry_handles_empty_slot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/entries/previous"))
        .and(query_param("date", "2024-01-01"))
        .and(query_param("startTime", "09:30"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": null,
        })))
        .mount(&server)
        .await;

    let api = HttpEntryApi::new(server.uri());
    let previous = api.previous_entry("2024-01-01", "09:30").await.unwrap();
    assert!(previous.is_none());
}
