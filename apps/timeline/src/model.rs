use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Entry identity on the client. Optimistic local entries carry a
/// synthesized key until the server responds; reconciliation can
/// pattern-match on this instead of sniffing string prefixes.
///
/// Untagged on the wire: server rows always deserialize as `Persisted`
/// (valid UUIDs), anything else falls through to `Local`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntryId {
    Persisted(Uuid),
    Local(String),
}

impl EntryId {
    /// Placeholder id for an optimistic entry that has not been persisted.
    pub fn local(date: &str, start_time: &str) -> Self {
        EntryId::Local(format!("local-{date}-{start_time}"))
    }

    pub fn persisted(&self) -> Option<Uuid> {
        match self {
            EntryId::Persisted(id) => Some(*id),
            EntryId::Local(_) => None,
        }
    }
}

/// A user-authored record attached to one slot. `(date, start_time)` is the
/// logical identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntry {
    pub id: EntryId,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub activity: String,
    #[serde(default)]
    pub thought: Option<String>,
    #[serde(default)]
    pub is_same_as_previous: bool,
}

impl TimeEntry {
    pub fn has_content(&self) -> bool {
        !self.activity.trim().is_empty()
            || self
                .thought
                .as_deref()
                .is_some_and(|t| !t.trim().is_empty())
    }
}

/// Create body for POST /api/entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEntry {
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub activity: String,
    pub thought: Option<String>,
    pub is_same_as_previous: bool,
}

/// Partial update body for PUT /api/entries/:id.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thought: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_same_as_previous: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_id_wire_round_trip() {
        let id = Uuid::new_v4();
        let parsed: EntryId = serde_json::from_str(&format!("\"{id}\"")).unwrap();
        assert_eq!(parsed, EntryId::Persisted(id));

        let local: EntryId = serde_json::from_str("\"local-2024-01-01-09:00\"").unwrap();
        assert_eq!(local, EntryId::local("2024-01-01", "09:00"));
    }

    #[test]
    fn test_has_content_ignores_whitespace() {
        let mut entry = TimeEntry {
            id: EntryId::local("2024-01-01", "09:00"),
            date: "2024-01-01".to_string(),
            start_time: "09:00".to_string(),
            end_time: "09:30".to_string(),
            activity: "  ".to_string(),
            thought: Some(" ".to_string()),
            is_same_as_previous: false,
        };
        assert!(!entry.has_content());
        entry.thought = Some("想法".to_string());
        assert!(entry.has_content());
    }
}
