//! Per-date entry cache. The session reads the cache before the network so
//! a previously viewed day renders immediately, then refreshes it with
//! whatever the server returns.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::model::TimeEntry;

#[async_trait]
pub trait EntryCache: Send + Sync {
    async fn load(&self, date: &str) -> Option<Vec<TimeEntry>>;
    async fn store(&self, date: &str, entries: Vec<TimeEntry>);
    async fn invalidate(&self, date: &str);
}

/// In-memory cache keyed by date. Good for a single process lifetime;
/// nothing is persisted across restarts.
#[derive(Debug, Default)]
pub struct MemoryEntryCache {
    days: RwLock<HashMap<String, Vec<TimeEntry>>>,
}

impl MemoryEntryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EntryCache for MemoryEntryCache {
    async fn load(&self, date: &str) -> Option<Vec<TimeEntry>> {
        self.days.read().await.get(date).cloned()
    }

    async fn store(&self, date: &str, entries: Vec<TimeEntry>) {
        self.days.write().await.insert(date.to_string(), entries);
    }

    async fn invalidate(&self, date: &str) {
        self.days.write().await.remove(date);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EntryId;

    fn entry(start: &str) -> TimeEntry {
        TimeEntry {
            id: EntryId::local("2024-01-01", start),
            date: "2024-01-01".to_string(),
            start_time: start.to_string(),
            end_time: "09:30".to_string(),
            activity: "写代码".to_string(),
            thought: None,
            is_same_as_previous: false,
        }
    }

    #[tokio::test]
    async fn test_store_load_invalidate() {
        let cache = MemoryEntryCache::new();
        assert!(cache.load("2024-01-01").await.is_none());

        cache.store("2024-01-01", vec![entry("09:00")]).await;
        let loaded = cache.load("2024-01-01").await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(cache.load("2024-01-02").await.is_none());

        cache.invalidate("2024-01-01").await;
        assert!(cache.load("2024-01-01").await.is_none());
    }
}
