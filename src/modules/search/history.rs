use std::sync::Arc;

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    api::error,
    configs::{get_json, set_json, KeyValueStore},
    constants::{MAX_SEARCH_HISTORY, SEARCH_HISTORY_PREFIX},
    modules::search::model::{AdvancedFilter, SearchHistoryEntry},
};

/// Per-user recent advanced searches, newest first, kept in a key-value store.
#[derive(Clone)]
pub struct SearchHistory {
    store: Arc<dyn KeyValueStore + Send + Sync>,
    ttl: Option<u64>,
    // read-modify-write of one key must not interleave
    write_lock: Arc<Mutex<()>>,
}

/// Stable id for a set of filters: equal searches collapse onto one entry.
pub fn history_id(filters: &[AdvancedFilter]) -> Uuid {
    let mut parts: Vec<String> = filters
        .iter()
        .filter(|f| f.is_active())
        .map(|f| {
            let f = f.normalized();
            format!("{}\u{1f}{}\u{1f}{}", f.field, f.operator, f.value)
        })
        .collect();
    parts.sort();
    parts.dedup();
    Uuid::new_v5(&Uuid::NAMESPACE_OID, parts.join("\u{1e}").as_bytes())
}

impl SearchHistory {
    pub fn new(store: Arc<dyn KeyValueStore + Send + Sync>, ttl: Option<u64>) -> Self {
        Self { store, ttl, write_lock: Arc::new(Mutex::new(())) }
    }

    fn key(user_key: &str) -> String {
        format!("{SEARCH_HISTORY_PREFIX}{user_key}")
    }

    pub async fn list(&self, user_key: &str) -> Result<Vec<SearchHistoryEntry>, error::SystemError> {
        Ok(get_json(self.store.as_ref(), &Self::key(user_key)).await?.unwrap_or_default())
    }

    /// Records the search unless none of its filters carries a value.
    pub async fn record(
        &self,
        user_key: &str,
        filters: &[AdvancedFilter],
        result_count: usize,
    ) -> Result<Option<SearchHistoryEntry>, error::SystemError> {
        let active: Vec<AdvancedFilter> =
            filters.iter().filter(|f| f.is_active()).map(AdvancedFilter::normalized).collect();
        if active.is_empty() {
            return Ok(None);
        }

        let entry = SearchHistoryEntry {
            id: history_id(&active),
            filters: active,
            timestamp: chrono::Utc::now(),
            result_count,
        };

        let _guard = self.write_lock.lock().await;
        let mut entries = self.list(user_key).await?;
        entries.retain(|e| e.id != entry.id);
        entries.insert(0, entry.clone());
        entries.truncate(MAX_SEARCH_HISTORY);

        set_json(self.store.as_ref(), &Self::key(user_key), &entries, self.ttl).await?;
        Ok(Some(entry))
    }

    pub async fn clear(&self, user_key: &str) -> Result<(), error::SystemError> {
        let _guard = self.write_lock.lock().await;
        self.store.delete(&Self::key(user_key)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configs::MemoryCache;

    fn history() -> SearchHistory {
        SearchHistory::new(Arc::new(MemoryCache::new()), None)
    }

    #[tokio::test]
    async fn repeated_search_moves_to_front() {
        let history = history();
        let logo = vec![AdvancedFilter::new("name", "contains", "logo")];
        let big = vec![AdvancedFilter::new("size", "greater", "1000")];

        history.record("alice", &logo, 3).await.unwrap();
        history.record("alice", &big, 1).await.unwrap();
        history
            .record("alice", &[AdvancedFilter::new(" name ", "Contains", " logo ")], 4)
            .await
            .unwrap();

        let entries = history.list("alice").await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, history_id(&logo));
        assert_eq!(entries[0].result_count, 4);
        assert!(history.list("bob").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn blank_searches_are_not_recorded() {
        let history = history();
        let recorded = history
            .record("alice", &[AdvancedFilter::new("name", "contains", "  ")], 9)
            .await
            .unwrap();
        assert!(recorded.is_none());
        assert!(history.list("alice").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn history_is_capped_and_clearable() {
        let history = history();
        for i in 0..(MAX_SEARCH_HISTORY + 3) {
            let filters = vec![AdvancedFilter::new("size", "greater", &i.to_string())];
            history.record("alice", &filters, i).await.unwrap();
        }

        let entries = history.list("alice").await.unwrap();
        assert_eq!(entries.len(), MAX_SEARCH_HISTORY);
        assert_eq!(entries[0].result_count, MAX_SEARCH_HISTORY + 2);

        history.clear("alice").await.unwrap();
        assert!(history.list("alice").await.unwrap().is_empty());
    }
}
