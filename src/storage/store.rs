use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::core::{CapturedEntry, OutboxError, Result};

/// The single source of truth for captured entries awaiting disposition.
///
/// All access paths (capture insert, manage lookup/remove, sweeper scan,
/// inspection snapshot) go through the one lock; nobody holds it across
/// outbound I/O.
#[derive(Default)]
pub struct EntryStore {
    entries: RwLock<HashMap<Uuid, Arc<CapturedEntry>>>,
}

impl EntryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a freshly captured entry. Ids are minted at capture time
    /// and never reused; a duplicate is a bug, not a caller error.
    pub async fn insert(&self, entry: CapturedEntry) -> Result<Arc<CapturedEntry>> {
        let entry = Arc::new(entry);
        let mut entries = self.entries.write().await;
        if entries.contains_key(&entry.id) {
            return Err(OutboxError::DuplicateId(entry.id));
        }
        entries.insert(entry.id, Arc::clone(&entry));
        Ok(entry)
    }

    pub async fn get(&self, id: &Uuid) -> Option<Arc<CapturedEntry>> {
        self.entries.read().await.get(id).cloned()
    }

    /// Remove by id. Idempotent: removing an absent id is a no-op.
    pub async fn remove(&self, id: &Uuid) -> Option<Arc<CapturedEntry>> {
        self.entries.write().await.remove(id)
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Consistent point-in-time copy of the current entries, unordered.
    pub async fn snapshot(&self) -> Vec<Arc<CapturedEntry>> {
        self.entries.read().await.values().cloned().collect()
    }

    /// Remove every entry captured before `threshold`; returns the
    /// evicted ids.
    pub async fn evict_older_than(&self, threshold: DateTime<Utc>) -> Vec<Uuid> {
        let mut entries = self.entries.write().await;
        let expired: Vec<Uuid> = entries
            .values()
            .filter(|entry| entry.captured_on < threshold)
            .map(|entry| entry.id)
            .collect();
        for id in &expired {
            entries.remove(id);
        }
        expired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Payload;
    use std::collections::BTreeMap;

    fn entry(target: &str) -> CapturedEntry {
        CapturedEntry::new(
            "POST".into(),
            target.into(),
            BTreeMap::new(),
            Payload::Empty,
        )
    }

    #[tokio::test]
    async fn insert_then_get_then_remove() {
        let store = EntryStore::new();
        let inserted = store.insert(entry("http://example.test")).await.unwrap();

        let found = store.get(&inserted.id).await.unwrap();
        assert_eq!(found.target_url, "http://example.test");

        assert!(store.remove(&inserted.id).await.is_some());
        assert!(store.get(&inserted.id).await.is_none());
        // removing again is a no-op
        assert!(store.remove(&inserted.id).await.is_none());
    }

    #[tokio::test]
    async fn duplicate_id_is_rejected() {
        let store = EntryStore::new();
        let first = store.insert(entry("http://example.test")).await.unwrap();

        let mut duplicate = entry("http://example.test/other");
        duplicate.id = first.id;
        assert!(matches!(
            store.insert(duplicate).await,
            Err(OutboxError::DuplicateId(_))
        ));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn evicts_only_entries_past_threshold() {
        let store = EntryStore::new();
        let mut old = entry("http://example.test/old");
        old.captured_on = Utc::now() - chrono::Duration::seconds(600);
        let old = store.insert(old).await.unwrap();
        let fresh = store.insert(entry("http://example.test/fresh")).await.unwrap();

        let evicted = store
            .evict_older_than(Utc::now() - chrono::Duration::seconds(300))
            .await;

        assert_eq!(evicted, vec![old.id]);
        assert!(store.get(&fresh.id).await.is_some());
        assert_eq!(store.len().await, 1);
    }
}
