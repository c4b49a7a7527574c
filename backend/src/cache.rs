//! Tag-based read cache
//!
//! Cached read results are stored under a string key and carry a set of
//! tags (business id, entity id). Mutating services call `invalidate` with
//! the affected tags synchronously after commit, before returning to the
//! caller, so no stale entry outlives a successful write.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

struct CacheEntry {
    value: Value,
    tags: HashSet<String>,
}

/// In-process keyed store with tag invalidation
#[derive(Clone, Default)]
pub struct TagCache {
    inner: Arc<RwLock<HashMap<String, CacheEntry>>>,
}

impl TagCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch a cached payload by key
    pub async fn get(&self, key: &str) -> Option<Value> {
        let entries = self.inner.read().await;
        entries.get(key).map(|e| e.value.clone())
    }

    /// Store a payload under a key with its invalidation tags
    pub async fn put(&self, key: impl Into<String>, value: Value, tags: &[String]) {
        let entry = CacheEntry {
            value,
            tags: tags.iter().cloned().collect(),
        };
        let mut entries = self.inner.write().await;
        entries.insert(key.into(), entry);
    }

    /// Drop every entry carrying any of the given tags
    pub async fn invalidate(&self, tags: &[String]) {
        let mut entries = self.inner.write().await;
        entries.retain(|_, entry| !tags.iter().any(|t| entry.tags.contains(t)));
    }

    /// Number of live entries
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

/// Tag covering every cached read for a business
pub fn business_tag(business_id: Uuid) -> String {
    format!("business:{business_id}")
}

/// Tag for reads keyed to one stock record
pub fn stock_record_tag(stock_record_id: Uuid) -> String {
    format!("stock-record:{stock_record_id}")
}

/// Tag for a business's metric reads
pub fn metrics_tag(business_id: Uuid) -> String {
    format!("metrics:{business_id}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_put_get_round_trip() {
        let cache = TagCache::new();
        let biz = Uuid::new_v4();
        cache
            .put("recent", json!({"count": 3}), &[business_tag(biz)])
            .await;
        assert_eq!(cache.get("recent").await, Some(json!({"count": 3})));
    }

    #[tokio::test]
    async fn test_invalidate_by_tag() {
        let cache = TagCache::new();
        let biz = Uuid::new_v4();
        let other = Uuid::new_v4();
        cache.put("a", json!(1), &[business_tag(biz)]).await;
        cache.put("b", json!(2), &[business_tag(other)]).await;

        cache.invalidate(&[business_tag(biz)]).await;

        assert_eq!(cache.get("a").await, None);
        assert_eq!(cache.get("b").await, Some(json!(2)));
    }

    #[tokio::test]
    async fn test_invalidate_any_matching_tag() {
        let cache = TagCache::new();
        let biz = Uuid::new_v4();
        let record = Uuid::new_v4();
        cache
            .put(
                "stock",
                json!([]),
                &[business_tag(biz), stock_record_tag(record)],
            )
            .await;

        cache.invalidate(&[stock_record_tag(record)]).await;
        assert_eq!(cache.len().await, 0);
    }
}
