//! In-process result cache.
//!
//! Values are held as JSON so the memory backend exercises the same
//! serialization path as the remote store.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;

use super::{CacheError, CacheKey, ResultCache};
use crate::types::ProbabilityRecord;

#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<BTreeMap<String, String>>,
    writes: AtomicUsize,
    unavailable: AtomicBool,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `set` calls so far.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Make every operation fail with `CacheError::Unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), CacheError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(CacheError::Unavailable)
        } else {
            Ok(())
        }
    }
}

impl ResultCache for MemoryCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<ProbabilityRecord>, CacheError> {
        self.check()?;
        let raw = self.entries.lock().get(key.as_str()).cloned();
        match raw {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &CacheKey, record: &ProbabilityRecord) -> Result<(), CacheError> {
        self.check()?;
        let raw = serde_json::to_string(record)?;
        self.entries.lock().insert(key.as_str().to_string(), raw);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn keys(&self, prefix: &str) -> Result<Vec<String>, CacheError> {
        self.check()?;
        Ok(self
            .entries
            .lock()
            .range(prefix.to_string()..)
            .map(|(k, _)| k)
            .take_while(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn del(&self, key: &str) -> Result<(), CacheError> {
        self.check()?;
        self.entries.lock().remove(key);
        Ok(())
    }

    async fn put_raw(&self, key: &str, value: &str) -> Result<(), CacheError> {
        self.check()?;
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Rationale, Scenario};

    #[tokio::test]
    async fn test_set_get_and_counts() {
        let cache = MemoryCache::new();
        let key = CacheKey::for_scenario(&Scenario::new("the hypothesis", "the evidence"));
        let record = ProbabilityRecord::new(0.3, 0.8, 0.1, Rationale::default()).unwrap();

        assert!(cache.get(&key).await.unwrap().is_none());
        cache.set(&key, &record).await.unwrap();
        assert_eq!(cache.get(&key).await.unwrap(), Some(record));
        assert_eq!(cache.writes(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_unavailable() {
        let cache = MemoryCache::new();
        cache.set_unavailable(true);
        assert!(matches!(cache.keys("").await, Err(CacheError::Unavailable)));
        cache.set_unavailable(false);
        assert!(cache.keys("").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_keys_by_prefix() {
        let cache = MemoryCache::new();
        cache.put_raw("heartbeat", "1").await.unwrap();
        cache.put_raw("probability:a|b", "{}").await.unwrap();
        cache.put_raw("probability:c|d", "{}").await.unwrap();
        assert_eq!(
            cache.keys("probability:").await.unwrap(),
            vec!["probability:a|b".to_string(), "probability:c|d".to_string()]
        );
    }
}
