//! Administrative operations over a result cache.
//!
//! Unlike the estimator, these surface cache errors to the caller.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{CacheError, CacheKey, ResultCache, HEARTBEAT_KEY, KEY_PREFIX};
use crate::types::Scenario;

/// Every scenario with a cached result, sorted and deduplicated.
pub async fn list_scenarios<C: ResultCache>(cache: &C) -> Result<Vec<Scenario>, CacheError> {
    let keys = cache.keys(KEY_PREFIX).await?;
    let mut scenarios: Vec<Scenario> = keys
        .iter()
        .filter_map(|key| {
            let parsed = CacheKey::parse(key);
            if parsed.is_none() {
                debug!("Skipping unparseable cache key {:?}", key);
            }
            parsed
        })
        .collect();
    scenarios.sort();
    scenarios.dedup();
    Ok(scenarios)
}

/// Delete every cached result. Returns the number of keys removed.
pub async fn flush<C: ResultCache>(cache: &C) -> Result<usize, CacheError> {
    info!("Flushing cache...");
    let keys = cache.keys(KEY_PREFIX).await?;
    for key in &keys {
        cache.del(key).await?;
    }
    info!("Cache flushed ({} keys)", keys.len());
    Ok(keys.len())
}

/// Write the current unix timestamp under the heartbeat key.
pub async fn heartbeat<C: ResultCache>(cache: &C) -> Result<u64, CacheError> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    cache.put_raw(HEARTBEAT_KEY, &now.to_string()).await?;
    debug!("Heartbeat written at {}", now);
    Ok(now)
}

/// Background task writing a heartbeat every `interval`, starting immediately.
///
/// Failures are logged and the loop continues. Intervals under a second
/// are raised to one second.
pub fn spawn_heartbeat<C>(cache: Arc<C>, interval: Duration) -> JoinHandle<()>
where
    C: ResultCache + 'static,
{
    let interval = interval.max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            if let Err(e) = heartbeat(cache.as_ref()).await {
                warn!("Heartbeat failed: {}", e);
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::types::{ProbabilityRecord, Rationale};

    async fn seeded() -> MemoryCache {
        let cache = MemoryCache::new();
        let record = ProbabilityRecord::new(0.3, 0.8, 0.1, Rationale::default()).unwrap();
        for (h, e) in [
            ("Steve is a librarian", "Steve is shy and tidy"),
            ("Election fraud occurred.", "Bob won narrowly"),
        ] {
            cache
                .set(&CacheKey::for_scenario(&Scenario::new(h, e)), &record)
                .await
                .unwrap();
        }
        cache
    }

    #[tokio::test]
    async fn test_list_scenarios_sorted() {
        let cache = seeded().await;
        cache.put_raw("probability:no delimiter", "{}").await.unwrap();

        let scenarios = list_scenarios(&cache).await.unwrap();
        assert_eq!(scenarios.len(), 2);
        assert_eq!(scenarios[0].hypothesis, "Election fraud occurred.");
        assert_eq!(scenarios[1].evidence, "Steve is shy and tidy");
    }

    #[tokio::test]
    async fn test_flush_removes_only_prefixed_keys() {
        let cache = seeded().await;
        heartbeat(&cache).await.unwrap();

        assert_eq!(flush(&cache).await.unwrap(), 2);
        assert!(list_scenarios(&cache).await.unwrap().is_empty());
        assert_eq!(cache.keys(HEARTBEAT_KEY).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_errors_surface() {
        let cache = MemoryCache::new();
        cache.set_unavailable(true);
        assert!(flush(&cache).await.is_err());
        assert!(heartbeat(&cache).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawn_heartbeat_ticks() {
        let cache = Arc::new(MemoryCache::new());
        let handle = spawn_heartbeat(cache.clone(), Duration::from_secs(60));

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(cache.keys(HEARTBEAT_KEY).await.unwrap().len(), 1);

        handle.abort();
    }
}
