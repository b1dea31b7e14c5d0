//! Persistent local result cache using redb.
//!
//! Cache structure:
//! - Database: .bayesgpt.cache/probabilities.redb (redb provides ACID guarantees)
//! - `probabilities` table: cache key -> bincode-serialized `CacheEntry`
//! - `meta` table: opaque string values (heartbeat timestamp)
//!
//! Design decisions:
//! - Bincode for compact binary serialization of records
//! - Store timestamp kept in the value, no separate metadata table per key
//! - Both tables are created on open, so reads never see a missing table

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use redb::{Database, ReadableTable, ReadableTableMetadata, TableDefinition};
use serde::{Deserialize, Serialize};

use super::{CacheError, CacheKey, ResultCache};
use crate::types::ProbabilityRecord;

/// Key = full cache key, Value = serialized CacheEntry
const RECORDS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("probabilities");
const META_TABLE: TableDefinition<&str, &str> = TableDefinition::new("meta");

const DB_FILE: &str = "probabilities.redb";

fn store_err(err: impl Into<redb::Error>) -> CacheError {
    CacheError::Store(err.into())
}

/// Stored value: the record plus when it was written.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    /// Seconds since UNIX_EPOCH at write time
    stored_at_secs: u64,
    record: ProbabilityRecord,
}

impl CacheEntry {
    fn new(record: ProbabilityRecord) -> Self {
        let stored_at_secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self {
            stored_at_secs,
            record,
        }
    }

    fn to_bytes(&self) -> Result<Vec<u8>, CacheError> {
        Ok(bincode::serialize(self)?)
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, CacheError> {
        Ok(bincode::deserialize(bytes)?)
    }
}

/// Result cache backed by a local redb database.
///
/// redb transactions block on file IO, so the async operations run them on
/// tokio's blocking pool.
pub struct RedbCache {
    db: Arc<Database>,
    cache_dir: PathBuf,
}

impl RedbCache {
    /// Open or create the cache database in `cache_dir`.
    ///
    /// Creates the directory if it doesn't exist.
    pub fn open(cache_dir: &Path) -> Result<Self, CacheError> {
        fs::create_dir_all(cache_dir)?;

        let db = Database::create(cache_dir.join(DB_FILE)).map_err(store_err)?;

        let write_txn = db.begin_write().map_err(store_err)?;
        {
            write_txn.open_table(RECORDS_TABLE).map_err(store_err)?;
            write_txn.open_table(META_TABLE).map_err(store_err)?;
        }
        write_txn.commit().map_err(store_err)?;

        Ok(Self {
            db: Arc::new(db),
            cache_dir: cache_dir.to_path_buf(),
        })
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Run `op` against the database on the blocking pool.
    async fn blocking<T, F>(&self, op: F) -> Result<T, CacheError>
    where
        T: Send + 'static,
        F: FnOnce(&Database) -> Result<T, CacheError> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || op(&db)).await?
    }

    /// Read a value written with `put_raw`.
    pub fn get_raw(&self, key: &str) -> Result<Option<String>, CacheError> {
        let read_txn = self.db.begin_read().map_err(store_err)?;
        let table = read_txn.open_table(META_TABLE).map_err(store_err)?;
        Ok(table
            .get(key)
            .map_err(store_err)?
            .map(|guard| guard.value().to_string()))
    }

    /// Unix timestamp at which `key` was last written.
    pub fn stored_at(&self, key: &CacheKey) -> Result<Option<u64>, CacheError> {
        Ok(read_entry(&self.db, key.as_str())?.map(|e| e.stored_at_secs))
    }

    /// Entry count and approximate size, for `bayesgpt config`.
    pub fn stats(&self) -> CacheStats {
        let Ok(read_txn) = self.db.begin_read() else {
            return CacheStats::default();
        };
        let Ok(table) = read_txn.open_table(RECORDS_TABLE) else {
            return CacheStats::default();
        };

        let entries = table.len().unwrap_or(0) as usize;

        // Approximate size by summing key and value lengths
        let size_bytes = table
            .iter()
            .ok()
            .into_iter()
            .flatten()
            .filter_map(|r| r.ok())
            .map(|(k, v)| k.value().len() + v.value().len())
            .sum::<usize>() as u64;

        CacheStats {
            entries,
            size_bytes,
        }
    }
}

fn read_entry(db: &Database, key: &str) -> Result<Option<CacheEntry>, CacheError> {
    let read_txn = db.begin_read().map_err(store_err)?;
    let table = read_txn.open_table(RECORDS_TABLE).map_err(store_err)?;

    let Some(guard) = table.get(key).map_err(store_err)? else {
        return Ok(None);
    };
    CacheEntry::from_bytes(guard.value()).map(Some)
}

fn write_entry(db: &Database, key: &str, entry: &CacheEntry) -> Result<(), CacheError> {
    let bytes = entry.to_bytes()?;

    let write_txn = db.begin_write().map_err(store_err)?;
    {
        let mut table = write_txn.open_table(RECORDS_TABLE).map_err(store_err)?;
        table.insert(key, bytes.as_slice()).map_err(store_err)?;
    }
    write_txn.commit().map_err(store_err)?;
    Ok(())
}

fn scan_keys(db: &Database, prefix: &str) -> Result<Vec<String>, CacheError> {
    let read_txn = db.begin_read().map_err(store_err)?;
    let table = read_txn.open_table(RECORDS_TABLE).map_err(store_err)?;

    // Keys are ordered, so the prefix range is contiguous
    let mut keys = Vec::new();
    for item in table.range(prefix..).map_err(store_err)? {
        let (k, _) = item.map_err(store_err)?;
        let key = k.value();
        if !key.starts_with(prefix) {
            break;
        }
        keys.push(key.to_string());
    }
    Ok(keys)
}

fn remove(db: &Database, key: &str) -> Result<(), CacheError> {
    let write_txn = db.begin_write().map_err(store_err)?;
    {
        let mut table = write_txn.open_table(RECORDS_TABLE).map_err(store_err)?;
        table.remove(key).map_err(store_err)?;
    }
    write_txn.commit().map_err(store_err)?;
    Ok(())
}

fn write_meta(db: &Database, key: &str, value: &str) -> Result<(), CacheError> {
    let write_txn = db.begin_write().map_err(store_err)?;
    {
        let mut table = write_txn.open_table(META_TABLE).map_err(store_err)?;
        table.insert(key, value).map_err(store_err)?;
    }
    write_txn.commit().map_err(store_err)?;
    Ok(())
}

impl ResultCache for RedbCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<ProbabilityRecord>, CacheError> {
        let key = key.as_str().to_string();
        let entry = self.blocking(move |db| read_entry(db, &key)).await?;
        Ok(entry.map(|entry| entry.record))
    }

    async fn set(&self, key: &CacheKey, record: &ProbabilityRecord) -> Result<(), CacheError> {
        let key = key.as_str().to_string();
        let entry = CacheEntry::new(record.clone());
        self.blocking(move |db| write_entry(db, &key, &entry)).await
    }

    async fn keys(&self, prefix: &str) -> Result<Vec<String>, CacheError> {
        let prefix = prefix.to_string();
        self.blocking(move |db| scan_keys(db, &prefix)).await
    }

    async fn del(&self, key: &str) -> Result<(), CacheError> {
        let key = key.to_string();
        self.blocking(move |db| remove(db, &key)).await
    }

    async fn put_raw(&self, key: &str, value: &str) -> Result<(), CacheError> {
        let (key, value) = (key.to_string(), value.to_string());
        self.blocking(move |db| write_meta(db, &key, &value)).await
    }
}

/// Cache statistics for monitoring.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Number of cached records
    pub entries: usize,
    /// Approximate total size in bytes (keys + values)
    pub size_bytes: u64,
}

impl CacheStats {
    /// Format size in human-readable form (KB, MB, GB)
    pub fn size_human(&self) -> String {
        const KB: u64 = 1024;
        const MB: u64 = KB * 1024;
        const GB: u64 = MB * 1024;

        if self.size_bytes >= GB {
            format!("{:.2} GB", self.size_bytes as f64 / GB as f64)
        } else if self.size_bytes >= MB {
            format!("{:.2} MB", self.size_bytes as f64 / MB as f64)
        } else if self.size_bytes >= KB {
            format!("{:.2} KB", self.size_bytes as f64 / KB as f64)
        } else {
            format!("{} B", self.size_bytes)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::HEARTBEAT_KEY;
    use crate::types::{Rationale, Scenario};

    fn record(prior: f64) -> ProbabilityRecord {
        ProbabilityRecord::new(prior, 0.8, 0.1, Rationale {
            prior_reasoning: "stored".into(),
            ..Default::default()
        })
        .unwrap()
    }

    fn key(hypothesis: &str) -> CacheKey {
        CacheKey::for_scenario(&Scenario::new(hypothesis, "some evidence text"))
    }

    #[test]
    fn test_entry_serialization() {
        let entry = CacheEntry::new(record(0.3));
        let decoded = CacheEntry::from_bytes(&entry.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded.stored_at_secs, entry.stored_at_secs);
        assert_eq!(decoded.record, entry.record);
    }

    #[tokio::test]
    async fn test_roundtrip() -> Result<(), CacheError> {
        let dir = tempfile::tempdir()?;
        let cache = RedbCache::open(dir.path())?;

        assert!(cache.get(&key("first hypothesis")).await?.is_none());
        cache.set(&key("first hypothesis"), &record(0.3)).await?;

        let loaded = cache.get(&key("first hypothesis")).await?.unwrap();
        assert_eq!(loaded.prior(), 0.3);
        assert_eq!(loaded.marginal(), record(0.3).marginal());
        assert_eq!(loaded.posterior(), record(0.3).posterior());
        assert_eq!(loaded.rationale().prior_reasoning, "stored");
        assert!(cache.stored_at(&key("first hypothesis"))?.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn test_persists_across_reopen() -> Result<(), CacheError> {
        let dir = tempfile::tempdir()?;
        {
            let cache = RedbCache::open(dir.path())?;
            cache.set(&key("durable hypothesis"), &record(0.5)).await?;
        }
        let cache = RedbCache::open(dir.path())?;
        assert!(cache.get(&key("durable hypothesis")).await?.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn test_keys_by_prefix_and_delete() -> Result<(), CacheError> {
        let dir = tempfile::tempdir()?;
        let cache = RedbCache::open(dir.path())?;

        cache.set(&key("alpha hypothesis"), &record(0.1)).await?;
        cache.set(&key("beta hypothesis"), &record(0.2)).await?;
        cache.put_raw(HEARTBEAT_KEY, "1700000000").await?;

        let keys = cache.keys("probability:").await?;
        assert_eq!(keys.len(), 2);
        assert!(keys.iter().all(|k| k.starts_with("probability:")));
        assert_eq!(cache.keys("probability:beta").await?.len(), 1);

        cache.del(key("alpha hypothesis").as_str()).await?;
        assert_eq!(cache.keys("probability:").await?.len(), 1);
        assert_eq!(cache.get_raw(HEARTBEAT_KEY)?.as_deref(), Some("1700000000"));
        Ok(())
    }

    #[tokio::test]
    async fn test_concurrent_writers_share_database() -> Result<(), CacheError> {
        let dir = tempfile::tempdir()?;
        let cache = Arc::new(RedbCache::open(dir.path())?);

        let mut tasks = tokio::task::JoinSet::new();
        for i in 0..8 {
            let cache = Arc::clone(&cache);
            tasks.spawn(async move {
                let hypothesis = format!("hypothesis number {}", i);
                cache.set(&key(&hypothesis), &record(i as f64 / 10.0)).await
            });
        }
        while let Some(joined) = tasks.join_next().await {
            joined??;
        }

        assert_eq!(cache.keys("probability:").await?.len(), 8);
        let loaded = cache.get(&key("hypothesis number 5")).await?.unwrap();
        assert_eq!(loaded.prior(), 0.5);
        Ok(())
    }

    #[tokio::test]
    async fn test_stats() -> Result<(), CacheError> {
        let dir = tempfile::tempdir()?;
        let cache = RedbCache::open(dir.path())?;

        let stats = cache.stats();
        assert_eq!(stats.entries, 0);
        assert_eq!(stats.size_bytes, 0);

        cache.set(&key("sized hypothesis"), &record(0.4)).await?;
        let stats = cache.stats();
        assert_eq!(stats.entries, 1);
        assert!(stats.size_bytes > 0);
        assert!(stats.size_human().ends_with('B'));
        Ok(())
    }
}
