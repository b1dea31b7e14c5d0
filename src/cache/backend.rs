//! Backend selection.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{CacheError, CacheKey, KvRestCache, MemoryCache, RedbCache, ResultCache};
use crate::config::Config;
use crate::types::ProbabilityRecord;

/// Which cache implementation to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// Redis-over-REST (Upstash / Vercel KV)
    Kv,
    /// Local redb database
    Redb,
    /// In-process, lost on exit
    Memory,
}

impl FromStr for CacheBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "kv" | "redis" | "upstash" => Ok(CacheBackend::Kv),
            "redb" | "local" | "disk" => Ok(CacheBackend::Redb),
            "memory" | "mem" | "none" => Ok(CacheBackend::Memory),
            _ => Err(format!("Unknown cache backend: {}. Use 'kv', 'redb', or 'memory'", s)),
        }
    }
}

impl fmt::Display for CacheBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheBackend::Kv => write!(f, "kv"),
            CacheBackend::Redb => write!(f, "redb"),
            CacheBackend::Memory => write!(f, "memory"),
        }
    }
}

/// Whichever backend the configuration selected.
pub enum AnyCache {
    Kv(KvRestCache),
    Redb(RedbCache),
    Memory(MemoryCache),
}

impl AnyCache {
    pub fn from_config(config: &Config) -> Result<Self, CacheError> {
        let backend = config.cache_backend();
        debug!("Opening {} cache", backend);
        match backend {
            CacheBackend::Kv => {
                let (Some(url), Some(token)) = (&config.kv_url, &config.kv_token) else {
                    return Err(CacheError::Misconfigured(
                        "kv backend needs KV_REST_API_URL and KV_REST_API_TOKEN".into(),
                    ));
                };
                let timeout = Duration::from_secs(config.timeout_secs);
                Ok(AnyCache::Kv(KvRestCache::new(url, token, timeout)?))
            }
            CacheBackend::Redb => Ok(AnyCache::Redb(RedbCache::open(&config.cache_dir)?)),
            CacheBackend::Memory => Ok(AnyCache::Memory(MemoryCache::new())),
        }
    }

    pub fn backend(&self) -> CacheBackend {
        match self {
            AnyCache::Kv(_) => CacheBackend::Kv,
            AnyCache::Redb(_) => CacheBackend::Redb,
            AnyCache::Memory(_) => CacheBackend::Memory,
        }
    }

    /// One-line location summary for `bayesgpt config`.
    pub fn describe(&self) -> String {
        match self {
            AnyCache::Kv(kv) => format!("kv ({})", kv.url()),
            AnyCache::Redb(store) => {
                let stats = store.stats();
                format!(
                    "redb ({}, {} entries, {})",
                    store.cache_dir().display(),
                    stats.entries,
                    stats.size_human()
                )
            }
            AnyCache::Memory(memory) => format!("memory ({} entries)", memory.len()),
        }
    }
}

impl ResultCache for AnyCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<ProbabilityRecord>, CacheError> {
        match self {
            AnyCache::Kv(c) => c.get(key).await,
            AnyCache::Redb(c) => c.get(key).await,
            AnyCache::Memory(c) => c.get(key).await,
        }
    }

    async fn set(&self, key: &CacheKey, record: &ProbabilityRecord) -> Result<(), CacheError> {
        match self {
            AnyCache::Kv(c) => c.set(key, record).await,
            AnyCache::Redb(c) => c.set(key, record).await,
            AnyCache::Memory(c) => c.set(key, record).await,
        }
    }

    async fn keys(&self, prefix: &str) -> Result<Vec<String>, CacheError> {
        match self {
            AnyCache::Kv(c) => c.keys(prefix).await,
            AnyCache::Redb(c) => c.keys(prefix).await,
            AnyCache::Memory(c) => c.keys(prefix).await,
        }
    }

    async fn del(&self, key: &str) -> Result<(), CacheError> {
        match self {
            AnyCache::Kv(c) => c.del(key).await,
            AnyCache::Redb(c) => c.del(key).await,
            AnyCache::Memory(c) => c.del(key).await,
        }
    }

    async fn put_raw(&self, key: &str, value: &str) -> Result<(), CacheError> {
        match self {
            AnyCache::Kv(c) => c.put_raw(key, value).await,
            AnyCache::Redb(c) => c.put_raw(key, value).await,
            AnyCache::Memory(c) => c.put_raw(key, value).await,
        }
    }
}
