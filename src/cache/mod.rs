//! Result cache for estimation outputs.
//!
//! Keyed by `probability:<hypothesis>|<evidence>`. Three backends share the
//! `ResultCache` interface:
//! - `KvRestCache`: remote Redis-over-REST store (production)
//! - `RedbCache`: local persistent store under `.bayesgpt.cache/`
//! - `MemoryCache`: in-process map (tests, throwaway sessions)
//!
//! Every operation is best effort. Callers on the request path treat errors
//! as misses; only the maintenance commands surface them.

mod backend;
mod key;
mod kv;
pub mod maintenance;
mod memory;
mod store;

use std::future::Future;
use std::sync::Arc;

use thiserror::Error;

use crate::types::ProbabilityRecord;

pub use backend::{AnyCache, CacheBackend};
pub use key::{CacheKey, HEARTBEAT_KEY, KEY_DELIMITER, KEY_PREFIX};
pub use kv::KvRestCache;
pub use memory::MemoryCache;
pub use store::{CacheStats, RedbCache};

/// Errors from any cache backend.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache store error: {0}")]
    Store(#[from] redb::Error),

    #[error("failed to encode or decode cache entry: {0}")]
    Bincode(#[from] bincode::Error),

    #[error("failed to encode or decode cache entry: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cache request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("cache store rejected command: {0}")]
    Remote(String),

    #[error("cache io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache is not configured: {0}")]
    Misconfigured(String),

    #[error("cache task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("cache unavailable")]
    Unavailable,
}

/// Key-value store of estimation results.
///
/// Futures are `Send` so the estimator can run inside multi-threaded
/// runtimes and MCP tool handlers.
pub trait ResultCache: Send + Sync {
    fn get(
        &self,
        key: &CacheKey,
    ) -> impl Future<Output = Result<Option<ProbabilityRecord>, CacheError>> + Send;

    fn set(
        &self,
        key: &CacheKey,
        record: &ProbabilityRecord,
    ) -> impl Future<Output = Result<(), CacheError>> + Send;

    /// All stored keys starting with `prefix`.
    fn keys(&self, prefix: &str) -> impl Future<Output = Result<Vec<String>, CacheError>> + Send;

    fn del(&self, key: &str) -> impl Future<Output = Result<(), CacheError>> + Send;

    /// Write an opaque value outside the record namespace (heartbeat).
    fn put_raw(&self, key: &str, value: &str)
        -> impl Future<Output = Result<(), CacheError>> + Send;
}

/// Shared handles delegate, so one backend can serve the estimator and the
/// heartbeat task.
impl<C: ResultCache> ResultCache for Arc<C> {
    fn get(
        &self,
        key: &CacheKey,
    ) -> impl Future<Output = Result<Option<ProbabilityRecord>, CacheError>> + Send {
        (**self).get(key)
    }

    fn set(
        &self,
        key: &CacheKey,
        record: &ProbabilityRecord,
    ) -> impl Future<Output = Result<(), CacheError>> + Send {
        (**self).set(key, record)
    }

    fn keys(&self, prefix: &str) -> impl Future<Output = Result<Vec<String>, CacheError>> + Send {
        (**self).keys(prefix)
    }

    fn del(&self, key: &str) -> impl Future<Output = Result<(), CacheError>> + Send {
        (**self).del(key)
    }

    fn put_raw(&self, key: &str, value: &str)
        -> impl Future<Output = Result<(), CacheError>> + Send {
        (**self).put_raw(key, value)
    }
}
