//! Remote result cache over a Redis-compatible REST API (Upstash / Vercel KV).
//!
//! Each command is POSTed to the base URL as a JSON array, e.g.
//! `["GET", "probability:...|..."]`, with a bearer token. The store answers
//! `{"result": ...}` on success and `{"error": "..."}` otherwise.

use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::{CacheError, CacheKey, ResultCache};
use crate::types::ProbabilityRecord;

#[derive(Debug, Deserialize)]
struct CommandResponse {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<String>,
}

impl CommandResponse {
    fn into_result(self) -> Result<Value, CacheError> {
        match self.error {
            Some(error) => Err(CacheError::Remote(error)),
            None => Ok(self.result),
        }
    }
}

/// Redis-over-REST client.
pub struct KvRestCache {
    http: reqwest::Client,
    url: String,
    token: String,
}

impl KvRestCache {
    pub fn new(url: &str, token: &str, timeout: Duration) -> Result<Self, CacheError> {
        if url.trim().is_empty() {
            return Err(CacheError::Misconfigured("KV REST url is empty".into()));
        }
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            url: url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn command(&self, args: Value) -> Result<Value, CacheError> {
        let name = args.get(0).and_then(Value::as_str).unwrap_or("?");
        debug!("KV command {}", name);
        let response: CommandResponse = self
            .http
            .post(&self.url)
            .bearer_auth(&self.token)
            .json(&args)
            .send()
            .await?
            .json()
            .await?;
        response.into_result()
    }
}

/// Stored values are JSON strings; some clients hand back already-parsed JSON.
fn decode_record(value: Value) -> Result<Option<ProbabilityRecord>, CacheError> {
    match value {
        Value::Null => Ok(None),
        Value::String(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        other => Ok(Some(serde_json::from_value(other)?)),
    }
}

fn decode_keys(value: Value) -> Result<Vec<String>, CacheError> {
    match value {
        Value::Null => Ok(Vec::new()),
        other => Ok(serde_json::from_value(other)?),
    }
}

/// KEYS takes a glob; escape glob syntax in the literal prefix.
fn glob_for_prefix(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for c in prefix.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('*');
    pattern
}

impl ResultCache for KvRestCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<ProbabilityRecord>, CacheError> {
        let value = self.command(json!(["GET", key.as_str()])).await?;
        decode_record(value)
    }

    async fn set(&self, key: &CacheKey, record: &ProbabilityRecord) -> Result<(), CacheError> {
        let payload = serde_json::to_string(record)?;
        self.command(json!(["SET", key.as_str(), payload])).await?;
        Ok(())
    }

    async fn keys(&self, prefix: &str) -> Result<Vec<String>, CacheError> {
        let value = self.command(json!(["KEYS", glob_for_prefix(prefix)])).await?;
        decode_keys(value)
    }

    async fn del(&self, key: &str) -> Result<(), CacheError> {
        self.command(json!(["DEL", key])).await?;
        Ok(())
    }

    async fn put_raw(&self, key: &str, value: &str) -> Result<(), CacheError> {
        self.command(json!(["SET", key, value])).await?;
        Ok(())
    }
}
