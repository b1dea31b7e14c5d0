//! Cache-aware estimation.
//!
//! `Estimator` owns an injected `LlmClient` and `ResultCache`. The cache is
//! best effort: a failed read is a miss, a failed write is logged and
//! dropped. The estimator itself never fails; a bad or missing response
//! yields the zeroed default record tagged `Estimation::Failed`.

use std::fmt;

use tracing::{debug, info, warn};

use super::client::{LlmClient, OpenAiClient};
use super::error::EstimationError;
use super::prompt::build_prompt;
use crate::cache::{AnyCache, CacheKey, ResultCache};
use crate::config::Config;
use crate::types::{ProbabilityRecord, Scenario};

/// Where an estimation's record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum EstimationSource {
    Cached,
    Fresh,
    Failed,
}

impl fmt::Display for EstimationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EstimationSource::Cached => write!(f, "cached"),
            EstimationSource::Fresh => write!(f, "fresh"),
            EstimationSource::Failed => write!(f, "failed"),
        }
    }
}

/// Outcome of one submission.
#[derive(Debug)]
pub enum Estimation {
    /// Served from the result cache; no model call was made.
    Cached(ProbabilityRecord),
    /// Produced by the model and written to the cache.
    Fresh(ProbabilityRecord),
    /// The model call or response parsing failed. `record` is the zeroed default.
    Failed {
        record: ProbabilityRecord,
        error: EstimationError,
    },
}

impl Estimation {
    pub fn record(&self) -> &ProbabilityRecord {
        match self {
            Estimation::Cached(record) | Estimation::Fresh(record) => record,
            Estimation::Failed { record, .. } => record,
        }
    }

    pub fn into_record(self) -> ProbabilityRecord {
        match self {
            Estimation::Cached(record) | Estimation::Fresh(record) => record,
            Estimation::Failed { record, .. } => record,
        }
    }

    pub fn source(&self) -> EstimationSource {
        match self {
            Estimation::Cached(_) => EstimationSource::Cached,
            Estimation::Fresh(_) => EstimationSource::Fresh,
            Estimation::Failed { .. } => EstimationSource::Failed,
        }
    }

    pub fn error(&self) -> Option<&EstimationError> {
        match self {
            Estimation::Failed { error, .. } => Some(error),
            _ => None,
        }
    }
}

pub struct Estimator<L, C> {
    client: L,
    cache: C,
}

impl Estimator<OpenAiClient, AnyCache> {
    /// Production wiring: OpenAI-compatible client plus the configured cache backend.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let client = OpenAiClient::from_config(config)?;
        let cache = AnyCache::from_config(config)?;
        Ok(Self::new(client, cache))
    }
}

impl<L: LlmClient, C: ResultCache> Estimator<L, C> {
    pub fn new(client: L, cache: C) -> Self {
        Self { client, cache }
    }

    pub fn client(&self) -> &L {
        &self.client
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Estimate a scenario. Never fails; see [`Estimation`].
    pub async fn estimate(&self, scenario: &Scenario) -> Estimation {
        let key = CacheKey::for_scenario(scenario);
        if let Some(record) = self.lookup(&key).await {
            return Estimation::Cached(record);
        }

        match self.fetch(scenario).await {
            Ok(record) => {
                self.store(&key, &record).await;
                Estimation::Fresh(record)
            }
            Err(error) => {
                warn!(key = %key, error = %error, "estimation failed, returning default record");
                Estimation::Failed {
                    record: ProbabilityRecord::default(),
                    error,
                }
            }
        }
    }

    /// Like [`estimate`](Self::estimate) but surfaces the failure instead of
    /// substituting the default record.
    pub async fn try_estimate(&self, scenario: &Scenario) -> Result<Estimation, EstimationError> {
        let key = CacheKey::for_scenario(scenario);
        if let Some(record) = self.lookup(&key).await {
            return Ok(Estimation::Cached(record));
        }
        let record = self.fetch(scenario).await?;
        self.store(&key, &record).await;
        Ok(Estimation::Fresh(record))
    }

    /// One model round trip, no cache involvement.
    pub async fn fetch(&self, scenario: &Scenario) -> Result<ProbabilityRecord, EstimationError> {
        let prompt = build_prompt(&scenario.hypothesis, &scenario.evidence);
        let response = self.client.request_estimate(&prompt).await?;
        let record = response.into_record()?;
        info!(
            prior = record.prior(),
            likelihood = record.likelihood(),
            alt_likelihood = record.alt_likelihood(),
            posterior = record.posterior(),
            "estimated probabilities"
        );
        Ok(record)
    }

    async fn lookup(&self, key: &CacheKey) -> Option<ProbabilityRecord> {
        match self.cache.get(key).await {
            Ok(Some(record)) => {
                debug!(key = %key, "cache hit");
                Some(record)
            }
            Ok(None) => {
                debug!(key = %key, "cache miss");
                None
            }
            Err(error) => {
                warn!(key = %key, error = %error, "cache read failed, treating as miss");
                None
            }
        }
    }

    async fn store(&self, key: &CacheKey, record: &ProbabilityRecord) {
        if let Err(error) = self.cache.set(key, record).await {
            warn!(key = %key, error = %error, "cache write failed, result not memoized");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::cache::MemoryCache;
    use crate::estimate::EstimateResponse;

    /// Client that replays a fixed answer and counts calls.
    struct ScriptedClient {
        answer: Option<EstimateResponse>,
        calls: AtomicUsize,
    }

    impl ScriptedClient {
        fn answering(answer: EstimateResponse) -> Self {
            Self { answer: Some(answer), calls: AtomicUsize::new(0) }
        }

        fn failing() -> Self {
            Self { answer: None, calls: AtomicUsize::new(0) }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl LlmClient for ScriptedClient {
        async fn request_estimate(&self, prompt: &str) -> Result<EstimateResponse, EstimationError> {
            assert!(prompt.contains("The hypothesis is:"));
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer.clone().ok_or(EstimationError::Status {
                status: 503,
                body: "overloaded".into(),
            })
        }
    }

    fn librarian_answer() -> EstimateResponse {
        EstimateResponse {
            prior: "0.3".into(),
            likelihood: "0.8".into(),
            alternative_likelihood: "0.1".into(),
            likelihood_chain_of_thought: "librarians skew introverted".into(),
            alternative_likelihood_chain_of_thought: "shy farmers exist too".into(),
            prior_chain_of_thought: "roughly a third in this framing".into(),
            ..Default::default()
        }
    }

    fn steve() -> Scenario {
        Scenario::validated(
            "Steve is a librarian",
            "Steve is very shy and withdrawn, invariably helpful, with a passion for detail.",
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_second_submission_served_from_cache() {
        let estimator = Estimator::new(ScriptedClient::answering(librarian_answer()), MemoryCache::new());

        let first = estimator.estimate(&steve()).await;
        assert_eq!(first.source(), EstimationSource::Fresh);
        assert_eq!(estimator.client().calls(), 1);
        assert_eq!(estimator.cache().writes(), 1);

        let second = estimator.estimate(&steve()).await;
        assert_eq!(second.source(), EstimationSource::Cached);
        assert_eq!(estimator.client().calls(), 1);
        assert_eq!(estimator.cache().writes(), 1);
        assert_eq!(second.record(), first.record());
    }

    #[tokio::test]
    async fn test_failure_returns_default_and_skips_cache() {
        let estimator = Estimator::new(ScriptedClient::failing(), MemoryCache::new());

        let outcome = estimator.estimate(&steve()).await;
        assert_eq!(outcome.source(), EstimationSource::Failed);
        assert!(outcome.record().is_empty());
        assert!(matches!(outcome.error(), Some(EstimationError::Status { status: 503, .. })));
        assert_eq!(estimator.cache().writes(), 0);

        // Not memoized: the next submission asks the model again
        estimator.estimate(&steve()).await;
        assert_eq!(estimator.client().calls(), 2);
    }

    #[tokio::test]
    async fn test_unparseable_answer_is_failure() {
        let answer = EstimateResponse { prior: "very likely".into(), ..librarian_answer() };
        let estimator = Estimator::new(ScriptedClient::answering(answer), MemoryCache::new());

        let outcome = estimator.estimate(&steve()).await;
        assert!(matches!(outcome.error(), Some(EstimationError::Parse { field: "prior", .. })));
        assert!(outcome.into_record().is_empty());
    }

    #[tokio::test]
    async fn test_unavailable_cache_falls_through() {
        let cache = MemoryCache::new();
        cache.set_unavailable(true);
        let estimator = Estimator::new(ScriptedClient::answering(librarian_answer()), cache);

        let first = estimator.estimate(&steve()).await;
        assert_eq!(first.source(), EstimationSource::Fresh);
        assert!((first.record().marginal() - 0.31).abs() < 1e-12);

        let second = estimator.estimate(&steve()).await;
        assert_eq!(second.source(), EstimationSource::Fresh);
        assert_eq!(estimator.client().calls(), 2);
    }

    #[tokio::test]
    async fn test_keyless_estimator_serves_cache_hits() {
        let cache = MemoryCache::new();
        let record = ProbabilityRecord::new(0.3, 0.8, 0.1, Default::default()).unwrap();
        cache.set(&CacheKey::for_scenario(&steve()), &record).await.unwrap();

        let client = OpenAiClient::from_config(&Config::default()).unwrap();
        let estimator = Estimator::new(client, cache);

        let hit = estimator.estimate(&steve()).await;
        assert_eq!(hit.source(), EstimationSource::Cached);
        assert_eq!(hit.record(), &record);

        let other = Scenario::validated("Steve is a farmer", "Steve likes quiet mornings.").unwrap();
        let miss = estimator.estimate(&other).await;
        assert_eq!(miss.source(), EstimationSource::Failed);
        assert!(matches!(miss.error(), Some(EstimationError::MissingApiKey)));
        assert!(miss.record().is_empty());
    }

    #[tokio::test]
    async fn test_try_estimate_propagates() {
        let estimator = Estimator::new(ScriptedClient::failing(), MemoryCache::new());
        assert!(estimator.try_estimate(&steve()).await.is_err());

        let estimator = Estimator::new(ScriptedClient::answering(librarian_answer()), MemoryCache::new());
        let outcome = estimator.try_estimate(&steve()).await.unwrap();
        assert_eq!(outcome.source(), EstimationSource::Fresh);
        let outcome = estimator.try_estimate(&steve()).await.unwrap();
        assert_eq!(outcome.source(), EstimationSource::Cached);
    }
}
