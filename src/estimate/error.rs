use thiserror::Error;

use crate::types::{RecordError, ScenarioError};

/// Why an estimation produced no record.
#[derive(Debug, Error)]
pub enum EstimationError {
    #[error("no API key configured (set OPENAI_API_KEY or `api-key` in bayesgpt.toml)")]
    MissingApiKey,

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("response contained no `{0}` function call")]
    MissingToolCall(&'static str),

    #[error("malformed response JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid `{field}` value {raw:?}: {reason}")]
    Parse {
        field: &'static str,
        raw: String,
        reason: String,
    },

    #[error(transparent)]
    Record(#[from] RecordError),

    #[error("invalid scenario: {0}")]
    Scenario(#[from] ScenarioError),
}
