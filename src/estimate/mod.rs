//! Estimation client: one LLM call per unique (hypothesis, evidence) pair.
//!
//! ```text
//! Scenario → CacheKey ─┬─ hit ──────────────────────────────→ Estimation::Cached
//!                      └─ miss → build_prompt → LlmClient → EstimateResponse
//!                                                   │             │ into_record
//!                                                   ↓             ↓
//!                                   Estimation::Failed      cache.set → Estimation::Fresh
//! ```

mod client;
mod error;
mod estimator;
pub mod prompt;
mod schema;

pub use client::{extract_response, ChatCompletion, ChatRequest, LlmClient, OpenAiClient};
pub use error::EstimationError;
pub use estimator::{Estimation, EstimationSource, Estimator};
pub use prompt::build_prompt;
pub use schema::{parse_probability, EstimateResponse, RESPONSE_NAME, RESPONSE_SCHEMA};
