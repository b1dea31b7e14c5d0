//! bayesgpt - LLM-estimated Bayesian belief updates
//!
//! Submit a hypothesis and a piece of evidence; one model call estimates the
//! prior, likelihood and alternative likelihood, and Bayes' rule derives the
//! marginal and posterior. Every input can then be edited (or "dragged" on
//! the probability grid) and the derived values follow.
//!
//! # Architecture
//!
//! ```text
//! Scenario → Estimator ──→ ResultCache ──→ ProbabilityRecord → Explorer → Rendering / MCP
//!               ↓              ↓                                  ↓
//!          LlmClient      kv / redb /                     recompute, drag,
//!          (reqwest)      memory                          reset, quadrants
//! ```
//!
//! - `types`: the record, scenario and input-field types
//! - `engine`: pure Bayes arithmetic, grid geometry and the edit session
//! - `estimate`: prompt, response schema, OpenAI client and cache-aware estimator
//! - `cache`: result cache backends and maintenance operations
//! - `session`: the stateful workbench the CLI and MCP server drive
//! - `rendering`: terminal views
//! - `mcp`: MCP tool server

pub mod cache;
pub mod config;
pub mod engine;
pub mod estimate;
pub mod mcp;
pub mod rendering;
pub mod session;
pub mod types;

use tracing_subscriber::EnvFilter;

// Re-export core types
pub use types::{
    ProbabilityField, ProbabilityRecord, QuadrantCaptions, Rationale, RecordError, Scenario,
    ScenarioError,
};

pub use cache::{AnyCache, CacheBackend, CacheError, CacheKey, ResultCache};
pub use engine::{recompute, Explorer, PanelGroup, PanelLayout, Quadrants};
pub use estimate::{Estimation, EstimationError, EstimationSource, Estimator, LlmClient};
pub use session::{ExplorerView, SessionError, Workbench};

/// Install the stderr log subscriber. `RUST_LOG` wins; otherwise `info`,
/// or `debug` when `verbose`. Safe to call more than once.
pub fn init_logging(verbose: bool) {
    let default = if verbose { "bayesgpt=debug" } else { "bayesgpt=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
