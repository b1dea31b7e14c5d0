//! bayesgpt MCP server binary.
//!
//! Runs the estimator and explorer as an MCP server over stdio, configured
//! from bayesgpt.toml / pyproject.toml and the environment.
//!
//! # Usage
//!
//! ```bash
//! OPENAI_API_KEY=... bayesgpt-mcp
//! ```

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    bayesgpt::init_logging(false);
    let config = bayesgpt::config::Config::load(&std::env::current_dir()?)?.with_process_env();
    bayesgpt::mcp::serve_stdio(&config).await
}
