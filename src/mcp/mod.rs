//! MCP (Model Context Protocol) server for bayesgpt.
//!
//! Exposes estimation and exploration as MCP tools, so an external UI or an
//! AI assistant can act as the front end. The server runs over stdio and
//! provides:
//!
//! - `estimate`: estimate a hypothesis/evidence pair and open a session
//! - `edit`, `drag`, `reset`, `view`: explore the current session
//! - `list_scenarios`, `flush_cache`: cache maintenance
//!
//! # Architecture
//!
//! ```text
//! MCP Request → Workbench → Estimator / Explorer → MCP Response
//!     ↓             ↓              ↓                    ↓
//! JSON-RPC     session state   cache + LLM call     ExplorerView
//! over stdio                   or pure recompute    as JSON
//! ```
//!
//! # Usage
//!
//! ```bash
//! bayesgpt-mcp
//! ```
//!
//! Or as a subcommand:
//! ```bash
//! bayesgpt mcp
//! ```

mod server;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use rmcp::{transport::stdio, ServiceExt};
use tracing::{info, warn};

use crate::cache::{maintenance, AnyCache};
use crate::config::Config;
use crate::estimate::{Estimator, OpenAiClient};
use crate::session::Workbench;

pub use server::{
    BayesServer, DragRequest, EditRequest, EstimateRequest, FlushReport, ProductionWorkbench,
};

/// Build the server from configuration and serve it over stdio until the
/// client disconnects.
pub async fn serve_stdio(config: &Config) -> Result<()> {
    let client = OpenAiClient::from_config(config)?;
    if !client.has_api_key() {
        warn!("No API key configured; only cached scenarios can be estimated");
    }
    let cache = Arc::new(AnyCache::from_config(config).context("Failed to open cache")?);

    let heartbeat = config.heartbeat.then(|| {
        maintenance::spawn_heartbeat(
            cache.clone(),
            Duration::from_secs(config.heartbeat_interval_secs),
        )
    });

    info!("Serving bayesgpt MCP over stdio ({} cache)", cache.backend());
    let server = BayesServer::new(Workbench::new(Estimator::new(client, cache)));
    let service = server.serve(stdio()).await?;

    // Runs until client disconnects
    service.waiting().await?;

    if let Some(handle) = heartbeat {
        handle.abort();
    }
    Ok(())
}
