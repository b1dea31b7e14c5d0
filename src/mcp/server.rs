//! MCP server implementation for bayesgpt.
//!
//! Provides the estimation and exploration tools via MCP protocol over stdio.
//! One exploration session is held per server; `estimate` replaces it.

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use rmcp::{
    ServerHandler,
    handler::server::{router::tool::ToolRouter, tool::Parameters},
    model::{ErrorCode, ErrorData as McpError, *},
    tool, tool_handler, tool_router,
};
use serde::{Deserialize, Serialize};

use crate::cache::AnyCache;
use crate::engine::{PanelGroup, ProbabilityField};
use crate::estimate::OpenAiClient;
use crate::session::{SessionError, Workbench};

pub type ProductionWorkbench = Workbench<OpenAiClient, Arc<AnyCache>>;

/// bayesgpt MCP server - exposes Bayesian estimation and exploration as MCP tools.
#[derive(Clone)]
pub struct BayesServer {
    workbench: Arc<ProductionWorkbench>,
    tool_router: ToolRouter<BayesServer>,
}

/// Request parameters for the estimate tool.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct EstimateRequest {
    #[schemars(description = "The hypothesis to evaluate (at least 10 characters)")]
    pub hypothesis: String,

    #[schemars(description = "The evidence bearing on the hypothesis (at least 10 characters)")]
    pub evidence: String,
}

/// Request parameters for the edit tool.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct EditRequest {
    #[schemars(description = "Which input to set: prior, likelihood or alt-likelihood")]
    pub field: ProbabilityField,

    #[schemars(description = "New probability; clamped into [0, 1]")]
    pub value: f64,
}

/// Request parameters for the drag tool.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DragRequest {
    #[schemars(description = "Panel group that was resized: hypothesis, likelihood or alt-likelihood")]
    pub group: PanelGroup,

    #[schemars(description = "The two panel sizes after the drag, in percent or as fractions")]
    pub sizes: [f64; 2],
}

/// Response from the flush_cache tool.
#[derive(Debug, Serialize, schemars::JsonSchema)]
pub struct FlushReport {
    /// Number of cached results deleted.
    pub removed: usize,
}

fn mcp_error(code: i32, message: String) -> McpError {
    McpError {
        code: ErrorCode(code),
        message: Cow::from(message),
        data: None,
    }
}

impl From<SessionError> for McpError {
    fn from(error: SessionError) -> Self {
        match error {
            SessionError::Scenario(_) | SessionError::NoScenario => {
                mcp_error(-32602, error.to_string())
            }
            SessionError::Cache(_) => mcp_error(-32603, error.to_string()),
        }
    }
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| mcp_error(-32603, format!("JSON serialization failed: {}", e)))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[tool_router]
impl BayesServer {
    pub fn new(workbench: ProductionWorkbench) -> Self {
        Self {
            workbench: Arc::new(workbench),
            tool_router: Self::tool_router(),
        }
    }

    /// Estimate prior, likelihood and alternative likelihood with one model
    /// call (or from the cache), derive the posterior, and open an
    /// exploration session over the result.
    #[tool(
        name = "estimate",
        description = "Estimate P(H), P(E|H) and P(E|¬H) for a hypothesis and evidence, derive P(E) and P(H|E) with Bayes' rule, and start exploring the result. Returns the record, quadrant areas, panel layout and derivation steps as JSON."
    )]
    async fn estimate(
        &self,
        Parameters(request): Parameters<EstimateRequest>,
    ) -> Result<CallToolResult, McpError> {
        let view = self
            .workbench
            .estimate(&request.hypothesis, &request.evidence)
            .await?;
        json_result(&view)
    }

    #[tool(
        name = "edit",
        description = "Set one input probability (prior, likelihood or alt-likelihood) of the current exploration and re-derive the marginal and posterior."
    )]
    async fn edit(
        &self,
        Parameters(request): Parameters<EditRequest>,
    ) -> Result<CallToolResult, McpError> {
        json_result(&self.workbench.edit(request.field, request.value)?)
    }

    #[tool(
        name = "drag",
        description = "Apply a resize of one panel group of the probability grid. The hypothesis group sets the prior from its first panel; the likelihood groups set their likelihood from the second (evidence) panel."
    )]
    async fn drag(
        &self,
        Parameters(request): Parameters<DragRequest>,
    ) -> Result<CallToolResult, McpError> {
        json_result(&self.workbench.drag(request.group, request.sizes)?)
    }

    #[tool(
        name = "reset",
        description = "Discard all edits and restore the probabilities as estimated."
    )]
    async fn reset(&self) -> Result<CallToolResult, McpError> {
        json_result(&self.workbench.reset()?)
    }

    #[tool(name = "view", description = "Show the current exploration state without changing it.")]
    async fn view(&self) -> Result<CallToolResult, McpError> {
        json_result(&self.workbench.view()?)
    }

    #[tool(
        name = "list_scenarios",
        description = "List previously estimated hypothesis/evidence pairs from the cache, plus built-in examples."
    )]
    async fn list_scenarios(&self) -> Result<CallToolResult, McpError> {
        json_result(&self.workbench.list_scenarios().await?)
    }

    #[tool(
        name = "flush_cache",
        description = "Delete every cached estimation result. The next estimate for any scenario calls the model again."
    )]
    async fn flush_cache(&self) -> Result<CallToolResult, McpError> {
        let removed = self.workbench.flush_cache().await?;
        json_result(&FlushReport { removed })
    }
}

#[tool_handler]
impl ServerHandler for BayesServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "bayesgpt".into(),
                version: env!("CARGO_PKG_VERSION").into(),
            },
            instructions: Some(
                "Bayesian belief updates with LLM-estimated inputs. \
                 Call estimate with a hypothesis and evidence, then use edit, drag \
                 and reset to explore how the posterior responds."
                    .to_string(),
            ),
        }
    }
}
