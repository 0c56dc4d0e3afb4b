use cdisc_core::{HeaderOverrides, LibrarySource};
use rmcp::{
    ErrorData,
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Content},
    schemars,
    tool,
    tool_router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::CdiscMcp;
use crate::helpers;

/// Parameters for searching the CDISC Library.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SearchParams {
    /// Search text (variable names, domains, concepts, codelists, ...).
    pub query: String,
    /// Maximum hits to return. Defaults to 10, capped at 100.
    pub limit: Option<usize>,
    pub headers: Option<HeaderOverrides>,
}

#[tool_router(router = tool_router_search, vis = "pub")]
impl<S: LibrarySource> CdiscMcp<S> {
    #[tool(
        description = "Full-text search across the CDISC Library (variables, domains, codelists, biomedical concepts)."
    )]
    async fn search_cdisc_library(
        &self,
        Parameters(params): Parameters<SearchParams>,
    ) -> Result<CallToolResult, ErrorData> {
        match self
            .library()
            .search(&params.query, params.limit, params.headers.as_ref())
            .await
        {
            Ok(results) => Ok(CallToolResult::success(vec![Content::json(&results)?])),
            Err(err) => helpers::failure(&err, &[("query", json!(params.query))]),
        }
    }
}
