//! MCP server implementation for cdisc-mcp.
//!
//! This crate wires the CDISC Library lookups into rmcp tool handlers and
//! exposes the MCP-facing tool surface for standards metadata retrieval.

mod helpers;
mod tools;
pub mod server;

use std::sync::Arc;

use cdisc_core::{CdiscLibrary, LibrarySource};
use rmcp::{
    ErrorData,
    ServerHandler,
    handler::server::tool::ToolRouter,
    tool,
    tool_handler,
    tool_router,
};
use rmcp::model::{CallToolResult, Content, ServerCapabilities, ServerInfo};

const SERVER_INSTRUCTIONS: &str = r"cdisc-mcp provides MCP tools for retrieving CDISC standards metadata from the CDISC Library.

Coverage:
1. Controlled terminology: `get_ct_latest_version`, `get_cdisc_codelist`, `get_ct_package_codelists`.
   Codelists can be matched by submission value (`codelist_type` = 'ID') or concept code ('CodelistCode').
2. SDTM-IG: `get_sdtm_latest_version`, `get_sdtm_classes`, `get_sdtm_domain_structure`, `get_sdtm_variable_details`.
3. SEND-IG: `get_sendig_latest_version`, `get_sendig_classes`, `get_sendig_domain_structure`, `get_sendig_variable_details`.
4. CDASH-IG: `get_cdashig_latest_version`, `get_cdashig_domains`, `get_cdashig_domain_structure`, `get_cdashig_field_details`.
5. ADaM: `get_adam_dataset_structure`, `get_adam_variable_details`.
6. Biomedical concepts and SDTM dataset specializations: `get_latest_bc_list`, `get_latest_bc`,
   `get_bc_package_list`, `get_latest_sdtm_specialization`, and related package-pinned lookups.
7. Full-text search: `search_cdisc_library`.

Notes:
- Versions accept both dot and hyphen forms ('3.4' and '3-4'); omit the version to use the latest published one.
- Variable and field lookups accept an optional domain; without one, common domains are scanned in priority order.
- Failures come back as records: `error` plus `error_type` for failures, `warning` for lookups that found nothing.
- `health` returns `ok`.";

/// MCP server wrapper around the library lookups and tool routers.
pub struct CdiscMcp<S: LibrarySource> {
    tool_router: ToolRouter<Self>,
    library: Arc<CdiscLibrary<S>>,
}

impl<S: LibrarySource> Clone for CdiscMcp<S> {
    fn clone(&self) -> Self {
        Self {
            tool_router: self.tool_router.clone(),
            library: Arc::clone(&self.library),
        }
    }
}

impl<S: LibrarySource> CdiscMcp<S> {
    /// Creates a new server owning its library source.
    #[must_use]
    pub fn new(source: S) -> Self {
        Self::with_library(Arc::new(CdiscLibrary::new(source)))
    }

    /// Creates a new server using a shared library handle.
    #[must_use]
    pub fn with_library(library: Arc<CdiscLibrary<S>>) -> Self {
        let tool_router = Self::tool_router_core()
            + Self::tool_router_ct()
            + Self::tool_router_sdtm()
            + Self::tool_router_send()
            + Self::tool_router_cdash()
            + Self::tool_router_adam()
            + Self::tool_router_bc()
            + Self::tool_router_search();
        Self {
            tool_router,
            library,
        }
    }

    pub(crate) fn library(&self) -> &CdiscLibrary<S> {
        &self.library
    }
}

#[tool_router(router = tool_router_core, vis = "pub")]
impl<S: LibrarySource> CdiscMcp<S> {
    #[tool(description = "Health check. Returns 'ok'.")]
    async fn health(&self) -> Result<CallToolResult, ErrorData> {
        Ok(CallToolResult::success(vec![Content::text("ok")]))
    }
}

#[tool_handler]
impl<S: LibrarySource> ServerHandler for CdiscMcp<S> {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(SERVER_INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .build(),
            ..Default::default()
        }
    }
}
