use cdisc_core::{HeaderOverrides, LibrarySource};
use rmcp::{
    ErrorData,
    handler::server::wrapper::Parameters,
    model::CallToolResult,
    schemars,
    tool,
    tool_router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::CdiscMcp;
use crate::helpers;

/// Parameters for fetching an ADaM data structure.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct AdamDatasetStructureParams {
    /// ADaM dataset name (e.g. ADSL, OCCDS, BDS).
    pub dataset: String,
    /// ADaMIG version ("1-3" or "1.3"). Defaults to the last published one.
    pub adamig_version: Option<String>,
    pub headers: Option<HeaderOverrides>,
}

/// Parameters for fetching one ADaM variable's metadata.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct AdamVariableDetailsParams {
    /// ADaM variable name (e.g. TRT01P, PARAMCD, AVAL).
    pub adam_variable: String,
    /// ADaMIG version ("1-3" or "1.3"). Defaults to the last published one.
    pub adamig_version: Option<String>,
    pub headers: Option<HeaderOverrides>,
}

#[tool_router(router = tool_router_adam, vis = "pub")]
impl<S: LibrarySource> CdiscMcp<S> {
    #[tool(
        description = "Get the structure and flattened variable list of an ADaM dataset (e.g. ADSL)."
    )]
    async fn get_adam_dataset_structure(
        &self,
        Parameters(params): Parameters<AdamDatasetStructureParams>,
    ) -> Result<CallToolResult, ErrorData> {
        match self
            .library()
            .adam_structure(
                &params.dataset,
                params.adamig_version.as_deref(),
                params.headers.as_ref(),
            )
            .await
        {
            Ok(structure) => helpers::record(json!({
                "dataset": structure.dataset,
                "label": structure.label,
                "description": structure.description,
                "adamig_version": structure.version,
                "variable_count": structure.variables.len(),
                "variables": structure.variables,
            })),
            Err(err) => helpers::failure(
                &err,
                &[
                    ("dataset", json!(params.dataset.to_uppercase())),
                    ("adamig_version", json!(params.adamig_version)),
                ],
            ),
        }
    }

    #[tool(
        description = "Get metadata for one ADaM variable (label, datatype, core, codelists). Scans the release's data structures to find it."
    )]
    async fn get_adam_variable_details(
        &self,
        Parameters(params): Parameters<AdamVariableDetailsParams>,
    ) -> Result<CallToolResult, ErrorData> {
        match self
            .library()
            .adam_variable_details(
                &params.adam_variable,
                params.adamig_version.as_deref(),
                params.headers.as_ref(),
            )
            .await
        {
            Ok(detail) => helpers::record(json!({
                "variable": detail.variable,
                "label": detail.label,
                "datatype": detail.datatype,
                "core": detail.core,
                "description": detail.description,
                "dataset": detail.dataset,
                "adamig_version": detail.version,
                "codelist_links": detail.codelist_links,
                "codelists": detail.codelists,
            })),
            Err(err) => helpers::failure(
                &err,
                &[
                    ("variable", json!(params.adam_variable.to_uppercase())),
                    ("adamig_version", json!(params.adamig_version)),
                ],
            ),
        }
    }
}
