use cdisc_core::library::version::display_version;
use cdisc_core::{HeaderOverrides, IgProduct, LibrarySource};
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

/// Parameters carrying only optional header overrides.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SendLatestVersionParams {
    pub headers: Option<HeaderOverrides>,
}

/// Parameters for listing SEND domain classes.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SendClassesParams {
    /// SEND-IG version ("3-1-1" or "3.1.1"). Latest when omitted.
    pub sendig_version: Option<String>,
    pub headers: Option<HeaderOverrides>,
}

/// Parameters for fetching a complete SEND domain structure.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SendDomainStructureParams {
    /// SEND domain code (e.g. DM, BW, MI, PC).
    pub domain: String,
    /// SEND-IG version ("3-1-1" or "3.1.1"). Latest when omitted.
    pub sendig_version: Option<String>,
    /// Resolve full codelist terms for each variable. Defaults to false.
    pub include_codelists: Option<bool>,
    pub headers: Option<HeaderOverrides>,
}

/// Parameters for fetching one SEND variable's metadata.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SendVariableDetailsParams {
    /// Variable name (e.g. USUBJID, LBTESTCD, BWSTRESN).
    pub variable: String,
    /// SEND domain code. Common domains are scanned when omitted.
    pub domain: Option<String>,
    /// SEND-IG version ("3-1-1" or "3.1.1"). Latest when omitted.
    pub sendig_version: Option<String>,
    /// Resolve the variable's codelist terms. Defaults to true.
    pub include_codelist: Option<bool>,
    pub headers: Option<HeaderOverrides>,
}

#[tool_router(router = tool_router_send, vis = "pub")]
impl<S: LibrarySource> CdiscMcp<S> {
    #[tool(description = "Get the latest SEND-IG version from the CDISC Library.")]
    async fn get_sendig_latest_version(
        &self,
        Parameters(params): Parameters<SendLatestVersionParams>,
    ) -> Result<CallToolResult, ErrorData> {
        match self
            .library()
            .latest_ig_version(IgProduct::Sendig, params.headers.as_ref())
            .await
        {
            Ok(versions) => helpers::record(json!({
                "latest_version": versions.latest,
                "display_version": display_version(&versions.latest),
                "total_versions": versions.all.len(),
                "all_versions": versions.all,
            })),
            Err(err) => helpers::failure(&err, &[]),
        }
    }

    #[tool(description = "Get SEND domain classes for a SEND-IG version.")]
    async fn get_sendig_classes(
        &self,
        Parameters(params): Parameters<SendClassesParams>,
    ) -> Result<CallToolResult, ErrorData> {
        match self
            .library()
            .ig_classes(
                IgProduct::Sendig,
                params.sendig_version.as_deref(),
                params.headers.as_ref(),
            )
            .await
        {
            Ok(classes) => helpers::record(json!({
                "sendig_version": classes.version,
                "class_count": classes.classes.len(),
                "classes": classes.classes,
            })),
            Err(err) => {
                helpers::failure(&err, &[("sendig_version", json!(params.sendig_version))])
            }
        }
    }

    #[tool(
        description = "Get the complete structure of a SEND domain with all variables, optionally enriched with codelist terms."
    )]
    async fn get_sendig_domain_structure(
        &self,
        Parameters(params): Parameters<SendDomainStructureParams>,
    ) -> Result<CallToolResult, ErrorData> {
        match self
            .library()
            .dataset_structure(
                IgProduct::Sendig,
                &params.domain,
                params.sendig_version.as_deref(),
                params.include_codelists.unwrap_or(false),
                params.headers.as_ref(),
            )
            .await
        {
            Ok(structure) => helpers::record(json!({
                "domain": structure.domain,
                "label": structure.label,
                "description": structure.description,
                "class": structure.class,
                "sendig_version": structure.version,
                "variable_count": structure.variables.len(),
                "variables": structure.variables,
            })),
            Err(err) => helpers::failure(
                &err,
                &[
                    ("domain", json!(params.domain.to_uppercase())),
                    ("sendig_version", json!(params.sendig_version)),
                ],
            ),
        }
    }

    #[tool(
        description = "Get detailed metadata for one SEND variable. Scans common domains when no domain is given."
    )]
    async fn get_sendig_variable_details(
        &self,
        Parameters(params): Parameters<SendVariableDetailsParams>,
    ) -> Result<CallToolResult, ErrorData> {
        match self
            .library()
            .dataset_variable_details(
                IgProduct::Sendig,
                &params.variable,
                params.domain.as_deref(),
                params.sendig_version.as_deref(),
                params.include_codelist.unwrap_or(true),
                params.headers.as_ref(),
            )
            .await
        {
            Ok(detail) => helpers::record(json!({
                "variable": detail.variable,
                "label": detail.label,
                "datatype": detail.datatype,
                "core": detail.core,
                "role": detail.role,
                "ordinal": detail.ordinal,
                "length": detail.length,
                "domain": detail.domain,
                "sendig_version": detail.version,
                "codelist": detail.codelist,
            })),
            Err(err) => helpers::failure(
                &err,
                &[
                    ("variable", json!(params.variable.to_uppercase())),
                    ("domain", json!(params.domain)),
                    ("sendig_version", json!(params.sendig_version)),
                ],
            ),
        }
    }
}
