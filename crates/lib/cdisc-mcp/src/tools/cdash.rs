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
pub struct CdashLatestVersionParams {
    pub headers: Option<HeaderOverrides>,
}

/// Parameters for listing CDASH-IG domains.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CdashDomainsParams {
    /// CDASH-IG version ("2-1" or "2.1"). Latest when omitted.
    pub cdashig_version: Option<String>,
    pub headers: Option<HeaderOverrides>,
}

/// Parameters for fetching a CDASH domain with its collection fields.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CdashDomainStructureParams {
    /// CDASH domain code (e.g. DM, AE, CM, VS).
    pub domain: String,
    /// CDASH-IG version ("2-1" or "2.1"). Latest when omitted.
    pub cdashig_version: Option<String>,
    pub headers: Option<HeaderOverrides>,
}

/// Parameters for fetching one CDASH collection field's metadata.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CdashFieldDetailsParams {
    /// Collection field name (e.g. CMTRT, AETERM, STUDYID).
    pub field: String,
    /// CDASH domain code. Common domains are scanned when omitted.
    pub domain: Option<String>,
    /// CDASH-IG version ("2-1" or "2.1"). Latest when omitted.
    pub cdashig_version: Option<String>,
    pub headers: Option<HeaderOverrides>,
}

#[tool_router(router = tool_router_cdash, vis = "pub")]
impl<S: LibrarySource> CdiscMcp<S> {
    #[tool(description = "Get the latest CDASH-IG version from the CDISC Library.")]
    async fn get_cdashig_latest_version(
        &self,
        Parameters(params): Parameters<CdashLatestVersionParams>,
    ) -> Result<CallToolResult, ErrorData> {
        match self
            .library()
            .latest_ig_version(IgProduct::Cdashig, params.headers.as_ref())
            .await
        {
            Ok(versions) => helpers::record(json!({
                "latest_version": versions.latest,
                "display_version": display_version(&versions.latest),
                "version_count": versions.all.len(),
                "all_versions": versions.all,
            })),
            Err(err) => helpers::failure(&err, &[]),
        }
    }

    #[tool(description = "List the data-collection domains of a CDASH-IG version.")]
    async fn get_cdashig_domains(
        &self,
        Parameters(params): Parameters<CdashDomainsParams>,
    ) -> Result<CallToolResult, ErrorData> {
        match self
            .library()
            .cdash_domains(params.cdashig_version.as_deref(), params.headers.as_ref())
            .await
        {
            Ok((version, domains)) => helpers::record(json!({
                "cdashig_version": version,
                "domain_count": domains.len(),
                "domains": domains,
            })),
            Err(err) => {
                helpers::failure(&err, &[("cdashig_version", json!(params.cdashig_version))])
            }
        }
    }

    #[tool(
        description = "Get the complete structure of a CDASH domain with all collection fields."
    )]
    async fn get_cdashig_domain_structure(
        &self,
        Parameters(params): Parameters<CdashDomainStructureParams>,
    ) -> Result<CallToolResult, ErrorData> {
        match self
            .library()
            .cdash_domain_structure(
                &params.domain,
                params.cdashig_version.as_deref(),
                params.headers.as_ref(),
            )
            .await
        {
            Ok(structure) => helpers::record(json!({
                "domain": structure.domain,
                "label": structure.label,
                "description": structure.description,
                "cdashig_version": structure.version,
                "field_count": structure.fields.len(),
                "fields": structure.fields,
            })),
            Err(err) => helpers::failure(
                &err,
                &[
                    ("domain", json!(params.domain.to_uppercase())),
                    ("cdashig_version", json!(params.cdashig_version)),
                ],
            ),
        }
    }

    #[tool(
        description = "Get detailed metadata for one CDASH collection field (prompt, question text, datatype, codelist). Scans common domains when no domain is given."
    )]
    async fn get_cdashig_field_details(
        &self,
        Parameters(params): Parameters<CdashFieldDetailsParams>,
    ) -> Result<CallToolResult, ErrorData> {
        match self
            .library()
            .cdash_field_details(
                &params.field,
                params.domain.as_deref(),
                params.cdashig_version.as_deref(),
                params.headers.as_ref(),
            )
            .await
        {
            Ok(detail) => helpers::record(json!({
                "field": detail.field,
                "label": detail.label,
                "prompt": detail.prompt,
                "question_text": detail.question_text,
                "datatype": detail.datatype,
                "core": detail.core,
                "ordinal": detail.ordinal,
                "domain": detail.domain,
                "cdashig_version": detail.version,
                "codelist": detail.codelist,
            })),
            Err(err) => helpers::failure(
                &err,
                &[
                    ("field", json!(params.field.to_uppercase())),
                    ("domain", json!(params.domain)),
                    ("cdashig_version", json!(params.cdashig_version)),
                ],
            ),
        }
    }
}
