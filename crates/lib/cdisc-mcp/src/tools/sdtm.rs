use cdisc_core::library::version::{display_version, normalize_version};
use cdisc_core::{CdiscLibrary, HeaderOverrides, IgProduct, LibrarySource};
use rmcp::{
    ErrorData,
    handler::server::wrapper::Parameters,
    model::CallToolResult,
    schemars,
    tool,
    tool_router,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::warn;

use crate::CdiscMcp;
use crate::helpers;

/// Pinned fallback when the SDTM-IG version listing itself is unreachable.
/// Lookups still run against this release, but results may trail the latest
/// publication; every record produced under the fallback carries a note.
const FALLBACK_VERSION: &str = "3-4";

/// Parameters carrying only optional header overrides.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct LatestVersionParams {
    pub headers: Option<HeaderOverrides>,
}

/// Parameters for listing SDTM domain classes.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SdtmClassesParams {
    /// SDTM-IG version ("3-4" or "3.4"). Latest when omitted.
    pub sdtmig_version: Option<String>,
    pub headers: Option<HeaderOverrides>,
}

/// Parameters for fetching a complete SDTM domain structure.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SdtmDomainStructureParams {
    /// SDTM domain code (e.g. DM, AE, VS, LB).
    pub domain: String,
    /// SDTM-IG version ("3-4" or "3.4"). Latest when omitted.
    pub sdtmig_version: Option<String>,
    /// Resolve full codelist terms for each variable. Defaults to false.
    pub include_codelists: Option<bool>,
    pub headers: Option<HeaderOverrides>,
}

/// Parameters for fetching one SDTM variable's metadata.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SdtmVariableDetailsParams {
    /// Variable name (e.g. USUBJID, AESTDTC, LBORRES).
    pub variable: String,
    /// SDTM domain code. Common domains are scanned when omitted.
    pub domain: Option<String>,
    /// SDTM-IG version ("3-4" or "3.4"). Latest when omitted.
    pub sdtmig_version: Option<String>,
    /// Resolve the variable's codelist terms. Defaults to true.
    pub include_codelist: Option<bool>,
    pub headers: Option<HeaderOverrides>,
}

/// Resolves the SDTM-IG version to query. Returns the version plus whether
/// the pinned fallback had to be used.
async fn resolved_version<S: LibrarySource>(
    library: &CdiscLibrary<S>,
    explicit: Option<&str>,
    headers: Option<&HeaderOverrides>,
) -> (String, bool) {
    match explicit {
        Some(version) => (normalize_version(version), false),
        None => match library.latest_ig_version(IgProduct::Sdtmig, headers).await {
            Ok(versions) => (versions.latest, false),
            Err(err) => {
                warn!(%err, fallback = FALLBACK_VERSION, "SDTM-IG version listing unavailable, using pinned fallback");
                (FALLBACK_VERSION.to_string(), true)
            }
        },
    }
}

/// Stamps the degraded-mode note onto a record when the pinned fallback was
/// used, so dependent lookups carry the same signal as the latest-version
/// tool.
fn noted(mut record: Value, degraded: bool) -> Value {
    if degraded {
        if let Some(fields) = record.as_object_mut() {
            fields.insert(
                "note".to_string(),
                Value::String("Using default version due to API error".to_string()),
            );
        }
    }
    record
}

#[tool_router(router = tool_router_sdtm, vis = "pub")]
impl<S: LibrarySource> CdiscMcp<S> {
    #[tool(
        description = "Get the latest SDTM-IG version. Falls back to a pinned release (with a note) if the listing is unreachable."
    )]
    async fn get_sdtm_latest_version(
        &self,
        Parameters(params): Parameters<LatestVersionParams>,
    ) -> Result<CallToolResult, ErrorData> {
        match self
            .library()
            .latest_ig_version(IgProduct::Sdtmig, params.headers.as_ref())
            .await
        {
            Ok(versions) => helpers::record(json!({
                "latest_version": versions.latest,
                "display_version": display_version(&versions.latest),
                "all_versions": versions.all,
            })),
            Err(err) => {
                warn!(%err, fallback = FALLBACK_VERSION, "SDTM-IG version listing unavailable, using pinned fallback");
                helpers::record(noted(
                    json!({
                        "latest_version": FALLBACK_VERSION,
                        "display_version": display_version(FALLBACK_VERSION),
                        "all_versions": [FALLBACK_VERSION],
                    }),
                    true,
                ))
            }
        }
    }

    #[tool(
        description = "Get SDTM domain classes (Findings, Events, Interventions, ...) for an SDTM-IG version."
    )]
    async fn get_sdtm_classes(
        &self,
        Parameters(params): Parameters<SdtmClassesParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let headers = params.headers.as_ref();
        let (version, degraded) =
            resolved_version(self.library(), params.sdtmig_version.as_deref(), headers).await;
        match self
            .library()
            .ig_classes(IgProduct::Sdtmig, Some(&version), headers)
            .await
        {
            Ok(classes) => helpers::record(noted(
                json!({
                    "sdtmig_version": classes.version,
                    "class_count": classes.classes.len(),
                    "classes": classes.classes,
                }),
                degraded,
            )),
            Err(err) => helpers::failure(&err, &[("sdtmig_version", json!(version))]),
        }
    }

    #[tool(
        description = "Get the complete structure of an SDTM domain with all variables, optionally enriched with codelist terms."
    )]
    async fn get_sdtm_domain_structure(
        &self,
        Parameters(params): Parameters<SdtmDomainStructureParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let headers = params.headers.as_ref();
        let (version, degraded) =
            resolved_version(self.library(), params.sdtmig_version.as_deref(), headers).await;
        match self
            .library()
            .dataset_structure(
                IgProduct::Sdtmig,
                &params.domain,
                Some(&version),
                params.include_codelists.unwrap_or(false),
                headers,
            )
            .await
        {
            Ok(structure) => helpers::record(noted(
                json!({
                    "domain": structure.domain,
                    "label": structure.label,
                    "description": structure.description,
                    "class": structure.class,
                    "sdtmig_version": structure.version,
                    "variable_count": structure.variables.len(),
                    "variables": structure.variables,
                }),
                degraded,
            )),
            Err(err) => helpers::failure(
                &err,
                &[
                    ("domain", json!(params.domain.to_uppercase())),
                    ("sdtmig_version", json!(version)),
                ],
            ),
        }
    }

    #[tool(
        description = "Get detailed metadata for one SDTM variable (label, datatype, core, role, codelist). Scans common domains when no domain is given."
    )]
    async fn get_sdtm_variable_details(
        &self,
        Parameters(params): Parameters<SdtmVariableDetailsParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let headers = params.headers.as_ref();
        let (version, degraded) =
            resolved_version(self.library(), params.sdtmig_version.as_deref(), headers).await;
        match self
            .library()
            .dataset_variable_details(
                IgProduct::Sdtmig,
                &params.variable,
                params.domain.as_deref(),
                Some(&version),
                params.include_codelist.unwrap_or(true),
                headers,
            )
            .await
        {
            Ok(detail) => helpers::record(noted(
                json!({
                    "variable": detail.variable,
                    "label": detail.label,
                    "datatype": detail.datatype,
                    "core": detail.core,
                    "role": detail.role,
                    "ordinal": detail.ordinal,
                    "length": detail.length,
                    "domain": detail.domain,
                    "sdtmig_version": detail.version,
                    "codelist": detail.codelist,
                }),
                degraded,
            )),
            Err(err) => helpers::failure(
                &err,
                &[
                    ("variable", json!(params.variable.to_uppercase())),
                    ("domain", json!(params.domain)),
                    ("sdtmig_version", json!(version)),
                ],
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use cdisc_core::SourceError;
    use serde_json::json;

    use super::*;

    struct UnreachableSource;

    #[async_trait]
    impl LibrarySource for UnreachableSource {
        async fn get_json(
            &self,
            path: &str,
            _headers: Option<&HeaderOverrides>,
        ) -> Result<Value, SourceError> {
            Err(SourceError::Http {
                url: path.to_string(),
                status: 503,
            })
        }
    }

    #[tokio::test]
    async fn unreachable_version_listing_falls_back_to_the_pinned_release() {
        let library = CdiscLibrary::new(UnreachableSource);

        let (version, degraded) = resolved_version(&library, None, None).await;
        assert_eq!(version, FALLBACK_VERSION);
        assert!(degraded);

        // An explicit version never degrades, even with the listing down.
        let (version, degraded) = resolved_version(&library, Some("3.3"), None).await;
        assert_eq!(version, "3-3");
        assert!(!degraded);
    }

    #[test]
    fn degraded_records_carry_the_note() {
        let record = noted(json!({"sdtmig_version": "3-4"}), true);
        assert_eq!(record["note"], "Using default version due to API error");

        let record = noted(json!({"sdtmig_version": "3-10"}), false);
        assert!(record.get("note").is_none());
    }
}
