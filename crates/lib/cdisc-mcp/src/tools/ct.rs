use cdisc_core::library::ct::CodelistLookup;
use cdisc_core::{CtStandard, HeaderOverrides, LibrarySource, MatchMode};
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

/// Parameters for resolving the latest CT version of a standard.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CtLatestVersionParams {
    /// CDISC standard (SDTM, ADAM, CDASH, ...). Defaults to SDTM.
    pub standard: Option<String>,
    pub headers: Option<HeaderOverrides>,
}

/// Parameters for fetching a single codelist with its terms.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CodelistParams {
    /// Codelist submission value (e.g. AGEU) or concept code (e.g. C66781).
    pub codelist_value: String,
    /// Match by 'ID' or 'CodelistCode'. Defaults to 'ID'.
    pub codelist_type: Option<String>,
    /// CDISC standard (SDTM, ADAM, CDASH, ...). Defaults to SDTM.
    pub standard: Option<String>,
    /// CT version in YYYY-MM-DD format. Latest when omitted.
    pub version: Option<String>,
    pub headers: Option<HeaderOverrides>,
}

/// Parameters for listing every codelist in a CT package.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct PackageCodelistsParams {
    /// CDISC standard (SDTM, ADAM, CDASH, ...). Defaults to SDTM.
    pub standard: Option<String>,
    /// CT version in YYYY-MM-DD format. Latest when omitted.
    pub version: Option<String>,
    pub headers: Option<HeaderOverrides>,
}

fn parse_standard(given: Option<&str>) -> Result<CtStandard, cdisc_core::LibraryError> {
    given.unwrap_or("SDTM").parse()
}

#[tool_router(router = tool_router_ct, vis = "pub")]
impl<S: LibrarySource> CdiscMcp<S> {
    #[tool(
        description = "Get the latest Controlled Terminology version for a CDISC standard (SDTM, ADAM, CDASH, ...)."
    )]
    async fn get_ct_latest_version(
        &self,
        Parameters(params): Parameters<CtLatestVersionParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let standard = match parse_standard(params.standard.as_deref()) {
            Ok(standard) => standard,
            Err(err) => return helpers::failure(&err, &[("standard", json!(params.standard))]),
        };
        match self
            .library()
            .latest_ct_version(standard, params.headers.as_ref())
            .await
        {
            Ok(versions) => helpers::record(json!({
                "standard": standard.as_str(),
                "latest_version": versions.latest,
                "display_version": versions.latest,
                "all_versions": versions.all,
                "message": format!("Latest {standard} CT version is {}", versions.latest),
            })),
            Err(err) => helpers::failure(&err, &[("standard", json!(standard.as_str()))]),
        }
    }

    #[tool(
        description = "Retrieve a CDISC Controlled Terminology codelist with all terms and metadata. Match by submission value (codelist_type='ID') or concept code ('CodelistCode')."
    )]
    async fn get_cdisc_codelist(
        &self,
        Parameters(params): Parameters<CodelistParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let context = |version: &Option<String>| {
            vec![
                ("codelist_value", json!(params.codelist_value)),
                ("standard", json!(params.standard)),
                (
                    "version",
                    json!(version.as_deref().unwrap_or("auto-detect")),
                ),
            ]
        };
        let standard = match parse_standard(params.standard.as_deref()) {
            Ok(standard) => standard,
            Err(err) => return helpers::failure(&err, &context(&params.version)),
        };
        let mode = match params.codelist_type.as_deref().unwrap_or("ID").parse::<MatchMode>() {
            Ok(mode) => mode,
            Err(err) => return helpers::failure(&err, &context(&params.version)),
        };
        match self
            .library()
            .find_codelist(
                &params.codelist_value,
                mode,
                standard,
                params.version.as_deref(),
                params.headers.as_ref(),
            )
            .await
        {
            Ok(CodelistLookup::Found(detail)) => {
                Ok(CallToolResult::success(vec![Content::json(&*detail)?]))
            }
            Ok(CodelistLookup::Missing {
                standard,
                version,
                match_mode,
            }) => helpers::warning(
                format!(
                    "The provided Codelist Value '{}' does not exist in the {standard} Controlled Terminology version {version}",
                    params.codelist_value
                ),
                "Please check if your value is correct or if it exists in the specified standard",
                &[
                    ("standard", json!(standard.as_str())),
                    ("version", json!(version)),
                    ("codelist_type", json!(match_mode.as_str())),
                ],
            ),
            Err(err) => helpers::failure(&err, &context(&params.version)),
        }
    }

    #[tool(
        description = "List all codelists available in a CDISC Controlled Terminology package."
    )]
    async fn get_ct_package_codelists(
        &self,
        Parameters(params): Parameters<PackageCodelistsParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let standard = match parse_standard(params.standard.as_deref()) {
            Ok(standard) => standard,
            Err(err) => return helpers::failure(&err, &[("standard", json!(params.standard))]),
        };
        match self
            .library()
            .package_codelists(standard, params.version.as_deref(), params.headers.as_ref())
            .await
        {
            Ok(package) => helpers::record(json!({
                "standard": package.standard.as_str(),
                "version": package.version,
                "codelist_count": package.codelists.len(),
                "codelists": package.codelists,
            })),
            Err(err) => helpers::failure(
                &err,
                &[
                    ("standard", json!(standard.as_str())),
                    (
                        "version",
                        json!(params.version.as_deref().unwrap_or("auto-detect")),
                    ),
                ],
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;
    use cdisc_core::{HeaderOverrides, LibrarySource, SourceError};
    use rmcp::handler::server::wrapper::Parameters;
    use rmcp::model::CallToolResult;
    use serde_json::{Value, json};

    use super::CodelistParams;
    use crate::CdiscMcp;

    struct FakeSource {
        docs: HashMap<String, Value>,
    }

    #[async_trait]
    impl LibrarySource for FakeSource {
        async fn get_json(
            &self,
            path: &str,
            _headers: Option<&HeaderOverrides>,
        ) -> Result<Value, SourceError> {
            self.docs.get(path).cloned().ok_or(SourceError::Http {
                url: path.to_string(),
                status: 404,
            })
        }
    }

    fn server_with_sdtm_package() -> CdiscMcp<FakeSource> {
        let mut docs = HashMap::new();
        docs.insert(
            "/mdr/ct/packages".to_string(),
            json!({
                "_links": {
                    "packages": [{"href": "/mdr/ct/packages/sdtmct-2025-03-25"}]
                }
            }),
        );
        docs.insert(
            "/mdr/ct/packages/sdtmct-2025-03-25".to_string(),
            json!({
                "codelists": [{
                    "submissionValue": "AGEU",
                    "conceptId": "C66781",
                    "name": "Age Unit",
                    "extensible": "Yes",
                    "terms": []
                }]
            }),
        );
        CdiscMcp::new(FakeSource { docs })
    }

    fn codelist_params(value: &str, standard: Option<&str>) -> Parameters<CodelistParams> {
        Parameters(CodelistParams {
            codelist_value: value.to_string(),
            codelist_type: None,
            standard: standard.map(str::to_string),
            version: None,
            headers: None,
        })
    }

    /// Records cross the tool boundary as JSON text content; parse it back.
    fn record_of(result: &CallToolResult) -> Value {
        let raw = serde_json::to_value(result).expect("tool results serialize");
        let text = raw["content"][0]["text"]
            .as_str()
            .expect("record content should be text");
        serde_json::from_str(text).expect("record payload should be JSON")
    }

    #[tokio::test]
    async fn codelist_miss_returns_a_warning_record_not_an_error_record() {
        let server = server_with_sdtm_package();
        let result = server
            .get_cdisc_codelist(codelist_params("NOPE", None))
            .await
            .expect("a miss comes back as a record, not a raised error");

        let record = record_of(&result);
        assert!(record.get("warning").is_some());
        assert!(record.get("error").is_none());
        assert_eq!(record["standard"], "SDTM");
        assert_eq!(record["version"], "2025-03-25");
        assert_eq!(record["codelist_type"], "ID");
    }

    #[tokio::test]
    async fn invalid_standard_returns_a_validation_error_record() {
        let server = server_with_sdtm_package();
        let result = server
            .get_cdisc_codelist(codelist_params("AGEU", Some("SDTMX")))
            .await
            .expect("validation failures come back as records");

        let record = record_of(&result);
        assert!(record.get("error").is_some());
        assert_eq!(record["error_type"], "validation");
        assert!(record.get("warning").is_none());
    }

    #[tokio::test]
    async fn found_codelist_record_carries_neither_warning_nor_error() {
        let server = server_with_sdtm_package();
        let result = server
            .get_cdisc_codelist(codelist_params("AGEU", None))
            .await
            .expect("lookup should succeed");

        let record = record_of(&result);
        assert!(record.get("warning").is_none());
        assert!(record.get("error").is_none());
        assert_eq!(record["codelist_info"]["id"], "AGEU");
    }
}
