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

/// Parameters carrying only optional header overrides.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct BcListParams {
    pub headers: Option<HeaderOverrides>,
}

/// Parameters addressing one biomedical concept.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct BcConceptParams {
    /// Biomedical concept id (e.g. C105585).
    pub concept_id: String,
    pub headers: Option<HeaderOverrides>,
}

/// Parameters addressing one biomedical concept inside a package.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct BcForPackageParams {
    /// Package id to read from.
    pub package: String,
    /// Biomedical concept id (e.g. C105585).
    pub biomedicalconcept_id: String,
    pub headers: Option<HeaderOverrides>,
}

/// Parameters addressing one package.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct BcPackageParams {
    /// Package id to read from.
    pub package: String,
    pub headers: Option<HeaderOverrides>,
}

/// Parameters for listing specializations of a biomedical concept.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct BcSpecializationsParams {
    /// Biomedical concept id to list dataset specializations for.
    pub biomedicalconcept: String,
    pub headers: Option<HeaderOverrides>,
}

/// Parameters for listing SDTM dataset specializations of a domain.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SpecializationDomainParams {
    /// SDTM domain code (e.g. VS, LB).
    pub domain: String,
    pub headers: Option<HeaderOverrides>,
}

/// Parameters addressing one SDTM dataset specialization.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SpecializationParams {
    /// Dataset specialization id (e.g. SYSBP).
    pub dataset_specialization_id: String,
    pub headers: Option<HeaderOverrides>,
}

/// Parameters addressing one specialization inside a package.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SpecializationForPackageParams {
    /// Package id to read from.
    pub package: String,
    /// Dataset specialization id (e.g. SYSBP).
    pub datasetspecialization: String,
    pub headers: Option<HeaderOverrides>,
}

#[tool_router(router = tool_router_bc, vis = "pub")]
impl<S: LibrarySource> CdiscMcp<S> {
    #[tool(description = "Get the latest biomedical concept list from the CDISC Library.")]
    async fn get_latest_bc_list(
        &self,
        Parameters(params): Parameters<BcListParams>,
    ) -> Result<CallToolResult, ErrorData> {
        match self.library().bc_list(params.headers.as_ref()).await {
            Ok(doc) => helpers::record(doc),
            Err(err) => helpers::failure(&err, &[]),
        }
    }

    #[tool(description = "Get the latest biomedical concept categories.")]
    async fn get_latest_bc_cat(
        &self,
        Parameters(params): Parameters<BcListParams>,
    ) -> Result<CallToolResult, ErrorData> {
        match self.library().bc_categories(params.headers.as_ref()).await {
            Ok(doc) => helpers::record(doc),
            Err(err) => helpers::failure(&err, &[]),
        }
    }

    #[tool(description = "Get the latest revision of one biomedical concept by concept id.")]
    async fn get_latest_bc(
        &self,
        Parameters(params): Parameters<BcConceptParams>,
    ) -> Result<CallToolResult, ErrorData> {
        match self
            .library()
            .bc_latest(&params.concept_id, params.headers.as_ref())
            .await
        {
            Ok(doc) => helpers::record(doc),
            Err(err) => helpers::failure(&err, &[("concept_id", json!(params.concept_id))]),
        }
    }

    #[tool(description = "Get the biomedical concept package list.")]
    async fn get_bc_package_list(
        &self,
        Parameters(params): Parameters<BcListParams>,
    ) -> Result<CallToolResult, ErrorData> {
        match self.library().bc_packages(params.headers.as_ref()).await {
            Ok(doc) => helpers::record(doc),
            Err(err) => helpers::failure(&err, &[]),
        }
    }

    #[tool(description = "Get one biomedical concept from a specific package.")]
    async fn get_bc_for_package(
        &self,
        Parameters(params): Parameters<BcForPackageParams>,
    ) -> Result<CallToolResult, ErrorData> {
        match self
            .library()
            .bc_for_package(
                &params.package,
                &params.biomedicalconcept_id,
                params.headers.as_ref(),
            )
            .await
        {
            Ok(doc) => helpers::record(doc),
            Err(err) => helpers::failure(
                &err,
                &[
                    ("package", json!(params.package)),
                    ("concept_id", json!(params.biomedicalconcept_id)),
                ],
            ),
        }
    }

    #[tool(description = "Get the biomedical concept list of a specific package.")]
    async fn get_bc_list_for_package(
        &self,
        Parameters(params): Parameters<BcPackageParams>,
    ) -> Result<CallToolResult, ErrorData> {
        match self
            .library()
            .bc_list_for_package(&params.package, params.headers.as_ref())
            .await
        {
            Ok(doc) => helpers::record(doc),
            Err(err) => helpers::failure(&err, &[("package", json!(params.package))]),
        }
    }

    #[tool(
        description = "Get the latest dataset specializations derived from one biomedical concept."
    )]
    async fn get_latest_bc_dataset_specializations(
        &self,
        Parameters(params): Parameters<BcSpecializationsParams>,
    ) -> Result<CallToolResult, ErrorData> {
        match self
            .library()
            .specializations_for_bc(&params.biomedicalconcept, params.headers.as_ref())
            .await
        {
            Ok(doc) => helpers::record(doc),
            Err(err) => helpers::failure(
                &err,
                &[("biomedicalconcept", json!(params.biomedicalconcept))],
            ),
        }
    }

    #[tool(description = "Get the latest SDTM dataset specializations for a specific domain.")]
    async fn get_latest_sdtm_dataset_specializations_list(
        &self,
        Parameters(params): Parameters<SpecializationDomainParams>,
    ) -> Result<CallToolResult, ErrorData> {
        match self
            .library()
            .sdtm_specializations_for_domain(&params.domain, params.headers.as_ref())
            .await
        {
            Ok(doc) => helpers::record(doc),
            Err(err) => {
                helpers::failure(&err, &[("domain", json!(params.domain.to_uppercase()))])
            }
        }
    }

    #[tool(description = "Get the latest SDTM dataset specialization by specialization id.")]
    async fn get_latest_sdtm_specialization(
        &self,
        Parameters(params): Parameters<SpecializationParams>,
    ) -> Result<CallToolResult, ErrorData> {
        match self
            .library()
            .latest_sdtm_specialization(
                &params.dataset_specialization_id,
                params.headers.as_ref(),
            )
            .await
        {
            Ok(doc) => helpers::record(doc),
            Err(err) => helpers::failure(
                &err,
                &[(
                    "dataset_specialization_id",
                    json!(params.dataset_specialization_id),
                )],
            ),
        }
    }

    #[tool(description = "List the domains that have SDTM dataset specializations.")]
    async fn get_sdtm_dataset_specialization_domain_list(
        &self,
        Parameters(params): Parameters<BcListParams>,
    ) -> Result<CallToolResult, ErrorData> {
        match self
            .library()
            .sdtm_specialization_domains(params.headers.as_ref())
            .await
        {
            Ok(doc) => helpers::record(doc),
            Err(err) => helpers::failure(&err, &[]),
        }
    }

    #[tool(description = "Get the SDTM dataset specialization package list.")]
    async fn get_sdtm_dataset_specialization_package_list(
        &self,
        Parameters(params): Parameters<BcListParams>,
    ) -> Result<CallToolResult, ErrorData> {
        match self
            .library()
            .sdtm_specialization_packages(params.headers.as_ref())
            .await
        {
            Ok(doc) => helpers::record(doc),
            Err(err) => helpers::failure(&err, &[]),
        }
    }

    #[tool(description = "Get one SDTM dataset specialization from a specific package.")]
    async fn get_sdtm_dataset_specialization_for_package(
        &self,
        Parameters(params): Parameters<SpecializationForPackageParams>,
    ) -> Result<CallToolResult, ErrorData> {
        match self
            .library()
            .sdtm_specialization_for_package(
                &params.package,
                &params.datasetspecialization,
                params.headers.as_ref(),
            )
            .await
        {
            Ok(doc) => helpers::record(doc),
            Err(err) => helpers::failure(
                &err,
                &[
                    ("package", json!(params.package)),
                    (
                        "datasetspecialization",
                        json!(params.datasetspecialization),
                    ),
                ],
            ),
        }
    }

    #[tool(description = "List the SDTM dataset specializations of a specific package.")]
    async fn get_sdtm_dataset_specialization_list_for_package(
        &self,
        Parameters(params): Parameters<BcPackageParams>,
    ) -> Result<CallToolResult, ErrorData> {
        match self
            .library()
            .sdtm_specializations_for_package(&params.package, params.headers.as_ref())
            .await
        {
            Ok(doc) => helpers::record(doc),
            Err(err) => helpers::failure(&err, &[("package", json!(params.package))]),
        }
    }
}
