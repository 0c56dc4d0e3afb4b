//! Biomedical concepts and SDTM dataset specializations (Cosmos v2).
//!
//! These endpoints already return flat, self-describing documents, so the
//! operations are validated passthroughs rather than flatteners.

use serde_json::Value;

use crate::client::{HeaderOverrides, LibrarySource, query_string};

use super::{CdiscLibrary, LibraryError};

const BC_ROOT: &str = "/cosmos/v2/mdr/bc";
const SPECIALIZATIONS_ROOT: &str = "/cosmos/v2/mdr/specializations";

fn require<'a>(value: &'a str, name: &'static str) -> Result<&'a str, LibraryError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LibraryError::MissingParameter(name));
    }
    Ok(trimmed)
}

impl<S: LibrarySource> CdiscLibrary<S> {
    /// Latest published biomedical concept list.
    ///
    /// # Errors
    /// Returns fetch failures.
    pub async fn bc_list(
        &self,
        headers: Option<&HeaderOverrides>,
    ) -> Result<Value, LibraryError> {
        let path = format!("{BC_ROOT}/biomedicalconcepts");
        Ok(self.source().get_json(&path, headers).await?)
    }

    /// Latest biomedical concept categories.
    ///
    /// # Errors
    /// Returns fetch failures.
    pub async fn bc_categories(
        &self,
        headers: Option<&HeaderOverrides>,
    ) -> Result<Value, LibraryError> {
        let path = format!("{BC_ROOT}/categories");
        Ok(self.source().get_json(&path, headers).await?)
    }

    /// Latest revision of one biomedical concept.
    ///
    /// # Errors
    /// Returns `MissingParameter` for a blank concept id, plus fetch
    /// failures.
    pub async fn bc_latest(
        &self,
        concept_id: &str,
        headers: Option<&HeaderOverrides>,
    ) -> Result<Value, LibraryError> {
        let concept_id = require(concept_id, "concept_id")?;
        let path = format!("{BC_ROOT}/biomedicalconcepts/{concept_id}");
        Ok(self.source().get_json(&path, headers).await?)
    }

    /// Biomedical concept package listing.
    ///
    /// # Errors
    /// Returns fetch failures.
    pub async fn bc_packages(
        &self,
        headers: Option<&HeaderOverrides>,
    ) -> Result<Value, LibraryError> {
        let path = format!("{BC_ROOT}/packages");
        Ok(self.source().get_json(&path, headers).await?)
    }

    /// One biomedical concept pinned to a specific package.
    ///
    /// # Errors
    /// Returns `MissingParameter` for blank inputs, plus fetch failures.
    pub async fn bc_for_package(
        &self,
        package: &str,
        concept_id: &str,
        headers: Option<&HeaderOverrides>,
    ) -> Result<Value, LibraryError> {
        let package = require(package, "package")?;
        let concept_id = require(concept_id, "concept_id")?;
        let path = format!("{BC_ROOT}/packages/{package}/biomedicalconcepts/{concept_id}");
        Ok(self.source().get_json(&path, headers).await?)
    }

    /// All biomedical concepts of one package.
    ///
    /// # Errors
    /// Returns `MissingParameter` for a blank package, plus fetch failures.
    pub async fn bc_list_for_package(
        &self,
        package: &str,
        headers: Option<&HeaderOverrides>,
    ) -> Result<Value, LibraryError> {
        let package = require(package, "package")?;
        let path = format!("{BC_ROOT}/packages/{package}/biomedicalconcepts");
        Ok(self.source().get_json(&path, headers).await?)
    }

    /// Latest dataset specializations derived from one biomedical concept.
    ///
    /// # Errors
    /// Returns `MissingParameter` for a blank concept, plus fetch failures.
    pub async fn specializations_for_bc(
        &self,
        biomedical_concept: &str,
        headers: Option<&HeaderOverrides>,
    ) -> Result<Value, LibraryError> {
        let biomedical_concept = require(biomedical_concept, "biomedical_concept")?;
        let path = format!(
            "{SPECIALIZATIONS_ROOT}/datasetspecializations?{}",
            query_string(&[("biomedicalconcept", biomedical_concept)])
        );
        Ok(self.source().get_json(&path, headers).await?)
    }

    /// Latest SDTM dataset specializations for one domain.
    ///
    /// # Errors
    /// Returns `MissingParameter` for a blank domain, plus fetch failures.
    pub async fn sdtm_specializations_for_domain(
        &self,
        domain: &str,
        headers: Option<&HeaderOverrides>,
    ) -> Result<Value, LibraryError> {
        let domain = require(domain, "domain")?.to_uppercase();
        let path = format!(
            "{SPECIALIZATIONS_ROOT}/sdtm/datasetspecializations?{}",
            query_string(&[("domain", &domain)])
        );
        Ok(self.source().get_json(&path, headers).await?)
    }

    /// Latest revision of one SDTM dataset specialization.
    ///
    /// # Errors
    /// Returns `MissingParameter` for a blank specialization id, plus fetch
    /// failures.
    pub async fn latest_sdtm_specialization(
        &self,
        specialization_id: &str,
        headers: Option<&HeaderOverrides>,
    ) -> Result<Value, LibraryError> {
        let specialization_id = require(specialization_id, "dataset_specialization_id")?;
        let path =
            format!("{SPECIALIZATIONS_ROOT}/sdtm/datasetspecializations/{specialization_id}");
        Ok(self.source().get_json(&path, headers).await?)
    }

    /// Domains that have SDTM dataset specializations.
    ///
    /// # Errors
    /// Returns fetch failures.
    pub async fn sdtm_specialization_domains(
        &self,
        headers: Option<&HeaderOverrides>,
    ) -> Result<Value, LibraryError> {
        let path = format!("{SPECIALIZATIONS_ROOT}/sdtm/domains");
        Ok(self.source().get_json(&path, headers).await?)
    }

    /// SDTM dataset specialization package listing.
    ///
    /// # Errors
    /// Returns fetch failures.
    pub async fn sdtm_specialization_packages(
        &self,
        headers: Option<&HeaderOverrides>,
    ) -> Result<Value, LibraryError> {
        let path = format!("{SPECIALIZATIONS_ROOT}/sdtm/packages");
        Ok(self.source().get_json(&path, headers).await?)
    }

    /// One SDTM dataset specialization pinned to a specific package.
    ///
    /// # Errors
    /// Returns `MissingParameter` for blank inputs, plus fetch failures.
    pub async fn sdtm_specialization_for_package(
        &self,
        package: &str,
        specialization_id: &str,
        headers: Option<&HeaderOverrides>,
    ) -> Result<Value, LibraryError> {
        let package = require(package, "package")?;
        let specialization_id = require(specialization_id, "dataset_specialization_id")?;
        let path = format!(
            "{SPECIALIZATIONS_ROOT}/sdtm/packages/{package}/datasetspecializations/{specialization_id}"
        );
        Ok(self.source().get_json(&path, headers).await?)
    }

    /// All SDTM dataset specializations of one package.
    ///
    /// # Errors
    /// Returns `MissingParameter` for a blank package, plus fetch failures.
    pub async fn sdtm_specializations_for_package(
        &self,
        package: &str,
        headers: Option<&HeaderOverrides>,
    ) -> Result<Value, LibraryError> {
        let package = require(package, "package")?;
        let path =
            format!("{SPECIALIZATIONS_ROOT}/sdtm/packages/{package}/datasetspecializations");
        Ok(self.source().get_json(&path, headers).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_identifiers_are_rejected_before_any_fetch() {
        assert!(require("C105585", "concept_id").is_ok());
        assert!(require("  SYSBP  ", "id").is_ok_and(|value| value == "SYSBP"));
        assert!(matches!(
            require("   ", "concept_id"),
            Err(LibraryError::MissingParameter("concept_id"))
        ));
    }
}
