//! ADaM-IG data structure metadata. ADaM groups analysis variables into
//! data structures (ADSL, OCCDS, BDS) with optional nested variable sets, so
//! flattening and reverse lookup both walk two levels.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

use crate::client::{HeaderOverrides, LibrarySource};

use super::ct::CodelistDetail;
use super::ig::{codelist_hrefs, opt_str};
use super::locate::names_contain;
use super::version::normalize_version;
use super::{CdiscLibrary, LibraryError};

/// The ADaM product root has no version listing endpoint, so an unspecified
/// version falls back to the last published ADaM-IG.
pub const DEFAULT_ADAM_VERSION: &str = "1-3";

/// One analysis variable, whether top-level or inside a variable set.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisVariable {
    pub name: Option<String>,
    pub label: Option<String>,
    pub datatype: Option<String>,
    pub core: Option<String>,
}

/// An ADaM data structure with its variables flattened and name-sorted.
#[derive(Debug, Clone)]
pub struct AdamStructure {
    pub dataset: String,
    pub label: Option<String>,
    pub description: Option<String>,
    pub version: String,
    pub variables: Vec<AnalysisVariable>,
}

/// Detail record for one analysis variable, with every codelist reachable
/// from its links resolved where possible.
#[derive(Debug, Clone)]
pub struct AdamVariableDetail {
    pub variable: Option<String>,
    pub label: Option<String>,
    pub datatype: Option<String>,
    pub core: Option<String>,
    pub description: Option<String>,
    pub dataset: String,
    pub version: String,
    pub codelist_links: Vec<String>,
    pub codelists: Vec<CodelistDetail>,
}

fn structures_path(version: &str) -> String {
    format!("/mdr/adam/adamig-{version}/datastructures")
}

fn structure_path(version: &str, dataset: &str) -> String {
    format!("{}/{dataset}", structures_path(version))
}

fn resolve_version(explicit: Option<&str>) -> String {
    explicit.map_or_else(|| DEFAULT_ADAM_VERSION.to_string(), normalize_version)
}

/// Collects the raw variable documents of a data structure, walking both the
/// top-level `analysisVariables` and every `analysisVariableSets` entry.
pub(crate) fn analysis_variables(doc: &Value) -> Vec<&Value> {
    let mut variables = Vec::new();
    if let Some(top) = doc.get("analysisVariables").and_then(Value::as_array) {
        variables.extend(top.iter());
    }
    if let Some(sets) = doc.get("analysisVariableSets").and_then(Value::as_array) {
        for set in sets {
            if let Some(nested) = set.get("analysisVariables").and_then(Value::as_array) {
                variables.extend(nested.iter());
            }
        }
    }
    variables
}

pub(crate) fn structure_contains(doc: &Value, leaf: &str) -> bool {
    let names: Vec<String> = analysis_variables(doc)
        .into_iter()
        .filter_map(|variable| opt_str(variable, "name"))
        .collect();
    names_contain(names.iter().map(String::as_str), leaf)
}

fn flatten_variable(raw: &Value) -> AnalysisVariable {
    AnalysisVariable {
        name: opt_str(raw, "name"),
        label: opt_str(raw, "label"),
        datatype: opt_str(raw, "simpleDatatype"),
        core: opt_str(raw, "core"),
    }
}

impl<S: LibrarySource> CdiscLibrary<S> {
    /// Fetches an ADaM data structure and flattens its variables, sorted by
    /// name.
    ///
    /// # Errors
    /// Returns fetch failures.
    pub async fn adam_structure(
        &self,
        dataset: &str,
        version: Option<&str>,
        headers: Option<&HeaderOverrides>,
    ) -> Result<AdamStructure, LibraryError> {
        let dataset = dataset.trim().to_uppercase();
        let version = resolve_version(version);
        let doc = self
            .source()
            .get_json(&structure_path(&version, &dataset), headers)
            .await?;
        let mut variables: Vec<AnalysisVariable> = analysis_variables(&doc)
            .into_iter()
            .map(flatten_variable)
            .collect();
        variables.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(AdamStructure {
            dataset,
            label: opt_str(&doc, "label"),
            description: opt_str(&doc, "description"),
            version,
            variables,
        })
    }

    /// Scans the release's data structures, in listing order, for the first
    /// one containing `variable`. A failed listing fetch is an error; a
    /// failed structure probe is skipped.
    ///
    /// # Errors
    /// Returns the listing fetch failure.
    pub async fn locate_adam_variable(
        &self,
        variable: &str,
        version: &str,
        headers: Option<&HeaderOverrides>,
    ) -> Result<Option<String>, LibraryError> {
        let listing = self
            .source()
            .get_json(&structures_path(version), headers)
            .await?;
        let candidates: Vec<String> = listing
            .get("_links")
            .and_then(|links| links.get("dataStructures"))
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| entry.get("href").and_then(Value::as_str))
                    .filter_map(|href| href.rsplit('/').next())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        Ok(self
            .first_grouping_containing(
                &candidates,
                variable,
                headers,
                |candidate| structure_path(version, candidate),
                structure_contains,
            )
            .await)
    }

    /// Detail lookup for one analysis variable across the release's data
    /// structures.
    ///
    /// # Errors
    /// Returns `VariableNotFound` when no data structure contains the
    /// variable, plus fetch failures.
    pub async fn adam_variable_details(
        &self,
        variable: &str,
        version: Option<&str>,
        headers: Option<&HeaderOverrides>,
    ) -> Result<AdamVariableDetail, LibraryError> {
        let variable = variable.trim().to_uppercase();
        let version = resolve_version(version);
        let dataset = self
            .locate_adam_variable(&variable, &version, headers)
            .await?
            .ok_or_else(|| LibraryError::VariableNotFound {
                variable: variable.clone(),
                scope: format!("any ADaM-IG {version} data structure"),
            })?;

        let doc = self
            .source()
            .get_json(&structure_path(&version, &dataset), headers)
            .await?;
        let raw = analysis_variables(&doc)
            .into_iter()
            .find(|candidate| {
                opt_str(candidate, "name").is_some_and(|name| name.eq_ignore_ascii_case(&variable))
            })
            .ok_or_else(|| LibraryError::VariableNotFound {
                variable: variable.clone(),
                scope: format!("data structure '{dataset}'"),
            })?;

        let codelist_links = codelist_hrefs(raw);
        let mut codelists = Vec::new();
        let mut ct_versions = HashMap::new();
        for href in &codelist_links {
            if let Some(detail) = self
                .first_resolvable_codelist(
                    std::slice::from_ref(href),
                    &mut ct_versions,
                    headers,
                )
                .await
            {
                codelists.push(detail);
            }
        }

        Ok(AdamVariableDetail {
            variable: opt_str(raw, "name"),
            label: opt_str(raw, "label"),
            datatype: opt_str(raw, "simpleDatatype"),
            core: opt_str(raw, "core"),
            description: opt_str(raw, "description"),
            dataset,
            version,
            codelist_links,
            codelists,
        })
    }
}
