//! SDTM-IG and SEND-IG dataset metadata: classes, domain structures, and
//! variable details with optional codelist enrichment.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::client::{HeaderOverrides, LibrarySource};

use super::ct::{CodelistDetail, CodelistLookup, parse_codelist_href};
use super::locate::names_contain;
use super::standards::{CtStandard, IgProduct, MatchMode};
use super::{CdiscLibrary, LibraryError};

/// Variables with no ordinal sort after every numbered one.
const MISSING_ORDINAL: u32 = u32::MAX;

/// Prioritized scan order for reverse variable lookups. Hand-curated common
/// domains, not an exhaustive catalog fetch.
pub const SDTM_COMMON_DOMAINS: [&str; 11] =
    ["DM", "AE", "VS", "LB", "EX", "CM", "MH", "DS", "EG", "PE", "QS"];
pub const SEND_COMMON_DOMAINS: [&str; 10] =
    ["DM", "EX", "DS", "BW", "CL", "LB", "MA", "MI", "OM", "PC"];

/// One domain class (Findings, Events, Interventions, ...) of an IG release.
#[derive(Debug, Clone, Serialize)]
pub struct IgClass {
    pub name: String,
    pub label: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// The class listing of one IG release.
#[derive(Debug, Clone)]
pub struct IgClasses {
    pub version: String,
    pub classes: Vec<IgClass>,
}

/// Flattened dataset variable record with a stable key set.
#[derive(Debug, Clone, Serialize)]
pub struct DatasetVariable {
    pub name: Option<String>,
    pub label: Option<String>,
    pub datatype: Option<String>,
    pub core: Option<String>,
    pub role: Option<String>,
    pub ordinal: Option<u32>,
    pub length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codelist: Option<CodelistDetail>,
}

/// A domain dataset with its full variable list, ordinal-sorted.
#[derive(Debug, Clone)]
pub struct DatasetStructure {
    pub domain: String,
    pub label: Option<String>,
    pub description: Option<String>,
    pub class: Option<String>,
    pub version: String,
    pub variables: Vec<DatasetVariable>,
}

/// Detail record for a single dataset variable.
#[derive(Debug, Clone)]
pub struct VariableDetail {
    pub variable: Option<String>,
    pub label: Option<String>,
    pub datatype: Option<String>,
    pub core: Option<String>,
    pub role: Option<String>,
    pub ordinal: Option<u32>,
    pub length: Option<u64>,
    pub domain: String,
    pub version: String,
    pub codelist: Option<CodelistDetail>,
}

pub(crate) fn opt_str(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

pub(crate) fn ordinal_of(value: &Value) -> Option<u32> {
    let ordinal = value.get("ordinal")?;
    ordinal
        .as_u64()
        .and_then(|number| u32::try_from(number).ok())
        .or_else(|| ordinal.as_str().and_then(|text| text.parse().ok()))
}

pub(crate) fn length_of(value: &Value) -> Option<u64> {
    let length = value.get("maxLength")?;
    length
        .as_u64()
        .or_else(|| length.as_str().and_then(|text| text.parse().ok()))
}

/// Collects codelist hrefs from a variable document's `_links.codelist`,
/// tolerating both single-object and array forms.
pub(crate) fn codelist_hrefs(variable: &Value) -> Vec<String> {
    let Some(codelist) = variable.get("_links").and_then(|links| links.get("codelist")) else {
        return Vec::new();
    };
    match codelist {
        Value::Array(entries) => entries
            .iter()
            .filter_map(|entry| entry.get("href").and_then(Value::as_str))
            .map(str::to_string)
            .collect(),
        Value::Object(_) => codelist
            .get("href")
            .and_then(Value::as_str)
            .map(str::to_string)
            .into_iter()
            .collect(),
        _ => Vec::new(),
    }
}

/// Member names of a dataset document (`datasetVariables[].name`).
pub(crate) fn dataset_member_names(doc: &Value) -> Vec<String> {
    doc.get("datasetVariables")
        .and_then(Value::as_array)
        .map(|variables| {
            variables
                .iter()
                .filter_map(|variable| opt_str(variable, "name"))
                .collect()
        })
        .unwrap_or_default()
}

pub(crate) fn dataset_contains(doc: &Value, leaf: &str) -> bool {
    let names = dataset_member_names(doc);
    names_contain(names.iter().map(String::as_str), leaf)
}

const fn common_domains(product: IgProduct) -> &'static [&'static str] {
    match product {
        IgProduct::Sendig => &SEND_COMMON_DOMAINS,
        _ => &SDTM_COMMON_DOMAINS,
    }
}

fn dataset_path(product: IgProduct, version: &str, domain: &str) -> String {
    format!("{}/{version}/datasets/{domain}", product.root_path())
}

fn flatten_variable(raw: &Value) -> DatasetVariable {
    DatasetVariable {
        name: opt_str(raw, "name"),
        label: opt_str(raw, "label"),
        datatype: opt_str(raw, "simpleDatatype"),
        core: opt_str(raw, "core"),
        role: opt_str(raw, "role"),
        ordinal: ordinal_of(raw),
        length: length_of(raw),
        codelist: None,
    }
}

impl<S: LibrarySource> CdiscLibrary<S> {
    /// Lists the domain classes of an IG release, resolving the latest
    /// version when none is given.
    ///
    /// # Errors
    /// Returns version-resolution or fetch failures.
    pub async fn ig_classes(
        &self,
        product: IgProduct,
        version: Option<&str>,
        headers: Option<&HeaderOverrides>,
    ) -> Result<IgClasses, LibraryError> {
        let version = self.resolve_ig_version(product, version, headers).await?;
        let path = format!("{}/{version}/classes", product.root_path());
        let doc = self.source().get_json(&path, headers).await?;
        let classes = doc
            .get("_links")
            .and_then(|links| links.get("classes"))
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .map(|entry| IgClass {
                        name: entry
                            .get("href")
                            .and_then(Value::as_str)
                            .and_then(|href| href.rsplit('/').next())
                            .unwrap_or_default()
                            .to_string(),
                        label: opt_str(entry, "title"),
                        kind: opt_str(entry, "type"),
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(IgClasses { version, classes })
    }

    /// Fetches a domain dataset and flattens its variables, sorted by
    /// ordinal. With `include_codelists`, each variable carrying a codelist
    /// link is enriched with the resolved codelist; enrichment failures are
    /// absorbed and leave the variable without a codelist.
    ///
    /// # Errors
    /// Returns version-resolution or dataset fetch failures.
    pub async fn dataset_structure(
        &self,
        product: IgProduct,
        domain: &str,
        version: Option<&str>,
        include_codelists: bool,
        headers: Option<&HeaderOverrides>,
    ) -> Result<DatasetStructure, LibraryError> {
        let domain = domain.trim().to_uppercase();
        let version = self.resolve_ig_version(product, version, headers).await?;
        let doc = self
            .source()
            .get_json(&dataset_path(product, &version, &domain), headers)
            .await?;

        let mut variables = Vec::new();
        let mut ct_versions = HashMap::new();
        if let Some(raw_variables) = doc.get("datasetVariables").and_then(Value::as_array) {
            for raw in raw_variables {
                let mut variable = flatten_variable(raw);
                if include_codelists {
                    variable.codelist = self
                        .first_resolvable_codelist(&codelist_hrefs(raw), &mut ct_versions, headers)
                        .await;
                }
                variables.push(variable);
            }
        }
        variables.sort_by_key(|variable| variable.ordinal.unwrap_or(MISSING_ORDINAL));

        Ok(DatasetStructure {
            domain,
            label: opt_str(&doc, "label"),
            description: opt_str(&doc, "description"),
            class: doc
                .get("datasetClass")
                .and_then(|class| opt_str(class, "name")),
            version,
            variables,
        })
    }

    /// Detail lookup for one dataset variable. When `domain` is omitted the
    /// common-domain candidate list is scanned for the first dataset whose
    /// member list contains the variable.
    ///
    /// # Errors
    /// Returns `VariableNotFound` when the scan exhausts its candidates or
    /// the variable is missing from the named domain, plus version-resolution
    /// and fetch failures.
    pub async fn dataset_variable_details(
        &self,
        product: IgProduct,
        variable: &str,
        domain: Option<&str>,
        version: Option<&str>,
        include_codelist: bool,
        headers: Option<&HeaderOverrides>,
    ) -> Result<VariableDetail, LibraryError> {
        let variable = variable.trim().to_uppercase();
        let version = self.resolve_ig_version(product, version, headers).await?;

        let domain = match domain {
            Some(domain) => domain.trim().to_uppercase(),
            None => self
                .locate_dataset_variable(product, &variable, &version, headers)
                .await
                .ok_or_else(|| LibraryError::VariableNotFound {
                    variable: variable.clone(),
                    scope: format!("common {} domains", product.name()),
                })?,
        };

        let doc = self
            .source()
            .get_json(&dataset_path(product, &version, &domain), headers)
            .await?;
        let raw = doc
            .get("datasetVariables")
            .and_then(Value::as_array)
            .and_then(|variables| {
                variables.iter().find(|candidate| {
                    opt_str(candidate, "name")
                        .is_some_and(|name| name.eq_ignore_ascii_case(&variable))
                })
            })
            .ok_or_else(|| LibraryError::VariableNotFound {
                variable: variable.clone(),
                scope: format!("domain '{domain}'"),
            })?;

        let codelist = if include_codelist {
            let mut ct_versions = HashMap::new();
            self.first_resolvable_codelist(&codelist_hrefs(raw), &mut ct_versions, headers)
                .await
        } else {
            None
        };

        Ok(VariableDetail {
            variable: opt_str(raw, "name"),
            label: opt_str(raw, "label"),
            datatype: opt_str(raw, "simpleDatatype"),
            core: opt_str(raw, "core"),
            role: opt_str(raw, "role"),
            ordinal: ordinal_of(raw),
            length: length_of(raw),
            domain,
            version,
            codelist,
        })
    }

    /// Scans the product's common domains for the first dataset containing
    /// `variable`.
    pub async fn locate_dataset_variable(
        &self,
        product: IgProduct,
        variable: &str,
        version: &str,
        headers: Option<&HeaderOverrides>,
    ) -> Option<String> {
        let candidates: Vec<String> = common_domains(product)
            .iter()
            .map(ToString::to_string)
            .collect();
        self.first_grouping_containing(
            &candidates,
            variable,
            headers,
            |candidate| dataset_path(product, version, candidate),
            dataset_contains,
        )
        .await
    }

    /// Resolves the first codelist reachable from `hrefs`, caching the latest
    /// CT version per standard for the duration of the call. Every failure in
    /// this path is absorbed; the base record is returned without enrichment.
    pub(crate) async fn first_resolvable_codelist(
        &self,
        hrefs: &[String],
        ct_versions: &mut HashMap<CtStandard, Option<String>>,
        headers: Option<&HeaderOverrides>,
    ) -> Option<CodelistDetail> {
        for href in hrefs {
            let Some(reference) = parse_codelist_href(href) else {
                continue;
            };
            if !ct_versions.contains_key(&reference.standard) {
                let latest = match self.latest_ct_version(reference.standard, headers).await {
                    Ok(versions) => Some(versions.latest),
                    Err(err) => {
                        debug!(%href, %err, "codelist enrichment skipped: version resolution failed");
                        None
                    }
                };
                ct_versions.insert(reference.standard, latest);
            }
            let Some(Some(version)) = ct_versions.get(&reference.standard).cloned() else {
                continue;
            };
            match self
                .find_codelist(
                    &reference.codelist_id,
                    MatchMode::CodelistCode,
                    reference.standard,
                    Some(&version),
                    headers,
                )
                .await
            {
                Ok(CodelistLookup::Found(detail)) => return Some(*detail),
                Ok(CodelistLookup::Missing { .. }) => {}
                Err(err) => {
                    debug!(%href, %err, "codelist enrichment skipped: lookup failed");
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn variables_sort_by_ordinal_with_missing_last() {
        let mut variables = vec![
            DatasetVariable {
                name: Some("NOORD".into()),
                label: None,
                datatype: None,
                core: None,
                role: None,
                ordinal: None,
                length: None,
                codelist: None,
            },
            DatasetVariable {
                name: Some("THIRD".into()),
                label: None,
                datatype: None,
                core: None,
                role: None,
                ordinal: Some(3),
                length: None,
                codelist: None,
            },
            DatasetVariable {
                name: Some("FIRST".into()),
                label: None,
                datatype: None,
                core: None,
                role: None,
                ordinal: Some(1),
                length: None,
                codelist: None,
            },
        ];
        variables.sort_by_key(|variable| variable.ordinal.unwrap_or(MISSING_ORDINAL));
        let names: Vec<_> = variables
            .iter()
            .filter_map(|variable| variable.name.as_deref())
            .collect();
        assert_eq!(names, ["FIRST", "THIRD", "NOORD"]);
    }

    #[test]
    fn ordinal_accepts_numbers_and_strings() {
        assert_eq!(ordinal_of(&json!({"ordinal": 7})), Some(7));
        assert_eq!(ordinal_of(&json!({"ordinal": "12"})), Some(12));
        assert_eq!(ordinal_of(&json!({"ordinal": "abc"})), None);
        assert_eq!(ordinal_of(&json!({})), None);
    }

    #[test]
    fn codelist_hrefs_handle_object_and_array_forms() {
        let single = json!({"_links": {"codelist": {"href": "/a"}}});
        assert_eq!(codelist_hrefs(&single), ["/a"]);

        let many = json!({"_links": {"codelist": [{"href": "/a"}, {"href": "/b"}]}});
        assert_eq!(codelist_hrefs(&many), ["/a", "/b"]);

        assert!(codelist_hrefs(&json!({"_links": {}})).is_empty());
        assert!(codelist_hrefs(&json!({})).is_empty());
    }

    #[test]
    fn dataset_member_names_read_dataset_variables() {
        let doc = json!({
            "datasetVariables": [{"name": "STUDYID"}, {"name": "USUBJID"}, {"label": "no name"}]
        });
        assert_eq!(dataset_member_names(&doc), ["STUDYID", "USUBJID"]);
        assert!(dataset_contains(&doc, "usubjid"));
        assert!(!dataset_contains(&doc, "AETERM"));
    }
}
