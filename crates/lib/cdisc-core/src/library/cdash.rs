//! CDASH-IG collection metadata: domain listings, domain structures, and
//! field detail lookups.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

use crate::client::{HeaderOverrides, LibrarySource};

use super::ct::CodelistDetail;
use super::ig::{codelist_hrefs, opt_str, ordinal_of};
use super::locate::names_contain;
use super::standards::IgProduct;
use super::{CdiscLibrary, LibraryError};

/// Scan order for field lookups without an explicit domain.
pub const CDASH_COMMON_DOMAINS: [&str; 10] =
    ["DM", "AE", "VS", "LB", "EX", "CM", "MH", "DS", "EG", "PE"];

/// A domain as listed in a CDASH-IG release.
#[derive(Debug, Clone, Serialize)]
pub struct CdashDomainSummary {
    pub name: String,
    pub label: Option<String>,
}

/// One data-collection field of a CDASH domain.
#[derive(Debug, Clone, Serialize)]
pub struct CdashField {
    pub name: Option<String>,
    pub label: Option<String>,
    pub ordinal: Option<u32>,
    pub prompt: Option<String>,
    pub question_text: Option<String>,
    pub datatype: Option<String>,
    pub core: Option<String>,
}

/// A CDASH domain with its full field list, ordinal-sorted.
#[derive(Debug, Clone)]
pub struct CdashDomainStructure {
    pub domain: String,
    pub label: Option<String>,
    pub description: Option<String>,
    pub version: String,
    pub fields: Vec<CdashField>,
}

/// Detail record for a single collection field.
#[derive(Debug, Clone)]
pub struct CdashFieldDetail {
    pub field: Option<String>,
    pub label: Option<String>,
    pub prompt: Option<String>,
    pub question_text: Option<String>,
    pub datatype: Option<String>,
    pub core: Option<String>,
    pub ordinal: Option<u32>,
    pub domain: String,
    pub version: String,
    pub codelist: Option<CodelistDetail>,
}

fn domain_path(version: &str, domain: &str) -> String {
    format!("/mdr/cdashig/{version}/domains/{domain}")
}

fn flatten_field(raw: &Value) -> CdashField {
    CdashField {
        name: opt_str(raw, "name"),
        label: opt_str(raw, "label"),
        ordinal: ordinal_of(raw),
        prompt: opt_str(raw, "prompt"),
        question_text: opt_str(raw, "questionText"),
        datatype: opt_str(raw, "simpleDatatype"),
        core: opt_str(raw, "core"),
    }
}

/// Member names of a CDASH domain document (`fields[].name`).
pub(crate) fn field_member_names(doc: &Value) -> Vec<String> {
    doc.get("fields")
        .and_then(Value::as_array)
        .map(|fields| fields.iter().filter_map(|field| opt_str(field, "name")).collect())
        .unwrap_or_default()
}

pub(crate) fn fields_contain(doc: &Value, leaf: &str) -> bool {
    let names = field_member_names(doc);
    names_contain(names.iter().map(String::as_str), leaf)
}

impl<S: LibrarySource> CdiscLibrary<S> {
    /// Lists the domains of a CDASH-IG release by walking its class tree.
    ///
    /// # Errors
    /// Returns version-resolution or fetch failures.
    pub async fn cdash_domains(
        &self,
        version: Option<&str>,
        headers: Option<&HeaderOverrides>,
    ) -> Result<(String, Vec<CdashDomainSummary>), LibraryError> {
        let version = self
            .resolve_ig_version(IgProduct::Cdashig, version, headers)
            .await?;
        let doc = self
            .source()
            .get_json(&format!("/mdr/cdashig/{version}"), headers)
            .await?;
        let mut domains = Vec::new();
        if let Some(classes) = doc.get("classes").and_then(Value::as_array) {
            for class in classes {
                if let Some(class_domains) = class.get("domains").and_then(Value::as_array) {
                    for domain in class_domains {
                        if let Some(name) = opt_str(domain, "name") {
                            domains.push(CdashDomainSummary {
                                name,
                                label: opt_str(domain, "label"),
                            });
                        }
                    }
                }
            }
        }
        Ok((version, domains))
    }

    /// Fetches a CDASH domain and flattens its collection fields, sorted by
    /// ordinal.
    ///
    /// # Errors
    /// Returns version-resolution or fetch failures.
    pub async fn cdash_domain_structure(
        &self,
        domain: &str,
        version: Option<&str>,
        headers: Option<&HeaderOverrides>,
    ) -> Result<CdashDomainStructure, LibraryError> {
        let domain = domain.trim().to_uppercase();
        let version = self
            .resolve_ig_version(IgProduct::Cdashig, version, headers)
            .await?;
        let doc = self
            .source()
            .get_json(&domain_path(&version, &domain), headers)
            .await?;
        let mut fields: Vec<CdashField> = doc
            .get("fields")
            .and_then(Value::as_array)
            .map(|fields| fields.iter().map(flatten_field).collect())
            .unwrap_or_default();
        fields.sort_by_key(|field| field.ordinal.unwrap_or(u32::MAX));
        Ok(CdashDomainStructure {
            domain,
            label: opt_str(&doc, "label"),
            description: opt_str(&doc, "description"),
            version,
            fields,
        })
    }

    /// Detail lookup for one collection field. When `domain` is omitted the
    /// common-domain candidate list is scanned for the first domain whose
    /// field list contains the name.
    ///
    /// # Errors
    /// Returns `VariableNotFound` when the scan exhausts its candidates or
    /// the field is missing from the named domain, plus version-resolution
    /// and fetch failures.
    pub async fn cdash_field_details(
        &self,
        field: &str,
        domain: Option<&str>,
        version: Option<&str>,
        headers: Option<&HeaderOverrides>,
    ) -> Result<CdashFieldDetail, LibraryError> {
        let field = field.trim().to_uppercase();
        let version = self
            .resolve_ig_version(IgProduct::Cdashig, version, headers)
            .await?;

        let domain = match domain {
            Some(domain) => domain.trim().to_uppercase(),
            None => {
                let candidates: Vec<String> = CDASH_COMMON_DOMAINS
                    .iter()
                    .map(ToString::to_string)
                    .collect();
                self.first_grouping_containing(
                    &candidates,
                    &field,
                    headers,
                    |candidate| domain_path(&version, candidate),
                    fields_contain,
                )
                .await
                .ok_or_else(|| LibraryError::VariableNotFound {
                    variable: field.clone(),
                    scope: "common CDASH-IG domains".to_string(),
                })?
            }
        };

        let doc = self
            .source()
            .get_json(&domain_path(&version, &domain), headers)
            .await?;
        let raw = doc
            .get("fields")
            .and_then(Value::as_array)
            .and_then(|fields| {
                fields.iter().find(|candidate| {
                    opt_str(candidate, "name").is_some_and(|name| name.eq_ignore_ascii_case(&field))
                })
            })
            .ok_or_else(|| LibraryError::VariableNotFound {
                variable: field.clone(),
                scope: format!("domain '{domain}'"),
            })?;

        let mut ct_versions = HashMap::new();
        let codelist = self
            .first_resolvable_codelist(&codelist_hrefs(raw), &mut ct_versions, headers)
            .await;

        Ok(CdashFieldDetail {
            field: opt_str(raw, "name"),
            label: opt_str(raw, "label"),
            prompt: opt_str(raw, "prompt"),
            question_text: opt_str(raw, "questionText"),
            datatype: opt_str(raw, "simpleDatatype"),
            core: opt_str(raw, "core"),
            ordinal: ordinal_of(raw),
            domain,
            version,
            codelist,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn field_members_read_the_fields_section() {
        let doc = json!({
            "fields": [{"name": "CMTRT"}, {"name": "CMDOSE"}, {"label": "anonymous"}]
        });
        assert_eq!(field_member_names(&doc), ["CMTRT", "CMDOSE"]);
        assert!(fields_contain(&doc, "cmtrt"));
        assert!(!fields_contain(&doc, "AETERM"));
    }

    #[test]
    fn flatten_field_reads_collection_attributes() {
        let raw = json!({
            "name": "CMTRT",
            "label": "Reported Name of Treatment",
            "ordinal": "4",
            "prompt": "Medication",
            "questionText": "What was the medication taken?",
            "simpleDatatype": "Char",
            "core": "HR"
        });
        let field = flatten_field(&raw);
        assert_eq!(field.name.as_deref(), Some("CMTRT"));
        assert_eq!(field.ordinal, Some(4));
        assert_eq!(field.question_text.as_deref(), Some("What was the medication taken?"));
        assert_eq!(field.core.as_deref(), Some("HR"));
    }
}
