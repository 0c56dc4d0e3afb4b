//! Controlled terminology package and codelist lookups.

use serde::Serialize;
use serde_json::Value;

use crate::client::{HeaderOverrides, LibrarySource};

use super::standards::{CtStandard, MatchMode};
use super::version::normalize_version;
use super::{CdiscLibrary, LibraryError};

/// One controlled term inside a codelist.
#[derive(Debug, Clone, Serialize)]
pub struct Term {
    pub term: String,
    pub term_code: String,
    pub decoded_value: String,
}

/// Identity block of a resolved codelist.
#[derive(Debug, Clone, Serialize)]
pub struct CodelistInfo {
    pub id: String,
    pub codelist_code: String,
    pub name: String,
    pub extensible: String,
    pub standard: String,
    pub version: String,
}

/// Full codelist detail: identity plus the ordered term list.
#[derive(Debug, Clone, Serialize)]
pub struct CodelistDetail {
    pub codelist_info: CodelistInfo,
    pub terms: Vec<Term>,
    pub term_count: usize,
}

/// Codelist entry as shown in a package-wide listing.
#[derive(Debug, Clone, Serialize)]
pub struct CodelistSummary {
    pub id: String,
    pub codelist_code: String,
    pub name: String,
    pub extensible: String,
}

/// All codelists of one CT package.
#[derive(Debug, Clone)]
pub struct PackageCodelists {
    pub standard: CtStandard,
    pub version: String,
    pub codelists: Vec<CodelistSummary>,
}

/// Outcome of a codelist search. `Missing` is a warning, not an error: the
/// query was well-formed and the package was fetched, the value just does not
/// exist there.
#[derive(Debug, Clone)]
pub enum CodelistLookup {
    Found(Box<CodelistDetail>),
    Missing {
        standard: CtStandard,
        version: String,
        match_mode: MatchMode,
    },
}

/// A codelist reference parsed out of a `_links.codelist` href, e.g.
/// `/mdr/ct/packages/sdtmct-2024-09-27/codelists/C66728`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodelistRef {
    pub standard: CtStandard,
    pub codelist_id: String,
}

/// Parses the CT standard and codelist identifier out of a codelist href.
/// Returns `None` for hrefs that do not point into a CT package.
#[must_use]
pub fn parse_codelist_href(href: &str) -> Option<CodelistRef> {
    let codelist_id = href.rsplit('/').find(|segment| !segment.is_empty())?;
    let package_part = href.split_once("/packages/")?.1.split('/').next()?;
    let token = package_part.split_once('-')?.0;
    let standard = CtStandard::from_package_token(token)?;
    Some(CodelistRef {
        standard,
        codelist_id: codelist_id.to_string(),
    })
}

fn str_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn extensible_flag(codelist: &Value) -> String {
    if codelist.get("extensible").and_then(Value::as_str) == Some("Yes") {
        "Yes".to_string()
    } else {
        "No".to_string()
    }
}

/// Finds the codelist matching `value` under the chosen match mode.
/// ID matches the submission value, `CodelistCode` matches the concept code;
/// both comparisons are case-insensitive exact matches.
#[must_use]
pub fn match_codelist<'a>(codelists: &'a [Value], value: &str, mode: MatchMode) -> Option<&'a Value> {
    let key = match mode {
        MatchMode::Id => "submissionValue",
        MatchMode::CodelistCode => "conceptId",
    };
    codelists.iter().find(|codelist| {
        codelist
            .get(key)
            .and_then(Value::as_str)
            .is_some_and(|candidate| candidate.eq_ignore_ascii_case(value))
    })
}

/// Flattens a raw codelist document into the caller-facing detail record.
#[must_use]
pub fn flatten_codelist(codelist: &Value, standard: CtStandard, version: &str) -> CodelistDetail {
    let terms: Vec<Term> = codelist
        .get("terms")
        .and_then(Value::as_array)
        .map(|terms| {
            terms
                .iter()
                .map(|term| Term {
                    term: str_field(term, "submissionValue"),
                    term_code: str_field(term, "conceptId"),
                    decoded_value: str_field(term, "preferredTerm"),
                })
                .collect()
        })
        .unwrap_or_default();
    let term_count = terms.len();
    CodelistDetail {
        codelist_info: CodelistInfo {
            id: str_field(codelist, "submissionValue"),
            codelist_code: str_field(codelist, "conceptId"),
            name: str_field(codelist, "name"),
            extensible: extensible_flag(codelist),
            standard: standard.as_str().to_string(),
            version: version.to_string(),
        },
        terms,
        term_count,
    }
}

impl<S: LibrarySource> CdiscLibrary<S> {
    async fn ct_package(
        &self,
        standard: CtStandard,
        version: &str,
        headers: Option<&HeaderOverrides>,
    ) -> Result<Value, LibraryError> {
        let path = format!("/mdr/ct/packages/{}{version}", standard.package_prefix());
        Ok(self.source().get_json(&path, headers).await?)
    }

    /// Lists every codelist in one CT package, resolving the latest version
    /// when none is given.
    ///
    /// # Errors
    /// Returns version-resolution or fetch failures. A package without a
    /// codelists section yields an empty list.
    pub async fn package_codelists(
        &self,
        standard: CtStandard,
        version: Option<&str>,
        headers: Option<&HeaderOverrides>,
    ) -> Result<PackageCodelists, LibraryError> {
        let version = self.resolve_ct_version(standard, version, headers).await?;
        let doc = self.ct_package(standard, &version, headers).await?;
        let codelists = doc
            .get("codelists")
            .and_then(Value::as_array)
            .map(|codelists| {
                codelists
                    .iter()
                    .map(|codelist| CodelistSummary {
                        id: str_field(codelist, "submissionValue"),
                        codelist_code: str_field(codelist, "conceptId"),
                        name: str_field(codelist, "name"),
                        extensible: extensible_flag(codelist),
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(PackageCodelists {
            standard,
            version,
            codelists,
        })
    }

    /// Searches one CT package for a codelist by submission value or concept
    /// code.
    ///
    /// # Errors
    /// Returns `MissingParameter` for an empty value, `NoCodelists` when the
    /// package carries no codelists section, and version-resolution or fetch
    /// failures. A well-formed query with no match is the `Missing` outcome,
    /// not an error.
    pub async fn find_codelist(
        &self,
        value: &str,
        mode: MatchMode,
        standard: CtStandard,
        version: Option<&str>,
        headers: Option<&HeaderOverrides>,
    ) -> Result<CodelistLookup, LibraryError> {
        if value.trim().is_empty() {
            return Err(LibraryError::MissingParameter("codelist_value"));
        }
        let version = match version {
            Some(version) => normalize_version(version),
            None => self.latest_ct_version(standard, headers).await?.latest,
        };
        let doc = self.ct_package(standard, &version, headers).await?;
        let Some(codelists) = doc.get("codelists").and_then(Value::as_array) else {
            return Err(LibraryError::NoCodelists {
                standard: standard.as_str().to_string(),
                version,
            });
        };

        match match_codelist(codelists, value, mode) {
            Some(codelist) => Ok(CodelistLookup::Found(Box::new(flatten_codelist(
                codelist, standard, &version,
            )))),
            None => Ok(CodelistLookup::Missing {
                standard,
                version,
                match_mode: mode,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_codelists() -> Vec<Value> {
        vec![
            json!({
                "submissionValue": "AGEU",
                "conceptId": "C66781",
                "name": "Age Unit",
                "extensible": "Yes",
                "terms": [
                    {"submissionValue": "YEARS", "conceptId": "C29848", "preferredTerm": "Year"},
                    {"submissionValue": "MONTHS", "conceptId": "C29846", "preferredTerm": "Month"}
                ]
            }),
            json!({
                "submissionValue": "ACN",
                "conceptId": "C66767",
                "name": "Action Taken with Study Treatment",
                "extensible": "No",
                "terms": []
            }),
        ]
    }

    #[test]
    fn match_modes_are_exclusive() {
        let codelists = sample_codelists();
        // C66781 exists only as a concept code, never as a submission value.
        assert!(match_codelist(&codelists, "C66781", MatchMode::Id).is_none());
        assert!(match_codelist(&codelists, "C66781", MatchMode::CodelistCode).is_some());
    }

    #[test]
    fn id_and_code_match_resolve_the_same_codelist() {
        let codelists = sample_codelists();
        let by_id = match_codelist(&codelists, "ageu", MatchMode::Id).expect("match by id");
        let by_code =
            match_codelist(&codelists, "c66781", MatchMode::CodelistCode).expect("match by code");
        assert_eq!(by_id, by_code);
    }

    #[test]
    fn flatten_exposes_terms_and_extensible_flag() {
        let codelists = sample_codelists();
        let detail = flatten_codelist(&codelists[0], CtStandard::Sdtm, "2024-12-20");
        assert_eq!(detail.codelist_info.id, "AGEU");
        assert_eq!(detail.codelist_info.extensible, "Yes");
        assert_eq!(detail.codelist_info.standard, "SDTM");
        assert_eq!(detail.term_count, 2);
        assert_eq!(detail.terms[0].term, "YEARS");
        assert_eq!(detail.terms[0].decoded_value, "Year");

        let closed = flatten_codelist(&codelists[1], CtStandard::Sdtm, "2024-12-20");
        assert_eq!(closed.codelist_info.extensible, "No");
        assert_eq!(closed.term_count, 0);
    }

    #[test]
    fn codelist_href_parses_standard_and_id() {
        let parsed = parse_codelist_href("/mdr/ct/packages/sdtmct-2024-09-27/codelists/C66728")
            .expect("href should parse");
        assert_eq!(parsed.standard, CtStandard::Sdtm);
        assert_eq!(parsed.codelist_id, "C66728");

        let adam = parse_codelist_href("/mdr/ct/packages/adamct-2024-03-29/codelists/C81224")
            .expect("adam href should parse");
        assert_eq!(adam.standard, CtStandard::Adam);
    }

    #[test]
    fn non_package_hrefs_are_ignored() {
        assert!(parse_codelist_href("/mdr/root/ct/sdtmct/codelists/C66728").is_none());
        assert!(parse_codelist_href("/mdr/ct/packages/mystery-2024-01-01/codelists/C1").is_none());
    }
}
