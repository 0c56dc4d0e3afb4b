//! Version token parsing, comparison, and latest-version resolution.
//!
//! Two versioning schemes exist in the library: controlled terminology
//! packages carry `YYYY-MM-DD` date versions, implementation guides carry
//! dash-joined ordinal versions (`3-2`, `3-10`). Each scheme knows how to
//! validate and order its tokens; everything else in the resolver is href
//! scanning.

use std::cmp::Ordering;

use serde_json::Value;

use crate::client::{HeaderOverrides, LibrarySource};

use super::standards::{CtStandard, IgProduct};
use super::{CdiscLibrary, LibraryError};

/// How many raw entries to quote back when version detection finds nothing.
const DIAGNOSTIC_SAMPLE_LIMIT: usize = 5;

/// Versioning strategy for a metadata family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionScheme {
    /// `YYYY-MM-DD` tokens; valid tokens order correctly as plain strings.
    Date,
    /// Dash-joined integers compared as integer tuples, never as strings.
    Ordinal,
}

impl VersionScheme {
    /// Whether `token` is a well-formed version under this scheme.
    #[must_use]
    pub fn is_valid(self, token: &str) -> bool {
        match self {
            Self::Date => is_valid_date_token(token),
            Self::Ordinal => ordinal_key(token).is_some(),
        }
    }

    /// Orders two tokens under this scheme. For the ordinal scheme a token
    /// that fails integer conversion sorts below every parseable token.
    #[must_use]
    pub fn compare(self, a: &str, b: &str) -> Ordering {
        match self {
            Self::Date => a.cmp(b),
            Self::Ordinal => ordinal_key(a).cmp(&ordinal_key(b)),
        }
    }
}

fn is_valid_date_token(token: &str) -> bool {
    if token.len() != 10 || token.matches('-').count() != 2 {
        return false;
    }
    let mut parts = token.split('-');
    let (Some(year), Some(month), Some(day)) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    year.len() == 4
        && month.len() == 2
        && day.len() == 2
        && [year, month, day]
            .iter()
            .all(|part| part.bytes().all(|byte| byte.is_ascii_digit()))
}

fn ordinal_key(token: &str) -> Option<Vec<u64>> {
    token
        .split('-')
        .map(|part| part.parse::<u64>().ok())
        .collect()
}

/// Rewrites a caller-supplied version into the hyphen form used in URLs.
/// Already-hyphenated tokens pass through unchanged.
#[must_use]
pub fn normalize_version(version: &str) -> String {
    version.trim().replace('.', "-")
}

/// Rewrites a hyphen-form version into the dot form shown to callers.
#[must_use]
pub fn display_version(version: &str) -> String {
    version.replace('-', ".")
}

/// Resolution result: the newest version plus the full sorted candidate list.
#[derive(Debug, Clone)]
pub struct VersionList {
    pub latest: String,
    pub all: Vec<String>,
}

/// Collects `href` strings from `_links.{key}` of a listing document.
fn href_entries(doc: &Value, key: &str) -> Vec<String> {
    doc.get("_links")
        .and_then(|links| links.get(key))
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| entry.get("href").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn sort_and_dedupe(mut candidates: Vec<String>, scheme: VersionScheme) -> Vec<String> {
    candidates.sort_by(|a, b| scheme.compare(a, b));
    candidates.dedup();
    candidates
}

fn diagnostic_sample(entries: &[String]) -> Vec<String> {
    entries
        .iter()
        .take(DIAGNOSTIC_SAMPLE_LIMIT)
        .cloned()
        .collect()
}

/// Extracts valid CT version candidates for `standard` from the package
/// listing. Malformed candidates are skipped, never fatal. Returns the sorted
/// candidates together with the raw hrefs for diagnostics.
#[must_use]
pub fn extract_ct_versions(doc: &Value, standard: CtStandard) -> (Vec<String>, Vec<String>) {
    let hrefs = href_entries(doc, "packages");
    let prefix = standard.package_prefix();
    let candidates = hrefs
        .iter()
        .filter_map(|href| href.split_once(&prefix).map(|(_, tail)| tail.trim()))
        .filter(|token| VersionScheme::Date.is_valid(token))
        .map(str::to_string)
        .collect();
    (
        sort_and_dedupe(candidates, VersionScheme::Date),
        diagnostic_sample(&hrefs),
    )
}

/// Extracts ordinal version candidates for an implementation guide from its
/// product root document. Every listed token is kept; unparseable tokens sort
/// lowest rather than erroring.
#[must_use]
pub fn extract_ig_versions(doc: &Value, product: IgProduct) -> (Vec<String>, Vec<String>) {
    let hrefs = href_entries(doc, product.versions_key());
    let candidates = hrefs
        .iter()
        .filter_map(|href| href.rsplit('/').next())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect();
    (
        sort_and_dedupe(candidates, VersionScheme::Ordinal),
        diagnostic_sample(&hrefs),
    )
}

impl<S: LibrarySource> CdiscLibrary<S> {
    /// Resolves the newest controlled terminology version for `standard` by
    /// scanning the package listing.
    ///
    /// # Errors
    /// Returns `NoVersionsFound` (with a sample of the raw entries seen) when
    /// no href matches the standard's naming pattern, or a source error if
    /// the listing fetch fails.
    pub async fn latest_ct_version(
        &self,
        standard: CtStandard,
        headers: Option<&HeaderOverrides>,
    ) -> Result<VersionList, LibraryError> {
        let doc = self.source().get_json("/mdr/ct/packages", headers).await?;
        let (versions, samples) = extract_ct_versions(&doc, standard);
        match versions.last() {
            Some(latest) => Ok(VersionList {
                latest: latest.clone(),
                all: versions,
            }),
            None => Err(LibraryError::NoVersionsFound {
                subject: format!(
                    "standard '{standard}' (expected href format '/mdr/ct/packages/{}YYYY-MM-DD')",
                    standard.package_prefix()
                ),
                samples,
            }),
        }
    }

    /// Resolves the newest published version of an implementation guide.
    ///
    /// # Errors
    /// Returns `NoVersionsFound` when the product root lists no versions, or
    /// a source error if the fetch fails.
    pub async fn latest_ig_version(
        &self,
        product: IgProduct,
        headers: Option<&HeaderOverrides>,
    ) -> Result<VersionList, LibraryError> {
        let doc = self.source().get_json(product.root_path(), headers).await?;
        let (versions, samples) = extract_ig_versions(&doc, product);
        match versions.last() {
            Some(latest) => Ok(VersionList {
                latest: latest.clone(),
                all: versions,
            }),
            None => Err(LibraryError::NoVersionsFound {
                subject: format!("product {}", product.name()),
                samples,
            }),
        }
    }

    /// Returns the hyphen-form version to use: the caller's (normalized, no
    /// existence check) or the latest published one.
    ///
    /// # Errors
    /// Propagates `latest_ig_version` failures when no explicit version was
    /// supplied.
    pub async fn resolve_ig_version(
        &self,
        product: IgProduct,
        explicit: Option<&str>,
        headers: Option<&HeaderOverrides>,
    ) -> Result<String, LibraryError> {
        match explicit {
            Some(version) => Ok(normalize_version(version)),
            None => Ok(self.latest_ig_version(product, headers).await?.latest),
        }
    }

    /// CT counterpart of [`Self::resolve_ig_version`].
    ///
    /// # Errors
    /// Propagates `latest_ct_version` failures when no explicit version was
    /// supplied.
    pub async fn resolve_ct_version(
        &self,
        standard: CtStandard,
        explicit: Option<&str>,
        headers: Option<&HeaderOverrides>,
    ) -> Result<String, LibraryError> {
        match explicit {
            Some(version) => Ok(normalize_version(version)),
            None => Ok(self.latest_ct_version(standard, headers).await?.latest),
        }
    }
}
