//! Ordered candidate scan used by every reverse variable lookup.
//!
//! The contract is deliberate: probe candidates in priority order, absorb
//! per-candidate fetch failures, stop at the first grouping whose member list
//! contains the leaf. Absorb-vs-propagate lives here and nowhere else.

use serde_json::Value;
use tracing::debug;

use crate::client::{HeaderOverrides, LibrarySource};

use super::CdiscLibrary;

impl<S: LibrarySource> CdiscLibrary<S> {
    /// Returns the first candidate whose document satisfies `contains`, or
    /// `None` once the list is exhausted. A failed probe counts as "not in
    /// this candidate" and the scan moves on.
    pub(crate) async fn first_grouping_containing(
        &self,
        candidates: &[String],
        leaf: &str,
        headers: Option<&HeaderOverrides>,
        url_for: impl Fn(&str) -> String + Send + Sync,
        contains: impl Fn(&Value, &str) -> bool + Send + Sync,
    ) -> Option<String> {
        for candidate in candidates {
            let url = url_for(candidate);
            match self.source().get_json(&url, headers).await {
                Ok(doc) => {
                    if contains(&doc, leaf) {
                        return Some(candidate.clone());
                    }
                }
                Err(err) => {
                    debug!(candidate = candidate.as_str(), %err, "candidate probe failed; continuing scan");
                }
            }
        }
        None
    }
}

/// Case-insensitive membership test over a list of member names.
pub(crate) fn names_contain<'a>(names: impl Iterator<Item = &'a str>, leaf: &str) -> bool {
    let mut names = names;
    names.any(|name| name.eq_ignore_ascii_case(leaf))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use crate::client::{HeaderOverrides, LibrarySource, SourceError};
    use crate::library::CdiscLibrary;

    use super::names_contain;

    /// In-memory source: canned documents by path, missing paths fail, and
    /// every fetch is recorded so tests can assert the scan order.
    struct FakeSource {
        docs: HashMap<String, serde_json::Value>,
        fetched: Mutex<Vec<String>>,
    }

    impl FakeSource {
        fn new(docs: HashMap<String, serde_json::Value>) -> Self {
            Self {
                docs,
                fetched: Mutex::new(Vec::new()),
            }
        }

        fn fetched(&self) -> Vec<String> {
            self.fetched.lock().expect("fetch log poisoned").clone()
        }
    }

    #[async_trait]
    impl LibrarySource for FakeSource {
        async fn get_json(
            &self,
            path: &str,
            _headers: Option<&HeaderOverrides>,
        ) -> Result<serde_json::Value, SourceError> {
            self.fetched
                .lock()
                .expect("fetch log poisoned")
                .push(path.to_string());
            self.docs.get(path).cloned().ok_or(SourceError::Http {
                url: path.to_string(),
                status: 404,
            })
        }
    }

    fn member_doc(names: &[&str]) -> serde_json::Value {
        json!({
            "datasetVariables": names.iter().map(|name| json!({"name": name})).collect::<Vec<_>>()
        })
    }

    fn doc_contains(doc: &serde_json::Value, leaf: &str) -> bool {
        let names = doc
            .get("datasetVariables")
            .and_then(serde_json::Value::as_array)
            .map(|vars| {
                vars.iter()
                    .filter_map(|var| var.get("name").and_then(serde_json::Value::as_str))
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        names_contain(names.into_iter(), leaf)
    }

    #[tokio::test]
    async fn scan_stops_at_first_match_and_survives_failed_probes() {
        // Eight candidates; only the 6th document exists and contains the
        // leaf, candidates 1-5 all 404.
        let candidates: Vec<String> = ["AA", "BB", "CC", "DD", "EE", "CM", "GG", "HH"]
            .iter()
            .map(ToString::to_string)
            .collect();
        let mut docs = HashMap::new();
        docs.insert("/probe/CM".to_string(), member_doc(&["CMTRT", "CMDOSE"]));
        docs.insert("/probe/GG".to_string(), member_doc(&["CMTRT"]));
        let library = CdiscLibrary::new(FakeSource::new(docs));

        let found = library
            .first_grouping_containing(
                &candidates,
                "CMTRT",
                None,
                |candidate| format!("/probe/{candidate}"),
                doc_contains,
            )
            .await;

        assert_eq!(found.as_deref(), Some("CM"));
        // First match wins; GG and HH were never probed.
        assert_eq!(
            library.source().fetched(),
            ["/probe/AA", "/probe/BB", "/probe/CC", "/probe/DD", "/probe/EE", "/probe/CM"]
        );
    }

    #[tokio::test]
    async fn scan_matches_case_insensitively() {
        let candidates = vec!["CM".to_string()];
        let mut docs = HashMap::new();
        docs.insert("/probe/CM".to_string(), member_doc(&["CMTRT"]));
        let library = CdiscLibrary::new(FakeSource::new(docs));

        let found = library
            .first_grouping_containing(
                &candidates,
                "cmtrt",
                None,
                |candidate| format!("/probe/{candidate}"),
                doc_contains,
            )
            .await;
        assert_eq!(found.as_deref(), Some("CM"));
    }

    #[tokio::test]
    async fn exhausted_scan_returns_none() {
        let candidates = vec!["DM".to_string(), "AE".to_string()];
        let mut docs = HashMap::new();
        docs.insert("/probe/DM".to_string(), member_doc(&["USUBJID"]));
        let library = CdiscLibrary::new(FakeSource::new(docs));

        let found = library
            .first_grouping_containing(
                &candidates,
                "CMTRT",
                None,
                |candidate| format!("/probe/{candidate}"),
                doc_contains,
            )
            .await;
        assert!(found.is_none());
    }
}
