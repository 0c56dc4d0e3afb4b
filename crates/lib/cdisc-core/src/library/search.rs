//! Full-text search across the library's published standards.

use serde::Serialize;
use serde_json::Value;

use crate::client::{HeaderOverrides, LibrarySource, query_string};

use super::{CdiscLibrary, LibraryError};

/// Default and ceiling for the number of hits returned to a caller.
pub const DEFAULT_SEARCH_LIMIT: usize = 10;
pub const MAX_SEARCH_LIMIT: usize = 100;

/// Search outcome: the echoed query, the server-side hit count, and the
/// truncated hit page.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResults {
    pub query: String,
    #[serde(rename = "totalHits")]
    pub total_hits: u64,
    #[serde(rename = "returnedHits")]
    pub returned_hits: usize,
    pub hits: Vec<Value>,
}

fn clamp_limit(limit: Option<usize>) -> usize {
    limit
        .unwrap_or(DEFAULT_SEARCH_LIMIT)
        .clamp(1, MAX_SEARCH_LIMIT)
}

impl<S: LibrarySource> CdiscLibrary<S> {
    /// Runs a search query, returning at most `limit` hits (default 10,
    /// capped at 100).
    ///
    /// # Errors
    /// Returns `MissingParameter` for a blank query, plus fetch failures.
    pub async fn search(
        &self,
        query: &str,
        limit: Option<usize>,
        headers: Option<&HeaderOverrides>,
    ) -> Result<SearchResults, LibraryError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(LibraryError::MissingParameter("query"));
        }
        let limit = clamp_limit(limit);
        let path = format!(
            "/mdr/search?{}",
            query_string(&[("q", query), ("pageSize", &limit.to_string())])
        );
        let doc = self.source().get_json(&path, headers).await?;

        let total_hits = doc.get("totalHits").and_then(Value::as_u64).unwrap_or(0);
        let mut hits: Vec<Value> = doc
            .get("hits")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        hits.truncate(limit);
        let returned_hits = hits.len();

        Ok(SearchResults {
            query: query.to_string(),
            total_hits,
            returned_hits,
            hits,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_defaults_and_clamps() {
        assert_eq!(clamp_limit(None), 10);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(25)), 25);
        assert_eq!(clamp_limit(Some(1000)), 100);
    }

    #[test]
    fn results_serialize_with_camel_case_hit_counts() {
        let results = SearchResults {
            query: "USUBJID".to_string(),
            total_hits: 42,
            returned_hits: 1,
            hits: vec![serde_json::json!({"type": "SDTM Dataset Variable"})],
        };
        let value = serde_json::to_value(&results).expect("serializable");
        assert_eq!(value["totalHits"], 42);
        assert_eq!(value["returnedHits"], 1);
        assert_eq!(value["query"], "USUBJID");
    }
}
