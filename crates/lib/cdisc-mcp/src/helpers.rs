use cdisc_core::{LibraryError, SourceError};
use rmcp::ErrorData;
use rmcp::model::{CallToolResult, Content};
use serde_json::{Map, Value};

/// Wraps a result record as a successful tool call.
pub(crate) fn record(value: Value) -> Result<CallToolResult, ErrorData> {
    Ok(CallToolResult::success(vec![Content::json(value)?]))
}

fn error_type(err: &LibraryError) -> &'static str {
    match err {
        LibraryError::InvalidStandard { .. }
        | LibraryError::InvalidMatchMode { .. }
        | LibraryError::MissingParameter(_) => "validation",
        LibraryError::NoVersionsFound { .. }
        | LibraryError::VariableNotFound { .. }
        | LibraryError::NoCodelists { .. } => "lookup",
        LibraryError::Source(source) => match source {
            SourceError::Http { .. } => "http",
            SourceError::Transport { .. } | SourceError::Decode { .. } | SourceError::Build(_) => {
                "transport"
            }
        },
    }
}

/// Builds an error record from a library failure plus caller context. Every
/// failure crosses the tool boundary as a record, never as a raised error.
pub(crate) fn failure(
    err: &LibraryError,
    context: &[(&str, Value)],
) -> Result<CallToolResult, ErrorData> {
    let mut fields = Map::new();
    fields.insert("error".to_string(), Value::String(err.to_string()));
    fields.insert(
        "error_type".to_string(),
        Value::String(error_type(err).to_string()),
    );
    for (key, value) in context {
        fields.insert((*key).to_string(), value.clone());
    }
    record(Value::Object(fields))
}

/// Builds a warning record: the query was valid, the value just was not
/// there. Distinct from [`failure`] so callers can tell the two apart.
pub(crate) fn warning(
    message: String,
    suggestion: &str,
    context: &[(&str, Value)],
) -> Result<CallToolResult, ErrorData> {
    let mut fields = Map::new();
    fields.insert("warning".to_string(), Value::String(message));
    fields.insert(
        "message".to_string(),
        Value::String(suggestion.to_string()),
    );
    for (key, value) in context {
        fields.insert((*key).to_string(), value.clone());
    }
    record(Value::Object(fields))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn validation_and_lookup_failures_are_distinguishable() {
        let validation = LibraryError::MissingParameter("codelist_value");
        let lookup = LibraryError::VariableNotFound {
            variable: "XXNOPE".to_string(),
            scope: "common SDTM-IG domains".to_string(),
        };
        assert_eq!(error_type(&validation), "validation");
        assert_eq!(error_type(&lookup), "lookup");
    }

    #[test]
    fn failure_records_carry_context_keys() {
        let err = LibraryError::InvalidStandard {
            given: "SDTMX".to_string(),
        };
        let result = failure(&err, &[("standard", json!("SDTMX"))]).expect("record builds");
        assert!(!result.is_error.unwrap_or(false));
    }
}
