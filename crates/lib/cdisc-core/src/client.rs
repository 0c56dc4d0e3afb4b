//! HTTP fetch layer for the CDISC Library API.
//!
//! The resolvers and lookup helpers never talk to `reqwest` directly; they go
//! through the [`LibrarySource`] trait so tests can substitute an in-memory
//! JSON source.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

/// Per-call header override map. When supplied it replaces the default header
/// set entirely for every fetch in the call chain.
pub type HeaderOverrides = HashMap<String, String>;

const DEFAULT_BASE_URL: &str = "https://api.library.cdisc.org/api";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug)]
pub enum SourceError {
    Transport { url: String, message: String },
    Http { url: String, status: u16 },
    Decode { url: String, message: String },
    Build(String),
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport { url, message } => {
                write!(f, "request to {url} failed: {message}")
            }
            Self::Http { url, status } => {
                write!(f, "request to {url} returned HTTP {status}")
            }
            Self::Decode { url, message } => {
                write!(f, "response from {url} was not valid JSON: {message}")
            }
            Self::Build(message) => write!(f, "failed to build HTTP client: {message}"),
        }
    }
}

impl Error for SourceError {}

/// Abstract GET-a-JSON-document capability against the CDISC Library.
///
/// `path` is relative to the configured base URL (e.g. `/mdr/ct/packages`).
#[async_trait]
pub trait LibrarySource: Send + Sync + 'static {
    async fn get_json(
        &self,
        path: &str,
        headers: Option<&HeaderOverrides>,
    ) -> Result<Value, SourceError>;
}

/// Connection settings for the hosted CDISC Library API.
#[derive(Debug, Clone)]
pub struct LibraryConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl LibraryConfig {
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// `reqwest`-backed [`LibrarySource`] that attaches the api-key and accept
/// headers unless the caller overrides them.
#[derive(Clone)]
pub struct HttpLibraryClient {
    http: reqwest::Client,
    config: LibraryConfig,
}

impl HttpLibraryClient {
    /// Builds the client with the configured request timeout.
    ///
    /// # Errors
    /// Returns `SourceError::Build` if the underlying client cannot be
    /// constructed.
    pub fn new(config: LibraryConfig) -> Result<Self, SourceError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| SourceError::Build(err.to_string()))?;
        Ok(Self { http, config })
    }

    fn url_for(&self, path: &str) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        format!("{base}{path}")
    }
}

#[async_trait]
impl LibrarySource for HttpLibraryClient {
    async fn get_json(
        &self,
        path: &str,
        headers: Option<&HeaderOverrides>,
    ) -> Result<Value, SourceError> {
        let url = self.url_for(path);
        let mut request = self.http.get(&url);
        match headers {
            Some(overrides) => {
                for (name, value) in overrides {
                    request = request.header(name.as_str(), value.as_str());
                }
            }
            None => {
                request = request
                    .header("api-key", self.config.api_key.as_str())
                    .header("accept", "application/json");
            }
        }

        let response = request.send().await.map_err(|err| SourceError::Transport {
            url: url.clone(),
            message: err.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Http {
                url,
                status: status.as_u16(),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|err| SourceError::Decode {
                url,
                message: err.to_string(),
            })
    }
}

/// Renders `pairs` as a URL query string, percent-encoding as needed.
#[must_use]
pub fn query_string(pairs: &[(&str, &str)]) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (name, value) in pairs {
        serializer.append_pair(name, value);
    }
    serializer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_for_joins_without_doubled_slash() {
        let config = LibraryConfig::new("key").with_base_url("https://example.test/api/");
        let client = HttpLibraryClient::new(config).expect("client should build");
        assert_eq!(
            client.url_for("/mdr/ct/packages"),
            "https://example.test/api/mdr/ct/packages"
        );
    }

    #[test]
    fn query_string_encodes_values() {
        assert_eq!(
            query_string(&[("q", "blood pressure"), ("pageSize", "10")]),
            "q=blood+pressure&pageSize=10"
        );
    }
}
