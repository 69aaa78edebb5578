//! NahCloud Client
//!
//! Main client for the NahCloud API, combining configuration, URL building
//! and the HTTP layer. Per-entity operations live in sibling modules as
//! further `impl NahClient` blocks.

use super::error::{Error, Result};
use super::http::{NahHttpClient, DEFAULT_TIMEOUT};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Endpoint used when none is configured
pub const DEFAULT_ENDPOINT: &str = "https://nahcloud.com";

/// Construction-time settings for [`NahClient`]
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL; empty means [`DEFAULT_ENDPOINT`]
    pub endpoint: String,
    /// Bearer token; `None` or empty sends unauthenticated requests
    pub token: Option<String>,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            token: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Main NahCloud client
///
/// Configuration is fixed at construction. Clones share the underlying
/// connection pool and can be used from many tasks at once.
#[derive(Clone)]
pub struct NahClient {
    pub http: NahHttpClient,
    endpoint: String,
}

impl NahClient {
    /// Create a client for `endpoint` with an optional bearer token
    pub fn new(endpoint: &str, token: Option<&str>) -> Result<Self> {
        let mut config = ClientConfig::new(endpoint);
        config.token = token.map(str::to_string);
        Self::from_config(&config)
    }

    /// Create a client from a full [`ClientConfig`]
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let endpoint = normalize_endpoint(&config.endpoint)?;
        let http = NahHttpClient::new(config.token.clone(), config.timeout)?;

        tracing::debug!(
            "NahCloud client configured: endpoint={}, authenticated={}",
            endpoint,
            http.has_token()
        );

        Ok(Self { http, endpoint })
    }

    /// Clone of this client whose calls fail with [`Error::Cancelled`] once
    /// `cancel` fires. In-flight requests are aborted.
    pub fn with_cancellation(&self, cancel: CancellationToken) -> Self {
        Self {
            http: self.http.with_cancellation(cancel),
            endpoint: self.endpoint.clone(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    // =========================================================================
    // URL helpers
    // =========================================================================

    /// Build an API URL from a path that starts with `/`
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path)
    }

    /// `/v1/{collection}`
    pub fn collection_url(&self, collection: &str) -> String {
        self.api_url(&format!("/v1/{}", collection))
    }

    /// `/v1/{collection}/{id}`
    pub fn item_url(&self, collection: &str, id: &str) -> Result<String> {
        let id = path_segment("id", id)?;
        Ok(self.api_url(&format!("/v1/{}/{}", collection, id)))
    }

    /// `/v1/bucket/{bucket_id}/objects`
    pub fn bucket_objects_url(&self, bucket_id: &str) -> Result<String> {
        let bucket_id = path_segment("bucket_id", bucket_id)?;
        Ok(self.api_url(&format!("/v1/bucket/{}/objects", bucket_id)))
    }

    /// `/v1/bucket/{bucket_id}/objects/{id}`
    pub fn bucket_object_url(&self, bucket_id: &str, id: &str) -> Result<String> {
        let base = self.bucket_objects_url(bucket_id)?;
        let id = path_segment("id", id)?;
        Ok(format!("{}/{}", base, id))
    }
}

/// Apply the default, strip trailing slashes and check the URL parses
fn normalize_endpoint(endpoint: &str) -> Result<String> {
    let endpoint = endpoint.trim();
    let endpoint = if endpoint.is_empty() {
        DEFAULT_ENDPOINT
    } else {
        endpoint
    };

    let parsed = Url::parse(endpoint)
        .map_err(|e| Error::InvalidEndpoint(format!("{}: {}", endpoint, e)))?;
    if parsed.cannot_be_a_base() || !matches!(parsed.scheme(), "http" | "https") {
        return Err(Error::InvalidEndpoint(format!(
            "{}: expected an http(s) base URL",
            endpoint
        )));
    }

    Ok(endpoint.trim_end_matches('/').to_string())
}

/// Percent-encode an identifier for use as a single path segment.
/// `.` and `..` are refused: URL normalisation would resolve them against
/// the surrounding path and address a different resource.
fn path_segment(field: &str, value: &str) -> Result<String> {
    if value.is_empty() {
        return Err(Error::InvalidRequest(format!("{} must not be empty", field)));
    }
    if value == "." || value == ".." {
        return Err(Error::InvalidRequest(format!(
            "{} must not be a relative path segment: {:?}",
            field, value
        )));
    }
    Ok(urlencoding::encode(value).into_owned())
}
