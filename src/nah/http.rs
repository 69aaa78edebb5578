//! HTTP utilities for NahCloud REST API calls

use super::error::{Error, Result};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Per-request timeout applied when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
fn sanitize_for_log(body: &str) -> String {
    let char_count = body.chars().count();
    let truncated = if char_count > MAX_LOG_BODY_LENGTH {
        let head: String = body.chars().take(MAX_LOG_BODY_LENGTH).collect();
        format!("{}... [truncated, {} bytes total]", head, body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// HTTP client wrapper for NahCloud API calls
///
/// Holds the shared `reqwest` connection pool, the optional bearer token and,
/// for per-call views, a cancellation token. Cloning is cheap.
#[derive(Clone)]
pub struct NahHttpClient {
    client: Client,
    token: Option<String>,
    cancel: Option<CancellationToken>,
}

impl NahHttpClient {
    /// Create a new HTTP client
    pub fn new(token: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("nahcloud/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(Error::Transport)?;

        Ok(Self {
            client,
            token: token.filter(|t| !t.is_empty()),
            cancel: None,
        })
    }

    /// Clone of this client whose requests are aborted when `cancel` fires
    pub fn with_cancellation(&self, cancel: CancellationToken) -> Self {
        Self {
            client: self.client.clone(),
            token: self.token.clone(),
            cancel: Some(cancel),
        }
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Send a request and decode the JSON response body into `T`
    pub async fn request_json<B, T>(&self, method: Method, url: &str, body: Option<&B>) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response_body = self.send(method, url, body).await?;
        serde_json::from_str(&response_body).map_err(Error::Decode)
    }

    /// Send a request whose response body is ignored
    pub async fn request_empty(&self, method: Method, url: &str) -> Result<()> {
        self.send::<()>(method, url, None).await.map(|_| ())
    }

    /// Send a request and return the raw body text of a successful response
    pub async fn send<B>(&self, method: Method, url: &str, body: Option<&B>) -> Result<String>
    where
        B: Serialize + ?Sized,
    {
        tracing::debug!("{} {}", method, url);

        let mut request = self.client.request(method, url);

        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        if let Some(body) = body {
            let payload = serde_json::to_vec(body).map_err(Error::Encode)?;
            request = request.header(CONTENT_TYPE, "application/json").body(payload);
        }

        match &self.cancel {
            Some(cancel) => {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        tracing::debug!("Request cancelled by caller: {}", url);
                        Err(Error::Cancelled)
                    }
                    result = exchange(request) => result,
                }
            }
            None => exchange(request).await,
        }
    }
}

/// Perform the round trip and classify the status code
async fn exchange(request: RequestBuilder) -> Result<String> {
    let response = request.send().await.map_err(Error::from_reqwest)?;

    let status = response.status();
    let body = response.text().await.map_err(Error::from_reqwest)?;

    if status.as_u16() >= 400 {
        // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
        tracing::error!("API error: {} - {}", status, sanitize_for_log(&body));
        return Err(Error::Api {
            status: status.as_u16(),
            body,
        });
    }

    Ok(body)
}

/// Short operator-facing hint for an error, if one applies
pub fn error_hint(error: &Error) -> Option<&'static str> {
    match error {
        Error::Api { status: 401, .. } => {
            Some("Authentication failed. Set --token or NAH_TOKEN.")
        }
        Error::Api { status: 403, .. } => Some("Permission denied for this token."),
        Error::Api { status: 404, .. } => Some("Resource not found."),
        Error::Api { status: 409, .. } => {
            Some("Resource conflict. The resource may already exist or be in use.")
        }
        Error::Api { status, .. } if *status >= 500 => {
            Some("NahCloud service error. The request may or may not have been applied.")
        }
        Error::Timeout => Some("The request timed out. Raise --timeout or check the endpoint."),
        Error::Transport(_) => Some("Could not reach the service. Check --endpoint or NAH_ENDPOINT."),
        _ => None,
    }
}
