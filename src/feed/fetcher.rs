use futures::StreamExt;
use reqwest::header::{IF_MODIFIED_SINCE, LAST_MODIFIED};
use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_MAX_FEED_SIZE: usize = 10 * 1024 * 1024; // 10MB

/// Errors that can occur while fetching a feed document.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The URL could not be parsed or does not use http(s)
    #[error("Invalid feed URL: {0}")]
    InvalidUrl(String),
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with a status other than 2xx or 304
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Request exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,
    /// Response body exceeded the configured size limit
    #[error("Response too large")]
    ResponseTooLarge,
    /// Response body is not valid UTF-8
    #[error("Response is not valid UTF-8")]
    InvalidUtf8,
}

/// Per-request limits for [`fetch_feed`].
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub timeout: Duration,
    pub max_size: usize,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_size: DEFAULT_MAX_FEED_SIZE,
        }
    }
}

/// Outcome of a conditional fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The server returned a document.
    Fetched {
        body: String,
        /// `Last-Modified` header, to send back on the next fetch.
        last_modified: Option<String>,
    },
    /// The server answered 304; the stored record is still current.
    NotModified,
}

/// Fetches a feed document, conditionally when a previous marker is known.
///
/// `last_modified` is the marker stored from the previous successful fetch
/// and is sent as `If-Modified-Since`.
///
/// # Errors
///
/// Returns [`FetchError`] for invalid URLs, network failures, non-success
/// statuses, timeouts, oversized or non-UTF-8 bodies.
pub async fn fetch_feed(
    client: &reqwest::Client,
    url: &str,
    last_modified: Option<&str>,
    options: &FetchOptions,
) -> Result<FetchOutcome, FetchError> {
    let parsed = url::Url::parse(url).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(FetchError::InvalidUrl(format!(
            "unsupported scheme '{}'",
            parsed.scheme()
        )));
    }

    let mut request = client.get(parsed);
    if let Some(marker) = last_modified {
        request = request.header(IF_MODIFIED_SINCE, marker);
    }

    let response = tokio::time::timeout(options.timeout, request.send())
        .await
        .map_err(|_| FetchError::Timeout)?
        .map_err(FetchError::Network)?;

    if response.status() == StatusCode::NOT_MODIFIED {
        tracing::debug!(feed = %url, "Feed not modified since last fetch");
        return Ok(FetchOutcome::NotModified);
    }

    if !response.status().is_success() {
        return Err(FetchError::HttpStatus(response.status().as_u16()));
    }

    let last_modified = response
        .headers()
        .get(LAST_MODIFIED)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let bytes = tokio::time::timeout(options.timeout, read_limited_bytes(response, options.max_size))
        .await
        .map_err(|_| FetchError::Timeout)??;

    let body = String::from_utf8(bytes).map_err(|_| FetchError::InvalidUtf8)?;
    tracing::debug!(feed = %url, bytes = body.len(), "Fetched feed");

    Ok(FetchOutcome::Fetched {
        body,
        last_modified,
    })
}

/// Reads a response body, failing once it grows past `limit` bytes.
async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(FetchError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(FetchError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}
