//! REST API client for the execution service.
//!
//! Wraps the two HTTP endpoints (submission, status) using [`reqwest`].
//! The [`JobApi`] trait is the seam the polling client is written
//! against, so tests can drive it with a scripted transport.

use async_trait::async_trait;
use coderun_core::types::JobToken;

use crate::config::JudgeConfig;
use crate::wire::{SubmissionDetails, SubmissionRequest, SubmitResponse};

/// Query parameters sent with every request: ask for base64 bodies and
/// every response field.
const QUERY_PARAMS: [(&str, &str); 2] = [("base64_encoded", "true"), ("fields", "*")];

const HEADER_API_KEY: &str = "X-RapidAPI-Key";
const HEADER_API_HOST: &str = "X-RapidAPI-Host";

/// Errors from the REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum JudgeApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("Execution API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The configured endpoint cannot carry a token path segment.
    #[error("Invalid execution API URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Failure reported by a non-HTTP transport.
    #[error("Transport error: {0}")]
    Transport(String),
}

impl JudgeApiError {
    /// Whether repeating the same request could plausibly succeed.
    ///
    /// Network failures, 5xx responses and 429 are transient; other 4xx
    /// responses are not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Request(_) | Self::Transport(_) => true,
            Self::ApiError { status, .. } => *status >= 500 || *status == 429,
            Self::InvalidUrl { .. } => false,
        }
    }
}

/// Transport for the two execution-service operations.
#[async_trait]
pub trait JobApi: Send + Sync {
    /// Create a job and return its token. Exactly one request.
    async fn submit(&self, request: &SubmissionRequest) -> Result<JobToken, JudgeApiError>;

    /// Fetch the current state of a job. Exactly one request.
    async fn status(&self, token: &JobToken) -> Result<SubmissionDetails, JudgeApiError>;
}

/// HTTP client for a single execution-service deployment.
pub struct JudgeApi {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
    api_host: Option<String>,
}

impl JudgeApi {
    /// Create a client with its own connection pool and the configured
    /// request timeout.
    pub fn new(config: &JudgeConfig) -> Result<Self, JudgeApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self::with_client(client, config))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: &JudgeConfig) -> Self {
        Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            api_host: config.api_host.clone(),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Submit source code for execution.
    ///
    /// Sends `POST {api_url}?base64_encoded=true&fields=*` and returns the
    /// service-assigned token.
    pub async fn create_submission(
        &self,
        body: &SubmissionRequest,
    ) -> Result<SubmitResponse, JudgeApiError> {
        let response = self
            .authorize(self.client.post(&self.api_url))
            .query(&QUERY_PARAMS[..])
            .json(body)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Retrieve the state of a submission.
    ///
    /// Sends `GET {api_url}/{token}?base64_encoded=true&fields=*`.
    pub async fn get_submission(&self, token: &str) -> Result<SubmissionDetails, JudgeApiError> {
        let response = self
            .authorize(self.client.get(self.status_url(token)?))
            .query(&QUERY_PARAMS[..])
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// `{api_url}/{token}`, with the token percent-encoded as a single
    /// path segment.
    pub fn status_url(&self, token: &str) -> Result<reqwest::Url, JudgeApiError> {
        let invalid = |reason: String| JudgeApiError::InvalidUrl {
            url: self.api_url.clone(),
            reason,
        };

        let mut url = reqwest::Url::parse(&self.api_url).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| invalid("URL cannot be a base".to_string()))?
            .pop_if_empty()
            .push(token);
        Ok(url)
    }

    // ---- private helpers ----

    /// Attach the gateway credentials that are configured.
    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let builder = match &self.api_key {
            Some(key) => builder.header(HEADER_API_KEY, key),
            None => builder,
        };
        match &self.api_host {
            Some(host) => builder.header(HEADER_API_HOST, host),
            None => builder,
        }
    }

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`JudgeApiError::ApiError`]
    /// containing the status and body text on failure.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, JudgeApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(JudgeApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, JudgeApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl JobApi for JudgeApi {
    async fn submit(&self, request: &SubmissionRequest) -> Result<JobToken, JudgeApiError> {
        let response = self.create_submission(request).await?;
        Ok(JobToken::new(response.token))
    }

    async fn status(&self, token: &JobToken) -> Result<SubmissionDetails, JudgeApiError> {
        self.get_submission(token.as_str()).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
