//! REST API client for the generation provider.
//!
//! Wraps the provider's HTTP API (generation submission and status,
//! custom model training) using [`reqwest`].

use std::time::Duration;

use atelier_core::types::JobId;

use crate::messages::{
    CreateModelRequest, GenerationStatus, ModelList, ModelRecord, SubmitGenerationRequest,
    SubmitGenerationResponse,
};

/// HTTP timeout for a single provider call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the generation provider.
pub struct GenerationApi {
    client: reqwest::Client,
    api_url: String,
    base: reqwest::Url,
    api_key: Option<String>,
}

/// Errors from the provider REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider returned a non-2xx status code.
    #[error("Provider API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// A success response whose body did not match the expected shape.
    #[error("Provider response could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),

    /// A submission was accepted but returned no job IDs.
    #[error("Provider accepted the submission but returned no jobs")]
    EmptySubmission,

    /// The configured base URL cannot carry a path.
    #[error("Invalid provider URL '{0}'")]
    InvalidUrl(String),

    /// An ID that cannot name a provider resource (empty, `.` or `..`).
    #[error("Invalid provider resource ID '{0}'")]
    InvalidId(String),
}

impl ProviderError {
    /// `true` when the provider said the resource does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ApiError { status: 404, .. } | Self::InvalidId(_))
    }
}

impl GenerationApi {
    /// Create a new API client.
    ///
    /// * `api_url` - Base HTTP URL, e.g. `https://api.example-imagegen.com`.
    /// * `api_key` - Bearer token; empty keys are not sent.
    pub fn new(api_url: String, api_key: Option<String>) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Self::with_client(client, api_url, api_key)
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    pub fn with_client(
        client: reqwest::Client,
        api_url: String,
        api_key: Option<String>,
    ) -> Result<Self, ProviderError> {
        let api_url = api_url.trim_end_matches('/').to_string();
        let base = reqwest::Url::parse(&api_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| ProviderError::InvalidUrl(api_url.clone()))?;

        Ok(Self {
            client,
            api_url,
            base,
            api_key: api_key.filter(|k| !k.is_empty()),
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Queue one generation per requested image.
    ///
    /// Sends `POST /v1/generations` and returns the provider job IDs in
    /// the order the provider listed them.
    pub async fn submit_generation(
        &self,
        request: &SubmitGenerationRequest,
    ) -> Result<Vec<JobId>, ProviderError> {
        let response = self
            .authorized(self.client.post(self.endpoint(&["v1", "generations"])))
            .json(request)
            .send()
            .await?;

        let body: SubmitGenerationResponse = Self::parse_response(response).await?;
        let ids: Vec<JobId> = body.generations.into_iter().map(|g| g.id).collect();
        if ids.is_empty() {
            return Err(ProviderError::EmptySubmission);
        }

        tracing::info!(count = ids.len(), "Generations submitted to provider");
        Ok(ids)
    }

    /// Fetch the current status of one generation (`GET /v1/generations/{id}`).
    pub async fn generation_status(&self, id: &JobId) -> Result<GenerationStatus, ProviderError> {
        let url = self.resource_endpoint("generations", id.as_str())?;
        let response = self
            .authorized(self.client.get(url))
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Start training a custom model (`POST /v1/models`).
    pub async fn create_model(
        &self,
        request: &CreateModelRequest,
    ) -> Result<ModelRecord, ProviderError> {
        let response = self
            .authorized(self.client.post(self.endpoint(&["v1", "models"])))
            .json(request)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Fetch one model (`GET /v1/models/{id}`).
    pub async fn get_model(&self, id: &str) -> Result<ModelRecord, ProviderError> {
        let url = self.resource_endpoint("models", id)?;
        let response = self
            .authorized(self.client.get(url))
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// List the account's models (`GET /v1/models`).
    pub async fn list_models(&self) -> Result<Vec<ModelRecord>, ProviderError> {
        let response = self
            .authorized(self.client.get(self.endpoint(&["v1", "models"])))
            .send()
            .await?;

        let body: ModelList = Self::parse_response(response).await?;
        Ok(body.models)
    }

    // ---- private helpers ----

    /// Join path segments onto the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> reqwest::Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// `/v1/{collection}/{id}`. The ID stays a single path segment, so
    /// separators and query characters in it are escaped.
    fn resource_endpoint(&self, collection: &str, id: &str) -> Result<reqwest::Url, ProviderError> {
        if matches!(id, "" | "." | "..") {
            return Err(ProviderError::InvalidId(id.to_string()));
        }
        Ok(self.endpoint(&["v1", collection, id]))
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`ProviderError::ApiError`]
    /// containing the status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ProviderError> {
        let response = Self::ensure_success(response).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
