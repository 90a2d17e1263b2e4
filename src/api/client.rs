//! HTTP client for the agent backend.
//!
//! `AgentBackend` is the seam surfaces depend on; `HttpBackend` is the
//! reqwest implementation. Tests substitute a `wiremock` server for the
//! backend rather than mocking the trait.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::de::DeserializeOwned;

use super::types::{self, Envelope, RouteAndRunResponse};
use crate::core::insight::TripInsight;
use crate::core::request::AgentRequest;
use crate::core::result::BackendResult;

/// Errors from talking to the backend. None of these reach the transcript
/// directly; the surface turns each into a failed result.
#[derive(Debug)]
pub enum ApiError {
    /// Timeout, DNS, connection refused. Retryable.
    Network(String),
    /// Non-2xx HTTP status.
    Api { status: u16, message: String },
    /// The body was a `success: false` envelope.
    Envelope { code: String, message: String },
    /// The body could not be decoded.
    Parse(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(msg) => write!(f, "network error: {msg}"),
            ApiError::Api { status, message } => {
                write!(f, "API error (HTTP {status}): {message}")
            }
            ApiError::Envelope { code, message } => write!(f, "backend error {code}: {message}"),
            ApiError::Parse(msg) => write!(f, "parse error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// The backend's own explanation, worth showing to the user as is.
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            ApiError::Envelope { message, .. } => Some(message),
            _ => None,
        }
    }
}

#[async_trait]
pub trait AgentBackend: Send + Sync {
    /// Routes one user message and runs it to a result.
    async fn route_and_run(&self, request: &AgentRequest) -> Result<BackendResult, ApiError>;

    async fn trip_insight(&self, trip_id: &str) -> Result<TripInsight, ApiError>;
}

pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Checks the HTTP status, then unwraps the `{success, data}` envelope.
    async fn read_envelope<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();
        debug!("Backend response status: {}", status);

        if !status.is_success() {
            let err_body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            warn!("Backend API error: {} - {}", status.as_u16(), err_body);
            return Err(ApiError::Api {
                status: status.as_u16(),
                message: err_body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let envelope: Envelope<T> =
            serde_json::from_str(&body).map_err(|e| ApiError::Parse(e.to_string()))?;

        types::decode_envelope(envelope).map_err(|(code, message)| {
            warn!("Backend returned error envelope: {} - {}", code, message);
            ApiError::Envelope { code, message }
        })
    }
}

#[async_trait]
impl AgentBackend for HttpBackend {
    async fn route_and_run(&self, request: &AgentRequest) -> Result<BackendResult, ApiError> {
        info!(
            "route_and_run request_id={} webbrowse={}",
            request.request_id, request.options.allow_webbrowse
        );

        let response = self
            .client
            .post(format!("{}/agent/route_and_run", self.base_url))
            .json(request)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let wire: RouteAndRunResponse = Self::read_envelope(response).await?;
        let result = types::decode(wire);
        info!(
            "route_and_run response request_id={:?} status={:?}",
            result.request_id, result.status
        );
        Ok(result)
    }

    async fn trip_insight(&self, trip_id: &str) -> Result<TripInsight, ApiError> {
        debug!("Fetching trip insight for {}", trip_id);
        let response = self
            .client
            .get(format!("{}/trips/{}/insight", self.base_url, trip_id))
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Self::read_envelope(response).await
    }
}
