//! # Inference Provider Interface
//!
//! A trait-based abstraction over hosted text-generation endpoints.
//!
//! ## Design
//! - `InferenceProvider` trait: one prompt in, one raw completion out
//! - `HuggingFaceProvider`: the Hugging Face Inference API (`/models/{id}`)
//! - `ProviderError` keeps transport, status and decoding failures apart
//!   until the pipeline turns them into a `codegenie_error::Error`
//!
//! One call, one request: providers never retry.

pub mod huggingface;

pub use huggingface::HuggingFaceProvider;

use crate::error::{Error, ErrorKind};
use crate::model::Model;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const DEFAULT_API_BASE: &str = "https://api-inference.huggingface.co";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

// ============================================================================
// Core Types
// ============================================================================

/// Sampling parameters sent with every request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InferenceParams {
    pub max_new_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub do_sample: bool,
}

impl Default for InferenceParams {
    fn default() -> Self {
        Self {
            max_new_tokens: 500,
            temperature: 0.7,
            top_p: 0.95,
            do_sample: true,
        }
    }
}

impl InferenceParams {
    pub fn with_max_new_tokens(mut self, max: u32) -> Self {
        self.max_new_tokens = max;
        self
    }
}

/// Body of a text-generation request
#[derive(Debug, Clone, Serialize)]
pub struct GenerationRequest<'a> {
    pub inputs: &'a str,
    pub parameters: InferenceParams,
}

// ============================================================================
// Provider Trait
// ============================================================================

/// Error type for provider operations
#[derive(Debug)]
pub enum ProviderError {
    /// Network/connection error, including timeouts
    Network(String),
    /// API returned a non-success status
    Api { status: u16, message: String },
    /// Failed to parse response
    Parse(String),
    /// Response parsed but carried no generated text
    EmptyResponse,
    /// Rate limited
    RateLimited { retry_after: Option<u64> },
    /// Model is loading or the service is down
    Unavailable(String),
    /// Authentication failed
    AuthenticationFailed,
    /// Could not build the HTTP client
    Client(String),
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Network(e) => write!(f, "Network error: {}", e),
            Self::Api { status, message } => {
                write!(f, "API request failed with status code {}: {}", status, message)
            }
            Self::Parse(e) => write!(f, "Parse error: {}", e),
            Self::EmptyResponse => write!(f, "No usable text in response"),
            Self::RateLimited { retry_after } => {
                write!(f, "Rate limited")?;
                if let Some(secs) = retry_after {
                    write!(f, " (retry after {}s)", secs)?;
                }
                Ok(())
            }
            Self::Unavailable(e) => write!(f, "Model unavailable: {}", e),
            Self::AuthenticationFailed => write!(f, "Authentication failed"),
            Self::Client(e) => write!(f, "HTTP client error: {}", e),
        }
    }
}

impl std::error::Error for ProviderError {}

impl ProviderError {
    /// Convert into the workspace error, tagging the provider and model.
    pub fn into_error(self, provider: &str, model: &Model) -> Error {
        let kind = match &self {
            Self::Network(_) => ErrorKind::NetworkFailed,
            Self::Api { .. } | Self::Parse(_) => ErrorKind::InferenceFailed,
            Self::EmptyResponse => ErrorKind::EmptyCompletion,
            Self::RateLimited { .. } => ErrorKind::RateLimited,
            Self::Unavailable(_) => ErrorKind::ProviderUnavailable,
            Self::AuthenticationFailed => ErrorKind::AuthenticationFailed,
            Self::Client(_) => ErrorKind::ConfigInvalid,
        };
        let mut err = Error::new(kind, self.to_string())
            .with_operation("provider::generate")
            .with_context("provider", provider)
            .with_context("model", model.id());
        if let Self::Api { status, .. } = &self {
            err = err.with_context("status", status.to_string());
        }
        err.set_source(self)
    }
}

/// A hosted text-generation endpoint
#[allow(async_fn_in_trait)]
pub trait InferenceProvider: Send + Sync {
    /// Get the provider name (e.g., "huggingface")
    fn name(&self) -> &str;

    /// Send one prompt and return the raw completion text, which may
    /// include the echoed prompt.
    async fn generate(
        &self,
        model: &Model,
        prompt: &str,
        params: &InferenceParams,
    ) -> Result<String, ProviderError>;
}

// ============================================================================
// Provider Configuration
// ============================================================================

/// Configuration for creating providers
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub headers: HashMap<String, String>,
    pub timeout_secs: Option<u64>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: Some(DEFAULT_API_BASE.into()),
            headers: HashMap::new(),
            timeout_secs: Some(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ProviderConfig {
    pub fn huggingface(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params() {
        let params = InferenceParams::default();
        assert_eq!(params.max_new_tokens, 500);
        assert_eq!(params.temperature, 0.7);
        assert_eq!(params.top_p, 0.95);
        assert!(params.do_sample);
    }

    #[test]
    fn test_request_body_shape() {
        let request = GenerationRequest {
            inputs: "Write code",
            parameters: InferenceParams::default().with_max_new_tokens(64),
        };
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["inputs"], "Write code");
        assert_eq!(body["parameters"]["max_new_tokens"], 64);
        assert_eq!(body["parameters"]["do_sample"], true);
        assert_eq!(body.as_object().unwrap().len(), 2);
        assert_eq!(body["parameters"].as_object().unwrap().len(), 4);
    }

    #[test]
    fn test_provider_config() {
        let config = ProviderConfig::huggingface("hf_test").with_timeout(5);
        assert_eq!(config.api_key.as_deref(), Some("hf_test"));
        assert_eq!(config.base_url.as_deref(), Some(DEFAULT_API_BASE));
        assert_eq!(config.timeout_secs, Some(5));
    }

    #[test]
    fn test_error_conversion() {
        let err = ProviderError::Api {
            status: 500,
            message: "boom".into(),
        }
        .into_error("huggingface", &Model::Bloomz7b1);
        assert_eq!(err.kind(), ErrorKind::InferenceFailed);
        assert_eq!(err.message(), "API request failed with status code 500: boom");
        assert!(err.context().contains(&("status", "500".to_string())));

        let err = ProviderError::Network("timed out".into()).into_error("huggingface", &Model::default());
        assert_eq!(err.kind(), ErrorKind::NetworkFailed);
        assert!(err.is_retryable());

        let err = ProviderError::EmptyResponse.into_error("huggingface", &Model::default());
        assert_eq!(err.kind(), ErrorKind::EmptyCompletion);
    }
}
