//! Hugging Face Inference API provider
//!
//! Talks to the hosted text-generation endpoint at `{base}/models/{model_id}`.

use super::*;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

/// Hugging Face text-generation provider
pub struct HuggingFaceProvider {
    client: Client,
    config: ProviderConfig,
}

impl HuggingFaceProvider {
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(
                config.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            ))
            .build()
            .map_err(|e| ProviderError::Client(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn base_url(&self) -> &str {
        self.config
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_API_BASE)
            .trim_end_matches('/')
    }

    fn endpoint(&self, model: &Model) -> String {
        format!("{}/models/{}", self.base_url(), model.id())
    }
}

impl InferenceProvider for HuggingFaceProvider {
    fn name(&self) -> &str {
        "huggingface"
    }

    async fn generate(
        &self,
        model: &Model,
        prompt: &str,
        params: &InferenceParams,
    ) -> Result<String, ProviderError> {
        let url = self.endpoint(model);
        let body = GenerationRequest {
            inputs: prompt,
            parameters: *params,
        };

        let mut req = self.client.post(&url).json(&body);

        if let Some(api_key) = &self.config.api_key {
            if !api_key.is_empty() {
                req = req.header("Authorization", format!("Bearer {}", api_key));
            }
        }

        for (key, value) in &self.config.headers {
            req = req.header(key, value);
        }

        debug!(url = %url, prompt_len = prompt.len(), "sending generation request");

        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Network(format!("request timed out: {}", e))
            } else {
                ProviderError::Network(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok());
            let text = response.text().await.unwrap_or_default();
            warn!(status, model = model.id(), "inference request failed");

            return Err(match status {
                401 | 403 => ProviderError::AuthenticationFailed,
                429 => ProviderError::RateLimited { retry_after },
                503 => ProviderError::Unavailable(error_message(&text)),
                _ => ProviderError::Api {
                    status,
                    message: error_message(&text),
                },
            });
        }

        let value: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        let text = decode_generation(&value, status)?;
        debug!(completion_len = text.len(), "received completion");
        Ok(text)
    }
}

/// Pull `generated_text` out of a success body.
///
/// The endpoint answers either `[{"generated_text": ..}]` or
/// `{"generated_text": ..}`; an `{"error": ..}` object is reported as an
/// API failure even under a 2xx status.
fn decode_generation(value: &Value, status: u16) -> Result<String, ProviderError> {
    let candidate = match value {
        Value::Array(items) => items.first(),
        Value::Object(_) => Some(value),
        _ => None,
    };

    if let Some(text) = candidate
        .and_then(|c| c.get("generated_text"))
        .and_then(Value::as_str)
    {
        return Ok(text.to_string());
    }

    if let Some(err) = value.get("error") {
        let message = err
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| err.to_string());
        return Err(ProviderError::Api { status, message });
    }

    Err(ProviderError::EmptyResponse)
}

/// Error text from a failure body, preferring its `error` field
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn provider_for(server: &MockServer, token: Option<&str>) -> HuggingFaceProvider {
        let mut config = ProviderConfig::default().with_base_url(server.uri()).with_timeout(5);
        config.api_key = token.map(str::to_string);
        HuggingFaceProvider::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_generate_array_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/bigscience/bloomz-7b1"))
            .and(header("Authorization", "Bearer hf_secret"))
            .and(body_json(json!({
                "inputs": "Go CODE:\n",
                "parameters": {
                    "max_new_tokens": 500,
                    "temperature": 0.7,
                    "top_p": 0.95,
                    "do_sample": true
                }
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([{ "generated_text": "Go CODE:\nfmt.Println(1)" }])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider_for(&server, Some("hf_secret")).await;
        let text = provider
            .generate(&Model::Bloomz7b1, "Go CODE:\n", &InferenceParams::default())
            .await
            .unwrap();
        assert_eq!(text, "Go CODE:\nfmt.Println(1)");
    }

    #[tokio::test]
    async fn test_generate_object_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "generated_text": "x = 1" })))
            .mount(&server)
            .await;

        let provider = provider_for(&server, None).await;
        let text = provider
            .generate(&Model::default(), "p", &InferenceParams::default())
            .await
            .unwrap();
        assert_eq!(text, "x = 1");
    }

    #[tokio::test]
    async fn test_error_object_under_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "error": "input too long" })))
            .mount(&server)
            .await;

        let provider = provider_for(&server, None).await;
        let err = provider
            .generate(&Model::default(), "p", &InferenceParams::default())
            .await
            .unwrap_err();
        match err {
            ProviderError::Api { status, message } => {
                assert_eq!(status, 200);
                assert_eq!(message, "input too long");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let server = MockServer::start().await;
        Mock::given(path("/models/a/unavailable"))
            .respond_with(
                ResponseTemplate::new(503).set_body_json(json!({ "error": "Model is currently loading" })),
            )
            .mount(&server)
            .await;
        Mock::given(path("/models/a/limited"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "30"))
            .mount(&server)
            .await;
        Mock::given(path("/models/a/forbidden"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;
        Mock::given(path("/models/a/broken"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
            .mount(&server)
            .await;

        let provider = provider_for(&server, Some("t")).await;
        let params = InferenceParams::default();
        let call = |id: &str| Model::Custom(id.to_string());

        match provider.generate(&call("a/unavailable"), "p", &params).await {
            Err(ProviderError::Unavailable(msg)) => assert_eq!(msg, "Model is currently loading"),
            other => panic!("unexpected: {other:?}"),
        }
        match provider.generate(&call("a/limited"), "p", &params).await {
            Err(ProviderError::RateLimited { retry_after }) => assert_eq!(retry_after, Some(30)),
            other => panic!("unexpected: {other:?}"),
        }
        assert!(matches!(
            provider.generate(&call("a/forbidden"), "p", &params).await,
            Err(ProviderError::AuthenticationFailed)
        ));
        match provider.generate(&call("a/broken"), "p", &params).await {
            Err(ProviderError::Api { status, message }) => {
                assert_eq!(status, 500);
                assert_eq!(message, "internal");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unusable_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "score": 0.3 }])))
            .mount(&server)
            .await;

        let provider = provider_for(&server, None).await;
        let err = provider
            .generate(&Model::default(), "p", &InferenceParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_network_failure() {
        let config = ProviderConfig::default()
            .with_base_url("http://127.0.0.1:9")
            .with_timeout(2);
        let provider = HuggingFaceProvider::new(config).unwrap();
        let err = provider
            .generate(&Model::default(), "p", &InferenceParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Network(_)));
    }

    #[tokio::test]
    async fn test_timeout_is_network_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([{"generated_text": "late"}]))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let config = ProviderConfig::default().with_base_url(server.uri()).with_timeout(1);
        let provider = HuggingFaceProvider::new(config).unwrap();
        let err = provider
            .generate(&Model::default(), "p", &InferenceParams::default())
            .await
            .unwrap_err();
        assert!(matches!(&err, ProviderError::Network(msg) if msg.contains("timed out")));
        assert_eq!(
            err.into_error("huggingface", &Model::default()).kind(),
            ErrorKind::NetworkFailed
        );
    }

    #[test]
    fn test_endpoint() {
        let config = ProviderConfig::default().with_base_url("http://localhost:8080/");
        let provider = HuggingFaceProvider::new(config).unwrap();
        assert_eq!(
            provider.endpoint(&Model::CodeLlama7bInstruct),
            "http://localhost:8080/models/codellama/CodeLlama-7b-Instruct-hf"
        );
    }
}
