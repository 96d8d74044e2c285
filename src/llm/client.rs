//! Model invocation client.
//!
//! One [`ModelClient`] is built at startup and shared read-only by every
//! analyzer. [`GeminiClient`] talks to the Gemini `generateContent` API;
//! [`OfflineClient`] refuses every call so the analyzers take their local
//! fallback paths.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Base delay between retries; multiplied by the attempt number.
const RETRY_BACKOFF_MS: u64 = 250;

/// The key travels in a header so it never appears in request URLs or errors.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Per-call generation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GenerationConfig {
    /// Upper bound on the reply length, in tokens.
    pub max_output_tokens: u32,
    /// Sampling temperature (0.0 - 1.0).
    pub temperature: f32,
}

impl GenerationConfig {
    pub const fn new(max_output_tokens: u32, temperature: f32) -> Self {
        Self {
            max_output_tokens,
            temperature,
        }
    }
}

/// The model service could not be reached or refused the request.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum InvocationError {
    #[error("request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("cannot connect to model service at {url}")]
    Connect { url: String },

    #[error("model service rejected the credential ({status}): {body}")]
    Unauthorized { status: u16, body: String },

    #[error("model quota exhausted: {0}")]
    QuotaExhausted(String),

    #[error("model service error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("failed to send request: {0}")]
    Request(String),

    #[error("malformed model response: {0}")]
    MalformedResponse(String),

    #[error("model returned no text")]
    EmptyResponse,

    #[error("no API credential configured (set GEMINI_API_KEY)")]
    MissingCredential,

    #[error("model calls disabled (offline mode)")]
    Offline,
}

impl InvocationError {
    /// Whether another attempt could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            InvocationError::Timeout { .. }
            | InvocationError::Connect { .. }
            | InvocationError::QuotaExhausted(_) => true,
            InvocationError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// A single authenticated channel to the model service.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Send one prompt and return the raw reply text.
    async fn invoke(&self, prompt: &str, config: GenerationConfig)
        -> Result<String, InvocationError>;

    /// Name of the model behind this client.
    fn model_name(&self) -> &str;
}

/// Connection settings for [`GeminiClient`].
#[derive(Clone)]
pub struct GeminiConfig {
    pub api_url: String,
    pub model_name: String,
    pub api_key: Option<String>,
    pub timeout_seconds: u64,
    pub retries: usize,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_url: "https://generativelanguage.googleapis.com".to_string(),
            model_name: "gemini-2.0-flash-exp".to_string(),
            api_key: None,
            timeout_seconds: 60,
            retries: 2,
        }
    }
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_url", &self.api_url)
            .field("model_name", &self.model_name)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout_seconds", &self.timeout_seconds)
            .field("retries", &self.retries)
            .finish()
    }
}

/// Gemini generateContent request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

/// Gemini generateContent response.
#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
}

/// HTTP client for the Gemini API.
pub struct GeminiClient {
    config: GeminiConfig,
    http_client: reqwest::Client,
}

impl GeminiClient {
    /// Build a client; fails only if the HTTP stack cannot be initialized.
    pub fn new(config: GeminiConfig) -> Result<Self, InvocationError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| InvocationError::Request(format!("failed to create HTTP client: {}", e)))?;

        debug!("Gemini client configured: {:?}", config);

        Ok(Self {
            config,
            http_client,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.api_url.trim_end_matches('/'),
            self.config.model_name
        )
    }

    async fn send_once(
        &self,
        api_key: &str,
        prompt: &str,
        config: GenerationConfig,
    ) -> Result<String, InvocationError> {
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart {
                    text: Some(prompt.to_string()),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: config.temperature,
                max_output_tokens: config.max_output_tokens,
            },
        };

        let response = self
            .http_client
            .post(self.endpoint())
            .header(API_KEY_HEADER, api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    InvocationError::Timeout {
                        seconds: self.config.timeout_seconds,
                    }
                } else if e.is_connect() {
                    InvocationError::Connect {
                        url: self.config.api_url.clone(),
                    }
                } else {
                    InvocationError::Request(e.without_url().to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 | 403 => InvocationError::Unauthorized {
                    status: status.as_u16(),
                    body,
                },
                429 => InvocationError::QuotaExhausted(body),
                code => InvocationError::Api { status: code, body },
            });
        }

        let reply: GeminiResponse = response
            .json()
            .await
            .map_err(|e| InvocationError::MalformedResponse(e.without_url().to_string()))?;

        let text: String = reply
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        let text = text.trim();
        if text.is_empty() {
            return Err(InvocationError::EmptyResponse);
        }

        Ok(text.to_string())
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    async fn invoke(
        &self,
        prompt: &str,
        config: GenerationConfig,
    ) -> Result<String, InvocationError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(InvocationError::MissingCredential)?;

        let mut attempt = 0;
        loop {
            match self.send_once(api_key, prompt, config).await {
                Ok(text) => return Ok(text),
                Err(e) if e.is_retryable() && attempt < self.config.retries => {
                    attempt += 1;
                    let delay = Duration::from_millis(RETRY_BACKOFF_MS * attempt as u64);
                    warn!(
                        "Model call failed ({}), retrying in {:?} ({}/{})",
                        e, delay, attempt, self.config.retries
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn model_name(&self) -> &str {
        &self.config.model_name
    }
}

/// Client that never reaches the model; every analyzer falls back locally.
#[derive(Debug, Clone, Default)]
pub struct OfflineClient;

#[async_trait]
impl ModelClient for OfflineClient {
    async fn invoke(
        &self,
        _prompt: &str,
        _config: GenerationConfig,
    ) -> Result<String, InvocationError> {
        Err(InvocationError::Offline)
    }

    fn model_name(&self) -> &str {
        "offline"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ENDPOINT: &str = "/v1beta/models/test-model:generateContent";

    fn client_for(server: &MockServer, retries: usize) -> GeminiClient {
        GeminiClient::new(GeminiConfig {
            api_url: server.uri(),
            model_name: "test-model".to_string(),
            api_key: Some("secret".to_string()),
            timeout_seconds: 5,
            retries,
        })
        .unwrap()
    }

    fn reply_body(parts: &[&str]) -> serde_json::Value {
        let parts: Vec<_> = parts.iter().map(|t| json!({ "text": t })).collect();
        json!({ "candidates": [{ "content": { "role": "model", "parts": parts } }] })
    }

    #[tokio::test]
    async fn test_invoke_returns_joined_reply_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .and(header(API_KEY_HEADER, "secret"))
            .and(body_partial_json(
                json!({ "generationConfig": { "maxOutputTokens": 128 } }),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply_body(&["  Hello ", "world \n"])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, 0);
        let text = client
            .invoke("Say hello", GenerationConfig::new(128, 0.2))
            .await
            .unwrap();

        assert_eq!(text, "Hello world");
        assert_eq!(client.model_name(), "test-model");
    }

    #[tokio::test]
    async fn test_invoke_maps_quota_and_auth_failures() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("RESOURCE_EXHAUSTED"))
            .mount(&server)
            .await;

        let err = client_for(&server, 0)
            .invoke("prompt", GenerationConfig::new(10, 0.2))
            .await
            .unwrap_err();
        assert_eq!(err, InvocationError::QuotaExhausted("RESOURCE_EXHAUSTED".to_string()));

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;

        let err = client_for(&server, 3)
            .invoke("prompt", GenerationConfig::new(10, 0.2))
            .await
            .unwrap_err();
        assert!(matches!(err, InvocationError::Unauthorized { status: 401, .. }));
    }

    #[tokio::test]
    async fn test_invoke_retries_server_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply_body(&["recovered"])))
            .mount(&server)
            .await;

        let text = client_for(&server, 2)
            .invoke("prompt", GenerationConfig::new(10, 0.2))
            .await
            .unwrap();
        assert_eq!(text, "recovered");
    }

    #[tokio::test]
    async fn test_invoke_rejects_empty_candidates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
            .mount(&server)
            .await;

        let err = client_for(&server, 0)
            .invoke("prompt", GenerationConfig::new(10, 0.2))
            .await
            .unwrap_err();
        assert_eq!(err, InvocationError::EmptyResponse);
    }

    #[tokio::test]
    async fn test_missing_credential_fails_without_request() {
        let client = GeminiClient::new(GeminiConfig {
            api_key: Some("   ".to_string()),
            ..GeminiConfig::default()
        })
        .unwrap();

        let err = client
            .invoke("prompt", GenerationConfig::new(10, 0.2))
            .await
            .unwrap_err();
        assert_eq!(err, InvocationError::MissingCredential);
    }

    #[tokio::test]
    async fn test_offline_client_always_fails() {
        let err = OfflineClient
            .invoke("prompt", GenerationConfig::new(10, 0.2))
            .await
            .unwrap_err();
        assert_eq!(err, InvocationError::Offline);
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_config_debug_redacts_key() {
        let config = GeminiConfig {
            api_key: Some("super-secret".to_string()),
            ..GeminiConfig::default()
        };
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[tokio::test]
    async fn test_send_failure_does_not_expose_key() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                drop(socket);
            }
        });

        let client = GeminiClient::new(GeminiConfig {
            api_url: format!("http://{}", addr),
            model_name: "m".to_string(),
            api_key: Some("SUPERSECRETKEY".to_string()),
            timeout_seconds: 5,
            retries: 0,
        })
        .unwrap();

        let err = client
            .invoke("prompt", GenerationConfig::new(10, 0.2))
            .await
            .unwrap_err();
        assert!(!err.to_string().contains("SUPERSECRETKEY"), "{}", err);
        assert!(!format!("{:?}", err).contains("SUPERSECRETKEY"));
    }
}
