//! Advisory transport seam.
//!
//! The decision logic only sees the [`AdvisoryTransport`] trait; production
//! wires in the blocking HTTP client below, tests substitute a double.

use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

/// Environment variable holding the advisory-service credential. When it is
/// unset or blank the advisor runs in local-fallback mode.
pub const API_KEY_ENV: &str = "SMARTSTORE_API_KEY";

const ENDPOINT_ENV: &str = "SMARTSTORE_ADVISORY_URL";
const MODEL_ENV: &str = "SMARTSTORE_ADVISORY_MODEL";
const TIMEOUT_ENV: &str = "SMARTSTORE_ADVISORY_TIMEOUT_SECS";

const DEFAULT_ENDPOINT: &str = "https://api.gemini.com/v1/completions";
const DEFAULT_MODEL: &str = "gemini-1.5";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// One advisory request: a free-text description of the empty shelves plus a
/// maximum-answer-length hint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvisoryRequest {
    pub prompt: String,
    pub max_tokens: u32,
}

#[derive(Debug, Error)]
pub enum TransportError {
    /// The request could not be completed (connect error, HTTP error,
    /// timeout).
    #[error("advisory request failed: {0}")]
    Request(String),

    /// The service answered, but not in the expected shape.
    #[error("malformed advisory response: {0}")]
    MalformedResponse(String),
}

/// Capability to ask the advisory service one question and get back a short
/// text fragment. Implementations must bound the call with a timeout.
pub trait AdvisoryTransport {
    fn complete(&self, request: &AdvisoryRequest) -> Result<String, TransportError>;
}

/// Connection settings for the HTTP transport.
#[derive(Debug, Clone)]
pub struct AdvisoryConfig {
    pub api_key: String,
    pub endpoint: String,
    pub model: String,
    pub timeout: Duration,
}

impl AdvisoryConfig {
    /// Read the configuration from the environment. Returns `None` when no
    /// credential is configured, which is a recognized mode, not an error.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var(API_KEY_ENV).ok()?;
        if api_key.trim().is_empty() {
            return None;
        }
        let endpoint =
            std::env::var(ENDPOINT_ENV).unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
        let model = std::env::var(MODEL_ENV).unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let timeout_secs = std::env::var(TIMEOUT_ENV)
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Some(Self {
            api_key,
            endpoint,
            model,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    #[serde(default)]
    text: String,
}

/// Blocking HTTP implementation of the advisory transport.
///
/// Bearer-token auth, JSON `{model, prompt, max_tokens}` payload, answer read
/// from `choices[0].text`. The whole call is bounded by the configured
/// timeout so it can never stall the session.
pub struct HttpAdvisoryTransport {
    client: reqwest::blocking::Client,
    config: AdvisoryConfig,
}

impl HttpAdvisoryTransport {
    pub fn new(config: AdvisoryConfig) -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TransportError::Request(e.to_string()))?;
        Ok(Self { client, config })
    }
}

impl AdvisoryTransport for HttpAdvisoryTransport {
    fn complete(&self, request: &AdvisoryRequest) -> Result<String, TransportError> {
        let payload = json!({
            "model": self.config.model,
            "prompt": request.prompt,
            "max_tokens": request.max_tokens,
        });

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Request(format!(
                "advisory service returned {status}"
            )));
        }

        let body: CompletionResponse = response
            .json()
            .map_err(|e| TransportError::MalformedResponse(e.to_string()))?;

        match body.choices.into_iter().next() {
            Some(choice) => Ok(choice.text),
            None => Err(TransportError::MalformedResponse(
                "response carried no choices".to_string(),
            )),
        }
    }
}
