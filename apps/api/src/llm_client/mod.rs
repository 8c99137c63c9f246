//! LLM Client — the single point of entry for all generative backend calls in Mentor.
//!
//! ARCHITECTURAL RULE: No other module may call a model provider directly.
//! All model interactions go through a `ModelGateway`, which is constructed once
//! in `main` and injected through `AppState` as `Arc<dyn ModelGateway>`.
//!
//! The gateway owns transport concerns only (credentials, timeout, retry, error
//! classification). It never interprets the returned text.

use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde::Serialize;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, warn};

pub mod prompts;
mod providers;

#[cfg(test)]
pub mod testing;

pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_MAX_RETRIES: u32 = 1;
/// Upper bound on `GatewayOptions::max_retries`; larger values are clamped.
pub const MAX_RETRIES_LIMIT: u32 = 10;
const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Error)]
pub enum GatewayError {
    /// Missing credential, or the backend answered 401/403. Never retried.
    #[error("backend rejected credentials")]
    Unauthenticated { status: Option<u16> },

    /// Backend answered 429. The caller backs off; the gateway does not retry.
    #[error("backend is rate limiting requests")]
    RateLimited { retry_after: Option<Duration> },

    /// 5xx, connection failure or timeout on every allowed attempt.
    #[error("backend unavailable after {attempts} attempt(s): {message}")]
    Unavailable { attempts: u32, message: String },

    /// Any other non-success status.
    #[error("backend rejected request (status {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("backend returned an unreadable response: {0}")]
    InvalidResponse(String),
}

/// Raw text returned by the backend for one prompt.
#[derive(Debug, Clone, Serialize)]
pub struct ModelResponse {
    pub text: String,
    #[serde(rename = "latency_ms", serialize_with = "serialize_millis")]
    pub latency: Duration,
    /// `<provider>:<model>`
    pub backend: String,
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

/// Per-call transport policy.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayOptions {
    pub timeout: Duration,
    pub max_retries: u32,
    /// Overrides the configured model identifier for this call.
    pub backend: Option<String>,
}

impl Default for GatewayOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            max_retries: DEFAULT_MAX_RETRIES,
            backend: None,
        }
    }
}

/// Sends a prompt to a generative text backend and returns its raw text.
///
/// Dropping the returned future aborts the in-flight request.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    async fn send(&self, prompt: &str, options: &GatewayOptions)
        -> Result<ModelResponse, GatewayError>;
}

// ────────────────────────────────────────────────────────────────────────────
// HTTP gateway
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Gemini,
    Anthropic,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Gemini => "gemini",
            Provider::Anthropic => "anthropic",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::Gemini => "gemini-1.5-flash",
            Provider::Anthropic => "claude-sonnet-4-5",
        }
    }

    /// Endpoint template. `{model}` is substituted per call.
    fn default_endpoint(&self) -> &'static str {
        match self {
            Provider::Gemini => {
                "https://generativelanguage.googleapis.com/v1beta/models/{model}:generateContent"
            }
            Provider::Anthropic => "https://api.anthropic.com/v1/messages",
        }
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" | "google" => Ok(Provider::Gemini),
            "anthropic" | "claude" => Ok(Provider::Anthropic),
            other => Err(format!("unknown LLM provider: {other}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub provider: Provider,
    pub api_key: String,
    pub model: String,
    /// Overrides the provider endpoint. May contain `{model}`.
    pub endpoint: Option<String>,
    /// First retry waits this long; each further retry doubles it.
    pub retry_base_delay: Duration,
}

/// Outcome of a single attempt that did not produce text.
enum AttemptError {
    Retryable(String),
    Fatal(GatewayError),
}

/// Gateway backed by a hosted model over HTTPS.
#[derive(Clone)]
pub struct HttpModelGateway {
    client: Client,
    config: GatewayConfig,
}

impl HttpModelGateway {
    pub fn new(config: GatewayConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    pub fn provider(&self) -> Provider {
        self.config.provider
    }

    fn endpoint(&self, model: &str) -> String {
        self.config
            .endpoint
            .as_deref()
            .unwrap_or_else(|| self.config.provider.default_endpoint())
            .replace("{model}", model)
    }

    async fn attempt(
        &self,
        prompt: &str,
        model: &str,
        timeout: Duration,
    ) -> Result<String, AttemptError> {
        let request = self.client.post(self.endpoint(model)).timeout(timeout);
        let request = match self.config.provider {
            Provider::Gemini => request
                .header("x-goog-api-key", &self.config.api_key)
                .json(&providers::gemini_request(prompt)),
            Provider::Anthropic => request
                .header("x-api-key", &self.config.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .json(&providers::anthropic_request(model, prompt)),
        };

        let response = match request.send().await {
            Ok(r) => r,
            Err(e) if e.is_timeout() => {
                return Err(AttemptError::Retryable(format!(
                    "timed out after {}ms",
                    timeout.as_millis()
                )))
            }
            Err(e) => return Err(AttemptError::Retryable(format!("request failed: {e}"))),
        };

        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(AttemptError::Fatal(GatewayError::Unauthenticated {
                status: Some(status.as_u16()),
            }));
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_secs);
            return Err(AttemptError::Fatal(GatewayError::RateLimited { retry_after }));
        }

        let body = match response.text().await {
            Ok(b) => b,
            Err(e) => return Err(AttemptError::Retryable(format!("reading body failed: {e}"))),
        };

        if status.is_server_error() {
            return Err(AttemptError::Retryable(format!("status {status}: {body}")));
        }

        if !status.is_success() {
            return Err(AttemptError::Fatal(GatewayError::Rejected {
                status: status.as_u16(),
                message: body,
            }));
        }

        let text = match self.config.provider {
            Provider::Gemini => providers::gemini_text(&body),
            Provider::Anthropic => providers::anthropic_text(&body),
        };
        text.map_err(|e| AttemptError::Fatal(GatewayError::InvalidResponse(e)))
    }
}

#[async_trait]
impl ModelGateway for HttpModelGateway {
    /// Retries 5xx, connection failures and timeouts with exponential backoff.
    /// Credential failures and throttling return immediately.
    async fn send(
        &self,
        prompt: &str,
        options: &GatewayOptions,
    ) -> Result<ModelResponse, GatewayError> {
        if self.config.api_key.trim().is_empty() {
            return Err(GatewayError::Unauthenticated { status: None });
        }

        let model = options.backend.as_deref().unwrap_or(&self.config.model);
        let max_attempts = options.max_retries.min(MAX_RETRIES_LIMIT) + 1;
        let mut last_failure = String::new();

        for attempt in 0..max_attempts {
            if attempt > 0 {
                let delay = self.config.retry_base_delay * (1u32 << (attempt - 1).min(16));
                warn!(
                    "Model call attempt {} failed ({}), retrying after {}ms...",
                    attempt,
                    last_failure,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let started = Instant::now();
            match self.attempt(prompt, model, options.timeout).await {
                Ok(text) => {
                    let latency = started.elapsed();
                    debug!(
                        "Model call succeeded: backend={}:{}, attempt={}, latency_ms={}",
                        self.config.provider.as_str(),
                        model,
                        attempt + 1,
                        latency.as_millis()
                    );
                    return Ok(ModelResponse {
                        text,
                        latency,
                        backend: format!("{}:{}", self.config.provider.as_str(), model),
                    });
                }
                Err(AttemptError::Retryable(message)) => last_failure = message,
                Err(AttemptError::Fatal(e)) => return Err(e),
            }
        }

        Err(GatewayError::Unavailable {
            attempts: max_attempts,
            message: last_failure,
        })
    }
}
