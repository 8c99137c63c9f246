//! Test doubles for the model gateway: a scripted in-process fake and a local
//! HTTP server that stands in for a provider endpoint.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use serde_json::json;

use super::{GatewayError, GatewayOptions, ModelGateway, ModelResponse};

// ────────────────────────────────────────────────────────────────────────────
// ScriptedGateway
// ────────────────────────────────────────────────────────────────────────────

/// Returns queued replies in order. Records every prompt it receives.
pub struct ScriptedGateway {
    replies: Mutex<VecDeque<Result<String, GatewayError>>>,
    prompts: Mutex<Vec<String>>,
    delay: Option<Duration>,
}

impl ScriptedGateway {
    pub fn new(replies: Vec<Result<String, GatewayError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    pub fn replying(text: &str) -> Self {
        Self::new(vec![Ok(text.to_string())])
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ModelGateway for ScriptedGateway {
    async fn send(
        &self,
        prompt: &str,
        _options: &GatewayOptions,
    ) -> Result<ModelResponse, GatewayError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let next = self.replies.lock().unwrap().pop_front();
        match next {
            Some(Ok(text)) => Ok(ModelResponse {
                text,
                latency: self.delay.unwrap_or_default(),
                backend: "scripted:test".to_string(),
            }),
            Some(Err(e)) => Err(e),
            None => Err(GatewayError::Unavailable {
                attempts: 1,
                message: "script exhausted".to_string(),
            }),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// MockBackend
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct MockReply {
    status: StatusCode,
    body: String,
    retry_after: Option<u64>,
    delay: Option<Duration>,
}

impl MockReply {
    pub fn status(code: u16, body: &str) -> Self {
        Self {
            status: StatusCode::from_u16(code).unwrap(),
            body: body.to_string(),
            retry_after: None,
            delay: None,
        }
    }

    pub fn gemini_text(text: &str) -> Self {
        let body = json!({ "candidates": [{ "content": { "parts": [{ "text": text }] } }] });
        Self::status(200, &body.to_string())
    }

    pub fn anthropic_text(text: &str) -> Self {
        let body = json!({ "content": [{ "type": "text", "text": text }] });
        Self::status(200, &body.to_string())
    }

    pub fn retry_after(mut self, secs: u64) -> Self {
        self.retry_after = Some(secs);
        self
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

struct Shared {
    replies: Vec<MockReply>,
    hits: AtomicUsize,
    paths: Mutex<Vec<String>>,
}

/// Serves `replies` in order on 127.0.0.1; the last reply repeats once the
/// script runs out.
pub struct MockBackend {
    addr: SocketAddr,
    shared: Arc<Shared>,
}

impl MockBackend {
    pub async fn spawn(replies: Vec<MockReply>) -> Self {
        assert!(!replies.is_empty(), "mock backend needs at least one reply");
        let shared = Arc::new(Shared {
            replies,
            hits: AtomicUsize::new(0),
            paths: Mutex::new(Vec::new()),
        });

        let app = Router::new().fallback(reply).with_state(shared.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, shared }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn hits(&self) -> usize {
        self.shared.hits.load(Ordering::SeqCst)
    }

    pub fn paths(&self) -> Vec<String> {
        self.shared.paths.lock().unwrap().clone()
    }
}

async fn reply(State(shared): State<Arc<Shared>>, uri: Uri) -> Response {
    let hit = shared.hits.fetch_add(1, Ordering::SeqCst);
    shared.paths.lock().unwrap().push(uri.path().to_string());
    let reply = shared.replies[hit.min(shared.replies.len() - 1)].clone();

    if let Some(delay) = reply.delay {
        tokio::time::sleep(delay).await;
    }

    let mut response = (reply.status, reply.body).into_response();
    if let Some(secs) = reply.retry_after {
        response
            .headers_mut()
            .insert(header::RETRY_AFTER, HeaderValue::from(secs));
    }
    response
}
