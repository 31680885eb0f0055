//! Transport to an OpenAI-compatible chat completion endpoint.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::{
    error::{GatewayError, Result},
    prompt::ChatMessage,
};

/// Body of a chat completion call.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
    pub max_tokens: u32,
}

/// Raw HTTP outcome of one backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendReply {
    pub status: u16,
    pub body: String,
}

impl BackendReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A chat completion backend.
///
/// Implementations return `Ok` for any HTTP response, successful or not, and
/// `Err` only when no response was received (connect failure, timeout).
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn send(&self, request: &ChatRequest) -> Result<BackendReply>;
}

/// [`ChatBackend`] over HTTPS with bearer authentication.
#[derive(Debug, Clone)]
pub struct HttpChatBackend {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl HttpChatBackend {
    /// Creates a backend whose every call is bounded by `timeout`.
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Configuration {
                message: format!("Failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl ChatBackend for HttpChatBackend {
    async fn send(&self, request: &ChatRequest) -> Result<BackendReply> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| GatewayError::Upstream {
                status: None,
                tried: vec![request.model.clone()],
                body: e.to_string(),
            })?;

        let status = response.status().as_u16();
        // An unreadable body still leaves a usable status.
        let body = response.text().await.unwrap_or_default();
        Ok(BackendReply { status, body })
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Instant};

    use tokio::{net::TcpListener, task::JoinHandle};

    use super::*;
    use crate::{models::PlanOptions, prompt::Role, upstream::UpstreamClient};

    /// Accepts connections and never answers.
    async fn stalled_endpoint() -> (String, JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let handle = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        (format!("http://{addr}/v1/chat/completions"), handle)
    }

    fn chat_request(model: &str) -> ChatRequest {
        ChatRequest {
            model: model.to_string(),
            messages: vec![ChatMessage::new(Role::User, "plan please")],
            temperature: 0.2,
            max_tokens: 800,
        }
    }

    #[tokio::test]
    async fn test_stalled_upstream_times_out() {
        let (endpoint, server) = stalled_endpoint().await;
        let backend = HttpChatBackend::new(endpoint, "gsk_test", Duration::from_millis(200))
            .expect("client");

        let started = Instant::now();
        let err = backend
            .send(&chat_request("llama-3.1-8b-instant"))
            .await
            .expect_err("timeout");
        let elapsed = started.elapsed();
        server.abort();

        assert!(elapsed >= Duration::from_millis(200));
        assert!(elapsed < Duration::from_secs(5));
        assert_eq!(err.status_code(), 502);
        match err {
            GatewayError::Upstream { status, tried, .. } => {
                assert_eq!(status, None);
                assert_eq!(tried, vec!["llama-3.1-8b-instant"]);
            }
            other => panic!("expected upstream error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_every_variant_timing_out_reports_all_tried() {
        let (endpoint, server) = stalled_endpoint().await;
        let backend = HttpChatBackend::new(endpoint, "gsk_test", Duration::from_millis(200))
            .expect("client");
        let client = UpstreamClient::new(Arc::new(backend));

        let err = client
            .complete("openai/gpt-oss-20b", Vec::new(), &PlanOptions::default())
            .await
            .expect_err("all timed out");
        server.abort();

        match err {
            GatewayError::Upstream { status, tried, .. } => {
                assert_eq!(status, None);
                assert_eq!(
                    tried,
                    vec![
                        "openai/gpt-oss-20b",
                        "openai/gpt-oss-20b-latest",
                        "openai/gpt-oss-20b-preview",
                    ]
                );
            }
            other => panic!("expected upstream error, got {other:?}"),
        }
    }

    #[test]
    fn test_request_wire_format() {
        let request = ChatRequest {
            model: "openai/gpt-oss-20b".to_string(),
            messages: vec![ChatMessage::new(Role::System, "be brief")],
            temperature: 0.2,
            max_tokens: 800,
        };
        let value = serde_json::to_value(&request).expect("serialize");

        assert_eq!(value["model"], "openai/gpt-oss-20b");
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["max_tokens"], 800);
    }

    #[test]
    fn test_success_range() {
        let ok = BackendReply {
            status: 200,
            body: String::new(),
        };
        let throttled = BackendReply {
            status: 429,
            body: String::new(),
        };
        assert!(ok.is_success());
        assert!(!throttled.is_success());
    }
}
