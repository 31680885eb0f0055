use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use rescue_core::{
    ChatBackend, Gateway, GatewayBuilder, GatewayConfig, Result,
    upstream::{BackendReply, ChatRequest},
};
use serde_json::json;
use tempfile::TempDir;

/// Backend that replies with a fixed plan and counts how often it was called.
pub struct CountingBackend {
    pub calls: AtomicUsize,
    pub models: std::sync::Mutex<Vec<String>>,
}

impl CountingBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            models: std::sync::Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatBackend for CountingBackend {
    async fn send(&self, request: &ChatRequest) -> Result<BackendReply> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        self.models
            .lock()
            .expect("lock")
            .push(request.model.clone());
        let content = format!("Here you go:\n{{\"summary\":\"Plan {n}\",\"priorities\":[\"Evacuate\"]}}");
        Ok(BackendReply {
            status: 200,
            body: json!({ "choices": [{ "message": { "content": content } }] }).to_string(),
        })
    }
}

/// Helper function to create a gateway over a temporary database
pub async fn create_test_gateway(backend: Arc<CountingBackend>) -> (TempDir, Gateway) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");
    let config = GatewayConfig {
        auth_token: Some("test-token".to_string()),
        ..Default::default()
    };
    let gateway = GatewayBuilder::new()
        .with_database_path(Some(&db_path))
        .with_backend(backend)
        .with_config(config)
        .build()
        .await
        .expect("Failed to create gateway");
    (temp_dir, gateway)
}
