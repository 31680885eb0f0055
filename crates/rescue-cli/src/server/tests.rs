use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use rescue_core::{
    GatewayBuilder, GatewayConfig, RatePolicy,
    upstream::{BackendReply, ChatBackend, ChatRequest},
};
use serde_json::{Value, json};
use tower::ServiceExt;

use super::*;

const TOKEN: &str = "test-token";

struct ReplyBackend {
    status: u16,
    content: String,
    calls: AtomicUsize,
}

#[async_trait]
impl ChatBackend for ReplyBackend {
    async fn send(&self, _request: &ChatRequest) -> rescue_core::Result<BackendReply> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let body = if self.status == 200 {
            json!({ "choices": [{ "message": { "content": self.content } }] }).to_string()
        } else {
            self.content.clone()
        };
        Ok(BackendReply {
            status: self.status,
            body,
        })
    }
}

fn backend(status: u16, content: &str) -> Arc<ReplyBackend> {
    Arc::new(ReplyBackend {
        status,
        content: content.to_string(),
        calls: AtomicUsize::new(0),
    })
}

async fn app_with(backend: Arc<ReplyBackend>, rate_limit: u32) -> Router {
    let config = GatewayConfig {
        auth_token: Some(TOKEN.to_string()),
        rate_policy: RatePolicy {
            limit: rate_limit,
            window_secs: 60,
        },
        ..Default::default()
    };
    let gateway = GatewayBuilder::new()
        .with_memory_store()
        .with_backend(backend)
        .with_config(config)
        .build()
        .await
        .expect("build gateway");
    router(Arc::new(gateway))
}

async fn app() -> Router {
    app_with(backend(200, "{\"summary\":\"Evacuate\"}"), 30).await
}

fn json_request(method: &str, uri: &str, body: &Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

async fn read_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
async fn test_plan_endpoint_returns_plan() {
    let response = app()
        .await
        .oneshot(json_request(
            "POST",
            "/plan",
            &json!({ "scenario": { "type": "Flood" }, "updates": [] }),
            None,
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");
    assert_eq!(response.headers()[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
    assert_eq!(read_json(response).await, json!({ "summary": "Evacuate" }));
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let response = app()
        .await
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/plan")
                .body(Body::from("{not json"))
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(read_json(response).await["error"].is_string());
}

#[tokio::test]
async fn test_upstream_failure_body() {
    let app = app_with(backend(503, "overloaded"), 30).await;
    let response = app
        .oneshot(json_request(
            "POST",
            "/plan",
            &json!({ "scenario": {}, "options": { "model": "llama-3.1-8b-instant" } }),
            None,
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = read_json(response).await;
    assert_eq!(body["error"], "Upstream error");
    assert_eq!(body["status"], 503);
    assert_eq!(body["tried"], json!(["llama-3.1-8b-instant"]));
    assert_eq!(body["upstream"], "overloaded");
}

#[tokio::test]
async fn test_unparseable_model_reply() {
    let app = app_with(backend(200, "Sorry, no plan today."), 30).await;
    let response = app
        .oneshot(json_request("POST", "/plan", &json!({}), None))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = read_json(response).await;
    assert_eq!(body["error"], "Invalid model response");
    assert_eq!(body["raw"], "Sorry, no plan today.");
}

#[tokio::test]
async fn test_rate_limit_by_forwarded_caller() {
    let app = app_with(backend(200, "{}"), 1).await;
    let request = |ip: &str| {
        let mut req = json_request("POST", "/plan", &json!({}), None);
        req.headers_mut().insert(
            "x-forwarded-for",
            format!("{ip}, 10.0.0.1").parse().expect("header"),
        );
        req
    };

    let first = app.clone().oneshot(request("203.0.113.7")).await.expect("response");
    assert_eq!(first.status(), StatusCode::OK);

    let second = app.clone().oneshot(request("203.0.113.7")).await.expect("response");
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);

    let other = app.oneshot(request("198.51.100.2")).await.expect("response");
    assert_eq!(other.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_incident_writes_require_token() {
    let app = app().await;
    let body = json!({ "name": "Riverside flooding" });

    let missing = app
        .clone()
        .oneshot(json_request("PUT", "/incidents/flood-1", &body, None))
        .await
        .expect("response");
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

    let wrong = app
        .clone()
        .oneshot(json_request("PUT", "/incidents/flood-1", &body, Some("nope")))
        .await
        .expect("response");
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);

    let listed = app
        .oneshot(get_request("/incidents"))
        .await
        .expect("response");
    assert_eq!(read_json(listed).await, json!({ "incidents": [] }));
}

#[tokio::test]
async fn test_incident_round_trip_over_http() {
    let app = app().await;

    let put = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/incidents/flood-1",
            &json!({ "name": "Riverside flooding", "type": "Flood" }),
            Some(TOKEN),
        ))
        .await
        .expect("response");
    assert_eq!(put.status(), StatusCode::OK);
    assert_eq!(
        read_json(put).await,
        json!({ "ok": true, "id": "flood-1", "file": "flood-1.json" })
    );

    let patch = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            "/incidents/flood-1/updates",
            &json!({ "op": "add", "text": "Bridge A closed", "ts": "2025-09-11T10:00:00Z" }),
            Some(TOKEN),
        ))
        .await
        .expect("response");
    assert_eq!(read_json(patch).await, json!({ "ok": true }));

    let missing_pair = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            "/incidents/flood-1/updates",
            &json!({ "op": "delete", "ts": "2025-09-11T10:00:00Z", "text": "Bridge B closed" }),
            Some(TOKEN),
        ))
        .await
        .expect("response");
    assert_eq!(missing_pair.status(), StatusCode::NOT_FOUND);

    let incident = read_json(
        app.oneshot(get_request("/incidents/flood-1"))
            .await
            .expect("response"),
    )
    .await;
    assert_eq!(incident["id"], "flood-1");
    assert_eq!(incident["updates"][0]["text"], "Bridge A closed");
}

#[tokio::test]
async fn test_missing_resources_are_not_found() {
    let app = app().await;

    let incident = app
        .clone()
        .oneshot(get_request("/incidents/nope"))
        .await
        .expect("response");
    assert_eq!(incident.status(), StatusCode::NOT_FOUND);

    let plan = app
        .clone()
        .oneshot(get_request("/plans/nope"))
        .await
        .expect("response");
    assert_eq!(plan.status(), StatusCode::NOT_FOUND);

    let plans = app.oneshot(get_request("/plans")).await.expect("response");
    assert_eq!(read_json(plans).await, json!({ "plans": [] }));
}

#[tokio::test]
async fn test_cors_preflight() {
    let response = app()
        .await
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/incidents/flood-1")
                .header(header::ORIGIN, "https://example.org")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "PUT")
                .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
    let methods = response.headers()[header::ACCESS_CONTROL_ALLOW_METHODS]
        .to_str()
        .expect("methods");
    assert!(methods.contains("PATCH"));
}

#[tokio::test]
async fn test_oversized_body_rejected() {
    let backend = backend(200, "{}");
    let app = app_with(backend.clone(), 30).await;
    let padding = "x".repeat(MAX_BODY_BYTES + 1);
    let response = app
        .oneshot(json_request(
            "POST",
            "/plan",
            &json!({ "scenario": { "details": padding } }),
            None,
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_caller_identity_precedence() {
    let peer: Option<SocketAddr> = Some("192.0.2.10:4000".parse().expect("addr"));

    let mut headers = HeaderMap::new();
    assert_eq!(caller_identity(&headers, None), "anon");
    assert_eq!(caller_identity(&headers, peer), "192.0.2.10");

    headers.insert("x-forwarded-for", " 203.0.113.7 , 10.0.0.1".parse().expect("header"));
    assert_eq!(caller_identity(&headers, peer), "203.0.113.7");

    headers.insert("cf-connecting-ip", "198.51.100.2".parse().expect("header"));
    assert_eq!(caller_identity(&headers, peer), "198.51.100.2");
}
