//! HTTP surface of the gateway.
//!
//! | Method | Path                      | Auth   |
//! |--------|---------------------------|--------|
//! | POST   | `/plan`                   | none   |
//! | GET    | `/incidents`              | none   |
//! | GET    | `/incidents/:id`          | none   |
//! | PUT    | `/incidents/:id`          | bearer |
//! | PATCH  | `/incidents/:id/updates`  | bearer |
//! | GET    | `/plans`                  | none   |
//! | GET    | `/plans/:id`              | none   |
//!
//! Bodies are read as raw bytes and parsed here so malformed JSON maps to a
//! 400 with the usual `{error}` body instead of axum's plain-text rejection.

use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, Result};
use axum::{
    Json, Router,
    body::Bytes,
    extract::{ConnectInfo, Path, State},
    http::{HeaderMap, HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};
use log::{error, info, warn};
use rescue_core::{CachedPlan, Gateway, GatewayError, Incident, IncidentManifest, PlanManifest, PutOutcome};
use serde_json::{Value, json};
use tokio::{
    net::TcpListener,
    signal::unix::{SignalKind, signal},
};
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    set_header::SetResponseHeaderLayer,
};

#[cfg(test)]
mod tests;

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

type SharedGateway = Arc<Gateway>;

/// A gateway error on its way to becoming an HTTP response.
#[derive(Debug)]
pub struct ApiError(GatewayError);

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        }

        let body = match self.0 {
            GatewayError::Upstream {
                status: upstream_status,
                tried,
                body,
            } => json!({
                "error": "Upstream error",
                "status": upstream_status,
                "tried": tried,
                "upstream": body,
            }),
            GatewayError::Extraction { raw } => json!({
                "error": "Invalid model response",
                "raw": raw,
            }),
            other => json!({ "error": other.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

fn parse_body(bytes: &[u8]) -> std::result::Result<Value, ApiError> {
    serde_json::from_slice(bytes)
        .map_err(|e| GatewayError::invalid_input("body").with_reason(format!("Invalid JSON: {e}")).into())
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Identifies the caller for rate limiting.
///
/// Proxy headers win over the socket address so that callers behind a CDN
/// are not all counted as the proxy.
pub fn caller_identity(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    header_value(headers, "cf-connecting-ip")
        .or_else(|| {
            header_value(headers, "x-forwarded-for")
                .and_then(|v| v.split(',').next())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        })
        .map(str::to_string)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "anon".to_string())
}

async fn create_plan(
    State(gateway): State<SharedGateway>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Value> {
    let body = parse_body(&body)?;
    let caller = caller_identity(&headers, peer.map(|ConnectInfo(addr)| addr));
    Ok(Json(gateway.generate_plan(&caller, &body).await?))
}

async fn list_incidents(State(gateway): State<SharedGateway>) -> ApiResult<IncidentManifest> {
    Ok(Json(gateway.incidents()?.list().await?))
}

async fn get_incident(
    State(gateway): State<SharedGateway>,
    Path(id): Path<String>,
) -> ApiResult<Incident> {
    Ok(Json(gateway.incidents()?.get(&id).await?))
}

async fn put_incident(
    State(gateway): State<SharedGateway>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<PutOutcome> {
    gateway.authorize(header_value(&headers, header::AUTHORIZATION.as_str()))?;
    let body = parse_body(&body)?;
    Ok(Json(gateway.incidents()?.put(&id, &body).await?))
}

async fn patch_incident_updates(
    State(gateway): State<SharedGateway>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Value> {
    gateway.authorize(header_value(&headers, header::AUTHORIZATION.as_str()))?;
    let body = parse_body(&body)?;
    gateway.incidents()?.patch_update(&id, &body).await?;
    Ok(Json(json!({ "ok": true })))
}

async fn list_plans(State(gateway): State<SharedGateway>) -> ApiResult<PlanManifest> {
    Ok(Json(gateway.plans()?.list().await?))
}

async fn get_plan(
    State(gateway): State<SharedGateway>,
    Path(id): Path<String>,
) -> ApiResult<CachedPlan> {
    Ok(Json(gateway.plans()?.get(&id).await?))
}

/// Builds the router with CORS, the body limit and security headers.
pub fn router(gateway: SharedGateway) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route("/plan", post(create_plan))
        .route("/incidents", get(list_incidents))
        .route("/incidents/:id", get(get_incident).put(put_incident))
        .route("/incidents/:id/updates", patch(patch_incident_updates))
        .route("/plans", get(list_plans))
        .route("/plans/:id", get(get_plan))
        .with_state(gateway)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(cors)
}

/// Serves the gateway on `bind` until SIGINT or SIGTERM.
pub async fn serve(gateway: Gateway, bind: SocketAddr) -> Result<()> {
    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind to {bind}"))?;
    info!("Rescue gateway listening on {bind}");

    axum::serve(
        listener,
        router(Arc::new(gateway)).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("HTTP server failed")?;

    info!("Rescue gateway shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Cannot listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!("Received SIGINT, shutting down gracefully"),
        () = terminate => info!("Received SIGTERM, shutting down gracefully"),
    }
}
