//! High-level gateway API tying the pipeline together.
//!
//! The [`Gateway`] is what the HTTP layer talks to. Plan generation runs:
//!
//! ```text
//! body ─▶ sanitize ─▶ rate limit ─▶ cache lookup ──hit──▶ cached plan
//!                                        │
//!                                       miss
//!                                        ▼
//!          redact ─▶ prompt ─▶ model selection ─▶ upstream ─▶ extract ─▶ cache store ─▶ plan
//! ```
//!
//! Incident writes go straight from the sanitizer to the incident store and
//! never touch the model.
//!
//! # Usage
//!
//! ```rust
//! use rescue_core::GatewayBuilder;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let gateway = GatewayBuilder::new()
//!     .with_memory_store()
//!     .build()
//!     .await?;
//!
//! let incidents = gateway.incidents()?.list().await?;
//! assert!(incidents.incidents.is_empty());
//! # Ok(())
//! # }
//! ```

use log::{info, warn};
use serde_json::Value;

use crate::{
    cache::{PlanCache, update_signature},
    error::{GatewayError, Result},
    extract::extract_plan,
    incidents::IncidentStore,
    models::PlanRequest,
    prompt::PromptTemplate,
    ratelimit::RateLimiter,
    redact::redact_request,
    upstream::UpstreamClient,
};

pub mod builder;
pub mod config;


pub use builder::GatewayBuilder;
pub use config::GatewayConfig;

/// Request-handling core shared by all HTTP handlers.
pub struct Gateway {
    incidents: Option<IncidentStore>,
    plans: Option<PlanCache>,
    limiter: RateLimiter,
    upstream: Option<UpstreamClient>,
    prompt: PromptTemplate,
    config: GatewayConfig,
}

impl Gateway {
    /// The incident store.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::StorageUnavailable` when no store is bound.
    pub fn incidents(&self) -> Result<&IncidentStore> {
        self.incidents
            .as_ref()
            .ok_or(GatewayError::StorageUnavailable {
                binding: "incident store",
            })
    }

    /// The plan cache.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::StorageUnavailable` when caching is disabled.
    pub fn plans(&self) -> Result<&PlanCache> {
        self.plans.as_ref().ok_or(GatewayError::StorageUnavailable {
            binding: "plan store",
        })
    }

    /// Checks an `Authorization` header against the configured write token.
    ///
    /// The `Bearer` scheme is matched case-insensitively; the token itself
    /// must match exactly.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Unauthorized` when the header is missing or
    /// wrong, or when no token is configured.
    pub fn authorize(&self, header: Option<&str>) -> Result<()> {
        let expected = self
            .config
            .auth_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(GatewayError::Unauthorized)?;

        let token = header
            .and_then(|h| {
                let (scheme, rest) = h.split_at_checked(7)?;
                scheme.eq_ignore_ascii_case("bearer ").then_some(rest)
            })
            .ok_or(GatewayError::Unauthorized)?;

        if token == expected {
            Ok(())
        } else {
            Err(GatewayError::Unauthorized)
        }
    }

    /// Produces a plan for an untrusted `POST /plan` body.
    ///
    /// `caller` identifies the client for rate limiting.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` when the body is not a JSON object
    /// - `RateLimited` when the caller exhausted its window
    /// - `Configuration` when no upstream is configured
    /// - `Upstream` when every model candidate failed
    /// - `Extraction` when the reply held no JSON object
    pub async fn generate_plan(&self, caller: &str, body: &Value) -> Result<Value> {
        if !body.is_object() {
            return Err(GatewayError::invalid_input("body").with_reason("Expected a JSON object"));
        }
        let request = PlanRequest::sanitize(body);

        if !self.limiter.allow(caller, &self.config.rate_policy).await {
            warn!("Rate limit exceeded for {caller}");
            return Err(GatewayError::RateLimited {
                caller: caller.to_string(),
            });
        }

        let update_sig = update_signature(request.open_updates());
        let cache = self.plans.as_ref().zip(request.incident_id.as_deref());
        if let Some((plans, incident_id)) = cache {
            if let Some(plan) = plans.lookup(incident_id, &update_sig).await {
                return Ok(plan);
            }
        }

        let upstream = self.upstream.as_ref().ok_or_else(|| GatewayError::Configuration {
            message: "Server not configured: no upstream API key".to_string(),
        })?;

        let redacted = redact_request(&request);
        let messages = self.prompt.build_messages(&redacted)?;
        let model = self.config.models.resolve(&request);

        let completion = upstream.complete(&model, messages, &request.options).await?;
        let plan = extract_plan(&completion.content)?;
        info!(
            "Generated plan with {} (prompt {})",
            completion.model, self.prompt.version
        );

        if let Some((plans, incident_id)) = cache {
            if let Err(e) = plans
                .store(incident_id, &plan, &update_sig, &completion.model)
                .await
            {
                warn!("Failed to cache plan for {incident_id}: {e}");
            }
        }

        Ok(plan)
    }
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("incidents", &self.incidents.is_some())
            .field("plans", &self.plans.is_some())
            .field("upstream", &self.upstream.is_some())
            .field("prompt_version", &self.prompt.version)
            .field("config", &self.config)
            .finish()
    }
}
