//! Gateway configuration.

use std::{fmt, time::Duration};

use crate::{
    ratelimit::RatePolicy,
    upstream::{DEFAULT_ENDPOINT, ModelSelector},
};

/// Default upper bound for one upstream call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Runtime settings for a [`Gateway`](super::Gateway).
#[derive(Clone)]
pub struct GatewayConfig {
    /// Chat completion endpoint
    pub upstream_url: String,

    /// Bearer key for the upstream; without one plan generation is
    /// unavailable unless a backend is injected
    pub api_key: Option<String>,

    /// Bearer token required for incident writes; without one every write
    /// is rejected
    pub auth_token: Option<String>,

    pub models: ModelSelector,

    pub timeout: Duration,

    pub rate_policy: RatePolicy,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            upstream_url: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
            auth_token: None,
            models: ModelSelector::default(),
            timeout: DEFAULT_TIMEOUT,
            rate_policy: RatePolicy::default(),
        }
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redacted = |secret: &Option<String>| secret.as_ref().map(|_| "<redacted>");
        f.debug_struct("GatewayConfig")
            .field("upstream_url", &self.upstream_url)
            .field("api_key", &redacted(&self.api_key))
            .field("auth_token", &redacted(&self.auth_token))
            .field("models", &self.models)
            .field("timeout", &self.timeout)
            .field("rate_policy", &self.rate_policy)
            .finish()
    }
}
