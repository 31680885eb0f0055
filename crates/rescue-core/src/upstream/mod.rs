//! Model selection and the fallback-aware upstream client.
//!
//! The client makes one pass over a fixed candidate list: the resolved model,
//! then for `gpt-oss-*` models the `-latest` and `-preview` variants. It
//! stops at the first successful response and records every name it tried.

use std::sync::Arc;

use log::{debug, error, warn};
use serde_json::Value;

use crate::{
    error::{GatewayError, Result},
    models::{PlanOptions, PlanRequest},
    prompt::ChatMessage,
    sanitize::truncate_chars,
};

pub mod backend;

pub use backend::{BackendReply, ChatBackend, ChatRequest, HttpChatBackend};

/// Default OpenAI-compatible chat completion endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.groq.com/openai/v1/chat/completions";

/// Model used for simple scenarios.
pub const LIGHT_MODEL: &str = "openai/gpt-oss-20b";

/// Model used for large or detailed scenarios.
pub const HEAVY_MODEL: &str = "openai/gpt-oss-120b";

/// Upstream bodies quoted in errors and logs are cut to this many characters.
pub const MAX_ERROR_SNIPPET: usize = 500;

const HEAVY_POPULATION: u64 = 1500;
const HEAVY_DETAILS_LEN: usize = 800;
const HEAVY_SCORE: f64 = 3.0;

/// Maps short aliases to fully qualified model ids.
///
/// `gpt-oss-20b` and `gpt-oss-120b` (any case) gain the `openai/` prefix.
/// Anything else, including `openai/*` ids, passes through unchanged.
pub fn normalize_model(raw: &str) -> String {
    match raw.to_ascii_lowercase().as_str() {
        "gpt-oss-20b" => LIGHT_MODEL.to_string(),
        "gpt-oss-120b" => HEAVY_MODEL.to_string(),
        _ => raw.to_string(),
    }
}

/// Alternate names tried after `model` fails, in order.
pub fn fallback_variants(model: &str) -> Vec<String> {
    if model.contains("gpt-oss-") {
        vec![format!("{model}-latest"), format!("{model}-preview")]
    } else {
        Vec::new()
    }
}

/// Chooses between a light and a heavy model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSelector {
    pub light: String,
    pub heavy: String,
}

impl Default for ModelSelector {
    fn default() -> Self {
        Self {
            light: LIGHT_MODEL.to_string(),
            heavy: HEAVY_MODEL.to_string(),
        }
    }
}

impl ModelSelector {
    /// Resolves the model for a sanitized request.
    ///
    /// An explicit model is honored after alias normalization. Otherwise the
    /// heavy model is picked for large populations, long details, or a high
    /// combined complexity score.
    pub fn resolve(&self, request: &PlanRequest) -> String {
        if let Some(explicit) = request.explicit_model() {
            return normalize_model(explicit);
        }

        let details_len = request.scenario.details.chars().count();
        let population = request.scenario.population;
        let update_count = request.open_updates().count();

        let score = details_len as f64 / 600.0
            + population as f64 / 1500.0
            + update_count as f64 / 6.0;
        let heavy = population >= HEAVY_POPULATION
            || details_len >= HEAVY_DETAILS_LEN
            || score >= HEAVY_SCORE;

        debug!(
            "Model selection: details={details_len} population={population} updates={update_count} score={score:.2} heavy={heavy}"
        );
        if heavy {
            self.heavy.clone()
        } else {
            self.light.clone()
        }
    }
}

/// A successful completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// Model name that produced the reply
    pub model: String,
    /// Assistant message text, empty when the reply carried none
    pub content: String,
    /// Every model name attempted, in order
    pub tried: Vec<String>,
}

/// Calls a [`ChatBackend`] with fallback over model variants.
#[derive(Clone)]
pub struct UpstreamClient {
    backend: Arc<dyn ChatBackend>,
}

impl UpstreamClient {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self { backend }
    }

    /// Requests a completion, falling back to variant names on failure.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Upstream` with the last status (if any
    /// response arrived), all attempted names, and a truncated body.
    pub async fn complete(
        &self,
        model: &str,
        messages: Vec<ChatMessage>,
        options: &PlanOptions,
    ) -> Result<Completion> {
        let mut request = ChatRequest {
            model: model.to_string(),
            messages,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        };

        let candidates = std::iter::once(model.to_string()).chain(fallback_variants(model));
        let mut tried = Vec::new();
        let mut last_status = None;
        let mut last_body = String::new();

        for candidate in candidates {
            request.model.clone_from(&candidate);
            tried.push(candidate.clone());

            match self.backend.send(&request).await {
                Ok(reply) if reply.is_success() => {
                    return Ok(Completion {
                        model: candidate,
                        content: message_content(&reply.body),
                        tried,
                    });
                }
                Ok(reply) => {
                    warn!("Model {candidate} returned status {}", reply.status);
                    last_status = Some(reply.status);
                    last_body = reply.body;
                }
                Err(e) => {
                    warn!("Model {candidate} unreachable: {e}");
                    last_status = None;
                    last_body = match e {
                        GatewayError::Upstream { body, .. } => body,
                        other => other.to_string(),
                    };
                }
            }
        }

        let body = truncate_chars(&last_body, MAX_ERROR_SNIPPET);
        error!("Upstream error: status={last_status:?} tried={tried:?} body={body}");
        Err(GatewayError::Upstream {
            status: last_status,
            tried,
            body,
        })
    }
}

impl std::fmt::Debug for UpstreamClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamClient").finish_non_exhaustive()
    }
}

/// `choices[0].message.content` of a chat completion body, or "".
fn message_content(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/choices/0/message/content")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_default()
}
