//! Deterministic chat prompt construction.
//!
//! A prompt is always the same shape: one system instruction, the worked
//! examples as alternating user/assistant turns, then the current request as
//! the final user turn. The instruction and examples are versioned data in
//! [`few_shots`]; the same request always yields the same messages.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    error::Result,
    models::{PlanOptions, PlanRequest, ScenarioInput, UpdateRef},
};

pub mod few_shots;

/// Chat role of a prompt message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One message in an OpenAI-compatible chat completion request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// The final user turn: the request with only its open updates.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PromptInput<'a> {
    scenario: &'a ScenarioInput,
    updates: Vec<UpdateRef<'a>>,
    options: &'a PlanOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    incident_id: Option<&'a str>,
}

/// System instruction plus few-shot examples.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    pub version: String,
    pub system: String,
    pub few_shots: Vec<(Value, Value)>,
}

impl PromptTemplate {
    /// The built-in planning template.
    pub fn standard() -> Self {
        Self {
            version: few_shots::TEMPLATE_VERSION.to_string(),
            system: few_shots::SYSTEM_INSTRUCTION.to_string(),
            few_shots: few_shots::examples(),
        }
    }

    /// Builds the message sequence for an already-redacted request.
    pub fn build_messages(&self, request: &PlanRequest) -> Result<Vec<ChatMessage>> {
        let mut messages = Vec::with_capacity(2 + self.few_shots.len() * 2);
        messages.push(ChatMessage::new(Role::System, self.system.as_str()));

        for (input, output) in &self.few_shots {
            messages.push(ChatMessage::new(Role::User, serde_json::to_string(input)?));
            messages.push(ChatMessage::new(
                Role::Assistant,
                serde_json::to_string(output)?,
            ));
        }

        let current = PromptInput {
            scenario: &request.scenario,
            updates: request.open_updates().map(|u| u.projection()).collect(),
            options: &request.options,
            incident_id: request.incident_id.as_deref(),
        };
        messages.push(ChatMessage::new(Role::User, serde_json::to_string(&current)?));

        Ok(messages)
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::standard()
    }
}
