//! Sub-operations on an incident's update log.

use jiff::Timestamp;
use serde_json::Value;

use crate::{
    error::{GatewayError, Result},
    models::UpdateEntry,
    sanitize::{MAX_INCIDENT_TS, MAX_INCIDENT_UPDATES, MAX_UPDATE_TEXT, clean_bool, clean_str},
};

/// A parsed `PATCH /incidents/{id}/updates` body.
///
/// `Resolve` and `Delete` address an update by its exact `(ts, text)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOp {
    Add { text: String, ts: Option<String> },
    Resolve { ts: String, text: String, resolved: bool },
    Delete { ts: String, text: String },
}

impl UpdateOp {
    /// Parses and validates an operation body.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::InvalidInput` when `op` is missing or
    /// unsupported, or when `add` has no text after trimming.
    pub fn from_body(body: &Value) -> Result<Self> {
        let op = body.get("op").and_then(Value::as_str).unwrap_or_default();
        let raw = |field: &str| {
            body.get(field)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        match op {
            "" => Err(GatewayError::invalid_input("op").with_reason("Missing op")),
            "add" => {
                let text = clean_str(body.get("text"), MAX_UPDATE_TEXT);
                if text.is_empty() {
                    return Err(GatewayError::invalid_input("text").with_reason("Missing text"));
                }
                let ts = clean_str(body.get("ts"), MAX_INCIDENT_TS);
                Ok(Self::Add {
                    text,
                    ts: Some(ts).filter(|ts| !ts.is_empty()),
                })
            }
            "resolve" => Ok(Self::Resolve {
                ts: raw("ts"),
                text: raw("text"),
                resolved: clean_bool(body.get("resolved")),
            }),
            "delete" => Ok(Self::Delete {
                ts: raw("ts"),
                text: raw("text"),
            }),
            other => Err(GatewayError::invalid_input("op").with_reason(format!("Unsupported op '{other}'"))),
        }
    }

    /// Applies the operation to an update log.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::UpdateNotFound` when no entry matches the
    /// `(ts, text)` pair, or `GatewayError::InvalidInput` when adding to a
    /// full log.
    pub fn apply(self, updates: &mut Vec<UpdateEntry>) -> Result<()> {
        match self {
            Self::Add { text, ts } => {
                if updates.len() >= MAX_INCIDENT_UPDATES {
                    return Err(GatewayError::invalid_input("updates")
                        .with_reason(format!("At most {MAX_INCIDENT_UPDATES} updates per incident")));
                }
                let ts = ts.unwrap_or_else(|| Timestamp::now().to_string());
                updates.push(UpdateEntry::new(text, ts));
                Ok(())
            }
            Self::Resolve { ts, text, resolved } => {
                let entry = updates
                    .iter_mut()
                    .find(|u| u.is_identified_by(&ts, &text))
                    .ok_or(GatewayError::UpdateNotFound { ts, text })?;
                entry.resolved = resolved;
                Ok(())
            }
            Self::Delete { ts, text } => {
                let index = updates
                    .iter()
                    .position(|u| u.is_identified_by(&ts, &text))
                    .ok_or(GatewayError::UpdateNotFound { ts, text })?;
                updates.remove(index);
                Ok(())
            }
        }
    }
}
