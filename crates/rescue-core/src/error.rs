//! Error types for the gateway library.

use std::path::PathBuf;

use thiserror::Error;

/// Comprehensive error type for all gateway operations.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// SQLite connection or query errors
    #[error("Storage error: {message}")]
    Storage {
        message: String,
        #[source]
        source: rusqlite::Error,
    },
    /// Invalid input validation errors
    #[error("Invalid input for field '{field}': {reason}")]
    InvalidInput { field: String, reason: String },
    /// Missing or incorrect bearer token on a write
    #[error("Unauthorized")]
    Unauthorized,
    /// Incident not found for the given ID
    #[error("Incident '{id}' not found")]
    IncidentNotFound { id: String },
    /// No update with the given `(ts, text)` identity
    #[error("Update not found")]
    UpdateNotFound { ts: String, text: String },
    /// No cached plan stored for the given incident
    #[error("Plan for incident '{id}' not found")]
    PlanNotFound { id: String },
    /// Caller exceeded its request window
    #[error("Rate limit exceeded")]
    RateLimited { caller: String },
    /// LLM backend returned a non-success response after all fallbacks
    #[error("Upstream error")]
    Upstream {
        status: Option<u16>,
        tried: Vec<String>,
        body: String,
    },
    /// No extraction strategy recovered a JSON object
    #[error("Invalid model response")]
    Extraction { raw: String },
    /// A persistence binding is not configured
    #[error("{binding} not configured")]
    StorageUnavailable { binding: &'static str },
    /// File system operation errors
    #[error("File system error at path '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        source: std::io::Error,
    },
    /// XDG directory specification errors
    #[error("XDG directory error: {0}")]
    XdgDirectory(String),
    /// Serialization/deserialization errors
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// Builder for creating storage errors with optional context.
pub struct StorageErrorBuilder {
    message: String,
}

impl StorageErrorBuilder {
    /// Create a new storage error builder with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Build the error with the given source.
    pub fn with_source(self, source: rusqlite::Error) -> GatewayError {
        GatewayError::Storage {
            message: self.message,
            source,
        }
    }
}

/// Builder for creating input validation errors.
pub struct InvalidInputBuilder {
    field: String,
}

impl InvalidInputBuilder {
    /// Create a new invalid input error builder for a field.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    /// Build the error with the given reason.
    pub fn with_reason(self, reason: impl Into<String>) -> GatewayError {
        GatewayError::InvalidInput {
            field: self.field,
            reason: reason.into(),
        }
    }
}

impl GatewayError {
    /// Creates a builder for storage errors.
    pub fn storage(message: impl Into<String>) -> StorageErrorBuilder {
        StorageErrorBuilder::new(message)
    }

    /// Creates a builder for input validation errors.
    pub fn invalid_input(field: impl Into<String>) -> InvalidInputBuilder {
        InvalidInputBuilder::new(field)
    }

    /// Wraps a `spawn_blocking` join failure.
    pub fn join(error: tokio::task::JoinError) -> Self {
        Self::Configuration {
            message: format!("Task join error: {error}"),
        }
    }

    /// HTTP status code this error maps to at the service boundary.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidInput { .. } | Self::Serialization { .. } => 400,
            Self::Unauthorized => 401,
            Self::IncidentNotFound { .. }
            | Self::UpdateNotFound { .. }
            | Self::PlanNotFound { .. } => 404,
            Self::RateLimited { .. } => 429,
            Self::StorageUnavailable { .. } => 501,
            Self::Upstream { .. } => 502,
            Self::Extraction { .. }
            | Self::Storage { .. }
            | Self::FileSystem { .. }
            | Self::XdgDirectory(_)
            | Self::Configuration { .. } => 500,
        }
    }
}

/// Specialized extension trait for SQLite-related Results.
pub trait StorageResultExt<T> {
    /// Map storage errors with a message.
    fn db_context(self, message: &str) -> Result<T>;
}

impl<T> StorageResultExt<T> for std::result::Result<T, rusqlite::Error> {
    fn db_context(self, message: &str) -> Result<T> {
        self.map_err(|e| GatewayError::storage(message).with_source(e))
    }
}

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, GatewayError>;
