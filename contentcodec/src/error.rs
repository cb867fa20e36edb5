//! All error types for the contentcodec crate.
//!
//! Only conditions that must stop work on a single entry are errors. Schema drift,
//! unresolvable uuids and malformed HTML are logged and skipped by the engine instead.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("schema not found: {0}")]
    SchemaNotFound(String),

    #[error("entry not found: {content_type}#{} in locale `{locale}`", .document_id.as_deref().unwrap_or("-"))]
    EntryNotFound {
        content_type: String,
        document_id: Option<String>,
        locale: String,
    },

    #[error("invalid element `{0}`")]
    InvalidElement(String),

    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("repository error: {message}")]
    Repository {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Creates a new repository error with optional source error
    pub fn repository(
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Error::Repository {
            message: message.into(),
            source,
        }
    }

    /// Creates a new invalid payload error
    pub fn invalid_payload(message: impl Into<String>) -> Self {
        Error::InvalidPayload(message.into())
    }

    /// Creates an entry-not-found error for the given address.
    pub fn entry_not_found(content_type: &str, document_id: Option<&str>, locale: &str) -> Self {
        Error::EntryNotFound {
            content_type: content_type.to_string(),
            document_id: document_id.map(str::to_string),
            locale: locale.to_string(),
        }
    }
}
