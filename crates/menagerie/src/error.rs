//! Error types for the menagerie library.

use std::path::PathBuf;
use thiserror::Error;

use crate::validation::FieldErrors;

/// Main error type for menagerie operations.
#[derive(Debug, Error)]
pub enum MenagerieError {
    /// A record or configuration change failed validation. Carries the
    /// per-field messages so callers can surface them against the
    /// originating input.
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// A referenced entity does not exist in the store.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// A uniqueness constraint was violated.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A JSON-Schema document is not itself a valid schema.
    #[error("Invalid schema document for {context}: {message}")]
    Schema { context: String, message: String },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error reading or writing a persisted store file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl MenagerieError {
    /// Build a `NotFound` error from an entity label and any displayable id.
    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        MenagerieError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// The field errors carried by a `Validation` error, if that is what
    /// this is.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            MenagerieError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<FieldErrors> for MenagerieError {
    fn from(errors: FieldErrors) -> Self {
        MenagerieError::Validation(errors)
    }
}

/// Result type alias for menagerie operations.
pub type Result<T> = std::result::Result<T, MenagerieError>;
