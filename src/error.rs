use std::fmt;

use serde::{Deserialize, Serialize};

/// A single field-level validation failure, reported alongside its siblings
/// so the caller sees everything wrong with a request at once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        FieldError {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Error taxonomy for the issue engine. Every failure is surfaced to the
/// caller; an operation either fully applies or fully fails.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Malformed or missing input. Caller-fixable, carries per-field detail.
    #[error("validation failed: {}", format_fields(.0))]
    Validation(Vec<FieldError>),

    /// The referenced entity does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// The caller lacks the required role.
    #[error("access denied")]
    AccessDenied,

    /// The persistence layer failed. Fatal for the request, never retried here.
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

impl CoreError {
    pub fn issue_not_found(id: i64) -> Self {
        CoreError::NotFound(format!("issue #{}", id))
    }

    pub fn user_not_found(id: i64) -> Self {
        CoreError::NotFound(format!("user #{}", id))
    }
}

fn format_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
