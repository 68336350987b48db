//! Error types for the board engine

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type for board operations
pub type Result<T> = std::result::Result<T, KanbanError>;

/// A constraint violation on one form field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Errors that can occur in board operations
#[derive(Debug, Error)]
pub enum KanbanError {
    /// Required field absent or of the wrong shape; the store was never touched
    #[error("malformed request: {message}")]
    MalformedRequest { message: String },

    /// Target does not exist or is not owned by the acting user
    #[error("{resource} not found: {id}")]
    NotFound { resource: String, id: String },

    /// Field constraints violated
    #[error("validation failed: {}", join_fields(.errors))]
    ValidationFailed { errors: Vec<FieldError> },

    /// Intent tag outside the known set
    #[error("unknown intent: {intent}")]
    UnknownIntent { intent: String },

    /// The request never produced a dispatcher answer (timeout, disconnect)
    #[error("transport error: {message}")]
    Transport { message: String },

    /// Configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Coarse classification used in structured responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    MalformedRequest,
    NotFound,
    ValidationFailed,
    UnknownIntent,
    Transport,
    Internal,
}

fn join_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl KanbanError {
    /// Create a malformed request error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedRequest {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(resource: impl Into<String>, id: impl fmt::Display) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.to_string(),
        }
    }

    /// Create a validation error for a single field
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            errors: vec![FieldError::new(field, message)],
        }
    }

    /// Create a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MalformedRequest { .. } => ErrorKind::MalformedRequest,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::ValidationFailed { .. } => ErrorKind::ValidationFailed,
            Self::UnknownIntent { .. } => ErrorKind::UnknownIntent,
            Self::Transport { .. } => ErrorKind::Transport,
            Self::Config(_) | Self::Json(_) => ErrorKind::Internal,
        }
    }

    /// HTTP status class for the error
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::MalformedRequest
            | ErrorKind::ValidationFailed
            | ErrorKind::UnknownIntent => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::Transport => 503,
            ErrorKind::Internal => 500,
        }
    }

    /// Per-field messages, empty unless this is a validation failure
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            Self::ValidationFailed { errors } => errors,
            _ => &[],
        }
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<figment::Error> for KanbanError {
    fn from(error: figment::Error) -> Self {
        Self::Config(Box::new(error))
    }
}
