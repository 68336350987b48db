//! Structured responses at the dispatcher boundary

use crate::error::{ErrorKind, FieldError, KanbanError, Result};
use crate::types::MutationAck;
use serde::{Deserialize, Serialize};

/// What a failed mutation reports to the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub kind: ErrorKind,
    pub message: String,
    pub status: u16,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldError>,
}

impl From<&KanbanError> for ErrorBody {
    fn from(error: &KanbanError) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
            status: error.status_code(),
            fields: error.field_errors().to_vec(),
        }
    }
}

/// `{ "ok": true, "entity": ... }` or `{ "ok": false, "error": ... }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<MutationAck>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl MutationResponse {
    pub fn success(ack: MutationAck) -> Self {
        Self {
            ok: true,
            entity: Some(ack),
            error: None,
        }
    }

    pub fn failure(error: &KanbanError) -> Self {
        Self {
            ok: false,
            entity: None,
            error: Some(ErrorBody::from(error)),
        }
    }

    pub fn from_result(result: Result<MutationAck>) -> Self {
        match result {
            Ok(ack) => Self::success(ack),
            Err(error) => Self::failure(&error),
        }
    }

    /// HTTP status for the response
    pub fn status(&self) -> u16 {
        self.error.as_ref().map_or(200, |error| error.status)
    }
}
