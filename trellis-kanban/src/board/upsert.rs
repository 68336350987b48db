//! UpsertBoard command - the board editor form

use crate::context::KanbanContext;
use crate::error::{KanbanError, Result};
use crate::types::{Board, BoardId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;
use tracing::debug;
use trellis_operations::{async_trait, operation, Execute, ExecutionResult, Operation};

/// Create a board, or update the name and color of an owned one.
///
/// Name and color are checked against the configured length bounds and
/// every violation is reported at once.
#[operation(
    intent = "upsertBoard",
    entity = "board",
    description = "Create a board or update its name and color"
)]
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertBoard {
    /// Existing board id; a new id is generated when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<BoardId>,
    /// Board name
    pub name: String,
    /// Board color; keeps the current color, or the configured default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl UpsertBoard {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            color: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<BoardId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    async fn apply(&self, ctx: &KanbanContext) -> Result<Value> {
        let existing = match &self.id {
            Some(id) => ctx.store().find_board(id, ctx.user()).await?,
            None => None,
        };

        let color = self
            .color
            .clone()
            .or_else(|| existing.as_ref().map(|b| b.color.clone()))
            .unwrap_or_else(|| ctx.config().default_board_color.clone());

        let errors = ctx.config().validate_board(&self.name, &color);
        if !errors.is_empty() {
            return Err(KanbanError::ValidationFailed { errors });
        }

        let mut board = Board::new(ctx.user().clone(), self.name.as_str()).with_color(color);
        if let Some(id) = &self.id {
            board = board.with_id(id.clone());
        }
        let board = ctx.store().upsert_board(board).await?;
        debug!(board = %board.id, created = existing.is_none(), "Upserted board");

        Ok(serde_json::to_value(board)?)
    }
}

#[async_trait]
impl Execute<KanbanContext, KanbanError> for UpsertBoard {
    async fn execute(&self, ctx: &KanbanContext) -> ExecutionResult<Value, KanbanError> {
        let start = Instant::now();
        let input = serde_json::to_value(self).unwrap_or(Value::Null);
        ExecutionResult::logged(self.op_string(), input, start, self.apply(ctx).await)
    }
}
