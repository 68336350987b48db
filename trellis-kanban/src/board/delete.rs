//! DeleteBoard command

use crate::context::KanbanContext;
use crate::error::{KanbanError, Result};
use crate::types::{BoardId, MutationAck};
use crate::validate::require_id;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;
use tracing::info;
use trellis_operations::{async_trait, operation, Execute, ExecutionResult, Operation};

/// Delete a board together with its columns and items.
///
/// Unlike item and column deletes, a board that does not resolve under the
/// acting user is `NotFound`.
#[operation(
    intent = "deleteBoard",
    entity = "board",
    description = "Delete a board with all of its columns and items"
)]
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteBoard {
    /// The board to delete
    pub board_id: BoardId,
}

impl DeleteBoard {
    pub fn new(board_id: impl Into<BoardId>) -> Self {
        Self {
            board_id: board_id.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        require_id("boardId", &self.board_id)
    }

    async fn apply(&self, ctx: &KanbanContext) -> Result<Value> {
        self.validate()?;
        let removed = ctx
            .store()
            .delete_board(&self.board_id, ctx.user())
            .await?
            .ok_or_else(|| KanbanError::not_found("board", &self.board_id))?;
        info!(
            board = %self.board_id,
            columns = removed.columns,
            items = removed.items,
            "Deleted board"
        );

        let ack = MutationAck::new(self.intent(), self.board_id.as_str())
            .with_board(self.board_id.clone())
            .deleted(true)
            .with_removed_items(removed.items);
        Ok(serde_json::to_value(ack)?)
    }
}

#[async_trait]
impl Execute<KanbanContext, KanbanError> for DeleteBoard {
    async fn execute(&self, ctx: &KanbanContext) -> ExecutionResult<Value, KanbanError> {
        let start = Instant::now();
        let input = serde_json::to_value(self).unwrap_or(Value::Null);
        ExecutionResult::logged(self.op_string(), input, start, self.apply(ctx).await)
    }
}
