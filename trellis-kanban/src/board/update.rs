//! UpdateBoardName command

use crate::context::KanbanContext;
use crate::error::{KanbanError, Result};
use crate::types::{BoardId, MutationAck};
use crate::validate::require_text;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;
use trellis_operations::{async_trait, operation, Execute, ExecutionResult, Operation};

/// Rename a board.
///
/// The board comes from `board_id` when given, otherwise from the board view
/// the request was made in.
#[operation(
    intent = "updateBoardName",
    entity = "board",
    description = "Rename a board"
)]
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBoardName {
    /// Board to rename; defaults to the current board view
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub board_id: Option<BoardId>,
    /// The new board name
    pub name: String,
}

impl UpdateBoardName {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            board_id: None,
            name: name.into(),
        }
    }

    pub fn with_board(mut self, board_id: impl Into<BoardId>) -> Self {
        self.board_id = Some(board_id.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        require_text("name", &self.name)
    }

    async fn apply(&self, ctx: &KanbanContext) -> Result<Value> {
        self.validate()?;
        let board_id = ctx.resolve_board(self.board_id.as_ref())?;

        if let Some(error) = ctx.config().board_name.check("name", &self.name) {
            return Err(KanbanError::ValidationFailed {
                errors: vec![error],
            });
        }

        let board = ctx
            .store()
            .rename_board(board_id, ctx.user(), &self.name)
            .await?;

        let ack = MutationAck::new(self.intent(), board.id.as_str())
            .with_board(board.id.clone())
            .with_name(board.name);
        Ok(serde_json::to_value(ack)?)
    }
}

#[async_trait]
impl Execute<KanbanContext, KanbanError> for UpdateBoardName {
    async fn execute(&self, ctx: &KanbanContext) -> ExecutionResult<Value, KanbanError> {
        let start = Instant::now();
        let input = serde_json::to_value(self).unwrap_or(Value::Null);
        ExecutionResult::logged(self.op_string(), input, start, self.apply(ctx).await)
    }
}
