//! CreateColumn command

use crate::context::KanbanContext;
use crate::error::{KanbanError, Result};
use crate::types::{BoardId, ColumnId, MutationAck};
use crate::validate::{require_id, require_text};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;
use tracing::debug;
use trellis_operations::{async_trait, operation, Execute, ExecutionResult, Operation};

/// Append a column to a board.
///
/// The column lands after the existing ones: its order is the current
/// column count plus one.
#[operation(
    intent = "createColumn",
    entity = "column",
    description = "Add a column to the end of a board"
)]
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateColumn {
    /// Client-generated column id
    pub id: ColumnId,
    /// The column display name
    pub name: String,
    /// The board receiving the column
    pub board_id: BoardId,
}

impl CreateColumn {
    pub fn new(
        id: impl Into<ColumnId>,
        name: impl Into<String>,
        board_id: impl Into<BoardId>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            board_id: board_id.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        require_id("id", &self.id)?;
        require_text("name", &self.name)?;
        require_id("boardId", &self.board_id)
    }

    async fn apply(&self, ctx: &KanbanContext) -> Result<Value> {
        self.validate()?;

        if let Some(board) = ctx.route_board() {
            if board != &self.board_id {
                return Err(KanbanError::not_found("board", &self.board_id));
            }
        }

        let column = ctx
            .store()
            .append_column(&self.board_id, self.id.clone(), &self.name, ctx.user())
            .await?;
        debug!(column = %column.id, order = column.order, "Created column");

        let ack = MutationAck::new(self.intent(), column.id.as_str())
            .with_board(column.board_id)
            .with_order(f64::from(column.order))
            .with_name(column.name);
        Ok(serde_json::to_value(ack)?)
    }
}

#[async_trait]
impl Execute<KanbanContext, KanbanError> for CreateColumn {
    async fn execute(&self, ctx: &KanbanContext) -> ExecutionResult<Value, KanbanError> {
        let start = Instant::now();
        let input = serde_json::to_value(self).unwrap_or(Value::Null);
        ExecutionResult::logged(self.op_string(), input, start, self.apply(ctx).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{bob, setup};

    #[tokio::test]
    async fn test_create_column_appends() {
        let fixture = setup().await;
        for (id, name) in [("doing", "Doing"), ("done", "Done")] {
            CreateColumn::new(id, name, "b1")
                .execute(&fixture.ctx)
                .await
                .into_result()
                .unwrap();
        }

        let result = CreateColumn::new("later", "Later", "b1")
            .execute(&fixture.ctx)
            .await
            .into_result()
            .unwrap();

        assert_eq!(result["order"], 4.0);
        assert_eq!(result["boardId"], "b1");
    }

    #[tokio::test]
    async fn test_duplicate_column_id_fails_validation() {
        let fixture = setup().await;

        let err = CreateColumn::new("todo", "Todo again", "b1")
            .execute(&fixture.ctx)
            .await
            .into_result()
            .unwrap_err();

        assert_eq!(err.field_errors()[0].field, "id");
    }

    #[tokio::test]
    async fn test_create_on_foreign_board_is_not_found() {
        let fixture = setup().await;

        let err = CreateColumn::new("x", "X", "b1")
            .execute(&fixture.ctx_for(bob()))
            .await
            .into_result()
            .unwrap_err();

        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_missing_name_is_malformed() {
        let fixture = setup().await;

        let err = CreateColumn::new("x", " ", "b1")
            .execute(&fixture.ctx)
            .await
            .into_result()
            .unwrap_err();

        assert!(matches!(err, KanbanError::MalformedRequest { .. }));
    }
}
