//! GetBoard command

use crate::context::KanbanContext;
use crate::error::{KanbanError, Result};
use crate::types::{BoardData, BoardId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use trellis_operations::{async_trait, operation, Execute, ExecutionResult};

/// Load a board with its ordered columns and items
#[operation(
    intent = "getBoard",
    entity = "board",
    description = "Load a board with its columns and items"
)]
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetBoard {
    /// The board to load
    pub id: BoardId,
}

impl GetBoard {
    pub fn new(id: impl Into<BoardId>) -> Self {
        Self { id: id.into() }
    }

    /// Read the board as typed data
    pub async fn load(&self, ctx: &KanbanContext) -> Result<BoardData> {
        let store = ctx.store();
        let board = store
            .find_board(&self.id, ctx.user())
            .await?
            .ok_or_else(|| KanbanError::not_found("board", &self.id))?;
        let columns = store.list_columns(&self.id, ctx.user()).await?;
        let mut items = store.list_items(&self.id, ctx.user()).await?;
        items.sort_by(|a, b| a.order.total_cmp(&b.order).then_with(|| a.id.cmp(&b.id)));

        Ok(BoardData {
            board,
            columns,
            items,
        })
    }
}

#[async_trait]
impl Execute<KanbanContext, KanbanError> for GetBoard {
    async fn execute(&self, ctx: &KanbanContext) -> ExecutionResult<Value, KanbanError> {
        let result: Result<Value> = async { Ok(serde_json::to_value(self.load(ctx).await?)?) }.await;
        ExecutionResult::unlogged(result)
    }
}
