//! ListBoards command

use crate::context::KanbanContext;
use crate::error::{KanbanError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use trellis_operations::{async_trait, operation, Execute, ExecutionResult};

/// List the acting user's boards, oldest first
#[operation(
    intent = "listBoards",
    entity = "board",
    description = "List the acting user's boards"
)]
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ListBoards;

#[async_trait]
impl Execute<KanbanContext, KanbanError> for ListBoards {
    async fn execute(&self, ctx: &KanbanContext) -> ExecutionResult<Value, KanbanError> {
        let result: Result<Value> = async {
            let boards = ctx.store().list_boards(ctx.user()).await?;
            let count = boards.len();
            Ok(serde_json::json!({
                "boards": boards,
                "count": count,
            }))
        }
        .await;
        ExecutionResult::unlogged(result)
    }
}
