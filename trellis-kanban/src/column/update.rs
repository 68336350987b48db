//! UpdateColumn command

use crate::context::KanbanContext;
use crate::error::{KanbanError, Result};
use crate::types::{ColumnId, MutationAck};
use crate::validate::{require_id, require_text};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;
use trellis_operations::{async_trait, operation, Execute, ExecutionResult, Operation};

/// Rename a column
#[operation(intent = "updateColumn", entity = "column", description = "Rename a column")]
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateColumn {
    /// The column to rename
    pub column_id: ColumnId,
    /// The new name
    pub name: String,
}

impl UpdateColumn {
    pub fn new(column_id: impl Into<ColumnId>, name: impl Into<String>) -> Self {
        Self {
            column_id: column_id.into(),
            name: name.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        require_id("columnId", &self.column_id)?;
        require_text("name", &self.name)
    }

    async fn apply(&self, ctx: &KanbanContext) -> Result<Value> {
        self.validate()?;
        let column = ctx
            .store()
            .rename_column(&self.column_id, ctx.user(), &self.name)
            .await?;

        let ack = MutationAck::new(self.intent(), column.id.as_str())
            .with_board(column.board_id)
            .with_name(column.name);
        Ok(serde_json::to_value(ack)?)
    }
}

#[async_trait]
impl Execute<KanbanContext, KanbanError> for UpdateColumn {
    async fn execute(&self, ctx: &KanbanContext) -> ExecutionResult<Value, KanbanError> {
        let start = Instant::now();
        let input = serde_json::to_value(self).unwrap_or(Value::Null);
        ExecutionResult::logged(self.op_string(), input, start, self.apply(ctx).await)
    }
}
