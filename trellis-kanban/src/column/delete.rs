//! DeleteColumn command

use crate::context::KanbanContext;
use crate::error::{KanbanError, Result};
use crate::types::{ColumnId, MutationAck};
use crate::validate::require_id;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;
use tracing::debug;
use trellis_operations::{async_trait, operation, Execute, ExecutionResult, Operation};

/// Delete a column and every item in it.
///
/// A column that is already gone is a successful no-op.
#[operation(
    intent = "deleteColumn",
    entity = "column",
    description = "Delete a column and its items"
)]
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteColumn {
    /// The column to delete
    pub column_id: ColumnId,
}

impl DeleteColumn {
    pub fn new(column_id: impl Into<ColumnId>) -> Self {
        Self {
            column_id: column_id.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        require_id("columnId", &self.column_id)
    }

    async fn apply(&self, ctx: &KanbanContext) -> Result<Value> {
        self.validate()?;
        let removed = ctx
            .store()
            .delete_column(&self.column_id, ctx.user())
            .await?;

        let ack = MutationAck::new(self.intent(), self.column_id.as_str());
        let ack = match removed {
            Some(removed) => {
                debug!(column = %self.column_id, items = removed.items, "Deleted column");
                ack.deleted(true).with_removed_items(removed.items)
            }
            None => ack.deleted(false),
        };
        Ok(serde_json::to_value(ack)?)
    }
}

#[async_trait]
impl Execute<KanbanContext, KanbanError> for DeleteColumn {
    async fn execute(&self, ctx: &KanbanContext) -> ExecutionResult<Value, KanbanError> {
        let start = Instant::now();
        let input = serde_json::to_value(self).unwrap_or(Value::Null);
        ExecutionResult::logged(self.op_string(), input, start, self.apply(ctx).await)
    }
}
