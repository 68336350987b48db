//! UpsertItem command - the shared path behind createItem and moveItem

use crate::context::KanbanContext;
use crate::error::{KanbanError, Result};
use crate::types::{ColumnId, ItemId, ItemUpsert, MutationAck};
use crate::validate::{require_finite, require_id, require_text};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;
use tracing::debug;
use trellis_operations::{async_trait, operation, Execute, ExecutionResult, Operation};

/// Create an item, or move an existing one.
///
/// Column and order arrive already resolved by the client's ordering engine.
/// Upserting twice with the same fields leaves the same state, so retried or
/// duplicated drags are harmless.
#[operation(
    intent = "upsertItem",
    entity = "item",
    description = "Create an item or move it to a column and position"
)]
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertItem {
    /// Client-generated item id
    pub id: ItemId,
    /// Destination column
    pub column_id: ColumnId,
    /// Fractional order within the destination column
    pub order: f64,
    /// Card title
    pub title: String,
}

impl UpsertItem {
    pub fn new(
        id: impl Into<ItemId>,
        column_id: impl Into<ColumnId>,
        order: f64,
        title: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            column_id: column_id.into(),
            order,
            title: title.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        require_id("id", &self.id)?;
        require_id("columnId", &self.column_id)?;
        require_finite("order", self.order)?;
        require_text("title", &self.title)
    }

    async fn apply(&self, ctx: &KanbanContext) -> Result<Value> {
        self.validate()?;

        let column = ctx
            .store()
            .find_column(&self.column_id, ctx.user())
            .await?
            .ok_or_else(|| KanbanError::not_found("column", &self.column_id))?;

        if let Some(board) = ctx.route_board() {
            if &column.board_id != board {
                return Err(KanbanError::not_found("column", &self.column_id));
            }
        }

        let item = ctx
            .store()
            .upsert_item(
                ItemUpsert {
                    id: self.id.clone(),
                    column_id: self.column_id.clone(),
                    order: self.order,
                    title: self.title.clone(),
                },
                ctx.user(),
            )
            .await?;
        debug!(item = %item.id, column = %item.column_id, order = item.order, "Upserted item");

        let ack = MutationAck::new(self.intent(), item.id.as_str())
            .with_board(item.board_id)
            .with_column(item.column_id)
            .with_order(item.order)
            .with_name(item.title);
        Ok(serde_json::to_value(ack)?)
    }
}

#[async_trait]
impl Execute<KanbanContext, KanbanError> for UpsertItem {
    async fn execute(&self, ctx: &KanbanContext) -> ExecutionResult<Value, KanbanError> {
        let start = Instant::now();
        let input = serde_json::to_value(self).unwrap_or(Value::Null);
        ExecutionResult::logged(self.op_string(), input, start, self.apply(ctx).await)
    }
}
