//! DeleteCard command

use crate::context::KanbanContext;
use crate::error::{KanbanError, Result};
use crate::types::{ItemId, MutationAck};
use crate::validate::require_id;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;
use trellis_operations::{async_trait, operation, Execute, ExecutionResult, Operation};

/// Delete an item. Deleting an item that is already gone succeeds.
#[operation(intent = "deleteCard", entity = "item", description = "Delete an item")]
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteCard {
    /// The item to delete
    pub item_id: ItemId,
}

impl DeleteCard {
    pub fn new(item_id: impl Into<ItemId>) -> Self {
        Self {
            item_id: item_id.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        require_id("itemId", &self.item_id)
    }

    async fn apply(&self, ctx: &KanbanContext) -> Result<Value> {
        self.validate()?;
        let deleted = ctx.store().delete_item(&self.item_id, ctx.user()).await?;
        let ack = MutationAck::new(self.intent(), self.item_id.as_str()).deleted(deleted);
        Ok(serde_json::to_value(ack)?)
    }
}

#[async_trait]
impl Execute<KanbanContext, KanbanError> for DeleteCard {
    async fn execute(&self, ctx: &KanbanContext) -> ExecutionResult<Value, KanbanError> {
        let start = Instant::now();
        let input = serde_json::to_value(self).unwrap_or(Value::Null);
        ExecutionResult::logged(self.op_string(), input, start, self.apply(ctx).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::UpsertItem;
    use crate::test_support::{bob, setup};

    #[tokio::test]
    async fn test_delete_card() {
        let fixture = setup().await;
        UpsertItem::new("i1", "todo", 1.0, "Card")
            .execute(&fixture.ctx)
            .await
            .into_result()
            .unwrap();

        let result = DeleteCard::new("i1")
            .execute(&fixture.ctx)
            .await
            .into_result()
            .unwrap();

        assert_eq!(result["deleted"], true);
        assert_eq!(fixture.store.item_count().await, 0);
    }

    #[tokio::test]
    async fn test_delete_missing_card_is_noop_success() {
        let fixture = setup().await;

        let result = DeleteCard::new("ghost")
            .execute(&fixture.ctx)
            .await
            .into_result()
            .unwrap();

        assert_eq!(result["deleted"], false);
    }

    #[tokio::test]
    async fn test_delete_other_users_card_leaves_it() {
        let fixture = setup().await;
        UpsertItem::new("i1", "todo", 1.0, "Card")
            .execute(&fixture.ctx)
            .await
            .into_result()
            .unwrap();

        DeleteCard::new("i1")
            .execute(&fixture.ctx_for(bob()))
            .await
            .into_result()
            .unwrap();

        assert_eq!(fixture.store.item_count().await, 1);
    }
}
