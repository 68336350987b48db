//! Mutation acknowledgements returned to the client for reconciliation

use super::ids::{BoardId, ColumnId};
use serde::{Deserialize, Serialize};

/// What a successful mutation echoes back.
///
/// `id` is always the affected entity; the optional fields carry the
/// server-resolved linkage (owning board, column, resolved order) the
/// client needs to reconcile optimistic state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationAck {
    pub intent: String,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub board_id: Option<BoardId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_id: Option<ColumnId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Set for deletes; false when the target was already gone
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted: Option<bool>,
    /// Items removed along with a column or board
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub removed_items: Option<usize>,
}

impl MutationAck {
    pub fn new(intent: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            intent: intent.into(),
            id: id.into(),
            board_id: None,
            column_id: None,
            order: None,
            name: None,
            deleted: None,
            removed_items: None,
        }
    }

    pub fn with_board(mut self, board_id: BoardId) -> Self {
        self.board_id = Some(board_id);
        self
    }

    pub fn with_column(mut self, column_id: ColumnId) -> Self {
        self.column_id = Some(column_id);
        self
    }

    pub fn with_order(mut self, order: f64) -> Self {
        self.order = Some(order);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn deleted(mut self, deleted: bool) -> Self {
        self.deleted = Some(deleted);
        self
    }

    pub fn with_removed_items(mut self, count: usize) -> Self {
        self.removed_items = Some(count);
        self
    }
}
