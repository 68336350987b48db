//! Board-level types: Board, Column, Item

use super::ids::{BoardId, ColumnId, ItemId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Color given to boards created without one
pub const DEFAULT_BOARD_COLOR: &str = "#cbd5e1";

/// A board, owned by exactly one user.
///
/// Columns and items reference the board by id; the board itself holds only
/// metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: BoardId,
    pub owner_user_id: UserId,
    pub name: String,
    pub color: String,
    pub created_at: DateTime<Utc>,
}

impl Board {
    /// Create a new board for `owner` with the default color
    pub fn new(owner: UserId, name: impl Into<String>) -> Self {
        Self {
            id: BoardId::new(),
            owner_user_id: owner,
            name: name.into(),
            color: DEFAULT_BOARD_COLOR.to_string(),
            created_at: Utc::now(),
        }
    }

    pub fn with_id(mut self, id: BoardId) -> Self {
        self.id = id;
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn is_owned_by(&self, user: &UserId) -> bool {
        &self.owner_user_id == user
    }
}

/// A column is a workflow stage on one board.
///
/// `order` is dense and 1-based: a new column gets `count + 1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: ColumnId,
    pub board_id: BoardId,
    pub name: String,
    pub order: u32,
}

/// An item (card) inside a column.
///
/// `order` is a fractional sort key; only relative order within a column is
/// meaningful.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    pub column_id: ColumnId,
    pub board_id: BoardId,
    pub order: f64,
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
}

/// The fields a create-or-move writes. Content is left untouched on update.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemUpsert {
    pub id: ItemId,
    pub column_id: ColumnId,
    pub order: f64,
    pub title: String,
}

impl ItemUpsert {
    /// Apply to an existing item, or build a new one on `board_id`
    pub fn apply(&self, existing: Option<&Item>, board_id: BoardId) -> Item {
        Item {
            id: self.id.clone(),
            column_id: self.column_id.clone(),
            board_id,
            order: self.order,
            title: self.title.clone(),
            content: existing.and_then(|item| item.content.clone()),
        }
    }
}

/// A board with everything needed to render it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardData {
    pub board: Board,
    /// Ordered by `order` ascending
    pub columns: Vec<Column>,
    /// Ordered by `order` ascending within each column
    pub items: Vec<Item>,
}

impl BoardData {
    /// Items of one column in display order
    pub fn items_in<'a>(&'a self, column: &'a ColumnId) -> impl Iterator<Item = &'a Item> + 'a {
        self.items.iter().filter(move |item| &item.column_id == column)
    }

    pub fn find_column(&self, id: &ColumnId) -> Option<&Column> {
        self.columns.iter().find(|c| &c.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_board_defaults() {
        let board = Board::new(UserId::from("u1"), "Sprint 1");
        assert_eq!(board.color, DEFAULT_BOARD_COLOR);
        assert!(board.is_owned_by(&UserId::from("u1")));
        assert!(!board.is_owned_by(&UserId::from("u2")));
    }

    #[test]
    fn test_upsert_preserves_content() {
        let existing = Item {
            id: ItemId::from("i1"),
            column_id: ColumnId::from("c1"),
            board_id: BoardId::from("b1"),
            order: 1.0,
            title: "Old".into(),
            content: Some("notes".into()),
        };
        let upsert = ItemUpsert {
            id: ItemId::from("i1"),
            column_id: ColumnId::from("c2"),
            order: 2.5,
            title: "New".into(),
        };

        let item = upsert.apply(Some(&existing), BoardId::from("b1"));
        assert_eq!(item.column_id, ColumnId::from("c2"));
        assert_eq!(item.order, 2.5);
        assert_eq!(item.content.as_deref(), Some("notes"));
    }

    #[test]
    fn test_item_wire_shape() {
        let item = Item {
            id: ItemId::from("i1"),
            column_id: ColumnId::from("c1"),
            board_id: BoardId::from("b1"),
            order: 1.0,
            title: "Write spec".into(),
            content: None,
        };
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["columnId"], "c1");
        assert_eq!(value["content"], serde_json::Value::Null);
    }
}
