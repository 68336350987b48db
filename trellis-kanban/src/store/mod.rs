//! Entity store: the persistence seam.
//!
//! Commands never see a concrete engine, only this trait. Every call that
//! touches a board, column or item is scoped by the owning user; an entity
//! owned by someone else behaves exactly like a missing one.
//!
//! Implementations must apply each call atomically, including cascades
//! (a column delete removes its items in the same unit). Nothing is
//! required to be atomic across calls.

mod memory;

pub use memory::MemoryStore;

use crate::error::Result;
use crate::types::{Board, BoardId, Column, ColumnId, Item, ItemId, ItemUpsert, UserId};
use async_trait::async_trait;
use trellis_operations::LogEntry;

/// What a cascading delete removed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Removed {
    pub columns: usize,
    pub items: usize,
}

#[async_trait]
pub trait EntityStore: Send + Sync {
    // Boards

    async fn find_board(&self, id: &BoardId, owner: &UserId) -> Result<Option<Board>>;

    /// Boards of `owner`, oldest first
    async fn list_boards(&self, owner: &UserId) -> Result<Vec<Board>>;

    /// Insert, or replace name/color of an existing owned board.
    /// A board id owned by someone else is `NotFound`.
    async fn upsert_board(&self, board: Board) -> Result<Board>;

    /// Rename an owned board; `NotFound` otherwise
    async fn rename_board(&self, id: &BoardId, owner: &UserId, name: &str) -> Result<Board>;

    /// Delete an owned board with its columns and items. `None` when there
    /// was nothing to delete.
    async fn delete_board(&self, id: &BoardId, owner: &UserId) -> Result<Option<Removed>>;

    // Columns

    async fn find_column(&self, id: &ColumnId, owner: &UserId) -> Result<Option<Column>>;

    /// Columns of a board ordered by `order`
    async fn list_columns(&self, board: &BoardId, owner: &UserId) -> Result<Vec<Column>>;

    /// Insert a new column after the existing ones of an owned board. The
    /// order is the board's column count plus one, counted in the same unit
    /// as the insert. Duplicate ids are rejected.
    async fn append_column(
        &self,
        board: &BoardId,
        id: ColumnId,
        name: &str,
        owner: &UserId,
    ) -> Result<Column>;

    async fn rename_column(&self, id: &ColumnId, owner: &UserId, name: &str) -> Result<Column>;

    /// Delete an owned column and its items. `None` when there was nothing
    /// to delete.
    async fn delete_column(&self, id: &ColumnId, owner: &UserId) -> Result<Option<Removed>>;

    // Items

    async fn find_item(&self, id: &ItemId, owner: &UserId) -> Result<Option<Item>>;

    /// Items of a board ordered by column, then `order`
    async fn list_items(&self, board: &BoardId, owner: &UserId) -> Result<Vec<Item>>;

    /// Create or overwrite an item. The target column must be owned; an
    /// existing item under another owner is `NotFound`.
    async fn upsert_item(&self, upsert: ItemUpsert, owner: &UserId) -> Result<Item>;

    /// Delete an owned item; `false` when there was nothing to delete
    async fn delete_item(&self, id: &ItemId, owner: &UserId) -> Result<bool>;

    // Activity

    async fn append_activity(&self, entry: LogEntry) -> Result<()>;

    /// Activity entries, newest first
    async fn read_activity(&self, limit: Option<usize>) -> Result<Vec<LogEntry>>;
}
