//! In-memory entity store
//!
//! One `RwLock` over all tables; every trait call takes the lock once, which
//! is what makes cascades atomic.

use super::{EntityStore, Removed};
use crate::config::{KanbanConfig, DEFAULT_ACTIVITY_LIMIT};
use crate::error::{KanbanError, Result};
use crate::types::{Board, BoardId, Column, ColumnId, Item, ItemId, ItemUpsert, UserId};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use tokio::sync::RwLock;
use tracing::debug;
use trellis_operations::LogEntry;

#[derive(Default)]
struct Tables {
    boards: HashMap<BoardId, Board>,
    columns: HashMap<ColumnId, Column>,
    items: HashMap<ItemId, Item>,
    /// Oldest first
    activity: VecDeque<LogEntry>,
}

impl Tables {
    fn owned_board(&self, id: &BoardId, owner: &UserId) -> Option<&Board> {
        self.boards.get(id).filter(|b| b.is_owned_by(owner))
    }

    fn owned_column(&self, id: &ColumnId, owner: &UserId) -> Option<&Column> {
        self.columns
            .get(id)
            .filter(|c| self.owned_board(&c.board_id, owner).is_some())
    }

    fn owned_item(&self, id: &ItemId, owner: &UserId) -> Option<&Item> {
        self.items
            .get(id)
            .filter(|i| self.owned_board(&i.board_id, owner).is_some())
    }
}

/// Store backed by process memory. Cheap to create, used by tests and by
/// embedders that persist elsewhere.
pub struct MemoryStore {
    tables: RwLock<Tables>,
    activity_limit: Option<usize>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            tables: RwLock::default(),
            activity_limit: Some(DEFAULT_ACTIVITY_LIMIT),
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store sized by `config`
    pub fn from_config(config: &KanbanConfig) -> Self {
        Self::new().with_activity_limit(config.activity_limit)
    }

    /// Keep at most `limit` activity entries, dropping the oldest
    pub fn with_activity_limit(mut self, limit: Option<usize>) -> Self {
        self.activity_limit = limit;
        self
    }

    /// Total number of items across every board, regardless of owner
    pub async fn item_count(&self) -> usize {
        self.tables.read().await.items.len()
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn find_board(&self, id: &BoardId, owner: &UserId) -> Result<Option<Board>> {
        Ok(self.tables.read().await.owned_board(id, owner).cloned())
    }

    async fn list_boards(&self, owner: &UserId) -> Result<Vec<Board>> {
        let tables = self.tables.read().await;
        let mut boards: Vec<Board> = tables
            .boards
            .values()
            .filter(|b| b.is_owned_by(owner))
            .cloned()
            .collect();
        boards.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(boards)
    }

    async fn upsert_board(&self, board: Board) -> Result<Board> {
        let mut tables = self.tables.write().await;
        match tables.boards.get_mut(&board.id) {
            Some(existing) if existing.is_owned_by(&board.owner_user_id) => {
                existing.name = board.name;
                existing.color = board.color;
                Ok(existing.clone())
            }
            Some(_) => Err(KanbanError::not_found("board", &board.id)),
            None => {
                tables.boards.insert(board.id.clone(), board.clone());
                Ok(board)
            }
        }
    }

    async fn rename_board(&self, id: &BoardId, owner: &UserId, name: &str) -> Result<Board> {
        let mut tables = self.tables.write().await;
        match tables.boards.get_mut(id) {
            Some(board) if board.is_owned_by(owner) => {
                board.name = name.to_string();
                Ok(board.clone())
            }
            _ => Err(KanbanError::not_found("board", id)),
        }
    }

    async fn delete_board(&self, id: &BoardId, owner: &UserId) -> Result<Option<Removed>> {
        let mut tables = self.tables.write().await;
        if tables.owned_board(id, owner).is_none() {
            return Ok(None);
        }

        tables.boards.remove(id);
        let columns_before = tables.columns.len();
        tables.columns.retain(|_, c| &c.board_id != id);
        let items_before = tables.items.len();
        tables.items.retain(|_, i| &i.board_id != id);

        let removed = Removed {
            columns: columns_before - tables.columns.len(),
            items: items_before - tables.items.len(),
        };
        debug!(board = %id, ?removed, "Deleted board");
        Ok(Some(removed))
    }

    async fn find_column(&self, id: &ColumnId, owner: &UserId) -> Result<Option<Column>> {
        Ok(self.tables.read().await.owned_column(id, owner).cloned())
    }

    async fn list_columns(&self, board: &BoardId, owner: &UserId) -> Result<Vec<Column>> {
        let tables = self.tables.read().await;
        if tables.owned_board(board, owner).is_none() {
            return Ok(Vec::new());
        }
        let mut columns: Vec<Column> = tables
            .columns
            .values()
            .filter(|c| &c.board_id == board)
            .cloned()
            .collect();
        columns.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
        Ok(columns)
    }

    async fn append_column(
        &self,
        board: &BoardId,
        id: ColumnId,
        name: &str,
        owner: &UserId,
    ) -> Result<Column> {
        let mut tables = self.tables.write().await;
        if tables.owned_board(board, owner).is_none() {
            return Err(KanbanError::not_found("board", board));
        }
        if tables.columns.contains_key(&id) {
            return Err(KanbanError::invalid_field(
                "id",
                format!("column id {id} already exists"),
            ));
        }

        let count = tables.columns.values().filter(|c| &c.board_id == board).count();
        let column = Column {
            id,
            board_id: board.clone(),
            name: name.to_string(),
            order: count as u32 + 1,
        };
        tables.columns.insert(column.id.clone(), column.clone());
        Ok(column)
    }

    async fn rename_column(&self, id: &ColumnId, owner: &UserId, name: &str) -> Result<Column> {
        let mut tables = self.tables.write().await;
        if tables.owned_column(id, owner).is_none() {
            return Err(KanbanError::not_found("column", id));
        }
        let column = tables
            .columns
            .get_mut(id)
            .ok_or_else(|| KanbanError::not_found("column", id))?;
        column.name = name.to_string();
        Ok(column.clone())
    }

    async fn delete_column(&self, id: &ColumnId, owner: &UserId) -> Result<Option<Removed>> {
        let mut tables = self.tables.write().await;
        if tables.owned_column(id, owner).is_none() {
            return Ok(None);
        }

        tables.columns.remove(id);
        let items_before = tables.items.len();
        tables.items.retain(|_, i| &i.column_id != id);

        Ok(Some(Removed {
            columns: 1,
            items: items_before - tables.items.len(),
        }))
    }

    async fn find_item(&self, id: &ItemId, owner: &UserId) -> Result<Option<Item>> {
        Ok(self.tables.read().await.owned_item(id, owner).cloned())
    }

    async fn list_items(&self, board: &BoardId, owner: &UserId) -> Result<Vec<Item>> {
        let tables = self.tables.read().await;
        if tables.owned_board(board, owner).is_none() {
            return Ok(Vec::new());
        }
        let mut items: Vec<Item> = tables
            .items
            .values()
            .filter(|i| &i.board_id == board)
            .cloned()
            .collect();
        items.sort_by(|a, b| {
            a.column_id
                .cmp(&b.column_id)
                .then_with(|| a.order.total_cmp(&b.order))
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(items)
    }

    async fn upsert_item(&self, upsert: ItemUpsert, owner: &UserId) -> Result<Item> {
        let mut tables = self.tables.write().await;

        let board_id = tables
            .owned_column(&upsert.column_id, owner)
            .map(|c| c.board_id.clone())
            .ok_or_else(|| KanbanError::not_found("column", &upsert.column_id))?;

        let existing = match tables.items.get(&upsert.id) {
            Some(item) if tables.owned_board(&item.board_id, owner).is_none() => {
                return Err(KanbanError::not_found("item", &upsert.id));
            }
            other => other,
        };

        let item = upsert.apply(existing, board_id);
        tables.items.insert(item.id.clone(), item.clone());
        Ok(item)
    }

    async fn delete_item(&self, id: &ItemId, owner: &UserId) -> Result<bool> {
        let mut tables = self.tables.write().await;
        if tables.owned_item(id, owner).is_none() {
            return Ok(false);
        }
        Ok(tables.items.remove(id).is_some())
    }

    async fn append_activity(&self, entry: LogEntry) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables.activity.push_back(entry);
        if let Some(limit) = self.activity_limit {
            while tables.activity.len() > limit {
                tables.activity.pop_front();
            }
        }
        Ok(())
    }

    async fn read_activity(&self, limit: Option<usize>) -> Result<Vec<LogEntry>> {
        let tables = self.tables.read().await;
        let newest_first = tables.activity.iter().rev().cloned();
        Ok(match limit {
            Some(limit) => newest_first.take(limit).collect(),
            None => newest_first.collect(),
        })
    }
}
