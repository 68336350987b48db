//! Shared fixtures for command tests

use crate::context::KanbanContext;
use crate::store::{EntityStore, MemoryStore};
use crate::types::{Board, BoardId, Column, ColumnId, UserId};
use std::sync::Arc;

pub fn alice() -> UserId {
    UserId::from("alice")
}

pub fn bob() -> UserId {
    UserId::from("bob")
}

/// A store holding board `b1` ("Sprint 1", owned by alice) with column
/// `todo` ("Todo", order 1)
pub struct Fixture {
    pub store: Arc<MemoryStore>,
    pub ctx: KanbanContext,
    pub board: Board,
    pub column: Column,
}

impl Fixture {
    pub fn ctx_for(&self, user: UserId) -> KanbanContext {
        KanbanContext::new(self.store.clone(), user)
    }
}

pub async fn setup() -> Fixture {
    let store = Arc::new(MemoryStore::new());
    let board = store
        .upsert_board(Board::new(alice(), "Sprint 1").with_id(BoardId::from("b1")))
        .await
        .unwrap();
    let column = store
        .append_column(&board.id, ColumnId::from("todo"), "Todo", &alice())
        .await
        .unwrap();
    let ctx = KanbanContext::new(store.clone(), alice());
    Fixture {
        store,
        ctx,
        board,
        column,
    }
}
