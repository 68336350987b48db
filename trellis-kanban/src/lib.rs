//! Board engine for drag-and-drop kanban boards
//!
//! Boards hold ordered columns; columns hold ordered items (cards). The
//! crate covers both ends of a board mutation:
//!
//! - **Ordering** - fractional `f64` sort keys, so a drag places one card
//!   between its neighbours without renumbering the column
//! - **Dispatch** - a closed set of intent-tagged commands, validated,
//!   owner-scoped and applied against an [`EntityStore`]
//! - **Coordination** - the client side: optimistic updates of a
//!   [`BoardView`], with per-entity generation counters so only the latest
//!   command for a card, column or board is ever observed
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use trellis_kanban::{
//!     board::UpsertBoard, column::CreateColumn, dispatch::Command, item::UpsertItem,
//!     MemoryStore, MutationDispatcher, UserId,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let dispatcher = MutationDispatcher::new(Arc::new(MemoryStore::new()));
//! let user = UserId::from("alice");
//!
//! let board = dispatcher.upsert_board(&UpsertBoard::new("Sprint 1"), &user).await?;
//! dispatcher
//!     .dispatch(&Command::CreateColumn(CreateColumn::new("todo", "Todo", board.id.clone())), &user)
//!     .await?;
//! let ack = dispatcher
//!     .dispatch(&Command::CreateItem(UpsertItem::new("i1", "todo", 1.0, "Write spec")), &user)
//!     .await?;
//! println!("created {} at {:?}", ack.id, ack.order);
//! # Ok(())
//! # }
//! ```
//!
//! The acting user is always supplied by the caller's auth layer and is
//! trusted; an entity owned by someone else behaves as if it did not exist.

pub mod config;
mod context;
mod error;
pub mod ordering;
pub mod parse;
mod processor;
pub mod store;
pub mod types;
mod validate;

// Command modules
pub mod board;
pub mod column;
pub mod item;

pub mod coordinator;
pub mod dispatch;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

// Re-export Execute trait and types from operations crate
pub use trellis_operations::{
    async_trait, Execute, ExecutionResult, LogEntry, Operation, OperationProcessor,
};

pub use config::KanbanConfig;
pub use context::KanbanContext;
pub use coordinator::{BoardView, ConcurrencyCoordinator, EntityKey, Outcome, Placement};
pub use dispatch::{Command, Intent, MutationDispatcher, MutationResponse};
pub use error::{ErrorKind, FieldError, KanbanError, Result};
pub use ordering::{compute_insert_order, DropZone};
pub use processor::KanbanOperationProcessor;
pub use store::{EntityStore, MemoryStore};

// Re-export commonly used types
pub use types::{
    Board, BoardData, BoardId, Column, ColumnId, Item, ItemId, MutationAck, UserId,
};
