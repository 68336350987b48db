//! Core types for the board engine

mod ack;
mod board;
mod ids;

// Re-export all types
pub use ack::MutationAck;
pub use board::{Board, BoardData, Column, Item, ItemUpsert, DEFAULT_BOARD_COLOR};
pub use ids::{BoardId, ColumnId, ItemId, UserId};
