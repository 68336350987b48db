//! Item (card) commands

mod delete;
mod upsert;

pub use delete::DeleteCard;
pub use upsert::UpsertItem;
