//! Board commands

mod delete;
mod get;
mod list;
mod update;
mod upsert;

pub use delete::DeleteBoard;
pub use get::GetBoard;
pub use list::ListBoards;
pub use update::UpdateBoardName;
pub use upsert::UpsertBoard;
