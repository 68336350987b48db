//! Coalescing keys

use crate::dispatch::Command;
use crate::types::{BoardId, ColumnId, ItemId};
use std::fmt;

/// Identifies the one entity a command targets. Commands with the same key
/// supersede each other; different keys never interact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityKey {
    Card(ItemId),
    Column(ColumnId),
    Board(BoardId),
}

impl EntityKey {
    /// Key for `command` issued from the view of `board`
    pub fn for_command(command: &Command, board: &BoardId) -> Self {
        match command {
            Command::CreateItem(cmd) | Command::MoveItem(cmd) => Self::Card(cmd.id.clone()),
            Command::DeleteCard(cmd) => Self::Card(cmd.item_id.clone()),
            Command::CreateColumn(cmd) => Self::Column(cmd.id.clone()),
            Command::UpdateColumn(cmd) => Self::Column(cmd.column_id.clone()),
            Command::DeleteColumn(cmd) => Self::Column(cmd.column_id.clone()),
            Command::UpdateBoardName(cmd) => {
                Self::Board(cmd.board_id.clone().unwrap_or_else(|| board.clone()))
            }
            Command::DeleteBoard(cmd) => Self::Board(cmd.board_id.clone()),
        }
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Card(id) => write!(f, "card:{id}"),
            Self::Column(id) => write!(f, "column:{id}"),
            Self::Board(id) => write!(f, "board:{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::UpdateBoardName;
    use crate::item::{DeleteCard, UpsertItem};

    #[test]
    fn test_create_move_and_delete_share_the_card_key() {
        let board = BoardId::from("b1");
        let create = Command::CreateItem(UpsertItem::new("i1", "todo", 1.0, "Card"));
        let delete = Command::DeleteCard(DeleteCard::new("i1"));

        assert_eq!(EntityKey::for_command(&create, &board), EntityKey::for_command(&delete, &board));
        assert_eq!(EntityKey::for_command(&create, &board).to_string(), "card:i1");
    }

    #[test]
    fn test_board_rename_defaults_to_view() {
        let key = EntityKey::for_command(
            &Command::UpdateBoardName(UpdateBoardName::new("S2")),
            &BoardId::from("b7"),
        );
        assert_eq!(key.to_string(), "board:b7");
    }
}
