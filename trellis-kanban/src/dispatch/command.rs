//! The closed set of board mutations

use crate::board::{DeleteBoard, UpdateBoardName};
use crate::column::{CreateColumn, DeleteColumn, UpdateColumn};
use crate::error::Result;
use crate::item::{DeleteCard, UpsertItem};
use serde::{Deserialize, Serialize};
use std::fmt;
use trellis_operations::ParamMeta;

/// Intent tags accepted by the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Intent {
    CreateItem,
    MoveItem,
    DeleteCard,
    UpdateBoardName,
    CreateColumn,
    UpdateColumn,
    DeleteColumn,
    DeleteBoard,
}

impl Intent {
    pub const ALL: [Intent; 8] = [
        Intent::CreateItem,
        Intent::MoveItem,
        Intent::DeleteCard,
        Intent::UpdateBoardName,
        Intent::CreateColumn,
        Intent::UpdateColumn,
        Intent::DeleteColumn,
        Intent::DeleteBoard,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::CreateItem => "createItem",
            Intent::MoveItem => "moveItem",
            Intent::DeleteCard => "deleteCard",
            Intent::UpdateBoardName => "updateBoardName",
            Intent::CreateColumn => "createColumn",
            Intent::UpdateColumn => "updateColumn",
            Intent::DeleteColumn => "deleteColumn",
            Intent::DeleteBoard => "deleteBoard",
        }
    }

    /// Look up a wire tag; tags are case-sensitive
    pub fn parse(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|intent| intent.as_str() == tag)
    }

    /// Parameter table of the command behind this intent
    pub fn params(&self) -> &'static [ParamMeta] {
        match self {
            Intent::CreateItem | Intent::MoveItem => &UpsertItem::PARAMS,
            Intent::DeleteCard => &DeleteCard::PARAMS,
            Intent::UpdateBoardName => &UpdateBoardName::PARAMS,
            Intent::CreateColumn => &CreateColumn::PARAMS,
            Intent::UpdateColumn => &UpdateColumn::PARAMS,
            Intent::DeleteColumn => &DeleteColumn::PARAMS,
            Intent::DeleteBoard => &DeleteBoard::PARAMS,
        }
    }

    /// Intents whose board comes from the board view when the payload
    /// leaves `boardId` out. Every other intent must name its board.
    pub fn takes_route_board(&self) -> bool {
        matches!(self, Intent::CreateColumn | Intent::UpdateBoardName)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A mutation request, tagged by `intent` on the wire.
///
/// `createItem` and `moveItem` carry the same payload and run the same
/// upsert; the tag only tells the client which gesture produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "camelCase")]
pub enum Command {
    CreateItem(UpsertItem),
    MoveItem(UpsertItem),
    DeleteCard(DeleteCard),
    UpdateBoardName(UpdateBoardName),
    CreateColumn(CreateColumn),
    UpdateColumn(UpdateColumn),
    DeleteColumn(DeleteColumn),
    DeleteBoard(DeleteBoard),
}

impl Command {
    pub fn intent(&self) -> Intent {
        match self {
            Command::CreateItem(_) => Intent::CreateItem,
            Command::MoveItem(_) => Intent::MoveItem,
            Command::DeleteCard(_) => Intent::DeleteCard,
            Command::UpdateBoardName(_) => Intent::UpdateBoardName,
            Command::CreateColumn(_) => Intent::CreateColumn,
            Command::UpdateColumn(_) => Intent::UpdateColumn,
            Command::DeleteColumn(_) => Intent::DeleteColumn,
            Command::DeleteBoard(_) => Intent::DeleteBoard,
        }
    }

    /// Required-field checks, run before any store access
    pub fn validate(&self) -> Result<()> {
        match self {
            Command::CreateItem(cmd) | Command::MoveItem(cmd) => cmd.validate(),
            Command::DeleteCard(cmd) => cmd.validate(),
            Command::UpdateBoardName(cmd) => cmd.validate(),
            Command::CreateColumn(cmd) => cmd.validate(),
            Command::UpdateColumn(cmd) => cmd.validate(),
            Command::DeleteColumn(cmd) => cmd.validate(),
            Command::DeleteBoard(cmd) => cmd.validate(),
        }
    }
}
