//! How the coordinator reaches the dispatcher

use crate::dispatch::{Command, MutationDispatcher};
use crate::error::Result;
use crate::types::{BoardData, BoardId, MutationAck, UserId};
use async_trait::async_trait;

/// One request, one answer. Implementations report network-level failures
/// (timeouts, disconnects) as `KanbanError::Transport`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, command: Command) -> Result<MutationAck>;

    /// Fetch authoritative board state
    async fn load_board(&self, board: &BoardId) -> Result<BoardData>;
}

/// Transport to a dispatcher in the same process, acting as a fixed user
/// from the view of a fixed board
#[derive(Debug, Clone)]
pub struct DispatcherTransport {
    dispatcher: MutationDispatcher,
    user: UserId,
    board: BoardId,
}

impl DispatcherTransport {
    pub fn new(dispatcher: MutationDispatcher, user: UserId, board: BoardId) -> Self {
        Self {
            dispatcher,
            user,
            board,
        }
    }
}

#[async_trait]
impl Transport for DispatcherTransport {
    async fn send(&self, command: Command) -> Result<MutationAck> {
        self.dispatcher
            .dispatch_in_board(&command, &self.user, &self.board)
            .await
    }

    async fn load_board(&self, board: &BoardId) -> Result<BoardData> {
        self.dispatcher.load_board(board, &self.user).await
    }
}
