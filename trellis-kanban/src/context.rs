//! KanbanContext - what every command receives
//!
//! The context provides access to storage, the acting user and the board
//! view the request came from. No business logic lives here; commands do all
//! the work.

use crate::config::KanbanConfig;
use crate::error::{KanbanError, Result};
use crate::store::EntityStore;
use crate::types::{BoardId, UserId};
use std::sync::Arc;

/// Context passed to every command - provides access, not logic
#[derive(Clone)]
pub struct KanbanContext {
    store: Arc<dyn EntityStore>,
    user: UserId,
    /// Board the request was made from, when it came from a board view
    board: Option<BoardId>,
    config: Arc<KanbanConfig>,
}

impl KanbanContext {
    /// Create a context for `user` with default configuration
    pub fn new(store: Arc<dyn EntityStore>, user: UserId) -> Self {
        Self {
            store,
            user,
            board: None,
            config: Arc::new(KanbanConfig::default()),
        }
    }

    /// Scope the context to a board view
    pub fn in_board(mut self, board: BoardId) -> Self {
        self.board = Some(board);
        self
    }

    pub fn with_config(mut self, config: Arc<KanbanConfig>) -> Self {
        self.config = config;
        self
    }

    pub fn store(&self) -> &dyn EntityStore {
        self.store.as_ref()
    }

    /// The acting user. Trusted: authentication happened upstream.
    pub fn user(&self) -> &UserId {
        &self.user
    }

    pub fn route_board(&self) -> Option<&BoardId> {
        self.board.as_ref()
    }

    pub fn config(&self) -> &KanbanConfig {
        &self.config
    }

    /// Pick the explicit board id if given, else the board view's id
    pub fn resolve_board<'a>(&'a self, explicit: Option<&'a BoardId>) -> Result<&'a BoardId> {
        explicit
            .or(self.board.as_ref())
            .ok_or_else(|| KanbanError::malformed("missing required field: boardId"))
    }
}
