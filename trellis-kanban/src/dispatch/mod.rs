//! Mutation dispatcher
//!
//! Receives one tagged command plus the trusted acting user, runs it through
//! the operation processor (which validates, authorizes by owner scope and
//! records activity) and answers with a `MutationAck`. Holds no state between
//! calls.

mod command;
mod response;

pub use command::{Command, Intent};
pub use response::{ErrorBody, MutationResponse};

use crate::board::{GetBoard, ListBoards, UpsertBoard};
use crate::config::KanbanConfig;
use crate::context::KanbanContext;
use crate::error::Result;
use crate::parse::parse_command_in;
use crate::processor::KanbanOperationProcessor;
use crate::store::EntityStore;
use crate::types::{Board, BoardData, BoardId, MutationAck, UserId};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};
use trellis_operations::{LogEntry, OperationProcessor};

/// Applies commands against a shared entity store
#[derive(Clone)]
pub struct MutationDispatcher {
    store: Arc<dyn EntityStore>,
    config: Arc<KanbanConfig>,
}

impl MutationDispatcher {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self {
            store,
            config: Arc::new(KanbanConfig::default()),
        }
    }

    pub fn with_config(mut self, config: KanbanConfig) -> Self {
        self.config = Arc::new(config);
        self
    }

    pub fn store(&self) -> &Arc<dyn EntityStore> {
        &self.store
    }

    fn context(&self, user: &UserId, board: Option<&BoardId>) -> KanbanContext {
        let ctx = KanbanContext::new(self.store.clone(), user.clone()).with_config(self.config.clone());
        match board {
            Some(board) => ctx.in_board(board.clone()),
            None => ctx,
        }
    }

    /// Apply `command` on behalf of `user`
    pub async fn dispatch(&self, command: &Command, user: &UserId) -> Result<MutationAck> {
        self.run(command, self.context(user, None)).await
    }

    /// Apply `command` from within the board view of `board`
    pub async fn dispatch_in_board(
        &self,
        command: &Command,
        user: &UserId,
        board: &BoardId,
    ) -> Result<MutationAck> {
        self.run(command, self.context(user, Some(board))).await
    }

    async fn run(&self, command: &Command, ctx: KanbanContext) -> Result<MutationAck> {
        let intent = command.intent();
        debug!(%intent, user = %ctx.user(), "Dispatching");

        let processor = KanbanOperationProcessor::new();
        let result = match command {
            Command::CreateItem(cmd) | Command::MoveItem(cmd) => processor.process(cmd, &ctx).await,
            Command::DeleteCard(cmd) => processor.process(cmd, &ctx).await,
            Command::UpdateBoardName(cmd) => processor.process(cmd, &ctx).await,
            Command::CreateColumn(cmd) => processor.process(cmd, &ctx).await,
            Command::UpdateColumn(cmd) => processor.process(cmd, &ctx).await,
            Command::DeleteColumn(cmd) => processor.process(cmd, &ctx).await,
            Command::DeleteBoard(cmd) => processor.process(cmd, &ctx).await,
        };

        match result {
            Ok(value) => {
                let mut ack: MutationAck = serde_json::from_value(value)?;
                ack.intent = intent.as_str().to_string();
                info!(%intent, id = %ack.id, "Mutation applied");
                Ok(ack)
            }
            Err(error) => {
                warn!(%intent, %error, "Mutation rejected");
                Err(error)
            }
        }
    }

    /// Parse and apply a raw payload, reporting the outcome as a structured
    /// response rather than an error
    pub async fn handle(
        &self,
        payload: Value,
        user: &UserId,
        board: Option<&BoardId>,
    ) -> MutationResponse {
        let result = match parse_command_in(payload, board) {
            Ok(command) => match board {
                Some(board) => self.dispatch_in_board(&command, user, board).await,
                None => self.dispatch(&command, user).await,
            },
            Err(error) => {
                warn!(%error, "Rejected request payload");
                Err(error)
            }
        };
        MutationResponse::from_result(result)
    }

    /// Load a board for rendering
    pub async fn load_board(&self, board: &BoardId, user: &UserId) -> Result<BoardData> {
        GetBoard::new(board.clone())
            .load(&self.context(user, None))
            .await
    }

    /// The user's boards, oldest first
    pub async fn list_boards(&self, user: &UserId) -> Result<Vec<Board>> {
        let ctx = self.context(user, None);
        let value = KanbanOperationProcessor::new()
            .process(&ListBoards, &ctx)
            .await?;
        Ok(serde_json::from_value(value["boards"].clone())?)
    }

    /// Create or edit a board from the board editor
    pub async fn upsert_board(&self, command: &UpsertBoard, user: &UserId) -> Result<Board> {
        let ctx = self.context(user, None);
        let value = KanbanOperationProcessor::new().process(command, &ctx).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Recorded activity, newest first
    pub async fn activity(&self, limit: Option<usize>) -> Result<Vec<LogEntry>> {
        self.store.read_activity(limit).await
    }
}

impl std::fmt::Debug for MutationDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MutationDispatcher")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{DeleteCard, UpsertItem};
    use crate::store::MemoryStore;
    use crate::test_support::{alice, bob, setup};
    use serde_json::json;

    fn dispatcher(store: Arc<MemoryStore>) -> MutationDispatcher {
        MutationDispatcher::new(store)
    }

    #[tokio::test]
    async fn test_create_and_move_share_the_upsert() {
        let fixture = setup().await;
        let dispatcher = dispatcher(fixture.store.clone());

        let ack = dispatcher
            .dispatch(&Command::CreateItem(UpsertItem::new("i1", "todo", 1.0, "Card")), &alice())
            .await
            .unwrap();
        assert_eq!(ack.intent, "createItem");

        let ack = dispatcher
            .dispatch(&Command::MoveItem(UpsertItem::new("i1", "todo", 0.5, "Card")), &alice())
            .await
            .unwrap();
        assert_eq!(ack.intent, "moveItem");
        assert_eq!(ack.order, Some(0.5));
        assert_eq!(fixture.store.item_count().await, 1);
    }

    #[tokio::test]
    async fn test_non_owner_gets_not_found_and_nothing_changes() {
        let fixture = setup().await;
        let dispatcher = dispatcher(fixture.store.clone());
        dispatcher
            .dispatch(&Command::CreateItem(UpsertItem::new("i1", "todo", 1.0, "Card")), &alice())
            .await
            .unwrap();

        let err = dispatcher
            .dispatch(&Command::MoveItem(UpsertItem::new("i1", "todo", 9.0, "Stolen")), &bob())
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        let data = dispatcher.load_board(&fixture.board.id, &alice()).await.unwrap();
        assert_eq!(data.items[0].order, 1.0);
        assert_eq!(data.items[0].title, "Card");
    }

    #[tokio::test]
    async fn test_handle_reports_unknown_intent() {
        let fixture = setup().await;
        let dispatcher = dispatcher(fixture.store.clone());

        let response = dispatcher
            .handle(json!({ "intent": "archiveBoard" }), &alice(), Some(&fixture.board.id))
            .await;

        assert!(!response.ok);
        let error = response.error.unwrap();
        assert_eq!(error.kind, crate::error::ErrorKind::UnknownIntent);
        assert_eq!(error.status, 400);
    }

    #[tokio::test]
    async fn test_handle_form_payload_in_board_view() {
        let fixture = setup().await;
        let dispatcher = dispatcher(fixture.store.clone());

        let response = dispatcher
            .handle(
                json!({ "intent": "createColumn", "id": "doing", "name": "Doing" }),
                &alice(),
                Some(&fixture.board.id),
            )
            .await;

        assert!(response.ok);
        let ack = response.entity.unwrap();
        assert_eq!(ack.order, Some(2.0));
        assert_eq!(ack.board_id, Some(fixture.board.id.clone()));
    }

    #[tokio::test]
    async fn test_delete_board_needs_explicit_board_id() {
        let fixture = setup().await;
        let dispatcher = dispatcher(fixture.store.clone());

        let response = dispatcher
            .handle(json!({ "intent": "deleteBoard" }), &alice(), Some(&fixture.board.id))
            .await;

        assert!(!response.ok);
        let error = response.error.unwrap();
        assert_eq!(error.kind, crate::error::ErrorKind::MalformedRequest);
        assert_eq!(error.message, "malformed request: missing required field: boardId");
        assert_eq!(dispatcher.list_boards(&alice()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_dispatch_records_activity() {
        let fixture = setup().await;
        let dispatcher = dispatcher(fixture.store.clone());

        dispatcher
            .dispatch(&Command::DeleteCard(DeleteCard::new("ghost")), &alice())
            .await
            .unwrap();

        let entries = dispatcher.activity(None).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].op, "deleteCard item");
        assert_eq!(entries[0].actor.as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn test_board_editor_and_list() {
        let fixture = setup().await;
        let dispatcher = dispatcher(fixture.store.clone());

        let board = dispatcher
            .upsert_board(&UpsertBoard::new("Roadmap").with_color("#123456"), &alice())
            .await
            .unwrap();
        assert_eq!(board.color, "#123456");

        let boards = dispatcher.list_boards(&alice()).await.unwrap();
        let names: Vec<_> = boards.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["Sprint 1", "Roadmap"]);
    }
}
