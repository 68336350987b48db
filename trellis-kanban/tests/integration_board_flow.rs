//! End-to-end board flows through the dispatcher and the coordinator

use std::sync::Arc;
use tokio_test::{assert_err, assert_ok};
use trellis_kanban::{
    board::{DeleteBoard, UpdateBoardName, UpsertBoard},
    column::{CreateColumn, DeleteColumn, UpdateColumn},
    coordinator::{DispatcherTransport, Transport},
    item::{DeleteCard, UpsertItem},
    test_support::{alice, bob},
    BoardData, BoardId, ColumnId, Command, ConcurrencyCoordinator, ErrorKind, KanbanError,
    MemoryStore, MutationAck, MutationDispatcher, Outcome, Placement, Result,
};

async fn sprint_board(dispatcher: &MutationDispatcher) -> BoardId {
    dispatcher
        .upsert_board(&UpsertBoard::new("Sprint 1"), &alice())
        .await
        .unwrap()
        .id
}

#[test_log::test(tokio::test)]
async fn test_sprint_walkthrough() {
    let dispatcher = MutationDispatcher::new(Arc::new(MemoryStore::new()));
    let board = sprint_board(&dispatcher).await;

    let todo = dispatcher
        .dispatch(&Command::CreateColumn(CreateColumn::new("todo", "Todo", board.clone())), &alice())
        .await
        .unwrap();
    assert_eq!(todo.order, Some(1.0));

    let item = dispatcher
        .dispatch(&Command::CreateItem(UpsertItem::new("spec", "todo", 1.0, "Write spec")), &alice())
        .await
        .unwrap();
    assert_eq!(item.order, Some(1.0));

    dispatcher
        .dispatch(&Command::CreateColumn(CreateColumn::new("doing", "Doing", board.clone())), &alice())
        .await
        .unwrap();
    dispatcher
        .dispatch(&Command::MoveItem(UpsertItem::new("spec", "doing", 1.0, "Write spec")), &alice())
        .await
        .unwrap();

    let data = dispatcher.load_board(&board, &alice()).await.unwrap();
    assert_eq!(data.items_in(&ColumnId::from("todo")).count(), 0);
    let doing_col = ColumnId::from("doing");
    let doing: Vec<_> = data.items_in(&doing_col).collect();
    assert_eq!(doing.len(), 1);
    assert_eq!(doing[0].order, 1.0);
    assert_eq!(doing[0].title, "Write spec");
}

#[tokio::test]
async fn test_fourth_column_gets_order_four() {
    let dispatcher = MutationDispatcher::new(Arc::new(MemoryStore::new()));
    let board = sprint_board(&dispatcher).await;

    for name in ["A", "B", "C"] {
        dispatcher
            .dispatch(&Command::CreateColumn(CreateColumn::new(name, name, board.clone())), &alice())
            .await
            .unwrap();
    }
    let ack = dispatcher
        .dispatch(&Command::CreateColumn(CreateColumn::new("D", "D", board.clone())), &alice())
        .await
        .unwrap();

    assert_eq!(ack.order, Some(4.0));
}

#[tokio::test]
async fn test_non_owner_commands_change_nothing() {
    let store = Arc::new(MemoryStore::new());
    let dispatcher = MutationDispatcher::new(store.clone());
    let board = sprint_board(&dispatcher).await;
    dispatcher
        .dispatch(&Command::CreateColumn(CreateColumn::new("todo", "Todo", board.clone())), &alice())
        .await
        .unwrap();
    dispatcher
        .dispatch(&Command::CreateItem(UpsertItem::new("i1", "todo", 1.0, "Card")), &alice())
        .await
        .unwrap();
    let before = dispatcher.load_board(&board, &alice()).await.unwrap();

    let attempts = [
        Command::MoveItem(UpsertItem::new("i1", "todo", 5.0, "Card")),
        Command::UpdateBoardName(UpdateBoardName::new("Taken").with_board(board.clone())),
        Command::CreateColumn(CreateColumn::new("evil", "Evil", board.clone())),
        Command::UpdateColumn(UpdateColumn::new("todo", "Mine")),
        Command::DeleteBoard(DeleteBoard::new(board.clone())),
    ];
    for command in &attempts {
        let err = assert_err!(dispatcher.dispatch(command, &bob()).await);
        assert_eq!(err.kind(), ErrorKind::NotFound, "{command:?}");
    }

    // Deletes of invisible targets are quiet no-ops
    assert_ok!(dispatcher.dispatch(&Command::DeleteCard(DeleteCard::new("i1")), &bob()).await);
    assert_ok!(dispatcher.dispatch(&Command::DeleteColumn(DeleteColumn::new("todo")), &bob()).await);

    assert_eq!(dispatcher.load_board(&board, &alice()).await.unwrap(), before);
}

#[tokio::test]
async fn test_column_delete_cascades() {
    let store = Arc::new(MemoryStore::new());
    let dispatcher = MutationDispatcher::new(store.clone());
    let board = sprint_board(&dispatcher).await;
    for column in ["todo", "done"] {
        dispatcher
            .dispatch(&Command::CreateColumn(CreateColumn::new(column, column, board.clone())), &alice())
            .await
            .unwrap();
    }
    for (id, column, order) in [("a", "todo", 1.0), ("b", "todo", 2.0), ("c", "done", 1.0)] {
        dispatcher
            .dispatch(&Command::CreateItem(UpsertItem::new(id, column, order, id)), &alice())
            .await
            .unwrap();
    }

    let ack = dispatcher
        .dispatch(&Command::DeleteColumn(DeleteColumn::new("todo")), &alice())
        .await
        .unwrap();
    assert_eq!(ack.removed_items, Some(2));

    let data = dispatcher.load_board(&board, &alice()).await.unwrap();
    assert_eq!(data.columns.len(), 1);
    assert_eq!(data.items.len(), 1);
    assert_eq!(data.items[0].id.as_str(), "c");
}

#[tokio::test]
async fn test_repeated_upsert_is_idempotent() {
    let dispatcher = MutationDispatcher::new(Arc::new(MemoryStore::new()));
    let board = sprint_board(&dispatcher).await;
    dispatcher
        .dispatch(&Command::CreateColumn(CreateColumn::new("todo", "Todo", board.clone())), &alice())
        .await
        .unwrap();

    let command = Command::MoveItem(UpsertItem::new("i1", "todo", 1.25, "Card"));
    dispatcher.dispatch(&command, &alice()).await.unwrap();
    let once = dispatcher.load_board(&board, &alice()).await.unwrap();
    dispatcher.dispatch(&command, &alice()).await.unwrap();
    let twice = dispatcher.load_board(&board, &alice()).await.unwrap();

    assert_eq!(once, twice);
}

/// Holds the first request back before it reaches the server. Later
/// requests go straight through, or fail when `fail_later` is set.
struct SlowFirstTransport {
    inner: DispatcherTransport,
    sends: std::sync::atomic::AtomicUsize,
    fail_later: bool,
}

impl SlowFirstTransport {
    fn new(inner: DispatcherTransport, fail_later: bool) -> Self {
        Self {
            inner,
            sends: Default::default(),
            fail_later,
        }
    }

    async fn wait_for_first_send(&self) {
        while self.sends.load(std::sync::atomic::Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait::async_trait]
impl Transport for SlowFirstTransport {
    async fn send(&self, command: Command) -> Result<MutationAck> {
        let n = self.sends.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if n == 0 {
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        } else if self.fail_later {
            return Err(KanbanError::transport("connection reset"));
        }
        self.inner.send(command).await
    }

    async fn load_board(&self, board: &BoardId) -> Result<BoardData> {
        self.inner.load_board(board).await
    }
}

#[test_log::test(tokio::test)]
async fn test_coordinator_keeps_only_the_last_move() {
    let dispatcher = MutationDispatcher::new(Arc::new(MemoryStore::new()));
    let board = sprint_board(&dispatcher).await;
    for column in ["todo", "doing", "done"] {
        dispatcher
            .dispatch(&Command::CreateColumn(CreateColumn::new(column, column, board.clone())), &alice())
            .await
            .unwrap();
    }
    dispatcher
        .dispatch(&Command::CreateItem(UpsertItem::new("card", "todo", 1.0, "Card")), &alice())
        .await
        .unwrap();

    let transport = Arc::new(SlowFirstTransport::new(
        DispatcherTransport::new(dispatcher.clone(), alice(), board.clone()),
        false,
    ));
    let data = dispatcher.load_board(&board, &alice()).await.unwrap();
    let coordinator = ConcurrencyCoordinator::new(transport.clone(), data);
    let card = "card".into();

    let first = coordinator
        .move_card(&card, &ColumnId::from("doing"), Placement::EmptyColumn)
        .unwrap();
    transport.wait_for_first_send().await;
    let second = coordinator
        .move_card(&card, &ColumnId::from("done"), Placement::EmptyColumn)
        .unwrap();

    let second = second.await.unwrap();
    let first = first.await.unwrap();
    assert!(matches!(second, Outcome::Confirmed(_)));
    assert_eq!(first, Outcome::Superseded);

    let view = coordinator.view();
    assert!(view.items_in(&ColumnId::from("doing")).is_empty());
    assert_eq!(view.items_in(&ColumnId::from("done")).len(), 1);

    // The server ends up with the second placement too
    let stored = dispatcher.load_board(&board, &alice()).await.unwrap();
    assert_eq!(stored.items.len(), 1);
    assert_eq!(stored.items[0].column_id, ColumnId::from("done"));
    assert!(coordinator.failures().is_empty());
}

#[test_log::test(tokio::test)]
async fn test_coordinator_revert_matches_server_after_partial_success() {
    let dispatcher = MutationDispatcher::new(Arc::new(MemoryStore::new()));
    let board = sprint_board(&dispatcher).await;
    for column in ["todo", "doing", "done"] {
        dispatcher
            .dispatch(&Command::CreateColumn(CreateColumn::new(column, column, board.clone())), &alice())
            .await
            .unwrap();
    }
    dispatcher
        .dispatch(&Command::CreateItem(UpsertItem::new("card", "todo", 1.0, "Card")), &alice())
        .await
        .unwrap();

    let transport = Arc::new(SlowFirstTransport::new(
        DispatcherTransport::new(dispatcher.clone(), alice(), board.clone()),
        true,
    ));
    let data = dispatcher.load_board(&board, &alice()).await.unwrap();
    let coordinator = ConcurrencyCoordinator::new(transport.clone(), data);
    let card = "card".into();

    let first = coordinator
        .move_card(&card, &ColumnId::from("doing"), Placement::EmptyColumn)
        .unwrap();
    transport.wait_for_first_send().await;
    let second = coordinator
        .move_card(&card, &ColumnId::from("done"), Placement::EmptyColumn)
        .unwrap();

    assert_eq!(first.await.unwrap(), Outcome::Superseded);
    assert!(matches!(second.await.unwrap(), Outcome::Reverted(_)));

    let stored = dispatcher.load_board(&board, &alice()).await.unwrap();
    assert_eq!(stored.items[0].column_id, ColumnId::from("doing"));
    let view = coordinator.view();
    assert_eq!(view.item(&card).unwrap().column_id, ColumnId::from("doing"));
    assert_eq!(coordinator.failures().len(), 1);
}

#[tokio::test]
async fn test_coordinator_reverts_rejected_rename() {
    let dispatcher = MutationDispatcher::new(Arc::new(MemoryStore::new()));
    let board = sprint_board(&dispatcher).await;
    let data = dispatcher.load_board(&board, &alice()).await.unwrap();
    let coordinator = ConcurrencyCoordinator::new(
        Arc::new(DispatcherTransport::new(dispatcher.clone(), alice(), board.clone())),
        data,
    );

    let outcome = coordinator
        .submit_command(Command::UpdateBoardName(UpdateBoardName::new("x".repeat(101))))
        .await
        .unwrap();

    let Outcome::Reverted(notice) = outcome else {
        panic!("expected a revert, got {outcome:?}");
    };
    assert_eq!(notice.kind, ErrorKind::ValidationFailed);
    assert_eq!(notice.key.to_string(), format!("board:{board}"));
    assert_eq!(coordinator.view().board().unwrap().name, "Sprint 1");
}

#[tokio::test]
async fn test_coordinator_create_then_move_coalesces() {
    let dispatcher = MutationDispatcher::new(Arc::new(MemoryStore::new()));
    let board = sprint_board(&dispatcher).await;
    let data = dispatcher.load_board(&board, &alice()).await.unwrap();
    let coordinator = ConcurrencyCoordinator::new(
        Arc::new(DispatcherTransport::new(dispatcher.clone(), alice(), board.clone())),
        data,
    );

    let (todo, created) = coordinator.add_column("Todo");
    assert!(matches!(created.await.unwrap(), Outcome::Confirmed(_)));
    let (card, added) = coordinator.add_card(&todo, "Card");
    let moved = coordinator.move_card(&card, &todo, Placement::End).unwrap();

    let added = added.await.unwrap();
    let moved = moved.await.unwrap();
    assert!(matches!(moved, Outcome::Confirmed(_)));
    assert!(matches!(added, Outcome::Superseded | Outcome::Confirmed(_)));

    let stored = dispatcher.load_board(&board, &alice()).await.unwrap();
    assert_eq!(stored.items.len(), 1);
    assert_eq!(stored.items[0].id, card);
}

#[tokio::test]
async fn test_transport_errors_are_reported_not_retried() {
    struct Offline;

    #[async_trait::async_trait]
    impl Transport for Offline {
        async fn send(&self, _command: Command) -> Result<MutationAck> {
            Err(KanbanError::transport("offline"))
        }

        async fn load_board(&self, board: &BoardId) -> Result<BoardData> {
            Err(KanbanError::not_found("board", board))
        }
    }

    let dispatcher = MutationDispatcher::new(Arc::new(MemoryStore::new()));
    let board = sprint_board(&dispatcher).await;
    let data = dispatcher.load_board(&board, &alice()).await.unwrap();
    let coordinator = ConcurrencyCoordinator::new(Arc::new(Offline), data);

    let (_column, handle) = coordinator.add_column("Todo");
    assert!(matches!(handle.await.unwrap(), Outcome::Reverted(_)));
    assert!(coordinator.view().columns().is_empty());
    assert_eq!(coordinator.failures().len(), 1);
    assert!(coordinator.refresh().await.is_err());
}
