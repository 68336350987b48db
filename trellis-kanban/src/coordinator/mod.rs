//! Concurrency coordinator
//!
//! Client side of the board. Every command is applied to the local
//! `BoardView` immediately and sent in the background. Commands are
//! coalesced per `EntityKey`: each submit bumps the key's generation, and a
//! response is honored only while its generation is still the latest.
//!
//! Each key has a lane that lets one request at a time onto the wire, so the
//! server applies a key's commands in submission order. A command still
//! waiting for the lane when a newer one for the same key arrives is dropped
//! without being sent.
//!
//! A failed command reverts its entity to the last state the server is known
//! to hold: the snapshot taken before the first unconfirmed command, updated
//! by every superseded command the server accepted. A `FailureNotice` is
//! recorded. Nothing is retried.

mod key;
mod transport;
mod view;

pub use key::EntityKey;
pub use transport::{DispatcherTransport, Transport};
pub use view::{BoardView, EntitySnapshot};

use crate::column::CreateColumn;
use crate::dispatch::{Command, Intent};
use crate::error::{ErrorKind, KanbanError, Result};
use crate::item::UpsertItem;
use crate::ordering::{append_order, drop_order, DropZone, EMPTY_COLUMN_ORDER};
use crate::types::{BoardData, ColumnId, ItemId, MutationAck};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// A failed mutation, kept for the UI to show
#[derive(Debug, Clone, PartialEq)]
pub struct FailureNotice {
    pub key: EntityKey,
    pub intent: Intent,
    pub kind: ErrorKind,
    pub message: String,
    pub at: DateTime<Utc>,
}

/// How a submitted command ended, from the client's point of view
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The server accepted it and the view now reflects the answer
    Confirmed(MutationAck),
    /// A newer command for the same key was submitted first; this answer was
    /// ignored
    Superseded,
    /// The server (or the network) rejected it; the entity was rolled back
    Reverted(FailureNotice),
}

/// Where a dragged card is dropped
#[derive(Debug, Clone, PartialEq)]
pub enum Placement {
    /// Into a column with no cards. Appends if the column has cards after
    /// all.
    EmptyColumn,
    /// Above or below another card in the column
    Relative { target: ItemId, zone: DropZone },
    /// After the last card
    End,
}

struct Pending {
    generation: u64,
    /// Entity state the server is known to hold
    base: EntitySnapshot,
}

/// Serializes the requests of one key
type Lane = Arc<AsyncMutex<()>>;

struct State {
    view: BoardView,
    generations: HashMap<EntityKey, u64>,
    pending: HashMap<EntityKey, Pending>,
    lanes: HashMap<EntityKey, Lane>,
    failures: Vec<FailureNotice>,
}

/// Per-board-view coordinator. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct ConcurrencyCoordinator {
    transport: Arc<dyn Transport>,
    state: Arc<Mutex<State>>,
}

impl ConcurrencyCoordinator {
    pub fn new(transport: Arc<dyn Transport>, data: BoardData) -> Self {
        Self {
            transport,
            state: Arc::new(Mutex::new(State {
                view: BoardView::from(data),
                generations: HashMap::new(),
                pending: HashMap::new(),
                lanes: HashMap::new(),
                failures: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Fresh id for a card created on this client
    pub fn new_item_id(&self) -> ItemId {
        ItemId::new()
    }

    /// Fresh id for a column created on this client
    pub fn new_column_id(&self) -> ColumnId {
        ColumnId::new()
    }

    /// Copy of the current optimistic view
    pub fn view(&self) -> BoardView {
        self.lock().view.clone()
    }

    /// Read the current view without copying it
    pub fn with_view<R>(&self, f: impl FnOnce(&BoardView) -> R) -> R {
        f(&self.lock().view)
    }

    pub fn failures(&self) -> Vec<FailureNotice> {
        self.lock().failures.clone()
    }

    /// Drain the failure notices, e.g. after the UI has shown them
    pub fn take_failures(&self) -> Vec<FailureNotice> {
        std::mem::take(&mut self.lock().failures)
    }

    /// Is a command for `key` waiting on the server
    pub fn is_pending(&self, key: &EntityKey) -> bool {
        self.lock().pending.contains_key(key)
    }

    fn is_latest(&self, key: &EntityKey, generation: u64) -> bool {
        self.lock().pending.get(key).map(|p| p.generation) == Some(generation)
    }

    /// Submit a command under its natural key
    pub fn submit_command(&self, command: Command) -> JoinHandle<Outcome> {
        let key = self.with_view(|view| EntityKey::for_command(&command, view.board_id()));
        self.submit(key, command)
    }

    /// Apply `command` optimistically and queue it on the key's lane. The
    /// handle resolves once the answer has been reconciled, or as
    /// `Superseded` if a newer command for the key took its place before it
    /// was sent.
    pub fn submit(&self, key: EntityKey, command: Command) -> JoinHandle<Outcome> {
        let (generation, lane) = {
            let mut state = self.lock();
            let generation = state.generations.get(&key).copied().unwrap_or(0) + 1;
            state.generations.insert(key.clone(), generation);

            let snapshot = state.view.apply_optimistic(&command);
            let base = match state.pending.remove(&key) {
                Some(pending) => pending.base,
                None => snapshot,
            };
            state.pending.insert(key.clone(), Pending { generation, base });
            let lane = state.lanes.entry(key.clone()).or_default().clone();
            (generation, lane)
        };
        debug!(%key, generation, intent = %command.intent(), "Submitted");

        let this = self.clone();
        tokio::spawn(async move {
            let outcome = {
                let _turn = lane.lock().await;
                if this.is_latest(&key, generation) {
                    let result = this.transport.send(command.clone()).await;
                    this.reconcile(key.clone(), generation, &command, result)
                } else {
                    debug!(%key, generation, "Dropping superseded command unsent");
                    Outcome::Superseded
                }
            };
            this.release_lane(&key, &lane);
            outcome
        })
    }

    /// Forget the key's lane once nothing is pending or queued on it
    fn release_lane(&self, key: &EntityKey, lane: &Lane) {
        let mut state = self.lock();
        // One reference in the map, one held by the caller
        if !state.pending.contains_key(key) && Arc::strong_count(lane) == 2 {
            state.lanes.remove(key);
        }
    }

    fn reconcile(
        &self,
        key: EntityKey,
        generation: u64,
        command: &Command,
        result: Result<MutationAck>,
    ) -> Outcome {
        let mut state = self.lock();
        let current = state.pending.get(&key).map(|p| p.generation);
        if current != Some(generation) {
            debug!(%key, generation, ?current, "Discarding stale response");
            // The server applied it, so a later revert must land on it
            let board = state.view.board_id().clone();
            if let (Ok(ack), Some(pending)) = (&result, state.pending.get_mut(&key)) {
                pending.base.settle(command, ack, &board);
            }
            return Outcome::Superseded;
        }
        let Some(pending) = state.pending.remove(&key) else {
            return Outcome::Superseded;
        };

        match result {
            Ok(ack) => {
                state.view.confirm(command, &ack);
                debug!(%key, generation, "Confirmed");
                Outcome::Confirmed(ack)
            }
            Err(error) => {
                state.view.revert(pending.base);
                let notice = FailureNotice {
                    key: key.clone(),
                    intent: command.intent(),
                    kind: error.kind(),
                    message: error.to_string(),
                    at: Utc::now(),
                };
                warn!(%key, %error, "Mutation failed, reverted");
                state.failures.push(notice.clone());
                Outcome::Reverted(notice)
            }
        }
    }

    /// Replace the view with authoritative state. Responses still in flight
    /// are discarded when they arrive.
    pub fn resync(&self, data: BoardData) {
        let mut state = self.lock();
        state.view = BoardView::from(data);
        state.pending.clear();
        info!(board = %state.view.board_id(), "Resynced board view");
    }

    /// Fetch the board through the transport and resync
    pub async fn refresh(&self) -> Result<()> {
        let board = self.with_view(|view| view.board_id().clone());
        let data = self.transport.load_board(&board).await?;
        self.resync(data);
        Ok(())
    }

    /// Add a card at the bottom of `column`
    pub fn add_card(&self, column: &ColumnId, title: impl Into<String>) -> (ItemId, JoinHandle<Outcome>) {
        let id = self.new_item_id();
        let order = self.with_view(|view| append_order(&view.orders_in(column, None)));
        let command = Command::CreateItem(UpsertItem::new(id.clone(), column.clone(), order, title));
        (id, self.submit_command(command))
    }

    /// Drag a card to `column` at `placement`
    pub fn move_card(
        &self,
        item: &ItemId,
        column: &ColumnId,
        placement: Placement,
    ) -> Result<JoinHandle<Outcome>> {
        let command = self.with_view(|view| -> Result<Command> {
            let card = view
                .item(item)
                .ok_or_else(|| KanbanError::not_found("item", item))?;
            if view.column(column).is_none() {
                return Err(KanbanError::not_found("column", column));
            }
            let order = match placement {
                Placement::EmptyColumn => {
                    // A stale "empty" drop still goes after whatever is there
                    let orders = view.orders_in(column, Some(item));
                    if orders.is_empty() {
                        EMPTY_COLUMN_ORDER
                    } else {
                        append_order(&orders)
                    }
                }
                Placement::End => append_order(&view.orders_in(column, Some(item))),
                Placement::Relative { target, zone } => {
                    let index = view
                        .neighbours(column, item)
                        .iter()
                        .position(|i| i.id == target)
                        .ok_or_else(|| KanbanError::not_found("item", &target))?;
                    drop_order(&view.orders_in(column, Some(item)), index, zone)
                }
            };
            Ok(Command::MoveItem(UpsertItem::new(
                item.clone(),
                column.clone(),
                order,
                card.title.clone(),
            )))
        })?;
        Ok(self.submit_command(command))
    }

    /// Add a column at the end of the board
    pub fn add_column(&self, name: impl Into<String>) -> (ColumnId, JoinHandle<Outcome>) {
        let id = self.new_column_id();
        let board = self.with_view(|view| view.board_id().clone());
        let command = Command::CreateColumn(CreateColumn::new(id.clone(), name, board));
        (id, self.submit_command(command))
    }
}

impl std::fmt::Debug for ConcurrencyCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("ConcurrencyCoordinator")
            .field("board", state.view.board_id())
            .field("pending", &state.pending.len())
            .field("failures", &state.failures.len())
            .finish()
    }
}
