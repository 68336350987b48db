//! Client-side state of one board view
//!
//! Three transitions mutate it: optimistic apply, confirm, revert. Everything
//! else is a read.

use crate::dispatch::Command;
use crate::types::{Board, BoardData, BoardId, Column, ColumnId, Item, ItemId, MutationAck};
use std::collections::HashSet;

/// What an entity looked like before an optimistic change
#[derive(Debug, Clone, PartialEq)]
pub enum EntitySnapshot {
    Item {
        id: ItemId,
        item: Option<Item>,
        hidden: bool,
    },
    Column {
        id: ColumnId,
        column: Option<Column>,
        hidden: bool,
    },
    Board {
        board: Board,
        hidden: bool,
    },
}

impl EntitySnapshot {
    /// Fold a command the server accepted into the recorded state
    pub fn settle(&mut self, command: &Command, ack: &MutationAck, board_id: &BoardId) {
        match (self, command) {
            (
                EntitySnapshot::Item { id, item, hidden },
                Command::CreateItem(cmd) | Command::MoveItem(cmd),
            ) => {
                let column_id = ack.column_id.clone().unwrap_or_else(|| cmd.column_id.clone());
                let order = ack.order.unwrap_or(cmd.order);
                match item {
                    Some(existing) => {
                        existing.column_id = column_id;
                        existing.order = order;
                        existing.title = cmd.title.clone();
                    }
                    None => {
                        *item = Some(Item {
                            id: id.clone(),
                            column_id,
                            board_id: ack.board_id.clone().unwrap_or_else(|| board_id.clone()),
                            order,
                            title: cmd.title.clone(),
                            content: None,
                        })
                    }
                }
                *hidden = false;
            }
            (EntitySnapshot::Item { item, hidden, .. }, Command::DeleteCard(_)) => {
                *item = None;
                *hidden = false;
            }
            (EntitySnapshot::Column { id, column, hidden }, Command::CreateColumn(cmd)) => {
                if column.is_none() {
                    *column = Some(Column {
                        id: id.clone(),
                        board_id: cmd.board_id.clone(),
                        name: cmd.name.clone(),
                        order: ack.order.map(|order| order as u32).unwrap_or_default(),
                    });
                }
                *hidden = false;
            }
            (EntitySnapshot::Column { column, .. }, Command::UpdateColumn(cmd)) => {
                if let Some(column) = column {
                    column.name = cmd.name.clone();
                }
            }
            (EntitySnapshot::Column { column, hidden, .. }, Command::DeleteColumn(_)) => {
                *column = None;
                *hidden = false;
            }
            (EntitySnapshot::Board { board, .. }, Command::UpdateBoardName(cmd)) => {
                board.name = ack.name.clone().unwrap_or_else(|| cmd.name.clone());
            }
            (EntitySnapshot::Board { hidden, .. }, Command::DeleteBoard(_)) => {
                *hidden = true;
            }
            _ => {}
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoardView {
    board: Board,
    board_hidden: bool,
    columns: Vec<Column>,
    items: Vec<Item>,
    hidden_items: HashSet<ItemId>,
    hidden_columns: HashSet<ColumnId>,
}

impl From<BoardData> for BoardView {
    fn from(data: BoardData) -> Self {
        let mut columns = data.columns;
        columns.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
        Self {
            board: data.board,
            board_hidden: false,
            columns,
            items: data.items,
            hidden_items: HashSet::new(),
            hidden_columns: HashSet::new(),
        }
    }
}

impl BoardView {
    pub fn board_id(&self) -> &BoardId {
        &self.board.id
    }

    /// The board, unless a delete is pending or done
    pub fn board(&self) -> Option<&Board> {
        (!self.board_hidden).then_some(&self.board)
    }

    /// Visible columns in display order
    pub fn columns(&self) -> Vec<&Column> {
        self.columns
            .iter()
            .filter(|c| !self.hidden_columns.contains(&c.id))
            .collect()
    }

    pub fn column(&self, id: &ColumnId) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| &c.id == id && !self.hidden_columns.contains(&c.id))
    }

    /// Visible items of a column sorted by order
    pub fn items_in(&self, column: &ColumnId) -> Vec<&Item> {
        if self.hidden_columns.contains(column) {
            return Vec::new();
        }
        let mut items: Vec<&Item> = self
            .items
            .iter()
            .filter(|i| &i.column_id == column && !self.hidden_items.contains(&i.id))
            .collect();
        items.sort_by(|a, b| a.order.total_cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
        items
    }

    pub fn item(&self, id: &ItemId) -> Option<&Item> {
        self.items
            .iter()
            .find(|i| &i.id == id && !self.hidden_items.contains(&i.id))
            .filter(|i| !self.hidden_columns.contains(&i.column_id))
    }

    /// Sorted orders of a column, leaving out `excluding` (the dragged item)
    pub fn orders_in(&self, column: &ColumnId, excluding: Option<&ItemId>) -> Vec<f64> {
        self.items_in(column)
            .into_iter()
            .filter(|i| Some(&i.id) != excluding)
            .map(|i| i.order)
            .collect()
    }

    /// Visible items of a column, leaving out `excluding`, in display order
    pub fn neighbours(&self, column: &ColumnId, excluding: &ItemId) -> Vec<&Item> {
        self.items_in(column)
            .into_iter()
            .filter(|i| &i.id != excluding)
            .collect()
    }

    fn snapshot(&self, command: &Command) -> EntitySnapshot {
        match command {
            Command::CreateItem(cmd) | Command::MoveItem(cmd) => self.item_snapshot(&cmd.id),
            Command::DeleteCard(cmd) => self.item_snapshot(&cmd.item_id),
            Command::CreateColumn(cmd) => self.column_snapshot(&cmd.id),
            Command::UpdateColumn(cmd) => self.column_snapshot(&cmd.column_id),
            Command::DeleteColumn(cmd) => self.column_snapshot(&cmd.column_id),
            Command::UpdateBoardName(_) | Command::DeleteBoard(_) => EntitySnapshot::Board {
                board: self.board.clone(),
                hidden: self.board_hidden,
            },
        }
    }

    fn item_snapshot(&self, id: &ItemId) -> EntitySnapshot {
        EntitySnapshot::Item {
            id: id.clone(),
            item: self.items.iter().find(|i| &i.id == id).cloned(),
            hidden: self.hidden_items.contains(id),
        }
    }

    fn column_snapshot(&self, id: &ColumnId) -> EntitySnapshot {
        EntitySnapshot::Column {
            id: id.clone(),
            column: self.columns.iter().find(|c| &c.id == id).cloned(),
            hidden: self.hidden_columns.contains(id),
        }
    }

    /// Apply `command` ahead of the server and return what it replaced
    pub fn apply_optimistic(&mut self, command: &Command) -> EntitySnapshot {
        let snapshot = self.snapshot(command);
        match command {
            Command::CreateItem(cmd) | Command::MoveItem(cmd) => {
                let board_id = self.board.id.clone();
                match self.items.iter_mut().find(|i| i.id == cmd.id) {
                    Some(item) => {
                        item.column_id = cmd.column_id.clone();
                        item.order = cmd.order;
                        item.title = cmd.title.clone();
                    }
                    None => self.items.push(Item {
                        id: cmd.id.clone(),
                        column_id: cmd.column_id.clone(),
                        board_id,
                        order: cmd.order,
                        title: cmd.title.clone(),
                        content: None,
                    }),
                }
                self.hidden_items.remove(&cmd.id);
            }
            Command::DeleteCard(cmd) => {
                self.hidden_items.insert(cmd.item_id.clone());
            }
            Command::UpdateBoardName(cmd) => {
                self.board.name = cmd.name.clone();
            }
            Command::CreateColumn(cmd) => {
                if !self.columns.iter().any(|c| c.id == cmd.id) {
                    self.columns.push(Column {
                        id: cmd.id.clone(),
                        board_id: cmd.board_id.clone(),
                        name: cmd.name.clone(),
                        order: self.columns.len() as u32 + 1,
                    });
                }
            }
            Command::UpdateColumn(cmd) => {
                if let Some(column) = self.columns.iter_mut().find(|c| c.id == cmd.column_id) {
                    column.name = cmd.name.clone();
                }
            }
            Command::DeleteColumn(cmd) => {
                self.hidden_columns.insert(cmd.column_id.clone());
            }
            Command::DeleteBoard(_) => {
                self.board_hidden = true;
            }
        }
        snapshot
    }

    /// Fold the server's answer into the view
    pub fn confirm(&mut self, command: &Command, ack: &MutationAck) {
        match command {
            Command::CreateItem(cmd) | Command::MoveItem(cmd) => {
                if let Some(item) = self.items.iter_mut().find(|i| i.id == cmd.id) {
                    if let Some(order) = ack.order {
                        item.order = order;
                    }
                    if let Some(column) = &ack.column_id {
                        item.column_id = column.clone();
                    }
                    if let Some(board) = &ack.board_id {
                        item.board_id = board.clone();
                    }
                }
            }
            Command::DeleteCard(cmd) => {
                self.items.retain(|i| i.id != cmd.item_id);
                self.hidden_items.remove(&cmd.item_id);
            }
            Command::UpdateBoardName(_) => {
                if let Some(name) = &ack.name {
                    self.board.name = name.clone();
                }
            }
            Command::CreateColumn(cmd) => {
                if let Some(column) = self.columns.iter_mut().find(|c| c.id == cmd.id) {
                    if let Some(order) = ack.order {
                        column.order = order as u32;
                    }
                }
                self.columns
                    .sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
            }
            Command::UpdateColumn(_) => {}
            Command::DeleteColumn(cmd) => {
                self.columns.retain(|c| c.id != cmd.column_id);
                self.items.retain(|i| i.column_id != cmd.column_id);
                self.hidden_columns.remove(&cmd.column_id);
            }
            Command::DeleteBoard(_) => {
                self.columns.clear();
                self.items.clear();
                self.hidden_columns.clear();
                self.hidden_items.clear();
            }
        }
    }

    /// Put an entity back the way `snapshot` recorded it
    pub fn revert(&mut self, snapshot: EntitySnapshot) {
        match snapshot {
            EntitySnapshot::Item { id, item, hidden } => {
                match (item, self.items.iter().position(|i| i.id == id)) {
                    (Some(item), Some(index)) => self.items[index] = item,
                    (Some(item), None) => self.items.push(item),
                    (None, Some(index)) => {
                        self.items.remove(index);
                    }
                    (None, None) => {}
                }
                if hidden {
                    self.hidden_items.insert(id);
                } else {
                    self.hidden_items.remove(&id);
                }
            }
            EntitySnapshot::Column { id, column, hidden } => {
                match (column, self.columns.iter().position(|c| c.id == id)) {
                    (Some(column), Some(index)) => self.columns[index] = column,
                    (Some(column), None) => {
                        self.columns.push(column);
                        self.columns
                            .sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
                    }
                    (None, Some(index)) => {
                        self.columns.remove(index);
                    }
                    (None, None) => {}
                }
                if hidden {
                    self.hidden_columns.insert(id);
                } else {
                    self.hidden_columns.remove(&id);
                }
            }
            EntitySnapshot::Board { board, hidden } => {
                self.board = board;
                self.board_hidden = hidden;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{CreateColumn, DeleteColumn};
    use crate::item::{DeleteCard, UpsertItem};
    use crate::types::UserId;

    fn view() -> BoardView {
        let board = Board::new(UserId::from("alice"), "Sprint 1").with_id(BoardId::from("b1"));
        let column = |id: &str, order| Column {
            id: ColumnId::from(id),
            board_id: board.id.clone(),
            name: id.to_string(),
            order,
        };
        let item = |id: &str, order| Item {
            id: ItemId::from(id),
            column_id: ColumnId::from("todo"),
            board_id: board.id.clone(),
            order,
            title: id.to_string(),
            content: Some(format!("{id} notes")),
        };
        BoardView::from(BoardData {
            columns: vec![column("done", 2), column("todo", 1)],
            items: vec![item("b", 2.0), item("a", 1.0)],
            board,
        })
    }

    fn ids(items: Vec<&Item>) -> Vec<&str> {
        items.into_iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn test_reads_are_ordered() {
        let view = view();
        let columns: Vec<_> = view.columns().into_iter().map(|c| c.id.as_str()).collect();
        assert_eq!(columns, vec!["todo", "done"]);
        assert_eq!(ids(view.items_in(&ColumnId::from("todo"))), vec!["a", "b"]);
    }

    #[test]
    fn test_move_then_revert_restores_content() {
        let mut view = view();
        let before = view.clone();
        let snapshot =
            view.apply_optimistic(&Command::MoveItem(UpsertItem::new("a", "done", 1.0, "a")));

        assert_eq!(ids(view.items_in(&ColumnId::from("done"))), vec!["a"]);
        view.revert(snapshot);
        assert_eq!(view, before);
    }

    #[test]
    fn test_settled_move_becomes_the_revert_target() {
        let mut view = view();
        let first = Command::MoveItem(UpsertItem::new("a", "done", 1.0, "a"));
        let mut base = view.apply_optimistic(&first);
        view.apply_optimistic(&Command::MoveItem(UpsertItem::new("a", "todo", 9.0, "a")));

        let ack = MutationAck::new("moveItem", "a")
            .with_column(ColumnId::from("done"))
            .with_order(1.0);
        base.settle(&first, &ack, &BoardId::from("b1"));
        view.revert(base);

        let item = view.item(&ItemId::from("a")).unwrap();
        assert_eq!(item.column_id, ColumnId::from("done"));
        assert_eq!(item.order, 1.0);
        assert_eq!(item.content.as_deref(), Some("a notes"));
    }

    #[test]
    fn test_settled_create_survives_revert() {
        let mut view = view();
        let create = Command::CreateItem(UpsertItem::new("n", "todo", 3.0, "New"));
        let mut base = view.apply_optimistic(&create);

        base.settle(&create, &MutationAck::new("createItem", "n"), &BoardId::from("b1"));
        view.revert(base);

        assert_eq!(ids(view.items_in(&ColumnId::from("todo"))), vec!["a", "b", "n"]);
    }

    #[test]
    fn test_delete_hides_until_confirmed() {
        let mut view = view();
        let cmd = Command::DeleteCard(DeleteCard::new("a"));
        let snapshot = view.apply_optimistic(&cmd);
        assert!(view.item(&ItemId::from("a")).is_none());

        let mut failed = view.clone();
        failed.revert(snapshot);
        assert!(failed.item(&ItemId::from("a")).is_some());

        view.confirm(&cmd, &MutationAck::new("deleteCard", "a").deleted(true));
        assert!(view.item(&ItemId::from("a")).is_none());
        assert_eq!(view.items.len(), 1);
    }

    #[test]
    fn test_column_delete_hides_its_items() {
        let mut view = view();
        let cmd = Command::DeleteColumn(DeleteColumn::new("todo"));
        view.apply_optimistic(&cmd);
        assert!(view.items_in(&ColumnId::from("todo")).is_empty());
        assert!(view.item(&ItemId::from("a")).is_none());

        view.confirm(&cmd, &MutationAck::new("deleteColumn", "todo").deleted(true));
        assert_eq!(view.columns().len(), 1);
        assert!(view.items.is_empty());
    }

    #[test]
    fn test_created_column_takes_confirmed_order() {
        let mut view = view();
        let cmd = Command::CreateColumn(CreateColumn::new("later", "Later", "b1"));
        let snapshot = view.apply_optimistic(&cmd);
        assert_eq!(view.column(&ColumnId::from("later")).unwrap().order, 3);

        let mut failed = view.clone();
        failed.revert(snapshot);
        assert!(failed.column(&ColumnId::from("later")).is_none());

        view.confirm(&cmd, &MutationAck::new("createColumn", "later").with_order(3.0));
        assert_eq!(view.columns().last().unwrap().id.as_str(), "later");
    }
}
