//! In-Memory Collaborators
//!
//! A single-board store of record that keeps everything in memory and pushes
//! snapshots over channels, and an activity log that records events.

use std::cell::{Cell, RefCell};

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use super::{ActivityLog, BoardPersistence, SnapshotFeed};
use crate::activity::MoveEvent;
use crate::error::{ActivityError, PersistError, SubscriptionError};
use crate::models::{Item, OrderUpdate, SnapshotScope};
use crate::sequencer::{next_order, sort_by_order};

type Subscriber = (SnapshotScope, mpsc::UnboundedSender<Result<Vec<Item>, SubscriptionError>>);

#[derive(Default)]
struct MemoryState {
    columns: Vec<Item>,
    cards: Vec<Item>,
    subscribers: Vec<Subscriber>,
    /// Writes wait here while held
    held: Vec<oneshot::Sender<()>>,
    holding: bool,
    fail_next_write: Option<PersistError>,
    deny_subscriptions: Option<SubscriptionError>,
    writes: Vec<Vec<OrderUpdate>>,
}

impl MemoryState {
    fn list(&self, scope: SnapshotScope) -> &Vec<Item> {
        match scope {
            SnapshotScope::Columns => &self.columns,
            SnapshotScope::Cards => &self.cards,
        }
    }

    fn scope_of(&self, id: &str) -> Option<SnapshotScope> {
        if self.columns.iter().any(|c| c.id == id) {
            Some(SnapshotScope::Columns)
        } else if self.cards.iter().any(|c| c.id == id) {
            Some(SnapshotScope::Cards)
        } else {
            None
        }
    }

    fn send(&mut self, scope: SnapshotScope, message: Result<Vec<Item>, SubscriptionError>) {
        self.subscribers.retain(|(subscribed, tx)| {
            if *subscribed != scope {
                return true;
            }
            tx.send(message.clone()).is_ok()
        });
    }
}

/// Store of record for one board, held entirely in memory
pub struct MemoryStore {
    board_id: String,
    auto_publish: Cell<bool>,
    state: RefCell<MemoryState>,
}

impl MemoryStore {
    pub fn new(board_id: &str) -> Self {
        Self {
            board_id: board_id.to_string(),
            auto_publish: Cell::new(true),
            state: RefCell::new(MemoryState::default()),
        }
    }

    /// Append a column at the end of the board
    pub fn add_column(&self, id: &str, title: &str) -> Item {
        let mut state = self.state.borrow_mut();
        let column = Item::column(id, next_order(&state.columns), title);
        state.columns.push(column.clone());
        column
    }

    /// Append a card at the end of a column
    pub fn add_card(&self, id: &str, column_id: &str, title: &str) -> Item {
        let mut state = self.state.borrow_mut();
        let siblings: Vec<Item> = state
            .cards
            .iter()
            .filter(|c| c.is_in(column_id))
            .cloned()
            .collect();
        let card = Item::card(id, column_id, next_order(&siblings), title);
        state.cards.push(card.clone());
        card
    }

    pub fn snapshot(&self, scope: SnapshotScope) -> Vec<Item> {
        self.state.borrow().list(scope).clone()
    }

    pub fn cards_in(&self, column_id: &str) -> Vec<Item> {
        let mut cards: Vec<Item> = self
            .state
            .borrow()
            .cards
            .iter()
            .filter(|c| c.is_in(column_id))
            .cloned()
            .collect();
        sort_by_order(&mut cards);
        cards
    }

    /// Publish a snapshot automatically after every successful write (default on)
    pub fn set_auto_publish(&self, enabled: bool) {
        self.auto_publish.set(enabled);
    }

    /// Push the current state of `scope` to its subscribers
    pub fn publish(&self, scope: SnapshotScope) {
        let mut state = self.state.borrow_mut();
        let snapshot = state.list(scope).clone();
        state.send(scope, Ok(snapshot));
    }

    /// Push an arbitrary snapshot, e.g. one that predates a write
    pub fn push_snapshot(&self, scope: SnapshotScope, items: Vec<Item>) {
        self.state.borrow_mut().send(scope, Ok(items));
    }

    /// Push an error down every feed of `scope`
    pub fn fail_feed(&self, scope: SnapshotScope, error: SubscriptionError) {
        self.state.borrow_mut().send(scope, Err(error));
    }

    /// Refuse new subscriptions with `error`
    pub fn deny_subscriptions(&self, error: SubscriptionError) {
        self.state.borrow_mut().deny_subscriptions = Some(error);
    }

    /// Reject the next write with `error`
    pub fn fail_next_write(&self, error: PersistError) {
        self.state.borrow_mut().fail_next_write = Some(error);
    }

    /// Park incoming writes until `release_writes`
    pub fn hold_writes(&self) {
        self.state.borrow_mut().holding = true;
    }

    pub fn release_writes(&self) {
        let held = {
            let mut state = self.state.borrow_mut();
            state.holding = false;
            std::mem::take(&mut state.held)
        };
        for gate in held {
            let _ = gate.send(());
        }
    }

    /// Every accepted write, oldest first
    pub fn writes(&self) -> Vec<Vec<OrderUpdate>> {
        self.state.borrow().writes.clone()
    }
}

#[async_trait(?Send)]
impl BoardPersistence for MemoryStore {
    async fn subscribe(
        &self,
        board_id: &str,
        scope: SnapshotScope,
    ) -> Result<SnapshotFeed, SubscriptionError> {
        if board_id != self.board_id {
            return Err(SubscriptionError::AccessDenied(format!("board {}", board_id)));
        }
        let mut state = self.state.borrow_mut();
        if let Some(error) = state.deny_subscriptions.clone() {
            return Err(error);
        }
        let (tx, rx) = mpsc::unbounded_channel();
        // Fresh subscribers get the current state right away
        let _ = tx.send(Ok(state.list(scope).clone()));
        state.subscribers.push((scope, tx));
        Ok(rx)
    }

    async fn apply_order_updates(&self, updates: &[OrderUpdate]) -> Result<(), PersistError> {
        let gate = {
            let mut state = self.state.borrow_mut();
            if state.holding {
                let (tx, rx) = oneshot::channel();
                state.held.push(tx);
                Some(rx)
            } else {
                None
            }
        };
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        if let Some(error) = state.fail_next_write.take() {
            return Err(error);
        }

        let mut touched = Vec::new();
        for update in updates {
            let scope = state
                .scope_of(&update.id)
                .ok_or_else(|| PersistError::Rejected(format!("unknown item {}", update.id)))?;
            if !touched.contains(&scope) {
                touched.push(scope);
            }
        }

        for update in updates {
            let item = state
                .columns
                .iter_mut()
                .chain(state.cards.iter_mut())
                .find(|item| item.id == update.id);
            if let Some(item) = item {
                item.order = update.order;
                if update.container_id.is_some() {
                    item.container_id = update.container_id.clone();
                }
            }
        }
        state.writes.push(updates.to_vec());

        if self.auto_publish.get() {
            for scope in touched {
                let snapshot = state.list(scope).clone();
                state.send(scope, Ok(snapshot));
            }
        }
        Ok(())
    }
}

/// Activity log that keeps events in memory
#[derive(Debug, Default)]
pub struct RecordingActivityLog {
    events: RefCell<Vec<MoveEvent>>,
    attempts: Cell<usize>,
    failing: bool,
}

impl RecordingActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A log whose every call fails
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Default::default()
        }
    }

    pub fn events(&self) -> Vec<MoveEvent> {
        self.events.borrow().clone()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.get()
    }
}

#[async_trait(?Send)]
impl ActivityLog for RecordingActivityLog {
    async fn log_move(&self, event: &MoveEvent) -> Result<(), ActivityError> {
        self.attempts.set(self.attempts.get() + 1);
        if self.failing {
            return Err(ActivityError::Failed("log unavailable".to_string()));
        }
        self.events.borrow_mut().push(event.clone());
        Ok(())
    }
}
