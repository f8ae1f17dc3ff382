//! Board Session
//!
//! Owns the render store and the reconciler for one board and wires them to
//! the store of record and the activity log.
//!
//! Everything runs on one thread. Writes and feeds are local tasks, so the
//! session must be driven from inside a `tokio::task::LocalSet`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tokio::sync::oneshot;

use crate::activity::ActivityNotifier;
use crate::clock::Clock;
use crate::commands::{ActivityLog, BoardPersistence};
use crate::config::ReconcileConfig;
use crate::error::{ConfigError, SessionError, SubscriptionError};
use crate::models::{DropResult, Item, ItemKind, SnapshotScope};
use crate::reconciler::{DragPhase, DragReconciler, DropOutcome, WriteId, WriteOutcome};
use crate::store::BoardState;

struct SessionState {
    board: BoardState,
    reconciler: DragReconciler,
    /// Feeds that failed; their snapshots are ignored until resubscribed
    feed_errors: HashMap<SnapshotScope, SubscriptionError>,
    /// Expirations seen while pumping a feed, not yet taken by the caller
    expired: Vec<WriteOutcome>,
    /// Handles waiting on writes that have not settled
    waiters: HashMap<WriteId, oneshot::Sender<WriteOutcome>>,
    destroyed: bool,
}

impl SessionState {
    fn resolve_waiter(&mut self, outcome: &WriteOutcome) {
        if let Some(waiter) = self.waiters.remove(&outcome.write_id()) {
            let _ = waiter.send(outcome.clone());
        }
    }
}

/// Handle to a submitted write
pub struct WriteHandle {
    pub write_id: WriteId,
    outcome: oneshot::Receiver<WriteOutcome>,
}

impl WriteHandle {
    /// Wait until the write settles: acknowledged, failed, or expired
    ///
    /// `None` only when the session was destroyed first.
    pub async fn settled(self) -> Option<WriteOutcome> {
        self.outcome.await.ok()
    }
}

pub struct BoardSession<P, A, C>
where
    P: BoardPersistence + 'static,
    A: ActivityLog + 'static,
    C: Clock + Clone + 'static,
{
    inner: Rc<RefCell<SessionState>>,
    persistence: Rc<P>,
    notifier: ActivityNotifier<A>,
    clock: C,
    config: ReconcileConfig,
}

impl<P, A, C> BoardSession<P, A, C>
where
    P: BoardPersistence + 'static,
    A: ActivityLog + 'static,
    C: Clock + Clone + 'static,
{
    pub fn new(
        board_id: &str,
        persistence: Rc<P>,
        activity: Rc<A>,
        clock: C,
        config: ReconcileConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let state = SessionState {
            board: BoardState::new(board_id),
            reconciler: DragReconciler::new(config.pending_ttl_ms, &config.actor_id),
            feed_errors: HashMap::new(),
            expired: Vec::new(),
            waiters: HashMap::new(),
            destroyed: false,
        };
        tracing::info!(
            board_id,
            actor_id = %config.actor_id,
            ttl_ms = config.pending_ttl_ms,
            "session created"
        );
        Ok(Self {
            inner: Rc::new(RefCell::new(state)),
            persistence,
            notifier: ActivityNotifier::new(activity),
            clock,
            config,
        })
    }

    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    pub fn board_id(&self) -> String {
        self.inner.borrow().board.board_id().to_string()
    }

    // ========================
    // Gesture
    // ========================

    pub fn begin_drag(&self, item_id: &str, kind: ItemKind) -> Result<(), SessionError> {
        self.inner.borrow_mut().reconciler.begin_drag(item_id, kind)?;
        Ok(())
    }

    pub fn cancel_drag(&self) {
        self.inner.borrow_mut().reconciler.cancel_drag();
    }

    /// Resolve a drop and start the durable write
    ///
    /// The render store already shows the new order when this returns. `None`
    /// means nothing needed writing.
    pub fn finish_drag(&self, drop: &DropResult) -> Result<Option<WriteHandle>, SessionError> {
        let now = self.clock.now_millis();
        let outcome = {
            let mut guard = self.inner.borrow_mut();
            let state = &mut *guard;
            state.reconciler.finish_drag(drop, &mut state.board, now)?
        };

        let ticket = match outcome {
            DropOutcome::Submitted(ticket) => ticket,
            DropOutcome::Cancelled | DropOutcome::Unchanged => return Ok(None),
        };

        if let Some(event) = ticket.move_event.clone() {
            self.notifier.notify(event);
        }

        let write_id = ticket.write_id;
        let (tx, rx) = oneshot::channel();
        self.inner.borrow_mut().waiters.insert(write_id, tx);

        let inner = Rc::clone(&self.inner);
        let persistence = Rc::clone(&self.persistence);
        let clock = self.clock.clone();
        tokio::task::spawn_local(async move {
            let result = persistence.apply_order_updates(&ticket.updates).await;
            let mut guard = inner.borrow_mut();
            if guard.destroyed {
                tracing::debug!(%write_id, "session destroyed, dropping write result");
                return;
            }
            let state = &mut *guard;
            let outcome = state
                .reconciler
                .settle(write_id, result, &mut state.board, clock.now_millis());
            if let Some(outcome) = outcome {
                state.resolve_waiter(&outcome);
            }
        });

        Ok(Some(WriteHandle {
            write_id,
            outcome: rx,
        }))
    }

    // ========================
    // Snapshots
    // ========================

    /// Merge a pushed snapshot; returns writes that expired on the way
    pub fn apply_snapshot(
        &self,
        scope: SnapshotScope,
        snapshot: Vec<Item>,
    ) -> Vec<WriteOutcome> {
        let now = self.clock.now_millis();
        let mut guard = self.inner.borrow_mut();
        let state = &mut *guard;
        if state.destroyed {
            return Vec::new();
        }
        if state.feed_errors.contains_key(&scope) {
            tracing::debug!(scope = scope.as_str(), "feed failed, snapshot ignored");
            return Vec::new();
        }
        let expired = state
            .reconciler
            .receive_snapshot(scope, snapshot, &mut state.board, now);
        for outcome in &expired {
            state.resolve_waiter(outcome);
        }
        expired
    }

    /// Mark a feed failed; the last good merged state stays on screen
    pub fn subscription_failed(
        &self,
        scope: SnapshotScope,
        error: SubscriptionError,
    ) -> SessionError {
        tracing::warn!(
            scope = scope.as_str(),
            error = %error,
            "subscription failed, keeping last good state"
        );
        self.inner.borrow_mut().feed_errors.insert(scope, error.clone());
        SessionError::Subscription(error)
    }

    pub fn feed_error(&self, scope: SnapshotScope) -> Option<SubscriptionError> {
        self.inner.borrow().feed_errors.get(&scope).cloned()
    }

    /// Subscribe to `scope` and merge every snapshot until the feed closes
    pub async fn run_feed(&self, scope: SnapshotScope) -> Result<(), SessionError> {
        let board_id = self.board_id();
        let mut feed = match self.persistence.subscribe(&board_id, scope).await {
            Ok(feed) => feed,
            Err(error) => return Err(self.subscription_failed(scope, error)),
        };
        self.inner.borrow_mut().feed_errors.remove(&scope);
        tracing::info!(board_id = %board_id, scope = scope.as_str(), "feed subscribed");

        while let Some(message) = feed.recv().await {
            if self.inner.borrow().destroyed {
                break;
            }
            match message {
                Ok(snapshot) => {
                    let expired = self.apply_snapshot(scope, snapshot);
                    self.inner.borrow_mut().expired.extend(expired);
                }
                Err(error) => return Err(self.subscription_failed(scope, error)),
            }
        }
        tracing::info!(scope = scope.as_str(), "feed closed");
        Ok(())
    }

    /// Expirations observed by `run_feed` since the last call
    pub fn take_expired(&self) -> Vec<WriteOutcome> {
        std::mem::take(&mut self.inner.borrow_mut().expired)
    }

    // ========================
    // Render accessors
    // ========================

    pub fn columns(&self) -> Vec<Item> {
        self.inner.borrow().board.columns()
    }

    pub fn cards_in(&self, column_id: &str) -> Vec<Item> {
        self.inner.borrow().board.cards_in(column_id)
    }

    pub fn pending_count(&self) -> usize {
        self.inner.borrow().reconciler.registry().len()
    }

    pub fn phase(&self) -> DragPhase {
        self.inner.borrow().reconciler.phase()
    }

    // ========================
    // Selection
    // ========================

    pub fn select_card(&self, card_id: &str) {
        self.inner.borrow_mut().reconciler.selection_mut().select(card_id);
    }

    pub fn toggle_card(&self, card_id: &str) {
        self.inner.borrow_mut().reconciler.selection_mut().toggle(card_id);
    }

    pub fn selected(&self) -> Vec<String> {
        self.inner.borrow().reconciler.selection().ids().to_vec()
    }

    /// Tear down; writes still in flight finish but no longer touch state
    pub fn destroy(self) {
        let mut state = self.inner.borrow_mut();
        state.destroyed = true;
        state.reconciler.reset();
        state.waiters.clear();
        tracing::info!(board_id = %state.board.board_id(), "session destroyed");
    }
}
