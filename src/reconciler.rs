//! Drag Reconciler
//!
//! State machine for a drag gesture: `Idle -> Dragging -> Resolving -> Idle`.
//!
//! A completed drop registers pending overrides and patches the render store
//! in one synchronous call, then hands back a `WriteTicket` for the durable
//! write. Each ticket settles exactly once: acknowledged, failed, or expired.

use std::collections::HashMap;
use std::fmt;

use crate::activity::MoveEvent;
use crate::error::{PersistError, ReconcileError, ReconcileResult};
use crate::models::{DropResult, Item, ItemKind, Location, OrderUpdate, SnapshotScope};
use crate::pending::{PendingOverride, PendingUpdateRegistry};
use crate::selection::Selection;
use crate::sequencer::{compute_cross_move, compute_reorder};
use crate::store::BoardState;

/// Identifies one durable write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WriteId(u64);

impl fmt::Display for WriteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "w{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DragPhase {
    Idle,
    Dragging { item_id: String, kind: ItemKind },
    /// No gesture active, at least one write not settled yet
    Resolving { in_flight: usize },
}

/// Durable write produced by a drop
#[derive(Debug, Clone, PartialEq)]
pub struct WriteTicket {
    pub write_id: WriteId,
    pub updates: Vec<OrderUpdate>,
    /// Set when the card changed column
    pub move_event: Option<MoveEvent>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DropOutcome {
    /// Dropped outside any container
    Cancelled,
    /// Dropped where it started, or nothing changed rank
    Unchanged,
    Submitted(WriteTicket),
}

/// How a write settled
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOutcome {
    Acknowledged(WriteId),
    Failed(WriteId, PersistError),
    /// TTL ran out before the store answered
    Expired(WriteId),
}

impl WriteOutcome {
    pub fn write_id(&self) -> WriteId {
        match self {
            WriteOutcome::Acknowledged(id)
            | WriteOutcome::Failed(id, _)
            | WriteOutcome::Expired(id) => *id,
        }
    }
}

#[derive(Debug, Clone)]
struct InFlightWrite {
    scope: SnapshotScope,
    item_ids: Vec<String>,
    expires_at: i64,
}

/// Planned mutation for a drop, before anything is registered
struct DropPlan {
    scope: SnapshotScope,
    updates: Vec<OrderUpdate>,
    overrides: Vec<PendingOverride>,
    move_event: Option<MoveEvent>,
}

pub struct DragReconciler {
    registry: PendingUpdateRegistry,
    selection: Selection,
    dragging: Option<(String, ItemKind)>,
    in_flight: HashMap<WriteId, InFlightWrite>,
    next_write: u64,
    ttl_ms: i64,
    actor_id: String,
}

impl DragReconciler {
    pub fn new(ttl_ms: i64, actor_id: &str) -> Self {
        Self {
            registry: PendingUpdateRegistry::new(),
            selection: Selection::new(),
            dragging: None,
            in_flight: HashMap::new(),
            next_write: 1,
            ttl_ms,
            actor_id: actor_id.to_string(),
        }
    }

    pub fn phase(&self) -> DragPhase {
        match &self.dragging {
            Some((item_id, kind)) => DragPhase::Dragging {
                item_id: item_id.clone(),
                kind: *kind,
            },
            None if self.in_flight.is_empty() => DragPhase::Idle,
            None => DragPhase::Resolving {
                in_flight: self.in_flight.len(),
            },
        }
    }

    pub fn registry(&self) -> &PendingUpdateRegistry {
        &self.registry
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut Selection {
        &mut self.selection
    }

    // ========================
    // Gesture
    // ========================

    /// Gesture started on `item_id`
    pub fn begin_drag(&mut self, item_id: &str, kind: ItemKind) -> ReconcileResult<()> {
        if let Some((current, _)) = &self.dragging {
            return Err(ReconcileError::AlreadyDragging(current.clone()));
        }
        if kind == ItemKind::Card && self.selection.collapse_for_drag(item_id) {
            tracing::debug!(item_id, "selection collapsed to dragged card");
        }
        self.dragging = Some((item_id.to_string(), kind));
        tracing::debug!(item_id, ?kind, "drag started");
        Ok(())
    }

    /// Gesture aborted before a drop
    pub fn cancel_drag(&mut self) {
        if let Some((item_id, _)) = self.dragging.take() {
            tracing::debug!(item_id = %item_id, "drag cancelled");
        }
        self.selection.clear();
    }

    /// Gesture ended; compute, register, and patch the render store
    pub fn finish_drag(
        &mut self,
        drop: &DropResult,
        board: &mut BoardState,
        now: i64,
    ) -> ReconcileResult<DropOutcome> {
        match &self.dragging {
            None => return Err(ReconcileError::NotDragging),
            Some((expected, _)) if *expected != drop.item_id => {
                return Err(ReconcileError::DragMismatch {
                    expected: expected.clone(),
                    got: drop.item_id.clone(),
                });
            }
            Some(_) => {}
        }
        self.dragging = None;
        let outcome = self.resolve(drop, board, now);
        self.selection.clear();
        outcome
    }

    fn resolve(
        &mut self,
        drop: &DropResult,
        board: &mut BoardState,
        now: i64,
    ) -> ReconcileResult<DropOutcome> {
        let Some(destination) = &drop.destination else {
            tracing::info!(item_id = %drop.item_id, "dropped outside any container");
            return Ok(DropOutcome::Cancelled);
        };
        if *destination == drop.source {
            return Ok(DropOutcome::Unchanged);
        }

        let plan = self.plan(drop, destination, board)?;
        if plan.updates.is_empty() {
            return Ok(DropOutcome::Unchanged);
        }

        // Registry first, then the render store, in the same call
        self.registry.register(&plan.overrides, self.ttl_ms, now);
        board.apply_optimistic(plan.scope, &plan.overrides);

        let write_id = WriteId(self.next_write);
        self.next_write += 1;
        self.in_flight.insert(
            write_id,
            InFlightWrite {
                scope: plan.scope,
                item_ids: plan.overrides.iter().map(|o| o.item_id.clone()).collect(),
                expires_at: now.saturating_add(self.ttl_ms),
            },
        );
        tracing::info!(
            %write_id,
            item_id = %drop.item_id,
            updates = plan.updates.len(),
            "drop applied optimistically"
        );

        Ok(DropOutcome::Submitted(WriteTicket {
            write_id,
            updates: plan.updates,
            move_event: plan.move_event,
        }))
    }

    fn plan(
        &self,
        drop: &DropResult,
        destination: &Location,
        board: &BoardState,
    ) -> ReconcileResult<DropPlan> {
        let source = &drop.source;

        match drop.kind {
            ItemKind::Column => {
                let columns = board.columns();
                check_source(&columns, source.index, &drop.item_id)?;
                let reorder = compute_reorder(&columns, source.index, destination.index)?;
                let overrides = reorder
                    .changed_ranks
                    .iter()
                    .map(|update| PendingOverride {
                        item_id: update.id.clone(),
                        order: update.order,
                        container_id: None,
                    })
                    .collect();
                Ok(DropPlan {
                    scope: SnapshotScope::Columns,
                    updates: reorder.changed_ranks,
                    overrides,
                    move_event: None,
                })
            }
            ItemKind::Card if source.container_id == destination.container_id => {
                let cards = board.cards_in(&source.container_id);
                check_source(&cards, source.index, &drop.item_id)?;
                let reorder = compute_reorder(&cards, source.index, destination.index)?;
                let overrides = card_overrides(&reorder.changed_ranks, &source.container_id);
                Ok(DropPlan {
                    scope: SnapshotScope::Cards,
                    updates: reorder.changed_ranks,
                    overrides,
                    move_event: None,
                })
            }
            ItemKind::Card => {
                let source_cards = board.cards_in(&source.container_id);
                let dest_cards = board.cards_in(&destination.container_id);
                let cross = compute_cross_move(
                    &source_cards,
                    &dest_cards,
                    &drop.item_id,
                    &destination.container_id,
                    destination.index,
                )?;

                let mut overrides = card_overrides(&cross.source_updates, &source.container_id);
                overrides.extend(card_overrides(
                    &cross.dest_updates,
                    &destination.container_id,
                ));

                let move_event = source_cards
                    .iter()
                    .find(|card| card.id == drop.item_id)
                    .map(|card| {
                        MoveEvent::card_moved(
                            card,
                            &board.column_name(&source.container_id),
                            &board.column_name(&destination.container_id),
                            &self.actor_id,
                        )
                    });

                Ok(DropPlan {
                    scope: SnapshotScope::Cards,
                    updates: cross.updates(),
                    overrides,
                    move_event,
                })
            }
        }
    }

    // ========================
    // Settlement
    // ========================

    /// Settle a write with the store's answer
    ///
    /// Returns `None` if the write already settled (e.g. it expired first).
    /// A failed write re-merges the last snapshot right away.
    pub fn settle(
        &mut self,
        write_id: WriteId,
        result: Result<(), PersistError>,
        board: &mut BoardState,
        now: i64,
    ) -> Option<WriteOutcome> {
        let Some(write) = self.in_flight.remove(&write_id) else {
            tracing::debug!(%write_id, "late settlement ignored");
            return None;
        };
        self.registry.release(&write.item_ids, write.expires_at);

        match result {
            Ok(()) => {
                tracing::info!(%write_id, pending = self.registry.len(), "write acknowledged");
                Some(WriteOutcome::Acknowledged(write_id))
            }
            Err(error) => {
                tracing::warn!(
                    %write_id,
                    error = %error,
                    "write failed, falling back to snapshot"
                );
                board.remerge(write.scope, &mut self.registry, now);
                Some(WriteOutcome::Failed(write_id, error))
            }
        }
    }

    /// Merge a pushed snapshot, expiring writes whose TTL ran out first
    ///
    /// Overrides of an expired write leave the registry through the merge
    /// sweep, so ids a later drag re-registered stay live.
    pub fn receive_snapshot(
        &mut self,
        scope: SnapshotScope,
        snapshot: Vec<Item>,
        board: &mut BoardState,
        now: i64,
    ) -> Vec<WriteOutcome> {
        let mut expired: Vec<WriteId> = self
            .in_flight
            .iter()
            .filter(|(_, write)| write.expires_at <= now)
            .map(|(id, _)| *id)
            .collect();
        expired.sort();

        for write_id in &expired {
            if self.in_flight.remove(write_id).is_some() {
                tracing::warn!(%write_id, "write expired without an answer");
            }
        }

        board.apply_snapshot(scope, snapshot, &mut self.registry, now);
        expired.into_iter().map(WriteOutcome::Expired).collect()
    }

    /// Forget all local intent
    pub fn reset(&mut self) {
        self.registry = PendingUpdateRegistry::new();
        self.selection.clear();
        self.dragging = None;
        self.in_flight.clear();
    }
}

fn check_source(list: &[Item], index: usize, item_id: &str) -> ReconcileResult<()> {
    match list.get(index) {
        Some(item) if item.id == item_id => Ok(()),
        Some(_) => Err(ReconcileError::UnknownItem(item_id.to_string())),
        None => Err(ReconcileError::IndexOutOfRange {
            index,
            len: list.len(),
        }),
    }
}

fn card_overrides(updates: &[OrderUpdate], container_id: &str) -> Vec<PendingOverride> {
    updates
        .iter()
        .map(|update| PendingOverride {
            item_id: update.id.clone(),
            order: update.order,
            container_id: Some(
                update
                    .container_id
                    .clone()
                    .unwrap_or_else(|| container_id.to_string()),
            ),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: i64 = 10_000;

    fn board() -> BoardState {
        let mut board = BoardState::new("b1");
        let mut scratch = PendingUpdateRegistry::new();
        board.apply_snapshot(
            SnapshotScope::Columns,
            vec![
                Item::column("todo", 0.0, "To do"),
                Item::column("doing", 1.0, "Doing"),
                Item::column("done", 2.0, "Done"),
            ],
            &mut scratch,
            0,
        );
        board.apply_snapshot(SnapshotScope::Cards, cards_snapshot(), &mut scratch, 0);
        board
    }

    fn cards_snapshot() -> Vec<Item> {
        vec![
            Item::card("a", "todo", 0.0, "A"),
            Item::card("b", "todo", 1.0, "B"),
            Item::card("c", "todo", 2.0, "C"),
            Item::card("x", "done", 0.0, "X"),
        ]
    }

    fn card_drop(item: &str, from: (&str, usize), to: Option<(&str, usize)>) -> DropResult {
        DropResult {
            item_id: item.to_string(),
            kind: ItemKind::Card,
            source: Location::new(from.0, from.1),
            destination: to.map(|(c, i)| Location::new(c, i)),
        }
    }

    fn ids(items: &[Item]) -> Vec<&str> {
        items.iter().map(|i| i.id.as_str()).collect()
    }

    fn submitted(outcome: DropOutcome) -> WriteTicket {
        match outcome {
            DropOutcome::Submitted(ticket) => ticket,
            other => panic!("expected a write, got {:?}", other),
        }
    }

    #[test]
    fn test_reorder_within_column() {
        let mut board = board();
        let mut reconciler = DragReconciler::new(TTL, "u1");

        reconciler.begin_drag("a", ItemKind::Card).unwrap();
        let ticket = submitted(
            reconciler
                .finish_drag(&card_drop("a", ("todo", 0), Some(("todo", 2))), &mut board, 100)
                .unwrap(),
        );

        assert_eq!(ids(&board.cards_in("todo")), vec!["b", "c", "a"]);
        assert_eq!(ticket.updates.len(), 3);
        assert!(ticket.move_event.is_none());
        assert_eq!(reconciler.registry().len(), 3);
        assert_eq!(reconciler.registry().get("a").unwrap().expires_at, 100 + TTL);
        assert_eq!(reconciler.phase(), DragPhase::Resolving { in_flight: 1 });
    }

    #[test]
    fn test_cross_column_move_emits_event() {
        let mut board = board();
        let mut reconciler = DragReconciler::new(TTL, "u1");

        reconciler.begin_drag("b", ItemKind::Card).unwrap();
        let ticket = submitted(
            reconciler
                .finish_drag(&card_drop("b", ("todo", 1), Some(("done", 0))), &mut board, 0)
                .unwrap(),
        );

        assert_eq!(ids(&board.cards_in("todo")), vec!["a", "c"]);
        assert_eq!(ids(&board.cards_in("done")), vec!["b", "x"]);
        assert!(ticket.updates.contains(&OrderUpdate::relocate("b", 0.0, "done")));

        let event = ticket.move_event.unwrap();
        assert_eq!(event.from_container_name, "To do");
        assert_eq!(event.to_container_name, "Done");
        assert_eq!(event.actor_id, "u1");

        let pending = reconciler.registry().get("c").unwrap();
        assert_eq!(pending.container_id.as_deref(), Some("todo"));
    }

    #[test]
    fn test_column_reorder() {
        let mut board = board();
        let mut reconciler = DragReconciler::new(TTL, "u1");
        let drop = DropResult {
            item_id: "done".to_string(),
            kind: ItemKind::Column,
            source: Location::new("b1", 2),
            destination: Some(Location::new("b1", 0)),
        };

        reconciler.begin_drag("done", ItemKind::Column).unwrap();
        let ticket = submitted(reconciler.finish_drag(&drop, &mut board, 0).unwrap());

        assert_eq!(ids(&board.columns()), vec!["done", "todo", "doing"]);
        assert!(ticket.updates.iter().all(|u| u.container_id.is_none()));
        assert_eq!(reconciler.registry().get("done").unwrap().container_id, None);
    }

    #[test]
    fn test_drop_outside_is_cancelled_without_side_effects() {
        let mut board = board();
        let mut reconciler = DragReconciler::new(TTL, "u1");
        reconciler.selection_mut().select("a");

        reconciler.begin_drag("a", ItemKind::Card).unwrap();
        let outcome = reconciler
            .finish_drag(&card_drop("a", ("todo", 0), None), &mut board, 0)
            .unwrap();

        assert_eq!(outcome, DropOutcome::Cancelled);
        assert!(reconciler.registry().is_empty());
        assert!(reconciler.selection().is_empty());
        assert_eq!(reconciler.phase(), DragPhase::Idle);
        assert_eq!(ids(&board.cards_in("todo")), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_drop_in_place_is_noop() {
        let mut board = board();
        let mut reconciler = DragReconciler::new(TTL, "u1");

        reconciler.begin_drag("b", ItemKind::Card).unwrap();
        let outcome = reconciler
            .finish_drag(&card_drop("b", ("todo", 1), Some(("todo", 1))), &mut board, 0)
            .unwrap();

        assert_eq!(outcome, DropOutcome::Unchanged);
        assert!(reconciler.registry().is_empty());
        assert_eq!(reconciler.phase(), DragPhase::Idle);
    }

    #[test]
    fn test_selection_collapses_to_unselected_card() {
        let mut reconciler = DragReconciler::new(TTL, "u1");
        for id in ["a", "b", "x"] {
            reconciler.selection_mut().select(id);
        }

        reconciler.begin_drag("c", ItemKind::Card).unwrap();
        assert_eq!(reconciler.selection().ids(), ["c".to_string()]);
    }

    #[test]
    fn test_selected_card_keeps_multi_select() {
        let mut reconciler = DragReconciler::new(TTL, "u1");
        reconciler.selection_mut().select("a");
        reconciler.selection_mut().select("b");

        reconciler.begin_drag("b", ItemKind::Card).unwrap();
        assert_eq!(reconciler.selection().len(), 2);
    }

    #[test]
    fn test_state_machine_misuse() {
        let mut board = board();
        let mut reconciler = DragReconciler::new(TTL, "u1");
        let drop = card_drop("a", ("todo", 0), Some(("todo", 1)));

        assert_eq!(
            reconciler.finish_drag(&drop, &mut board, 0),
            Err(ReconcileError::NotDragging)
        );

        reconciler.begin_drag("b", ItemKind::Card).unwrap();
        assert_eq!(
            reconciler.begin_drag("a", ItemKind::Card),
            Err(ReconcileError::AlreadyDragging("b".to_string()))
        );
        assert!(matches!(
            reconciler.finish_drag(&drop, &mut board, 0),
            Err(ReconcileError::DragMismatch { .. })
        ));
    }

    #[test]
    fn test_stale_source_index_rejected() {
        let mut board = board();
        let mut reconciler = DragReconciler::new(TTL, "u1");

        reconciler.begin_drag("a", ItemKind::Card).unwrap();
        let drop = card_drop("a", ("todo", 2), Some(("todo", 0)));
        let result = reconciler.finish_drag(&drop, &mut board, 0);

        assert_eq!(result, Err(ReconcileError::UnknownItem("a".to_string())));
        assert!(reconciler.registry().is_empty());
        assert_eq!(reconciler.phase(), DragPhase::Idle);
    }

    #[test]
    fn test_stale_snapshot_does_not_snap_back() {
        let mut board = board();
        let mut reconciler = DragReconciler::new(TTL, "u1");

        reconciler.begin_drag("a", ItemKind::Card).unwrap();
        reconciler
            .finish_drag(&card_drop("a", ("todo", 0), Some(("todo", 2))), &mut board, 0)
            .unwrap();

        let expired =
            reconciler.receive_snapshot(SnapshotScope::Cards, cards_snapshot(), &mut board, 50);

        assert!(expired.is_empty());
        assert_eq!(ids(&board.cards_in("todo")), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_settle_success_clears_pending() {
        let mut board = board();
        let mut reconciler = DragReconciler::new(TTL, "u1");

        reconciler.begin_drag("a", ItemKind::Card).unwrap();
        let ticket = submitted(
            reconciler
                .finish_drag(&card_drop("a", ("todo", 0), Some(("todo", 2))), &mut board, 0)
                .unwrap(),
        );

        let outcome = reconciler.settle(ticket.write_id, Ok(()), &mut board, 20);
        assert_eq!(outcome, Some(WriteOutcome::Acknowledged(ticket.write_id)));
        assert!(reconciler.registry().is_empty());
        assert_eq!(reconciler.phase(), DragPhase::Idle);
        // Optimistic order stays until the next snapshot
        assert_eq!(ids(&board.cards_in("todo")), vec!["b", "c", "a"]);

        assert_eq!(reconciler.settle(ticket.write_id, Ok(()), &mut board, 30), None);
    }

    #[test]
    fn test_settle_failure_reverts_to_snapshot() {
        let mut board = board();
        let mut reconciler = DragReconciler::new(TTL, "u1");

        reconciler.begin_drag("a", ItemKind::Card).unwrap();
        let ticket = submitted(
            reconciler
                .finish_drag(&card_drop("a", ("todo", 0), Some(("todo", 2))), &mut board, 0)
                .unwrap(),
        );

        let error = PersistError::Rejected("denied".to_string());
        let outcome = reconciler.settle(ticket.write_id, Err(error.clone()), &mut board, 20);

        assert_eq!(outcome, Some(WriteOutcome::Failed(ticket.write_id, error)));
        assert!(reconciler.registry().is_empty());
        assert_eq!(ids(&board.cards_in("todo")), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_expired_write_settles_once() {
        let mut board = board();
        let mut reconciler = DragReconciler::new(TTL, "u1");

        reconciler.begin_drag("a", ItemKind::Card).unwrap();
        let ticket = submitted(
            reconciler
                .finish_drag(&card_drop("a", ("todo", 0), Some(("todo", 2))), &mut board, 0)
                .unwrap(),
        );

        let expired =
            reconciler.receive_snapshot(SnapshotScope::Cards, cards_snapshot(), &mut board, TTL);
        assert_eq!(expired, vec![WriteOutcome::Expired(ticket.write_id)]);
        assert_eq!(ids(&board.cards_in("todo")), vec!["a", "b", "c"]);

        assert_eq!(
            reconciler.settle(ticket.write_id, Ok(()), &mut board, TTL + 5),
            None
        );
        assert!(reconciler
            .receive_snapshot(SnapshotScope::Cards, cards_snapshot(), &mut board, TTL + 10)
            .is_empty());
    }

    /// Store state once a: 0 -> 2 is persisted
    fn first_landed() -> Vec<Item> {
        vec![
            Item::card("a", "todo", 2.0, "A"),
            Item::card("b", "todo", 0.0, "B"),
            Item::card("c", "todo", 1.0, "C"),
            Item::card("x", "done", 0.0, "X"),
        ]
    }

    /// a: 0 -> 2 at t=0, then a: 2 -> 1 at t=9000
    fn drag_same_card_twice(
        reconciler: &mut DragReconciler,
        board: &mut BoardState,
    ) -> (WriteTicket, WriteTicket) {
        reconciler.begin_drag("a", ItemKind::Card).unwrap();
        let first = submitted(
            reconciler
                .finish_drag(&card_drop("a", ("todo", 0), Some(("todo", 2))), board, 0)
                .unwrap(),
        );
        reconciler.begin_drag("a", ItemKind::Card).unwrap();
        let second = submitted(
            reconciler
                .finish_drag(&card_drop("a", ("todo", 2), Some(("todo", 1))), board, 9_000)
                .unwrap(),
        );
        (first, second)
    }

    #[test]
    fn test_expired_write_keeps_newer_override() {
        let mut board = board();
        let mut reconciler = DragReconciler::new(TTL, "u1");
        let (first, _second) = drag_same_card_twice(&mut reconciler, &mut board);
        assert_eq!(ids(&board.cards_in("todo")), vec!["b", "a", "c"]);

        // The first write landed but its answer was lost
        let expired =
            reconciler.receive_snapshot(SnapshotScope::Cards, first_landed(), &mut board, 10_001);

        assert_eq!(expired, vec![WriteOutcome::Expired(first.write_id)]);
        let pending = reconciler.registry().get("a").unwrap();
        assert_eq!(pending.order, 1.0);
        assert_eq!(pending.expires_at, 19_000);
        assert!(reconciler.registry().get("b").is_none());
        assert_eq!(ids(&board.cards_in("todo")), vec!["b", "a", "c"]);
        assert_eq!(reconciler.phase(), DragPhase::Resolving { in_flight: 1 });
    }

    #[test]
    fn test_settle_keeps_newer_override() {
        let mut board = board();
        let mut reconciler = DragReconciler::new(TTL, "u1");
        let (first, second) = drag_same_card_twice(&mut reconciler, &mut board);

        reconciler.settle(first.write_id, Ok(()), &mut board, 9_500);
        assert_eq!(reconciler.registry().len(), 2);
        assert!(reconciler.registry().is_live("a", 9_500));
        assert!(reconciler.registry().is_live("c", 9_500));

        reconciler.receive_snapshot(SnapshotScope::Cards, first_landed(), &mut board, 9_600);
        assert_eq!(ids(&board.cards_in("todo")), vec!["b", "a", "c"]);

        reconciler.settle(second.write_id, Ok(()), &mut board, 9_700);
        assert!(reconciler.registry().is_empty());
    }

    #[test]
    fn test_new_drag_while_write_in_flight() {
        let mut board = board();
        let mut reconciler = DragReconciler::new(TTL, "u1");

        reconciler.begin_drag("a", ItemKind::Card).unwrap();
        let first = submitted(
            reconciler
                .finish_drag(&card_drop("a", ("todo", 0), Some(("todo", 2))), &mut board, 0)
                .unwrap(),
        );

        // todo is now b, c, a
        reconciler.begin_drag("c", ItemKind::Card).unwrap();
        let second = submitted(
            reconciler
                .finish_drag(&card_drop("c", ("todo", 1), Some(("done", 1))), &mut board, 10)
                .unwrap(),
        );
        assert_ne!(first.write_id, second.write_id);
        assert_eq!(reconciler.phase(), DragPhase::Resolving { in_flight: 2 });

        reconciler.settle(second.write_id, Ok(()), &mut board, 20);
        assert_eq!(reconciler.phase(), DragPhase::Resolving { in_flight: 1 });
        assert_eq!(ids(&board.cards_in("done")), vec!["x", "c"]);
    }
}
