//! Board Render Store
//!
//! Holds the last good snapshot and the merged list for each feed. The render
//! layer only ever reads the merged lists.

use crate::merge::merge;
use crate::models::{Item, SnapshotScope};
use crate::pending::{PendingOverride, PendingUpdateRegistry};
use crate::sequencer::sort_by_order;

#[derive(Debug, Clone, Default)]
struct ScopeState {
    /// Last snapshot pushed by the store of record
    snapshot: Vec<Item>,
    /// What the render layer sees
    merged: Vec<Item>,
}

/// Render-facing state of one board
#[derive(Debug, Clone)]
pub struct BoardState {
    board_id: String,
    columns: ScopeState,
    cards: ScopeState,
}

impl BoardState {
    pub fn new(board_id: &str) -> Self {
        Self {
            board_id: board_id.to_string(),
            columns: ScopeState::default(),
            cards: ScopeState::default(),
        }
    }

    pub fn board_id(&self) -> &str {
        &self.board_id
    }

    fn scope(&self, scope: SnapshotScope) -> &ScopeState {
        match scope {
            SnapshotScope::Columns => &self.columns,
            SnapshotScope::Cards => &self.cards,
        }
    }

    fn scope_mut(&mut self, scope: SnapshotScope) -> &mut ScopeState {
        match scope {
            SnapshotScope::Columns => &mut self.columns,
            SnapshotScope::Cards => &mut self.cards,
        }
    }

    /// Store a pushed snapshot and rebuild the merged list from it
    pub fn apply_snapshot(
        &mut self,
        scope: SnapshotScope,
        snapshot: Vec<Item>,
        registry: &mut PendingUpdateRegistry,
        now: i64,
    ) {
        let state = self.scope_mut(scope);
        state.merged = merge(&snapshot, registry, now);
        state.snapshot = snapshot;
        tracing::debug!(scope = scope.as_str(), items = state.merged.len(), "snapshot merged");
    }

    /// Rebuild the merged list from the last snapshot
    pub fn remerge(
        &mut self,
        scope: SnapshotScope,
        registry: &mut PendingUpdateRegistry,
        now: i64,
    ) {
        let state = self.scope_mut(scope);
        state.merged = merge(&state.snapshot, registry, now);
    }

    /// Patch the merged list in place with freshly registered overrides
    pub fn apply_optimistic(&mut self, scope: SnapshotScope, overrides: &[PendingOverride]) {
        let merged = &mut self.scope_mut(scope).merged;
        for entry in overrides {
            if let Some(item) = merged.iter_mut().find(|item| item.id == entry.item_id) {
                item.order = entry.order;
                if entry.container_id.is_some() {
                    item.container_id = entry.container_id.clone();
                }
            }
        }
    }

    /// Merged items of a feed, in snapshot order
    pub fn merged(&self, scope: SnapshotScope) -> &[Item] {
        &self.scope(scope).merged
    }

    pub fn find(&self, scope: SnapshotScope, id: &str) -> Option<&Item> {
        self.scope(scope).merged.iter().find(|item| item.id == id)
    }

    /// Columns of the board in render order
    pub fn columns(&self) -> Vec<Item> {
        let mut columns = self.columns.merged.clone();
        sort_by_order(&mut columns);
        columns
    }

    /// Cards of one column in render order
    pub fn cards_in(&self, column_id: &str) -> Vec<Item> {
        let mut cards: Vec<Item> = self
            .cards
            .merged
            .iter()
            .filter(|card| card.is_in(column_id))
            .cloned()
            .collect();
        sort_by_order(&mut cards);
        cards
    }

    /// Display name of a column, falling back to its id
    pub fn column_name(&self, column_id: &str) -> String {
        self.find(SnapshotScope::Columns, column_id)
            .map(|column| column.title.clone())
            .filter(|title| !title.is_empty())
            .unwrap_or_else(|| column_id.to_string())
    }
}
