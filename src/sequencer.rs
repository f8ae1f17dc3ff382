//! Order Sequencer
//!
//! Pure order math for reorders within a list and moves across lists.
//! After any operation the orders of a list are dense ranks (0, 1, 2, ...).

use crate::error::{ReconcileError, ReconcileResult};
use crate::models::{Item, OrderUpdate};

/// Result of reordering a single list
#[derive(Debug, Clone, PartialEq)]
pub struct Reorder {
    /// The list in its new render order, with new orders applied
    pub updated_list: Vec<Item>,
    /// Only the entries whose order actually changed
    pub changed_ranks: Vec<OrderUpdate>,
}

impl Reorder {
    fn unchanged(list: &[Item]) -> Self {
        Self {
            updated_list: list.to_vec(),
            changed_ranks: Vec::new(),
        }
    }

    pub fn is_noop(&self) -> bool {
        self.changed_ranks.is_empty()
    }
}

/// Result of moving a card from one column to another
#[derive(Debug, Clone, PartialEq)]
pub struct CrossMove {
    pub source_list: Vec<Item>,
    pub dest_list: Vec<Item>,
    pub source_updates: Vec<OrderUpdate>,
    /// Always contains the moved item with its new container
    pub dest_updates: Vec<OrderUpdate>,
}

impl CrossMove {
    /// All updates in write order (source first)
    pub fn updates(&self) -> Vec<OrderUpdate> {
        self.source_updates.iter().chain(self.dest_updates.iter()).cloned().collect()
    }
}

/// Move the entry at `from_index` to `to_index` (remove, then splice-insert)
///
/// `list` must already be sorted by order. Empty and single-element lists,
/// and `from_index == to_index`, are no-ops.
pub fn compute_reorder(
    list: &[Item],
    from_index: usize,
    to_index: usize,
) -> ReconcileResult<Reorder> {
    let len = list.len();
    if len <= 1 || from_index == to_index {
        return Ok(Reorder::unchanged(list));
    }
    for index in [from_index, to_index] {
        if index >= len {
            return Err(ReconcileError::IndexOutOfRange { index, len });
        }
    }

    let mut updated_list = list.to_vec();
    let moved = updated_list.remove(from_index);
    updated_list.insert(to_index, moved);
    let changed_ranks = rerank(&mut updated_list);

    Ok(Reorder {
        updated_list,
        changed_ranks,
    })
}

/// Move `item_id` out of `source` and into `dest` at `dest_index`
///
/// When the item already belongs to `dest_container` this is a plain reorder
/// of `source` and `dest_updates` stays empty.
pub fn compute_cross_move(
    source: &[Item],
    dest: &[Item],
    item_id: &str,
    dest_container: &str,
    dest_index: usize,
) -> ReconcileResult<CrossMove> {
    let from_index = source
        .iter()
        .position(|item| item.id == item_id)
        .ok_or_else(|| ReconcileError::UnknownItem(item_id.to_string()))?;

    if source[from_index].is_in(dest_container) {
        let reorder = compute_reorder(source, from_index, dest_index)?;
        return Ok(CrossMove {
            source_list: reorder.updated_list.clone(),
            dest_list: reorder.updated_list,
            source_updates: reorder.changed_ranks,
            dest_updates: Vec::new(),
        });
    }

    if dest_index > dest.len() {
        return Err(ReconcileError::IndexOutOfRange {
            index: dest_index,
            len: dest.len(),
        });
    }

    let mut source_list = source.to_vec();
    let mut moved = source_list.remove(from_index);
    let source_updates = rerank(&mut source_list);

    moved.container_id = Some(dest_container.to_string());
    let mut dest_list = dest.to_vec();
    dest_list.insert(dest_index, moved);

    let mut dest_updates = Vec::new();
    for (position, item) in dest_list.iter_mut().enumerate() {
        let rank = position as f64;
        if position == dest_index {
            item.order = rank;
            dest_updates.push(OrderUpdate::relocate(&item.id, rank, dest_container));
        } else if item.order != rank {
            item.order = rank;
            dest_updates.push(OrderUpdate::rank(&item.id, rank));
        }
    }

    Ok(CrossMove {
        source_list,
        dest_list,
        source_updates,
        dest_updates,
    })
}

/// Order for appending a new item to the end of `list`
pub fn next_order(list: &[Item]) -> f64 {
    list.iter()
        .map(|item| item.order)
        .reduce(f64::max)
        .map_or(0.0, |max| max.floor() + 1.0)
}

/// Sort items ascending by order (stable)
pub fn sort_by_order(items: &mut [Item]) {
    items.sort_by(|a, b| a.order.total_cmp(&b.order));
}

/// Assign each entry its position as order; report the ones that changed
fn rerank(list: &mut [Item]) -> Vec<OrderUpdate> {
    list.iter_mut()
        .enumerate()
        .filter_map(|(position, item)| {
            let rank = position as f64;
            if item.order == rank {
                None
            } else {
                item.order = rank;
                Some(OrderUpdate::rank(&item.id, rank))
            }
        })
        .collect()
}
