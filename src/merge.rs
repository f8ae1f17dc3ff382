//! Snapshot Merger
//!
//! Overlays live pending overrides on a freshly pushed snapshot.

use crate::models::Item;
use crate::pending::PendingUpdateRegistry;

/// Merge `snapshot` with the registry at time `now`
///
/// Expired entries are swept first. Items with a live override take the
/// pending order and container; everything else is copied verbatim. The output
/// keeps snapshot order, sorting is left to `sort_for_render`.
pub fn merge(snapshot: &[Item], registry: &mut PendingUpdateRegistry, now: i64) -> Vec<Item> {
    registry.sweep_expired(now);
    snapshot.iter().map(|item| overlay(item, registry)).collect()
}

fn overlay(item: &Item, registry: &PendingUpdateRegistry) -> Item {
    let mut merged = item.clone();
    if let Some(pending) = registry.get(&item.id) {
        merged.order = pending.order;
        if pending.container_id.is_some() {
            merged.container_id = pending.container_id.clone();
        }
    }
    merged
}

/// Sort merged items by `(container_id, order)` for painting
pub fn sort_for_render(items: &mut [Item]) {
    items.sort_by(|a, b| {
        a.container_id
            .cmp(&b.container_id)
            .then_with(|| a.order.total_cmp(&b.order))
    });
}
