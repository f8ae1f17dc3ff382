//! Pending Update Registry
//!
//! Optimistic writes that the store of record has not confirmed yet.
//! Entries are swept lazily by the merger; there is no timer.

use std::collections::HashMap;

use crate::models::PendingUpdate;

/// Override to register for one item
#[derive(Debug, Clone, PartialEq)]
pub struct PendingOverride {
    pub item_id: String,
    pub order: f64,
    pub container_id: Option<String>,
}

/// Map from item id to its live local override
#[derive(Debug, Clone, Default)]
pub struct PendingUpdateRegistry {
    entries: HashMap<String, PendingUpdate>,
}

impl PendingUpdateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite overrides, all expiring at `now + ttl_ms`
    ///
    /// Must run before the optimistic render mutation it protects.
    pub fn register(&mut self, overrides: &[PendingOverride], ttl_ms: i64, now: i64) {
        let expires_at = now.saturating_add(ttl_ms);
        for entry in overrides {
            self.entries.insert(
                entry.item_id.clone(),
                PendingUpdate {
                    item_id: entry.item_id.clone(),
                    order: entry.order,
                    container_id: entry.container_id.clone(),
                    expires_at,
                },
            );
        }
        tracing::debug!(
            registered = overrides.len(),
            pending = self.entries.len(),
            "pending overrides registered"
        );
    }

    /// Remove entries by id; unknown ids are ignored
    pub fn clear<S: AsRef<str>>(&mut self, ids: &[S]) {
        for id in ids {
            self.entries.remove(id.as_ref());
        }
    }

    /// Remove entries for a settled write, keeping any re-registered later
    ///
    /// An entry survives when its expiry is past `registered_until`, i.e. a
    /// newer drag overwrote it after the settled write was registered.
    pub fn release<S: AsRef<str>>(&mut self, ids: &[S], registered_until: i64) {
        for id in ids {
            let id = id.as_ref();
            if self
                .entries
                .get(id)
                .is_some_and(|entry| entry.expires_at <= registered_until)
            {
                self.entries.remove(id);
            }
        }
    }

    /// Drop every entry with `expires_at <= now`, returning how many were removed
    pub fn sweep_expired(&mut self, now: i64) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expires_at > now);
        let swept = before - self.entries.len();
        if swept > 0 {
            tracing::debug!(swept, pending = self.entries.len(), "expired pending overrides swept");
        }
        swept
    }

    pub fn get(&self, id: &str) -> Option<&PendingUpdate> {
        self.entries.get(id)
    }

    /// Whether `id` has an override that has not expired at `now`
    pub fn is_live(&self, id: &str, now: i64) -> bool {
        self.entries.get(id).is_some_and(|entry| entry.expires_at > now)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PendingUpdate> {
        self.entries.values()
    }
}
