//! Activity Notifier
//!
//! Emits `card_moved` events to the audit log. Fire-and-forget: the
//! reconciliation path never waits on it and failures are only logged.

use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;

use crate::commands::ActivityLog;
use crate::models::Item;

pub const CARD_MOVED: &str = "card_moved";

/// Semantic event for a card changing column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveEvent {
    pub kind: String,
    pub item_id: String,
    pub item_title: String,
    pub from_container_name: String,
    pub to_container_name: String,
    pub actor_id: String,
}

impl MoveEvent {
    pub fn card_moved(
        card: &Item,
        from_container_name: &str,
        to_container_name: &str,
        actor_id: &str,
    ) -> Self {
        Self {
            kind: CARD_MOVED.to_string(),
            item_id: card.id.clone(),
            item_title: card.title.clone(),
            from_container_name: from_container_name.to_string(),
            to_container_name: to_container_name.to_string(),
            actor_id: actor_id.to_string(),
        }
    }
}

pub struct ActivityNotifier<A: ActivityLog + 'static> {
    log: Rc<A>,
}

impl<A: ActivityLog + 'static> ActivityNotifier<A> {
    pub fn new(log: Rc<A>) -> Self {
        Self { log }
    }

    /// Send `event` on a local task; must be called inside a `LocalSet`
    pub fn notify(&self, event: MoveEvent) -> JoinHandle<()> {
        let log = Rc::clone(&self.log);
        tokio::task::spawn_local(async move {
            match log.log_move(&event).await {
                Ok(()) => tracing::debug!(item_id = %event.item_id, "move logged"),
                Err(e) => tracing::warn!(
                    item_id = %event.item_id,
                    error = %e,
                    "activity log failed, ignoring"
                ),
            }
        })
    }
}
