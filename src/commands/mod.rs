//! Collaborator Bindings
//!
//! Traits for the store of record and the audit log, plus in-memory
//! implementations used by tests and demos.

mod memory;

use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::activity::MoveEvent;
use crate::error::{ActivityError, PersistError, SubscriptionError};
use crate::models::{Item, OrderUpdate, SnapshotScope};

pub use memory::{MemoryStore, RecordingActivityLog};

/// Push feed of snapshots; closing the channel ends the subscription
pub type SnapshotFeed = UnboundedReceiver<Result<Vec<Item>, SubscriptionError>>;

/// Store of record
#[async_trait(?Send)]
pub trait BoardPersistence {
    /// Subscribe to full snapshots of one list of a board
    async fn subscribe(
        &self,
        board_id: &str,
        scope: SnapshotScope,
    ) -> Result<SnapshotFeed, SubscriptionError>;

    /// Best-effort durable write of new orders (and container moves)
    async fn apply_order_updates(&self, updates: &[OrderUpdate]) -> Result<(), PersistError>;
}

/// Audit / activity log
#[async_trait(?Send)]
pub trait ActivityLog {
    async fn log_move(&self, event: &MoveEvent) -> Result<(), ActivityError>;
}
