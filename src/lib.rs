//! Drag-and-drop reconciliation for a real-time Kanban board.
//!
//! A drop is applied to the local render store immediately and remembered as
//! a pending override, so snapshots pushed by the store of record cannot snap
//! the board back before the durable write lands.

pub mod activity;
pub mod clock;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod merge;
pub mod models;
pub mod pending;
pub mod reconciler;
pub mod selection;
pub mod sequencer;
pub mod session;
pub mod store;

pub use activity::{ActivityNotifier, MoveEvent};
pub use clock::{Clock, ManualClock, SystemClock};
pub use commands::{ActivityLog, BoardPersistence, MemoryStore, RecordingActivityLog, SnapshotFeed};
pub use config::ReconcileConfig;
pub use error::{
    ActivityError, ConfigError, PersistError, ReconcileError, ReconcileResult, SessionError,
    SubscriptionError,
};
pub use models::{DropResult, Item, ItemKind, Location, OrderUpdate, PendingUpdate, SnapshotScope};
pub use pending::{PendingOverride, PendingUpdateRegistry};
pub use reconciler::{DragPhase, DragReconciler, DropOutcome, WriteId, WriteOutcome, WriteTicket};
pub use session::{BoardSession, WriteHandle};
pub use store::BoardState;
