//! Error Types
//!
//! One error enum per concern. The session boundary wraps them in `SessionError`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Common result type for reconciliation operations
pub type ReconcileResult<T> = Result<T, ReconcileError>;

/// Misuse of the sequencer or the drag state machine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReconcileError {
    #[error("Index out of range: {index} (list length {len})")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("Unknown item: {0}")]
    UnknownItem(String),
    #[error("A drag is already in progress for {0}")]
    AlreadyDragging(String),
    #[error("No drag in progress")]
    NotDragging,
    #[error("Drop reported for {got}, but {expected} is being dragged")]
    DragMismatch { expected: String, got: String },
}

/// Durable write rejected by the persistence collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
pub enum PersistError {
    #[error("Write rejected: {0}")]
    Rejected(String),
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Failure of the snapshot push channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
pub enum SubscriptionError {
    #[error("Access denied: {0}")]
    AccessDenied(String),
    #[error("Feed unavailable: {0}")]
    Unavailable(String),
}

/// Audit log failure (always swallowed by the notifier)
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ActivityError {
    #[error("Activity log failed: {0}")]
    Failed(String),
}

/// Configuration load or validation failure
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Errors surfaced by `BoardSession`
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
    #[error(transparent)]
    Subscription(#[from] SubscriptionError),
}
