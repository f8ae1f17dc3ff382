//! Board Models
//!
//! Data structures shared with the store of record and the render layer.

use serde::{Deserialize, Serialize};

/// Whether an item is a card (lives in a column) or a column (lives on the board)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    #[default]
    Card,
    Column,
}

/// A card or a column as pushed by the store of record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    #[serde(default)]
    pub kind: ItemKind,
    /// Owning column (cards only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_id: Option<String>,
    /// Render order within the container, ascending
    pub order: f64,
    #[serde(default)]
    pub title: String,
}

impl Item {
    /// Create a card inside a column
    pub fn card(id: &str, container_id: &str, order: f64, title: &str) -> Self {
        Self {
            id: id.to_string(),
            kind: ItemKind::Card,
            container_id: Some(container_id.to_string()),
            order,
            title: title.to_string(),
        }
    }

    /// Create a column on the board
    pub fn column(id: &str, order: f64, title: &str) -> Self {
        Self {
            id: id.to_string(),
            kind: ItemKind::Column,
            container_id: None,
            order,
            title: title.to_string(),
        }
    }

    pub fn is_in(&self, container_id: &str) -> bool {
        self.container_id.as_deref() == Some(container_id)
    }
}

/// One entry of an `applyOrderUpdates` write
///
/// `container_id` is only present when the item changes container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderUpdate {
    pub id: String,
    pub order: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_id: Option<String>,
}

impl OrderUpdate {
    pub fn rank(id: &str, order: f64) -> Self {
        Self {
            id: id.to_string(),
            order,
            container_id: None,
        }
    }

    pub fn relocate(id: &str, order: f64, container_id: &str) -> Self {
        Self {
            id: id.to_string(),
            order,
            container_id: Some(container_id.to_string()),
        }
    }
}

/// A time-bounded local override for one item
///
/// Never persisted. `container_id` is `None` for columns.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingUpdate {
    pub item_id: String,
    pub order: f64,
    pub container_id: Option<String>,
    /// Unix epoch millis
    pub expires_at: i64,
}

/// A slot inside a container as reported by the gesture library
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// Column id for cards, board id for columns
    pub container_id: String,
    pub index: usize,
}

impl Location {
    pub fn new(container_id: &str, index: usize) -> Self {
        Self {
            container_id: container_id.to_string(),
            index,
        }
    }
}

/// Completed gesture handed over by the drag library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropResult {
    pub item_id: String,
    pub kind: ItemKind,
    pub source: Location,
    /// `None` when dropped outside any container
    pub destination: Option<Location>,
}

/// Which list of the board a snapshot feed carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnapshotScope {
    Columns,
    Cards,
}

impl SnapshotScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            SnapshotScope::Columns => "columns",
            SnapshotScope::Cards => "cards",
        }
    }
}
