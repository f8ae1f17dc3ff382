//! Card Selection
//!
//! Multi-select set of card ids, kept in the order they were picked.

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    ids: Vec<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a card to the selection
    pub fn select(&mut self, id: &str) {
        if !self.contains(id) {
            self.ids.push(id.to_string());
        }
    }

    /// Add or remove a card (ctrl-click)
    pub fn toggle(&mut self, id: &str) {
        if self.contains(id) {
            self.ids.retain(|selected| selected != id);
        } else {
            self.ids.push(id.to_string());
        }
    }

    /// Prepare the selection for dragging `id`
    ///
    /// An unselected card collapses the selection to itself; a card that is
    /// already part of the selection keeps it. Returns `true` if it collapsed.
    pub fn collapse_for_drag(&mut self, id: &str) -> bool {
        if self.contains(id) {
            return false;
        }
        self.ids.clear();
        self.ids.push(id.to_string());
        true
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|selected| selected == id)
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
