//! Row selection that survives page changes.

use std::collections::BTreeSet;

use crate::models::RecordId;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: BTreeSet<RecordId>,
}

impl Selection {
    pub fn contains(&self, id: &RecordId) -> bool {
        self.ids.contains(id)
    }

    /// Row checkbox.
    pub fn toggle(&mut self, id: RecordId) {
        if !self.ids.remove(&id) {
            self.ids.insert(id);
        }
    }

    pub fn insert(&mut self, id: RecordId) {
        self.ids.insert(id);
    }

    /// Header checkbox state for the rows on screen.
    pub fn all_selected(&self, visible: &[RecordId]) -> bool {
        !visible.is_empty() && visible.iter().all(|id| self.ids.contains(id))
    }

    /// Header checkbox: clears the visible rows when all of them are
    /// selected, otherwise selects all of them. Rows on other pages are
    /// never touched.
    pub fn toggle_all(&mut self, visible: &[RecordId]) {
        if self.all_selected(visible) {
            for id in visible {
                self.ids.remove(id);
            }
        } else {
            self.ids.extend(visible.iter().cloned());
        }
    }

    pub fn remove_all<'a>(&mut self, ids: impl IntoIterator<Item = &'a RecordId>) {
        for id in ids {
            self.ids.remove(id);
        }
    }

    /// Drop ids that are no longer in the collection.
    pub fn retain_known(&mut self, known: &BTreeSet<RecordId>) {
        self.ids.retain(|id| known.contains(id));
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn ids(&self) -> Vec<RecordId> {
        self.ids.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
