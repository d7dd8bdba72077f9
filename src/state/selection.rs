//! Cursor position and multi-selection over the current view.
//!
//! The cursor is an index into the filtered view; chosen lines are tracked by
//! [`LineId`] so a choice survives re-filtering even while the line is hidden.

use crate::model::LineId;
use std::collections::BTreeSet;

/// Cursor plus the set of explicitly chosen lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    cursor: usize,
    chosen: BTreeSet<LineId>,
}

impl Selection {
    /// Start with the cursor at `cursor` and nothing chosen.
    pub fn new(cursor: usize) -> Self {
        Self {
            cursor,
            chosen: BTreeSet::new(),
        }
    }

    /// Cursor index into the current view.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Chosen line ids in input order.
    pub fn chosen(&self) -> &BTreeSet<LineId> {
        &self.chosen
    }

    /// Whether `id` is chosen.
    pub fn is_chosen(&self, id: LineId) -> bool {
        self.chosen.contains(&id)
    }

    /// Whether any line is chosen.
    pub fn has_chosen(&self) -> bool {
        !self.chosen.is_empty()
    }

    /// Pull the cursor back inside a view of `len` rows.
    ///
    /// An empty view leaves the cursor alone so it can reappear where it was.
    pub fn clamp(&mut self, len: usize) {
        if len > 0 && self.cursor >= len {
            self.cursor = len - 1;
        }
    }

    /// Move one row, wrapping at either end.
    pub fn step(&mut self, delta: isize, len: usize) {
        if len == 0 {
            return;
        }
        let len = len as isize;
        let current = (self.cursor as isize).min(len - 1);
        self.cursor = (current + delta).rem_euclid(len) as usize;
    }

    /// Move a page of rows, stopping at either end.
    pub fn page(&mut self, delta: isize, len: usize) {
        if len == 0 {
            return;
        }
        let target = (self.cursor as isize).saturating_add(delta);
        self.cursor = target.clamp(0, len as isize - 1) as usize;
    }

    /// Flip the chosen state of `id`.
    pub fn toggle(&mut self, id: LineId) {
        if !self.chosen.remove(&id) {
            self.chosen.insert(id);
        }
    }

    /// Choose every id yielded.
    pub fn choose_all(&mut self, ids: impl IntoIterator<Item = LineId>) {
        self.chosen.extend(ids);
    }

    /// Forget every choice.
    pub fn clear(&mut self) {
        self.chosen.clear();
    }

    /// Drop choices that no longer exist in the buffer.
    pub fn retain(&mut self, mut keep: impl FnMut(LineId) -> bool) {
        self.chosen.retain(|id| keep(*id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_wraps_in_both_directions() {
        let mut sel = Selection::new(0);
        sel.step(-1, 3);
        assert_eq!(sel.cursor(), 2, "moving up from the top wraps to the bottom");
        sel.step(1, 3);
        assert_eq!(sel.cursor(), 0, "moving down from the bottom wraps to the top");
    }

    #[test]
    fn step_on_empty_view_is_noop() {
        let mut sel = Selection::new(4);
        sel.step(1, 0);
        assert_eq!(sel.cursor(), 4);
    }

    #[test]
    fn page_stops_at_edges() {
        let mut sel = Selection::new(2);
        sel.page(10, 5);
        assert_eq!(sel.cursor(), 4);
        sel.page(-10, 5);
        assert_eq!(sel.cursor(), 0);
    }

    #[test]
    fn clamp_only_applies_to_non_empty_views() {
        let mut sel = Selection::new(9);
        sel.clamp(0);
        assert_eq!(sel.cursor(), 9);
        sel.clamp(3);
        assert_eq!(sel.cursor(), 2);
    }

    #[test]
    fn toggle_adds_then_removes() {
        let mut sel = Selection::default();
        sel.toggle(LineId::new(5));
        assert!(sel.is_chosen(LineId::new(5)));
        sel.toggle(LineId::new(5));
        assert!(!sel.has_chosen());
    }

    #[test]
    fn chosen_iterates_in_input_order() {
        let mut sel = Selection::default();
        sel.choose_all([LineId::new(9), LineId::new(1), LineId::new(4)]);
        let order: Vec<u64> = sel.chosen().iter().map(|id| id.get()).collect();
        assert_eq!(order, vec![1, 4, 9]);
    }

    #[test]
    fn retain_drops_evicted_ids() {
        let mut sel = Selection::default();
        sel.choose_all([LineId::new(0), LineId::new(1), LineId::new(2)]);
        sel.retain(|id| id.get() >= 1);
        assert_eq!(sel.chosen().len(), 2);
    }
}
