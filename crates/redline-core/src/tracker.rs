//! Tracked suggestion-range state machine.
//!
//! A [`SuggestionTracker`] owns at most one document range that a suggestion
//! interaction is working over. The range follows the document through edits
//! (via transaction mapping) and disappears the moment it stops denoting the
//! text the user picked: collapsed, crossed, or out of bounds means
//! deactivated, not "approximately still there".
//!
//! States: inactive (no range), active idle, active loading. `loading` exists
//! only while active; deactivating from any state is always legal and always
//! lands in the same inactive state.

use crate::document::CharRange;
use crate::highlight::{HighlightKind, RangeHighlight};
use crate::selection::Selection;
use crate::transaction::Transaction;

/// The range a tracker is currently holding, plus its loading flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackedRange {
    range: CharRange,
    loading: bool,
}

impl TrackedRange {
    /// The tracked span.
    pub fn range(&self) -> CharRange {
        self.range
    }

    /// `true` while a suggestion for this range is being produced.
    pub fn is_loading(&self) -> bool {
        self.loading
    }
}

/// Tracks one suggestion range through document edits.
///
/// All mutation goes through the methods here; there is no way to hold an
/// active tracker with a crossed range or a loading flag without a range.
#[derive(Debug, Clone, Default)]
pub struct SuggestionTracker {
    state: Option<TrackedRange>,
}

impl SuggestionTracker {
    /// A tracker with no active range.
    pub fn new() -> Self {
        Self { state: None }
    }

    /// `true` when a range is being tracked.
    pub fn is_active(&self) -> bool {
        self.state.is_some()
    }

    /// `true` when active and marked loading.
    pub fn is_loading(&self) -> bool {
        self.state.map(|s| s.loading).unwrap_or(false)
    }

    /// The tracked range, when active.
    pub fn range(&self) -> Option<CharRange> {
        self.state.map(|s| s.range)
    }

    /// The full tracked state, when active.
    pub fn tracked(&self) -> Option<TrackedRange> {
        self.state
    }

    /// Start tracking `range`, not loading.
    ///
    /// Rejects (resets to inactive and returns `false`) unless the range is
    /// ordered, fits the document, and end-inclusively contains the current
    /// `selection`. Activating over a foreign range would highlight text the
    /// user never picked, so a bad request clears rather than keeps any
    /// previous range.
    pub fn activate(&mut self, range: CharRange, selection: &Selection, doc_len: usize) -> bool {
        let valid = range.from <= range.to
            && range.to <= doc_len
            && range.encloses(selection.range());
        if !valid {
            self.state = None;
            return false;
        }
        self.state = Some(TrackedRange {
            range,
            loading: false,
        });
        true
    }

    /// Stop tracking. Always succeeds, from any state.
    pub fn deactivate(&mut self) {
        self.state = None;
    }

    /// Set the loading flag. No-op when inactive.
    pub fn set_loading(&mut self, loading: bool) {
        if let Some(state) = &mut self.state {
            state.loading = loading;
        }
    }

    /// Follow one applied transaction, deactivating when the range no longer
    /// denotes real text.
    ///
    /// The range's start maps with after-bias and its end with before-bias,
    /// so insertions at either boundary stay outside the range. A mapped
    /// range that is empty, crossed, or past the new document end means the
    /// tracked text is gone; the tracker silently deactivates.
    pub fn map_through(&mut self, txn: &Transaction) {
        let Some(state) = &mut self.state else {
            return;
        };
        let mapped = txn.map_range(state.range);
        if mapped.is_empty() || mapped.to > txn.after_len {
            self.state = None;
        } else {
            state.range = mapped;
        }
    }

    /// The highlight to render, when active.
    ///
    /// Both ends are clamped to `doc_len`; a range that clamps to nothing
    /// yields `None` rather than a zero-width decoration.
    pub fn highlight(&self, doc_len: usize) -> Option<RangeHighlight> {
        let state = self.state?;
        let range = state.range.clamp_to(doc_len);
        if range.is_empty() {
            return None;
        }
        let kind = if state.loading {
            HighlightKind::Loading
        } else {
            HighlightKind::Pending
        };
        Some(RangeHighlight::new(range, kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Document, Edit};

    fn active_tracker(from: usize, to: usize, doc_len: usize) -> SuggestionTracker {
        let mut tracker = SuggestionTracker::new();
        assert!(tracker.activate(
            CharRange::new(from, to),
            &Selection::new(from, to),
            doc_len
        ));
        tracker
    }

    #[test]
    fn test_new_tracker_is_inactive() {
        let tracker = SuggestionTracker::new();
        assert!(!tracker.is_active());
        assert!(!tracker.is_loading());
        assert_eq!(tracker.range(), None);
        assert_eq!(tracker.highlight(100), None);
    }

    #[test]
    fn test_activate_then_deactivate_round_trip() {
        let mut tracker = active_tracker(5, 10, 20);
        assert!(tracker.is_active());
        assert!(!tracker.is_loading());
        assert_eq!(tracker.range(), Some(CharRange::new(5, 10)));

        tracker.deactivate();
        assert!(!tracker.is_active());
        assert_eq!(tracker.range(), None);
        assert_eq!(tracker.highlight(20), None);
    }

    #[test]
    fn test_activate_rejects_selection_outside_range() {
        let mut tracker = SuggestionTracker::new();
        let ok = tracker.activate(CharRange::new(5, 10), &Selection::new(3, 8), 20);
        assert!(!ok);
        assert!(!tracker.is_active());
    }

    #[test]
    fn test_activate_rejection_clears_previous_range() {
        let mut tracker = active_tracker(5, 10, 20);
        let ok = tracker.activate(CharRange::new(0, 4), &Selection::new(2, 6), 20);
        assert!(!ok);
        assert!(!tracker.is_active());
    }

    #[test]
    fn test_activate_accepts_caret_on_range_edge() {
        let mut tracker = SuggestionTracker::new();
        // Containment is end-inclusive: a caret at `to` is still inside.
        assert!(tracker.activate(CharRange::new(5, 10), &Selection::caret(10), 20));
        assert!(tracker.activate(CharRange::new(5, 10), &Selection::caret(5), 20));
    }

    #[test]
    fn test_activate_rejects_bad_bounds() {
        let mut tracker = SuggestionTracker::new();
        assert!(!tracker.activate(CharRange::new(5, 30), &Selection::caret(6), 20));
        assert!(!tracker.activate(CharRange::new(10, 5), &Selection::caret(7), 20));
        assert!(!tracker.is_active());
    }

    #[test]
    fn test_activate_accepts_zero_width_range() {
        let mut tracker = SuggestionTracker::new();
        assert!(tracker.activate(CharRange::new(7, 7), &Selection::caret(7), 20));
        assert!(tracker.is_active());
        // Zero-width is trackable but renders nothing.
        assert_eq!(tracker.highlight(20), None);
    }

    #[test]
    fn test_loading_round_trip_preserves_range() {
        let mut tracker = active_tracker(5, 10, 20);
        tracker.set_loading(true);
        assert!(tracker.is_loading());
        assert_eq!(tracker.range(), Some(CharRange::new(5, 10)));
        tracker.set_loading(false);
        assert!(!tracker.is_loading());
        assert!(tracker.is_active());
        assert_eq!(tracker.range(), Some(CharRange::new(5, 10)));
    }

    #[test]
    fn test_set_loading_when_inactive_is_no_op() {
        let mut tracker = SuggestionTracker::new();
        tracker.set_loading(true);
        assert!(!tracker.is_active());
        assert!(!tracker.is_loading());
    }

    #[test]
    fn test_activation_resets_loading() {
        let mut tracker = active_tracker(5, 10, 20);
        tracker.set_loading(true);
        assert!(tracker.activate(CharRange::new(5, 10), &Selection::new(5, 10), 20));
        assert!(!tracker.is_loading());
    }

    #[test]
    fn test_map_through_keeps_shifted_range() {
        let mut doc = Document::new("0123456789012345");
        let mut tracker = active_tracker(5, 10, doc.len_chars());

        let txn = doc
            .apply(&Edit::Insert { at: 0, text: "ab".to_string() })
            .unwrap();
        tracker.map_through(&txn);
        assert_eq!(tracker.range(), Some(CharRange::new(7, 12)));
    }

    #[test]
    fn test_map_through_deactivates_on_full_deletion() {
        let mut doc = Document::new("0123456789012345");
        let mut tracker = active_tracker(5, 10, doc.len_chars());

        let txn = doc
            .apply(&Edit::Delete { range: CharRange::new(4, 12) })
            .unwrap();
        tracker.map_through(&txn);
        assert!(!tracker.is_active());
    }

    #[test]
    fn test_map_through_shrinks_on_partial_overlap() {
        let mut doc = Document::new("0123456789012345");
        let mut tracker = active_tracker(5, 10, doc.len_chars());

        let txn = doc
            .apply(&Edit::Delete { range: CharRange::new(8, 12) })
            .unwrap();
        tracker.map_through(&txn);
        assert!(tracker.is_active());
        assert_eq!(tracker.range(), Some(CharRange::new(5, 8)));
    }

    #[test]
    fn test_map_through_preserves_loading_flag() {
        let mut doc = Document::new("0123456789012345");
        let mut tracker = active_tracker(5, 10, doc.len_chars());
        tracker.set_loading(true);

        let txn = doc
            .apply(&Edit::Insert { at: 0, text: "x".to_string() })
            .unwrap();
        tracker.map_through(&txn);
        assert!(tracker.is_loading());
        assert_eq!(tracker.range(), Some(CharRange::new(6, 11)));
    }

    #[test]
    fn test_map_through_when_inactive_is_no_op() {
        let mut doc = Document::new("text");
        let mut tracker = SuggestionTracker::new();
        let txn = doc
            .apply(&Edit::Insert { at: 0, text: "x".to_string() })
            .unwrap();
        tracker.map_through(&txn);
        assert!(!tracker.is_active());
    }

    #[test]
    fn test_highlight_kind_follows_loading() {
        let mut tracker = active_tracker(5, 10, 20);
        let highlight = tracker.highlight(20).unwrap();
        assert_eq!(highlight.kind, HighlightKind::Pending);
        assert_eq!(highlight.range, CharRange::new(5, 10));

        tracker.set_loading(true);
        assert_eq!(tracker.highlight(20).unwrap().kind, HighlightKind::Loading);
    }

    #[test]
    fn test_highlight_clamps_to_document() {
        // Tracker state can outlive a shrink when callers skip map_through;
        // the render query still never yields out-of-bounds decorations.
        let tracker = active_tracker(5, 10, 20);
        let highlight = tracker.highlight(8).unwrap();
        assert_eq!(highlight.range, CharRange::new(5, 8));
        assert_eq!(tracker.highlight(4), None);
    }
}
