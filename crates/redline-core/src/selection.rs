//! Offset-based selection model.
//!
//! A selection is an `anchor`/`head` pair of character offsets; `head` is the
//! moving end. Most consumers only care about the ordered `min()`/`max()`
//! span, so helpers are directionless. Selections survive edits by being
//! remapped through the [`Transaction`](crate::transaction::Transaction) that
//! describes them.

use unicode_segmentation::UnicodeSegmentation;

use crate::document::{CharRange, Document};
use crate::transaction::{MapBias, Transaction};

/// A selection between two character offsets. `anchor == head` is a caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    /// The fixed end.
    pub anchor: usize,
    /// The moving end.
    pub head: usize,
}

impl Selection {
    /// Selection spanning `anchor..head` (either order).
    pub fn new(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    /// Zero-width selection at `offset`.
    pub fn caret(offset: usize) -> Self {
        Self {
            anchor: offset,
            head: offset,
        }
    }

    /// The smaller offset.
    pub fn min(&self) -> usize {
        self.anchor.min(self.head)
    }

    /// The larger offset.
    pub fn max(&self) -> usize {
        self.anchor.max(self.head)
    }

    /// `true` for a caret.
    pub fn is_empty(&self) -> bool {
        self.anchor == self.head
    }

    /// The ordered span as a half-open range.
    pub fn range(&self) -> CharRange {
        CharRange::new(self.min(), self.max())
    }

    /// Clamp both ends to `len`.
    pub fn clamp_to(&self, len: usize) -> Selection {
        Selection {
            anchor: self.anchor.min(len),
            head: self.head.min(len),
        }
    }

    /// Remap both ends through an applied transaction.
    ///
    /// Uses [`MapBias::After`], so typing at a caret keeps the caret after
    /// the inserted text.
    pub fn map_through(&self, txn: &Transaction) -> Selection {
        Selection {
            anchor: txn.map(self.anchor, MapBias::After).pos,
            head: txn.map(self.head, MapBias::After).pos,
        }
    }

    /// Expand the selection to word boundaries.
    ///
    /// Both ends snap outward to the Unicode word segment they touch. A caret
    /// selects the word under it, falling back to the word ending at it; a
    /// caret in whitespace with no adjacent word is returned unchanged.
    /// The result is always anchor-before-head.
    pub fn expand_to_words(&self, doc: &Document) -> Selection {
        let text = doc.text();
        let segments = word_segments(&text);
        let min = self.min().min(doc.len_chars());
        let max = self.max().min(doc.len_chars());

        if min == max {
            if let Some(seg) = segments.iter().find(|s| s.is_word && s.start <= min && min < s.end) {
                return Selection::new(seg.start, seg.end);
            }
            if let Some(seg) = segments.iter().find(|s| s.is_word && s.end == min) {
                return Selection::new(seg.start, seg.end);
            }
            return *self;
        }

        let start = segments
            .iter()
            .find(|s| s.is_word && s.start <= min && min < s.end)
            .map(|s| s.start)
            .unwrap_or(min);
        let end = segments
            .iter()
            .find(|s| s.is_word && s.start < max && max <= s.end)
            .map(|s| s.end)
            .unwrap_or(max);
        Selection::new(start, end)
    }
}

struct WordSegment {
    start: usize,
    end: usize,
    is_word: bool,
}

/// Split `text` into word-bound segments measured in character offsets.
fn word_segments(text: &str) -> Vec<WordSegment> {
    let mut segments = Vec::new();
    let mut offset = 0;
    for seg in text.split_word_bounds() {
        let len = seg.chars().count();
        segments.push(WordSegment {
            start: offset,
            end: offset + len,
            is_word: seg.chars().any(|c| c.is_alphanumeric()),
        });
        offset += len;
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Edit;

    #[test]
    fn test_min_max_and_direction() {
        let forward = Selection::new(2, 7);
        let backward = Selection::new(7, 2);
        assert_eq!(forward.min(), 2);
        assert_eq!(forward.max(), 7);
        assert_eq!(backward.min(), 2);
        assert_eq!(backward.max(), 7);
        assert_eq!(forward.range(), backward.range());
    }

    #[test]
    fn test_caret_is_empty() {
        assert!(Selection::caret(4).is_empty());
        assert!(!Selection::new(4, 5).is_empty());
    }

    #[test]
    fn test_clamp() {
        assert_eq!(Selection::new(3, 12).clamp_to(6), Selection::new(3, 6));
    }

    #[test]
    fn test_map_through_insert_and_delete() {
        let mut doc = Document::new("hello world");
        let sel = Selection::new(6, 11);

        let txn = doc
            .apply(&Edit::Insert { at: 0, text: ">> ".to_string() })
            .unwrap();
        let sel = sel.map_through(&txn);
        assert_eq!(sel, Selection::new(9, 14));

        let txn = doc
            .apply(&Edit::Delete { range: CharRange::new(0, 3) })
            .unwrap();
        let sel = sel.map_through(&txn);
        assert_eq!(sel, Selection::new(6, 11));
    }

    #[test]
    fn test_caret_maps_after_typed_text() {
        let mut doc = Document::new("ab");
        let caret = Selection::caret(1);
        let txn = doc
            .apply(&Edit::Insert { at: 1, text: "xyz".to_string() })
            .unwrap();
        assert_eq!(caret.map_through(&txn), Selection::caret(4));
    }

    #[test]
    fn test_expand_caret_inside_word() {
        let doc = Document::new("say hello world");
        let sel = Selection::caret(6).expand_to_words(&doc);
        assert_eq!(sel, Selection::new(4, 9));
        assert_eq!(doc.slice(sel.range()), "hello");
    }

    #[test]
    fn test_expand_caret_at_word_end() {
        let doc = Document::new("say hello world");
        let sel = Selection::caret(9).expand_to_words(&doc);
        assert_eq!(doc.slice(sel.range()), "hello");
    }

    #[test]
    fn test_expand_caret_in_plain_whitespace() {
        let doc = Document::new("   ");
        assert_eq!(Selection::caret(1).expand_to_words(&doc), Selection::caret(1));
    }

    #[test]
    fn test_expand_partial_span_covers_both_words() {
        let doc = Document::new("alpha beta gamma");
        // "ha be" -> "alpha beta"
        let sel = Selection::new(3, 8).expand_to_words(&doc);
        assert_eq!(doc.slice(sel.range()), "alpha beta");
    }

    #[test]
    fn test_expand_handles_unicode_words() {
        let doc = Document::new("naïve café");
        let sel = Selection::caret(2).expand_to_words(&doc);
        assert_eq!(doc.slice(sel.range()), "naïve");
    }
}
