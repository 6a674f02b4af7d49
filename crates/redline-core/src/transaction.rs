//! Structured descriptions of applied edits, with position mapping.
//!
//! Every successful [`Document::apply`](crate::document::Document::apply)
//! produces a [`Transaction`]: the document lengths before/after plus the
//! ordered list of [`TextEdit`]s that were performed. Consumers that anchor
//! state to character offsets (tracked ranges, selections) fold their
//! positions through the transaction instead of diffing text.
//!
//! All offsets are **character offsets** into the pre-edit document, and each
//! edit is interpreted in application order.

use crate::document::CharRange;

/// One contiguous text change: at `start`, `deleted_text` was removed and
/// `inserted_text` was put in its place. Either side may be empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    /// Character offset of the change in the pre-edit document.
    pub start: usize,
    /// The exact text that was removed (empty for pure insertions).
    pub deleted_text: String,
    /// The exact text that was inserted (empty for pure deletions).
    pub inserted_text: String,
}

impl TextEdit {
    /// Create an edit record.
    pub fn new(start: usize, deleted_text: String, inserted_text: String) -> Self {
        Self {
            start,
            deleted_text,
            inserted_text,
        }
    }

    /// Number of characters removed.
    pub fn deleted_len(&self) -> usize {
        self.deleted_text.chars().count()
    }

    /// Number of characters inserted.
    pub fn inserted_len(&self) -> usize {
        self.inserted_text.chars().count()
    }

    /// End of the removed span in pre-edit offsets (`start` for insertions).
    pub fn end(&self) -> usize {
        self.start + self.deleted_len()
    }
}

/// Which side a mapped position sticks to when text is inserted exactly at it.
///
/// With `After`, an insertion at the position pushes it past the new text;
/// with `Before`, the position stays put. Mapping a tracked range maps its
/// start with `After` and its end with `Before`, so insertions at either
/// boundary fall *outside* the range while insertions strictly inside
/// grow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapBias {
    /// Stay before text inserted at the position.
    Before,
    /// Move after text inserted at the position.
    After,
}

/// Result of mapping a position through a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mapped {
    /// The position in post-edit offsets.
    pub pos: usize,
    /// `true` when the original position sat strictly inside deleted text.
    pub deleted: bool,
}

/// The record of one applied mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// Document length (chars) before the mutation.
    pub before_len: usize,
    /// Document length (chars) after the mutation.
    pub after_len: usize,
    /// The changes, in application order.
    pub edits: Vec<TextEdit>,
}

impl Transaction {
    /// A transaction that changed nothing.
    pub fn empty(len: usize) -> Self {
        Self {
            before_len: len,
            after_len: len,
            edits: Vec::new(),
        }
    }

    /// A transaction consisting of a single edit.
    pub fn single(before_len: usize, after_len: usize, edit: TextEdit) -> Self {
        Self {
            before_len,
            after_len,
            edits: vec![edit],
        }
    }

    /// `true` when the transaction performed no edits.
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Map a pre-edit position to its post-edit equivalent.
    ///
    /// The position is folded through every edit in order. For an edit at `s`
    /// deleting `d` characters and inserting `i`:
    ///
    /// - positions before `s` are unchanged;
    /// - positions past the deleted span shift by `i - d`;
    /// - a position exactly at a pure insertion point follows `bias`;
    /// - the edges of a deleted span collapse onto the replacement's edges;
    /// - positions strictly inside deleted text collapse to `s` and are
    ///   reported with `deleted = true`.
    pub fn map(&self, pos: usize, bias: MapBias) -> Mapped {
        let mut mapped = Mapped {
            pos,
            deleted: false,
        };
        for edit in &self.edits {
            let step = map_through_edit(mapped.pos, bias, edit);
            mapped.pos = step.pos;
            mapped.deleted |= step.deleted;
        }
        mapped
    }

    /// Map a range by mapping `from` with [`MapBias::After`] and `to` with
    /// [`MapBias::Before`].
    ///
    /// The result may be empty or crossed when the range's content was
    /// deleted; callers decide what survival means.
    pub fn map_range(&self, range: CharRange) -> CharRange {
        CharRange::new(
            self.map(range.from, MapBias::After).pos,
            self.map(range.to, MapBias::Before).pos,
        )
    }
}

fn map_through_edit(pos: usize, bias: MapBias, edit: &TextEdit) -> Mapped {
    let start = edit.start;
    let deleted = edit.deleted_len();
    let inserted = edit.inserted_len();

    if pos < start {
        return Mapped {
            pos,
            deleted: false,
        };
    }
    if pos > start + deleted {
        return Mapped {
            pos: pos - deleted + inserted,
            deleted: false,
        };
    }
    if deleted == 0 {
        // Pure insertion exactly at the position.
        let pos = match bias {
            MapBias::After => start + inserted,
            MapBias::Before => start,
        };
        return Mapped {
            pos,
            deleted: false,
        };
    }
    if pos == start {
        return Mapped {
            pos: start,
            deleted: false,
        };
    }
    if pos == start + deleted {
        return Mapped {
            pos: start + inserted,
            deleted: false,
        };
    }
    Mapped {
        pos: start,
        deleted: true,
    }
}
