//! Rope-backed document substrate.
//!
//! Stores the text being edited and applies offset-addressed edits. All public
//! inputs/outputs use **character offsets** (Unicode scalar values, `char`),
//! not byte offsets, and ranges are half-open `[from, to)`.
//!
//! Every successful mutation returns a [`Transaction`](crate::transaction::Transaction)
//! describing exactly what changed, so downstream state (tracked ranges,
//! selections) can be remapped without diffing.

use ropey::Rope;
use thiserror::Error;
use unicode_width::UnicodeWidthChar;

use crate::transaction::{TextEdit, Transaction};

/// Default tab stop width used for visual column measurement.
pub const DEFAULT_TAB_WIDTH: usize = 4;

/// A half-open range of character offsets `[from, to)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CharRange {
    /// Inclusive start offset.
    pub from: usize,
    /// Exclusive end offset.
    pub to: usize,
}

impl CharRange {
    /// Create a range from start/end offsets.
    pub fn new(from: usize, to: usize) -> Self {
        Self { from, to }
    }

    /// Number of characters covered by the range.
    pub fn len(&self) -> usize {
        self.to.saturating_sub(self.from)
    }

    /// `true` when the range covers no characters (including crossed ends).
    pub fn is_empty(&self) -> bool {
        self.to <= self.from
    }

    /// `true` when `other` lies entirely inside this range, end-inclusive.
    ///
    /// End-inclusive containment means a caret sitting exactly on `to` still
    /// counts as inside, which is the guard used when attaching a tracked
    /// range to the current selection.
    pub fn encloses(&self, other: CharRange) -> bool {
        self.from <= other.from && other.to <= self.to
    }

    /// Clamp both ends to `len`, preserving order.
    pub fn clamp_to(&self, len: usize) -> CharRange {
        let from = self.from.min(len);
        let to = self.to.min(len);
        CharRange { from, to: to.max(from) }
    }
}

/// Line ending style of a document.
///
/// Text is normalized to `\n` in memory; the detected style is reapplied when
/// producing text for saving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    /// Unix style (`\n`).
    #[default]
    Lf,
    /// Windows style (`\r\n`).
    Crlf,
}

impl LineEnding {
    /// Detect the ending style from raw text. The first `\r\n` wins; text
    /// without any `\r\n` is treated as LF.
    pub fn detect(text: &str) -> Self {
        if text.contains("\r\n") {
            LineEnding::Crlf
        } else {
            LineEnding::Lf
        }
    }

    /// The literal ending sequence.
    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::Crlf => "\r\n",
        }
    }
}

/// An offset-addressed edit request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    /// Insert `text` before the character at `at`.
    Insert {
        /// Insertion offset, `0..=len_chars`.
        at: usize,
        /// Text to insert.
        text: String,
    },
    /// Remove the characters in `range`.
    Delete {
        /// Range to remove.
        range: CharRange,
    },
    /// Replace the characters in `range` with `text`.
    Replace {
        /// Range to replace.
        range: CharRange,
        /// Replacement text.
        text: String,
    },
}

/// Errors from applying an [`Edit`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DocumentError {
    #[error("invalid offset {offset} (document has {len} characters)")]
    /// An offset lies past the end of the document.
    InvalidOffset {
        /// The rejected offset.
        offset: usize,
        /// Document length at the time of the edit.
        len: usize,
    },

    #[error("invalid range {from}..{to} (document has {len} characters)")]
    /// A range is crossed or extends past the end of the document.
    InvalidRange {
        /// Start offset of the rejected range.
        from: usize,
        /// End offset of the rejected range.
        to: usize,
        /// Document length at the time of the edit.
        len: usize,
    },
}

/// A text document addressed by character offsets.
///
/// Backed by a [`Rope`] for O(log N) edits and line lookups. Applying an edit
/// either mutates the document and returns the describing [`Transaction`], or
/// rejects it and leaves the document untouched.
#[derive(Debug, Clone)]
pub struct Document {
    rope: Rope,
    line_ending: LineEnding,
}

impl Document {
    /// Create a document from raw text. `\r\n` sequences are normalized to
    /// `\n`; the detected ending style is kept for [`Self::text_for_saving`].
    pub fn new(text: &str) -> Self {
        let line_ending = LineEnding::detect(text);
        let normalized;
        let text = if matches!(line_ending, LineEnding::Crlf) {
            normalized = text.replace("\r\n", "\n");
            normalized.as_str()
        } else {
            text
        };
        Self {
            rope: Rope::from_str(text),
            line_ending,
        }
    }

    /// Create an empty document with LF endings.
    pub fn empty() -> Self {
        Self {
            rope: Rope::new(),
            line_ending: LineEnding::Lf,
        }
    }

    /// Total number of characters.
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Total number of lines. An empty document has one (empty) line.
    pub fn len_lines(&self) -> usize {
        self.rope.len_lines()
    }

    /// `true` when the document contains no characters.
    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// The detected line ending style.
    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    /// The full text with in-memory (`\n`) endings.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// The full text with the document's detected line endings reapplied.
    pub fn text_for_saving(&self) -> String {
        let text = self.rope.to_string();
        match self.line_ending {
            LineEnding::Lf => text,
            LineEnding::Crlf => text.replace('\n', "\r\n"),
        }
    }

    /// Text of line `index` without its trailing newline, or `None` when the
    /// line does not exist.
    pub fn line_text(&self, index: usize) -> Option<String> {
        if index >= self.rope.len_lines() {
            return None;
        }
        let mut text = self.rope.line(index).to_string();
        if text.ends_with('\n') {
            text.pop();
        }
        Some(text)
    }

    /// Exact text of `range`, clamped to the document.
    pub fn slice(&self, range: CharRange) -> String {
        let range = range.clamp_to(self.rope.len_chars());
        if range.is_empty() {
            return String::new();
        }
        self.rope.slice(range.from..range.to).to_string()
    }

    /// Plain-text snapshot of `[from, to)` with line breaks replaced by
    /// single spaces.
    ///
    /// This is the "word-joined" form used to seed an overlay from a
    /// multi-line selection: the visual line structure is irrelevant to a
    /// rewrite request, but word boundaries must survive.
    pub fn text_between(&self, from: usize, to: usize) -> String {
        let slice = self.slice(CharRange::new(from, to));
        if !slice.contains('\n') {
            return slice;
        }
        slice.split('\n').collect::<Vec<_>>().join(" ")
    }

    /// Line index containing `offset` (clamped to the document end).
    pub fn line_of_offset(&self, offset: usize) -> usize {
        self.rope.char_to_line(offset.min(self.rope.len_chars()))
    }

    /// Character offset of the first character of line `index`, clamped to
    /// the document end for out-of-range lines.
    pub fn offset_of_line(&self, index: usize) -> usize {
        if index >= self.rope.len_lines() {
            return self.rope.len_chars();
        }
        self.rope.line_to_char(index)
    }

    /// Visual column of `offset` within its line, measured in terminal cells.
    ///
    /// Width follows UAX #11 via `unicode-width`; `'\t'` advances to the next
    /// tab stop of `tab_width`.
    pub fn visual_column_at(&self, offset: usize, tab_width: usize) -> usize {
        let offset = offset.min(self.rope.len_chars());
        let line_start = self.rope.line_to_char(self.rope.char_to_line(offset));
        let mut column = 0;
        for ch in self.rope.slice(line_start..offset).chars() {
            column += cell_width_at(ch, column, tab_width);
        }
        column
    }

    /// Line index and visual column of `offset`, as one grid point.
    ///
    /// The form consumed by overlay anchoring and cursor placement; combines
    /// [`Self::line_of_offset`] and [`Self::visual_column_at`].
    pub fn point_at(&self, offset: usize, tab_width: usize) -> (usize, usize) {
        (
            self.line_of_offset(offset),
            self.visual_column_at(offset, tab_width),
        )
    }

    /// Apply one edit, returning the transaction that describes it.
    ///
    /// Rejected edits leave the document untouched. Edits that would change
    /// nothing (empty insertion, empty deletion) succeed with an empty
    /// transaction.
    pub fn apply(&mut self, edit: &Edit) -> Result<Transaction, DocumentError> {
        let before_len = self.rope.len_chars();
        match edit {
            Edit::Insert { at, text } => {
                if *at > before_len {
                    return Err(DocumentError::InvalidOffset {
                        offset: *at,
                        len: before_len,
                    });
                }
                if text.is_empty() {
                    return Ok(Transaction::empty(before_len));
                }
                self.rope.insert(*at, text);
                Ok(Transaction::single(
                    before_len,
                    self.rope.len_chars(),
                    TextEdit::new(*at, String::new(), text.clone()),
                ))
            }
            Edit::Delete { range } => {
                self.check_range(*range, before_len)?;
                if range.len() == 0 {
                    return Ok(Transaction::empty(before_len));
                }
                let deleted = self.rope.slice(range.from..range.to).to_string();
                self.rope.remove(range.from..range.to);
                Ok(Transaction::single(
                    before_len,
                    self.rope.len_chars(),
                    TextEdit::new(range.from, deleted, String::new()),
                ))
            }
            Edit::Replace { range, text } => {
                self.check_range(*range, before_len)?;
                if range.len() == 0 && text.is_empty() {
                    return Ok(Transaction::empty(before_len));
                }
                let deleted = self.rope.slice(range.from..range.to).to_string();
                self.rope.remove(range.from..range.to);
                self.rope.insert(range.from, text);
                Ok(Transaction::single(
                    before_len,
                    self.rope.len_chars(),
                    TextEdit::new(range.from, deleted, text.clone()),
                ))
            }
        }
    }

    fn check_range(&self, range: CharRange, len: usize) -> Result<(), DocumentError> {
        if range.from > range.to || range.to > len {
            return Err(DocumentError::InvalidRange {
                from: range.from,
                to: range.to,
                len,
            });
        }
        Ok(())
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::empty()
    }
}

/// Visual width (in cells) of `ch` when it starts at `cell_offset` in its
/// line. `'\t'` advances to the next tab stop; other widths follow UAX #11.
pub fn cell_width_at(ch: char, cell_offset: usize, tab_width: usize) -> usize {
    if ch == '\t' {
        let tab_width = tab_width.max(1);
        tab_width - (cell_offset % tab_width)
    } else {
        UnicodeWidthChar::width(ch).unwrap_or(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_range_basics() {
        let range = CharRange::new(3, 7);
        assert_eq!(range.len(), 4);
        assert!(!range.is_empty());
        assert!(CharRange::new(5, 5).is_empty());
        assert!(CharRange::new(7, 3).is_empty());
    }

    #[test]
    fn test_char_range_encloses_is_end_inclusive() {
        let range = CharRange::new(2, 8);
        assert!(range.encloses(CharRange::new(2, 8)));
        assert!(range.encloses(CharRange::new(4, 8)));
        assert!(range.encloses(CharRange::new(8, 8)));
        assert!(!range.encloses(CharRange::new(1, 8)));
        assert!(!range.encloses(CharRange::new(2, 9)));
    }

    #[test]
    fn test_char_range_clamp() {
        assert_eq!(CharRange::new(3, 12).clamp_to(8), CharRange::new(3, 8));
        assert_eq!(CharRange::new(10, 12).clamp_to(8), CharRange::new(8, 8));
        assert_eq!(CharRange::new(1, 4).clamp_to(8), CharRange::new(1, 4));
    }

    #[test]
    fn test_new_normalizes_crlf() {
        let doc = Document::new("one\r\ntwo\r\n");
        assert_eq!(doc.text(), "one\ntwo\n");
        assert_eq!(doc.line_ending(), LineEnding::Crlf);
        assert_eq!(doc.text_for_saving(), "one\r\ntwo\r\n");
    }

    #[test]
    fn test_lf_document_round_trips() {
        let doc = Document::new("one\ntwo");
        assert_eq!(doc.line_ending(), LineEnding::Lf);
        assert_eq!(doc.text_for_saving(), "one\ntwo");
    }

    #[test]
    fn test_line_text_strips_newline() {
        let doc = Document::new("alpha\nbeta\n");
        assert_eq!(doc.line_text(0), Some("alpha".to_string()));
        assert_eq!(doc.line_text(1), Some("beta".to_string()));
        // Trailing newline yields a final empty line.
        assert_eq!(doc.line_text(2), Some(String::new()));
        assert_eq!(doc.line_text(3), None);
    }

    #[test]
    fn test_slice_clamps() {
        let doc = Document::new("hello");
        assert_eq!(doc.slice(CharRange::new(1, 3)), "el");
        assert_eq!(doc.slice(CharRange::new(3, 99)), "lo");
        assert_eq!(doc.slice(CharRange::new(9, 12)), "");
    }

    #[test]
    fn test_text_between_joins_lines_with_spaces() {
        let doc = Document::new("first line\nsecond\nthird");
        assert_eq!(doc.text_between(6, 17), "line second");
        assert_eq!(doc.text_between(0, doc.len_chars()), "first line second third");
        assert_eq!(doc.text_between(2, 5), "rst");
    }

    #[test]
    fn test_apply_insert() {
        let mut doc = Document::new("hold");
        let txn = doc.apply(&Edit::Insert { at: 3, text: "!".to_string() }).unwrap();
        assert_eq!(doc.text(), "hol!d");
        assert_eq!(txn.before_len, 4);
        assert_eq!(txn.after_len, 5);
        assert_eq!(txn.edits.len(), 1);
        assert_eq!(txn.edits[0].start, 3);
        assert_eq!(txn.edits[0].inserted_text, "!");
        assert!(txn.edits[0].deleted_text.is_empty());
    }

    #[test]
    fn test_apply_delete_captures_removed_text() {
        let mut doc = Document::new("hello world");
        let txn = doc.apply(&Edit::Delete { range: CharRange::new(5, 11) }).unwrap();
        assert_eq!(doc.text(), "hello");
        assert_eq!(txn.edits[0].deleted_text, " world");
    }

    #[test]
    fn test_apply_replace() {
        let mut doc = Document::new("say hello world");
        let txn = doc
            .apply(&Edit::Replace {
                range: CharRange::new(4, 15),
                text: "hi there".to_string(),
            })
            .unwrap();
        assert_eq!(doc.text(), "say hi there");
        assert_eq!(txn.before_len, 15);
        assert_eq!(txn.after_len, 12);
        assert_eq!(txn.edits[0].deleted_text, "hello world");
        assert_eq!(txn.edits[0].inserted_text, "hi there");
    }

    #[test]
    fn test_apply_rejects_out_of_bounds() {
        let mut doc = Document::new("short");
        let err = doc
            .apply(&Edit::Insert { at: 9, text: "x".to_string() })
            .unwrap_err();
        assert_eq!(err, DocumentError::InvalidOffset { offset: 9, len: 5 });

        let err = doc
            .apply(&Edit::Delete { range: CharRange::new(2, 9) })
            .unwrap_err();
        assert_eq!(err, DocumentError::InvalidRange { from: 2, to: 9, len: 5 });

        let err = doc
            .apply(&Edit::Replace { range: CharRange::new(4, 2), text: String::new() })
            .unwrap_err();
        assert_eq!(err, DocumentError::InvalidRange { from: 4, to: 2, len: 5 });

        // Rejected edits leave the text untouched.
        assert_eq!(doc.text(), "short");
    }

    #[test]
    fn test_apply_no_op_yields_empty_transaction() {
        let mut doc = Document::new("text");
        let txn = doc.apply(&Edit::Insert { at: 2, text: String::new() }).unwrap();
        assert!(txn.is_empty());
        let txn = doc.apply(&Edit::Delete { range: CharRange::new(3, 3) }).unwrap();
        assert!(txn.is_empty());
        assert_eq!(doc.text(), "text");
    }

    #[test]
    fn test_char_offsets_not_bytes() {
        let mut doc = Document::new("héllo");
        assert_eq!(doc.len_chars(), 5);
        let txn = doc
            .apply(&Edit::Replace { range: CharRange::new(1, 2), text: "e".to_string() })
            .unwrap();
        assert_eq!(doc.text(), "hello");
        assert_eq!(txn.edits[0].deleted_text, "é");
    }

    #[test]
    fn test_visual_column_counts_cells() {
        let doc = Document::new("ab你好c");
        // 'a' and 'b' are 1 cell each, CJK chars are 2.
        assert_eq!(doc.visual_column_at(2, DEFAULT_TAB_WIDTH), 2);
        assert_eq!(doc.visual_column_at(4, DEFAULT_TAB_WIDTH), 6);
        assert_eq!(doc.visual_column_at(5, DEFAULT_TAB_WIDTH), 7);
    }

    #[test]
    fn test_visual_column_tab_stops() {
        let doc = Document::new("a\tb");
        assert_eq!(doc.visual_column_at(1, 4), 1);
        // Tab advances from column 1 to the next stop at 4.
        assert_eq!(doc.visual_column_at(2, 4), 4);
        assert_eq!(doc.visual_column_at(3, 4), 5);
    }

    #[test]
    fn test_visual_column_resets_per_line() {
        let doc = Document::new("long first line\nxy");
        assert_eq!(doc.visual_column_at(18, DEFAULT_TAB_WIDTH), 2);
        assert_eq!(doc.line_of_offset(18), 1);
    }

    #[test]
    fn test_point_at_pairs_line_and_column() {
        let doc = Document::new("你好 ok\nsecond");
        assert_eq!(doc.point_at(4, DEFAULT_TAB_WIDTH), (0, 6));
        assert_eq!(doc.point_at(6, DEFAULT_TAB_WIDTH), (1, 0));
        assert_eq!(doc.point_at(99, DEFAULT_TAB_WIDTH), (1, 6));
    }

    #[test]
    fn test_offset_of_line() {
        let doc = Document::new("ab\ncd\nef");
        assert_eq!(doc.offset_of_line(0), 0);
        assert_eq!(doc.offset_of_line(1), 3);
        assert_eq!(doc.offset_of_line(2), 6);
        assert_eq!(doc.offset_of_line(9), doc.len_chars());
    }
}
