//! Inline highlight data model for tracked ranges.
//!
//! The engine describes *what* to decorate, never how it looks: renderers map
//! each [`HighlightKind`] to their own visual style (background tint,
//! underline, animation). Offsets are half-open character ranges, like every
//! other range in this crate.

use crate::document::CharRange;

/// Visual flavor of a tracked-range highlight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightKind {
    /// A range waiting for a suggestion interaction to finish.
    Pending,
    /// A range whose suggestion is currently being produced.
    Loading,
}

/// One renderable highlight over a document range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeHighlight {
    /// The decorated span, already clamped to the document.
    pub range: CharRange,
    /// Which style class to render.
    pub kind: HighlightKind,
}

impl RangeHighlight {
    /// Create a highlight over `range`.
    pub fn new(range: CharRange, kind: HighlightKind) -> Self {
        Self { range, kind }
    }
}
