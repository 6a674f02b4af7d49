//! Suggestion overlay session data.
//!
//! An [`OverlaySession`] is the ephemeral state behind the floating
//! suggestion UI: what text the user picked, where the overlay is anchored,
//! and which document range the pick covered. One session exists per
//! interaction; it is created on open and dropped on close.
//!
//! The captured `range` is a snapshot taken at open time and is *not*
//! remapped while the overlay stays open. Acceptance re-validates it against
//! the then-current document, which is the defense against edits that happen
//! underneath an open overlay.

use crate::document::CharRange;

/// A position in the render grid: visual column `x`, line `y`.
///
/// Coordinates are text-grid cells, not pixels; graphical hosts scale them
/// with their font metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScreenPoint {
    /// Visual column (cells from the line start).
    pub x: usize,
    /// Line index.
    pub y: usize,
}

impl ScreenPoint {
    /// Create a point from column/line.
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// State of one open suggestion overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlaySession {
    /// The selected text captured at open time, word-joined across lines.
    pub selected_text: String,
    /// Where the overlay is anchored (the selection end at open time).
    pub anchor: ScreenPoint,
    /// The document range the selection covered at open time, if any.
    pub range: Option<CharRange>,
    /// `true` while the suggestion for this overlay is being produced.
    pub loading: bool,
}

/// Optional presets for opening an overlay directly.
///
/// [`EditSession::open_overlay`](crate::session::EditSession::open_overlay)
/// fills unset fields with empty defaults; the selection-driven path
/// ([`try_open_from_selection`](crate::session::EditSession::try_open_from_selection))
/// captures them from the document instead.
#[derive(Debug, Clone, Default)]
pub struct OverlayOptions {
    /// Anchor override; defaults to the origin.
    pub anchor: Option<ScreenPoint>,
    /// Preset selected text; defaults to empty.
    pub selected_text: Option<String>,
    /// Preset captured range; defaults to none.
    pub range: Option<CharRange>,
}
