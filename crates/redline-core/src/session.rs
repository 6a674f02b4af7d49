//! Edit session orchestration.
//!
//! [`EditSession`] is the engine's front door: it owns the open document, the
//! selection, the suggestion tracker, and the overlay slot, and it keeps them
//! consistent across every mutation. Hosts talk to the session; the parts
//! never reach around it to each other.
//!
//! Consistency rules enforced here:
//!
//! - every applied edit first remaps the tracked range, then the selection;
//! - user-flow failures emit exactly one [`Notice`] and never propagate;
//! - closing the overlay also drops the tracked range, so no highlight can
//!   outlive the interaction that created it;
//! - accepting a suggestion re-validates the captured range against the
//!   *current* document before touching it.
//!
//! # Examples
//!
//! ```
//! use redline_core::{AcceptOutcome, EditSession, Selection};
//!
//! let mut session = EditSession::new();
//! session.open_document("please say hello world today");
//! session.set_selection(Selection::new(11, 22));
//!
//! assert!(session.try_open_from_selection());
//! let request = session.accept_request("hi there");
//! let outcome = session.accept_suggestion(&request);
//!
//! assert!(matches!(outcome, AcceptOutcome::Applied { .. }));
//! assert_eq!(session.document().unwrap().text(), "please say hi there today");
//! ```

use thiserror::Error;

use crate::document::{CharRange, DEFAULT_TAB_WIDTH, Document, DocumentError, Edit};
use crate::highlight::RangeHighlight;
use crate::notice::{Notice, NoticeCallback};
use crate::overlay::{OverlayOptions, OverlaySession, ScreenPoint};
use crate::provider::SuggestionRequest;
use crate::selection::Selection;
use crate::tracker::SuggestionTracker;
use crate::transaction::Transaction;

/// Warning when a suggestion flow starts with no document open.
pub const NOTICE_NO_DOCUMENT: &str = "No document is loaded";
/// Error when a suggestion is accepted against a session with no document.
pub const NOTICE_EDITOR_INACTIVE: &str = "The editor is not active";
/// Error when a suggestion targets a document other than the open one.
pub const NOTICE_STALE_DOCUMENT: &str = "The suggestion does not match the open document";
/// Warning when the overlay is opened over an empty selection.
pub const NOTICE_NO_SELECTION: &str = "No text is selected";
/// Warning when a suggestion is accepted without captured text or range.
pub const NOTICE_NOTHING_SELECTED: &str = "No text was selected";
/// Error when a suggestion's captured range no longer fits the document.
pub const NOTICE_INVALID_RANGE: &str = "Invalid text range";
/// Error when the replacement edit itself is rejected by the document.
pub const NOTICE_APPLY_FAILED: &str = "Failed to apply the suggestion";
/// Success message after a suggestion is written into the document.
pub const NOTICE_APPLIED: &str = "Suggestion applied";

/// Identity of one opened document within a session.
///
/// Ids are never reused across `open_document` calls, so a stale id reliably
/// fails the accept-time identity check instead of aliasing a newer document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(pub u64);

/// Which aspect of session state a [`Change`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// A document was opened (replacing any previous one).
    DocumentOpened,
    /// The open document was closed.
    DocumentClosed,
    /// Document content changed.
    DocumentEdited,
    /// The selection moved.
    SelectionChanged,
    /// The tracked suggestion range appeared, moved, or disappeared.
    TrackerChanged,
    /// The overlay opened, closed, or changed its loading flag.
    OverlayChanged,
}

/// One state-change notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Change {
    /// What changed.
    pub kind: ChangeKind,
    /// Session version before the mutation.
    pub old_version: u64,
    /// Session version after the mutation.
    pub new_version: u64,
}

impl Change {
    /// Create a change record.
    pub fn new(kind: ChangeKind, old_version: u64, new_version: u64) -> Self {
        Self {
            kind,
            old_version,
            new_version,
        }
    }
}

/// Callback invoked for every state change.
pub type ChangeCallback = Box<dyn FnMut(&Change) + Send>;

/// Errors from session-level edit application.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("no document is open")]
    /// The session has no open document to edit.
    NoDocument,

    #[error(transparent)]
    /// The document rejected the edit.
    Document(#[from] DocumentError),
}

/// The payload of an accept action: what to write, and the snapshot of what
/// the overlay captured when it opened.
///
/// Built by hosts (or by [`EditSession::accept_request`]) and validated by
/// [`EditSession::accept_suggestion`] against the *current* session state,
/// which may have moved on since the overlay opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptRequest {
    /// The replacement text.
    pub suggestion: String,
    /// The document the suggestion was produced for.
    pub document: Option<DocumentId>,
    /// The range captured at overlay-open time.
    pub range: Option<CharRange>,
    /// The selected text captured at overlay-open time.
    pub selected_text: String,
}

/// What an accept action did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptOutcome {
    /// The suggestion was written over `range` (post-edit offsets).
    Applied {
        /// Where the replacement text now lives.
        range: CharRange,
    },
    /// The request failed validation or application; a notice said why.
    Rejected,
}

/// The engine's orchestrator: one document slot, one selection, one tracker,
/// one overlay slot, plus notification plumbing.
///
/// See the [module docs](self) for the consistency rules and a usage example.
#[derive(Default)]
pub struct EditSession {
    doc: Option<(DocumentId, Document)>,
    selection: Selection,
    tracker: SuggestionTracker,
    overlay: Option<OverlaySession>,
    version: u64,
    modified: bool,
    next_document_id: u64,
    change_callbacks: Vec<ChangeCallback>,
    notice_callbacks: Vec<NoticeCallback>,
}

impl EditSession {
    /// An empty session: no document, caret at 0, inactive tracker, no
    /// overlay.
    pub fn new() -> Self {
        Self::default()
    }

    // --- document slot ---

    /// Open `text` as the session's document, replacing any previous one.
    ///
    /// Resets the selection to a caret at 0, drops any tracked range and
    /// overlay, and returns the new document's id.
    pub fn open_document(&mut self, text: &str) -> DocumentId {
        let id = DocumentId(self.next_document_id);
        self.next_document_id += 1;
        self.doc = Some((id, Document::new(text)));
        self.selection = Selection::caret(0);
        self.tracker.deactivate();
        self.overlay = None;
        self.modified = false;
        self.bump(&[ChangeKind::DocumentOpened]);
        id
    }

    /// Close the open document, if any, dropping all per-document state.
    pub fn close_document(&mut self) {
        if self.doc.take().is_none() {
            return;
        }
        self.selection = Selection::caret(0);
        self.tracker.deactivate();
        self.overlay = None;
        self.modified = false;
        self.bump(&[ChangeKind::DocumentClosed]);
    }

    /// The open document.
    pub fn document(&self) -> Option<&Document> {
        self.doc.as_ref().map(|(_, doc)| doc)
    }

    /// The open document's id.
    pub fn document_id(&self) -> Option<DocumentId> {
        self.doc.as_ref().map(|(id, _)| *id)
    }

    /// `true` when the document has unsaved edits.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Clear the modified flag (after the host saved the document).
    pub fn mark_saved(&mut self) {
        self.modified = false;
    }

    // --- selection ---

    /// The current selection.
    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Move the selection, clamped to the document. Setting the same
    /// selection again is a no-op and does not bump the version.
    pub fn set_selection(&mut self, selection: Selection) {
        let len = self.doc.as_ref().map(|(_, doc)| doc.len_chars()).unwrap_or(0);
        let clamped = selection.clamp_to(len);
        if clamped == self.selection {
            return;
        }
        self.selection = clamped;
        self.bump(&[ChangeKind::SelectionChanged]);
    }

    // --- edits ---

    /// Apply one edit to the open document.
    ///
    /// On success the tracked range is remapped first, then the selection,
    /// then subscribers are notified. Edits that change nothing succeed
    /// without bumping the version. A rejected edit leaves every part of the
    /// session untouched.
    pub fn apply_edit(&mut self, edit: &Edit) -> Result<Transaction, SessionError> {
        let (_, doc) = self.doc.as_mut().ok_or(SessionError::NoDocument)?;
        let txn = doc.apply(edit)?;
        if txn.is_empty() {
            return Ok(txn);
        }
        let doc_len = doc.len_chars();

        // Tracker invalidation runs before any other per-edit rule.
        let tracker_was_active = self.tracker.is_active();
        self.tracker.map_through(&txn);
        self.selection = self.selection.map_through(&txn).clamp_to(doc_len);
        self.modified = true;

        let mut kinds = vec![ChangeKind::DocumentEdited];
        if tracker_was_active && !self.tracker.is_active() {
            kinds.push(ChangeKind::TrackerChanged);
        }
        self.bump(&kinds);
        Ok(txn)
    }

    // --- tracked range ---

    /// Read access to the suggestion tracker.
    pub fn tracker(&self) -> &SuggestionTracker {
        &self.tracker
    }

    /// Track `range` for the current selection. Returns `false` (and clears
    /// any previous range) when the tracker rejects it.
    pub fn activate_suggestion_range(&mut self, range: CharRange) -> bool {
        let Some((_, doc)) = &self.doc else {
            return false;
        };
        let doc_len = doc.len_chars();
        let before = self.tracker.tracked();
        let ok = self.tracker.activate(range, &self.selection, doc_len);
        if self.tracker.tracked() != before {
            self.bump(&[ChangeKind::TrackerChanged]);
        }
        ok
    }

    /// Drop the tracked range, if any.
    pub fn clear_suggestion_range(&mut self) {
        if !self.tracker.is_active() {
            return;
        }
        self.tracker.deactivate();
        self.bump(&[ChangeKind::TrackerChanged]);
    }

    /// The highlight to render for the tracked range, clamped to the open
    /// document.
    pub fn highlight(&self) -> Option<RangeHighlight> {
        let (_, doc) = self.doc.as_ref()?;
        self.tracker.highlight(doc.len_chars())
    }

    // --- overlay ---

    /// The open overlay session.
    pub fn overlay(&self) -> Option<&OverlaySession> {
        self.overlay.as_ref()
    }

    /// Open the suggestion overlay from the current selection.
    ///
    /// Captures the word-joined selected text, the selection's range, and an
    /// anchor at the selection end, then starts tracking the range. Emits a
    /// warning and returns `false` when no document is open or the selection
    /// is empty. Returns `false` silently when an overlay is already open
    /// (double-trigger guard).
    pub fn try_open_from_selection(&mut self) -> bool {
        if self.overlay.is_some() {
            return false;
        }
        let Some((_, doc)) = &self.doc else {
            self.notify(Notice::warning(NOTICE_NO_DOCUMENT));
            return false;
        };
        if self.selection.is_empty() {
            self.notify(Notice::warning(NOTICE_NO_SELECTION));
            return false;
        }

        let range = self.selection.range();
        let selected_text = doc.text_between(range.from, range.to);
        let (line, column) = doc.point_at(self.selection.max(), DEFAULT_TAB_WIDTH);
        let anchor = ScreenPoint::new(column, line);
        let doc_len = doc.len_chars();

        self.overlay = Some(OverlaySession {
            selected_text,
            anchor,
            range: Some(range),
            loading: false,
        });
        self.tracker.activate(range, &self.selection, doc_len);
        self.bump(&[ChangeKind::OverlayChanged, ChangeKind::TrackerChanged]);
        true
    }

    /// Open the overlay with explicit presets instead of the selection.
    ///
    /// Idempotent: a second open without an intervening close is a no-op
    /// that leaves the first session untouched and returns `false`.
    pub fn open_overlay(&mut self, options: OverlayOptions) -> bool {
        if self.overlay.is_some() {
            return false;
        }
        self.overlay = Some(OverlaySession {
            selected_text: options.selected_text.unwrap_or_default(),
            anchor: options.anchor.unwrap_or_default(),
            range: options.range,
            loading: false,
        });
        self.bump(&[ChangeKind::OverlayChanged]);
        true
    }

    /// Close the overlay and drop the tracked range.
    ///
    /// A tracked range without its overlay would leave a highlight the user
    /// can no longer act on, so the two always go away together. Closing
    /// when nothing is open is a no-op.
    pub fn close_overlay(&mut self) {
        let had_overlay = self.overlay.take().is_some();
        let had_tracker = self.tracker.is_active();
        self.tracker.deactivate();
        let mut kinds = Vec::new();
        if had_overlay {
            kinds.push(ChangeKind::OverlayChanged);
        }
        if had_tracker {
            kinds.push(ChangeKind::TrackerChanged);
        }
        if !kinds.is_empty() {
            self.bump(&kinds);
        }
    }

    /// Set the overlay's loading flag, mirroring it into the tracker so the
    /// highlight style follows. No-op when no overlay is open or the flag
    /// already matches.
    pub fn set_suggestion_loading(&mut self, loading: bool) {
        let Some(overlay) = &mut self.overlay else {
            return;
        };
        if overlay.loading == loading {
            return;
        }
        overlay.loading = loading;
        let tracker_active = self.tracker.is_active();
        self.tracker.set_loading(loading);
        let mut kinds = vec![ChangeKind::OverlayChanged];
        if tracker_active {
            kinds.push(ChangeKind::TrackerChanged);
        }
        self.bump(&kinds);
    }

    // --- suggestion flow ---

    /// Build a provider request from the open overlay, with up to
    /// `context_chars` of document text on each side of the captured range.
    ///
    /// `None` when no overlay or document is open, or the overlay captured
    /// no range.
    pub fn suggestion_request(
        &self,
        instruction: Option<&str>,
        context_chars: usize,
    ) -> Option<SuggestionRequest> {
        let overlay = self.overlay.as_ref()?;
        let (_, doc) = self.doc.as_ref()?;
        let range = overlay.range?.clamp_to(doc.len_chars());
        let before_start = range.from.saturating_sub(context_chars);
        let after_end = range.to.saturating_add(context_chars).min(doc.len_chars());
        Some(SuggestionRequest {
            selected_text: overlay.selected_text.clone(),
            instruction: instruction.map(|s| s.to_string()),
            before_context: doc.slice(CharRange::new(before_start, range.from)),
            after_context: doc.slice(CharRange::new(range.to, after_end)),
        })
    }

    /// Snapshot the current session into an [`AcceptRequest`] carrying
    /// `suggestion`.
    pub fn accept_request(&self, suggestion: impl Into<String>) -> AcceptRequest {
        AcceptRequest {
            suggestion: suggestion.into(),
            document: self.document_id(),
            range: self.overlay.as_ref().and_then(|overlay| overlay.range),
            selected_text: self
                .overlay
                .as_ref()
                .map(|overlay| overlay.selected_text.clone())
                .unwrap_or_default(),
        }
    }

    /// Validate and apply an accepted suggestion.
    ///
    /// The request is checked, in order: it must name a document; a document
    /// must be open; the named and open documents must match; the captured
    /// range and text must exist; the range must still fit the *current*
    /// document (`from < to <= len`). Any failure emits exactly one notice,
    /// closes the overlay, and changes nothing.
    ///
    /// On success the range's content is replaced by the suggestion, exactly
    /// one success notice is emitted, and the overlay (with its tracked
    /// range) is closed. Application failures are caught and reported as an
    /// error notice, never propagated.
    pub fn accept_suggestion(&mut self, request: &AcceptRequest) -> AcceptOutcome {
        let Some(target) = request.document else {
            return self.reject(Notice::error(NOTICE_NO_DOCUMENT));
        };
        let loaded = self.doc.as_ref().map(|(id, doc)| (*id, doc.len_chars()));
        let Some((id, doc_len)) = loaded else {
            return self.reject(Notice::error(NOTICE_EDITOR_INACTIVE));
        };
        if id != target {
            return self.reject(Notice::error(NOTICE_STALE_DOCUMENT));
        }
        let range = match request.range {
            Some(range) if !request.selected_text.trim().is_empty() => range,
            _ => return self.reject(Notice::warning(NOTICE_NOTHING_SELECTED)),
        };
        if range.from >= range.to || range.to > doc_len {
            return self.reject(Notice::error(NOTICE_INVALID_RANGE));
        }

        let edit = Edit::Replace {
            range,
            text: request.suggestion.clone(),
        };
        match self.apply_edit(&edit) {
            Ok(_) => {
                self.notify(Notice::success(NOTICE_APPLIED));
                self.close_overlay();
                let inserted = request.suggestion.chars().count();
                AcceptOutcome::Applied {
                    range: CharRange::new(range.from, range.from + inserted),
                }
            }
            Err(_) => self.reject(Notice::error(NOTICE_APPLY_FAILED)),
        }
    }

    // --- notifications ---

    /// Current session version. Bumped once per state-changing mutation.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// `true` when any mutation happened after `version`.
    pub fn has_changed_since(&self, version: u64) -> bool {
        self.version > version
    }

    /// Subscribe to state-change notifications.
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&Change) + Send + 'static,
    {
        self.change_callbacks.push(Box::new(callback));
    }

    /// Subscribe to user-facing notices.
    pub fn on_notice<F>(&mut self, callback: F)
    where
        F: FnMut(&Notice) + Send + 'static,
    {
        self.notice_callbacks.push(Box::new(callback));
    }

    fn reject(&mut self, notice: Notice) -> AcceptOutcome {
        self.notify(notice);
        self.close_overlay();
        AcceptOutcome::Rejected
    }

    fn notify(&mut self, notice: Notice) {
        for callback in &mut self.notice_callbacks {
            callback(&notice);
        }
    }

    fn bump(&mut self, kinds: &[ChangeKind]) {
        let old_version = self.version;
        self.version += 1;
        for kind in kinds {
            let change = Change::new(*kind, old_version, self.version);
            for callback in &mut self.change_callbacks {
                callback(&change);
            }
        }
    }
}
