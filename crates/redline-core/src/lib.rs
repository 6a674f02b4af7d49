#![warn(missing_docs)]
//! Redline Core - Headless Suggestion-Editing Engine
//!
//! # Overview
//!
//! `redline-core` is the state engine behind an "edit this text" suggestion
//! flow: select a span, ask a collaborator (an AI backend, a rules engine)
//! for a rewrite, watch the span survive unrelated edits, and write the
//! answer back only if the span is still real. It is headless: no rendering,
//! no I/O, no network; hosts bind its state to whatever surface they have.
//!
//! # Core Features
//!
//! - **Tracked ranges**: one suggestion range per session, remapped through
//!   every edit and dropped the instant it stops denoting the picked text
//! - **Overlay sessions**: open-time snapshots (text, range, anchor) with an
//!   idempotent open and a close that never leaves a stale highlight
//! - **Validated acceptance**: replacement is applied only after the
//!   captured range is re-checked against the *current* document
//! - **Precise mapping**: per-edit position mapping with explicit bias, the
//!   same boundary rules at every layer
//! - **State tracking**: version numbers and change notifications for UI
//!   binding; user-visible outcomes as notices, never logs
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  EditSession (flows, validation, notices)   │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  SuggestionTracker & OverlaySession         │  ← Interaction State
//! ├─────────────────────────────────────────────┤
//! │  Transaction Mapping (bias rules)           │  ← Position Algebra
//! ├─────────────────────────────────────────────┤
//! │  Document (Rope-based, char offsets)        │  ← Text Storage
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use redline_core::{AcceptOutcome, EditSession, Selection};
//!
//! let mut session = EditSession::new();
//! session.on_notice(|notice| {
//!     println!("[{:?}] {}", notice.level, notice.message);
//! });
//!
//! session.open_document("The quick brown fox");
//! session.set_selection(Selection::new(4, 9));
//!
//! // Open the overlay over "quick"; the range is now tracked.
//! assert!(session.try_open_from_selection());
//! assert_eq!(session.overlay().unwrap().selected_text, "quick");
//!
//! // The host produces a suggestion (here: a constant) and accepts it.
//! let request = session.accept_request("sluggish");
//! let outcome = session.accept_suggestion(&request);
//! assert!(matches!(outcome, AcceptOutcome::Applied { .. }));
//! assert_eq!(session.document().unwrap().text(), "The sluggish brown fox");
//! ```
//!
//! # Module Description
//!
//! - [`document`] - Rope-based text storage, char-offset edits
//! - [`transaction`] - structured edit records and position mapping
//! - [`selection`] - anchor/head selections, word expansion
//! - [`tracker`] - the tracked suggestion-range state machine
//! - [`highlight`] - renderer-facing highlight data model
//! - [`overlay`] - overlay session snapshots
//! - [`session`] - the orchestrator tying it all together
//! - [`provider`] - the suggestion-source seam
//! - [`notice`] - user-facing notice channel
//!
//! # Unicode Support
//!
//! - All offsets are character offsets (Unicode scalar values), never bytes
//! - CJK double-width characters measured per UAX #11 for overlay anchors
//! - Word expansion follows Unicode word boundaries (UAX #29)

pub mod document;
pub mod highlight;
pub mod notice;
pub mod overlay;
pub mod provider;
pub mod selection;
pub mod session;
pub mod tracker;
pub mod transaction;

pub use document::{
    CharRange, DEFAULT_TAB_WIDTH, Document, DocumentError, Edit, LineEnding, cell_width_at,
};
pub use highlight::{HighlightKind, RangeHighlight};
pub use notice::{Notice, NoticeCallback, NoticeLevel};
pub use overlay::{OverlayOptions, OverlaySession, ScreenPoint};
pub use provider::{SuggestionRequest, SuggestionSource};
pub use selection::Selection;
pub use session::{
    AcceptOutcome, AcceptRequest, Change, ChangeCallback, ChangeKind, DocumentId, EditSession,
    SessionError,
};
pub use tracker::{SuggestionTracker, TrackedRange};
pub use transaction::{MapBias, Mapped, TextEdit, Transaction};
