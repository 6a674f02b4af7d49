//! Suggestion flow example
//!
//! Demonstrates the full overlay lifecycle: select, open, request, accept.

use redline_core::{AcceptOutcome, EditSession, Selection, SuggestionRequest, SuggestionSource};

/// A stand-in for a real suggestion backend: uppercases the selection.
struct ShoutingSource;

impl SuggestionSource for ShoutingSource {
    type Error = std::convert::Infallible;

    fn suggest(&mut self, request: &SuggestionRequest) -> Result<String, Self::Error> {
        Ok(request.selected_text.to_uppercase())
    }
}

fn main() {
    println!("=== Suggestion Flow Example ===\n");

    let mut session = EditSession::new();
    session.on_notice(|notice| println!("  [notice/{:?}] {}", notice.level, notice.message));

    // Example 1: open a document and pick a span
    println!("1. Open a document:");
    session.open_document("The deadline is friday, please review the draft.");
    println!("  text: '{}'", session.document().unwrap().text());

    session.set_selection(Selection::new(16, 22));
    let selection = session.selection();
    println!(
        "  selected [{}..{}): '{}'\n",
        selection.min(),
        selection.max(),
        session.document().unwrap().slice(selection.range())
    );

    // Example 2: open the overlay over the selection
    println!("2. Open the suggestion overlay:");
    let opened = session.try_open_from_selection();
    let overlay = session.overlay().unwrap();
    println!("  opened: {}", opened);
    println!("  captured text: '{}'", overlay.selected_text);
    println!(
        "  anchored at column {}, line {}",
        overlay.anchor.x, overlay.anchor.y
    );
    println!("  highlight: {:?}\n", session.highlight().unwrap().kind);

    // Example 3: ask the provider while the loading style shows
    println!("3. Run the suggestion source:");
    session.set_suggestion_loading(true);
    println!("  highlight now: {:?}", session.highlight().unwrap().kind);
    let request = session.suggestion_request(Some("emphasize"), 12).unwrap();
    println!(
        "  request: '{}' (before: '{}', after: '{}')",
        request.selected_text, request.before_context, request.after_context
    );
    let suggestion = ShoutingSource.suggest(&request).unwrap();
    session.set_suggestion_loading(false);
    println!("  suggestion: '{}'\n", suggestion);

    // Example 4: accept and write back
    println!("4. Accept the suggestion:");
    let accept = session.accept_request(suggestion);
    match session.accept_suggestion(&accept) {
        AcceptOutcome::Applied { range } => {
            println!("  applied over [{}..{})", range.from, range.to);
        }
        AcceptOutcome::Rejected => println!("  rejected"),
    }
    println!("  text: '{}'", session.document().unwrap().text());
    println!("  overlay open: {}\n", session.overlay().is_some());

    // Example 5: rejection paths report, never panic
    println!("5. Rejection paths:");
    session.set_selection(Selection::caret(0));
    let opened = session.try_open_from_selection();
    println!("  open over empty selection: {}", opened);

    session.set_selection(Selection::new(0, 3));
    session.try_open_from_selection();
    let stale = session.accept_request("replacement");
    // The document is replaced while the overlay is still open.
    session.open_document("a brand new document");
    match session.accept_suggestion(&stale) {
        AcceptOutcome::Applied { .. } => println!("  unexpected success"),
        AcceptOutcome::Rejected => println!("  stale accept rejected, text unchanged"),
    }
    println!("  text: '{}'", session.document().unwrap().text());

    println!("\n=== Example Complete ===");
}
