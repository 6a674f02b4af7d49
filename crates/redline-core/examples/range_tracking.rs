//! Range tracking example
//!
//! Demonstrates how a tracked range follows the document through edits and
//! when it gives up.

use redline_core::{CharRange, Edit, EditSession, Selection};

fn show(session: &EditSession, label: &str) {
    let doc = session.document().unwrap();
    match session.tracker().range() {
        Some(range) => println!(
            "  {label}: tracking [{}..{}) = '{}'",
            range.from,
            range.to,
            doc.slice(range)
        ),
        None => println!("  {label}: inactive"),
    }
}

fn main() {
    println!("=== Range Tracking Example ===\n");

    let mut session = EditSession::new();
    session.open_document("Rewrite the middle part of this sentence.");

    // Track "middle part".
    session.set_selection(Selection::new(12, 23));
    session.try_open_from_selection();

    println!("1. Edits outside the range shift it:");
    show(&session, "start");
    session
        .apply_edit(&Edit::Insert { at: 0, text: "NOTE: ".to_string() })
        .unwrap();
    show(&session, "after prefix insert");
    session
        .apply_edit(&Edit::Delete { range: CharRange::new(0, 6) })
        .unwrap();
    show(&session, "after prefix delete");
    println!();

    println!("2. Edits inside the range resize it:");
    session
        .apply_edit(&Edit::Insert { at: 19, text: "most ".to_string() })
        .unwrap();
    show(&session, "after inner insert");
    println!();

    println!("3. Insertions at the boundaries stay outside:");
    let range = session.tracker().range().unwrap();
    session
        .apply_edit(&Edit::Insert { at: range.from, text: ">>".to_string() })
        .unwrap();
    show(&session, "after insert at from");
    let range = session.tracker().range().unwrap();
    session
        .apply_edit(&Edit::Insert { at: range.to, text: "<<".to_string() })
        .unwrap();
    show(&session, "after insert at to");
    println!();

    println!("4. Deleting the tracked text deactivates, silently:");
    let range = session.tracker().range().unwrap();
    session
        .apply_edit(&Edit::Delete {
            range: CharRange::new(range.from.saturating_sub(1), range.to + 1),
        })
        .unwrap();
    show(&session, "after covering delete");
    println!("  overlay still open: {}", session.overlay().is_some());
    println!("  (accept-time validation would reject its stale snapshot)");

    println!("\n=== Example Complete ===");
}
