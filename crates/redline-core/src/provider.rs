//! Suggestion provider seam.
//!
//! The engine never produces suggestions itself: between overlay-open and
//! accept, the host calls out to whatever produces the replacement text (an
//! AI backend, a rules engine, a test stub) and feeds the result back in.
//! This module defines the uniform shape of that call so front ends and
//! tests can swap providers freely.
//!
//! Implementations in this workspace: `redline-rewrite-simple` (regex rule
//! pipelines).

/// Everything a provider gets to see for one suggestion call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionRequest {
    /// The text the user selected, word-joined across lines.
    pub selected_text: String,
    /// The user's instruction for the rewrite, when they gave one.
    pub instruction: Option<String>,
    /// Document text immediately before the selection, clipped on character
    /// boundaries.
    pub before_context: String,
    /// Document text immediately after the selection, clipped on character
    /// boundaries.
    pub after_context: String,
}

/// A producer of replacement text for a [`SuggestionRequest`].
///
/// `suggest` takes `&mut self` so providers may keep state between calls
/// (caches, counters, connections).
pub trait SuggestionSource {
    /// Provider-specific failure type.
    type Error;

    /// Produce the replacement for the request's `selected_text`.
    fn suggest(&mut self, request: &SuggestionRequest) -> Result<String, Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Shouter;

    impl SuggestionSource for Shouter {
        type Error = std::convert::Infallible;

        fn suggest(&mut self, request: &SuggestionRequest) -> Result<String, Self::Error> {
            Ok(request.selected_text.to_uppercase())
        }
    }

    #[test]
    fn test_stub_source_produces_replacement() {
        let mut source = Shouter;
        let request = SuggestionRequest {
            selected_text: "quiet".to_string(),
            instruction: None,
            before_context: String::new(),
            after_context: String::new(),
        };
        assert_eq!(source.suggest(&request).unwrap(), "QUIET");
    }
}
