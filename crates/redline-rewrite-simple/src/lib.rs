//! `redline-rewrite-simple` - Simple (regex-based) rewrite source for `redline-core`.
//!
//! A deterministic stand-in for a real suggestion backend: named regex rules
//! applied in sequence over the selected text. Handy for mechanical tidy-ups
//! and for driving the suggestion flow in demos and tests; it is *not* a
//! language model.

use redline_core::{SuggestionRequest, SuggestionSource};
use regex::{Captures, Regex};
use serde::Deserialize;
use thiserror::Error;

/// Errors from building or running rewrite rules.
#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("invalid pattern in rule '{name}': {source}")]
    /// A rule's regex failed to compile.
    InvalidPattern {
        /// The offending rule's name.
        name: String,
        /// The compiler error.
        #[source]
        source: regex::Error,
    },

    #[error("unknown rewrite rule '{0}'")]
    /// A requested rule name does not exist in the pipeline.
    UnknownRule(String),

    #[error("invalid rule file: {0}")]
    /// A rule file failed to parse.
    RuleFile(#[from] serde_json::Error),
}

/// What a rule does with each match.
#[derive(Debug, Clone)]
enum RuleAction {
    /// Substitute a template (supports `$1`, `${name}` capture references).
    Template(String),
    Uppercase,
    Lowercase,
    /// Uppercase the first letter of the match, lowercase the rest.
    TitleCase,
}

/// A single named regex rewrite rule.
#[derive(Debug, Clone)]
pub struct RewriteRule {
    name: String,
    regex: Regex,
    action: RuleAction,
}

impl RewriteRule {
    /// A template-substitution rule.
    pub fn new(name: &str, pattern: &str, replacement: &str) -> Result<Self, RewriteError> {
        Self::with_action(name, pattern, RuleAction::Template(replacement.to_string()))
    }

    /// A rule that uppercases every match.
    pub fn uppercase(name: &str, pattern: &str) -> Result<Self, RewriteError> {
        Self::with_action(name, pattern, RuleAction::Uppercase)
    }

    /// A rule that lowercases every match.
    pub fn lowercase(name: &str, pattern: &str) -> Result<Self, RewriteError> {
        Self::with_action(name, pattern, RuleAction::Lowercase)
    }

    /// A rule that title-cases every match.
    pub fn title_case(name: &str, pattern: &str) -> Result<Self, RewriteError> {
        Self::with_action(name, pattern, RuleAction::TitleCase)
    }

    fn with_action(name: &str, pattern: &str, action: RuleAction) -> Result<Self, RewriteError> {
        let regex = Regex::new(pattern).map_err(|source| RewriteError::InvalidPattern {
            name: name.to_string(),
            source,
        })?;
        Ok(Self {
            name: name.to_string(),
            regex,
            action,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Apply this rule to every match in `text`.
    pub fn apply(&self, text: &str) -> String {
        match &self.action {
            RuleAction::Template(replacement) => self
                .regex
                .replace_all(text, replacement.as_str())
                .into_owned(),
            RuleAction::Uppercase => self
                .regex
                .replace_all(text, |caps: &Captures| caps[0].to_uppercase())
                .into_owned(),
            RuleAction::Lowercase => self
                .regex
                .replace_all(text, |caps: &Captures| caps[0].to_lowercase())
                .into_owned(),
            RuleAction::TitleCase => self
                .regex
                .replace_all(text, |caps: &Captures| capitalize(&caps[0]))
                .into_owned(),
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

/// A sequential rewrite pipeline.
///
/// Rules run in declaration order over the whole text; later rules see the
/// output of earlier ones.
#[derive(Debug, Clone)]
pub struct RegexRewriter {
    rules: Vec<RewriteRule>,
}

impl RegexRewriter {
    pub fn new(rules: Vec<RewriteRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[RewriteRule] {
        &self.rules
    }

    /// Names of all rules, in pipeline order.
    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    /// Run the whole pipeline.
    pub fn apply_all(&self, text: &str) -> String {
        let mut out = text.to_string();
        for rule in &self.rules {
            out = rule.apply(&out);
        }
        out
    }

    /// Run a single rule picked by name.
    pub fn apply_named(&self, name: &str, text: &str) -> Result<String, RewriteError> {
        let rule = self
            .rules
            .iter()
            .find(|rule| rule.name() == name)
            .ok_or_else(|| RewriteError::UnknownRule(name.to_string()))?;
        Ok(rule.apply(text))
    }

    /// The default whitespace/punctuation tidy pipeline.
    ///
    /// Collapses space runs, trims the ends, and normalizes spacing around
    /// common punctuation.
    pub fn tidy_default() -> Result<Self, RewriteError> {
        Ok(Self::new(vec![
            RewriteRule::new("collapse-spaces", r"[ \t]{2,}", " ")?,
            RewriteRule::new("trim-ends", r"^[ \t]+|[ \t]+$", "")?,
            RewriteRule::new("no-space-before-punctuation", r"[ \t]+([.,;:!?])", "$1")?,
            RewriteRule::new("space-after-punctuation", r"([.,;:!?])(\p{L})", "$1 $2")?,
        ]))
    }

    /// Typographic characters to plain ASCII (quotes, dashes, ellipsis).
    pub fn ascii_default() -> Result<Self, RewriteError> {
        Ok(Self::new(vec![
            RewriteRule::new("straight-double-quotes", "[\u{201C}\u{201D}]", "\"")?,
            RewriteRule::new("straight-single-quotes", "[\u{2018}\u{2019}]", "'")?,
            RewriteRule::new("plain-dashes", "[\u{2013}\u{2014}]", "-")?,
            RewriteRule::new("plain-ellipsis", "\u{2026}", "...")?,
        ]))
    }

    /// Case transforms, meant to be picked by name.
    ///
    /// Running this set as a whole pipeline would cascade the transforms, so
    /// it pairs with [`apply_named`](Self::apply_named) (or an instruction)
    /// rather than [`apply_all`](Self::apply_all).
    pub fn case_default() -> Result<Self, RewriteError> {
        Ok(Self::new(vec![
            RewriteRule::uppercase("uppercase", r"[\p{L}\p{M}]+")?,
            RewriteRule::lowercase("lowercase", r"[\p{L}\p{M}]+")?,
            RewriteRule::title_case("title-case", r"\p{L}[\p{L}\p{M}']*")?,
        ]))
    }

    /// Load a pipeline from a JSON rule file.
    ///
    /// Format:
    ///
    /// ```json
    /// {
    ///   "rules": [
    ///     { "name": "shout", "pattern": "\\bok\\b", "replacement": "OK" }
    ///   ]
    /// }
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self, RewriteError> {
        let file: RuleFile = serde_json::from_str(json)?;
        let mut rules = Vec::with_capacity(file.rules.len());
        for spec in &file.rules {
            rules.push(RewriteRule::new(
                &spec.name,
                &spec.pattern,
                &spec.replacement,
            )?);
        }
        Ok(Self::new(rules))
    }
}

/// The suggestion-source hookup: an instruction picks one rule by name, no
/// instruction (or a blank one) runs the whole pipeline.
impl SuggestionSource for RegexRewriter {
    type Error = RewriteError;

    fn suggest(&mut self, request: &SuggestionRequest) -> Result<String, Self::Error> {
        match request.instruction.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => self.apply_named(name, &request.selected_text),
            _ => Ok(self.apply_all(&request.selected_text)),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RuleFile {
    rules: Vec<RuleSpec>,
}

#[derive(Debug, Deserialize)]
struct RuleSpec {
    name: String,
    pattern: String,
    replacement: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn request(text: &str, instruction: Option<&str>) -> SuggestionRequest {
        SuggestionRequest {
            selected_text: text.to_string(),
            instruction: instruction.map(str::to_string),
            before_context: String::new(),
            after_context: String::new(),
        }
    }

    #[test]
    fn test_rule_applies_with_captures() {
        let rule = RewriteRule::new("swap", r"(\w+)-(\w+)", "$2-$1").unwrap();
        assert_eq!(rule.apply("left-right and up-down"), "right-left and down-up");
    }

    #[test]
    fn test_invalid_pattern_reports_rule_name() {
        let err = RewriteRule::new("broken", r"(unclosed", "x").unwrap_err();
        match err {
            RewriteError::InvalidPattern { name, .. } => assert_eq!(name, "broken"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_pipeline_runs_rules_in_order() {
        let rewriter = RegexRewriter::new(vec![
            RewriteRule::new("a-to-b", "a", "b").unwrap(),
            RewriteRule::new("b-to-c", "b", "c").unwrap(),
        ]);
        // The second rule sees the first rule's output.
        assert_eq!(rewriter.apply_all("aaa"), "ccc");
        assert_eq!(rewriter.rule_names(), vec!["a-to-b", "b-to-c"]);
    }

    #[test]
    fn test_tidy_default_cleans_spacing() {
        let rewriter = RegexRewriter::tidy_default().unwrap();
        assert_eq!(
            rewriter.apply_all("  hello   world ,again .  "),
            "hello world, again."
        );
        assert_eq!(rewriter.apply_all("one,two;three"), "one, two; three");
    }

    #[test]
    fn test_tidy_leaves_decimal_numbers_alone() {
        let rewriter = RegexRewriter::tidy_default().unwrap();
        assert_eq!(rewriter.apply_all("pi is 3.14, roughly"), "pi is 3.14, roughly");
    }

    #[test]
    fn test_ascii_default_straightens_typography() {
        let rewriter = RegexRewriter::ascii_default().unwrap();
        assert_eq!(
            rewriter.apply_all("\u{201C}wait\u{201D} \u{2014} she said\u{2026}"),
            "\"wait\" - she said..."
        );
    }

    #[test]
    fn test_case_rules_picked_by_name() {
        let rewriter = RegexRewriter::case_default().unwrap();
        assert_eq!(
            rewriter.apply_named("uppercase", "warn: låst file").unwrap(),
            "WARN: LÅST FILE"
        );
        assert_eq!(
            rewriter.apply_named("lowercase", "STOP Shouting").unwrap(),
            "stop shouting"
        );
        assert_eq!(
            rewriter.apply_named("title-case", "the quick BROWN fox").unwrap(),
            "The Quick Brown Fox"
        );
    }

    #[test]
    fn test_title_case_keeps_punctuation_and_digits() {
        let rewriter = RegexRewriter::case_default().unwrap();
        assert_eq!(
            rewriter.apply_named("title-case", "it's 3 o'clock").unwrap(),
            "It's 3 O'clock"
        );
    }

    #[test]
    fn test_apply_named_selects_one_rule() {
        let rewriter = RegexRewriter::tidy_default().unwrap();
        // Only the named rule runs: spaces collapse, punctuation untouched.
        assert_eq!(
            rewriter.apply_named("collapse-spaces", "a  b ,c").unwrap(),
            "a b ,c"
        );
    }

    #[test]
    fn test_apply_named_unknown_rule() {
        let rewriter = RegexRewriter::tidy_default().unwrap();
        let err = rewriter.apply_named("no-such-rule", "text").unwrap_err();
        assert!(matches!(err, RewriteError::UnknownRule(name) if name == "no-such-rule"));
    }

    #[test]
    fn test_rule_file_round_trip() {
        let json = r#"{
            "rules": [
                { "name": "shout-ok", "pattern": "\\bok\\b", "replacement": "OK" },
                { "name": "bang", "pattern": "\\.$", "replacement": "!" }
            ]
        }"#;
        let rewriter = RegexRewriter::from_json_str(json).unwrap();
        assert_eq!(rewriter.rules().len(), 2);
        assert_eq!(rewriter.apply_all("that is ok."), "that is OK!");
    }

    #[test]
    fn test_rule_file_with_bad_pattern() {
        let json = r#"{ "rules": [ { "name": "oops", "pattern": "(", "replacement": "" } ] }"#;
        let err = RegexRewriter::from_json_str(json).unwrap_err();
        assert!(matches!(err, RewriteError::InvalidPattern { name, .. } if name == "oops"));
    }

    #[test]
    fn test_rule_file_with_bad_json() {
        let err = RegexRewriter::from_json_str("not json").unwrap_err();
        assert!(matches!(err, RewriteError::RuleFile(_)));
    }

    #[test]
    fn test_suggest_uses_instruction_as_rule_name() {
        let mut rewriter = RegexRewriter::tidy_default().unwrap();
        let out = rewriter
            .suggest(&request("a  b", Some("collapse-spaces")))
            .unwrap();
        assert_eq!(out, "a b");

        let err = rewriter
            .suggest(&request("a  b", Some("make-it-shakespeare")))
            .unwrap_err();
        assert!(matches!(err, RewriteError::UnknownRule(_)));
    }

    #[test]
    fn test_suggest_without_instruction_runs_pipeline() {
        let mut rewriter = RegexRewriter::tidy_default().unwrap();
        assert_eq!(rewriter.suggest(&request(" x ,y ", None)).unwrap(), "x, y");
        assert_eq!(rewriter.suggest(&request(" x ,y ", Some("  "))).unwrap(), "x, y");
    }
}
