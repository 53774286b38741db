//! Literal find and replace over the paragraph list
//!
//! Queries are always literal: every regex metacharacter is escaped before
//! the pattern is built. Matches are rebuilt from scratch on every search
//! and are only patched locally by replace-current.

use crate::document::Document;
use crate::paragraph::sanitize_inline;
use core_types::TextPosition;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// A located occurrence of the query
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Match {
    pub paragraph: usize,
    /// Byte range within the paragraph text
    pub range: Range<usize>,
}

impl Match {
    pub fn start(&self) -> TextPosition {
        TextPosition::new(self.paragraph, self.range.start)
    }

    pub fn end(&self) -> TextPosition {
        TextPosition::new(self.paragraph, self.range.end)
    }
}

/// Lifecycle of the find bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchState {
    Closed,
    Open { replace_visible: bool },
}

/// What the find bar shows next to the query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchStatus {
    /// No query, nothing to report
    Idle,
    NoResults,
    /// `current` is 0-based
    At { current: usize, total: usize },
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchStatus::Idle => Ok(()),
            MatchStatus::NoResults => write!(f, "No results"),
            MatchStatus::At { current, total } => write!(f, "{} of {}", current + 1, total),
        }
    }
}

fn build_pattern(query: &str, case_sensitive: bool) -> Option<Regex> {
    RegexBuilder::new(&regex::escape(query))
        .case_insensitive(!case_sensitive)
        .build()
        .ok()
}

/// Every non-overlapping occurrence of `query`, in document order
///
/// An empty query, or a pattern that fails to build, yields no matches.
pub fn find_matches(document: &Document, query: &str, case_sensitive: bool) -> Vec<Match> {
    if query.is_empty() {
        return Vec::new();
    }
    let Some(pattern) = build_pattern(query, case_sensitive) else {
        return Vec::new();
    };

    document
        .paragraphs()
        .iter()
        .enumerate()
        .flat_map(|(index, paragraph)| {
            pattern
                .find_iter(paragraph.text())
                .map(move |m| Match {
                    paragraph: index,
                    range: m.range(),
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Search state machine: `Closed -> Open -> Closed`
#[derive(Debug, Clone)]
pub struct SearchEngine {
    state: SearchState,
    query: String,
    case_sensitive: bool,
    matches: Vec<Match>,
    current: Option<usize>,
}

impl SearchEngine {
    pub fn new() -> Self {
        Self {
            state: SearchState::Closed,
            query: String::new(),
            case_sensitive: false,
            matches: Vec::new(),
            current: None,
        }
    }

    pub fn state(&self) -> SearchState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, SearchState::Open { .. })
    }

    pub fn replace_visible(&self) -> bool {
        matches!(self.state, SearchState::Open { replace_visible: true })
    }

    /// Opens (or re-opens) the bar; previous matches are discarded
    pub fn open(&mut self, with_replace: bool) {
        self.state = SearchState::Open {
            replace_visible: with_replace,
        };
        self.clear_matches();
    }

    /// Shows or hides the replace row while open
    pub fn toggle_replace(&mut self) {
        if let SearchState::Open { replace_visible } = self.state {
            self.state = SearchState::Open {
                replace_visible: !replace_visible,
            };
        }
    }

    /// Closes the bar and forgets all matches; the query text is kept
    pub fn close(&mut self) {
        self.state = SearchState::Closed;
        self.clear_matches();
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    pub fn set_case_sensitive(&mut self, case_sensitive: bool) {
        self.case_sensitive = case_sensitive;
    }

    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_match(&self) -> Option<&Match> {
        self.current.and_then(|i| self.matches.get(i))
    }

    pub fn clear_matches(&mut self) {
        self.matches.clear();
        self.current = None;
    }

    pub fn status(&self) -> MatchStatus {
        match self.current {
            Some(current) if current < self.matches.len() => MatchStatus::At {
                current,
                total: self.matches.len(),
            },
            _ if self.query.is_empty() => MatchStatus::Idle,
            _ => MatchStatus::NoResults,
        }
    }

    /// Rebuilds the match list for the current query and focuses the first
    /// match
    ///
    /// A closed bar holds no matches and reports `Idle`.
    pub fn search(&mut self, document: &Document) -> MatchStatus {
        if !self.is_open() {
            self.clear_matches();
            return MatchStatus::Idle;
        }
        self.matches = find_matches(document, &self.query, self.case_sensitive);
        self.current = if self.matches.is_empty() { None } else { Some(0) };
        self.status()
    }

    pub fn navigate_next(&mut self) -> MatchStatus {
        let total = self.matches.len();
        if total > 0 {
            self.current = Some(self.current.map_or(0, |i| (i + 1) % total));
        }
        self.status()
    }

    pub fn navigate_prev(&mut self) -> MatchStatus {
        let total = self.matches.len();
        if total > 0 {
            self.current = Some(self.current.map_or(total - 1, |i| (i + total - 1) % total));
        }
        self.status()
    }

    /// Replaces the focused match only
    ///
    /// Later matches in the same paragraph are shifted by the length delta.
    /// Focus stays on the same index, wrapping to 0 past the end. Returns
    /// false if there was nothing to replace.
    pub fn replace_current(&mut self, document: &mut Document, replacement: &str) -> bool {
        let Some(index) = self.current.filter(|&i| i < self.matches.len()) else {
            return false;
        };
        let target = self.matches.remove(index);
        let replacement = sanitize_inline(replacement);

        let inserted =
            document.replace_range(target.paragraph, target.range.clone(), &replacement);
        let Some(inserted) = inserted else {
            // Stale positions: drop the match list rather than edit blindly.
            self.clear_matches();
            return false;
        };

        let shift = |at: usize| at - target.range.end + target.range.start + inserted;
        for later in self.matches[index..]
            .iter_mut()
            .take_while(|m| m.paragraph == target.paragraph)
        {
            later.range.start = shift(later.range.start);
            later.range.end = shift(later.range.end);
        }

        self.current = match self.matches.len() {
            0 => None,
            len if index >= len => Some(0),
            _ => Some(index),
        };
        true
    }

    /// Replaces every match, last to first so earlier offsets stay valid
    ///
    /// Returns the number of replacements made.
    pub fn replace_all(&mut self, document: &mut Document, replacement: &str) -> usize {
        let replacement = sanitize_inline(replacement);
        let mut replaced = 0;
        for m in self.matches.iter().rev() {
            if document
                .replace_range(m.paragraph, m.range.clone(), &replacement)
                .is_some()
            {
                replaced += 1;
            }
        }
        self.clear_matches();
        replaced
    }
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine_with(query: &str, case_sensitive: bool) -> SearchEngine {
        let mut engine = SearchEngine::new();
        engine.open(true);
        engine.set_query(query);
        engine.set_case_sensitive(case_sensitive);
        engine
    }

    #[test]
    fn test_case_insensitive_count_and_replace_all() {
        let mut doc = Document::from_text("The cat. the dog.");
        let mut engine = engine_with("the", false);
        assert_eq!(engine.search(&doc), MatchStatus::At { current: 0, total: 2 });
        assert_eq!(engine.replace_all(&mut doc, "a"), 2);
        assert_eq!(doc.content(), "a cat. a dog.");
        assert!(engine.matches().is_empty());
        assert_eq!(engine.status(), MatchStatus::NoResults);
        assert_eq!(engine.search(&doc), MatchStatus::NoResults);
    }

    #[test]
    fn test_case_sensitive_search() {
        let doc = Document::from_text("The cat. the dog.");
        let mut engine = engine_with("the", true);
        engine.search(&doc);
        assert_eq!(engine.matches(), &[Match { paragraph: 0, range: 9..12 }]);
    }

    #[test]
    fn test_matches_are_ordered_and_non_overlapping() {
        let doc = Document::from_text("aaaa\nxx\naa a");
        let matches = find_matches(&doc, "aa", true);
        assert_eq!(
            matches,
            vec![
                Match { paragraph: 0, range: 0..2 },
                Match { paragraph: 0, range: 2..4 },
                Match { paragraph: 2, range: 0..2 },
            ]
        );
    }

    #[test]
    fn test_metacharacters_are_literal() {
        let doc = Document::from_text("cost $5.00 (approx) [sic] a.b axb");
        assert_eq!(find_matches(&doc, "$5.00", true).len(), 1);
        assert_eq!(find_matches(&doc, "(approx)", true).len(), 1);
        assert_eq!(find_matches(&doc, "[sic]", true).len(), 1);
        assert_eq!(find_matches(&doc, "a.b", true).len(), 1);
        assert_eq!(find_matches(&doc, ".*", true).len(), 0);
    }

    #[test]
    fn test_closed_engine_does_not_search() {
        let doc = Document::from_text("abc abc");
        let mut engine = engine_with("abc", true);
        engine.close();
        assert_eq!(engine.search(&doc), MatchStatus::Idle);
        assert!(engine.matches().is_empty());
    }

    #[test]
    fn test_empty_query_has_no_matches() {
        let doc = Document::from_text("anything");
        let mut engine = engine_with("", false);
        assert_eq!(engine.search(&doc), MatchStatus::Idle);
        assert_eq!(engine.current_index(), None);
    }

    #[test]
    fn test_navigation_wraps_both_ways() {
        let doc = Document::from_text("x x\nx");
        let mut engine = engine_with("x", true);
        engine.search(&doc);
        let total = engine.matches().len();
        assert_eq!(total, 3);
        for _ in 0..total {
            engine.navigate_next();
        }
        assert_eq!(engine.current_index(), Some(0));
        assert_eq!(engine.navigate_prev(), MatchStatus::At { current: 2, total: 3 });
        assert_eq!(engine.navigate_next(), MatchStatus::At { current: 0, total: 3 });
    }

    #[test]
    fn test_navigation_on_empty_list_is_noop() {
        let mut engine = engine_with("zzz", false);
        engine.search(&Document::from_text("abc"));
        assert_eq!(engine.navigate_next(), MatchStatus::NoResults);
        assert_eq!(engine.navigate_prev(), MatchStatus::NoResults);
        assert_eq!(engine.current_index(), None);
    }

    #[test]
    fn test_replace_current_shifts_later_matches() {
        let mut doc = Document::from_text("cat cat cat\ncat");
        let mut engine = engine_with("cat", true);
        engine.search(&doc);
        engine.navigate_next();
        assert!(engine.replace_current(&mut doc, "tiger"));
        assert_eq!(doc.content(), "cat tiger cat\ncat");
        assert_eq!(engine.current_index(), Some(1));
        assert_eq!(
            engine.matches(),
            &[
                Match { paragraph: 0, range: 0..3 },
                Match { paragraph: 0, range: 10..13 },
                Match { paragraph: 1, range: 0..3 },
            ]
        );
        assert!(engine.replace_current(&mut doc, "ox"));
        assert_eq!(doc.content(), "cat tiger ox\ncat");
    }

    #[test]
    fn test_replace_current_wraps_and_empties() {
        let mut doc = Document::from_text("a b a");
        let mut engine = engine_with("a", true);
        engine.search(&doc);
        engine.navigate_prev();
        assert!(engine.replace_current(&mut doc, "c"));
        assert_eq!(engine.current_index(), Some(0));
        assert!(engine.replace_current(&mut doc, "c"));
        assert_eq!(doc.content(), "c b c");
        assert_eq!(engine.current_index(), None);
        assert_eq!(engine.status(), MatchStatus::NoResults);
        assert!(!engine.replace_current(&mut doc, "c"));
    }

    #[test]
    fn test_replace_all_multibyte_and_growth() {
        let mut doc = Document::from_text("ño ño\nño");
        let mut engine = engine_with("ño", true);
        engine.search(&doc);
        assert_eq!(engine.replace_all(&mut doc, "yes"), 3);
        assert_eq!(doc.content(), "yes yes\nyes");
    }

    #[test]
    fn test_close_discards_matches_and_reopen_starts_clean() {
        let doc = Document::from_text("abc abc");
        let mut engine = engine_with("abc", false);
        engine.search(&doc);
        engine.close();
        assert!(!engine.is_open());
        assert!(engine.matches().is_empty());
        engine.open(false);
        assert!(!engine.replace_visible());
        assert!(engine.matches().is_empty());
        assert_eq!(engine.query(), "abc");
    }

    #[test]
    fn test_status_display() {
        assert_eq!(MatchStatus::At { current: 0, total: 3 }.to_string(), "1 of 3");
        assert_eq!(MatchStatus::NoResults.to_string(), "No results");
        assert_eq!(MatchStatus::Idle.to_string(), "");
    }
}
