//! Find bar controller
//!
//! Wraps the core [`SearchEngine`] with the two debounce windows of the find
//! bar: one for query typing and one for document edits made while the bar
//! is open.

use manuscript_core::{DebounceTimer, Document, MatchStatus, SearchEngine};

/// Longest selection (in chars) that pre-fills the query on open
pub const MAX_PREFILL_CHARS: usize = 100;

/// Find bar state driven by the session
#[derive(Debug, Clone)]
pub struct FindController {
    engine: SearchEngine,
    query_timer: DebounceTimer,
    content_timer: DebounceTimer,
}

impl FindController {
    pub fn new(query_debounce_ms: u64, content_debounce_ms: u64) -> Self {
        Self {
            engine: SearchEngine::new(),
            query_timer: DebounceTimer::new(query_debounce_ms),
            content_timer: DebounceTimer::new(content_debounce_ms),
        }
    }

    pub fn engine(&self) -> &SearchEngine {
        &self.engine
    }

    pub fn is_open(&self) -> bool {
        self.engine.is_open()
    }

    pub fn status(&self) -> MatchStatus {
        self.engine.status()
    }

    /// True while a debounced re-search is waiting
    pub fn has_pending_search(&self) -> bool {
        self.query_timer.is_pending() || self.content_timer.is_pending()
    }

    /// Opens the bar, optionally seeding the query from the selection
    ///
    /// Previous matches are discarded; a non-empty query is searched at once.
    pub fn open(
        &mut self,
        document: &Document,
        with_replace: bool,
        prefill: Option<&str>,
    ) -> MatchStatus {
        self.cancel_timers();
        self.engine.open(with_replace);
        if let Some(selection) = prefill.filter(|s| is_prefill_candidate(s)) {
            self.engine.set_query(selection);
        }
        self.refresh(document)
    }

    pub fn close(&mut self) {
        self.cancel_timers();
        self.engine.close();
    }

    pub fn toggle_replace(&mut self) {
        self.engine.toggle_replace();
    }

    /// Records typed query text; the search runs once typing settles
    pub fn set_query(&mut self, query: &str, now: u64) {
        if self.engine.query() == query {
            return;
        }
        self.engine.set_query(query);
        self.query_timer.arm(now);
    }

    /// Searches immediately with an explicit query and case mode
    ///
    /// The query and case mode are recorded even while the bar is closed,
    /// but matches only exist while it is open.
    pub fn search(
        &mut self,
        document: &Document,
        query: &str,
        case_sensitive: bool,
    ) -> MatchStatus {
        self.cancel_timers();
        self.engine.set_query(query);
        self.engine.set_case_sensitive(case_sensitive);
        self.engine.search(document)
    }

    pub fn toggle_case_sensitive(&mut self, document: &Document) -> MatchStatus {
        let case_sensitive = !self.engine.case_sensitive();
        self.engine.set_case_sensitive(case_sensitive);
        self.cancel_timers();
        self.engine.search(document)
    }

    /// The document changed underneath the bar
    ///
    /// Match positions are stale, so they are dropped at once. A re-search
    /// is debounced only while the bar is open with a query.
    pub fn content_changed(&mut self, now: u64) {
        if !self.engine.matches().is_empty() {
            self.engine.clear_matches();
        }
        if self.engine.is_open() && !self.engine.query().is_empty() {
            self.content_timer.arm(now);
        }
    }

    /// A different chapter is now active
    pub fn chapter_changed(&mut self, document: &Document) -> MatchStatus {
        self.cancel_timers();
        self.engine.clear_matches();
        if self.engine.is_open() {
            self.refresh(document)
        } else {
            self.engine.status()
        }
    }

    /// Runs a due debounced search; returns the new status if one ran
    pub fn poll(&mut self, document: &Document, now: u64) -> Option<MatchStatus> {
        let query_due = self.query_timer.fire(now);
        let content_due = self.content_timer.fire(now);
        if !(query_due || content_due) || !self.engine.is_open() {
            return None;
        }
        Some(self.engine.search(document))
    }

    pub fn navigate_next(&mut self) -> MatchStatus {
        self.engine.navigate_next()
    }

    pub fn navigate_prev(&mut self) -> MatchStatus {
        self.engine.navigate_prev()
    }

    pub fn replace_current(&mut self, document: &mut Document, replacement: &str) -> bool {
        self.engine.replace_current(document, replacement)
    }

    pub fn replace_all(&mut self, document: &mut Document, replacement: &str) -> usize {
        self.engine.replace_all(document, replacement)
    }

    fn refresh(&mut self, document: &Document) -> MatchStatus {
        if self.engine.query().is_empty() {
            self.engine.clear_matches();
            self.engine.status()
        } else {
            self.engine.search(document)
        }
    }

    fn cancel_timers(&mut self) {
        self.query_timer.cancel();
        self.content_timer.cancel();
    }
}

fn is_prefill_candidate(selection: &str) -> bool {
    !selection.trim().is_empty()
        && !selection.contains('\n')
        && selection.chars().count() < MAX_PREFILL_CHARS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> FindController {
        FindController::new(50, 300)
    }

    #[test]
    fn test_open_with_prefill_searches_immediately() {
        let doc = Document::from_text("one two one");
        let mut find = controller();
        let status = find.open(&doc, false, Some("one"));
        assert_eq!(status, MatchStatus::At { current: 0, total: 2 });
        assert_eq!(find.engine().query(), "one");
    }

    #[test]
    fn test_prefill_rejects_multiline_and_long() {
        let doc = Document::from_text("text");
        let mut find = controller();
        find.open(&doc, false, Some("a\nb"));
        assert_eq!(find.engine().query(), "");
        let long = "x".repeat(MAX_PREFILL_CHARS);
        find.open(&doc, false, Some(&long));
        assert_eq!(find.engine().query(), "");
    }

    #[test]
    fn test_query_typing_is_debounced() {
        let doc = Document::from_text("alpha beta");
        let mut find = controller();
        find.open(&doc, false, None);
        find.set_query("al", 0);
        find.set_query("alp", 30);
        assert_eq!(find.poll(&doc, 60), None);
        assert_eq!(find.poll(&doc, 80), Some(MatchStatus::At { current: 0, total: 1 }));
        assert!(!find.has_pending_search());
    }

    #[test]
    fn test_content_change_drops_matches_then_researches() {
        let mut doc = Document::from_text("cat");
        let mut find = controller();
        find.open(&doc, false, None);
        assert_eq!(find.search(&doc, "cat", false), MatchStatus::At { current: 0, total: 1 });

        doc.set_content("cat cat");
        find.content_changed(1000);
        assert!(find.engine().matches().is_empty());
        assert_eq!(find.poll(&doc, 1299), None);
        assert_eq!(find.poll(&doc, 1300), Some(MatchStatus::At { current: 0, total: 2 }));
    }

    #[test]
    fn test_content_change_ignored_when_closed() {
        let mut find = controller();
        find.content_changed(0);
        assert!(!find.has_pending_search());
    }

    #[test]
    fn test_closed_bar_never_holds_matches() {
        let doc = Document::from_text("cat cat");
        let mut find = controller();
        assert_eq!(find.search(&doc, "cat", true), MatchStatus::Idle);
        assert!(find.engine().matches().is_empty());
        assert_eq!(find.toggle_case_sensitive(&doc), MatchStatus::Idle);
        assert!(find.engine().matches().is_empty());

        // The recorded query is used once the bar opens.
        assert_eq!(find.open(&doc, true, None), MatchStatus::At { current: 0, total: 2 });
    }

    #[test]
    fn test_content_change_drops_matches_after_close() {
        let doc = Document::from_text("cat cat");
        let mut find = controller();
        find.open(&doc, true, None);
        find.search(&doc, "cat", true);
        find.close();

        find.content_changed(0);
        assert!(find.engine().matches().is_empty());
        assert!(!find.has_pending_search());
    }

    #[test]
    fn test_toggle_case_researches() {
        let doc = Document::from_text("The the");
        let mut find = controller();
        find.open(&doc, true, None);
        assert_eq!(find.search(&doc, "the", false), MatchStatus::At { current: 0, total: 2 });
        assert_eq!(find.toggle_case_sensitive(&doc), MatchStatus::At { current: 0, total: 1 });
    }

    #[test]
    fn test_close_cancels_pending_search() {
        let doc = Document::from_text("abc");
        let mut find = controller();
        find.open(&doc, false, None);
        find.set_query("abc", 0);
        find.close();
        assert_eq!(find.poll(&doc, 1000), None);
        assert!(find.engine().matches().is_empty());
    }

    #[test]
    fn test_chapter_change_recomputes() {
        let doc = Document::from_text("x");
        let mut find = controller();
        find.open(&doc, false, None);
        find.search(&doc, "y", true);
        let other = Document::from_text("y y");
        assert_eq!(find.chapter_changed(&other), MatchStatus::At { current: 0, total: 2 });
    }
}
