//! Caret and selection tracking

use crate::document::Document;
use core_types::TextPosition;
use serde::{Deserialize, Serialize};

/// A selection between two positions; collapsed when both are equal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub anchor: TextPosition,
    pub focus: TextPosition,
}

impl Selection {
    pub fn collapsed(pos: TextPosition) -> Self {
        Self {
            anchor: pos,
            focus: pos,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    /// Earlier of the two ends in document order
    pub fn start(&self) -> TextPosition {
        self.anchor.min(self.focus)
    }

    /// Later of the two ends in document order
    pub fn end(&self) -> TextPosition {
        self.anchor.max(self.focus)
    }
}

/// Tracks the caret in paragraph coordinates
///
/// Every setter clamps against the document, so a tracked position always
/// sits inside an existing paragraph. An empty document has no caret.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CursorTracker {
    selection: Option<Selection>,
}

impl CursorTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    /// The focus end of the selection
    pub fn caret(&self) -> Option<TextPosition> {
        self.selection.map(|s| s.focus)
    }

    pub fn has_selection(&self) -> bool {
        self.selection.is_some_and(|s| !s.is_collapsed())
    }

    pub fn clear(&mut self) {
        self.selection = None;
    }

    /// Collapses the caret at `pos`, clamped into the document
    pub fn set_caret(&mut self, document: &Document, pos: TextPosition) {
        self.selection = document.clamp(pos).map(Selection::collapsed);
    }

    /// Selects between two positions, both clamped into the document
    pub fn select(&mut self, document: &Document, anchor: TextPosition, focus: TextPosition) {
        self.selection = match (document.clamp(anchor), document.clamp(focus)) {
            (Some(anchor), Some(focus)) => Some(Selection { anchor, focus }),
            _ => None,
        };
    }

    /// Collapses the caret at the end of the document
    pub fn move_to_end(&mut self, document: &Document) {
        self.selection = document.end_position().map(Selection::collapsed);
    }

    /// Collapses the caret inside paragraph `paragraph` at `offset`
    ///
    /// Returns false (leaving the caret untouched) if the paragraph does not
    /// exist.
    pub fn move_to_paragraph(
        &mut self,
        document: &Document,
        paragraph: usize,
        offset: usize,
    ) -> bool {
        if paragraph >= document.len() {
            return false;
        }
        self.set_caret(document, TextPosition::new(paragraph, offset));
        true
    }

    /// Re-clamps the tracked selection after a structural change
    pub fn revalidate(&mut self, document: &Document) {
        if let Some(selection) = self.selection {
            self.select(document, selection.anchor, selection.focus);
        }
    }

    /// Text covered by a non-collapsed selection
    pub fn selected_text(&self, document: &Document) -> Option<String> {
        let selection = self.selection.filter(|s| !s.is_collapsed())?;
        Some(document.text_in_range(selection.anchor, selection.focus))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_ordering() {
        let sel = Selection {
            anchor: TextPosition::new(2, 0),
            focus: TextPosition::new(0, 3),
        };
        assert_eq!(sel.start(), TextPosition::new(0, 3));
        assert_eq!(sel.end(), TextPosition::new(2, 0));
        assert!(!sel.is_collapsed());
        assert!(Selection::collapsed(TextPosition::zero()).is_collapsed());
    }

    #[test]
    fn test_empty_document_has_no_caret() {
        let doc = Document::new();
        let mut cursor = CursorTracker::new();
        cursor.set_caret(&doc, TextPosition::new(1, 1));
        assert_eq!(cursor.caret(), None);
        cursor.move_to_end(&doc);
        assert_eq!(cursor.caret(), None);
    }

    #[test]
    fn test_set_caret_clamps() {
        let doc = Document::from_text("ab\ncd");
        let mut cursor = CursorTracker::new();
        cursor.set_caret(&doc, TextPosition::new(7, 7));
        assert_eq!(cursor.caret(), Some(TextPosition::new(1, 2)));
    }

    #[test]
    fn test_move_to_end() {
        let doc = Document::from_text("Hello\n\nWorld");
        let mut cursor = CursorTracker::new();
        cursor.move_to_end(&doc);
        assert_eq!(cursor.caret(), Some(TextPosition::new(2, 5)));
    }

    #[test]
    fn test_move_to_paragraph() {
        let doc = Document::from_text("one\ntwo");
        let mut cursor = CursorTracker::new();
        assert!(cursor.move_to_paragraph(&doc, 1, 0));
        assert_eq!(cursor.caret(), Some(TextPosition::new(1, 0)));
        assert!(!cursor.move_to_paragraph(&doc, 2, 0));
        assert_eq!(cursor.caret(), Some(TextPosition::new(1, 0)));
    }

    #[test]
    fn test_revalidate_after_shrink() {
        let mut doc = Document::from_text("one\ntwo\nthree");
        let mut cursor = CursorTracker::new();
        cursor.set_caret(&doc, TextPosition::new(2, 4));
        doc.set_content("x");
        cursor.revalidate(&doc);
        assert_eq!(cursor.caret(), Some(TextPosition::new(0, 1)));
    }

    #[test]
    fn test_selected_text() {
        let doc = Document::from_text("one two\nthree");
        let mut cursor = CursorTracker::new();
        cursor.select(&doc, TextPosition::new(0, 4), TextPosition::new(1, 2));
        assert!(cursor.has_selection());
        assert_eq!(cursor.selected_text(&doc), Some("two\nth".to_string()));
        cursor.set_caret(&doc, TextPosition::zero());
        assert_eq!(cursor.selected_text(&doc), None);
    }
}
