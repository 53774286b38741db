//! Paragraph document and normalization
//!
//! The surface may report any tree it likes; [`normalize`] folds it back
//! into a flat list of [`Paragraph`]s. Every structural edit here works on
//! that list directly and keeps the invariant on its own.

use crate::paragraph::{sanitize_inline, strip_placeholders, Paragraph};
use core_types::TextPosition;
use input_types::{RawBlock, RawInline};
use std::ops::Range;

/// Result of normalizing a reported tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub paragraphs: Vec<Paragraph>,
    /// True if anything other than a plain one-paragraph-per-block mapping
    /// was needed (loose text, containers, breaks, splits)
    pub restructured: bool,
}

/// Splits inline runs at every line-break marker (explicit or `'\n'`).
fn split_runs(runs: &[RawInline]) -> Vec<String> {
    let mut segments = vec![String::new()];
    for run in runs {
        match run {
            RawInline::LineBreak => segments.push(String::new()),
            RawInline::Text(text) => {
                let text = strip_placeholders(text);
                let mut lines = text.split('\n');
                if let (Some(first), Some(current)) = (lines.next(), segments.last_mut()) {
                    current.push_str(first);
                }
                segments.extend(lines.map(str::to_string));
            }
        }
    }
    segments
}

fn non_blank_parts(segments: &[String]) -> Vec<&str> {
    segments
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Normalizes a reported block tree into paragraphs
///
/// Rules, in precedence order:
/// 1. Loose text is split on newlines; blank lines are discarded.
/// 2. A container becomes one paragraph per non-blank line-break part, or a
///    single paragraph holding its text if no part survives.
/// 3. A paragraph with more than one non-blank line-break part is split.
/// 4. Stray block-level breaks are dropped.
pub fn normalize(blocks: &[RawBlock]) -> Normalized {
    let mut paragraphs = Vec::with_capacity(blocks.len());
    let mut restructured = false;

    for block in blocks {
        match block {
            RawBlock::Text(text) => {
                restructured = true;
                let text = strip_placeholders(text);
                if text.trim().is_empty() {
                    continue;
                }
                paragraphs.extend(
                    text.split('\n')
                        .filter(|line| !line.trim().is_empty())
                        .map(Paragraph::new),
                );
            }
            RawBlock::LineBreak => restructured = true,
            RawBlock::Container(runs) => {
                restructured = true;
                let segments = split_runs(runs);
                let parts = non_blank_parts(&segments);
                if parts.is_empty() {
                    paragraphs.push(Paragraph::new(segments.concat()));
                } else {
                    paragraphs.extend(parts.into_iter().map(Paragraph::new));
                }
            }
            RawBlock::Paragraph(runs) => {
                let segments = split_runs(runs);
                let parts = non_blank_parts(&segments);
                if parts.len() > 1 {
                    restructured = true;
                    paragraphs.extend(parts.into_iter().map(Paragraph::new));
                } else {
                    paragraphs.push(Paragraph::new(segments.concat()));
                }
            }
        }
    }

    Normalized {
        paragraphs,
        restructured,
    }
}

/// Reduces clipboard text to the lines worth inserting
///
/// Returns `None` if nothing but blank lines was pasted.
pub fn clean_paste(text: &str) -> Option<String> {
    let text = strip_placeholders(text);
    let lines: Vec<&str> = text
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .collect();
    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

/// The live document of one chapter
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    paragraphs: Vec<Paragraph>,
}

impl Document {
    /// Creates an empty document (no paragraphs)
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a document from stored chapter text
    pub fn from_text(text: &str) -> Self {
        let mut document = Self::new();
        document.set_content(text);
        document
    }

    pub fn from_paragraphs(paragraphs: Vec<Paragraph>) -> Self {
        Self { paragraphs }
    }

    /// Replaces the whole document with one paragraph per line of `text`
    ///
    /// Blank-only text produces the empty document.
    pub fn set_content(&mut self, text: &str) {
        self.paragraphs.clear();
        if text.trim().is_empty() {
            return;
        }
        self.paragraphs.extend(text.split('\n').map(Paragraph::new));
    }

    /// Canonical plain text: trimmed paragraphs joined by `'\n'`
    pub fn content(&self) -> String {
        self.paragraphs
            .iter()
            .map(Paragraph::serialized)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    pub fn paragraph(&self, index: usize) -> Option<&Paragraph> {
        self.paragraphs.get(index)
    }

    pub fn len(&self) -> usize {
        self.paragraphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }

    /// The tree this document would render as
    pub fn to_raw(&self) -> Vec<RawBlock> {
        self.paragraphs
            .iter()
            .map(|p| {
                if p.is_empty() {
                    RawBlock::Paragraph(Vec::new())
                } else {
                    RawBlock::paragraph(p.text())
                }
            })
            .collect()
    }

    /// Replaces the document with a normalized reported tree
    ///
    /// Returns true if the tree needed restructuring.
    pub fn apply_tree(&mut self, blocks: &[RawBlock]) -> bool {
        let normalized = normalize(blocks);
        self.paragraphs = normalized.paragraphs;
        normalized.restructured
    }

    /// Clamps a position into a valid paragraph and onto a char boundary
    pub fn clamp(&self, pos: TextPosition) -> Option<TextPosition> {
        let last = self.paragraphs.len().checked_sub(1)?;
        let paragraph = pos.paragraph.min(last);
        let offset = self.paragraphs[paragraph].floor_boundary(pos.offset);
        Some(TextPosition::new(paragraph, offset))
    }

    /// Position after the last character of the document
    pub fn end_position(&self) -> Option<TextPosition> {
        let last = self.paragraphs.len().checked_sub(1)?;
        Some(TextPosition::new(last, self.paragraphs[last].len()))
    }

    /// Ensures there is a paragraph to type into and clamps `pos` into it
    fn writable(&mut self, pos: TextPosition) -> TextPosition {
        if self.paragraphs.is_empty() {
            self.paragraphs.push(Paragraph::empty());
        }
        // Non-empty after the push above.
        self.clamp(pos).unwrap_or_default()
    }

    /// Inserts text at `pos`, splitting paragraphs at embedded newlines
    ///
    /// Returns the caret position after the inserted text.
    pub fn insert_text(&mut self, pos: TextPosition, text: &str) -> TextPosition {
        let pos = self.writable(pos);
        let text = strip_placeholders(text);
        let lines: Vec<&str> = text.split('\n').collect();

        let index = pos.paragraph;
        if let [line] = lines.as_slice() {
            self.paragraphs[index].insert_str(pos.offset, line);
            return TextPosition::new(index, pos.offset + line.len());
        }

        let tail = self.paragraphs[index].split_off(pos.offset);
        self.paragraphs[index].push_str(lines[0]);

        let mut inserted: Vec<Paragraph> = lines[1..].iter().map(Paragraph::new).collect();
        let caret_offset = inserted.last().map(Paragraph::len).unwrap_or_default();
        if let Some(last) = inserted.last_mut() {
            last.push_str(tail.text());
        }
        let added = inserted.len();
        self.paragraphs.splice(index + 1..index + 1, inserted);

        TextPosition::new(index + added, caret_offset)
    }

    /// Splits the paragraph at `pos` (Enter)
    ///
    /// Text before the caret stays, text after moves into a new paragraph
    /// inserted right after it. Returns the start of the new paragraph.
    pub fn split_paragraph(&mut self, pos: TextPosition) -> TextPosition {
        if self.paragraphs.is_empty() {
            self.paragraphs.push(Paragraph::empty());
            return TextPosition::zero();
        }
        let pos = self.writable(pos);
        let rest = self.paragraphs[pos.paragraph].split_off(pos.offset);
        self.paragraphs.insert(pos.paragraph + 1, rest);
        TextPosition::new(pos.paragraph + 1, 0)
    }

    /// Deletes the char before `pos`, joining with the previous paragraph at
    /// offset 0
    ///
    /// Returns the new caret position, or `None` if nothing was deleted.
    pub fn backspace(&mut self, pos: TextPosition) -> Option<TextPosition> {
        let pos = self.clamp(pos)?;
        let prev = self.paragraphs[pos.paragraph].prev_boundary(pos.offset);

        if let Some(prev) = prev {
            self.paragraphs[pos.paragraph].replace_range(prev..pos.offset, "");
            Some(TextPosition::new(pos.paragraph, prev))
        } else if pos.paragraph > 0 {
            let current = self.paragraphs.remove(pos.paragraph);
            let previous = &mut self.paragraphs[pos.paragraph - 1];
            let join = previous.len();
            previous.push_str(current.text());
            Some(TextPosition::new(pos.paragraph - 1, join))
        } else {
            None
        }
    }

    /// Deletes the char after `pos`, joining the next paragraph at the end
    /// of a paragraph. Returns true if anything changed.
    pub fn delete_forward(&mut self, pos: TextPosition) -> bool {
        let Some(pos) = self.clamp(pos) else {
            return false;
        };
        let next = self.paragraphs[pos.paragraph].next_boundary(pos.offset);

        if let Some(next) = next {
            self.paragraphs[pos.paragraph].replace_range(pos.offset..next, "")
        } else if pos.paragraph + 1 < self.paragraphs.len() {
            let following = self.paragraphs.remove(pos.paragraph + 1);
            self.paragraphs[pos.paragraph].push_str(following.text());
            true
        } else {
            false
        }
    }

    /// Deletes everything between two positions, in either order
    ///
    /// Returns the collapsed caret position.
    pub fn delete_range(&mut self, a: TextPosition, b: TextPosition) -> Option<TextPosition> {
        let a = self.clamp(a)?;
        let b = self.clamp(b)?;
        let (start, end) = if a <= b { (a, b) } else { (b, a) };

        if start.paragraph == end.paragraph {
            self.paragraphs[start.paragraph].replace_range(start.offset..end.offset, "");
            return Some(start);
        }

        let tail = self.paragraphs[end.paragraph].split_off(end.offset);
        let head = &mut self.paragraphs[start.paragraph];
        head.truncate(start.offset);
        head.push_str(tail.text());
        self.paragraphs.drain(start.paragraph + 1..=end.paragraph);
        Some(start)
    }

    /// Text between two positions, paragraphs joined by `'\n'`
    pub fn text_in_range(&self, a: TextPosition, b: TextPosition) -> String {
        let (Some(a), Some(b)) = (self.clamp(a), self.clamp(b)) else {
            return String::new();
        };
        let (start, end) = if a <= b { (a, b) } else { (b, a) };

        if start.paragraph == end.paragraph {
            return self.paragraphs[start.paragraph].text()[start.offset..end.offset].to_string();
        }

        let mut parts = Vec::with_capacity(end.paragraph - start.paragraph + 1);
        parts.push(&self.paragraphs[start.paragraph].text()[start.offset..]);
        for p in &self.paragraphs[start.paragraph + 1..end.paragraph] {
            parts.push(p.text());
        }
        parts.push(&self.paragraphs[end.paragraph].text()[..end.offset]);
        parts.join("\n")
    }

    /// Replaces a byte range inside one paragraph
    ///
    /// The replacement is sanitized to a single line. Returns the byte
    /// length actually inserted, or `None` if the range was invalid.
    pub fn replace_range(
        &mut self,
        paragraph: usize,
        range: Range<usize>,
        replacement: &str,
    ) -> Option<usize> {
        let replacement = sanitize_inline(replacement);
        let target = self.paragraphs.get_mut(paragraph)?;
        target
            .replace_range(range, &replacement)
            .then_some(replacement.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use input_types::RawInline;

    fn texts(doc: &Document) -> Vec<&str> {
        doc.paragraphs().iter().map(Paragraph::text).collect()
    }

    #[test]
    fn test_set_content_one_paragraph_per_line() {
        let doc = Document::from_text("Hello\n\nWorld");
        assert_eq!(texts(&doc), vec!["Hello", "", "World"]);
        assert_eq!(doc.content(), "Hello\n\nWorld");
    }

    #[test]
    fn test_set_content_blank_text_is_empty_document() {
        assert!(Document::from_text("").is_empty());
        assert!(Document::from_text("\n  \n\t").is_empty());
        assert_eq!(Document::from_text(" \n ").content(), "");
    }

    #[test]
    fn test_set_content_accepts_crlf() {
        let doc = Document::from_text("one\r\ntwo");
        assert_eq!(texts(&doc), vec!["one", "two"]);
    }

    #[test]
    fn test_content_trims_each_line() {
        let doc = Document::from_text("  a  \n\tb\n c");
        assert_eq!(doc.content(), "a\nb\nc");
    }

    #[test]
    fn test_roundtrip_of_trimmed_text() {
        for text in ["# Title", "a\nb", "x\n\n\ny", "## Head\nbody <todo>"] {
            assert_eq!(Document::from_text(text).content(), text);
        }
    }

    #[test]
    fn test_normalize_loose_text_splits_lines() {
        let normalized = normalize(&[RawBlock::Text("one\n\ntwo\n".into())]);
        assert!(normalized.restructured);
        let doc = Document::from_paragraphs(normalized.paragraphs);
        assert_eq!(texts(&doc), vec!["one", "two"]);
    }

    #[test]
    fn test_normalize_drops_blank_loose_text_and_breaks() {
        let normalized = normalize(&[
            RawBlock::Text("  \n ".into()),
            RawBlock::LineBreak,
            RawBlock::paragraph("kept"),
        ]);
        assert!(normalized.restructured);
        assert_eq!(normalized.paragraphs, vec![Paragraph::new("kept")]);
    }

    #[test]
    fn test_normalize_container_splits_on_breaks() {
        let normalized = normalize(&[RawBlock::Container(vec![
            RawInline::text(" first "),
            RawInline::LineBreak,
            RawInline::text("second"),
        ])]);
        assert_eq!(
            normalized.paragraphs,
            vec![Paragraph::new("first"), Paragraph::new("second")]
        );
    }

    #[test]
    fn test_normalize_empty_container_becomes_placeholder_paragraph() {
        let normalized = normalize(&[RawBlock::Container(vec![RawInline::LineBreak])]);
        assert_eq!(normalized.paragraphs, vec![Paragraph::empty()]);
    }

    #[test]
    fn test_normalize_paragraph_with_breaks_splits() {
        let normalized = normalize(&[RawBlock::Paragraph(vec![
            RawInline::text("a"),
            RawInline::LineBreak,
            RawInline::text("b\nc"),
        ])]);
        assert!(normalized.restructured);
        assert_eq!(
            normalized.paragraphs,
            vec![Paragraph::new("a"), Paragraph::new("b"), Paragraph::new("c")]
        );
    }

    #[test]
    fn test_normalize_trailing_break_keeps_single_paragraph() {
        let normalized = normalize(&[RawBlock::Paragraph(vec![
            RawInline::text("hello "),
            RawInline::LineBreak,
        ])]);
        assert!(!normalized.restructured);
        assert_eq!(normalized.paragraphs, vec![Paragraph::new("hello ")]);
    }

    #[test]
    fn test_normalize_merges_runs_and_strips_placeholder() {
        let normalized = normalize(&[RawBlock::Paragraph(vec![
            RawInline::text("\u{200B}ab"),
            RawInline::text("cd"),
        ])]);
        assert_eq!(normalized.paragraphs, vec![Paragraph::new("abcd")]);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let messy = vec![
            RawBlock::Text("loose\nlines".into()),
            RawBlock::container("div"),
            RawBlock::LineBreak,
            RawBlock::Paragraph(vec![]),
            RawBlock::Paragraph(vec![
                RawInline::text("x"),
                RawInline::LineBreak,
                RawInline::text("y"),
            ]),
            RawBlock::paragraph("  spaced  "),
        ];
        let once = Document::from_paragraphs(normalize(&messy).paragraphs);
        let twice = normalize(&once.to_raw());
        assert!(!twice.restructured);
        assert_eq!(twice.paragraphs, once.paragraphs());
    }

    #[test]
    fn test_apply_tree_reports_restructuring() {
        let mut doc = Document::from_text("a\nb");
        assert!(!doc.apply_tree(&doc.to_raw()));
        assert!(doc.apply_tree(&[RawBlock::Text("c".into())]));
        assert_eq!(doc.content(), "c");
    }

    #[test]
    fn test_insert_into_empty_document_creates_paragraph() {
        let mut doc = Document::new();
        let caret = doc.insert_text(TextPosition::new(5, 5), "H");
        assert_eq!(texts(&doc), vec!["H"]);
        assert_eq!(caret, TextPosition::new(0, 1));
    }

    #[test]
    fn test_insert_single_line_mid_paragraph() {
        let mut doc = Document::from_text("helo");
        let caret = doc.insert_text(TextPosition::new(0, 3), "l");
        assert_eq!(doc.content(), "hello");
        assert_eq!(caret, TextPosition::new(0, 4));
    }

    #[test]
    fn test_insert_multi_line_splits_around_caret() {
        let mut doc = Document::from_text("startend\nnext");
        let caret = doc.insert_text(TextPosition::new(0, 5), "A\nB\nC");
        assert_eq!(texts(&doc), vec!["startA", "B", "Cend", "next"]);
        assert_eq!(caret, TextPosition::new(2, 1));
    }

    #[test]
    fn test_split_paragraph_at_caret() {
        let mut doc = Document::from_text("HelloWorld");
        let caret = doc.split_paragraph(TextPosition::new(0, 5));
        assert_eq!(texts(&doc), vec!["Hello", "World"]);
        assert_eq!(caret, TextPosition::new(1, 0));
    }

    #[test]
    fn test_split_at_end_leaves_placeholder_paragraph() {
        let mut doc = Document::from_text("Hello");
        let caret = doc.split_paragraph(TextPosition::new(0, 5));
        assert_eq!(texts(&doc), vec!["Hello", ""]);
        assert_eq!(
            doc.paragraph(1).map(|p| p.rendered_text().into_owned()),
            Some("\u{200B}".to_string())
        );
        assert_eq!(caret, TextPosition::new(1, 0));
    }

    #[test]
    fn test_split_in_empty_document() {
        let mut doc = Document::new();
        assert_eq!(doc.split_paragraph(TextPosition::zero()), TextPosition::zero());
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.content(), "");
    }

    #[test]
    fn test_backspace_within_and_across_paragraphs() {
        let mut doc = Document::from_text("ab\ncd");
        assert_eq!(doc.backspace(TextPosition::new(1, 1)), Some(TextPosition::new(1, 0)));
        assert_eq!(texts(&doc), vec!["ab", "d"]);
        assert_eq!(doc.backspace(TextPosition::new(1, 0)), Some(TextPosition::new(0, 2)));
        assert_eq!(texts(&doc), vec!["abd"]);
        assert_eq!(doc.backspace(TextPosition::new(0, 0)), None);
    }

    #[test]
    fn test_backspace_multibyte() {
        let mut doc = Document::from_text("naïve");
        assert_eq!(doc.backspace(TextPosition::new(0, 4)), Some(TextPosition::new(0, 2)));
        assert_eq!(doc.content(), "nave");
    }

    #[test]
    fn test_empty_paragraph_survives_editing_to_empty() {
        let mut doc = Document::from_text("a\nx\nb");
        doc.backspace(TextPosition::new(1, 1));
        assert_eq!(texts(&doc), vec!["a", "", "b"]);
        assert_eq!(doc.content(), "a\n\nb");
    }

    #[test]
    fn test_delete_forward() {
        let mut doc = Document::from_text("ab\ncd");
        assert!(doc.delete_forward(TextPosition::new(0, 0)));
        assert_eq!(texts(&doc), vec!["b", "cd"]);
        assert!(doc.delete_forward(TextPosition::new(0, 1)));
        assert_eq!(texts(&doc), vec!["bcd"]);
        assert!(!doc.delete_forward(TextPosition::new(0, 3)));
        assert!(!Document::new().delete_forward(TextPosition::zero()));
    }

    #[test]
    fn test_delete_range_across_paragraphs() {
        let mut doc = Document::from_text("one two\nthree\nfour five");
        let caret = doc.delete_range(TextPosition::new(2, 4), TextPosition::new(0, 3));
        assert_eq!(caret, Some(TextPosition::new(0, 3)));
        assert_eq!(texts(&doc), vec!["one five"]);
    }

    #[test]
    fn test_text_in_range() {
        let doc = Document::from_text("one two\nthree\nfour five");
        assert_eq!(
            doc.text_in_range(TextPosition::new(0, 4), TextPosition::new(2, 4)),
            "two\nthree\nfour"
        );
        assert_eq!(doc.text_in_range(TextPosition::new(1, 1), TextPosition::new(1, 3)), "hr");
        assert_eq!(Document::new().text_in_range(TextPosition::zero(), TextPosition::zero()), "");
    }

    #[test]
    fn test_clamp_and_end_position() {
        let doc = Document::from_text("ab\nñ");
        assert_eq!(doc.clamp(TextPosition::new(9, 9)), Some(TextPosition::new(1, 2)));
        assert_eq!(doc.clamp(TextPosition::new(1, 1)), Some(TextPosition::new(1, 0)));
        assert_eq!(doc.end_position(), Some(TextPosition::new(1, 2)));
        assert_eq!(Document::new().clamp(TextPosition::zero()), None);
        assert_eq!(Document::new().end_position(), None);
    }

    #[test]
    fn test_replace_range_sanitizes_replacement() {
        let mut doc = Document::from_text("a cat");
        assert_eq!(doc.replace_range(0, 2..5, "big\ndog"), Some(7));
        assert_eq!(doc.content(), "a big dog");
        assert_eq!(doc.replace_range(0, 0..99, "x"), None);
        assert_eq!(doc.replace_range(7, 0..0, "x"), None);
    }

    #[test]
    fn test_clean_paste() {
        assert_eq!(clean_paste("one\r\n\r\ntwo\n  \nthree"), Some("one\ntwo\nthree".to_string()));
        assert_eq!(clean_paste("\n \n"), None);
        assert_eq!(clean_paste("single"), Some("single".to_string()));
    }
}
