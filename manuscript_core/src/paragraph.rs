//! Paragraph block

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::ops::Range;

/// Zero-width placeholder the surface renders inside an empty paragraph so
/// the caret has somewhere to sit. Never stored in paragraph text.
pub const PLACEHOLDER: char = '\u{200B}';

/// Prefix that marks a paragraph as a heading
pub const HEADING_PREFIX: &str = "## ";

/// Removes placeholders and carriage returns from a run of text.
pub(crate) fn strip_placeholders(text: &str) -> Cow<'_, str> {
    if text.contains(|c: char| c == PLACEHOLDER || c == '\r') {
        Cow::Owned(text.chars().filter(|&c| c != PLACEHOLDER && c != '\r').collect())
    } else {
        Cow::Borrowed(text)
    }
}

/// Reduces text to something a single paragraph may hold: placeholders
/// dropped, line breaks turned into spaces.
pub fn sanitize_inline(text: &str) -> String {
    strip_placeholders(text).replace('\n', " ")
}

/// A single text block of the document
///
/// Paragraph text never contains `'\n'` or [`PLACEHOLDER`]. Leading and
/// trailing whitespace is kept while editing and trimmed on serialization.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Paragraph {
    text: String,
}

impl Paragraph {
    /// Creates a paragraph, sanitizing the text with [`sanitize_inline`]
    pub fn new(text: impl AsRef<str>) -> Self {
        Self {
            text: sanitize_inline(text.as_ref()),
        }
    }

    /// Creates an empty (placeholder) paragraph
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// True if there is nothing but whitespace
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Text as the surface should render it
    pub fn rendered_text(&self) -> Cow<'_, str> {
        if self.text.is_empty() {
            Cow::Owned(PLACEHOLDER.to_string())
        } else {
            Cow::Borrowed(&self.text)
        }
    }

    /// Canonical persisted form of this paragraph
    pub fn serialized(&self) -> &str {
        self.text.trim()
    }

    pub fn is_heading(&self) -> bool {
        self.text.trim().starts_with(HEADING_PREFIX)
    }

    /// Heading title with the prefix stripped, if this is a heading
    pub fn heading_text(&self) -> Option<&str> {
        self.text
            .trim()
            .strip_prefix(HEADING_PREFIX)
            .map(str::trim)
    }

    /// Largest char boundary not after `offset`
    pub fn floor_boundary(&self, offset: usize) -> usize {
        let mut offset = offset.min(self.text.len());
        while !self.text.is_char_boundary(offset) {
            offset -= 1;
        }
        offset
    }

    /// Start of the char that ends at `offset`
    pub(crate) fn prev_boundary(&self, offset: usize) -> Option<usize> {
        self.text[..offset].char_indices().next_back().map(|(i, _)| i)
    }

    /// End of the char that starts at `offset`
    pub(crate) fn next_boundary(&self, offset: usize) -> Option<usize> {
        self.text[offset..]
            .chars()
            .next()
            .map(|c| offset + c.len_utf8())
    }

    /// `offset` must be a char boundary; `text` must already be sanitized
    pub(crate) fn insert_str(&mut self, offset: usize, text: &str) {
        self.text.insert_str(offset, text);
    }

    pub(crate) fn push_str(&mut self, text: &str) {
        self.text.push_str(text);
    }

    pub(crate) fn split_off(&mut self, offset: usize) -> Paragraph {
        Paragraph {
            text: self.text.split_off(offset),
        }
    }

    pub(crate) fn truncate(&mut self, offset: usize) {
        self.text.truncate(offset);
    }

    /// Replaces a byte range; returns false if the range is out of bounds or
    /// not on char boundaries
    pub(crate) fn replace_range(&mut self, range: Range<usize>, replacement: &str) -> bool {
        if range.start > range.end
            || range.end > self.text.len()
            || !self.text.is_char_boundary(range.start)
            || !self.text.is_char_boundary(range.end)
        {
            return false;
        }
        self.text.replace_range(range, replacement);
        true
    }
}
