//! Document coordinates

use serde::{Deserialize, Serialize};
use std::fmt;

/// A caret position inside a document
///
/// `paragraph` is the 0-based paragraph index. `offset` is a byte offset into
/// that paragraph's text and is expected to sit on a `char` boundary; the
/// document clamps positions that do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct TextPosition {
    pub paragraph: usize,
    pub offset: usize,
}

impl TextPosition {
    pub const fn new(paragraph: usize, offset: usize) -> Self {
        Self { paragraph, offset }
    }

    pub const fn zero() -> Self {
        Self {
            paragraph: 0,
            offset: 0,
        }
    }
}

impl fmt::Display for TextPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.paragraph, self.offset)
    }
}
