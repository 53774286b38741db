//! # Input Types
//!
//! Events the rendering surface reports to the editing core.
//!
//! ## Philosophy
//!
//! - **Events, not DOM**: The surface reports typed edits or a snapshot of its
//!   mutated block tree; it never hands out live nodes
//! - **Serializable**: Events can be recorded and replayed for tests
//! - **Untrusted structure**: A reported tree may contain anything; the core
//!   normalizes it before reading it
//!
//! ## Non-Goals
//!
//! This is NOT:
//! - Key codes or modifier state (the surface resolves those)
//! - Rich formatting runs
//! - A rendering model

use core_types::TextPosition;
use serde::{Deserialize, Serialize};

/// Inline content of a reported block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RawInline {
    /// A run of text; an embedded `'\n'` counts as a line break
    Text(String),
    /// Explicit line-break marker
    LineBreak,
}

impl RawInline {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }
}

/// Top-level node of the surface's block tree
///
/// Only [`RawBlock::Paragraph`] is canonical. Everything else appears when
/// the surface improvises structure (browser-style `div`s, stray breaks,
/// loose text after a select-all delete).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RawBlock {
    /// Loose text outside any paragraph
    Text(String),
    /// Stray structural break between blocks
    LineBreak,
    /// A paragraph block
    Paragraph(Vec<RawInline>),
    /// A generic container block
    Container(Vec<RawInline>),
}

impl RawBlock {
    /// Paragraph holding a single text run
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::Paragraph(vec![RawInline::Text(text.into())])
    }

    /// Container holding a single text run
    pub fn container(text: impl Into<String>) -> Self {
        Self::Container(vec![RawInline::Text(text.into())])
    }

    /// Returns true if this is a canonical paragraph
    pub fn is_paragraph(&self) -> bool {
        matches!(self, Self::Paragraph(_))
    }
}

/// A single user edit reported by the surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditInput {
    /// Typed text at the caret (usually one character)
    InsertText(String),
    /// Enter-equivalent: split the paragraph at the caret
    Enter,
    /// Delete backwards
    Backspace,
    /// Delete forwards
    Delete,
    /// Clipboard text, already reduced to `text/plain` by the surface
    Paste(String),
    /// Caret moved without editing
    MoveCaret(TextPosition),
    /// Selection changed without editing
    Select {
        anchor: TextPosition,
        focus: TextPosition,
    },
    /// The surface mutated its own tree; this is the whole tree afterwards
    TreeMutation(Vec<RawBlock>),
}

impl EditInput {
    pub fn insert(text: impl Into<String>) -> Self {
        Self::InsertText(text.into())
    }

    pub fn paste(text: impl Into<String>) -> Self {
        Self::Paste(text.into())
    }

    /// Returns true if applying this input can change document content
    pub fn is_content_change(&self) -> bool {
        !matches!(self, Self::MoveCaret(_) | Self::Select { .. })
    }
}
