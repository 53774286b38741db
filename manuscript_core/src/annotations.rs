//! TODO and heading annotations
//!
//! Both lists are derived from the current document and rebuilt in full on
//! every call. Nothing here is persisted.

use crate::document::Document;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static TODO_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<([^>]+)>").unwrap());

/// Preview lengths, in chars
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationLimits {
    pub todo_chars: usize,
    pub heading_chars: usize,
}

impl Default for AnnotationLimits {
    fn default() -> Self {
        Self {
            todo_chars: 30,
            heading_chars: 40,
        }
    }
}

/// An inline `<...>` note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoMarker {
    pub text: String,
    /// 1-based line of the serialized content
    pub line: usize,
    /// Char column of the opening `<`
    pub column: usize,
}

/// A `## ` heading paragraph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingMarker {
    pub text: String,
    /// 1-based paragraph index
    pub line: usize,
}

/// Both annotation lists for one document state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotations {
    pub todos: Vec<TodoMarker>,
    pub headings: Vec<HeadingMarker>,
}

impl Annotations {
    pub fn scan(document: &Document, limits: AnnotationLimits) -> Self {
        Self {
            todos: detect_todos(&document.content(), limits.todo_chars),
            headings: detect_headings(document, limits.heading_chars),
        }
    }
}

fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Finds every `<...>` span in serialized content, left to right per line
pub fn detect_todos(content: &str, max_chars: usize) -> Vec<TodoMarker> {
    let mut todos = Vec::new();
    for (index, line) in content.split('\n').enumerate() {
        for caps in TODO_RE.captures_iter(line) {
            let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            todos.push(TodoMarker {
                text: preview(inner.as_str(), max_chars),
                line: index + 1,
                column: line[..whole.start()].chars().count(),
            });
        }
    }
    todos
}

/// Lists heading paragraphs in document order
pub fn detect_headings(document: &Document, max_chars: usize) -> Vec<HeadingMarker> {
    document
        .paragraphs()
        .iter()
        .enumerate()
        .filter_map(|(index, paragraph)| {
            paragraph.heading_text().map(|text| HeadingMarker {
                text: preview(text, max_chars),
                line: index + 1,
            })
        })
        .collect()
}

/// Heading flag per paragraph, for the surface's styling
pub fn heading_flags(document: &Document) -> Vec<bool> {
    document
        .paragraphs()
        .iter()
        .map(|p| p.is_heading())
        .collect()
}
