//! Document snapshot for deterministic parity testing

use crate::cursor::CursorTracker;
use crate::document::Document;
use crate::paragraph::Paragraph;
use crate::search::{MatchStatus, SearchEngine};
use core_types::TextPosition;
use serde::{Deserialize, Serialize};

/// Complete observable state of one editing model
///
/// Two models fed the same input trace must produce equal snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSnapshot {
    pub paragraphs: Vec<String>,
    pub heading_flags: Vec<bool>,
    pub caret: Option<TextPosition>,
    pub content: String,
    pub search_query: String,
    pub search_status: MatchStatus,
}

impl DocumentSnapshot {
    pub fn capture(document: &Document, cursor: &CursorTracker, search: &SearchEngine) -> Self {
        Self {
            paragraphs: document
                .paragraphs()
                .iter()
                .map(|p| p.text().to_string())
                .collect(),
            heading_flags: document.paragraphs().iter().map(Paragraph::is_heading).collect(),
            caret: cursor.caret(),
            content: document.content(),
            search_query: search.query().to_string(),
            search_status: search.status(),
        }
    }
}
