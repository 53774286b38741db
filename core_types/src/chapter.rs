//! Chapter identity

use crate::ChapterId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference to one chapter of a project
///
/// The title only names the chapter file; identity is the [`ChapterId`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterRef {
    pub id: ChapterId,
    pub title: String,
    /// 1-based position in the project's chapter list
    pub order: u32,
}

impl ChapterRef {
    pub fn new(id: ChapterId, title: impl Into<String>, order: u32) -> Self {
        Self {
            id,
            title: title.into(),
            order,
        }
    }

    /// File name of the chapter text: `{id}-{slug}.md`
    pub fn file_name(&self) -> String {
        format!("{}-{}.md", self.id, slugify(&self.title))
    }
}

impl fmt::Display for ChapterRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.id, self.title)
    }
}

/// Lowercases a title and collapses every run of characters outside
/// `[a-z0-9]` into a single `-`, with no leading or trailing dash.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for ch in title.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch);
        } else {
            pending_dash = true;
        }
    }

    slug
}
