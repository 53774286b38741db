//! Word counts for the status bar

use serde::{Deserialize, Serialize};
use std::fmt;

/// Counts whitespace-separated words
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Words in the chapter and, when something is selected, in the selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WordCount {
    pub total: usize,
    pub selected: Option<usize>,
}

impl WordCount {
    /// A blank selection counts as no selection
    pub fn new(content: &str, selection: Option<&str>) -> Self {
        Self {
            total: word_count(content),
            selected: selection.filter(|s| !s.trim().is_empty()).map(word_count),
        }
    }
}

impl fmt::Display for WordCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.selected {
            Some(selected) => write!(f, "{} of {} words", selected, self.total),
            None if self.total == 1 => write!(f, "1 word"),
            None => write!(f, "{} words", self.total),
        }
    }
}
