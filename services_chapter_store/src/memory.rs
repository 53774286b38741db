//! In-memory chapter store

use crate::{ChapterStore, StoreError};
use core_types::{ChapterId, ChapterRef};
use std::collections::BTreeMap;

/// One successful write, in the order it happened
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteRecord {
    pub chapter: ChapterId,
    pub text: String,
}

/// Chapter texts held in a map, with a journal of every write
#[derive(Debug, Clone, Default)]
pub struct MemoryChapterStore {
    chapters: BTreeMap<ChapterId, String>,
    journal: Vec<WriteRecord>,
    touches: usize,
}

impl MemoryChapterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a chapter without recording a write
    pub fn with_chapter(mut self, id: ChapterId, text: impl Into<String>) -> Self {
        self.chapters.insert(id, text.into());
        self
    }

    pub fn insert(&mut self, id: ChapterId, text: impl Into<String>) {
        self.chapters.insert(id, text.into());
    }

    pub fn text(&self, id: ChapterId) -> Option<&str> {
        self.chapters.get(&id).map(String::as_str)
    }

    pub fn writes(&self) -> &[WriteRecord] {
        &self.journal
    }

    pub fn writes_to(&self, id: ChapterId) -> Vec<&WriteRecord> {
        self.journal.iter().filter(|w| w.chapter == id).collect()
    }

    pub fn write_count(&self) -> usize {
        self.journal.len()
    }

    /// Number of project metadata updates
    pub fn touch_count(&self) -> usize {
        self.touches
    }

    pub fn clear_journal(&mut self) {
        self.journal.clear();
        self.touches = 0;
    }
}

impl ChapterStore for MemoryChapterStore {
    fn read(&mut self, chapter: &ChapterRef) -> Result<String, StoreError> {
        self.chapters
            .get(&chapter.id)
            .cloned()
            .ok_or(StoreError::NotFound(chapter.id))
    }

    fn write(&mut self, chapter: &ChapterRef, text: &str) -> Result<(), StoreError> {
        self.chapters.insert(chapter.id, text.to_string());
        self.journal.push(WriteRecord {
            chapter: chapter.id,
            text: text.to_string(),
        });
        Ok(())
    }

    fn touch_project(&mut self) -> Result<(), StoreError> {
        self.touches += 1;
        Ok(())
    }
}
