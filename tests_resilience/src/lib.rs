//! Resilience Test Utilities
//!
//! This crate provides shared utilities for resilience and integration tests.
//!
//! ## Test Philosophy
//!
//! - **Safety under faults**: A failed write never loses the edit it carried
//! - **Deterministic failures**: All faults are reproducible via FailurePolicy
//! - **Deterministic time**: Every timer is driven by a ManualClock
//! - **Consistency**: What the store holds matches what the writer saw

use core_types::{ChapterId, ChapterRef};
use manuscript_core::ManualClock;
use services_chapter_store::{FailingChapterStore, FailurePolicy, MemoryChapterStore};
use services_manuscript_editor::EditingSession;

pub type MemorySession = EditingSession<MemoryChapterStore, ManualClock>;
pub type FaultySession = EditingSession<FailingChapterStore<MemoryChapterStore>, ManualClock>;

/// Chapter reference whose order matches its id
pub fn chapter(id: u32) -> ChapterRef {
    ChapterRef::new(ChapterId::new(id), format!("Chapter {}", id), id)
}

/// In-memory project with chapters numbered from 1
pub fn project(texts: &[&str]) -> MemoryChapterStore {
    let mut store = MemoryChapterStore::new();
    for (index, text) in texts.iter().enumerate() {
        store.insert(ChapterId::new(index as u32 + 1), *text);
    }
    store
}

/// Session over `texts` with chapter 1 loaded
pub fn memory_session(texts: &[&str]) -> (MemorySession, ManualClock) {
    let clock = ManualClock::new();
    let mut session = EditingSession::new(project(texts), clock.clone());
    session
        .load_chapter(Some(chapter(1)))
        .expect("chapter 1 should load");
    (session, clock)
}

/// Session over `texts` behind a fault-injecting store, chapter 1 loaded
///
/// The policy starts as `Never` so the load succeeds; tests switch it.
pub fn faulty_session(texts: &[&str]) -> (FaultySession, ManualClock) {
    let clock = ManualClock::new();
    let store = FailingChapterStore::new(project(texts), FailurePolicy::Never);
    let mut session = EditingSession::new(store, clock.clone());
    session
        .load_chapter(Some(chapter(1)))
        .expect("chapter 1 should load");
    (session, clock)
}
