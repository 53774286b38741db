//! Debounced autosave
//!
//! Edits are coalesced, never queued: every schedule restarts the single
//! timer. A save cancels the timer before writing, so at most one write per
//! chapter is ever outstanding.

use core_types::ChapterRef;
use manuscript_core::DebounceTimer;
use serde::{Deserialize, Serialize};
use services_chapter_store::{ChapterStore, StoreError};
use std::fmt;

/// What the status bar shows about persistence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SaveStatus {
    Idle,
    /// A save is scheduled but has not run yet
    Pending,
    /// Last save succeeded at the given clock time
    Saved { at: u64 },
    Failed(String),
}

impl fmt::Display for SaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveStatus::Idle => Ok(()),
            SaveStatus::Pending => write!(f, "Unsaved changes"),
            SaveStatus::Saved { .. } => write!(f, "Saved"),
            SaveStatus::Failed(reason) => write!(f, "Save failed: {}", reason),
        }
    }
}

/// Single-slot save scheduler for the active chapter
#[derive(Debug, Clone)]
pub struct AutosaveScheduler {
    timer: DebounceTimer,
    status: SaveStatus,
    status_clear_ms: u64,
    /// Edits exist that no successful write has covered yet
    unsaved: bool,
    writes: usize,
}

impl AutosaveScheduler {
    pub fn new(delay_ms: u64, status_clear_ms: u64) -> Self {
        Self {
            timer: DebounceTimer::new(delay_ms),
            status: SaveStatus::Idle,
            status_clear_ms,
            unsaved: false,
            writes: 0,
        }
    }

    /// (Re)starts the debounce window
    pub fn schedule(&mut self, now: u64) {
        self.timer.arm(now);
        self.unsaved = true;
        self.status = SaveStatus::Pending;
    }

    pub fn is_pending(&self) -> bool {
        self.timer.is_pending()
    }

    /// True while some edit is not on disk, including after a failed save
    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved
    }

    pub fn status(&self) -> &SaveStatus {
        &self.status
    }

    /// Successful writes performed through this scheduler
    pub fn write_count(&self) -> usize {
        self.writes
    }

    /// Drops any pending save and forgets unsaved state
    pub fn reset(&mut self) {
        self.timer.cancel();
        self.unsaved = false;
        self.status = SaveStatus::Idle;
    }

    /// Disarms and returns true once the debounce window has elapsed
    pub fn take_due(&mut self, now: u64) -> bool {
        self.timer.fire(now)
    }

    /// Lets a `Saved` status decay back to `Idle`
    pub fn tick_status(&mut self, now: u64) {
        if let SaveStatus::Saved { at } = self.status {
            if now >= at.saturating_add(self.status_clear_ms) {
                self.status = SaveStatus::Idle;
            }
        }
    }

    /// Cancels the timer and writes `text` right away, then touches the
    /// project metadata
    ///
    /// On failure the timer stays cleared and the edit remains unsaved; no
    /// retry is attempted.
    pub fn save_now<S: ChapterStore + ?Sized>(
        &mut self,
        store: &mut S,
        chapter: &ChapterRef,
        text: &str,
        now: u64,
    ) -> Result<(), StoreError> {
        self.timer.cancel();
        match store.write(chapter, text).and_then(|_| store.touch_project()) {
            Ok(()) => {
                self.writes += 1;
                self.unsaved = false;
                self.status = SaveStatus::Saved { at: now };
                Ok(())
            }
            Err(err) => {
                self.status = SaveStatus::Failed(err.to_string());
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::ChapterId;
    use services_chapter_store::{FailingChapterStore, FailurePolicy, MemoryChapterStore};

    fn chapter() -> ChapterRef {
        ChapterRef::new(ChapterId::new(1), "One", 1)
    }

    #[test]
    fn test_schedule_coalesces() {
        let mut autosave = AutosaveScheduler::new(500, 2000);
        autosave.schedule(0);
        autosave.schedule(300);
        assert!(!autosave.take_due(500));
        assert!(autosave.take_due(800));
        assert!(!autosave.take_due(2000));
    }

    #[test]
    fn test_save_now_writes_and_touches() {
        let mut store = MemoryChapterStore::new();
        let mut autosave = AutosaveScheduler::new(500, 2000);
        autosave.schedule(0);

        autosave.save_now(&mut store, &chapter(), "text", 100).unwrap();
        assert!(!autosave.is_pending());
        assert!(!autosave.has_unsaved_changes());
        assert_eq!(autosave.status(), &SaveStatus::Saved { at: 100 });
        assert_eq!(store.write_count(), 1);
        assert_eq!(store.touch_count(), 1);
        assert_eq!(autosave.write_count(), 1);
    }

    #[test]
    fn test_failed_save_keeps_unsaved_and_clears_timer() {
        let mut store = FailingChapterStore::new(MemoryChapterStore::new(), FailurePolicy::Always);
        let mut autosave = AutosaveScheduler::new(500, 2000);
        autosave.schedule(0);

        let err = autosave.save_now(&mut store, &chapter(), "text", 10).unwrap_err();
        assert!(matches!(err, StoreError::Injected(_)));
        assert!(!autosave.is_pending());
        assert!(autosave.has_unsaved_changes());
        assert!(matches!(autosave.status(), SaveStatus::Failed(_)));
    }

    #[test]
    fn test_status_decays_after_clear_delay() {
        let mut store = MemoryChapterStore::new();
        let mut autosave = AutosaveScheduler::new(500, 2000);
        autosave.save_now(&mut store, &chapter(), "x", 1000).unwrap();
        autosave.tick_status(2999);
        assert_eq!(autosave.status().to_string(), "Saved");
        autosave.tick_status(3000);
        assert_eq!(autosave.status(), &SaveStatus::Idle);
    }

    #[test]
    fn test_reset() {
        let mut autosave = AutosaveScheduler::new(500, 2000);
        autosave.schedule(0);
        autosave.reset();
        assert!(!autosave.is_pending());
        assert!(!autosave.has_unsaved_changes());
        assert_eq!(autosave.status(), &SaveStatus::Idle);
    }
}
