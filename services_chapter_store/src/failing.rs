//! # Failing Chapter Store
//!
//! A ChapterStore wrapper that can simulate failures for testing how the
//! editor surfaces them. Reads pass through unless the policy names the
//! chapter.

use crate::{ChapterStore, StoreError};
use core_types::{ChapterId, ChapterRef};

/// Policy for when failures should occur
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Never fail (passthrough)
    Never,
    /// Fail every write and every project touch
    Always,
    /// Fail after N successful writes
    AfterWrites(usize),
    /// Fail reads and writes of specific chapters
    OnChapters(Vec<ChapterId>),
}

/// Wrapper around a ChapterStore that can simulate failures
#[derive(Debug)]
pub struct FailingChapterStore<S: ChapterStore> {
    inner: S,
    policy: FailurePolicy,
    write_count: usize,
    failures: usize,
}

impl<S: ChapterStore> FailingChapterStore<S> {
    pub fn new(inner: S, policy: FailurePolicy) -> Self {
        Self {
            inner,
            policy,
            write_count: 0,
            failures: 0,
        }
    }

    fn should_fail_write(&self, id: ChapterId) -> bool {
        match &self.policy {
            FailurePolicy::Never => false,
            FailurePolicy::Always => true,
            FailurePolicy::AfterWrites(n) => self.write_count >= *n,
            FailurePolicy::OnChapters(ids) => ids.contains(&id),
        }
    }

    fn injected(&mut self, what: &str) -> StoreError {
        self.failures += 1;
        StoreError::Injected(what.to_string())
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    /// Successful writes seen so far
    pub fn write_count(&self) -> usize {
        self.write_count
    }

    /// Failures injected so far
    pub fn failure_count(&self) -> usize {
        self.failures
    }

    /// Replaces the policy and resets the counters
    pub fn set_policy(&mut self, policy: FailurePolicy) {
        self.policy = policy;
        self.write_count = 0;
        self.failures = 0;
    }
}

impl<S: ChapterStore> ChapterStore for FailingChapterStore<S> {
    fn read(&mut self, chapter: &ChapterRef) -> Result<String, StoreError> {
        if matches!(&self.policy, FailurePolicy::OnChapters(ids) if ids.contains(&chapter.id)) {
            return Err(self.injected("read"));
        }
        self.inner.read(chapter)
    }

    fn write(&mut self, chapter: &ChapterRef, text: &str) -> Result<(), StoreError> {
        if self.should_fail_write(chapter.id) {
            return Err(self.injected("write"));
        }
        self.inner.write(chapter, text)?;
        self.write_count += 1;
        Ok(())
    }

    fn touch_project(&mut self) -> Result<(), StoreError> {
        if self.policy == FailurePolicy::Always {
            return Err(self.injected("touch"));
        }
        self.inner.touch_project()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryChapterStore;

    fn chapter(id: u32) -> ChapterRef {
        ChapterRef::new(ChapterId::new(id), "c", id)
    }

    #[test]
    fn test_never_passes_through() {
        let mut store = FailingChapterStore::new(MemoryChapterStore::new(), FailurePolicy::Never);
        assert!(store.write(&chapter(1), "x").is_ok());
        assert!(store.touch_project().is_ok());
        assert_eq!(store.read(&chapter(1)).unwrap(), "x");
        assert_eq!(store.inner().write_count(), 1);
    }

    #[test]
    fn test_always_fails_writes_not_reads() {
        let inner = MemoryChapterStore::new().with_chapter(ChapterId::new(1), "seed");
        let mut store = FailingChapterStore::new(inner, FailurePolicy::Always);
        assert!(matches!(store.write(&chapter(1), "x"), Err(StoreError::Injected(_))));
        assert!(store.touch_project().is_err());
        assert_eq!(store.read(&chapter(1)).unwrap(), "seed");
        assert_eq!(store.failure_count(), 2);
        assert_eq!(store.inner().write_count(), 0);
    }

    #[test]
    fn test_after_writes() {
        let mut store =
            FailingChapterStore::new(MemoryChapterStore::new(), FailurePolicy::AfterWrites(2));
        assert!(store.write(&chapter(1), "a").is_ok());
        assert!(store.write(&chapter(1), "b").is_ok());
        assert!(store.write(&chapter(1), "c").is_err());
        assert_eq!(store.inner().text(ChapterId::new(1)), Some("b"));
    }

    #[test]
    fn test_on_chapters() {
        let mut store = FailingChapterStore::new(
            MemoryChapterStore::new(),
            FailurePolicy::OnChapters(vec![ChapterId::new(2)]),
        );
        assert!(store.write(&chapter(1), "a").is_ok());
        assert!(store.write(&chapter(2), "b").is_err());
        assert!(store.read(&chapter(2)).is_err());
    }

    #[test]
    fn test_set_policy_resets() {
        let mut store = FailingChapterStore::new(MemoryChapterStore::new(), FailurePolicy::Always);
        assert!(store.write(&chapter(1), "a").is_err());
        store.set_policy(FailurePolicy::Never);
        assert_eq!(store.failure_count(), 0);
        assert!(store.write(&chapter(1), "a").is_ok());
        assert_eq!(store.write_count(), 1);
    }
}
