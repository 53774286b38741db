//! # Chapter Store Service
//!
//! Durable chapter text, addressed by [`ChapterRef`].
//!
//! ## Philosophy
//!
//! - **Text in, text out**: A chapter is UTF-8 plain text, one paragraph per line
//! - **Failures are values**: Every read and write returns a [`StoreError`];
//!   nothing is swallowed and nothing retries behind the caller's back
//! - **Swappable backends**: The editor only sees the [`ChapterStore`] trait
//!
//! ## Backends
//!
//! - [`MemoryChapterStore`]: map plus write journal, for tests and simulation
//! - [`FsChapterStore`]: project directory with a `project.json` manifest
//! - [`FailingChapterStore`]: wrapper that injects failures by policy

pub mod error;
pub mod failing;
pub mod fs;
pub mod memory;

pub use error::StoreError;
pub use failing::{FailingChapterStore, FailurePolicy};
pub use fs::{FsChapterStore, ProjectManifest};
pub use memory::{MemoryChapterStore, WriteRecord};

use core_types::ChapterRef;

/// Chapter persistence consumed by the editor
pub trait ChapterStore {
    /// Reads the full text of a chapter
    fn read(&mut self, chapter: &ChapterRef) -> Result<String, StoreError>;

    /// Replaces the full text of a chapter
    fn write(&mut self, chapter: &ChapterRef, text: &str) -> Result<(), StoreError>;

    /// Updates project modification metadata after a successful write
    fn touch_project(&mut self) -> Result<(), StoreError> {
        Ok(())
    }
}

impl<S: ChapterStore + ?Sized> ChapterStore for Box<S> {
    fn read(&mut self, chapter: &ChapterRef) -> Result<String, StoreError> {
        (**self).read(chapter)
    }

    fn write(&mut self, chapter: &ChapterRef, text: &str) -> Result<(), StoreError> {
        (**self).write(chapter, text)
    }

    fn touch_project(&mut self) -> Result<(), StoreError> {
        (**self).touch_project()
    }
}
