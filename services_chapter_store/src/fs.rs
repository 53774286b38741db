//! Project directory backend
//!
//! ```text
//! <root>/
//!   project.json        manifest: name, timestamps, chapter list, settings
//!   chapters/
//!     001-opening.md
//!     002-the-long-night.md
//! ```
//!
//! Chapter files are named from the id and title slug. Renaming a chapter
//! leaves its old file in place, so reads fall back to any file carrying the
//! same zero-padded id prefix.

use crate::{ChapterStore, StoreError};
use core_types::{ChapterId, ChapterRef};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

const MANIFEST_FILE: &str = "project.json";
const CHAPTERS_DIR: &str = "chapters";

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or_default()
}

/// Contents of `project.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectManifest {
    pub name: String,
    /// Milliseconds since the Unix epoch
    pub created: u64,
    /// Milliseconds since the Unix epoch
    pub modified: u64,
    #[serde(default)]
    pub chapters: Vec<ChapterRef>,
    /// Project setting overrides, kept opaque here
    #[serde(default)]
    pub settings: serde_json::Value,
}

impl ProjectManifest {
    pub fn new(name: impl Into<String>) -> Self {
        let now = now_millis();
        Self {
            name: name.into(),
            created: now,
            modified: now,
            chapters: Vec::new(),
            settings: serde_json::Value::Null,
        }
    }

    pub fn chapter(&self, id: ChapterId) -> Option<&ChapterRef> {
        self.chapters.iter().find(|c| c.id == id)
    }

    fn next_id(&self) -> ChapterId {
        self.chapters
            .iter()
            .map(|c| c.id)
            .max()
            .map_or(ChapterId::new(1), |id| id.next())
    }
}

/// Chapter store backed by a project directory
#[derive(Debug)]
pub struct FsChapterStore {
    root: PathBuf,
    manifest: ProjectManifest,
}

impl FsChapterStore {
    /// Creates a new project at `root`, which may or may not exist yet
    pub fn create(root: impl Into<PathBuf>, name: impl Into<String>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(root.join(CHAPTERS_DIR))?;
        let store = Self {
            root,
            manifest: ProjectManifest::new(name),
        };
        store.write_manifest()?;
        Ok(store)
    }

    /// Opens an existing project
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        let raw = fs::read_to_string(root.join(MANIFEST_FILE)).map_err(|err| {
            StoreError::Metadata(format!("cannot read {}: {}", MANIFEST_FILE, err))
        })?;
        let manifest: ProjectManifest = serde_json::from_str(&raw)?;
        fs::create_dir_all(root.join(CHAPTERS_DIR))?;
        Ok(Self { root, manifest })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifest(&self) -> &ProjectManifest {
        &self.manifest
    }

    pub fn chapters(&self) -> &[ChapterRef] {
        &self.manifest.chapters
    }

    /// Appends a chapter to the project, seeding its file with a title heading
    pub fn add_chapter(&mut self, title: impl Into<String>) -> Result<ChapterRef, StoreError> {
        let order = u32::try_from(self.manifest.chapters.len() + 1)
            .map_err(|_| StoreError::Metadata("too many chapters".to_string()))?;
        let chapter = ChapterRef::new(self.manifest.next_id(), title, order);
        let seed = format!("# {}\n\n", chapter.title);
        Self::write_atomic(&self.chapter_path(&chapter), seed.as_bytes())?;
        self.manifest.chapters.push(chapter.clone());
        self.manifest.modified = now_millis();
        self.write_manifest()?;
        Ok(chapter)
    }

    /// Replaces the opaque settings block of the manifest
    pub fn set_settings(&mut self, settings: serde_json::Value) -> Result<(), StoreError> {
        self.manifest.settings = settings;
        self.write_manifest()
    }

    pub fn chapter_path(&self, chapter: &ChapterRef) -> PathBuf {
        self.root.join(CHAPTERS_DIR).join(chapter.file_name())
    }

    /// First file in `chapters/` whose name starts with the padded id
    fn find_by_prefix(&self, id: ChapterId) -> Result<Option<PathBuf>, StoreError> {
        let prefix = format!("{}-", id);
        let mut candidates = Vec::new();
        for entry in fs::read_dir(self.root.join(CHAPTERS_DIR))? {
            let entry = entry?;
            if entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.starts_with(&prefix) && name.ends_with(".md"))
            {
                candidates.push(entry.path());
            }
        }
        candidates.sort();
        Ok(candidates.into_iter().next())
    }

    fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, path)
    }

    fn write_manifest(&self) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(&self.manifest)?;
        Self::write_atomic(&self.root.join(MANIFEST_FILE), json.as_bytes())
            .map_err(|err| StoreError::Metadata(err.to_string()))
    }
}

impl ChapterStore for FsChapterStore {
    fn read(&mut self, chapter: &ChapterRef) -> Result<String, StoreError> {
        let exact = self.chapter_path(chapter);
        let path = if exact.is_file() {
            exact
        } else {
            self.find_by_prefix(chapter.id)?
                .ok_or(StoreError::NotFound(chapter.id))?
        };
        let bytes = fs::read(&path)?;
        String::from_utf8(bytes).map_err(|_| StoreError::InvalidUtf8(chapter.id))
    }

    fn write(&mut self, chapter: &ChapterRef, text: &str) -> Result<(), StoreError> {
        Self::write_atomic(&self.chapter_path(chapter), text.as_bytes())?;
        Ok(())
    }

    fn touch_project(&mut self) -> Result<(), StoreError> {
        self.manifest.modified = now_millis().max(self.manifest.modified);
        self.write_manifest()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_writes_manifest() {
        let dir = TempDir::new().unwrap();
        let store = FsChapterStore::create(dir.path(), "Novel").unwrap();
        assert!(dir.path().join("project.json").is_file());
        assert!(dir.path().join("chapters").is_dir());
        assert_eq!(store.manifest().name, "Novel");
        assert!(store.chapters().is_empty());
    }

    #[test]
    fn test_add_chapter_assigns_ids_and_order() {
        let dir = TempDir::new().unwrap();
        let mut store = FsChapterStore::create(dir.path(), "Novel").unwrap();
        let one = store.add_chapter("Opening").unwrap();
        let two = store.add_chapter("The Long Night").unwrap();
        assert_eq!((one.id, one.order), (ChapterId::new(1), 1));
        assert_eq!((two.id, two.order), (ChapterId::new(2), 2));
        assert_eq!(
            store.chapter_path(&two),
            dir.path().join("chapters").join("002-the-long-night.md")
        );
    }

    #[test]
    fn test_new_chapter_starts_with_its_heading() {
        let dir = TempDir::new().unwrap();
        let mut store = FsChapterStore::create(dir.path(), "Novel").unwrap();
        let chapter = store.add_chapter("The Long Night").unwrap();
        assert_eq!(store.read(&chapter).unwrap(), "# The Long Night\n\n");
        assert!(store.chapter_path(&chapter).is_file());
    }

    #[test]
    fn test_unregistered_chapter_is_not_found() {
        let dir = TempDir::new().unwrap();
        let mut store = FsChapterStore::create(dir.path(), "Novel").unwrap();
        store.add_chapter("Opening").unwrap();
        let loose = ChapterRef::new(ChapterId::new(7), "Loose", 7);
        assert_eq!(store.read(&loose), Err(StoreError::NotFound(loose.id)));
    }

    #[test]
    fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let mut store = FsChapterStore::create(dir.path(), "Novel").unwrap();
        let chapter = store.add_chapter("Opening").unwrap();
        store.write(&chapter, "# Opening\nIt was dark.").unwrap();
        assert_eq!(store.read(&chapter).unwrap(), "# Opening\nIt was dark.");
        assert!(!dir.path().join("chapters").join("001-opening.md.tmp").exists());
    }

    #[test]
    fn test_read_falls_back_to_id_prefix_after_rename() {
        let dir = TempDir::new().unwrap();
        let mut store = FsChapterStore::create(dir.path(), "Novel").unwrap();
        let chapter = store.add_chapter("Old Title").unwrap();
        store.write(&chapter, "kept").unwrap();

        let renamed = ChapterRef::new(chapter.id, "New Title", chapter.order);
        assert_eq!(store.read(&renamed).unwrap(), "kept");
    }

    #[test]
    fn test_invalid_utf8() {
        let dir = TempDir::new().unwrap();
        let mut store = FsChapterStore::create(dir.path(), "Novel").unwrap();
        let chapter = store.add_chapter("Bad").unwrap();
        fs::write(store.chapter_path(&chapter), [0xff, 0xfe]).unwrap();
        assert_eq!(store.read(&chapter), Err(StoreError::InvalidUtf8(chapter.id)));
    }

    #[test]
    fn test_open_round_trips_manifest() {
        let dir = TempDir::new().unwrap();
        {
            let mut store = FsChapterStore::create(dir.path(), "Novel").unwrap();
            store.add_chapter("Opening").unwrap();
            store
                .set_settings(serde_json::json!({ "autosave.delay_ms": 250 }))
                .unwrap();
            store.touch_project().unwrap();
        }
        let store = FsChapterStore::open(dir.path()).unwrap();
        assert_eq!(store.chapters().len(), 1);
        assert_eq!(store.manifest().settings["autosave.delay_ms"], 250);
        assert!(store.manifest().modified >= store.manifest().created);
    }

    #[test]
    fn test_open_missing_or_corrupt_manifest() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(FsChapterStore::open(dir.path()), Err(StoreError::Metadata(_))));
        fs::write(dir.path().join("project.json"), "{not json").unwrap();
        assert!(matches!(FsChapterStore::open(dir.path()), Err(StoreError::Metadata(_))));
    }
}
