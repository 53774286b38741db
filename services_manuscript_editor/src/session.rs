//! Editing session
//!
//! One session owns the active chapter's document together with everything
//! derived from it. All calls run on the caller's thread; the host calls
//! [`EditingSession::poll`] from its event loop to fire due timers.

use crate::autosave::{AutosaveScheduler, SaveStatus};
use crate::error::{EditorError, EditorResult};
use crate::find::FindController;
use crate::stats::{ActivityTracker, Elapsed, WritingTimer};
use core_types::{ChapterId, ChapterRef, SessionId};
use input_types::{EditInput, RawBlock};
use manuscript_core::{
    clean_paste, detect_headings, detect_todos, heading_flags, AnnotationLimits, Annotations,
    Clock, CursorTracker, Document, DocumentSnapshot, HeadingMarker, MatchStatus, TodoMarker,
    WordCount,
};
use services_chapter_store::{ChapterStore, StoreError};
use services_logger::{LogBuffer, LogEntry, LogSink};
use services_settings::EditorSettings;

/// Something the host should react to after [`EditingSession::poll`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A debounced save completed
    Saved(ChapterId),
    /// A debounced save failed; the edit is still only in memory
    SaveFailed { chapter: ChapterId, error: StoreError },
    /// A debounced search ran
    SearchUpdated(MatchStatus),
    /// The writing timer paused itself after a quiet spell
    TimerAutoPaused(Elapsed),
}

/// Editing session over one chapter store
pub struct EditingSession<S: ChapterStore, C: Clock> {
    id: SessionId,
    store: S,
    clock: C,
    settings: EditorSettings,
    chapter: Option<ChapterRef>,
    document: Document,
    cursor: CursorTracker,
    autosave: AutosaveScheduler,
    find: FindController,
    activity: ActivityTracker,
    timer: WritingTimer,
    log: LogBuffer,
}

impl<S: ChapterStore, C: Clock> EditingSession<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        Self::with_settings(store, clock, EditorSettings::default())
    }

    pub fn with_settings(store: S, clock: C, settings: EditorSettings) -> Self {
        Self {
            id: SessionId::new(),
            store,
            clock,
            settings,
            chapter: None,
            document: Document::new(),
            cursor: CursorTracker::new(),
            autosave: AutosaveScheduler::new(
                settings.autosave_delay_ms,
                settings.autosave_status_clear_ms,
            ),
            find: FindController::new(
                settings.find_query_debounce_ms,
                settings.find_content_debounce_ms,
            ),
            activity: ActivityTracker::new(),
            timer: WritingTimer::new(),
            log: LogBuffer::default(),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn active_chapter(&self) -> Option<&ChapterRef> {
        self.chapter.as_ref()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn cursor(&self) -> &CursorTracker {
        &self.cursor
    }

    pub fn find(&self) -> &FindController {
        &self.find
    }

    pub fn logs(&self) -> &LogBuffer {
        &self.log
    }

    pub fn logs_mut(&mut self) -> &mut LogBuffer {
        &mut self.log
    }

    pub fn save_status(&self) -> &SaveStatus {
        self.autosave.status()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.autosave.has_unsaved_changes()
    }

    pub fn is_save_pending(&self) -> bool {
        self.autosave.is_pending()
    }

    fn now(&mut self) -> u64 {
        self.clock.poll_millis()
    }

    fn log(&mut self, entry: LogEntry) {
        self.log.log(entry.with_source(self.id));
    }

    fn limits(&self) -> AnnotationLimits {
        AnnotationLimits {
            todo_chars: self.settings.todo_preview_chars,
            heading_chars: self.settings.heading_preview_chars,
        }
    }

    // Chapter lifecycle

    /// Makes `chapter` the active chapter, or unloads when `None`
    ///
    /// Unsaved edits of the previous chapter are written first; if that
    /// write fails the switch is abandoned and the previous document stays.
    pub fn load_chapter(&mut self, chapter: Option<ChapterRef>) -> EditorResult<()> {
        self.flush()?;

        let Some(chapter) = chapter else {
            self.unload();
            return Ok(());
        };

        let text = match self.store.read(&chapter) {
            Ok(text) => text,
            Err(StoreError::NotFound(id)) => {
                let entry = LogEntry::warn("chapter text missing, starting empty");
                self.log(entry.with_field("chapter", id));
                String::new()
            }
            Err(err) => {
                self.unload();
                self.log(
                    LogEntry::error("chapter load failed")
                        .with_field("chapter", chapter.id)
                        .with_field("error", &err),
                );
                return Err(err.into());
            }
        };

        self.document.set_content(&text);
        self.cursor.move_to_end(&self.document);
        self.autosave.reset();
        self.find.chapter_changed(&self.document);
        self.focus_current_match();

        let paragraphs = self.document.len();
        self.log(
            LogEntry::info("chapter loaded")
                .with_field("chapter", chapter.id)
                .with_field("paragraphs", paragraphs),
        );
        self.chapter = Some(chapter);
        Ok(())
    }

    /// Flushes unsaved edits and leaves no chapter active
    pub fn close_project(&mut self) -> EditorResult<()> {
        self.flush()?;
        self.unload();
        self.find.close();
        self.log(LogEntry::info("project closed"));
        Ok(())
    }

    fn unload(&mut self) {
        self.chapter = None;
        self.document = Document::new();
        self.cursor.clear();
        self.autosave.reset();
        self.find.chapter_changed(&self.document);
    }

    fn flush(&mut self) -> EditorResult<()> {
        if self.chapter.is_some() && self.autosave.has_unsaved_changes() {
            self.save_now()
        } else {
            Ok(())
        }
    }

    // Content

    /// Canonical plain text of the active document
    pub fn content(&self) -> String {
        self.document.content()
    }

    /// Replaces the whole document; the caret moves to the end
    pub fn set_content(&mut self, text: &str) {
        self.document.set_content(text);
        self.cursor.move_to_end(&self.document);
        self.content_changed();
    }

    /// Tree the surface should render
    pub fn surface_tree(&self) -> Vec<RawBlock> {
        self.document.to_raw()
    }

    /// Applies one input event; returns true if the content changed
    pub fn handle_input(&mut self, input: EditInput) -> bool {
        let now = self.now();
        self.activity.record(now);

        let changed = match input {
            EditInput::InsertText(text) => self.insert(&text),
            EditInput::Paste(text) => match clean_paste(&text) {
                Some(text) => self.insert(&text),
                None => false,
            },
            EditInput::Enter => {
                self.delete_selection();
                let at = self.caret_or_end();
                let caret = self.document.split_paragraph(at);
                self.cursor.set_caret(&self.document, caret);
                true
            }
            EditInput::Backspace => {
                if self.delete_selection() {
                    true
                } else {
                    let at = self.caret_or_end();
                    match self.document.backspace(at) {
                        Some(caret) => {
                            self.cursor.set_caret(&self.document, caret);
                            true
                        }
                        None => false,
                    }
                }
            }
            EditInput::Delete => {
                if self.delete_selection() {
                    true
                } else {
                    let at = self.caret_or_end();
                    let changed = self.document.delete_forward(at);
                    self.cursor.set_caret(&self.document, at);
                    changed
                }
            }
            EditInput::MoveCaret(pos) => {
                self.cursor.set_caret(&self.document, pos);
                false
            }
            EditInput::Select { anchor, focus } => {
                self.cursor.select(&self.document, anchor, focus);
                false
            }
            EditInput::TreeMutation(blocks) => self.replace_tree(&blocks),
        };

        if changed {
            self.content_changed();
        }
        changed
    }

    /// Normalizes a tree reported by the surface into the document
    ///
    /// Returns true if the content changed.
    pub fn apply_tree(&mut self, blocks: &[RawBlock]) -> bool {
        let changed = self.replace_tree(blocks);
        if changed {
            self.content_changed();
        }
        changed
    }

    fn replace_tree(&mut self, blocks: &[RawBlock]) -> bool {
        let before = self.document.clone();
        if self.document.apply_tree(blocks) {
            let paragraphs = self.document.len();
            self.log(
                LogEntry::debug("surface tree normalized").with_field("paragraphs", paragraphs),
            );
        }
        self.cursor.revalidate(&self.document);
        self.document != before
    }

    fn caret_or_end(&self) -> core_types::TextPosition {
        self.cursor
            .caret()
            .or_else(|| self.document.end_position())
            .unwrap_or_default()
    }

    fn delete_selection(&mut self) -> bool {
        let Some(selection) = self.cursor.selection().filter(|s| !s.is_collapsed()) else {
            return false;
        };
        match self.document.delete_range(selection.anchor, selection.focus) {
            Some(caret) => {
                self.cursor.set_caret(&self.document, caret);
                true
            }
            None => false,
        }
    }

    fn insert(&mut self, text: &str) -> bool {
        let deleted = self.delete_selection();
        if text.is_empty() {
            return deleted;
        }
        let at = self.caret_or_end();
        let caret = self.document.insert_text(at, text);
        self.cursor.set_caret(&self.document, caret);
        true
    }

    fn content_changed(&mut self) {
        let now = self.now();
        self.activity.record(now);
        if self.chapter.is_some() {
            self.autosave.schedule(now);
        }
        self.find.content_changed(now);
    }

    // Persistence

    /// (Re)starts the autosave window for the active chapter
    pub fn schedule_save(&mut self) -> EditorResult<()> {
        if self.chapter.is_none() {
            return Err(EditorError::NoActiveChapter);
        }
        let now = self.now();
        self.autosave.schedule(now);
        Ok(())
    }

    /// Writes the active chapter immediately, cancelling any pending save
    pub fn save_now(&mut self) -> EditorResult<()> {
        let chapter = self.chapter.clone().ok_or(EditorError::NoActiveChapter)?;
        let content = self.document.content();
        let now = self.now();

        match self.autosave.save_now(&mut self.store, &chapter, &content, now) {
            Ok(()) => {
                self.log(
                    LogEntry::debug("chapter saved")
                        .with_field("chapter", chapter.id)
                        .with_field("bytes", content.len()),
                );
                Ok(())
            }
            Err(err) => {
                self.log(
                    LogEntry::error("chapter save failed")
                        .with_field("chapter", chapter.id)
                        .with_field("error", &err),
                );
                Err(err.into())
            }
        }
    }

    /// Fires due timers
    pub fn poll(&mut self) -> Vec<SessionEvent> {
        let now = self.now();
        let mut events = Vec::new();

        if self.autosave.take_due(now) {
            if let Some(chapter) = self.chapter.as_ref().map(|c| c.id) {
                match self.save_now() {
                    Ok(()) => events.push(SessionEvent::Saved(chapter)),
                    Err(EditorError::Store(error)) => {
                        events.push(SessionEvent::SaveFailed { chapter, error })
                    }
                    Err(EditorError::NoActiveChapter) => {}
                }
            }
        }
        self.autosave.tick_status(now);

        if let Some(status) = self.find.poll(&self.document, now) {
            self.focus_current_match();
            events.push(SessionEvent::SearchUpdated(status));
        }

        let threshold = self.settings.inactivity_threshold_ms;
        if self.timer.check_inactivity(&self.activity, now, threshold) {
            let elapsed = self.timer.elapsed(now);
            self.log(LogEntry::info("writing timer paused").with_field("elapsed", elapsed));
            events.push(SessionEvent::TimerAutoPaused(elapsed));
        }

        events
    }

    // Annotations

    pub fn detect_todos(&self) -> Vec<TodoMarker> {
        detect_todos(&self.document.content(), self.settings.todo_preview_chars)
    }

    pub fn detect_headings(&self) -> Vec<HeadingMarker> {
        detect_headings(&self.document, self.settings.heading_preview_chars)
    }

    pub fn annotations(&self) -> Annotations {
        Annotations::scan(&self.document, self.limits())
    }

    /// Heading flag per paragraph
    pub fn heading_flags(&self) -> Vec<bool> {
        heading_flags(&self.document)
    }

    /// Puts the caret at the start of 1-based paragraph `line`
    pub fn jump_to_line(&mut self, line: usize) -> bool {
        match line.checked_sub(1) {
            Some(index) => self.cursor.move_to_paragraph(&self.document, index, 0),
            None => false,
        }
    }

    // Find and replace

    /// Opens the find bar, seeding the query from a short selection
    pub fn open_find(&mut self, with_replace: bool) -> MatchStatus {
        let prefill = self.cursor.selected_text(&self.document);
        let status = self.find.open(&self.document, with_replace, prefill.as_deref());
        self.focus_current_match();
        status
    }

    pub fn close_find(&mut self) {
        self.find.close();
    }

    pub fn toggle_replace(&mut self) {
        self.find.toggle_replace();
    }

    /// Searches immediately
    pub fn search(&mut self, query: &str, case_sensitive: bool) -> MatchStatus {
        let status = self.find.search(&self.document, query, case_sensitive);
        self.focus_current_match();
        status
    }

    /// Updates the query as typed; the search runs from [`Self::poll`]
    pub fn set_find_query(&mut self, query: &str) {
        let now = self.now();
        self.find.set_query(query, now);
    }

    pub fn toggle_case_sensitive(&mut self) -> MatchStatus {
        let status = self.find.toggle_case_sensitive(&self.document);
        self.focus_current_match();
        status
    }

    pub fn navigate_next(&mut self) -> MatchStatus {
        let status = self.find.navigate_next();
        self.focus_current_match();
        status
    }

    pub fn navigate_prev(&mut self) -> MatchStatus {
        let status = self.find.navigate_prev();
        self.focus_current_match();
        status
    }

    /// Replaces the focused match and focuses the next one
    pub fn replace_current(&mut self, replacement: &str) -> MatchStatus {
        if self.find.replace_current(&mut self.document, replacement) {
            self.after_replace(1);
        }
        self.focus_current_match();
        self.find.status()
    }

    /// Replaces every match; returns how many were replaced
    pub fn replace_all(&mut self, replacement: &str) -> usize {
        let count = self.find.replace_all(&mut self.document, replacement);
        if count > 0 {
            self.cursor.revalidate(&self.document);
            self.after_replace(count);
        }
        count
    }

    pub fn find_status(&self) -> MatchStatus {
        self.find.status()
    }

    fn after_replace(&mut self, count: usize) {
        let now = self.now();
        self.activity.record(now);
        if self.chapter.is_some() {
            self.autosave.schedule(now);
        }
        self.log(LogEntry::info("text replaced").with_field("count", count));
    }

    fn focus_current_match(&mut self) {
        if let Some(current) = self.find.engine().current_match().cloned() {
            self.cursor.select(&self.document, current.start(), current.end());
        }
    }

    // Statistics

    pub fn word_count(&self) -> WordCount {
        let selected = self.cursor.selected_text(&self.document);
        WordCount::new(&self.document.content(), selected.as_deref())
    }

    /// True once the configured inactivity threshold has passed since the
    /// last input
    pub fn is_inactive(&mut self) -> bool {
        let now = self.now();
        self.activity.is_inactive(now, self.settings.inactivity_threshold_ms)
    }

    pub fn timer(&self) -> &WritingTimer {
        &self.timer
    }

    /// Starts the writing timer; counts as activity so it does not pause
    /// straight away
    pub fn start_timer(&mut self) -> bool {
        let now = self.now();
        self.activity.record(now);
        self.timer.start(now)
    }

    pub fn pause_timer(&mut self) -> bool {
        let now = self.now();
        self.timer.pause(now)
    }

    pub fn reset_timer(&mut self) {
        self.timer.reset();
    }

    pub fn set_timer_auto_pause(&mut self, enabled: bool) {
        self.timer.set_auto_pause(enabled);
    }

    pub fn writing_time(&mut self) -> Elapsed {
        let now = self.now();
        self.timer.elapsed(now)
    }

    pub fn snapshot(&self) -> DocumentSnapshot {
        DocumentSnapshot::capture(&self.document, &self.cursor, self.find.engine())
    }
}
