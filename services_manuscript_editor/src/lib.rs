//! # Manuscript Editor Service
//!
//! This crate wires the manuscript core to durable chapter storage.
//!
//! ## Philosophy
//!
//! - **One control loop**: Every operation is a plain call; timers fire only
//!   when the host polls
//! - **No lost edits**: Switching chapters or closing the project writes
//!   unsaved text first, and a failed write stops the switch
//! - **Failures are reported**: Store errors reach the caller and the log,
//!   never a silent retry
//! - **Testable**: A manual clock and an in-memory store drive every scenario
//!
//! ## Non-Goals
//!
//! This is NOT:
//! - A rich-text editor (paragraphs of plain text only)
//! - A project manager (chapter lists belong to the store)
//! - An undo system
//!
//! ## Design
//!
//! - [`EditingSession`] owns the active chapter's document, cursor and find bar
//! - [`AutosaveScheduler`] coalesces edits into single debounced writes
//! - [`FindController`] debounces query typing and content-change re-searches
//! - [`WritingTimer`] measures writing time and pauses itself when the
//!   writer goes quiet

pub mod autosave;
pub mod error;
pub mod find;
pub mod session;
pub mod stats;

pub use autosave::{AutosaveScheduler, SaveStatus};
pub use error::{EditorError, EditorResult};
pub use find::FindController;
pub use session::{EditingSession, SessionEvent};
pub use stats::{ActivityTracker, Elapsed, WritingTimer};
