//! # Manuscript Core
//!
//! The in-memory editing model for one chapter of a manuscript.
//!
//! ## Philosophy
//!
//! - **Paragraphs only**: A document is exactly an ordered list of paragraphs;
//!   whatever the surface reports is normalized back into that shape
//! - **Deterministic**: Same input trace => same document, same matches
//! - **Recompute, don't patch**: Annotations and search matches are rebuilt
//!   from scratch after every change
//! - **Explicit time**: Debounce timers are driven by a polled clock, never by
//!   hidden threads
//!
//! ## Design
//!
//! The core provides:
//! - Document: paragraph list, normalization, plain-text serialization, edits
//! - CursorTracker: caret/selection mapped onto paragraph coordinates
//! - annotations: TODO markers and `## ` headings
//! - SearchEngine: literal find/replace over the paragraph list
//! - DebounceTimer: single-slot cancellable deadline
//! - DocumentSnapshot: serializable state for parity testing

pub mod annotations;
pub mod cursor;
pub mod document;
pub mod paragraph;
pub mod search;
pub mod snapshot;
pub mod stats;
pub mod timer;

pub use annotations::{
    detect_headings, detect_todos, heading_flags, AnnotationLimits, Annotations, HeadingMarker,
    TodoMarker,
};
pub use cursor::{CursorTracker, Selection};
pub use document::{clean_paste, normalize, Document, Normalized};
pub use paragraph::{Paragraph, PLACEHOLDER};
pub use search::{find_matches, Match, MatchStatus, SearchEngine, SearchState};
pub use snapshot::DocumentSnapshot;
pub use stats::{word_count, WordCount};
pub use timer::{Clock, DebounceTimer, ManualClock, SystemClock};
