//! # Core Types
//!
//! This crate defines the fundamental types shared by the manuscript editor.
//!
//! ## Philosophy
//!
//! - **Explicit over implicit**: Chapters are addressed by typed ids, never by paths.
//! - **Index coordinates**: Positions name a paragraph index and a byte offset,
//!   never a pointer into a retained tree.
//! - **Serializable**: Every type round-trips through serde for snapshots and metadata.
//!
//! ## Key Types
//!
//! - [`ChapterId`]: Project-local chapter identifier
//! - [`ChapterRef`]: Chapter identity plus the title used to name its file
//! - [`SessionId`]: Unique identifier for an editing session
//! - [`TextPosition`]: Paragraph/offset coordinate inside a document

pub mod chapter;
pub mod ids;
pub mod position;

pub use chapter::{slugify, ChapterRef};
pub use ids::{ChapterId, SessionId};
pub use position::TextPosition;
