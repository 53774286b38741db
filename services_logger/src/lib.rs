//! # Logger Service
//!
//! This crate implements structured logging.
//!
//! ## Philosophy
//!
//! Logging is explicit and structured, not text-based or printf-style.
//! Entries carry a level, an optional source session and key/value fields;
//! sinks decide what to keep.

use core_types::SessionId;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LogLevel {
    /// Debug information
    Debug,
    /// Informational messages
    Info,
    /// Warnings
    Warn,
    /// Errors
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        };
        f.write_str(label)
    }
}

/// A structured log entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Log level
    pub level: LogLevel,
    /// Source session (if known)
    pub source: Option<SessionId>,
    /// Log message
    pub message: String,
    /// Structured fields
    pub fields: Vec<(String, String)>,
}

impl LogEntry {
    /// Creates a new log entry
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            source: None,
            message: message.into(),
            fields: Vec::new(),
        }
    }

    pub fn debug(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Debug, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Info, message)
    }

    pub fn warn(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Warn, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Error, message)
    }

    /// Sets the source session
    pub fn with_source(mut self, source: SessionId) -> Self {
        self.source = Some(source);
        self
    }

    /// Adds a field to the log entry
    pub fn with_field(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.fields.push((key.into(), value.to_string()));
        self
    }

    /// Value of the first field named `key`
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level, self.message)?;
        for (key, value) in &self.fields {
            write!(f, " {}={}", key, value)?;
        }
        Ok(())
    }
}

/// Destination for log entries
pub trait LogSink {
    fn log(&mut self, entry: LogEntry);
}

/// Bounded in-memory sink keeping the most recent entries
///
/// Entries below `min_level` are dropped on arrival; once `capacity` is
/// reached the oldest entry is evicted.
#[derive(Debug, Clone)]
pub struct LogBuffer {
    entries: VecDeque<LogEntry>,
    capacity: usize,
    min_level: LogLevel,
    dropped: usize,
}

impl LogBuffer {
    pub const DEFAULT_CAPACITY: usize = 256;

    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(Self::DEFAULT_CAPACITY)),
            capacity,
            min_level: LogLevel::Debug,
            dropped: 0,
        }
    }

    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    pub fn set_min_level(&mut self, level: LogLevel) {
        self.min_level = level;
    }

    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries evicted for capacity so far
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    /// Retained entries at or above `level`
    pub fn at_least(&self, level: LogLevel) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().filter(move |e| e.level >= level)
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.back()
    }

    /// Removes and returns every retained entry, oldest first
    pub fn drain(&mut self) -> Vec<LogEntry> {
        self.entries.drain(..).collect()
    }
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

impl LogSink for LogBuffer {
    fn log(&mut self, entry: LogEntry) {
        if entry.level < self.min_level || self.capacity == 0 {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
            self.dropped += 1;
        }
        self.entries.push_back(entry);
    }
}
