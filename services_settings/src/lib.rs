//! # Settings Registry Service
//!
//! A typed, layered settings system for the manuscript editor.
//!
//! ## Philosophy
//!
//! - **Typed settings**: All settings have explicit types, not stringly-typed
//! - **Layered**: Read-only defaults + per-project overrides
//! - **Deterministic**: Settings are serializable and reproducible
//! - **Testable**: All settings logic can be tested independently
//!
//! ## Features
//!
//! - Read-only defaults baked in
//! - Project overrides persisted alongside the project manifest
//! - Autosave, find debounce, annotation preview and inactivity tuning
//! - No global config files, no environment variables
//!
//! ## Example
//!
//! ```
//! use services_settings::{create_default_registry, keys, EditorSettings, SettingValue};
//!
//! let mut registry = create_default_registry();
//! registry.set_override(keys::AUTOSAVE_DELAY_MS, SettingValue::Integer(250));
//!
//! let settings = EditorSettings::from_registry(&registry);
//! assert_eq!(settings.autosave_delay_ms, 250);
//! ```

pub mod persistence;

pub use persistence::{
    deserialize_overrides, load_overrides_safe, serialize_overrides, PersistenceError,
    PersistenceResult, SettingsOverridesData,
};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Dotted setting name, e.g. `autosave.delay_ms`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SettingKey(String);

impl SettingKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True if the key lives under the dotted `section`
    pub fn in_section(&self, section: &str) -> bool {
        let section = section.trim_end_matches('.');
        self.0
            .strip_prefix(section)
            .is_some_and(|rest| rest.starts_with('.'))
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SettingKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Setting value as it appears in the project manifest
///
/// Untagged, so a manifest reads `"autosave.delay_ms": 250` rather than a
/// wrapped enum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Integer(i64),
    Boolean(bool),
    Text(String),
}

impl SettingValue {
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            SettingValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            SettingValue::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            SettingValue::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Integer(v) => write!(f, "{}", v),
            SettingValue::Boolean(v) => write!(f, "{}", v),
            SettingValue::Text(v) => write!(f, "{:?}", v),
        }
    }
}

/// Settings registry
#[derive(Debug, Clone, Default)]
pub struct SettingsRegistry {
    /// Default settings (read-only)
    defaults: BTreeMap<SettingKey, SettingValue>,
    /// Project overrides
    overrides: BTreeMap<SettingKey, SettingValue>,
}

impl SettingsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_default(&mut self, key: impl Into<SettingKey>, value: SettingValue) {
        self.defaults.insert(key.into(), value);
    }

    pub fn set_override(&mut self, key: impl Into<SettingKey>, value: SettingValue) {
        self.overrides.insert(key.into(), value);
    }

    /// Removes an override; returns true if one existed
    pub fn remove_override(&mut self, key: &SettingKey) -> bool {
        self.overrides.remove(key).is_some()
    }

    /// Effective value: override first, then default
    pub fn get(&self, key: &SettingKey) -> Option<&SettingValue> {
        self.overrides.get(key).or_else(|| self.defaults.get(key))
    }

    pub fn get_default(&self, key: &SettingKey) -> Option<&SettingValue> {
        self.defaults.get(key)
    }

    pub fn get_override(&self, key: &SettingKey) -> Option<&SettingValue> {
        self.overrides.get(key)
    }

    /// Effective integer value, if present and integer-typed
    ///
    /// An override of the wrong type is ignored in favor of the default.
    pub fn get_integer(&self, key: &str) -> Option<i64> {
        let key = SettingKey::new(key);
        self.overrides
            .get(&key)
            .and_then(SettingValue::as_integer)
            .or_else(|| self.defaults.get(&key).and_then(SettingValue::as_integer))
    }

    pub fn list_defaults(&self) -> Vec<SettingKey> {
        self.defaults.keys().cloned().collect()
    }

    pub fn list_overrides(&self) -> Vec<SettingKey> {
        self.overrides.keys().cloned().collect()
    }

    /// Effective settings of one dotted section, in key order
    pub fn list_section(&self, section: &str) -> Vec<(SettingKey, SettingValue)> {
        let mut merged: BTreeMap<&SettingKey, &SettingValue> = self
            .defaults
            .iter()
            .filter(|(k, _)| k.in_section(section))
            .collect();
        merged.extend(self.overrides.iter().filter(|(k, _)| k.in_section(section)));
        merged
            .into_iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn clear_overrides(&mut self) {
        self.overrides.clear();
    }

    /// Exports overrides for persistence
    pub fn export_overrides(&self) -> BTreeMap<SettingKey, SettingValue> {
        self.overrides.clone()
    }

    /// Imports overrides (replaces existing overrides)
    pub fn import_overrides(&mut self, overrides: BTreeMap<SettingKey, SettingValue>) {
        self.overrides = overrides;
    }
}

/// Editor setting keys
pub mod keys {
    pub const AUTOSAVE_DELAY_MS: &str = "autosave.delay_ms";
    pub const AUTOSAVE_STATUS_CLEAR_MS: &str = "autosave.status_clear_ms";
    pub const FIND_QUERY_DEBOUNCE_MS: &str = "find.query_debounce_ms";
    pub const FIND_CONTENT_DEBOUNCE_MS: &str = "find.content_debounce_ms";
    pub const ANNOTATIONS_TODO_PREVIEW_CHARS: &str = "annotations.todo_preview_chars";
    pub const ANNOTATIONS_HEADING_PREVIEW_CHARS: &str = "annotations.heading_preview_chars";
    pub const STATS_INACTIVITY_THRESHOLD_MS: &str = "stats.inactivity_threshold_ms";
}

/// Creates a settings registry with default settings
pub fn create_default_registry() -> SettingsRegistry {
    let defaults = EditorSettings::default();
    let mut registry = SettingsRegistry::new();

    let integers = [
        (keys::AUTOSAVE_DELAY_MS, defaults.autosave_delay_ms),
        (keys::AUTOSAVE_STATUS_CLEAR_MS, defaults.autosave_status_clear_ms),
        (keys::FIND_QUERY_DEBOUNCE_MS, defaults.find_query_debounce_ms),
        (keys::FIND_CONTENT_DEBOUNCE_MS, defaults.find_content_debounce_ms),
        (keys::ANNOTATIONS_TODO_PREVIEW_CHARS, defaults.todo_preview_chars as u64),
        (keys::ANNOTATIONS_HEADING_PREVIEW_CHARS, defaults.heading_preview_chars as u64),
        (keys::STATS_INACTIVITY_THRESHOLD_MS, defaults.inactivity_threshold_ms),
    ];
    for (key, value) in integers {
        registry.register_default(key, SettingValue::Integer(value as i64));
    }

    registry
}

/// Typed view of the settings the editing session reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorSettings {
    pub autosave_delay_ms: u64,
    pub autosave_status_clear_ms: u64,
    pub find_query_debounce_ms: u64,
    pub find_content_debounce_ms: u64,
    pub todo_preview_chars: usize,
    pub heading_preview_chars: usize,
    pub inactivity_threshold_ms: u64,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            autosave_delay_ms: 500,
            autosave_status_clear_ms: 2000,
            find_query_debounce_ms: 50,
            find_content_debounce_ms: 300,
            todo_preview_chars: 30,
            heading_preview_chars: 40,
            inactivity_threshold_ms: 60_000,
        }
    }
}

impl EditorSettings {
    /// Reads the effective values; missing, mistyped or negative entries
    /// keep their defaults
    pub fn from_registry(registry: &SettingsRegistry) -> Self {
        let defaults = Self::default();
        let millis = |key: &str, fallback: u64| {
            registry
                .get_integer(key)
                .and_then(|v| u64::try_from(v).ok())
                .unwrap_or(fallback)
        };
        let chars = |key: &str, fallback: usize| {
            registry
                .get_integer(key)
                .and_then(|v| usize::try_from(v).ok())
                .unwrap_or(fallback)
        };

        Self {
            autosave_delay_ms: millis(keys::AUTOSAVE_DELAY_MS, defaults.autosave_delay_ms),
            autosave_status_clear_ms: millis(
                keys::AUTOSAVE_STATUS_CLEAR_MS,
                defaults.autosave_status_clear_ms,
            ),
            find_query_debounce_ms: millis(
                keys::FIND_QUERY_DEBOUNCE_MS,
                defaults.find_query_debounce_ms,
            ),
            find_content_debounce_ms: millis(
                keys::FIND_CONTENT_DEBOUNCE_MS,
                defaults.find_content_debounce_ms,
            ),
            todo_preview_chars: chars(
                keys::ANNOTATIONS_TODO_PREVIEW_CHARS,
                defaults.todo_preview_chars,
            ),
            heading_preview_chars: chars(
                keys::ANNOTATIONS_HEADING_PREVIEW_CHARS,
                defaults.heading_preview_chars,
            ),
            inactivity_threshold_ms: millis(
                keys::STATS_INACTIVITY_THRESHOLD_MS,
                defaults.inactivity_threshold_ms,
            ),
        }
    }
}
