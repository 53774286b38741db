//! Settings persistence layer
//!
//! Project overrides are stored as versioned JSON, either as bytes or as the
//! `settings` block of the project manifest. Loading is safe against
//! corruption.

use crate::{SettingKey, SettingValue, SettingsRegistry};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Serializable container for settings overrides
/// Uses BTreeMap for stable ordering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsOverridesData {
    /// Version of the settings format
    pub version: u32,
    pub overrides: BTreeMap<String, SettingValue>,
}

impl SettingsOverridesData {
    /// Current version of the settings format
    pub const CURRENT_VERSION: u32 = 1;

    pub fn new() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            overrides: BTreeMap::new(),
        }
    }

    pub fn from_overrides(overrides: &BTreeMap<SettingKey, SettingValue>) -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            overrides: overrides
                .iter()
                .map(|(k, v)| (k.as_str().to_string(), v.clone()))
                .collect(),
        }
    }

    pub fn to_overrides(&self) -> BTreeMap<SettingKey, SettingValue> {
        self.overrides
            .iter()
            .map(|(k, v)| (SettingKey::new(k.as_str()), v.clone()))
            .collect()
    }

    /// Snapshot of a registry's overrides
    pub fn from_registry(registry: &SettingsRegistry) -> Self {
        Self::from_overrides(&registry.export_overrides())
    }

    /// Replaces the registry's overrides with these
    pub fn apply_to(&self, registry: &mut SettingsRegistry) {
        registry.import_overrides(self.to_overrides());
    }

    /// JSON value suitable for embedding in the project manifest
    pub fn to_value(&self) -> PersistenceResult<serde_json::Value> {
        serde_json::to_value(self).map_err(|e| PersistenceError::SerializationFailed(e.to_string()))
    }

    /// Reads an embedded manifest block; `null` means no overrides
    pub fn from_value(value: &serde_json::Value) -> PersistenceResult<Self> {
        if value.is_null() {
            return Ok(Self::new());
        }
        let data = Self::deserialize(value)
            .map_err(|e| PersistenceError::DeserializationFailed(e.to_string()))?;
        data.check_version()
    }

    fn check_version(self) -> PersistenceResult<Self> {
        if self.version != Self::CURRENT_VERSION {
            return Err(PersistenceError::UnsupportedVersion(self.version));
        }
        Ok(self)
    }
}

impl Default for SettingsOverridesData {
    fn default() -> Self {
        Self::new()
    }
}

/// Result type for persistence operations
pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Errors that can occur during persistence operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistenceError {
    #[error("Failed to serialize settings: {0}")]
    SerializationFailed(String),

    #[error("Failed to deserialize settings: {0}")]
    DeserializationFailed(String),

    #[error("Unsupported settings version: {0}")]
    UnsupportedVersion(u32),
}

/// Serializes settings overrides to JSON bytes
pub fn serialize_overrides(data: &SettingsOverridesData) -> PersistenceResult<Vec<u8>> {
    serde_json::to_vec_pretty(data)
        .map_err(|e| PersistenceError::SerializationFailed(e.to_string()))
}

/// Deserializes settings overrides from JSON bytes
pub fn deserialize_overrides(bytes: &[u8]) -> PersistenceResult<SettingsOverridesData> {
    let data: SettingsOverridesData = serde_json::from_slice(bytes)
        .map_err(|e| PersistenceError::DeserializationFailed(e.to_string()))?;
    data.check_version()
}

/// Attempts to load settings from bytes, falling back to no overrides on error
pub fn load_overrides_safe(bytes: &[u8]) -> SettingsOverridesData {
    deserialize_overrides(bytes).unwrap_or_default()
}
