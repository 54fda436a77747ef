//! The engine configuration artifact.

use crate::errors::BuildError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The durable per-engine configuration document.
///
/// Written by the final pipeline step and read back by [`crate::engine::Engine::load`];
/// it records the language pair the engine was trained for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct EngineConfig {
    /// The source language tag (e.g. `en`).
    pub source_language: String,
    /// The target language tag (e.g. `fr`).
    pub target_language: String,
}

impl EngineConfig {
    /// Creates a config for one language pair.
    #[must_use]
    pub fn new(source_language: impl Into<String>, target_language: impl Into<String>) -> Self {
        Self {
            source_language: source_language.into(),
            target_language: target_language.into(),
        }
    }

    /// Writes the config as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialized.
    pub fn store(&self, path: &Path) -> Result<(), BuildError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Reads a config back from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or not a valid config document.
    pub fn load(path: &Path) -> Result<Self, BuildError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}
