//! Durable record of completed step ids for one run.

use crate::errors::BuildError;
use std::path::Path;

/// The crash-consistency record of a run: an ordered list of the step ids
/// that have completed so far.
///
/// Stored as a JSON array of strings. Loading is best-effort by contract:
/// a missing, unreadable or unparsable file means "no steps completed".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Checkpoint {
    completed: Vec<String>,
}

impl Checkpoint {
    /// Loads a checkpoint, degrading to empty on any failure.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        let completed = std::fs::read_to_string(path)
            .ok()
            .and_then(|json| serde_json::from_str(&json).ok())
            .unwrap_or_default();
        Self { completed }
    }

    /// Persists the checkpoint, overwriting any previous content.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn store(&self, path: &Path) -> Result<(), BuildError> {
        let json = serde_json::to_string(&self.completed)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Appends a completed step id. In-memory only; call [`Self::store`]
    /// to persist.
    pub fn mark(&mut self, id: impl Into<String>) {
        self.completed.push(id.into());
    }

    /// Returns true if the step already completed in this run.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.completed.iter().any(|done| done == id)
    }

    /// Returns the completed ids in completion order.
    #[must_use]
    pub fn completed(&self) -> &[String] {
        &self.completed
    }
}
