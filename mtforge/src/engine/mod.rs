//! Engine directory layout and persistent artifacts.
//!
//! A workspace hosts any number of engines. Each engine owns a persistent
//! output directory (models, data splits, config) and a runtime directory
//! (logs, temp space) that build runs work inside.

mod config;
mod runlog;

pub use config::EngineConfig;
pub use runlog::RunLog;

use crate::errors::BuildError;
use crate::utils;
use std::path::{Path, PathBuf};

/// Filesystem roots shared by all engines of an installation.
#[derive(Debug, Clone)]
pub struct Workspace {
    engines_dir: PathBuf,
    runtime_dir: PathBuf,
    bin_dir: PathBuf,
}

impl Workspace {
    /// Creates a workspace rooted at `root`, with the conventional
    /// `engines/`, `runtime/` and `bin/` subdirectories.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            engines_dir: root.join("engines"),
            runtime_dir: root.join("runtime"),
            bin_dir: root.join("bin"),
        }
    }

    /// Returns the directory containing persistent engine outputs.
    #[must_use]
    pub fn engines_dir(&self) -> &Path {
        &self.engines_dir
    }

    /// Returns the directory containing per-engine runtime state.
    #[must_use]
    pub fn runtime_dir(&self) -> &Path {
        &self.runtime_dir
    }

    /// Returns the directory containing the external collaborator binaries.
    #[must_use]
    pub fn bin_dir(&self) -> &Path {
        &self.bin_dir
    }
}

/// The path map and persistent artifacts of one named engine.
#[derive(Debug, Clone)]
pub struct Engine {
    name: String,
    source_lang: String,
    target_lang: String,
    path: PathBuf,
    config_path: PathBuf,
    data_path: PathBuf,
    models_path: PathBuf,
    logs_path: PathBuf,
    temp_path: PathBuf,
}

impl Engine {
    const CONFIG_FILE: &'static str = "engine.json";

    /// Creates the path map for an engine; nothing is touched on disk.
    #[must_use]
    pub fn new(
        workspace: &Workspace,
        name: impl Into<String>,
        source_lang: impl Into<String>,
        target_lang: impl Into<String>,
    ) -> Self {
        let name = name.into();
        let path = workspace.engines_dir().join(&name);
        let runtime_path = workspace.runtime_dir().join(&name);

        Self {
            config_path: path.join(Self::CONFIG_FILE),
            data_path: path.join("data"),
            models_path: path.join("models"),
            logs_path: runtime_path.join("logs"),
            temp_path: runtime_path.join("tmp"),
            source_lang: source_lang.into(),
            target_lang: target_lang.into(),
            path,
            name,
        }
    }

    /// Loads an existing engine by parsing its config artifact.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::InvalidEngineName`] if the name contains a path
    /// separator, [`BuildError::EngineNotFound`] if no config file exists,
    /// or a deserialization error for a malformed config.
    pub fn load(workspace: &Workspace, name: &str) -> Result<Self, BuildError> {
        if name.contains(std::path::MAIN_SEPARATOR) || name.contains('/') {
            return Err(BuildError::InvalidEngineName(name.to_string()));
        }

        let config_path = workspace.engines_dir().join(name).join(Self::CONFIG_FILE);
        if !config_path.is_file() {
            return Err(BuildError::EngineNotFound(name.to_string()));
        }

        let config = EngineConfig::load(&config_path)?;
        Ok(Self::new(
            workspace,
            name,
            config.source_language,
            config.target_language,
        ))
    }

    /// Lists the names of all engines in the workspace with a config file,
    /// sorted alphabetically.
    ///
    /// A missing engines directory yields an empty list.
    pub fn list(workspace: &Workspace) -> std::io::Result<Vec<String>> {
        let mut names = Vec::new();

        if workspace.engines_dir().is_dir() {
            for entry in std::fs::read_dir(workspace.engines_dir())? {
                let entry = entry?;
                if entry.path().join(Self::CONFIG_FILE).is_file() {
                    if let Ok(name) = entry.file_name().into_string() {
                        names.push(name);
                    }
                }
            }
        }

        names.sort();
        Ok(names)
    }

    /// Returns the engine name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the source language of the engine's pair.
    #[must_use]
    pub fn source_lang(&self) -> &str {
        &self.source_lang
    }

    /// Returns the target language of the engine's pair.
    #[must_use]
    pub fn target_lang(&self) -> &str {
        &self.target_lang
    }

    /// Returns the persistent engine output directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the config artifact path.
    #[must_use]
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Returns the directory holding dev/test data splits.
    #[must_use]
    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    /// Returns the directory holding trained models.
    #[must_use]
    pub fn models_path(&self) -> &Path {
        &self.models_path
    }

    /// Returns true if the engine's config artifact exists.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.config_path.is_file()
    }

    /// Resolves (and ensures the parent of) a named log file.
    ///
    /// # Errors
    ///
    /// Returns an error if the logs directory cannot be created.
    pub fn logfile(&self, name: &str) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(&self.logs_path)?;
        Ok(self.logs_path.join(format!("{name}.log")))
    }

    /// Resolves (and ensures the parent of) a named temp file under the
    /// engine's runtime area.
    ///
    /// # Errors
    ///
    /// Returns an error if the temp directory cannot be created.
    pub fn tempfile(&self, name: &str) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(&self.temp_path)?;
        Ok(self.temp_path.join(name))
    }

    /// Resolves a named temp directory under the engine's runtime area.
    ///
    /// With `ensure` set, any previous contents are discarded and the
    /// directory is recreated empty; otherwise it is created only if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn tempdir(&self, name: &str, ensure: bool) -> std::io::Result<PathBuf> {
        let path = self.temp_path.join(name);
        if ensure {
            utils::recreate_dir(&path)?;
        } else {
            std::fs::create_dir_all(&path)?;
        }
        Ok(path)
    }

    /// Removes a named temp directory, or the whole temp area when `subdir`
    /// is `None`. Best-effort: errors are ignored.
    pub fn clear_tempdir(&self, subdir: Option<&str>) {
        let path = match subdir {
            Some(subdir) => self.temp_path.join(subdir),
            None => self.temp_path.clone(),
        };
        utils::remove_dir_best_effort(&path);
    }
}
