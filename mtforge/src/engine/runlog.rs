//! The run-scoped training log.

use chrono::Utc;
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;

/// A log file owned by a single build run.
///
/// Opened in append mode when resuming and truncate mode for a fresh build.
/// The file is closed when the `RunLog` is dropped, which happens on every
/// exit path of the run. Log writes are best-effort: a failing disk must not
/// take the training down with it.
#[derive(Debug)]
pub struct RunLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl RunLog {
    /// Opens the log file, truncating unless `append` is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or opened.
    pub fn open(path: impl Into<PathBuf>, append: bool) -> std::io::Result<Self> {
        let path = path.into();
        let file = OpenOptions::new()
            .create(true)
            .append(append)
            .write(true)
            .truncate(!append)
            .open(&path)?;

        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// Returns the log file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes an INFO line.
    pub fn info(&self, message: impl AsRef<str>) {
        self.write_line("INFO", message.as_ref());
    }

    /// Writes an ERROR line.
    pub fn error(&self, message: impl AsRef<str>) {
        self.write_line("ERROR", message.as_ref());
    }

    /// Hands out a writable handle to the same file for child process output.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying file handle cannot be cloned.
    pub fn stdio(&self) -> std::io::Result<Stdio> {
        let clone = self.file.lock().try_clone()?;
        Ok(Stdio::from(clone))
    }

    fn write_line(&self, level: &str, message: &str) {
        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S%.3f");
        let mut file = self.file.lock();
        let _ = writeln!(file, "{timestamp} [{level}] - {message}");
        let _ = file.flush();
    }
}
