//! Process-backed corpus cleaner.

use super::{run_command, CorpusCleaner};
use crate::corpus::{self, BilingualCorpus};
use crate::engine::RunLog;
use crate::errors::BuildError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

const BIN_NAME: &str = "cleaning-pipeline";

/// Cleaner backed by the `cleaning-pipeline` collaborator binary.
#[derive(Debug, Clone)]
pub struct ProcessCleaner {
    bin: PathBuf,
    source_lang: String,
    target_lang: String,
}

impl ProcessCleaner {
    /// Creates a cleaner invoking the binary from `bin_dir`.
    #[must_use]
    pub fn new(
        bin_dir: &Path,
        source_lang: impl Into<String>,
        target_lang: impl Into<String>,
    ) -> Self {
        Self {
            bin: bin_dir.join(BIN_NAME),
            source_lang: source_lang.into(),
            target_lang: target_lang.into(),
        }
    }
}

#[async_trait]
impl CorpusCleaner for ProcessCleaner {
    async fn clean(
        &self,
        corpora: &[BilingualCorpus],
        output: &Path,
        log: Option<&RunLog>,
    ) -> Result<Vec<BilingualCorpus>, BuildError> {
        let mut command = Command::new(&self.bin);
        command
            .arg("-s")
            .arg(&self.source_lang)
            .arg("-t")
            .arg(&self.target_lang)
            .arg("--output")
            .arg(output)
            .arg("--input");

        for root in corpus::unique_roots(corpora) {
            command.arg(root);
        }

        run_command(BIN_NAME, &mut command, log).await?;

        Ok(BilingualCorpus::list(
            &self.source_lang,
            &self.target_lang,
            &[output.to_path_buf()],
        )?)
    }
}
