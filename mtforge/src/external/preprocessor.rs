//! Process-backed training preprocessor.

use super::{run_command, Preprocessor};
use crate::corpus::{self, BilingualCorpus};
use crate::engine::RunLog;
use crate::errors::BuildError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

const BIN_NAME: &str = "training-pipeline";

/// Name of the dev split folder under the split data path.
pub const DEV_FOLDER_NAME: &str = "dev";
/// Name of the test split folder under the split data path.
pub const TEST_FOLDER_NAME: &str = "test";

/// Preprocessor backed by the `training-pipeline` collaborator binary.
#[derive(Debug, Clone)]
pub struct ProcessPreprocessor {
    bin: PathBuf,
    source_lang: String,
    target_lang: String,
}

impl ProcessPreprocessor {
    /// Creates a preprocessor invoking the binary from `bin_dir`.
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
impl Preprocessor for ProcessPreprocessor {
    async fn process(
        &self,
        corpora: &[BilingualCorpus],
        output: &Path,
        split_data_path: Option<&Path>,
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

        if let Some(data_path) = split_data_path {
            command
                .arg("--dev")
                .arg(data_path.join(DEV_FOLDER_NAME))
                .arg("--test")
                .arg(data_path.join(TEST_FOLDER_NAME));
        }

        run_command(BIN_NAME, &mut command, log).await?;

        Ok(BilingualCorpus::list(
            &self.source_lang,
            &self.target_lang,
            &[output.to_path_buf()],
        )?)
    }
}
