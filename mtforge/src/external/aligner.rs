//! Process-backed word-aligner trainer.

use super::{run_command, AlignerTrainer};
use crate::corpus::{self, BilingualCorpus};
use crate::engine::RunLog;
use crate::errors::BuildError;
use crate::utils;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

const BIN_NAME: &str = "fa_build";
const TRAINING_ITERATIONS: u32 = 4;

/// Aligner trainer backed by the `fa_build` collaborator binary.
///
/// The model lives at a fixed per-engine-pair path and is rebuilt from
/// scratch on every (non-skipped) training.
#[derive(Debug, Clone)]
pub struct ProcessAligner {
    bin: PathBuf,
    model: PathBuf,
    source_lang: String,
    target_lang: String,
}

impl ProcessAligner {
    /// Creates an aligner trainer; `model_dir` is the engine's aligner
    /// model directory.
    ///
    /// The aligner only supports base languages, so region subtags are
    /// stripped from the model file name (`en-US` and `en-GB` share a model).
    #[must_use]
    pub fn new(
        bin_dir: &Path,
        model_dir: &Path,
        source_lang: impl Into<String>,
        target_lang: impl Into<String>,
    ) -> Self {
        let source_lang = source_lang.into();
        let target_lang = target_lang.into();
        let model = model_dir.join(format!(
            "{}__{}.mdl",
            base_language(&source_lang),
            base_language(&target_lang)
        ));

        Self {
            bin: bin_dir.join(BIN_NAME),
            model,
            source_lang,
            target_lang,
        }
    }

    /// Returns the fixed model path.
    #[must_use]
    pub fn model_path(&self) -> &Path {
        &self.model
    }
}

fn base_language(lang: &str) -> &str {
    lang.split('-').next().unwrap_or(lang)
}

#[async_trait]
impl AlignerTrainer for ProcessAligner {
    async fn build(
        &self,
        corpora: &[BilingualCorpus],
        log: Option<&RunLog>,
    ) -> Result<(), BuildError> {
        let roots = corpus::unique_roots(corpora);
        let [root] = roots.as_slice() else {
            return Err(BuildError::MixedCorpusRoots);
        };

        utils::recreate_dir(&self.model)?;

        let mut command = Command::new(&self.bin);
        command
            .arg("-s")
            .arg(&self.source_lang)
            .arg("-t")
            .arg(&self.target_lang)
            .arg("-i")
            .arg(root)
            .arg("-m")
            .arg(&self.model)
            .arg("-I")
            .arg(TRAINING_ITERATIONS.to_string());

        run_command(BIN_NAME, &mut command, log).await
    }
}
