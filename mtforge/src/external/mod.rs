//! Narrow interfaces to the heavyweight external operations.
//!
//! Corpus cleaning, preprocessing and aligner training are long-running
//! external processes. The pipeline only knows how to invoke them and what
//! artifact each returns; implementations here shell out to the collaborator
//! binaries, test doubles live in [`crate::testing`].

mod aligner;
mod cleaner;
mod preprocessor;

pub use aligner::ProcessAligner;
pub use cleaner::ProcessCleaner;
pub use preprocessor::{ProcessPreprocessor, DEV_FOLDER_NAME, TEST_FOLDER_NAME};

use crate::corpus::BilingualCorpus;
use crate::engine::RunLog;
use crate::errors::BuildError;
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// Cleans raw bilingual corpora into an output directory.
#[async_trait]
pub trait CorpusCleaner: Send + Sync {
    /// Cleans `corpora`, returning the cleaned corpora rooted at `output`.
    async fn clean(
        &self,
        corpora: &[BilingualCorpus],
        output: &Path,
        log: Option<&RunLog>,
    ) -> Result<Vec<BilingualCorpus>, BuildError>;
}

/// Tokenizes and normalizes corpora for training.
#[async_trait]
pub trait Preprocessor: Send + Sync {
    /// Processes `corpora` into `output`; when `split_data_path` is given,
    /// dev and test splits are written beneath it.
    async fn process(
        &self,
        corpora: &[BilingualCorpus],
        output: &Path,
        split_data_path: Option<&Path>,
        log: Option<&RunLog>,
    ) -> Result<Vec<BilingualCorpus>, BuildError>;
}

/// Trains the word-alignment model at its fixed per-engine-pair path.
#[async_trait]
pub trait AlignerTrainer: Send + Sync {
    /// Builds the alignment model from `corpora`.
    async fn build(
        &self,
        corpora: &[BilingualCorpus],
        log: Option<&RunLog>,
    ) -> Result<(), BuildError>;
}

/// Runs a collaborator command to completion, routing its output to the
/// run log when one is supplied.
async fn run_command(
    name: &str,
    command: &mut Command,
    log: Option<&RunLog>,
) -> Result<(), BuildError> {
    match log {
        Some(log) => {
            command.stdout(log.stdio()?).stderr(log.stdio()?);
        }
        None => {
            command.stdout(Stdio::null()).stderr(Stdio::null());
        }
    }

    let status = command.status().await?;
    if !status.success() {
        return Err(BuildError::ProcessFailed {
            name: name.to_string(),
            code: status.code(),
        });
    }
    Ok(())
}
