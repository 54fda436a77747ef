//! Mock collaborators that record calls and fake their outputs on disk.

use crate::corpus::BilingualCorpus;
use crate::engine::RunLog;
use crate::errors::BuildError;
use crate::external::{AlignerTrainer, CorpusCleaner, Preprocessor};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};

/// Copies each corpus's file pair into `output`, mimicking a collaborator
/// that rewrites corpora into its output directory.
fn materialize(
    corpora: &[BilingualCorpus],
    output: &Path,
    source_lang: &str,
    target_lang: &str,
) -> Result<Vec<BilingualCorpus>, BuildError> {
    std::fs::create_dir_all(output)?;
    for corpus in corpora {
        std::fs::copy(
            corpus.source_file(),
            output.join(format!("{}.{}", corpus.name(), source_lang)),
        )?;
        std::fs::copy(
            corpus.target_file(),
            output.join(format!("{}.{}", corpus.name(), target_lang)),
        )?;
    }
    Ok(BilingualCorpus::list(
        source_lang,
        target_lang,
        &[output.to_path_buf()],
    )?)
}

/// A cleaner that copies its input corpora through and counts calls.
#[derive(Debug)]
pub struct MockCleaner {
    source_lang: String,
    target_lang: String,
    calls: Mutex<usize>,
}

impl MockCleaner {
    /// Creates a mock cleaner for one language pair.
    #[must_use]
    pub fn new(source_lang: impl Into<String>, target_lang: impl Into<String>) -> Self {
        Self {
            source_lang: source_lang.into(),
            target_lang: target_lang.into(),
            calls: Mutex::new(0),
        }
    }

    /// Returns how many times `clean` ran (skip recoveries excluded).
    #[must_use]
    pub fn call_count(&self) -> usize {
        *self.calls.lock()
    }
}

#[async_trait]
impl CorpusCleaner for MockCleaner {
    async fn clean(
        &self,
        corpora: &[BilingualCorpus],
        output: &Path,
        _log: Option<&RunLog>,
    ) -> Result<Vec<BilingualCorpus>, BuildError> {
        *self.calls.lock() += 1;
        materialize(corpora, output, &self.source_lang, &self.target_lang)
    }
}

/// A preprocessor that copies its input corpora through and counts calls.
#[derive(Debug)]
pub struct MockPreprocessor {
    source_lang: String,
    target_lang: String,
    calls: Mutex<usize>,
    split_paths: Mutex<Vec<Option<PathBuf>>>,
}

impl MockPreprocessor {
    /// Creates a mock preprocessor for one language pair.
    #[must_use]
    pub fn new(source_lang: impl Into<String>, target_lang: impl Into<String>) -> Self {
        Self {
            source_lang: source_lang.into(),
            target_lang: target_lang.into(),
            calls: Mutex::new(0),
            split_paths: Mutex::new(Vec::new()),
        }
    }

    /// Returns how many times `process` ran.
    #[must_use]
    pub fn call_count(&self) -> usize {
        *self.calls.lock()
    }

    /// Returns the `split_data_path` argument of each call.
    #[must_use]
    pub fn recorded_split_paths(&self) -> Vec<Option<PathBuf>> {
        self.split_paths.lock().clone()
    }
}

#[async_trait]
impl Preprocessor for MockPreprocessor {
    async fn process(
        &self,
        corpora: &[BilingualCorpus],
        output: &Path,
        split_data_path: Option<&Path>,
        _log: Option<&RunLog>,
    ) -> Result<Vec<BilingualCorpus>, BuildError> {
        *self.calls.lock() += 1;
        self.split_paths
            .lock()
            .push(split_data_path.map(Path::to_path_buf));
        materialize(corpora, output, &self.source_lang, &self.target_lang)
    }
}

/// A preprocessor that always fails, for abort-and-resume scenarios.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingPreprocessor;

#[async_trait]
impl Preprocessor for FailingPreprocessor {
    async fn process(
        &self,
        _corpora: &[BilingualCorpus],
        _output: &Path,
        _split_data_path: Option<&Path>,
        _log: Option<&RunLog>,
    ) -> Result<Vec<BilingualCorpus>, BuildError> {
        Err(BuildError::ProcessFailed {
            name: "training-pipeline".to_string(),
            code: Some(1),
        })
    }
}

/// An aligner trainer that records the roots it was trained on.
#[derive(Debug, Default)]
pub struct MockAligner {
    calls: Mutex<usize>,
    roots: Mutex<Vec<PathBuf>>,
}

impl MockAligner {
    /// Creates a mock aligner.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns how many times `build` ran.
    #[must_use]
    pub fn call_count(&self) -> usize {
        *self.calls.lock()
    }

    /// Returns the corpus roots of each call.
    #[must_use]
    pub fn recorded_roots(&self) -> Vec<PathBuf> {
        self.roots.lock().clone()
    }
}

#[async_trait]
impl AlignerTrainer for MockAligner {
    async fn build(
        &self,
        corpora: &[BilingualCorpus],
        _log: Option<&RunLog>,
    ) -> Result<(), BuildError> {
        *self.calls.lock() += 1;
        let mut roots = crate::corpus::unique_roots(corpora);
        let [root] = roots.as_mut_slice() else {
            return Err(BuildError::MixedCorpusRoots);
        };
        self.roots.lock().push(std::mem::take(root));
        Ok(())
    }
}
