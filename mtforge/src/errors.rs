//! Error types for engine training.
//!
//! All fatal conditions a build can hit are collected in [`BuildError`].
//! Hardware constraint violations are deliberately *not* here: they are
//! advisory and reported as a value (see [`crate::hardware::ConstraintStatus`]).

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for mtforge operations.
#[derive(Debug, Error)]
pub enum BuildError {
    /// A requested step subset contained ids not present in the pipeline plan.
    #[error("unknown training steps: {0:?}")]
    UnknownSteps(Vec<String>),

    /// No bilingual corpora were found under the configured source roots.
    #[error("could not find {source_lang} > {target_lang} corpora in path {}", format_roots(roots))]
    CorpusNotFound {
        /// The source language of the requested pair.
        source_lang: String,
        /// The target language of the requested pair.
        target_lang: String,
        /// The roots that were searched.
        roots: Vec<PathBuf>,
    },

    /// The corpus set reaching the preprocessing step was empty.
    #[error("could not find any valid {source_lang} > {target_lang} segments in your input")]
    NoValidSegments {
        /// The source language of the requested pair.
        source_lang: String,
        /// The target language of the requested pair.
        target_lang: String,
    },

    /// An engine name contained a path separator or was otherwise malformed.
    #[error("invalid engine name: {0:?}")]
    InvalidEngineName(String),

    /// No engine with the given name exists in the workspace.
    #[error("engine {0:?} not found")]
    EngineNotFound(String),

    /// The aligner was given corpora spread across more than one root.
    #[error("aligner training requires all corpora to share a single root")]
    MixedCorpusRoots,

    /// An external collaborator process exited with a non-zero status.
    #[error("external command {name:?} failed{}", exit_suffix(*code))]
    ProcessFailed {
        /// The collaborator binary name.
        name: String,
        /// The exit code, if the process was not killed by a signal.
        code: Option<i32>,
    },

    /// A pipeline step handler was registered without an implementation.
    #[error("internal error: {0}")]
    Internal(String),

    /// IO error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

fn format_roots(roots: &[PathBuf]) -> String {
    roots
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn exit_suffix(code: Option<i32>) -> String {
    match code {
        Some(code) => format!(" with exit code {code}"),
        None => String::from(" (terminated by signal)"),
    }
}
