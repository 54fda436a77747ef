//! Bilingual corpus representation and discovery.
//!
//! A bilingual corpus is a pair of parallel text files sharing a stem:
//! `<root>/<name>.<source_lang>` and `<root>/<name>.<target_lang>`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A parallel corpus for one language pair, rooted in a single directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BilingualCorpus {
    name: String,
    source_lang: String,
    target_lang: String,
    root: PathBuf,
}

impl BilingualCorpus {
    /// Creates a corpus handle without touching the filesystem.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        source_lang: impl Into<String>,
        target_lang: impl Into<String>,
        root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            source_lang: source_lang.into(),
            target_lang: target_lang.into(),
            root: root.into(),
        }
    }

    /// Returns the corpus name (the shared file stem).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the source language tag.
    #[must_use]
    pub fn source_lang(&self) -> &str {
        &self.source_lang
    }

    /// Returns the target language tag.
    #[must_use]
    pub fn target_lang(&self) -> &str {
        &self.target_lang
    }

    /// Returns the directory containing both corpus files.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the path of the source-side file.
    #[must_use]
    pub fn source_file(&self) -> PathBuf {
        self.root.join(format!("{}.{}", self.name, self.source_lang))
    }

    /// Returns the path of the target-side file.
    #[must_use]
    pub fn target_file(&self) -> PathBuf {
        self.root.join(format!("{}.{}", self.name, self.target_lang))
    }

    /// Discovers corpora for a language pair under the given roots.
    ///
    /// A corpus is any `<name>.<source_lang>` file with a `<name>.<target_lang>`
    /// sibling in the same directory. Missing roots are skipped, results are
    /// sorted by corpus name.
    ///
    /// # Errors
    ///
    /// Returns an IO error when an existing root cannot be read.
    pub fn list(
        source_lang: &str,
        target_lang: &str,
        roots: &[PathBuf],
    ) -> std::io::Result<Vec<Self>> {
        let mut corpora = Vec::new();

        for root in roots {
            if !root.is_dir() {
                continue;
            }

            for entry in std::fs::read_dir(root)? {
                let path = entry?.path();

                if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(source_lang)
                {
                    continue;
                }

                let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                    continue;
                };

                if root.join(format!("{name}.{target_lang}")).is_file() {
                    corpora.push(Self::new(name, source_lang, target_lang, root.clone()));
                }
            }
        }

        corpora.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(corpora)
    }
}

/// Returns the distinct roots of the given corpora, in first-seen order.
#[must_use]
pub fn unique_roots(corpora: &[BilingualCorpus]) -> Vec<PathBuf> {
    let mut roots: Vec<PathBuf> = Vec::new();
    for corpus in corpora {
        if !roots.iter().any(|r| r == corpus.root()) {
            roots.push(corpus.root().to_path_buf());
        }
    }
    roots
}
