//! The four training step handlers.
//!
//! Skip semantics: a skipped handler never redoes its heavy work, but it
//! still repopulates the context artifacts it owns by re-listing what the
//! prior attempt left at its deterministic temp path, so downstream steps
//! see the same context on a resumed run.

use crate::context::BuildContext;
use crate::corpus::BilingualCorpus;
use crate::engine::EngineConfig;
use crate::errors::BuildError;
use crate::external::{AlignerTrainer, CorpusCleaner, Preprocessor};
use crate::steps::{StepHandler, StepParams};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

/// Runs the corpus cleaner, replacing the context corpora with its output.
pub(crate) struct CleanStep {
    cleaner: Arc<dyn CorpusCleaner>,
    source_lang: String,
    target_lang: String,
    output: PathBuf,
}

impl CleanStep {
    pub(crate) fn new(
        cleaner: Arc<dyn CorpusCleaner>,
        source_lang: impl Into<String>,
        target_lang: impl Into<String>,
        output: PathBuf,
    ) -> Self {
        Self {
            cleaner,
            source_lang: source_lang.into(),
            target_lang: target_lang.into(),
            output,
        }
    }
}

#[async_trait]
impl StepHandler for CleanStep {
    async fn run(&self, ctx: &mut BuildContext, params: StepParams<'_>) -> Result<(), BuildError> {
        std::fs::create_dir_all(&self.output)?;

        ctx.corpora = if params.skip() {
            BilingualCorpus::list(
                &self.source_lang,
                &self.target_lang,
                &[self.output.clone()],
            )?
        } else {
            self.cleaner
                .clean(&ctx.corpora, &self.output, params.log())
                .await?
        };

        Ok(())
    }
}

/// Runs the preprocessor, populating the processed-corpora artifact.
pub(crate) struct PreprocessStep {
    preprocessor: Arc<dyn Preprocessor>,
    source_lang: String,
    target_lang: String,
    output: PathBuf,
    split_data_path: Option<PathBuf>,
}

impl PreprocessStep {
    pub(crate) fn new(
        preprocessor: Arc<dyn Preprocessor>,
        source_lang: impl Into<String>,
        target_lang: impl Into<String>,
        output: PathBuf,
        split_data_path: Option<PathBuf>,
    ) -> Self {
        Self {
            preprocessor,
            source_lang: source_lang.into(),
            target_lang: target_lang.into(),
            output,
            split_data_path,
        }
    }
}

#[async_trait]
impl StepHandler for PreprocessStep {
    async fn run(&self, ctx: &mut BuildContext, params: StepParams<'_>) -> Result<(), BuildError> {
        std::fs::create_dir_all(&self.output)?;

        if params.skip() {
            ctx.processed_corpora = Some(BilingualCorpus::list(
                &self.source_lang,
                &self.target_lang,
                &[self.output.clone()],
            )?);
            return Ok(());
        }

        if ctx.corpora.is_empty() {
            return Err(BuildError::NoValidSegments {
                source_lang: self.source_lang.clone(),
                target_lang: self.target_lang.clone(),
            });
        }

        let processed = self
            .preprocessor
            .process(
                &ctx.corpora,
                &self.output,
                self.split_data_path.as_deref(),
                params.log(),
            )
            .await?;
        ctx.processed_corpora = Some(processed);

        Ok(())
    }
}

/// Trains the alignment model. The model lives at a fixed path outside the
/// temp area, so the skip path has nothing to recover.
pub(crate) struct AlignStep {
    aligner: Arc<dyn AlignerTrainer>,
}

impl AlignStep {
    pub(crate) fn new(aligner: Arc<dyn AlignerTrainer>) -> Self {
        Self { aligner }
    }
}

#[async_trait]
impl StepHandler for AlignStep {
    async fn run(&self, ctx: &mut BuildContext, params: StepParams<'_>) -> Result<(), BuildError> {
        if !params.skip() {
            self.aligner
                .build(ctx.training_corpora(), params.log())
                .await?;
        }
        Ok(())
    }
}

/// Writes the engine config artifact. Declares no optional parameters.
pub(crate) struct WriteConfigStep {
    config_path: PathBuf,
    source_lang: String,
    target_lang: String,
}

impl WriteConfigStep {
    pub(crate) fn new(
        config_path: PathBuf,
        source_lang: impl Into<String>,
        target_lang: impl Into<String>,
    ) -> Self {
        Self {
            config_path,
            source_lang: source_lang.into(),
            target_lang: target_lang.into(),
        }
    }
}

#[async_trait]
impl StepHandler for WriteConfigStep {
    async fn run(
        &self,
        _ctx: &mut BuildContext,
        _params: StepParams<'_>,
    ) -> Result<(), BuildError> {
        EngineConfig::new(&self.source_lang, &self.target_lang).store(&self.config_path)
    }
}
