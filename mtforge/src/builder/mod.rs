//! The resumable engine build orchestrator.
//!
//! [`EngineBuilder`] drives the fixed pipeline (clean, preprocess, align,
//! write config) over a checkpoint-backed [`Schedule`]. Progress is flushed
//! to disk after every step, so an interrupted run loses at most the
//! in-flight step and can continue via [`EngineBuilder::resume`].

mod train_steps;

#[cfg(test)]
mod integration_tests;

use crate::context::BuildContext;
use crate::corpus::BilingualCorpus;
use crate::engine::{Engine, RunLog, Workspace};
use crate::errors::BuildError;
use crate::events::{BuildEvent, EventSink, NoOpEventSink};
use crate::external::{
    AlignerTrainer, CorpusCleaner, Preprocessor, ProcessAligner, ProcessCleaner,
    ProcessPreprocessor,
};
use crate::hardware::{ConstraintChecker, ConstraintStatus, GpuInventory, NvidiaSmi};
use crate::schedule::Schedule;
use crate::steps::{StepCapabilities, StepDescriptor, StepHandler, StepParams};
use crate::utils::format_elapsed;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;
use uuid::Uuid;

/// Stable ids of the pipeline steps, usable as a build subset filter.
pub mod step_ids {
    /// Corpus cleaning.
    pub const CLEAN_TMS: &str = "clean_tms";
    /// Corpus preprocessing.
    pub const PREPROCESS: &str = "preprocess";
    /// Aligner training.
    pub const TRAIN_ALIGNER: &str = "train_aligner";
    /// Config artifact emission.
    pub const WRITE_CONFIG: &str = "write_config";
}

const TRAINING_TEMP: &str = "training";
const TRAINING_LOG: &str = "training";
const CHECKPOINT_FILE: &str = "checkpoint.json";

/// Settings for one engine build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuilderConfig {
    /// Name of the engine to build.
    pub engine_name: String,
    /// Source language tag.
    pub source_lang: String,
    /// Target language tag.
    pub target_lang: String,
    /// Directories searched for bilingual corpora.
    pub roots: Vec<PathBuf>,
    /// Keep intermediate files after a successful build.
    #[serde(default)]
    pub debug: bool,
    /// Optional subset of step ids to run; non-optional steps always run.
    #[serde(default)]
    pub steps: Option<Vec<String>>,
    /// Carve dev/test splits out of the training data.
    #[serde(default = "default_split_train")]
    pub split_train: bool,
}

const fn default_split_train() -> bool {
    true
}

impl BuilderConfig {
    /// Creates a config with the default flags: no subset, dev/test splits
    /// enabled, intermediate files deleted on success.
    #[must_use]
    pub fn new(
        engine_name: impl Into<String>,
        source_lang: impl Into<String>,
        target_lang: impl Into<String>,
        roots: Vec<PathBuf>,
    ) -> Self {
        Self {
            engine_name: engine_name.into(),
            source_lang: source_lang.into(),
            target_lang: target_lang.into(),
            roots,
            debug: false,
            steps: None,
            split_train: true,
        }
    }

    /// Restricts the run to a subset of step ids.
    #[must_use]
    pub fn with_steps(mut self, steps: Vec<String>) -> Self {
        self.steps = Some(steps);
        self
    }

    /// Keeps intermediate files after a successful build.
    #[must_use]
    pub fn with_debug(mut self) -> Self {
        self.debug = true;
        self
    }

    /// Disables the dev/test split.
    #[must_use]
    pub fn without_split(mut self) -> Self {
        self.split_train = false;
        self
    }
}

/// Builds a translation engine by running the training pipeline.
pub struct EngineBuilder {
    config: BuilderConfig,
    engine: Engine,
    cleaner: Arc<dyn CorpusCleaner>,
    preprocessor: Arc<dyn Preprocessor>,
    aligner: Arc<dyn AlignerTrainer>,
    inventory: Arc<dyn GpuInventory>,
    event_sink: Arc<dyn EventSink>,
    delete_on_exit: bool,
}

impl std::fmt::Debug for EngineBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineBuilder")
            .field("config", &self.config)
            .field("engine", &self.engine)
            .field("delete_on_exit", &self.delete_on_exit)
            .finish_non_exhaustive()
    }
}

impl EngineBuilder {
    /// Creates a builder with process-backed collaborators from the
    /// workspace's bin directory.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::UnknownSteps`] if the configured step subset
    /// contains ids not in the pipeline plan.
    pub fn new(workspace: &Workspace, config: BuilderConfig) -> Result<Self, BuildError> {
        // Validate the requested subset before anything executes.
        Schedule::new(Self::plan(), config.steps.as_deref())?;

        let engine = Engine::new(
            workspace,
            &config.engine_name,
            &config.source_lang,
            &config.target_lang,
        );
        let aligner_model_dir = engine.models_path().join("aligner");

        Ok(Self {
            cleaner: Arc::new(ProcessCleaner::new(
                workspace.bin_dir(),
                &config.source_lang,
                &config.target_lang,
            )),
            preprocessor: Arc::new(ProcessPreprocessor::new(
                workspace.bin_dir(),
                &config.source_lang,
                &config.target_lang,
            )),
            aligner: Arc::new(ProcessAligner::new(
                workspace.bin_dir(),
                &aligner_model_dir,
                &config.source_lang,
                &config.target_lang,
            )),
            inventory: Arc::new(NvidiaSmi),
            event_sink: Arc::new(NoOpEventSink),
            delete_on_exit: !config.debug,
            engine,
            config,
        })
    }

    /// Replaces the progress event sink.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.event_sink = sink;
        self
    }

    /// Replaces the GPU inventory used by the pre-flight check.
    #[must_use]
    pub fn with_gpu_inventory(mut self, inventory: Arc<dyn GpuInventory>) -> Self {
        self.inventory = inventory;
        self
    }

    /// Replaces the corpus cleaner collaborator.
    #[must_use]
    pub fn with_cleaner(mut self, cleaner: Arc<dyn CorpusCleaner>) -> Self {
        self.cleaner = cleaner;
        self
    }

    /// Replaces the preprocessor collaborator.
    #[must_use]
    pub fn with_preprocessor(mut self, preprocessor: Arc<dyn Preprocessor>) -> Self {
        self.preprocessor = preprocessor;
        self
    }

    /// Replaces the aligner trainer collaborator.
    #[must_use]
    pub fn with_aligner(mut self, aligner: Arc<dyn AlignerTrainer>) -> Self {
        self.aligner = aligner;
        self
    }

    /// Returns the engine being built.
    #[must_use]
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// The canonical pipeline plan, in execution order.
    #[must_use]
    pub fn plan() -> Vec<StepDescriptor> {
        vec![
            StepDescriptor::new(step_ids::CLEAN_TMS, "Corpora cleaning")
                .with_capabilities(StepCapabilities::SKIP_AND_LOG),
            StepDescriptor::new(step_ids::PREPROCESS, "Corpora pre-processing")
                .with_capabilities(StepCapabilities::SKIP_AND_LOG),
            StepDescriptor::new(step_ids::TRAIN_ALIGNER, "Aligner training")
                .with_capabilities(StepCapabilities::SKIP_AND_LOG),
            StepDescriptor::new(step_ids::WRITE_CONFIG, "Writing config")
                .required()
                .hidden(),
        ]
    }

    /// Builds the engine from scratch, discarding any previous attempt.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error; the checkpoint and temp area are left
    /// on disk so the run can be picked up with [`Self::resume`].
    pub async fn build(&self) -> Result<(), BuildError> {
        self.run(false).await
    }

    /// Resumes a previously interrupted build, skipping completed steps.
    ///
    /// # Errors
    ///
    /// Same contract as [`Self::build`].
    pub async fn resume(&self) -> Result<(), BuildError> {
        self.run(true).await
    }

    async fn run(&self, resume: bool) -> Result<(), BuildError> {
        debug!(
            engine = %self.engine.name(),
            resume,
            "starting engine training run"
        );

        // Run-scoped temp area: fresh on build, reused on resume.
        let temp_dir = self.engine.tempdir(TRAINING_TEMP, !resume)?;

        let checkpoint_path = temp_dir.join(CHECKPOINT_FILE);
        let mut schedule = Schedule::new(Self::plan(), self.config.steps.as_deref())?;
        if resume {
            schedule.load(&checkpoint_path);
        } else {
            // Establish a clean baseline so a later resume never sees a
            // stale checkpoint from a previous run.
            schedule.store(&checkpoint_path)?;
        }

        let corpora = BilingualCorpus::list(
            &self.config.source_lang,
            &self.config.target_lang,
            &self.config.roots,
        )?;
        if corpora.is_empty() {
            return Err(BuildError::CorpusNotFound {
                source_lang: self.config.source_lang.clone(),
                target_lang: self.config.target_lang.clone(),
                roots: self.config.roots.clone(),
            });
        }

        // Recreate the persistent output directory from scratch unless we
        // are resuming into an existing one.
        if !self.engine.path().is_dir() || !resume {
            crate::utils::recreate_dir(self.engine.path())?;
        }

        // The run log is closed on every exit path when it drops.
        let log_path = self.engine.logfile(TRAINING_LOG)?;
        let log = RunLog::open(log_path, resume)?;

        let run_id = Uuid::new_v4();
        log.info(format!(
            "training started: run={run_id}, engine={}, corpora={}, lang_pair={}-{}",
            self.engine.name(),
            corpora.len(),
            self.config.source_lang,
            self.config.target_lang,
        ));
        self.emit(&BuildEvent::TrainingStarted {
            run_id,
            engine: self.engine.name().to_string(),
            corpora: corpora.len(),
            source_lang: self.config.source_lang.clone(),
            target_lang: self.config.target_lang.clone(),
        });

        if let ConstraintStatus::Violated { cause } =
            ConstraintChecker::new(self.inventory.clone()).check()
        {
            log.info(format!("hardware constraint violated: {cause}"));
            self.emit(&BuildEvent::HardwareWarning { cause });
        }

        let mut ctx = BuildContext::new(corpora);
        let handlers = self.handlers(&temp_dir);

        let steps: Vec<StepDescriptor> = schedule.iter().cloned().collect();
        let total = schedule.visible_steps().len();
        let mut index = 0;
        // Counts every executed step, hidden ones included, for the log.
        let mut log_index = 0;

        for descriptor in steps {
            let skip = schedule.is_completed(descriptor.id());
            log_index += 1;

            if !descriptor.is_hidden() {
                index += 1;
                self.emit(&BuildEvent::StepStarted {
                    id: descriptor.id().to_string(),
                    name: descriptor.name().to_string(),
                    index,
                    total,
                });
            }

            log.info(format!(
                "training step \"{}\" ({}/{}) started",
                descriptor.id(),
                log_index,
                schedule.len(),
            ));

            let handler = handlers.get(descriptor.id()).ok_or_else(|| {
                BuildError::Internal(format!(
                    "no handler registered for step \"{}\"",
                    descriptor.id()
                ))
            })?;

            let params = StepParams::for_capabilities(
                descriptor.capabilities(),
                skip,
                &log,
                self.delete_on_exit,
            );

            let start = Instant::now();
            if let Err(err) = handler.run(&mut ctx, params).await {
                log.error(format!(
                    "training step \"{}\" failed: {err}",
                    descriptor.id()
                ));
                self.emit(&BuildEvent::StepFailed {
                    id: descriptor.id().to_string(),
                    name: descriptor.name().to_string(),
                    error: err.to_string(),
                });
                return Err(err);
            }
            let elapsed = start.elapsed();

            if !descriptor.is_hidden() {
                self.emit(&BuildEvent::StepCompleted {
                    id: descriptor.id().to_string(),
                    name: descriptor.name().to_string(),
                    index,
                    total,
                    elapsed,
                    skipped: skip,
                });
            }

            log.info(format!(
                "training step \"{}\" completed in {}",
                descriptor.id(),
                format_elapsed(elapsed),
            ));

            // Crash consistency: persist after every step so an interrupted
            // run re-attempts at most the in-flight step.
            schedule.step_completed(descriptor.id());
            schedule.store(&checkpoint_path)?;
        }

        log.info("training succeeded");
        self.emit(&BuildEvent::TrainingSucceeded {
            engine: self.engine.name().to_string(),
        });

        if self.delete_on_exit {
            self.engine.clear_tempdir(Some(TRAINING_TEMP));
        }

        Ok(())
    }

    fn handlers(&self, temp_dir: &Path) -> HashMap<&'static str, Arc<dyn StepHandler>> {
        let split_data_path = self
            .config
            .split_train
            .then(|| self.engine.data_path().to_path_buf());

        let mut handlers: HashMap<&'static str, Arc<dyn StepHandler>> = HashMap::new();
        handlers.insert(
            step_ids::CLEAN_TMS,
            Arc::new(train_steps::CleanStep::new(
                self.cleaner.clone(),
                &self.config.source_lang,
                &self.config.target_lang,
                temp_dir.join("clean_corpora"),
            )),
        );
        handlers.insert(
            step_ids::PREPROCESS,
            Arc::new(train_steps::PreprocessStep::new(
                self.preprocessor.clone(),
                &self.config.source_lang,
                &self.config.target_lang,
                temp_dir.join("preprocessed_corpora"),
                split_data_path,
            )),
        );
        handlers.insert(
            step_ids::TRAIN_ALIGNER,
            Arc::new(train_steps::AlignStep::new(self.aligner.clone())),
        );
        handlers.insert(
            step_ids::WRITE_CONFIG,
            Arc::new(train_steps::WriteConfigStep::new(
                self.engine.config_path().to_path_buf(),
                &self.config.source_lang,
                &self.config.target_lang,
            )),
        );
        handlers
    }

    fn emit(&self, event: &BuildEvent) {
        self.event_sink.emit(event);
    }
}
