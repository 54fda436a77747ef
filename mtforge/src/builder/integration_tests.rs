//! End-to-end scenarios for the build orchestrator.

use super::{step_ids, BuilderConfig, EngineBuilder};
use crate::engine::{Engine, EngineConfig, Workspace};
use crate::errors::BuildError;
use crate::events::{BuildEvent, CollectingEventSink};
use crate::hardware::{GpuInfo, MockGpuInventory};
use crate::schedule::Checkpoint;
use crate::testing::{FailingPreprocessor, MockAligner, MockCleaner, MockPreprocessor};
use pretty_assertions::assert_eq;
use std::path::PathBuf;
use std::sync::Arc;

struct Fixture {
    _dir: tempfile::TempDir,
    workspace: Workspace,
    corpora_root: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let workspace = Workspace::new(dir.path());

        let corpora_root = dir.path().join("corpora");
        std::fs::create_dir_all(&corpora_root).unwrap();
        for name in ["europarl", "news"] {
            std::fs::write(corpora_root.join(format!("{name}.en")), "hello\n").unwrap();
            std::fs::write(corpora_root.join(format!("{name}.fr")), "bonjour\n").unwrap();
        }

        Self {
            _dir: dir,
            workspace,
            corpora_root,
        }
    }

    fn config(&self) -> BuilderConfig {
        // Debug keeps the temp area (and checkpoint) around for assertions.
        BuilderConfig::new("default", "en", "fr", vec![self.corpora_root.clone()]).with_debug()
    }

    fn builder(&self, config: BuilderConfig) -> Harness {
        let cleaner = Arc::new(MockCleaner::new("en", "fr"));
        let preprocessor = Arc::new(MockPreprocessor::new("en", "fr"));
        let aligner = Arc::new(MockAligner::new());
        let sink = Arc::new(CollectingEventSink::new());

        let builder = EngineBuilder::new(&self.workspace, config)
            .unwrap()
            .with_cleaner(cleaner.clone())
            .with_preprocessor(preprocessor.clone())
            .with_aligner(aligner.clone())
            .with_gpu_inventory(adequate_gpu())
            .with_event_sink(sink.clone());

        Harness {
            builder,
            cleaner,
            preprocessor,
            aligner,
            sink,
        }
    }

    fn checkpoint_path(&self) -> PathBuf {
        self.workspace
            .runtime_dir()
            .join("default")
            .join("tmp")
            .join("training")
            .join("checkpoint.json")
    }

    fn log_path(&self) -> PathBuf {
        self.workspace
            .runtime_dir()
            .join("default")
            .join("logs")
            .join("training.log")
    }

    fn completed_steps(&self) -> Vec<String> {
        Checkpoint::load(&self.checkpoint_path())
            .completed()
            .to_vec()
    }
}

struct Harness {
    builder: EngineBuilder,
    cleaner: Arc<MockCleaner>,
    preprocessor: Arc<MockPreprocessor>,
    aligner: Arc<MockAligner>,
    sink: Arc<CollectingEventSink>,
}

fn adequate_gpu() -> Arc<MockGpuInventory> {
    let mut inventory = MockGpuInventory::new();
    inventory.expect_list_gpus().returning(|| {
        Ok(vec![GpuInfo {
            index: 0,
            total_memory: 16 * 1024 * 1024 * 1024,
        }])
    });
    Arc::new(inventory)
}

fn no_gpus() -> Arc<MockGpuInventory> {
    let mut inventory = MockGpuInventory::new();
    inventory.expect_list_gpus().returning(|| Ok(Vec::new()));
    Arc::new(inventory)
}

fn completed_events(sink: &CollectingEventSink) -> Vec<(String, bool)> {
    sink.events()
        .into_iter()
        .filter_map(|event| match event {
            BuildEvent::StepCompleted { id, skipped, .. } => Some((id, skipped)),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_fresh_build_runs_all_steps_once() {
    let fixture = Fixture::new();
    let harness = fixture.builder(fixture.config());

    harness.builder.build().await.unwrap();

    assert_eq!(harness.cleaner.call_count(), 1);
    assert_eq!(harness.preprocessor.call_count(), 1);
    assert_eq!(harness.aligner.call_count(), 1);

    // The config artifact declares the language pair.
    let engine = harness.builder.engine();
    let config = EngineConfig::load(engine.config_path()).unwrap();
    assert_eq!(config, EngineConfig::new("en", "fr"));

    // The checkpoint lists all four steps in completion order.
    assert_eq!(
        fixture.completed_steps(),
        ["clean_tms", "preprocess", "train_aligner", "write_config"]
    );

    // Visible progress covers three steps; write_config is hidden.
    assert_eq!(
        completed_events(&harness.sink),
        vec![
            ("clean_tms".to_string(), false),
            ("preprocess".to_string(), false),
            ("train_aligner".to_string(), false),
        ]
    );
}

#[tokio::test]
async fn test_aligner_trains_on_preprocessed_corpora() {
    let fixture = Fixture::new();
    let harness = fixture.builder(fixture.config());

    harness.builder.build().await.unwrap();

    let roots = harness.aligner.recorded_roots();
    assert_eq!(roots.len(), 1);
    assert!(roots[0].ends_with("preprocessed_corpora"));
}

#[tokio::test]
async fn test_split_train_passes_engine_data_path() {
    let fixture = Fixture::new();
    let harness = fixture.builder(fixture.config());

    harness.builder.build().await.unwrap();

    let data_path = harness.builder.engine().data_path().to_path_buf();
    assert_eq!(
        harness.preprocessor.recorded_split_paths(),
        vec![Some(data_path)]
    );
}

#[tokio::test]
async fn test_without_split_passes_no_data_path() {
    let fixture = Fixture::new();
    let harness = fixture.builder(fixture.config().without_split());

    harness.builder.build().await.unwrap();

    assert_eq!(harness.preprocessor.recorded_split_paths(), vec![None]);
}

#[tokio::test]
async fn test_non_debug_build_purges_the_temp_area() {
    let fixture = Fixture::new();
    let config =
        BuilderConfig::new("default", "en", "fr", vec![fixture.corpora_root.clone()]);
    let harness = fixture.builder(config);

    harness.builder.build().await.unwrap();

    assert!(!fixture.checkpoint_path().exists());
    // The persistent artifacts survive the cleanup.
    assert!(harness.builder.engine().exists());
}

#[tokio::test]
async fn test_failed_step_leaves_checkpoint_for_resume() {
    let fixture = Fixture::new();
    let harness = fixture.builder(fixture.config());
    let builder = harness
        .builder
        .with_preprocessor(Arc::new(FailingPreprocessor));

    let err = builder.build().await.unwrap_err();
    assert!(matches!(err, BuildError::ProcessFailed { .. }));

    // Only the cleaning step committed before the failure.
    assert_eq!(fixture.completed_steps(), ["clean_tms"]);
    assert!(!builder.engine().exists());
}

#[tokio::test]
async fn test_resume_skips_completed_steps() {
    let fixture = Fixture::new();

    // First attempt dies in preprocessing.
    let first = fixture.builder(fixture.config());
    let first_builder = first
        .builder
        .with_preprocessor(Arc::new(FailingPreprocessor));
    first_builder.build().await.unwrap_err();

    // Second attempt resumes with a working preprocessor.
    let second = fixture.builder(fixture.config());
    second.builder.resume().await.unwrap();

    // Cleaning was recovered from disk, not re-run.
    assert_eq!(second.cleaner.call_count(), 0);
    assert_eq!(second.preprocessor.call_count(), 1);
    assert_eq!(second.aligner.call_count(), 1);

    assert_eq!(
        completed_events(&second.sink),
        vec![
            ("clean_tms".to_string(), true),
            ("preprocess".to_string(), false),
            ("train_aligner".to_string(), false),
        ]
    );

    // The resumed run re-appends the skipped step, matching the
    // append-on-every-step checkpoint contract.
    assert_eq!(
        fixture.completed_steps(),
        [
            "clean_tms",
            "clean_tms",
            "preprocess",
            "train_aligner",
            "write_config"
        ]
    );
    assert!(second.builder.engine().exists());
}

#[tokio::test]
async fn test_resume_of_a_finished_build_redoes_nothing() {
    let fixture = Fixture::new();

    let first = fixture.builder(fixture.config());
    first.builder.build().await.unwrap();
    let config_before =
        std::fs::read_to_string(first.builder.engine().config_path()).unwrap();

    let second = fixture.builder(fixture.config());
    second.builder.resume().await.unwrap();

    assert_eq!(second.cleaner.call_count(), 0);
    assert_eq!(second.preprocessor.call_count(), 0);
    assert_eq!(second.aligner.call_count(), 0);
    assert!(completed_events(&second.sink)
        .iter()
        .all(|(_, skipped)| *skipped));

    let config_after =
        std::fs::read_to_string(second.builder.engine().config_path()).unwrap();
    assert_eq!(config_before, config_after);
}

#[tokio::test]
async fn test_fresh_build_resets_a_stale_checkpoint() {
    let fixture = Fixture::new();

    let first = fixture.builder(fixture.config());
    first.builder.build().await.unwrap();
    assert_eq!(fixture.completed_steps().len(), 4);

    // A new build() starts over: empty checkpoint baseline, all steps rerun.
    let second = fixture.builder(fixture.config());
    second.builder.build().await.unwrap();

    assert_eq!(second.cleaner.call_count(), 1);
    assert_eq!(second.preprocessor.call_count(), 1);
    assert_eq!(second.aligner.call_count(), 1);
    assert_eq!(fixture.completed_steps().len(), 4);
}

#[tokio::test]
async fn test_resume_with_missing_checkpoint_behaves_like_fresh() {
    let fixture = Fixture::new();

    // No prior run at all: resume must not fail, just run everything.
    let harness = fixture.builder(fixture.config());
    harness.builder.resume().await.unwrap();

    assert_eq!(harness.cleaner.call_count(), 1);
    assert_eq!(harness.preprocessor.call_count(), 1);
    assert_eq!(harness.aligner.call_count(), 1);
}

#[tokio::test]
async fn test_resume_with_corrupt_checkpoint_behaves_like_fresh() {
    let fixture = Fixture::new();

    let first = fixture.builder(fixture.config());
    first.builder.build().await.unwrap();
    std::fs::write(fixture.checkpoint_path(), "{definitely not json").unwrap();

    let second = fixture.builder(fixture.config());
    second.builder.resume().await.unwrap();

    assert_eq!(second.cleaner.call_count(), 1);
    assert_eq!(second.preprocessor.call_count(), 1);
    assert_eq!(second.aligner.call_count(), 1);
}

#[tokio::test]
async fn test_step_subset_still_runs_required_steps() {
    let fixture = Fixture::new();
    let config = fixture
        .config()
        .with_steps(vec![step_ids::TRAIN_ALIGNER.to_string()]);
    let harness = fixture.builder(config);

    harness.builder.build().await.unwrap();

    assert_eq!(harness.cleaner.call_count(), 0);
    assert_eq!(harness.preprocessor.call_count(), 0);
    assert_eq!(harness.aligner.call_count(), 1);

    // The aligner fell back to the raw corpora root.
    let roots = harness.aligner.recorded_roots();
    assert_eq!(roots, vec![fixture.corpora_root.clone()]);

    // write_config is non-optional and ran despite the filter.
    assert!(harness.builder.engine().exists());
    assert_eq!(
        fixture.completed_steps(),
        ["train_aligner", "write_config"]
    );

    // Progress denominator counts only the one visible scheduled step.
    let started: Vec<(usize, usize)> = harness
        .sink
        .events()
        .into_iter()
        .filter_map(|event| match event {
            BuildEvent::StepStarted { index, total, .. } => Some((index, total)),
            _ => None,
        })
        .collect();
    assert_eq!(started, vec![(1, 1)]);
}

#[tokio::test]
async fn test_missing_hardware_warns_but_completes() {
    let fixture = Fixture::new();
    let harness = fixture.builder(fixture.config());
    let builder = harness.builder.with_gpu_inventory(no_gpus());

    builder.build().await.unwrap();

    let warnings: Vec<BuildEvent> = harness
        .sink
        .events()
        .into_iter()
        .filter(|event| matches!(event, BuildEvent::HardwareWarning { .. }))
        .collect();
    assert_eq!(warnings.len(), 1);
    assert!(builder.engine().exists());
}

#[tokio::test]
async fn test_fresh_build_recreates_the_engine_directory() {
    let fixture = Fixture::new();
    let harness = fixture.builder(fixture.config());

    let engine_path = harness.builder.engine().path().to_path_buf();
    std::fs::create_dir_all(&engine_path).unwrap();
    std::fs::write(engine_path.join("stale.bin"), "old model").unwrap();

    harness.builder.build().await.unwrap();

    assert!(!engine_path.join("stale.bin").exists());
    assert!(harness.builder.engine().exists());
}

#[tokio::test]
async fn test_built_engine_loads_back() {
    let fixture = Fixture::new();
    let harness = fixture.builder(fixture.config());

    harness.builder.build().await.unwrap();

    let engine = Engine::load(&fixture.workspace, "default").unwrap();
    assert_eq!(engine.source_lang(), "en");
    assert_eq!(engine.target_lang(), "fr");
    assert_eq!(Engine::list(&fixture.workspace).unwrap(), ["default"]);
}

#[tokio::test]
async fn test_run_log_numbers_every_step() {
    let fixture = Fixture::new();
    let harness = fixture.builder(fixture.config());

    harness.builder.build().await.unwrap();

    // The log counter covers all executed steps, hidden ones included.
    let log = std::fs::read_to_string(fixture.log_path()).unwrap();
    assert!(log.contains("training step \"clean_tms\" (1/4) started"));
    assert!(log.contains("training step \"train_aligner\" (3/4) started"));
    assert!(log.contains("training step \"write_config\" (4/4) started"));
}

#[tokio::test]
async fn test_run_log_truncates_on_build_and_appends_on_resume() {
    let fixture = Fixture::new();

    let first = fixture.builder(fixture.config());
    let first_builder = first
        .builder
        .with_preprocessor(Arc::new(FailingPreprocessor));
    first_builder.build().await.unwrap_err();

    let log_path = fixture.log_path();
    let after_failure = std::fs::read_to_string(&log_path).unwrap();
    assert!(after_failure.contains("training step \"preprocess\" failed"));

    let second = fixture.builder(fixture.config());
    second.builder.resume().await.unwrap();

    let after_resume = std::fs::read_to_string(&log_path).unwrap();
    // Append mode keeps the failed attempt's lines.
    assert!(after_resume.contains("training step \"preprocess\" failed"));
    assert!(after_resume.contains("training succeeded"));

    let third = fixture.builder(fixture.config());
    third.builder.build().await.unwrap();

    let after_rebuild = std::fs::read_to_string(&log_path).unwrap();
    assert!(!after_rebuild.contains("failed"));
}
