//! The filterable, checkpoint-aware view of the pipeline plan.

mod checkpoint;

pub use checkpoint::Checkpoint;

use crate::errors::BuildError;
use crate::steps::StepDescriptor;
use std::path::Path;

/// An ordered, filterable view over the full step list, backed by the
/// run's [`Checkpoint`].
///
/// Iteration always yields non-optional steps, whatever subset was
/// requested; the requested subset is validated at construction.
#[derive(Debug, Clone)]
pub struct Schedule {
    plan: Vec<StepDescriptor>,
    scheduled: Vec<String>,
    checkpoint: Checkpoint,
}

impl Schedule {
    /// Creates a schedule over `plan`, optionally filtered to `requested`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::UnknownSteps`] naming every requested id that
    /// is not part of the plan.
    pub fn new(plan: Vec<StepDescriptor>, requested: Option<&[String]>) -> Result<Self, BuildError> {
        let scheduled = match requested {
            Some(requested) => {
                let unknown: Vec<String> = requested
                    .iter()
                    .filter(|id| !plan.iter().any(|step| step.id() == id.as_str()))
                    .cloned()
                    .collect();

                if !unknown.is_empty() {
                    return Err(BuildError::UnknownSteps(unknown));
                }

                requested.to_vec()
            }
            None => plan.iter().map(|step| step.id().to_string()).collect(),
        };

        Ok(Self {
            plan,
            scheduled,
            checkpoint: Checkpoint::default(),
        })
    }

    /// Returns the ids of all steps in the plan, in canonical order.
    #[must_use]
    pub fn all_steps(&self) -> Vec<&str> {
        self.plan.iter().map(StepDescriptor::id).collect()
    }

    /// Returns the ids of steps that are scheduled and not hidden.
    ///
    /// This is purely the progress-count view; execution order comes from
    /// [`Self::iter`].
    #[must_use]
    pub fn visible_steps(&self) -> Vec<&str> {
        self.plan
            .iter()
            .filter(|step| self.is_scheduled(step.id()) && !step.is_hidden())
            .map(StepDescriptor::id)
            .collect()
    }

    /// Iterates the steps to execute: every step that is scheduled or
    /// non-optional, in plan order.
    pub fn iter(&self) -> impl Iterator<Item = &StepDescriptor> {
        self.plan
            .iter()
            .filter(|step| self.is_scheduled(step.id()) || !step.is_optional())
    }

    /// Returns the number of steps [`Self::iter`] yields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Returns true if no step would execute.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Persists the completed-step record to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the checkpoint file cannot be written.
    pub fn store(&self, path: &Path) -> Result<(), BuildError> {
        self.checkpoint.store(path)
    }

    /// Restores the completed-step record from `path`; a missing or corrupt
    /// file restores an empty record.
    pub fn load(&mut self, path: &Path) {
        self.checkpoint = Checkpoint::load(path);
    }

    /// Records a completed step. In-memory only until [`Self::store`].
    pub fn step_completed(&mut self, id: &str) {
        self.checkpoint.mark(id);
    }

    /// Returns true if the step completed earlier in this run.
    #[must_use]
    pub fn is_completed(&self, id: &str) -> bool {
        self.checkpoint.contains(id)
    }

    fn is_scheduled(&self, id: &str) -> bool {
        self.scheduled.iter().any(|scheduled| scheduled == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::StepCapabilities;
    use pretty_assertions::assert_eq;

    fn plan() -> Vec<StepDescriptor> {
        vec![
            StepDescriptor::new("clean_tms", "Corpora cleaning")
                .with_capabilities(StepCapabilities::SKIP_AND_LOG),
            StepDescriptor::new("preprocess", "Corpora pre-processing")
                .with_capabilities(StepCapabilities::SKIP_AND_LOG),
            StepDescriptor::new("train_aligner", "Aligner training")
                .with_capabilities(StepCapabilities::SKIP_AND_LOG),
            StepDescriptor::new("write_config", "Writing config")
                .required()
                .hidden(),
        ]
    }

    fn ids<'a>(schedule: &'a Schedule) -> Vec<&'a str> {
        schedule.iter().map(StepDescriptor::id).collect()
    }

    #[test]
    fn test_no_filter_schedules_everything() {
        let schedule = Schedule::new(plan(), None).unwrap();
        assert_eq!(
            ids(&schedule),
            vec!["clean_tms", "preprocess", "train_aligner", "write_config"]
        );
        assert_eq!(schedule.len(), 4);
    }

    #[test]
    fn test_filter_keeps_non_optional_steps() {
        let requested = vec!["preprocess".to_string()];
        let schedule = Schedule::new(plan(), Some(&requested)).unwrap();

        // write_config is non-optional and cannot be filtered out.
        assert_eq!(ids(&schedule), vec!["preprocess", "write_config"]);
    }

    #[test]
    fn test_unknown_requested_ids_fail() {
        let requested = vec!["preprocess".to_string(), "frobnicate".to_string()];
        let err = Schedule::new(plan(), Some(&requested)).unwrap_err();

        match err {
            BuildError::UnknownSteps(unknown) => assert_eq!(unknown, ["frobnicate"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_visible_steps_exclude_hidden() {
        let schedule = Schedule::new(plan(), None).unwrap();
        assert_eq!(
            schedule.visible_steps(),
            vec!["clean_tms", "preprocess", "train_aligner"]
        );
    }

    #[test]
    fn test_visible_steps_respect_the_filter() {
        let requested = vec!["train_aligner".to_string()];
        let schedule = Schedule::new(plan(), Some(&requested)).unwrap();
        assert_eq!(schedule.visible_steps(), vec!["train_aligner"]);
    }

    #[test]
    fn test_completion_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checkpoint.json");

        let mut schedule = Schedule::new(plan(), None).unwrap();
        schedule.step_completed("clean_tms");
        schedule.store(&path).unwrap();

        let mut resumed = Schedule::new(plan(), None).unwrap();
        resumed.load(&path);
        assert!(resumed.is_completed("clean_tms"));
        assert!(!resumed.is_completed("preprocess"));
    }

    #[test]
    fn test_load_missing_checkpoint_is_fresh() {
        let mut schedule = Schedule::new(plan(), None).unwrap();
        schedule.step_completed("clean_tms");
        schedule.load(Path::new("/no/such/checkpoint.json"));
        assert!(!schedule.is_completed("clean_tms"));
    }
}
