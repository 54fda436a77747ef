//! Build progress events.
//!
//! The runner reports progress as typed events through an [`EventSink`]
//! owned by the builder, so presentation (console output, logging,
//! test capture) stays out of the execution loop.

mod sink;

pub use sink::{CollectingEventSink, ConsoleEventSink, EventSink, LoggingEventSink, NoOpEventSink};

use serde::Serialize;
use std::time::Duration;
use uuid::Uuid;

/// A discrete event emitted during a build run.
#[derive(Debug, Clone, Serialize)]
pub enum BuildEvent {
    /// The run started; emitted once after corpora discovery.
    TrainingStarted {
        /// Unique id of this run attempt.
        run_id: Uuid,
        /// Engine name.
        engine: String,
        /// Number of discovered corpora.
        corpora: usize,
        /// Source language tag.
        source_lang: String,
        /// Target language tag.
        target_lang: String,
    },

    /// The hardware constraint check failed; advisory only, the run continues.
    HardwareWarning {
        /// Human-readable cause of the violation.
        cause: String,
    },

    /// A visible step is about to execute.
    StepStarted {
        /// Step id.
        id: String,
        /// Step display name.
        name: String,
        /// One-based index among visible steps.
        index: usize,
        /// Number of visible steps in this run.
        total: usize,
    },

    /// A visible step finished successfully.
    StepCompleted {
        /// Step id.
        id: String,
        /// Step display name.
        name: String,
        /// One-based index among visible steps.
        index: usize,
        /// Number of visible steps in this run.
        total: usize,
        /// Wall-clock time spent in the step handler.
        elapsed: Duration,
        /// True when the handler only recovered prior output.
        skipped: bool,
    },

    /// A step handler returned an error; the run aborts after this event.
    StepFailed {
        /// Step id.
        id: String,
        /// Step display name.
        name: String,
        /// The handler error, rendered.
        error: String,
    },

    /// All scheduled steps completed and the config artifact was written.
    TrainingSucceeded {
        /// Engine name.
        engine: String,
    },
}
