//! # mtforge
//!
//! A resumable training pipeline for machine translation engines.
//!
//! Building an engine runs a fixed sequence of heavyweight external
//! operations (corpus cleaning, preprocessing, aligner training, config
//! emission). Runs can take hours, so progress is checkpointed after every
//! step: an interrupted run can be resumed, re-attempting at most the step
//! that was in flight.
//!
//! - **Step registry**: immutable [`steps::StepDescriptor`]s with per-step
//!   capability declaration
//! - **Checkpoint-backed schedule**: [`schedule::Schedule`] filters the plan
//!   and tracks completion durably
//! - **Shared context**: [`context::BuildContext`] carries artifacts from
//!   step to step, recovered from disk on resume
//! - **Advisory hardware check**: inadequate GPUs warn, never abort
//! - **Event-driven progress**: typed [`events::BuildEvent`]s through a
//!   pluggable sink
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use mtforge::prelude::*;
//! use std::sync::Arc;
//!
//! let workspace = Workspace::new("/opt/mtforge");
//! let config = BuilderConfig::new("default", "en", "fr", vec!["/data/corpora".into()]);
//!
//! let builder = EngineBuilder::new(&workspace, config)?
//!     .with_event_sink(Arc::new(ConsoleEventSink));
//!
//! builder.build().await?;   // or builder.resume().await? after an interruption
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod builder;
pub mod context;
pub mod corpus;
pub mod engine;
pub mod errors;
pub mod events;
pub mod external;
pub mod hardware;
pub mod schedule;
pub mod steps;
pub mod testing;
pub mod utils;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::builder::{step_ids, BuilderConfig, EngineBuilder};
    pub use crate::context::BuildContext;
    pub use crate::corpus::BilingualCorpus;
    pub use crate::engine::{Engine, EngineConfig, RunLog, Workspace};
    pub use crate::errors::BuildError;
    pub use crate::events::{
        BuildEvent, CollectingEventSink, ConsoleEventSink, EventSink, LoggingEventSink,
        NoOpEventSink,
    };
    pub use crate::external::{AlignerTrainer, CorpusCleaner, Preprocessor};
    pub use crate::hardware::{ConstraintChecker, ConstraintStatus, GpuInventory, NvidiaSmi};
    pub use crate::schedule::{Checkpoint, Schedule};
    pub use crate::steps::{StepCapabilities, StepDescriptor, StepHandler, StepParams};
    pub use crate::utils::format_elapsed;
}
