//! Test doubles for the external collaborators.
//!
//! These mocks stand in for the heavyweight cleaning, preprocessing and
//! aligner-training processes: they record how they were called and
//! materialize cheap on-disk outputs so skip/recover paths behave exactly
//! as they do with the real collaborators.

mod mocks;

pub use mocks::{FailingPreprocessor, MockAligner, MockCleaner, MockPreprocessor};
