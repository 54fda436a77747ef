//! Event sink trait and implementations.

use super::BuildEvent;
use crate::utils::format_elapsed;
use parking_lot::RwLock;
use tracing::{info, warn};

/// Receives build progress events.
///
/// Implementations must never fail or block the run; an event sink is
/// observation only.
pub trait EventSink: Send + Sync {
    /// Handles a single event.
    fn emit(&self, event: &BuildEvent);
}

/// A sink that discards all events. The default when none is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpEventSink;

impl EventSink for NoOpEventSink {
    fn emit(&self, _event: &BuildEvent) {
        // Intentionally empty.
    }
}

/// A sink that forwards events to the `tracing` framework.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingEventSink;

impl EventSink for LoggingEventSink {
    fn emit(&self, event: &BuildEvent) {
        match event {
            BuildEvent::HardwareWarning { cause } => {
                warn!(event = ?event, "{cause}");
            }
            _ => {
                info!(event = ?event, "build event");
            }
        }
    }
}

/// A sink that renders the classic interactive training output.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleEventSink;

impl EventSink for ConsoleEventSink {
    fn emit(&self, event: &BuildEvent) {
        match event {
            BuildEvent::TrainingStarted {
                engine,
                corpora,
                source_lang,
                target_lang,
                ..
            } => {
                println!("\n=========== TRAINING STARTED ===========\n");
                println!("ENGINE:  {engine}");
                println!("CORPORA: {corpora} corpora");
                println!("LANGS:   {source_lang} > {target_lang}");
                println!();
            }
            BuildEvent::HardwareWarning { cause } => {
                println!("\x1b[91mWARNING\x1b[0m: {cause}\n");
            }
            BuildEvent::StepStarted {
                name, index, total, ..
            } => {
                println!("{:<70}", format!("INFO: ({index} of {total}) {name}..."));
            }
            BuildEvent::StepCompleted { elapsed, .. } => {
                println!("DONE (in {})", format_elapsed(*elapsed));
            }
            BuildEvent::StepFailed { name, error, .. } => {
                println!("FAILED: {name}: {error}");
            }
            BuildEvent::TrainingSucceeded { engine } => {
                println!("\n=========== TRAINING SUCCESS ===========\n");
                println!("You can now start, stop or check the status of the server with command:");
                if engine == "default" {
                    println!("\tmtforge start|stop|status");
                } else {
                    println!("\tmtforge start|stop|status -e {engine}");
                }
                println!();
            }
        }
    }
}

/// A sink that records every event, for assertions in tests.
#[derive(Debug, Default)]
pub struct CollectingEventSink {
    events: RwLock<Vec<BuildEvent>>,
}

impl CollectingEventSink {
    /// Creates an empty collecting sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of all recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<BuildEvent> {
        self.events.read().clone()
    }

    /// Clears recorded events.
    pub fn reset(&self) {
        self.events.write().clear();
    }
}

impl EventSink for CollectingEventSink {
    fn emit(&self, event: &BuildEvent) {
        self.events.write().push(event.clone());
    }
}
