//! Step metadata, capabilities and the handler trait.
//!
//! Steps are registered once, as immutable descriptors, in the pipeline's
//! canonical order. Each descriptor carries the capability set its handler
//! declares; at invocation time the runner populates only the declared
//! parameters (see [`StepParams`]), so simple steps never see plumbing they
//! did not ask for.

use crate::context::BuildContext;
use crate::engine::RunLog;
use crate::errors::BuildError;
use async_trait::async_trait;

/// The optional execution parameters a step handler declares support for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepCapabilities {
    /// The handler honors the skip/recover flag on resume.
    pub skip: bool,
    /// The handler routes external process output to the run log.
    pub log: bool,
    /// The handler cleans intermediate files up when the run is not in
    /// debug mode.
    pub delete_on_exit: bool,
}

impl StepCapabilities {
    /// No optional parameters.
    pub const NONE: Self = Self {
        skip: false,
        log: false,
        delete_on_exit: false,
    };

    /// Skip flag and log sink, the common pair for external-process steps.
    pub const SKIP_AND_LOG: Self = Self {
        skip: true,
        log: true,
        delete_on_exit: false,
    };
}

/// Static metadata for one pipeline step.
///
/// Descriptors are defined at registration time and immutable for the
/// process lifetime; they are never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepDescriptor {
    id: String,
    name: String,
    optional: bool,
    hidden: bool,
    capabilities: StepCapabilities,
}

impl StepDescriptor {
    /// Creates a descriptor with the default flags: optional, visible,
    /// no capabilities.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            optional: true,
            hidden: false,
            capabilities: StepCapabilities::NONE,
        }
    }

    /// Marks the step as non-optional: it runs even when a step subset is
    /// requested that does not include it.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.optional = false;
        self
    }

    /// Excludes the step from progress display; it still executes.
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Attaches the handler's declared capability set.
    #[must_use]
    pub fn with_capabilities(mut self, capabilities: StepCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Returns the stable step id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the human-readable display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true if the step only runs when explicitly scheduled.
    #[must_use]
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Returns true if the step is excluded from progress display.
    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Returns the declared capability set.
    #[must_use]
    pub fn capabilities(&self) -> StepCapabilities {
        self.capabilities
    }
}

/// The per-invocation parameter bundle handed to a step handler.
///
/// Fields are populated only for the capabilities the step declared;
/// everything else stays `None` and falls back to an inert default.
#[derive(Debug, Clone, Copy, Default)]
pub struct StepParams<'a> {
    skip: Option<bool>,
    log: Option<&'a RunLog>,
    delete_on_exit: Option<bool>,
}

impl<'a> StepParams<'a> {
    /// Builds the parameter bundle for one invocation, filtered to the
    /// given capability set.
    #[must_use]
    pub fn for_capabilities(
        capabilities: StepCapabilities,
        skip: bool,
        log: &'a RunLog,
        delete_on_exit: bool,
    ) -> Self {
        Self {
            skip: capabilities.skip.then_some(skip),
            log: capabilities.log.then_some(log),
            delete_on_exit: capabilities.delete_on_exit.then_some(delete_on_exit),
        }
    }

    /// The skip/recover flag; false for handlers that did not declare it.
    #[must_use]
    pub fn skip(&self) -> bool {
        self.skip.unwrap_or(false)
    }

    /// The run log sink, if declared.
    #[must_use]
    pub fn log(&self) -> Option<&'a RunLog> {
        self.log
    }

    /// The cleanup flag; false for handlers that did not declare it.
    #[must_use]
    pub fn delete_on_exit(&self) -> bool {
        self.delete_on_exit.unwrap_or(false)
    }
}

/// A unit of pipeline work.
///
/// Handlers mutate the shared [`BuildContext`] in place. When the skip flag
/// is set, a handler must not redo its heavy work but must still repopulate
/// the context artifacts it is responsible for, typically by reading back
/// what the prior attempt materialized on disk.
#[async_trait]
pub trait StepHandler: Send + Sync {
    /// Executes the step.
    async fn run(&self, ctx: &mut BuildContext, params: StepParams<'_>) -> Result<(), BuildError>;
}
