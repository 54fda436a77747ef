//! Pre-flight hardware adequacy check.
//!
//! Training is possible without adequate GPUs, just impractically slow, so
//! a failed check is reported as a value and surfaced as a warning; it never
//! aborts the run.

use std::process::Command;
use std::sync::Arc;

const GB: u64 = 1024 * 1024 * 1024;

/// Minimum recommended memory per GPU, in bytes.
pub const RECOMMENDED_GPU_RAM: u64 = 8 * GB;

/// One compute accelerator as reported by the inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpuInfo {
    /// Device index.
    pub index: u32,
    /// Total device memory in bytes.
    pub total_memory: u64,
}

/// Enumerates the host's compute accelerators.
#[cfg_attr(test, mockall::automock)]
pub trait GpuInventory: Send + Sync {
    /// Returns all visible GPUs with their total memory.
    ///
    /// # Errors
    ///
    /// Returns an IO error when the inventory tool cannot be queried.
    fn list_gpus(&self) -> std::io::Result<Vec<GpuInfo>>;
}

/// GPU inventory backed by the `nvidia-smi` tool.
///
/// Hosts without the tool (or without NVIDIA drivers) report an empty
/// inventory rather than an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct NvidiaSmi;

impl GpuInventory for NvidiaSmi {
    fn list_gpus(&self) -> std::io::Result<Vec<GpuInfo>> {
        let output = match Command::new("nvidia-smi")
            .args(["--query-gpu=index,memory.total", "--format=csv,noheader,nounits"])
            .output()
        {
            Ok(output) if output.status.success() => output,
            _ => return Ok(Vec::new()),
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let mut gpus = Vec::new();

        for line in stdout.lines() {
            let mut fields = line.split(',').map(str::trim);
            let (Some(index), Some(memory)) = (fields.next(), fields.next()) else {
                continue;
            };
            if let (Ok(index), Ok(mib)) = (index.parse::<u32>(), memory.parse::<u64>()) {
                gpus.push(GpuInfo {
                    index,
                    total_memory: mib * 1024 * 1024,
                });
            }
        }

        Ok(gpus)
    }
}

/// Outcome of the constraint check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstraintStatus {
    /// The host hardware meets the recommendation.
    Satisfied,
    /// The host hardware is inadequate; the run should continue anyway.
    Violated {
        /// Human-readable cause, suitable for a warning line.
        cause: String,
    },
}

impl ConstraintStatus {
    /// Returns the violation cause, if any.
    #[must_use]
    pub fn cause(&self) -> Option<&str> {
        match self {
            Self::Satisfied => None,
            Self::Violated { cause } => Some(cause),
        }
    }
}

/// Checks the host hardware against the training recommendation.
pub struct ConstraintChecker {
    inventory: Arc<dyn GpuInventory>,
}

impl ConstraintChecker {
    /// Creates a checker over the given inventory.
    #[must_use]
    pub fn new(inventory: Arc<dyn GpuInventory>) -> Self {
        Self { inventory }
    }

    /// Runs the check.
    ///
    /// Violated when no GPU is visible (or the inventory cannot be queried),
    /// or when any GPU has less than [`RECOMMENDED_GPU_RAM`].
    #[must_use]
    pub fn check(&self) -> ConstraintStatus {
        let gpus = self.inventory.list_gpus().unwrap_or_default();

        if gpus.is_empty() {
            return ConstraintStatus::Violated {
                cause: "No GPU for neural engine training, the process will take \
                        very long time to complete."
                    .to_string(),
            };
        }

        for gpu in gpus {
            if gpu.total_memory < RECOMMENDED_GPU_RAM {
                return ConstraintStatus::Violated {
                    cause: format!(
                        "The RAM of GPU {} is only {:.0}G. More than {:.0}G of RAM \
                         recommended for each GPU.",
                        gpu.index,
                        gpu.total_memory as f64 / GB as f64,
                        RECOMMENDED_GPU_RAM as f64 / GB as f64,
                    ),
                };
            }
        }

        ConstraintStatus::Satisfied
    }
}
