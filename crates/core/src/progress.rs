//! Pipeline stages and progress reporting.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The seven checkpoints of the crate design pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum Stage {
    /// Lumber catalog resolution.
    Lumber,
    /// Skid sizing and spacing.
    Skids,
    /// Floor board arrangement.
    Floor,
    /// Plywood sheet splicing.
    Plywood,
    /// Cleat placement.
    Cleats,
    /// Unified geometry assembly.
    Geometry,
    /// Expression synthesis.
    Expressions,
}

impl Stage {
    /// All stages in execution order.
    pub const ALL: [Stage; 7] = [
        Stage::Lumber,
        Stage::Skids,
        Stage::Floor,
        Stage::Plywood,
        Stage::Cleats,
        Stage::Geometry,
        Stage::Expressions,
    ];

    /// Returns the lowercase stage name.
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Lumber => "lumber",
            Stage::Skids => "skids",
            Stage::Floor => "floor",
            Stage::Plywood => "plywood",
            Stage::Cleats => "cleats",
            Stage::Geometry => "geometry",
            Stage::Expressions => "expressions",
        }
    }

    /// 1-based position of this stage in the pipeline.
    pub fn ordinal(&self) -> usize {
        *self as usize + 1
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Progress callback invoked at stage boundaries.
pub type ProgressCallback = Box<dyn Fn(ProgressInfo) + Send + Sync>;

/// Progress information emitted after each completed stage.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// The stage that just completed.
    pub stage: Stage,
    /// Number of completed stages (1..=total).
    pub completed: usize,
    /// Total number of stages.
    pub total: usize,
    /// Elapsed time since the run started, in milliseconds.
    pub elapsed_ms: u64,
}

impl ProgressInfo {
    /// Creates progress info for a completed stage.
    pub fn completed(stage: Stage, elapsed_ms: u64) -> Self {
        Self {
            stage,
            completed: stage.ordinal(),
            total: Stage::ALL.len(),
            elapsed_ms,
        }
    }

    /// Completion percentage (0 - 100).
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        self.completed as f64 / self.total as f64 * 100.0
    }

    /// Returns true once the final stage has completed.
    pub fn is_finished(&self) -> bool {
        self.completed >= self.total
    }
}
