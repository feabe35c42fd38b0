//! Error types for the runtime

use docket_graph::AssignmentStage;

/// Illegal stage transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum StageError {
    /// The target stage ranks below the current one
    #[error("stage cannot move backwards from {from} to {to}")]
    Downgrade {
        /// Current stage
        from: AssignmentStage,
        /// Requested stage
        to: AssignmentStage,
    },
}
