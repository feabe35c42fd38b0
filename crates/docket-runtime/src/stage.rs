//! Stage state machine: stages only move forward

use docket_graph::AssignmentStage;

use crate::error::StageError;

/// Validates a stage transition. Staying put is allowed.
///
/// # Errors
///
/// Returns [`StageError::Downgrade`] when `to` ranks below `from`.
pub fn validate_stage_transition(from: AssignmentStage, to: AssignmentStage) -> Result<(), StageError> {
    if to >= from {
        Ok(())
    } else {
        Err(StageError::Downgrade { from, to })
    }
}

/// Stages reachable from `from`, excluding `from` itself
#[must_use]
pub fn allowed_stage_transitions(from: AssignmentStage) -> Vec<AssignmentStage> {
    AssignmentStage::ALL.into_iter().filter(|stage| *stage > from).collect()
}
