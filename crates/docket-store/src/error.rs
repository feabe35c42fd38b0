//! Error types for store orchestration

use docket_runtime::{StageError, ValidationReport};

/// Store orchestration error
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No template with this id
    #[error("template not found: {0}")]
    TemplateNotFound(String),

    /// No assignment with this id
    #[error("assignment not found: {0}")]
    AssignmentNotFound(String),

    /// Template has no such version
    #[error("template {template_id} has no version {version}")]
    VersionNotFound {
        /// Template
        template_id: String,
        /// Missing version
        version: u32,
    },

    /// Title empty after trimming
    #[error("title must not be empty")]
    EmptyTitle,

    /// Publishing refused by the validator
    #[error("graph failed validation: {0}")]
    InvalidGraph(ValidationReport),

    /// Stage would move backwards
    #[error(transparent)]
    StageDowngrade(#[from] StageError),

    /// Key-value backend failure
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Document (de)serialization failure
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        Self::Persistence(err.to_string())
    }
}

impl StoreError {
    /// The caller referenced something that does not exist
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::TemplateNotFound(_) | Self::AssignmentNotFound(_) | Self::VersionNotFound { .. }
        )
    }
}

/// Result alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;
