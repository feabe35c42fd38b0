//! Assignments: a template version issued to a client

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::clock::Timestamp;

/// Workflow stage of an assignment.
///
/// Declaration order is the stage rank; the derived `Ord` compares ranks.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStage {
    /// Issued, nothing answered
    #[default]
    Assigned,
    /// Partially answered
    InProgress,
    /// Every client node answered or skipped
    Submitted,
    /// Attorney review requested
    NeedsReview,
    /// Attorney approved
    Approved,
    /// Finished
    Closed,
}

impl AssignmentStage {
    /// Every stage, by rank
    pub const ALL: [AssignmentStage; 6] = [
        Self::Assigned,
        Self::InProgress,
        Self::Submitted,
        Self::NeedsReview,
        Self::Approved,
        Self::Closed,
    ];

    /// Position in the fixed stage order
    #[inline]
    #[must_use]
    pub const fn rank(self) -> u8 {
        self as u8
    }

    /// Wire identifier
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Assigned => "assigned",
            Self::InProgress => "in_progress",
            Self::Submitted => "submitted",
            Self::NeedsReview => "needs_review",
            Self::Approved => "approved",
            Self::Closed => "closed",
        }
    }

    /// Human-readable label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Assigned => "assigned",
            Self::InProgress => "in progress",
            Self::Submitted => "submitted",
            Self::NeedsReview => "needs review",
            Self::Approved => "approved",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for AssignmentStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status vocabulary of the flat legacy intake
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegacyAssignmentStatus {
    /// Not started
    Assigned,
    /// Started
    InProgress,
    /// Finished by the client
    Completed,
}

impl LegacyAssignmentStatus {
    /// Stage equivalent
    #[must_use]
    pub const fn to_stage(self) -> AssignmentStage {
        match self {
            Self::Assigned => AssignmentStage::Assigned,
            Self::InProgress => AssignmentStage::InProgress,
            Self::Completed => AssignmentStage::Submitted,
        }
    }
}

/// A template version issued to a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    /// Unique id
    pub id: String,
    /// Template issued
    pub template_id: String,
    /// Version pinned at issuance; never upgraded
    pub template_version: u32,
    /// Title shown to the client
    pub title: String,
    /// Issue time
    pub assigned_at: Timestamp,
    /// Due date (`YYYY-MM-DD`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_at: Option<String>,
    /// Stage recorded so far; only ever moves forward
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub computed_stage: Option<AssignmentStage>,
    /// Hidden from listings
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub archived: bool,
}

impl Assignment {
    /// New assignment in stage `assigned`
    pub fn new(
        id: impl Into<String>,
        template_id: impl Into<String>,
        template_version: u32,
        title: impl Into<String>,
        assigned_at: Timestamp,
    ) -> Self {
        Self {
            id: id.into(),
            template_id: template_id.into(),
            template_version,
            title: title.into(),
            assigned_at,
            due_at: None,
            computed_stage: Some(AssignmentStage::Assigned),
            archived: false,
        }
    }

    /// Set the due date
    #[inline]
    #[must_use]
    pub fn with_due_at(mut self, due_at: impl Into<String>) -> Self {
        self.due_at = Some(due_at.into());
        self
    }

    /// Recorded stage, defaulting to `assigned`
    #[must_use]
    pub fn stage(&self) -> AssignmentStage {
        self.computed_stage.unwrap_or_default()
    }
}
