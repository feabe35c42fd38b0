//! Conditional edges

use serde::{Deserialize, Serialize};

/// Condition evaluated against the source node's response
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EdgeCondition {
    /// Unconditional
    #[default]
    Always,
    /// Source answered yes
    Yes,
    /// Source answered no
    No,
    /// Source text equals the option id
    ChoiceEquals {
        /// Option to match
        #[serde(
            default,
            rename = "optionId",
            skip_serializing_if = "Option::is_none"
        )]
        option_id: Option<String>,
    },
    /// Source list contains the option id
    ChoiceContains {
        /// Option to match
        #[serde(
            default,
            rename = "optionId",
            skip_serializing_if = "Option::is_none"
        )]
        option_id: Option<String>,
    },
    /// Source has any meaningful answer
    Exists,
}

impl EdgeCondition {
    /// `choice_equals(option_id)`
    pub fn choice_equals(option_id: impl Into<String>) -> Self {
        Self::ChoiceEquals {
            option_id: Some(option_id.into()),
        }
    }

    /// `choice_contains(option_id)`
    pub fn choice_contains(option_id: impl Into<String>) -> Self {
        Self::ChoiceContains {
            option_id: Some(option_id.into()),
        }
    }

    /// Wire identifier of the condition type
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Always => "always",
            Self::Yes => "yes",
            Self::No => "no",
            Self::ChoiceEquals { .. } => "choice_equals",
            Self::ChoiceContains { .. } => "choice_contains",
            Self::Exists => "exists",
        }
    }
}

/// A directed, conditional edge between two nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// Unique within the graph
    pub id: String,
    /// Source node id
    pub from: String,
    /// Target node id
    pub to: String,
    /// Firing condition
    #[serde(rename = "when", default)]
    pub condition: EdgeCondition,
}

impl Edge {
    /// Build an edge
    pub fn new(
        id: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
        condition: EdgeCondition,
    ) -> Self {
        Self {
            id: id.into(),
            from: from.into(),
            to: to.into(),
            condition,
        }
    }

    /// Unconditional edge with the conventional `edge-{from}-{to}` id
    pub fn always(from: impl Into<String>, to: impl Into<String>) -> Self {
        let from = from.into();
        let to = to.into();
        Self {
            id: format!("edge-{from}-{to}"),
            from,
            to,
            condition: EdgeCondition::Always,
        }
    }
}
