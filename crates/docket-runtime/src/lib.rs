//! Docket Runtime - questionnaire graph interpreter
//!
//! Deterministic evaluators over a questionnaire graph and the responses of
//! one assignment:
//! - Visibility: which nodes a client currently sees
//! - Traversal: which edges fire out of a node
//! - Progress and stage derivation
//! - Filing-label coverage
//! - Structural validation before publish
//! - Section projection for client runners
//! - Projection to and gating through the flat legacy intake
//!
//! None of the evaluators fail: malformed or missing input is treated as
//! absent.
//!
//! # Example
//!
//! ```rust
//! use docket_graph::{index_responses, Edge, EdgeCondition, Graph, Node, NodeKind};
//! use docket_runtime::{next_node_ids, validate_graph};
//!
//! let graph = Graph::from_parts(
//!     vec![Node::new(NodeKind::Start, "start"), Node::new(NodeKind::End, "end")],
//!     vec![Edge::new("e1", "start", "end", EdgeCondition::Always)],
//! );
//!
//! assert!(validate_graph(&graph).is_valid());
//! let responses = index_responses(std::iter::empty());
//! assert_eq!(next_node_ids("start", &graph.edges, &responses), vec!["end"]);
//! ```

pub mod condition;
pub mod coverage;
pub mod error;
pub mod legacy;
pub mod progress;
pub mod sections;
pub mod stage;
pub mod traversal;
pub mod validation;
pub mod visibility;

pub use condition::condition_matches;
pub use coverage::{compute_coverage_state, CoverageState};
pub use error::StageError;
pub use legacy::{
    build_intake_state_from_assignment, build_legacy_answers_from_responses, Answers,
    EmptyCatalog, FieldValue, FlagEntry, IntakeState, LegacyCatalog, LegacyField,
    LegacyFieldKind, LegacyStep, StaticCatalog,
};
pub use progress::{derive_assignment_progress, AssignmentProgress};
pub use sections::{missing_required, project_graph_to_sections, visible_sections, ProjectedSection};
pub use stage::{allowed_stage_transitions, validate_stage_transition};
pub use traversal::next_node_ids;
pub use validation::{
    validate_graph, GraphValidator, ValidationContext, ValidationError, ValidationReport,
    ValidationWarning,
};
pub use visibility::{evaluate_node_visibility, Visibility};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for evaluating questionnaires
    pub use crate::{
        compute_coverage_state, derive_assignment_progress, evaluate_node_visibility,
        next_node_ids, validate_graph, AssignmentProgress, CoverageState, LegacyCatalog,
        ValidationReport, Visibility,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
