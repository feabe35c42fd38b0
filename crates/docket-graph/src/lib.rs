//! Docket Graph - questionnaire graph model
//!
//! The data model shared by every layer of the questionnaire runtime:
//! - Nodes and conditional edges forming an acyclic questionnaire graph
//! - Templates holding an append-only history of graph versions
//! - Assignments pinned to the template version they were issued against
//! - Node responses, a typed value union keyed by (assignment, node)
//! - Injected id and clock services
//!
//! # Example
//!
//! ```rust
//! use docket_graph::{Edge, EdgeCondition, Graph, Node, NodeKind};
//!
//! let mut graph = Graph::new();
//! graph.add_node(Node::new(NodeKind::Start, "start"));
//! graph.add_node(Node::new(NodeKind::Question, "q1"));
//! graph.add_edge(Edge::new("e1", "start", "q1", EdgeCondition::Always));
//!
//! assert_eq!(graph.outgoing("start").count(), 1);
//! ```

pub mod assignment;
pub mod clock;
pub mod edge;
pub mod graph;
pub mod ids;
pub mod label;
pub mod node;
pub mod response;
pub mod template;

pub use assignment::{Assignment, AssignmentStage, LegacyAssignmentStatus};
pub use clock::{Clock, FixedClock, SystemClock, Timestamp};
pub use edge::{Edge, EdgeCondition};
pub use graph::Graph;
pub use ids::{IdGenerator, SequentialIds, UlidIds};
pub use label::FilingLabel;
pub use node::{ChoiceOption, FileRules, InputType, Node, NodeKind, UiPosition};
pub use response::{
    index_assignment_responses, index_responses, move_file_between_values, remove_files_by_id,
    with_appended_files, FileMove, FilesPayload, NodeResponse, ResponseFile, ResponseValue, ResponsesByNode,
    SkipActor, SkipRecord,
};
pub use template::{
    CreatedBy, GraphEdit, Publisher, Template, TemplateKind, TemplateVersion,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with questionnaire graphs
    pub use crate::{
        Assignment, AssignmentStage, Clock, Edge, EdgeCondition, FilingLabel, Graph, IdGenerator,
        InputType, Node, NodeKind, NodeResponse, ResponseValue, ResponsesByNode, Template,
        TemplateVersion,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
