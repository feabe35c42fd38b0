//! Questionnaire graph: node list plus edge list.
//!
//! Declaration order of both lists is significant: traversal returns targets
//! in edge order and section projection breaks ties by id only after the
//! explicit ordering keys.

use serde::{Deserialize, Serialize};

use crate::edge::Edge;
use crate::node::{Node, NodeKind};

/// Directed questionnaire graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    /// Vertices
    #[serde(default)]
    pub nodes: Vec<Node>,
    /// Conditional edges
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl Graph {
    /// Empty graph
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from parts
    #[must_use]
    pub fn from_parts(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self { nodes, edges }
    }

    /// Look up a node
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    /// Look up a node for editing
    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|node| node.id == id)
    }

    /// Whether a node with this id exists
    #[must_use]
    pub fn contains_node(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    /// Whether any node has this kind
    #[must_use]
    pub fn has_kind(&self, kind: NodeKind) -> bool {
        self.nodes.iter().any(|node| node.kind == kind)
    }

    /// Nodes of one kind, in declaration order
    pub fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(move |node| node.kind == kind)
    }

    /// Edges pointing at `id`
    pub fn incoming<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Edge> {
        self.edges.iter().filter(move |edge| edge.to == id)
    }

    /// Edges leaving `id`
    pub fn outgoing<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Edge> {
        self.edges.iter().filter(move |edge| edge.from == id)
    }

    /// Append a node
    pub fn add_node(&mut self, node: Node) {
        self.nodes.push(node);
    }

    /// Append an edge
    pub fn add_edge(&mut self, edge: Edge) {
        self.edges.push(edge);
    }

    /// Replace the node with the same id; returns `false` when absent
    pub fn update_node(&mut self, node: Node) -> bool {
        match self.node_mut(&node.id) {
            Some(slot) => {
                *slot = node;
                true
            }
            None => false,
        }
    }

    /// Remove a node and its incident edges.
    ///
    /// Start and end nodes are protected: removing them is a no-op that
    /// returns `false`.
    pub fn remove_node(&mut self, id: &str) -> bool {
        let Some(index) = self.nodes.iter().position(|node| node.id == id) else {
            return false;
        };
        if self.nodes[index].kind.is_protected() {
            return false;
        }
        self.nodes.remove(index);
        self.edges.retain(|edge| edge.from != id && edge.to != id);
        true
    }

    /// Remove an edge; returns `false` when absent
    pub fn remove_edge(&mut self, id: &str) -> bool {
        let before = self.edges.len();
        self.edges.retain(|edge| edge.id != id);
        self.edges.len() != before
    }
}
