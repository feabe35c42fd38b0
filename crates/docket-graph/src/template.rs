//! Questionnaire templates and their append-only version history.
//!
//! A template owns an ordered list of versions and points at one of them as
//! active. Versions are only ever appended; once a version carries a
//! `published_at` stamp its graph is frozen. Edits made while the active
//! version is published land in a fresh draft appended to the history.

use serde::{Deserialize, Serialize};

use crate::clock::Timestamp;
use crate::graph::Graph;

/// Template family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    /// Guided intake questionnaire
    Intake,
    /// Attorney-authored questionnaire
    Custom,
}

/// Who created a template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreatedBy {
    /// Shipped with the product
    System,
    /// Created by the firm
    Attorney,
}

/// Who published a version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Publisher {
    /// An attorney
    Attorney,
    /// Firm staff
    Staff,
    /// Automated seeding
    System,
}

/// One entry in a template's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateVersion {
    version: u32,
    graph: Graph,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    published_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    published_by: Option<Publisher>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
}

impl TemplateVersion {
    /// Editable draft
    #[must_use]
    pub fn draft(version: u32, graph: Graph) -> Self {
        Self {
            version,
            graph,
            published_at: None,
            published_by: None,
            notes: None,
        }
    }

    /// Frozen, published snapshot
    #[must_use]
    pub fn published(
        version: u32,
        graph: Graph,
        by: Publisher,
        at: Timestamp,
        notes: Option<String>,
    ) -> Self {
        Self {
            version,
            graph,
            published_at: Some(at),
            published_by: Some(by),
            notes,
        }
    }

    /// Version number
    #[inline]
    #[must_use]
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Graph of this version
    #[inline]
    #[must_use]
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Publication time
    #[inline]
    #[must_use]
    pub fn published_at(&self) -> Option<Timestamp> {
        self.published_at
    }

    /// Publisher
    #[inline]
    #[must_use]
    pub fn published_by(&self) -> Option<Publisher> {
        self.published_by
    }

    /// Release notes
    #[must_use]
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    /// Published versions are immutable
    #[inline]
    #[must_use]
    pub fn is_published(&self) -> bool {
        self.published_at.is_some()
    }
}

/// Where a graph edit landed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphEdit {
    /// The active draft was replaced
    InPlace {
        /// Edited version
        version: u32,
    },
    /// The active version was published; a new draft was appended and activated
    Bumped {
        /// Previously active, published version
        from: u32,
        /// Newly appended draft
        to: u32,
    },
    /// The active pointer names no version; nothing was written
    Unresolved {
        /// Dangling active version number
        active: u32,
    },
}

impl GraphEdit {
    /// Version now holding the edited graph
    #[must_use]
    pub fn version(self) -> Option<u32> {
        match self {
            Self::InPlace { version } | Self::Bumped { to: version, .. } => Some(version),
            Self::Unresolved { .. } => None,
        }
    }
}

fn default_scope() -> String {
    "firm".to_owned()
}

/// A questionnaire definition with version history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    /// Unique id
    pub id: String,
    /// Title, unique among attorney templates
    pub title: String,
    /// Description
    #[serde(default)]
    pub description: String,
    /// Visibility scope
    #[serde(default = "default_scope")]
    pub scope: String,
    /// Family
    pub kind: TemplateKind,
    /// Shipped default; cannot be archived
    #[serde(default)]
    pub is_default: bool,
    /// Origin
    pub created_by: CreatedBy,
    /// Creation time
    pub created_at: Timestamp,
    /// Last modification
    pub updated_at: Timestamp,
    /// Active version number
    active_version: u32,
    /// Append-only history
    versions: Vec<TemplateVersion>,
    /// Hidden from listings
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub archived: bool,
}

impl Template {
    /// New template whose history starts with `initial`, which becomes active
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        kind: TemplateKind,
        created_by: CreatedBy,
        initial: TemplateVersion,
        now: Timestamp,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            scope: default_scope(),
            kind,
            is_default: false,
            created_by,
            created_at: now,
            updated_at: now,
            active_version: initial.version,
            versions: vec![initial],
            archived: false,
        }
    }

    /// Set the description
    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Mark as the shipped default
    #[inline]
    #[must_use]
    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }

    /// Active version number
    #[inline]
    #[must_use]
    pub fn active_version(&self) -> u32 {
        self.active_version
    }

    /// Full history, in append order
    #[must_use]
    pub fn versions(&self) -> &[TemplateVersion] {
        &self.versions
    }

    /// Look up a version by number
    #[must_use]
    pub fn version(&self, number: u32) -> Option<&TemplateVersion> {
        self.versions.iter().find(|v| v.version == number)
    }

    /// The active version, if the pointer resolves
    #[must_use]
    pub fn active(&self) -> Option<&TemplateVersion> {
        self.version(self.active_version)
    }

    /// Graph of the active version
    #[must_use]
    pub fn active_graph(&self) -> Option<&Graph> {
        self.active().map(TemplateVersion::graph)
    }

    /// Highest version number in the history
    #[must_use]
    pub fn latest_version_number(&self) -> u32 {
        self.versions.iter().map(|v| v.version).max().unwrap_or(0)
    }

    /// Shipped or default templates are copied before editing
    #[must_use]
    pub fn is_system_owned(&self) -> bool {
        self.is_default || self.created_by == CreatedBy::System
    }

    /// Point at an existing version; returns `false` when it does not exist
    pub fn activate(&mut self, number: u32) -> bool {
        if self.version(number).is_none() {
            return false;
        }
        self.active_version = number;
        true
    }

    /// Replace the active graph with copy-on-write semantics.
    ///
    /// A draft is edited in place. A published active version is left
    /// untouched and a new draft numbered one past the latest is appended and
    /// activated. A dangling active pointer leaves the template as it was.
    pub fn apply_graph_edit(&mut self, graph: Graph, now: Timestamp) -> GraphEdit {
        let active = self.active_version;
        let Some(current) = self.versions.iter_mut().find(|v| v.version == active) else {
            return GraphEdit::Unresolved { active };
        };
        self.updated_at = now;
        if !current.is_published() {
            current.graph = graph;
            return GraphEdit::InPlace { version: active };
        }
        let next = self.latest_version_number() + 1;
        self.versions.push(TemplateVersion::draft(next, graph));
        self.active_version = next;
        GraphEdit::Bumped {
            from: active,
            to: next,
        }
    }

    /// Append a published snapshot of the active graph and activate it.
    ///
    /// Returns the new version number, or `None` when the active pointer
    /// does not resolve.
    pub fn publish_active(
        &mut self,
        by: Publisher,
        notes: Option<String>,
        now: Timestamp,
    ) -> Option<u32> {
        let graph = self.active_graph()?.clone();
        let next = self.latest_version_number() + 1;
        self.versions
            .push(TemplateVersion::published(next, graph, by, now, notes));
        self.active_version = next;
        self.updated_at = now;
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Node, NodeKind};
    use chrono::{TimeZone, Utc};

    fn at(hour: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2026, 2, 1, hour, 0, 0).unwrap()
    }

    fn graph_with(title: &str) -> Graph {
        Graph::from_parts(
            vec![Node::new(NodeKind::Question, "q").with_title(title)],
            Vec::new(),
        )
    }

    fn template(initial: TemplateVersion) -> Template {
        Template::new(
            "tpl-1",
            "Demo",
            TemplateKind::Custom,
            CreatedBy::Attorney,
            initial,
            at(0),
        )
    }

    #[test]
    fn test_draft_edit_is_in_place() {
        let mut tpl = template(TemplateVersion::draft(1, graph_with("a")));
        let edit = tpl.apply_graph_edit(graph_with("b"), at(1));
        assert_eq!(edit, GraphEdit::InPlace { version: 1 });
        assert_eq!(tpl.versions().len(), 1);
        assert_eq!(tpl.active_graph().unwrap().nodes[0].title, "b");
        assert_eq!(tpl.updated_at, at(1));
    }

    #[test]
    fn test_published_edit_appends_draft() {
        let original = graph_with("a");
        let mut tpl = template(TemplateVersion::published(
            1,
            original.clone(),
            Publisher::System,
            at(0),
            None,
        ));
        let edit = tpl.apply_graph_edit(graph_with("b"), at(1));
        assert_eq!(edit, GraphEdit::Bumped { from: 1, to: 2 });
        assert_eq!(tpl.active_version(), 2);
        assert_eq!(tpl.version(1).unwrap().graph(), &original);
        assert!(!tpl.active().unwrap().is_published());
    }

    #[test]
    fn test_dangling_active_version_leaves_template_unchanged() {
        let mut tpl = template(TemplateVersion::draft(1, graph_with("a")));
        tpl.active_version = 7;
        let before = tpl.clone();
        let edit = tpl.apply_graph_edit(graph_with("b"), at(1));
        assert_eq!(edit, GraphEdit::Unresolved { active: 7 });
        assert_eq!(edit.version(), None);
        assert_eq!(tpl, before);
    }

    #[test]
    fn test_publish_appends_snapshot() {
        let mut tpl = template(TemplateVersion::draft(1, graph_with("a")));
        let published = tpl.publish_active(Publisher::Attorney, Some("v2".into()), at(2));
        assert_eq!(published, Some(2));
        let active = tpl.active().unwrap();
        assert!(active.is_published());
        assert_eq!(active.notes(), Some("v2"));
        assert!(!tpl.version(1).unwrap().is_published());
    }

    #[test]
    fn test_dangling_active_pointer() {
        let mut tpl = template(TemplateVersion::draft(1, graph_with("a")));
        assert!(!tpl.activate(9));
        assert_eq!(tpl.active_version(), 1);
    }
}
