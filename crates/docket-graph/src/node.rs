//! Questionnaire nodes

use serde::{Deserialize, Serialize};

use crate::label::FilingLabel;

/// What a node does in the questionnaire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Entry point; exactly one per graph
    Start,
    /// Groups nodes for presentation
    Section,
    /// Client-facing question
    Question,
    /// Branching question, usually yes/no
    Decision,
    /// Request for uploaded documents
    DocRequest,
    /// Internal work item
    Task,
    /// Attorney approval checkpoint
    ApprovalGate,
    /// Follow-up reminder
    Reminder,
    /// Terminal node
    End,
    /// Free-form annotation
    Note,
}

impl NodeKind {
    /// Every kind, in declaration order
    pub const ALL: [NodeKind; 10] = [
        Self::Start,
        Self::Section,
        Self::Question,
        Self::Decision,
        Self::DocRequest,
        Self::Task,
        Self::ApprovalGate,
        Self::Reminder,
        Self::End,
        Self::Note,
    ];

    /// Structural kinds never consult edges for visibility and never count
    /// towards progress
    #[inline]
    #[must_use]
    pub const fn is_structural(self) -> bool {
        matches!(self, Self::Start | Self::Section | Self::End | Self::Note)
    }

    /// Kinds that collect a client answer and must carry a filing label
    #[inline]
    #[must_use]
    pub const fn is_answerable(self) -> bool {
        matches!(self, Self::Question | Self::DocRequest | Self::Decision)
    }

    /// Kinds counted against the workflow size limit
    #[inline]
    #[must_use]
    pub const fn is_workflow(self) -> bool {
        matches!(
            self,
            Self::Question
                | Self::DocRequest
                | Self::Decision
                | Self::Task
                | Self::ApprovalGate
                | Self::Reminder
        )
    }

    /// Kinds ordered inside a section
    #[inline]
    #[must_use]
    pub const fn is_section_item(self) -> bool {
        self.is_workflow() || matches!(self, Self::Note)
    }

    /// Start and end cannot be removed from a graph
    #[inline]
    #[must_use]
    pub const fn is_protected(self) -> bool {
        matches!(self, Self::Start | Self::End)
    }

    /// Wire identifier
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Section => "section",
            Self::Question => "question",
            Self::Decision => "decision",
            Self::DocRequest => "doc_request",
            Self::Task => "task",
            Self::ApprovalGate => "approval_gate",
            Self::Reminder => "reminder",
            Self::End => "end",
            Self::Note => "note",
        }
    }

    /// Title given to freshly created nodes
    #[must_use]
    pub const fn default_title(self) -> &'static str {
        match self {
            Self::Start => "Start",
            Self::Section => "Section",
            Self::Question => "New question",
            Self::Decision => "Decision",
            Self::DocRequest => "Document request",
            Self::Task => "Task",
            Self::ApprovalGate => "Approval gate",
            Self::Reminder => "Reminder",
            Self::End => "End",
            Self::Note => "Note",
        }
    }

    /// Input type given to freshly created nodes
    #[must_use]
    pub const fn default_input_type(self) -> Option<InputType> {
        match self {
            Self::Question => Some(InputType::Text),
            Self::Decision => Some(InputType::YesNo),
            Self::DocRequest => Some(InputType::FileUpload),
            _ => None,
        }
    }
}

/// How an answerable node collects its value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputType {
    /// Single-line text
    Text,
    /// Multi-line text
    Textarea,
    /// Email address
    Email,
    /// Numeric value
    Number,
    /// Calendar date
    Date,
    /// Yes / No
    YesNo,
    /// One option
    SingleSelect,
    /// Any number of options
    MultiSelect,
    /// Rows x columns matrix
    Grid,
    /// Uploaded files
    FileUpload,
}

/// Option of a choice input, or a grid row/column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    /// Value stored in responses
    pub id: String,
    /// Text shown to the client
    pub label: String,
}

impl ChoiceOption {
    /// Build an option
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// Upload constraints for file inputs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRules {
    /// Minimum number of files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_files: Option<u32>,
    /// Accepted MIME types; empty accepts anything
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_mime: Vec<String>,
    /// Per-file size ceiling
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_size_mb: Option<f64>,
}

/// Canvas position; layout only
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UiPosition {
    /// Horizontal coordinate
    pub x: f64,
    /// Vertical coordinate, used as an ordering fallback
    pub y: f64,
}

/// A vertex of the questionnaire graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Unique within the graph
    pub id: String,
    /// Node kind
    pub kind: NodeKind,
    /// Title shown to the client
    #[serde(default)]
    pub title: String,
    /// Help text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    /// Why-we-ask explanation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub why_we_ask: Option<String>,
    /// Input placeholder
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Whether clients may ever see this node
    #[serde(default)]
    pub client_visible: bool,
    /// Filing categories this node feeds
    #[serde(default)]
    pub labels: Vec<FilingLabel>,
    /// Free-form firm tags
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_tags: Vec<String>,
    /// Input type for answerable kinds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_type: Option<InputType>,
    /// Must be answered or skipped
    #[serde(default)]
    pub required: bool,
    /// Unanswered blocks the workflow
    #[serde(default)]
    pub blocks_workflow: bool,
    /// Choice options
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<ChoiceOption>,
    /// Grid rows
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rows: Vec<ChoiceOption>,
    /// Grid columns
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<ChoiceOption>,
    /// Upload constraints
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_rules: Option<FileRules>,
    /// Section this node is grouped under
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_id: Option<String>,
    /// Stable ordering within a section
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
    /// Stable ordering among sections
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_order: Option<u32>,
    /// Step of the flat legacy intake this node mirrors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy_step_id: Option<String>,
    /// Field of the flat legacy intake this node mirrors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy_field_id: Option<String>,
    /// Canvas position
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui: Option<UiPosition>,
}

impl Node {
    /// Create a node with the per-kind defaults
    pub fn new(kind: NodeKind, id: impl Into<String>) -> Self {
        let answerable = kind.is_answerable();
        Self {
            id: id.into(),
            kind,
            title: kind.default_title().to_owned(),
            help_text: None,
            why_we_ask: None,
            placeholder: None,
            client_visible: !matches!(kind, NodeKind::Start | NodeKind::End | NodeKind::Note),
            labels: if answerable {
                vec![FilingLabel::Other]
            } else {
                Vec::new()
            },
            custom_tags: Vec::new(),
            input_type: kind.default_input_type(),
            required: answerable,
            blocks_workflow: false,
            options: Vec::new(),
            rows: Vec::new(),
            columns: Vec::new(),
            file_rules: None,
            section_id: None,
            order: None,
            section_order: None,
            legacy_step_id: None,
            legacy_field_id: None,
            ui: None,
        }
    }

    /// Set the title
    #[inline]
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Replace the filing labels
    #[inline]
    #[must_use]
    pub fn with_labels(mut self, labels: impl IntoIterator<Item = FilingLabel>) -> Self {
        self.labels = labels.into_iter().collect();
        self
    }

    /// Set or clear the input type
    #[inline]
    #[must_use]
    pub fn with_input_type(mut self, input_type: Option<InputType>) -> Self {
        self.input_type = input_type;
        self
    }

    /// Set client visibility
    #[inline]
    #[must_use]
    pub fn with_client_visible(mut self, visible: bool) -> Self {
        self.client_visible = visible;
        self
    }

    /// Set the required flag
    #[inline]
    #[must_use]
    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Set the blocks-workflow flag
    #[inline]
    #[must_use]
    pub fn with_blocks_workflow(mut self, blocks: bool) -> Self {
        self.blocks_workflow = blocks;
        self
    }

    /// Group under a section
    #[inline]
    #[must_use]
    pub fn with_section(mut self, section_id: impl Into<String>) -> Self {
        self.section_id = Some(section_id.into());
        self
    }

    /// Set the in-section order
    #[inline]
    #[must_use]
    pub fn with_order(mut self, order: u32) -> Self {
        self.order = Some(order);
        self
    }

    /// Set the canvas position
    #[inline]
    #[must_use]
    pub fn with_ui(mut self, x: f64, y: f64) -> Self {
        self.ui = Some(UiPosition { x, y });
        self
    }

    /// Mirror a legacy intake step
    #[inline]
    #[must_use]
    pub fn with_legacy_step(mut self, step_id: impl Into<String>) -> Self {
        self.legacy_step_id = Some(step_id.into());
        self
    }

    /// Mirror a legacy intake field
    #[inline]
    #[must_use]
    pub fn with_legacy_field(
        mut self,
        step_id: impl Into<String>,
        field_id: impl Into<String>,
    ) -> Self {
        self.legacy_step_id = Some(step_id.into());
        self.legacy_field_id = Some(field_id.into());
        self
    }

    /// Replace the choice options
    #[inline]
    #[must_use]
    pub fn with_options(mut self, options: impl IntoIterator<Item = ChoiceOption>) -> Self {
        self.options = options.into_iter().collect();
        self
    }

    /// Sort key inside a section: `order`, then canvas y, then 0
    #[must_use]
    pub fn item_sort_key(&self) -> f64 {
        self.order
            .map(f64::from)
            .or_else(|| self.ui.map(|ui| ui.y))
            .unwrap_or(0.0)
    }

    /// Sort key among sections: `section_order`, then `order`, then canvas y
    #[must_use]
    pub fn section_sort_key(&self) -> f64 {
        self.section_order
            .or(self.order)
            .map(f64::from)
            .or_else(|| self.ui.map(|ui| ui.y))
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_question_defaults() {
        let node = Node::new(NodeKind::Question, "q1");
        assert_eq!(node.title, "New question");
        assert_eq!(node.labels, vec![FilingLabel::Other]);
        assert_eq!(node.input_type, Some(InputType::Text));
        assert!(node.required);
        assert!(node.client_visible);
    }

    #[test]
    fn test_structural_defaults() {
        let start = Node::new(NodeKind::Start, "s");
        assert!(!start.client_visible);
        assert!(start.labels.is_empty());
        assert_eq!(start.input_type, None);

        let section = Node::new(NodeKind::Section, "sec");
        assert!(section.client_visible);
        assert!(!section.required);
    }

    #[test]
    fn test_sort_key_fallbacks() {
        let node = Node::new(NodeKind::Question, "q").with_ui(0.0, 250.0);
        assert!((node.item_sort_key() - 250.0).abs() < f64::EPSILON);
        let node = node.with_order(2000);
        assert!((node.item_sort_key() - 2000.0).abs() < f64::EPSILON);

        let mut section = Node::new(NodeKind::Section, "sec").with_order(5);
        assert!((section.section_sort_key() - 5.0).abs() < f64::EPSILON);
        section.section_order = Some(1000);
        assert!((section.section_sort_key() - 1000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_camel_case_wire_format() {
        let node = Node::new(NodeKind::DocRequest, "doc")
            .with_legacy_field("debts", "debt_docs")
            .with_section("sec-debts");
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["kind"], "doc_request");
        assert_eq!(json["inputType"], "file_upload");
        assert_eq!(json["legacyFieldId"], "debt_docs");
        assert_eq!(json["sectionId"], "sec-debts");
        assert_eq!(json["clientVisible"], true);
    }
}
