//! Node responses and the typed response value union

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::clock::Timestamp;

/// Metadata of one uploaded file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseFile {
    /// Unique file id
    pub id: String,
    /// Original file name
    pub name: String,
    /// Upload time; missing or unparseable times load as `None`
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub uploaded_at: Option<Timestamp>,
    /// MIME type, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Size in bytes, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    /// Key of the stored blob
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blob_key: Option<String>,
}

impl ResponseFile {
    /// File with only the required metadata
    pub fn new(id: impl Into<String>, name: impl Into<String>, uploaded_at: Timestamp) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            uploaded_at: Some(uploaded_at),
            mime_type: None,
            size_bytes: None,
            blob_key: None,
        }
    }
}

/// `{ "files": [...] }` payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilesPayload {
    /// Uploaded files
    pub files: Vec<ResponseFile>,
}

/// Value of a response.
///
/// Untagged on the wire; variant order decides how ambiguous JSON is read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseValue {
    /// Free text, also single choices and textual yes/no
    Text(String),
    /// Number
    Number(f64),
    /// Boolean
    Bool(bool),
    /// Multi-choice selection
    List(Vec<String>),
    /// Uploaded files
    Files(FilesPayload),
    /// Grid answers keyed by row id
    Record(BTreeMap<String, String>),
}

impl ResponseValue {
    /// Text value
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Files value
    #[must_use]
    pub fn files(files: Vec<ResponseFile>) -> Self {
        Self::Files(FilesPayload { files })
    }

    /// Whether the value counts as an answer: non-empty trimmed text, any
    /// number or boolean, a non-empty list, file list or record
    #[must_use]
    pub fn is_meaningful(&self) -> bool {
        match self {
            Self::Text(text) => !text.trim().is_empty(),
            Self::Number(_) | Self::Bool(_) => true,
            Self::List(items) => !items.is_empty(),
            Self::Files(payload) => !payload.files.is_empty(),
            Self::Record(entries) => !entries.is_empty(),
        }
    }

    /// Boolean true or the text "yes" (trimmed, any case)
    #[must_use]
    pub fn is_yes(&self) -> bool {
        match self {
            Self::Bool(value) => *value,
            Self::Text(text) => text.trim().eq_ignore_ascii_case("yes"),
            _ => false,
        }
    }

    /// Boolean false or the text "no" (trimmed, any case)
    #[must_use]
    pub fn is_no(&self) -> bool {
        match self {
            Self::Bool(value) => !*value,
            Self::Text(text) => text.trim().eq_ignore_ascii_case("no"),
            _ => false,
        }
    }

    /// Uploaded files; empty for every other variant
    #[must_use]
    pub fn file_list(&self) -> &[ResponseFile] {
        match self {
            Self::Files(payload) => &payload.files,
            _ => &[],
        }
    }
}

/// Who skipped a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkipActor {
    /// The client
    Client,
    /// The attorney
    Attorney,
}

/// Explicit skip of a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkipRecord {
    /// Why the node was skipped
    #[serde(default)]
    pub reason: String,
    /// Who skipped it
    pub by: SkipActor,
    /// When
    pub at: Timestamp,
}

/// Answer to one node of one assignment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeResponse {
    /// Owning assignment
    pub assignment_id: String,
    /// Answered node
    pub node_id: String,
    /// Value; unreadable persisted values load as `None`
    #[serde(
        default,
        deserialize_with = "lenient_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<ResponseValue>,
    /// Skip record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skipped: Option<SkipRecord>,
    /// Last write
    pub updated_at: Timestamp,
}

impl NodeResponse {
    /// Response carrying a value
    pub fn answered(
        assignment_id: impl Into<String>,
        node_id: impl Into<String>,
        value: ResponseValue,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            assignment_id: assignment_id.into(),
            node_id: node_id.into(),
            value: Some(value),
            skipped: None,
            updated_at,
        }
    }

    /// Response carrying a skip record
    pub fn skipped(
        assignment_id: impl Into<String>,
        node_id: impl Into<String>,
        skip: SkipRecord,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            assignment_id: assignment_id.into(),
            node_id: node_id.into(),
            value: None,
            skipped: Some(skip),
            updated_at,
        }
    }

    /// Carries a meaningful value
    #[must_use]
    pub fn has_meaningful_value(&self) -> bool {
        self.value.as_ref().is_some_and(ResponseValue::is_meaningful)
    }

    /// Counts as completed: a meaningful value or an explicit skip
    #[must_use]
    pub fn is_answered(&self) -> bool {
        self.skipped.is_some() || self.has_meaningful_value()
    }
}

fn lenient_value<'de, D>(deserializer: D) -> Result<Option<ResponseValue>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| serde_json::from_value(value).ok()))
}

/// RFC 3339 first, then a bare `YYYY-MM-DD` read as midnight UTC.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<Timestamp>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    let Some(serde_json::Value::String(text)) = raw else {
        return Ok(None);
    };
    let parsed = DateTime::parse_from_rfc3339(text.trim())
        .map(|at| at.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
                .ok()
                .and_then(|day| day.and_hms_opt(0, 0, 0))
                .map(|midnight| midnight.and_utc())
        });
    Ok(parsed)
}

/// Responses of one assignment keyed by node id
pub type ResponsesByNode<'a> = HashMap<&'a str, &'a NodeResponse>;

/// Index responses by node id; later entries win
pub fn index_responses<'a, I>(responses: I) -> ResponsesByNode<'a>
where
    I: IntoIterator<Item = &'a NodeResponse>,
{
    responses
        .into_iter()
        .map(|response| (response.node_id.as_str(), response))
        .collect()
}

/// Index the responses belonging to `assignment_id`
#[must_use]
pub fn index_assignment_responses<'a>(
    responses: &'a [NodeResponse],
    assignment_id: &str,
) -> ResponsesByNode<'a> {
    index_responses(
        responses
            .iter()
            .filter(|response| response.assignment_id == assignment_id),
    )
}

/// Append files to a value, dropping incoming ids that already exist
#[must_use]
pub fn with_appended_files(value: Option<&ResponseValue>, incoming: &[ResponseFile]) -> ResponseValue {
    let mut files: Vec<ResponseFile> = Vec::new();
    let existing = value.map(ResponseValue::file_list).unwrap_or_default();
    for file in existing.iter().chain(incoming) {
        if file.id.is_empty() || files.iter().any(|kept| kept.id == file.id) {
            continue;
        }
        files.push(file.clone());
    }
    ResponseValue::files(files)
}

/// Remove files by id. Removing the last file leaves no value; values without
/// files, or an empty id set, come back unchanged.
#[must_use]
pub fn remove_files_by_id(value: Option<ResponseValue>, file_ids: &[&str]) -> Option<ResponseValue> {
    let existing = value.as_ref().map(ResponseValue::file_list).unwrap_or_default();
    let removing: Vec<&str> = file_ids.iter().copied().filter(|id| !id.is_empty()).collect();
    if existing.is_empty() || removing.is_empty() {
        return value;
    }
    let remaining: Vec<ResponseFile> = existing
        .iter()
        .filter(|file| !removing.contains(&file.id.as_str()))
        .cloned()
        .collect();
    if remaining.is_empty() {
        None
    } else {
        Some(ResponseValue::files(remaining))
    }
}

/// Outcome of [`move_file_between_values`]
#[derive(Debug, Clone, PartialEq)]
pub struct FileMove {
    /// Source value after the move
    pub from: Option<ResponseValue>,
    /// Target value after the move
    pub to: Option<ResponseValue>,
    /// The moved file; `None` when the source did not hold it
    pub moved: Option<ResponseFile>,
}

/// Move one file from one value to another
#[must_use]
pub fn move_file_between_values(
    from: Option<ResponseValue>,
    to: Option<ResponseValue>,
    file_id: &str,
) -> FileMove {
    let moved = from
        .as_ref()
        .and_then(|value| value.file_list().iter().find(|file| file.id == file_id))
        .cloned();
    match moved {
        Some(file) => FileMove {
            to: Some(with_appended_files(to.as_ref(), std::slice::from_ref(&file))),
            from: remove_files_by_id(from, &[file_id]),
            moved: Some(file),
        },
        None => FileMove {
            from,
            to,
            moved: None,
        },
    }
}
