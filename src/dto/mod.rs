use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use utoipa::ToSchema;

use crate::models::Note;

/// Renders timestamps the way JSON clients expect them: `2026-10-18T09:30:00.123Z`.
pub fn serialize_timestamp<S: Serializer>(
    timestamp: &DateTime<Utc>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&timestamp.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Only called for `Some`; pair with `skip_serializing_if = "Option::is_none"`.
#[allow(clippy::ref_option)]
pub fn serialize_optional_timestamp<S: Serializer>(
    timestamp: &Option<DateTime<Utc>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match timestamp {
        Some(timestamp) => serialize_timestamp(timestamp, serializer),
        None => serializer.serialize_none(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NoteResponse {
    /// Note ID
    pub id: i64,
    /// Note title
    pub title: String,
    /// Note content
    pub content: String,
    /// Creation time (UTC), absent on seeded notes
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_optional_timestamp"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<Note> for NoteResponse {
    fn from(note: Note) -> Self {
        Self {
            id: note.id,
            title: note.title,
            content: note.content,
            created_at: note.created_at,
        }
    }
}

/// Body of the unvalidated create endpoint.
///
/// Fields keep whatever JSON they were sent as. Falsy values (`null`,
/// `false`, `0`, `""`) count as absent; other non-strings are stored as
/// their JSON text.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateNoteRequest {
    /// Note title, `"Untitled"` when absent or falsy
    #[schema(value_type = Option<String>)]
    pub title: Option<Value>,
    /// Note content, empty when absent or falsy
    #[schema(value_type = Option<String>)]
    pub content: Option<Value>,
}

impl CreateNoteRequest {
    /// Picks `title` and `content` out of any JSON body; non-objects carry neither.
    pub fn from_json(body: Value) -> Self {
        match body {
            Value::Object(mut fields) => Self {
                title: fields.remove("title"),
                content: fields.remove("content"),
            },
            _ => Self::default(),
        }
    }

    pub fn title(&self) -> Option<String> {
        truthy_text(self.title.as_ref())
    }

    pub fn content(&self) -> Option<String> {
        truthy_text(self.content.as_ref())
    }
}

fn truthy_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null | Value::Bool(false) => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NoteEnvelope {
    pub success: bool,
    pub data: NoteResponse,
}

impl NoteEnvelope {
    pub const fn new(data: NoteResponse) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NotesListEnvelope {
    pub success: bool,
    pub count: usize,
    pub data: Vec<NoteResponse>,
}

impl NotesListEnvelope {
    pub fn new(data: Vec<NoteResponse>) -> Self {
        Self {
            success: true,
            count: data.len(),
            data,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    /// First violation encountered
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub message: String,
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: DateTime<Utc>,
}
