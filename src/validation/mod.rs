//! Request payload schemas.
//!
//! A payload is first read into a raw struct whose fields are untyped JSON
//! values. The `validator` derive then runs one rule per field (see
//! [`rules`]), checking type and constraints together. Only the first
//! violation is reported, in schema field order, and unknown keys come last.
//! A payload that passes is converted into its typed form with defaults
//! applied.

mod extract;
pub mod rules;

pub use extract::ValidatedJson;

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use crate::error::ValidationError;

pub const DEFAULT_CATEGORY: &str = "General";

/// A field as it is reported in violation messages.
#[derive(Debug, Clone, Copy)]
pub struct Field {
    /// Rust field name
    pub name: &'static str,
    /// JSON key
    pub wire: &'static str,
}

impl Field {
    const fn new(name: &'static str, wire: &'static str) -> Self {
        Self { name, wire }
    }
}

/// Where a payload went wrong, e.g. `"notes[1].content" is not allowed to be empty`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Path from the payload root; empty for the payload itself
    pub path: String,
    pub message: String,
}

impl Violation {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Re-roots the violation under `prefix`, such as `notes[0]`.
    fn under(mut self, prefix: &str) -> Self {
        self.path = if self.path.is_empty() {
            prefix.to_string()
        } else if self.path.starts_with('[') {
            format!("{prefix}{}", self.path)
        } else {
            format!("{prefix}.{}", self.path)
        };
        self
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_empty() {
            "value"
        } else {
            &self.path
        };
        write!(f, "\"{path}\" {}", self.message)
    }
}

impl From<Violation> for ValidationError {
    fn from(violation: Violation) -> Self {
        Self::new(violation.to_string())
    }
}

/// A payload shape that can be checked by [`validate`].
pub trait Schema: Sized {
    /// Untyped view of the payload the field rules run on.
    type Raw: DeserializeOwned + Validate;

    /// Fields in the order their violations are reported.
    const FIELDS: &'static [Field];

    /// Builds the typed payload from a raw one that passed validation.
    ///
    /// # Errors
    ///
    /// Only when `raw` did not actually pass validation.
    fn from_raw(raw: Self::Raw) -> Result<Self, ValidationError>;

    /// Checks run after every field rule passed, for nested payloads.
    fn nested_violation(_raw: &Self::Raw) -> Option<Violation> {
        None
    }
}

/// Keeps an explicit `null` as a value so field rules can reject it.
fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

fn required_text(value: Option<Value>, field: &str) -> Result<String, ValidationError> {
    match value {
        Some(Value::String(text)) => Ok(text),
        _ => Err(Violation::new(field, "is required").into()),
    }
}

fn text_list(value: Option<Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(text) => Some(text),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn flag_or_false(value: Option<&Value>) -> bool {
    value.and_then(rules::parse_flag).unwrap_or(false)
}

/// Full note payload with defaults applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NotePayload {
    /// 1 to 200 characters
    pub title: String,

    /// At least 1 character
    pub content: String,

    /// 1 to 50 characters
    #[serde(default = "default_category")]
    #[schema(default = "General")]
    pub category: String,

    /// Each tag 1 to 50 characters
    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub is_pinned: bool,

    #[serde(default)]
    pub is_archived: bool,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RawNotePayload {
    #[serde(default, deserialize_with = "present")]
    #[validate(required(message = "is required"), custom(function = "rules::title"))]
    pub title: Option<Value>,

    #[serde(default, deserialize_with = "present")]
    #[validate(required(message = "is required"), custom(function = "rules::content"))]
    pub content: Option<Value>,

    #[serde(default, deserialize_with = "present")]
    #[validate(custom(function = "rules::category"))]
    pub category: Option<Value>,

    #[serde(default, deserialize_with = "present")]
    #[validate(custom(function = "rules::tags"))]
    pub tags: Option<Value>,

    #[serde(default, deserialize_with = "present")]
    #[validate(custom(function = "rules::flag"))]
    pub is_pinned: Option<Value>,

    #[serde(default, deserialize_with = "present")]
    #[validate(custom(function = "rules::flag"))]
    pub is_archived: Option<Value>,

    #[serde(flatten)]
    #[validate(custom(function = "rules::no_unknown_keys"))]
    pub unknown: Map<String, Value>,
}

impl Schema for NotePayload {
    type Raw = RawNotePayload;

    const FIELDS: &'static [Field] = &[
        Field::new("title", "title"),
        Field::new("content", "content"),
        Field::new("category", "category"),
        Field::new("tags", "tags"),
        Field::new("is_pinned", "isPinned"),
        Field::new("is_archived", "isArchived"),
        Field::new("unknown", "unknown"),
    ];

    fn from_raw(raw: RawNotePayload) -> Result<Self, ValidationError> {
        let category = match raw.category {
            Some(Value::String(category)) => category,
            _ => default_category(),
        };

        Ok(Self {
            title: required_text(raw.title, "title")?,
            content: required_text(raw.content, "content")?,
            category,
            tags: text_list(raw.tags),
            is_pinned: flag_or_false(raw.is_pinned.as_ref()),
            is_archived: flag_or_false(raw.is_archived.as_ref()),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BulkAction {
    Archive,
    Unarchive,
    Delete,
}

impl BulkAction {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "archive" => Some(Self::Archive),
            "unarchive" => Some(Self::Unarchive),
            "delete" => Some(Self::Delete),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BulkOperationPayload {
    pub action: BulkAction,

    /// At least one non-empty id
    pub note_ids: Vec<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RawBulkOperationPayload {
    #[serde(default, deserialize_with = "present")]
    #[validate(required(message = "is required"), custom(function = "rules::action"))]
    pub action: Option<Value>,

    #[serde(default, deserialize_with = "present")]
    #[validate(required(message = "is required"), custom(function = "rules::note_ids"))]
    pub note_ids: Option<Value>,

    #[serde(flatten)]
    #[validate(custom(function = "rules::no_unknown_keys"))]
    pub unknown: Map<String, Value>,
}

impl Schema for BulkOperationPayload {
    type Raw = RawBulkOperationPayload;

    const FIELDS: &'static [Field] = &[
        Field::new("action", "action"),
        Field::new("note_ids", "noteIds"),
        Field::new("unknown", "unknown"),
    ];

    fn from_raw(raw: RawBulkOperationPayload) -> Result<Self, ValidationError> {
        let action = raw
            .action
            .as_ref()
            .and_then(Value::as_str)
            .and_then(BulkAction::from_name)
            .ok_or_else(|| ValidationError::from(Violation::new("action", "is required")))?;

        Ok(Self {
            action,
            note_ids: text_list(raw.note_ids),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ImportPayload {
    /// At least one note, each a valid note payload
    pub notes: Vec<NotePayload>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct RawImportPayload {
    #[serde(default, deserialize_with = "present")]
    #[validate(required(message = "is required"), custom(function = "rules::notes"))]
    pub notes: Option<Value>,

    #[serde(flatten)]
    #[validate(custom(function = "rules::no_unknown_keys"))]
    pub unknown: Map<String, Value>,
}

impl Schema for ImportPayload {
    type Raw = RawImportPayload;

    const FIELDS: &'static [Field] = &[
        Field::new("notes", "notes"),
        Field::new("unknown", "unknown"),
    ];

    fn from_raw(raw: RawImportPayload) -> Result<Self, ValidationError> {
        let Some(Value::Array(items)) = raw.notes else {
            return Err(Violation::new("notes", "is required").into());
        };

        let notes = items
            .into_iter()
            .map(|item| {
                serde_json::from_value::<RawNotePayload>(item)
                    .map_err(|e| ValidationError::new(e.to_string()))
                    .and_then(NotePayload::from_raw)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { notes })
    }

    fn nested_violation(raw: &RawImportPayload) -> Option<Violation> {
        raw.notes
            .as_ref()?
            .as_array()?
            .iter()
            .enumerate()
            .find_map(|(index, note)| {
                check::<NotePayload>(note.clone())
                    .err()
                    .map(|v| v.under(&format!("notes[{index}]")))
            })
    }
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

/// Runs every check of schema `T` and returns the raw payload if all pass.
fn check<T: Schema>(payload: Value) -> Result<T::Raw, Violation> {
    if !payload.is_object() {
        return Err(Violation::new("", "must be of type object"));
    }

    let raw: T::Raw =
        serde_json::from_value(payload).map_err(|e| Violation::new("", e.to_string()))?;

    if let Err(errors) = raw.validate() {
        return Err(first_violation(&errors, T::FIELDS)
            .unwrap_or_else(|| Violation::new("", errors.to_string())));
    }

    T::nested_violation(&raw).map_or(Ok(raw), Err)
}

/// Checks `payload` against schema `T`, returning the normalized value.
///
/// # Errors
///
/// Returns the first violation found, walking the schema's fields in order.
pub fn validate<T: Schema>(payload: Value) -> Result<T, ValidationError> {
    let raw = check::<T>(payload)?;
    T::from_raw(raw)
}

fn first_violation(errors: &ValidationErrors, fields: &[Field]) -> Option<Violation> {
    let by_field = errors.errors();

    fields.iter().find_map(|field| {
        let kind = by_field
            .get(field.name)
            .or_else(|| by_field.get(field.wire))?;

        match kind {
            ValidationErrorsKind::Field(violations) => {
                violations.first().map(|err| describe(field.wire, err))
            }
            _ => None,
        }
    })
}

fn describe(wire: &str, err: &validator::ValidationError) -> Violation {
    let mut path = err
        .params
        .get("key")
        .and_then(Value::as_str)
        .unwrap_or(wire)
        .to_string();

    if let Some(index) = err.params.get("index").and_then(Value::as_u64) {
        path = format!("{path}[{index}]");
    }

    let message = err.message.as_deref().unwrap_or(&*err.code);
    Violation::new(path, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;
    use serde_json::json;

    fn note_error(payload: Value) -> String {
        validate::<NotePayload>(payload).unwrap_err().message
    }

    fn bulk_error(payload: Value) -> String {
        validate::<BulkOperationPayload>(payload)
            .unwrap_err()
            .message
    }

    #[test]
    fn note_defaults_are_applied() {
        let note: NotePayload = validate(json!({"title": "Groceries", "content": "Milk"})).unwrap();

        assert_eq!(
            note,
            NotePayload {
                title: "Groceries".to_string(),
                content: "Milk".to_string(),
                category: "General".to_string(),
                tags: Vec::new(),
                is_pinned: false,
                is_archived: false,
            }
        );
    }

    #[test]
    fn note_explicit_fields_are_kept() {
        let note: NotePayload = validate(json!({
            "title": "Trip",
            "content": "Pack bags",
            "category": "Travel",
            "tags": ["summer", "beach"],
            "isPinned": true,
            "isArchived": "TRUE"
        }))
        .unwrap();

        assert_eq!(note.category, "Travel");
        assert_eq!(note.tags, vec!["summer", "beach"]);
        assert!(note.is_pinned);
        assert!(note.is_archived);
    }

    #[test]
    fn note_boolean_strings_are_converted() {
        let note: NotePayload = validate(json!({
            "title": "t",
            "content": "c",
            "isPinned": "true",
            "isArchived": "false"
        }))
        .unwrap();

        assert!(note.is_pinned);
        assert!(!note.is_archived);
    }

    #[test]
    fn note_missing_fields_are_required() {
        assert_eq!(note_error(json!({"content": "x"})), "\"title\" is required");
        assert_eq!(note_error(json!({"title": "x"})), "\"content\" is required");
        assert_eq!(note_error(json!({})), "\"title\" is required");
    }

    #[test]
    fn note_empty_title_is_rejected() {
        assert_eq!(
            note_error(json!({"title": "", "content": "x"})),
            "\"title\" is not allowed to be empty"
        );
    }

    #[test]
    fn note_empty_content_is_rejected() {
        assert_eq!(
            note_error(json!({"title": "x", "content": ""})),
            "\"content\" is not allowed to be empty"
        );
    }

    #[test]
    fn note_title_length_is_counted_in_utf16_units() {
        let title = "😀".repeat(100);
        assert!(validate::<NotePayload>(json!({"title": title, "content": "x"})).is_ok());

        let title = "😀".repeat(101);
        assert_eq!(
            note_error(json!({"title": title, "content": "x"})),
            "\"title\" length must be less than or equal to 200 characters long"
        );

        let title = "é".repeat(200);
        assert!(validate::<NotePayload>(json!({"title": title, "content": "x"})).is_ok());
    }

    #[test]
    fn note_first_violation_follows_field_order() {
        let long_category = "c".repeat(51);
        assert_eq!(
            note_error(json!({"title": "", "content": "", "category": long_category})),
            "\"title\" is not allowed to be empty"
        );
        assert_eq!(
            note_error(json!({"title": "ok", "content": "", "category": long_category})),
            "\"content\" is not allowed to be empty"
        );
    }

    #[test]
    fn note_type_errors_do_not_jump_the_field_order() {
        assert_eq!(
            note_error(json!({"title": "", "content": 5})),
            "\"title\" is not allowed to be empty"
        );
        assert_eq!(
            note_error(json!({"title": "t", "content": 5})),
            "\"content\" must be a string"
        );
        assert_eq!(
            note_error(json!({"content": "", "color": "red"})),
            "\"title\" is required"
        );
    }

    #[test]
    fn note_wrong_types_are_named() {
        assert_eq!(
            note_error(json!({"title": null, "content": "x"})),
            "\"title\" must be a string"
        );
        assert_eq!(
            note_error(json!({"title": "t", "content": "c", "isPinned": "yes"})),
            "\"isPinned\" must be a boolean"
        );
        assert_eq!(
            note_error(json!({"title": "t", "content": "c", "tags": "x"})),
            "\"tags\" must be an array"
        );
        assert_eq!(
            note_error(json!({"title": "t", "content": "c", "tags": ["a", 1]})),
            "\"tags[1]\" must be a string"
        );
        assert_eq!(
            note_error(json!("just a string")),
            "\"value\" must be of type object"
        );
    }

    #[test]
    fn note_empty_category_is_rejected() {
        assert_eq!(
            note_error(json!({"title": "t", "content": "c", "category": ""})),
            "\"category\" is not allowed to be empty"
        );
    }

    #[test]
    fn note_long_category_is_rejected() {
        assert_eq!(
            note_error(json!({"title": "t", "content": "c", "category": "c".repeat(51)})),
            "\"category\" length must be less than or equal to 50 characters long"
        );
    }

    #[test]
    fn note_empty_tag_is_rejected() {
        assert_eq!(
            note_error(json!({"title": "t", "content": "c", "tags": ["ok", ""]})),
            "\"tags[1]\" is not allowed to be empty"
        );
    }

    #[test]
    fn note_long_tag_reports_its_index() {
        assert_eq!(
            note_error(json!({"title": "t", "content": "c", "tags": ["ok", "t".repeat(51)]})),
            "\"tags[1]\" length must be less than or equal to 50 characters long"
        );
    }

    #[test]
    fn note_unknown_keys_are_reported_last() {
        assert_eq!(
            note_error(json!({"title": "t", "content": "c", "color": "red"})),
            "\"color\" is not allowed"
        );
    }

    #[test]
    fn bulk_operation_accepts_known_actions() {
        for action in ["archive", "unarchive", "delete"] {
            let payload: BulkOperationPayload =
                validate(json!({"action": action, "noteIds": ["1", "2"]})).unwrap();
            assert_eq!(payload.note_ids, vec!["1", "2"]);
        }

        let payload: BulkOperationPayload =
            validate(json!({"action": "unarchive", "noteIds": ["7"]})).unwrap();
        assert_eq!(payload.action, BulkAction::Unarchive);
    }

    #[test]
    fn bulk_operation_rejects_unknown_action() {
        assert_eq!(
            bulk_error(json!({"action": "pin", "noteIds": ["1"]})),
            "\"action\" must be one of [archive, unarchive, delete]"
        );
    }

    #[test]
    fn bulk_operation_requires_ids() {
        assert_eq!(
            bulk_error(json!({"action": "delete", "noteIds": []})),
            "\"noteIds\" must contain at least 1 items"
        );
        assert_eq!(
            bulk_error(json!({"action": "delete"})),
            "\"noteIds\" is required"
        );
        assert_eq!(
            bulk_error(json!({"action": "delete", "noteIds": [1]})),
            "\"noteIds[0]\" must be a string"
        );
    }

    #[test]
    fn bulk_operation_rejects_empty_ids() {
        assert_eq!(
            bulk_error(json!({"action": "archive", "noteIds": ["1", ""]})),
            "\"noteIds[1]\" is not allowed to be empty"
        );
    }

    #[test]
    fn import_applies_defaults_to_every_note() {
        let payload: ImportPayload = validate(json!({
            "notes": [
                {"title": "a", "content": "1"},
                {"title": "b", "content": "2", "category": "Work"}
            ]
        }))
        .unwrap();

        assert_eq!(payload.notes.len(), 2);
        assert_eq!(payload.notes[0].category, "General");
        assert_eq!(payload.notes[1].category, "Work");
    }

    #[test]
    fn import_requires_notes() {
        let err = validate::<ImportPayload>(json!({"notes": []})).unwrap_err();
        assert_eq!(err.message, "\"notes\" must contain at least 1 items");

        let err = validate::<ImportPayload>(json!({})).unwrap_err();
        assert_eq!(err.message, "\"notes\" is required");
    }

    #[test]
    fn import_reports_first_invalid_note() {
        let err = validate::<ImportPayload>(json!({
            "notes": [
                {"title": "fine", "content": "ok"},
                {"title": "fine", "content": ""},
                {"title": "", "content": "ok"}
            ]
        }))
        .unwrap_err();

        assert_eq!(err.message, "\"notes[1].content\" is not allowed to be empty");
    }

    #[test]
    fn import_rejects_non_object_notes() {
        let err = validate::<ImportPayload>(json!({"notes": ["oops"]})).unwrap_err();
        assert_eq!(err.message, "\"notes[0]\" must be of type object");
    }

    proptest! {
        #[test]
        fn any_valid_note_validates_with_defaults(
            title in "[a-zA-Z0-9 ]{1,200}",
            content in "\\PC{1,300}",
        ) {
            let note: NotePayload =
                validate(json!({"title": title.clone(), "content": content.clone()})).unwrap();

            prop_assert_eq!(note.title, title);
            prop_assert_eq!(note.content, content);
            prop_assert_eq!(note.category, DEFAULT_CATEGORY);
            prop_assert!(note.tags.is_empty());
            prop_assert!(!note.is_pinned);
            prop_assert!(!note.is_archived);
        }

        #[test]
        fn overlong_titles_are_rejected(title in "[a-z]{201,300}") {
            let result = validate::<NotePayload>(json!({"title": title, "content": "x"}));
            prop_assert!(result.is_err());
        }
    }
}
