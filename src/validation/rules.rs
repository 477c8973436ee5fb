//! Per-field checks run by the `validator` derive on the raw payloads.
//!
//! Each rule checks the JSON type first, then the constraints, and stops at
//! the first problem.

use std::borrow::Cow;

use serde_json::{Map, Value};
use validator::ValidationError;

use super::BulkAction;

pub const TITLE_MAX_LEN: usize = 200;
pub const CATEGORY_MAX_LEN: usize = 50;
pub const TAG_MAX_LEN: usize = 50;

fn violation(code: &'static str, message: impl Into<Cow<'static, str>>) -> ValidationError {
    ValidationError::new(code).with_message(message.into())
}

fn at_index(mut err: ValidationError, index: usize) -> ValidationError {
    err.add_param(Cow::Borrowed("index"), &index);
    err
}

/// Length as JavaScript clients count it, in UTF-16 code units.
pub fn text_len(text: &str) -> usize {
    text.encode_utf16().count()
}

/// Booleans, plus `"true"`/`"false"` in any letter case.
pub fn parse_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::String(s) if s.eq_ignore_ascii_case("true") => Some(true),
        Value::String(s) if s.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}

fn non_empty_string(value: &Value, max: Option<usize>) -> Result<(), ValidationError> {
    let Some(text) = value.as_str() else {
        return Err(violation("string.base", "must be a string"));
    };

    let len = text_len(text);
    if len == 0 {
        return Err(violation("string.empty", "is not allowed to be empty"));
    }

    match max {
        Some(max) if len > max => Err(violation(
            "string.max",
            format!("length must be less than or equal to {max} characters long"),
        )),
        _ => Ok(()),
    }
}

fn string_list(value: &Value, max: Option<usize>, min_items: usize) -> Result<(), ValidationError> {
    let Some(items) = value.as_array() else {
        return Err(violation("array.base", "must be an array"));
    };

    for (index, item) in items.iter().enumerate() {
        non_empty_string(item, max).map_err(|e| at_index(e, index))?;
    }

    if items.len() < min_items {
        return Err(violation(
            "array.min",
            format!("must contain at least {min_items} items"),
        ));
    }

    Ok(())
}

pub fn title(value: &Value) -> Result<(), ValidationError> {
    non_empty_string(value, Some(TITLE_MAX_LEN))
}

pub fn content(value: &Value) -> Result<(), ValidationError> {
    non_empty_string(value, None)
}

pub fn category(value: &Value) -> Result<(), ValidationError> {
    non_empty_string(value, Some(CATEGORY_MAX_LEN))
}

pub fn tags(value: &Value) -> Result<(), ValidationError> {
    string_list(value, Some(TAG_MAX_LEN), 0)
}

pub fn flag(value: &Value) -> Result<(), ValidationError> {
    parse_flag(value)
        .map(|_| ())
        .ok_or_else(|| violation("boolean.base", "must be a boolean"))
}

pub fn action(value: &Value) -> Result<(), ValidationError> {
    value
        .as_str()
        .and_then(BulkAction::from_name)
        .map(|_| ())
        .ok_or_else(|| violation("any.only", "must be one of [archive, unarchive, delete]"))
}

pub fn note_ids(value: &Value) -> Result<(), ValidationError> {
    string_list(value, None, 1)
}

/// Only checks the list itself; each note is checked against the note schema afterwards.
pub fn notes(value: &Value) -> Result<(), ValidationError> {
    let Some(items) = value.as_array() else {
        return Err(violation("array.base", "must be an array"));
    };

    if items.is_empty() {
        return Err(violation("array.min", "must contain at least 1 items"));
    }

    Ok(())
}

pub fn no_unknown_keys(extra: &Map<String, Value>) -> Result<(), ValidationError> {
    match extra.keys().next() {
        Some(key) => {
            let mut err = violation("object.unknown", "is not allowed");
            err.add_param(Cow::Borrowed("key"), key);
            Err(err)
        }
        None => Ok(()),
    }
}
