//! Request input validation.
//!
//! # Responsibility
//! - Turn untrusted request bodies, path segments and query values into
//!   typed task inputs.
//! - Report every offending field at once, each with its location.
//!
//! # Invariants
//! - Validation has no side effects and never touches storage.
//! - JSON types are checked strictly: a number is neither a string nor a boolean.
//! - Unknown body fields are ignored.

use crate::model::task::{FieldUpdate, TaskId, TaskParams, TaskPatch};
use serde::Serialize;
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

const MSG_MISSING: &str = "Field required";
const MSG_STRING_TYPE: &str = "Input should be a valid string";
const MSG_STRING_TOO_SHORT: &str = "String should have at least 1 character";
const MSG_BOOL_TYPE: &str = "Input should be a valid boolean";
const MSG_BOOL_PARSING: &str = "Input should be a valid boolean, unable to interpret input";
const MSG_INT_PARSING: &str =
    "Input should be a valid integer, unable to parse string as an integer";
const MSG_OBJECT_TYPE: &str = "Input should be a valid dictionary or object to extract fields from";
const MSG_JSON_INVALID: &str = "JSON decode error";

/// One offending input field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    /// Machine-readable error kind, e.g. `missing` or `bool_type`.
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Location path, e.g. `["body", "title"]`.
    pub loc: Vec<String>,
    pub msg: String,
    /// Offending input, omitted when the field was absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
}

impl FieldError {
    fn new(kind: &'static str, loc: &[&str], msg: &str, input: Option<&Value>) -> Self {
        Self {
            kind,
            loc: loc.iter().map(|segment| segment.to_string()).collect(),
            msg: msg.to_string(),
            input: input.cloned(),
        }
    }

    /// Last location segment, usually the field name.
    pub fn field(&self) -> Option<&str> {
        self.loc.last().map(String::as_str)
    }
}

/// Input rejected before reaching storage.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    fn single(error: FieldError) -> Self {
        Self {
            errors: vec![error],
        }
    }

    /// Returns true when any error points at `field`.
    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|error| error.field() == Some(field))
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} validation error(s):", self.errors.len())?;
        for error in &self.errors {
            write!(f, " [{}] {} ({});", error.loc.join("."), error.msg, error.kind)?;
        }
        Ok(())
    }
}

impl Error for ValidationError {}

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Decodes a raw request body into JSON.
///
/// # Errors
/// - `missing` at `["body"]` for an empty body.
/// - `json_invalid` at `["body"]` for malformed JSON.
pub fn decode_body(bytes: &[u8]) -> ValidationResult<Value> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(ValidationError::single(FieldError::new(
            "missing",
            &["body"],
            MSG_MISSING,
            None,
        )));
    }

    serde_json::from_slice(bytes).map_err(|err| {
        ValidationError::single(FieldError {
            kind: "json_invalid",
            loc: vec!["body".to_string()],
            msg: MSG_JSON_INVALID.to_string(),
            input: Some(Value::String(err.to_string())),
        })
    })
}

/// Validates full parameters used by create and replace.
///
/// `title` is required and non-empty; `description` defaults to null and
/// `completed` to false.
pub fn parse_full_params(body: &Value) -> ValidationResult<TaskParams> {
    let object = body_object(body)?;
    let mut errors = Vec::new();

    let title = match object.get("title") {
        None => {
            errors.push(FieldError::new(
                "missing",
                &["body", "title"],
                MSG_MISSING,
                None,
            ));
            None
        }
        Some(value) => check_title(value, &mut errors),
    };
    let description = match object.get("description") {
        None => Some(None),
        Some(value) => check_description(value, &mut errors),
    };
    let completed = match object.get("completed") {
        None => Some(false),
        Some(value) => check_completed(value, &mut errors),
    };

    match (title, description, completed) {
        (Some(title), Some(description), Some(completed)) if errors.is_empty() => {
            Ok(TaskParams {
                title,
                description,
                completed,
            })
        }
        _ => Err(ValidationError { errors }),
    }
}

/// Validates partial parameters used by partial update.
///
/// Only keys present in the object become `FieldUpdate::Set`.
pub fn parse_partial_params(body: &Value) -> ValidationResult<TaskPatch> {
    let object = body_object(body)?;
    let mut errors = Vec::new();
    let mut patch = TaskPatch::default();

    if let Some(value) = object.get("title") {
        if let Some(title) = check_title(value, &mut errors) {
            patch.title = FieldUpdate::Set(title);
        }
    }
    if let Some(value) = object.get("description") {
        if let Some(description) = check_description(value, &mut errors) {
            patch.description = FieldUpdate::Set(description);
        }
    }
    if let Some(value) = object.get("completed") {
        if let Some(completed) = check_completed(value, &mut errors) {
            patch.completed = FieldUpdate::Set(completed);
        }
    }

    if errors.is_empty() {
        Ok(patch)
    } else {
        Err(ValidationError { errors })
    }
}

/// Parses the optional `completed` list filter from a query string value.
pub fn parse_completed_filter(raw: Option<&str>) -> ValidationResult<Option<bool>> {
    let Some(raw) = raw else {
        return Ok(None);
    };

    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" | "t" | "y" => Ok(Some(true)),
        "false" | "0" | "no" | "off" | "f" | "n" => Ok(Some(false)),
        _ => Err(ValidationError::single(FieldError::new(
            "bool_parsing",
            &["query", "completed"],
            MSG_BOOL_PARSING,
            Some(&Value::String(raw.to_string())),
        ))),
    }
}

/// Parses a task id path segment.
pub fn parse_task_id(raw: &str) -> ValidationResult<TaskId> {
    raw.parse::<TaskId>().map_err(|_| {
        ValidationError::single(FieldError::new(
            "int_parsing",
            &["path", "task_id"],
            MSG_INT_PARSING,
            Some(&Value::String(raw.to_string())),
        ))
    })
}

fn body_object(body: &Value) -> ValidationResult<&Map<String, Value>> {
    body.as_object().ok_or_else(|| {
        ValidationError::single(FieldError::new(
            "model_attributes_type",
            &["body"],
            MSG_OBJECT_TYPE,
            Some(body),
        ))
    })
}

fn check_title(value: &Value, errors: &mut Vec<FieldError>) -> Option<String> {
    match value {
        Value::String(title) if title.is_empty() => {
            errors.push(FieldError::new(
                "string_too_short",
                &["body", "title"],
                MSG_STRING_TOO_SHORT,
                Some(value),
            ));
            None
        }
        Value::String(title) => Some(title.clone()),
        _ => {
            errors.push(FieldError::new(
                "string_type",
                &["body", "title"],
                MSG_STRING_TYPE,
                Some(value),
            ));
            None
        }
    }
}

fn check_description(value: &Value, errors: &mut Vec<FieldError>) -> Option<Option<String>> {
    match value {
        Value::Null => Some(None),
        Value::String(description) => Some(Some(description.clone())),
        _ => {
            errors.push(FieldError::new(
                "string_type",
                &["body", "description"],
                MSG_STRING_TYPE,
                Some(value),
            ));
            None
        }
    }
}

fn check_completed(value: &Value, errors: &mut Vec<FieldError>) -> Option<bool> {
    match value {
        Value::Bool(completed) => Some(*completed),
        _ => {
            errors.push(FieldError::new(
                "bool_type",
                &["body", "completed"],
                MSG_BOOL_TYPE,
                Some(value),
            ));
            None
        }
    }
}
