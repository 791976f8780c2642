//! Task domain model.
//!
//! # Responsibility
//! - Define the canonical task record and its JSON representation.
//! - Define full (`TaskParams`) and sparse (`TaskPatch`) write inputs.
//!
//! # Invariants
//! - `id` and `created_at` are assigned by storage and never change.
//! - `title` is non-empty for every task that passed validation.
//! - A `TaskPatch` tracks presence per field; `Unset` and `Set(None)` differ.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Storage-assigned task identifier.
pub type TaskId = i64;

/// A persisted task as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    /// Serialized as RFC 3339 in UTC.
    pub created_at: DateTime<Utc>,
}

/// Validated input for create and full replace.
///
/// Fields the caller omitted already hold their defaults here, so a replace
/// always writes all three mutable columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskParams {
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
}

impl TaskParams {
    /// Builds params with `description = None` and `completed = false`.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            completed: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }
}

/// Presence-tracking slot for one field of a partial update.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldUpdate<T> {
    /// Field absent from the input; the stored value is kept.
    #[default]
    Unset,
    /// Field present in the input; the stored value is overwritten.
    Set(T),
}

impl<T> FieldUpdate<T> {
    pub fn is_set(&self) -> bool {
        matches!(self, Self::Set(_))
    }

    pub fn as_set(&self) -> Option<&T> {
        match self {
            Self::Set(value) => Some(value),
            Self::Unset => None,
        }
    }
}

/// Validated input for partial update.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskPatch {
    pub title: FieldUpdate<String>,
    /// `Set(None)` clears the description.
    pub description: FieldUpdate<Option<String>>,
    pub completed: FieldUpdate<bool>,
}

impl TaskPatch {
    /// Returns true when no field was present in the input.
    pub fn is_empty(&self) -> bool {
        !self.title.is_set() && !self.description.is_set() && !self.completed.is_set()
    }

    /// Names of the fields that will be written, in column order.
    pub fn set_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.title.is_set() {
            fields.push("title");
        }
        if self.description.is_set() {
            fields.push("description");
        }
        if self.completed.is_set() {
            fields.push("completed");
        }
        fields
    }
}
