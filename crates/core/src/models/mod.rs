//! Domain models for the task list.
//!
//! These models are storage-agnostic and represent the canonical form of a
//! task within the domain layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult, ExtensionError};
use crate::pagination::{FieldValue, FilterExtension, Node, Predicate, Selection};

/// Longest accepted task name, in characters.
pub const MAX_NAME_LEN: usize = 255;

// =============================================================================
// Task
// =============================================================================

/// A stored task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique, strictly increasing identifier. Also the default cursor key.
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub done: bool,
    pub created_at: DateTime<Utc>,
}

impl Node for Task {
    const FIELDS: &'static [&'static str] =
        &["id", "name", "description", "due_date", "done", "created_at"];

    fn field(&self, name: &str) -> Option<FieldValue> {
        Some(match name {
            "id" => self.id.into(),
            "name" => self.name.as_str().into(),
            "description" => self.description.clone().into(),
            "due_date" => self.due_date.into(),
            "done" => self.done.into(),
            "created_at" => self.created_at.into(),
            _ => return None,
        })
    }
}

// =============================================================================
// Create / Update
// =============================================================================

/// Fields supplied when creating a task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewTask {
    pub name: String,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub done: bool,
}

impl NewTask {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        validate_name(&self.name)
    }

    /// Materialize the task under an assigned id.
    pub fn into_task(self, id: i64, created_at: DateTime<Utc>) -> Task {
        Task {
            id,
            name: self.name,
            description: self.description,
            due_date: self.due_date,
            done: self.done,
            created_at,
        }
    }
}

fn validate_name(name: &str) -> DomainResult<()> {
    if name.trim().is_empty() {
        return Err(DomainError::ValidationError(
            "name must not be empty".to_string(),
        ));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(DomainError::ValidationError(format!(
            "name must be at most {} characters",
            MAX_NAME_LEN
        )));
    }
    Ok(())
}

/// Change to a single field in a patch.
///
/// Distinguishes a field left out of the request from one explicitly set
/// to null.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FieldUpdate<T> {
    #[default]
    Unchanged,
    Clear,
    Set(T),
}

impl<T> FieldUpdate<T> {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, FieldUpdate::Unchanged)
    }

    fn apply_nullable(self, slot: &mut Option<T>) {
        match self {
            FieldUpdate::Unchanged => {}
            FieldUpdate::Clear => *slot = None,
            FieldUpdate::Set(v) => *slot = Some(v),
        }
    }
}

impl<T> From<Option<T>> for FieldUpdate<T> {
    fn from(v: Option<T>) -> Self {
        v.map_or(FieldUpdate::Clear, FieldUpdate::Set)
    }
}

/// Partial update of a task.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub name: FieldUpdate<String>,
    pub description: FieldUpdate<String>,
    pub due_date: FieldUpdate<DateTime<Utc>>,
    pub done: FieldUpdate<bool>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_unchanged()
            && self.description.is_unchanged()
            && self.due_date.is_unchanged()
            && self.done.is_unchanged()
    }

    /// Reject nulls on non-nullable fields and invalid values.
    pub fn validate(&self) -> DomainResult<()> {
        match &self.name {
            FieldUpdate::Clear => {
                return Err(DomainError::ValidationError(
                    "name cannot be null".to_string(),
                ))
            }
            FieldUpdate::Set(name) => validate_name(name)?,
            FieldUpdate::Unchanged => {}
        }
        if self.done == FieldUpdate::Clear {
            return Err(DomainError::ValidationError(
                "done cannot be null".to_string(),
            ));
        }
        Ok(())
    }

    /// Apply the patch to a task in place.
    ///
    /// `id` and `created_at` are never touched. Call [`TaskPatch::validate`]
    /// first; an unvalidated `Clear` on a non-nullable field is ignored.
    pub fn apply(self, task: &mut Task) {
        if let FieldUpdate::Set(name) = self.name {
            task.name = name;
        }
        self.description.apply_nullable(&mut task.description);
        self.due_date.apply_nullable(&mut task.due_date);
        if let FieldUpdate::Set(done) = self.done {
            task.done = done;
        }
    }
}

// =============================================================================
// Filtering
// =============================================================================

/// Client-facing task filter, applied as a filter extension.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub done: Option<bool>,
    /// Case-insensitive substring of the name.
    pub search: Option<String>,
}

impl TaskFilter {
    pub fn is_empty(&self) -> bool {
        self.done.is_none() && self.search.is_none()
    }
}

impl FilterExtension for TaskFilter {
    fn extend(&self, mut selection: Selection) -> Result<Selection, ExtensionError> {
        if let Some(done) = self.done {
            selection = selection.filter(Predicate::eq("done", done));
        }
        if let Some(search) = &self.search {
            let search = search.trim();
            if search.is_empty() {
                return Err(ExtensionError::new("search must not be blank"));
            }
            selection = selection.filter(Predicate::contains("name", search));
        }
        Ok(selection)
    }
}
