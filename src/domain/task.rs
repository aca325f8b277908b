//! Task domain model.
//!
//! A `Task` is the single entity tracked by the service. Identifiers are
//! assigned by the store on creation; everything else is supplied by the
//! caller and checked by [`crate::domain::validation`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{ValidationError, ValidationPolicy, validate};

// =============================================================================
// Value Objects - Newtypes
// =============================================================================

/// Unique identifier for a task.
///
/// Wraps the `serial` column used by the relational store. Identifiers are
/// handed out by the store and never reused after deletion.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct TaskId(i32);

impl TaskId {
    /// Identifier carried by candidates that have not been stored yet.
    pub const UNASSIGNED: Self = Self(0);

    /// Creates a `TaskId` from a raw integer.
    #[must_use]
    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    /// Returns the raw integer value.
    #[must_use]
    pub const fn value(self) -> i32 {
        self.0
    }

    /// Returns true if the identifier is negative.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Returns the identifier following this one, or `None` once the
    /// `i32` range is exhausted.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self.0.checked_add(1) {
            Some(value) => Some(Self(value)),
            None => None,
        }
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl From<i32> for TaskId {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

/// Timestamp for task creation and modification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a `Timestamp` from a `DateTime<Utc>`.
    #[must_use]
    pub const fn from_datetime(datetime: DateTime<Utc>) -> Self {
        Self(datetime)
    }

    /// Returns the inner `DateTime<Utc>`.
    #[must_use]
    pub const fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Returns the current time as a `Timestamp`.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Formats the timestamp as RFC 3339, the wire format of the HTTP API.
    #[must_use]
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0.format("%Y-%m-%d %H:%M:%S UTC"))
    }
}

// =============================================================================
// Task Entity
// =============================================================================

/// A to-do item.
///
/// # Example
///
/// ```
/// use todo_service::domain::{Task, TaskId, Timestamp};
///
/// let task = Task::new(TaskId::UNASSIGNED, "Buy milk", Timestamp::now())
///     .with_description("2%");
///
/// assert!(!task.completed);
/// assert!(task.is_valid());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Store-assigned identifier.
    pub id: TaskId,
    /// Name of the task. Never empty once persisted.
    pub name: String,
    /// Optional free-form description.
    pub description: Option<String>,
    /// Completion flag.
    pub completed: bool,
    /// Timestamp when the task was created.
    pub created_at: Timestamp,
    /// Timestamp when the task was last updated.
    pub updated_at: Timestamp,
}

impl Task {
    /// Creates a pending task with no description.
    #[must_use]
    pub fn new(id: TaskId, name: impl Into<String>, timestamp: Timestamp) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            completed: false,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Returns a new task with the given description.
    ///
    /// An empty string is treated as "no description".
    #[must_use]
    pub fn with_description(self, description: impl Into<String>) -> Self {
        Self {
            description: normalize_description(Some(description.into())),
            ..self
        }
    }

    /// Returns a new task with the given optional description.
    #[must_use]
    pub fn with_optional_description(self, description: Option<String>) -> Self {
        Self {
            description: normalize_description(description),
            ..self
        }
    }

    /// Returns a new task with the given completion flag.
    #[must_use]
    pub fn with_completed(self, completed: bool) -> Self {
        Self { completed, ..self }
    }

    /// Returns a new task with the given identifier.
    #[must_use]
    pub fn with_id(self, id: TaskId) -> Self {
        Self { id, ..self }
    }

    /// Validates the task under the default (lenient) policy.
    ///
    /// # Errors
    ///
    /// Returns the first rule the task violates.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate(self, ValidationPolicy::default())
    }

    /// Validates the task under an explicit policy.
    ///
    /// # Errors
    ///
    /// Returns the first rule the task violates.
    pub fn validate_with(&self, policy: ValidationPolicy) -> Result<(), ValidationError> {
        validate(self, policy)
    }

    /// Returns true if the task passes validation under the default policy.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

fn normalize_description(description: Option<String>) -> Option<String> {
    description.filter(|text| !text.is_empty())
}

// =============================================================================
// Tests
// =============================================================================
